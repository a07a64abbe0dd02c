//! Static medicine catalog and diagnosis templates.
//!
//! Reference data only. Nothing here is persisted or mutated.

use crate::models::{CatalogMedicine, DiagnosisTemplate, MedicineLine};

static MEDICINES: &[CatalogMedicine] = &[
    // Fever & Pain
    CatalogMedicine {
        id: "1",
        brand_name: "Dolo 650",
        generic_name: "Paracetamol",
        strength: "650mg",
        form: "Tablet",
        category: "Antipyretic",
        price: 30,
        common_dosage: "1 tablet TDS",
    },
    CatalogMedicine {
        id: "2",
        brand_name: "Crocin",
        generic_name: "Paracetamol",
        strength: "500mg",
        form: "Tablet",
        category: "Antipyretic",
        price: 25,
        common_dosage: "1-2 tablets TDS",
    },
    CatalogMedicine {
        id: "3",
        brand_name: "Combiflam",
        generic_name: "Ibuprofen + Paracetamol",
        strength: "400mg+325mg",
        form: "Tablet",
        category: "Analgesic",
        price: 35,
        common_dosage: "1 tablet TDS",
    },
    // Antibiotics
    CatalogMedicine {
        id: "4",
        brand_name: "Augmentin",
        generic_name: "Amoxicillin + Clavulanic Acid",
        strength: "625mg",
        form: "Tablet",
        category: "Antibiotic",
        price: 180,
        common_dosage: "1 tablet BD",
    },
    CatalogMedicine {
        id: "5",
        brand_name: "Azithral",
        generic_name: "Azithromycin",
        strength: "500mg",
        form: "Tablet",
        category: "Antibiotic",
        price: 95,
        common_dosage: "1 tablet OD for 3 days",
    },
    // Gastric
    CatalogMedicine {
        id: "6",
        brand_name: "Pan 40",
        generic_name: "Pantoprazole",
        strength: "40mg",
        form: "Tablet",
        category: "PPI",
        price: 65,
        common_dosage: "1 tablet OD before breakfast",
    },
    CatalogMedicine {
        id: "7",
        brand_name: "Omez",
        generic_name: "Omeprazole",
        strength: "20mg",
        form: "Capsule",
        category: "PPI",
        price: 55,
        common_dosage: "1 capsule OD",
    },
    // Diabetes
    CatalogMedicine {
        id: "8",
        brand_name: "Glycomet",
        generic_name: "Metformin",
        strength: "500mg",
        form: "Tablet",
        category: "Antidiabetic",
        price: 45,
        common_dosage: "1 tablet BD after meals",
    },
    // Hypertension
    CatalogMedicine {
        id: "9",
        brand_name: "Amlodipine",
        generic_name: "Amlodipine",
        strength: "5mg",
        form: "Tablet",
        category: "Antihypertensive",
        price: 25,
        common_dosage: "1 tablet OD",
    },
    CatalogMedicine {
        id: "10",
        brand_name: "Telma",
        generic_name: "Telmisartan",
        strength: "40mg",
        form: "Tablet",
        category: "Antihypertensive",
        price: 95,
        common_dosage: "1 tablet OD",
    },
];

static TEMPLATES: &[DiagnosisTemplate] = &[
    DiagnosisTemplate {
        id: "1",
        name: "Viral Fever",
        medicines: &["Dolo 650"],
        advice: &["Rest for 3-4 days", "Drink plenty of fluids"],
    },
    DiagnosisTemplate {
        id: "2",
        name: "URTI",
        medicines: &["Azithral", "Combiflam"],
        advice: &["Complete antibiotic course", "Steam inhalation"],
    },
    DiagnosisTemplate {
        id: "3",
        name: "Gastritis",
        medicines: &["Pan 40"],
        advice: &["Avoid spicy food", "Eat small frequent meals"],
    },
    DiagnosisTemplate {
        id: "4",
        name: "Diabetes",
        medicines: &["Glycomet"],
        advice: &["Regular exercise", "Low sugar diet"],
    },
    DiagnosisTemplate {
        id: "5",
        name: "Hypertension",
        medicines: &["Amlodipine"],
        advice: &["Low salt diet", "Monitor BP daily"],
    },
];

/// Every catalog medicine, in catalog order.
pub fn medicines() -> &'static [CatalogMedicine] {
    MEDICINES
}

/// Medicines whose brand or generic name contains `query`, ignoring case.
pub fn search_medicines(query: &str) -> Vec<&'static CatalogMedicine> {
    MEDICINES.iter().filter(|m| m.matches(query)).collect()
}

/// Exact brand lookup.
pub fn find_by_brand(brand_name: &str) -> Option<&'static CatalogMedicine> {
    MEDICINES.iter().find(|m| m.brand_name == brand_name)
}

pub fn diagnosis_templates() -> &'static [DiagnosisTemplate] {
    TEMPLATES
}

pub fn template_by_id(id: &str) -> Option<&'static DiagnosisTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Form values produced by loading a diagnosis template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFill {
    pub diagnosis: String,
    /// Advice lines joined with newlines
    pub advice: String,
    pub medicines: Vec<MedicineLine>,
}

/// Expand a template into form values. Brands missing from the catalog are skipped.
pub fn apply_template(template: &DiagnosisTemplate) -> TemplateFill {
    TemplateFill {
        diagnosis: template.name.to_string(),
        advice: template.advice.join("\n"),
        medicines: template
            .medicines
            .iter()
            .filter_map(|brand| find_by_brand(brand))
            .map(|m| MedicineLine::new(m.brand_name))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loaded() {
        assert_eq!(medicines().len(), 10);
        assert_eq!(diagnosis_templates().len(), 5);
    }

    #[test]
    fn test_search_by_generic_name() {
        let results = search_medicines("paracetamol");
        let brands: Vec<_> = results.iter().map(|m| m.brand_name).collect();
        assert_eq!(brands, vec!["Dolo 650", "Crocin", "Combiflam"]);
    }

    #[test]
    fn test_search_empty_query_returns_all() {
        assert_eq!(search_medicines("").len(), medicines().len());
        assert!(search_medicines("zzz").is_empty());
    }

    #[test]
    fn test_template_brands_resolve() {
        for template in diagnosis_templates() {
            for brand in template.medicines {
                assert!(find_by_brand(brand).is_some(), "{} missing", brand);
            }
        }
    }

    #[test]
    fn test_apply_template() {
        let template = template_by_id("2").unwrap();
        let fill = apply_template(template);
        assert_eq!(fill.diagnosis, "URTI");
        assert_eq!(fill.advice, "Complete antibiotic course\nSteam inhalation");
        let names: Vec<_> = fill.medicines.iter().map(|m| m.medicine.as_str()).collect();
        assert_eq!(names, vec!["Azithral", "Combiflam"]);
        assert!(fill.medicines.iter().all(|m| m.duration == "5"));
    }

    #[test]
    fn test_unknown_template() {
        assert!(template_by_id("99").is_none());
    }
}
