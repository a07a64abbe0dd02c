//! Medicine catalog models.

use serde::Serialize;

/// A reference medicine in the static catalog.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMedicine {
    pub id: &'static str,
    /// Brand name, used as the prescribed medicine name
    pub brand_name: &'static str,
    pub generic_name: &'static str,
    /// Strength per unit (e.g., "650mg")
    pub strength: &'static str,
    /// Dosage form (e.g., "Tablet", "Capsule")
    pub form: &'static str,
    /// Therapeutic category
    pub category: &'static str,
    /// Retail price in INR
    pub price: u32,
    pub common_dosage: &'static str,
}

impl CatalogMedicine {
    /// Case-insensitive substring match on brand or generic name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.brand_name.to_lowercase().contains(&query)
            || self.generic_name.to_lowercase().contains(&query)
    }
}

/// A diagnosis with its usual medicines and advice.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DiagnosisTemplate {
    pub id: &'static str,
    pub name: &'static str,
    /// Catalog brand names
    pub medicines: &'static [&'static str],
    pub advice: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOLO: CatalogMedicine = CatalogMedicine {
        id: "1",
        brand_name: "Dolo 650",
        generic_name: "Paracetamol",
        strength: "650mg",
        form: "Tablet",
        category: "Antipyretic",
        price: 30,
        common_dosage: "1 tablet TDS",
    };

    #[test]
    fn test_matches_brand_and_generic() {
        assert!(DOLO.matches("dolo"));
        assert!(DOLO.matches("PARACET"));
        assert!(DOLO.matches(""));
        assert!(!DOLO.matches("ibuprofen"));
    }
}
