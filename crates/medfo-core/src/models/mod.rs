//! Domain models for medfo.

mod catalog;
mod draft;
mod patient;
mod prescription;
mod validation;

pub use catalog::*;
pub use draft::*;
pub use patient::*;
pub use prescription::*;
pub use validation::*;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at microsecond precision, the resolution the store sorts on.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
