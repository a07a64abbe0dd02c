//! AI prescription drafting for medfo.
//!
//! Builds a prompt from the patient record, symptoms and recent history,
//! sends it to a hosted text-generation endpoint and parses the reply into a
//! [`DraftPrescription`](medfo_core::models::DraftPrescription). Drafts are
//! never saved here.

pub mod client;
pub mod config;
pub mod draft;
pub mod extraction;
pub mod prompts;

pub use client::*;
pub use config::*;
pub use draft::*;
pub use extraction::*;
pub use prompts::*;
