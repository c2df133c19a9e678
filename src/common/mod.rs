//! Helpers shared by the PubMed and PMC extractors

pub mod email;

pub use email::{extract_emails, unique_list};
