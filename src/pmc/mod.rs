//! Extraction of citations from PMC `pmc-articleset` XML
//!
//! This is the dialect returned by EFetch with `db=pmc&retmode=xml`. It carries
//! no MeSH indexing, so `mesh_list` is always `None` and
//! `publication_type_list` is always empty.

pub mod parser;

pub use parser::PmcXmlParser;
