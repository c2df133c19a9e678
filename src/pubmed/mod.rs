//! Extraction of citations from PubMed `PubmedArticleSet` XML
//!
//! This is the dialect returned by EFetch with `db=pubmed&retmode=xml` and the
//! format of the annual baseline and daily update files.

pub mod parser;

pub use parser::PubmedXmlParser;
