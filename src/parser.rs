//! The extraction capability shared by both XML dialects

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NcbiError, Result};
use crate::models::Citation;
use crate::pmc::PmcXmlParser;
use crate::pubmed::PubmedXmlParser;
use crate::xml::{Element, XmlTree};

/// Maps one XML dialect onto the unified [`Citation`] model
pub trait CitationParser {
    /// Tag name of the dialect's root container
    fn root_tag(&self) -> &'static str;

    /// Extract every citation in document order
    ///
    /// Fails only when the document root is not the dialect's container;
    /// missing fields inside a record are left empty.
    fn parse(&self, tree: &XmlTree) -> Result<Vec<Citation>>;

    /// Parse raw bytes and extract citations
    fn parse_bytes(&self, data: &[u8]) -> Result<Vec<Citation>> {
        let tree = XmlTree::from_raw(data)?;
        self.parse(&tree)
    }
}

/// Return the root container, or a structural error if the tag differs
pub fn article_set<'a>(tree: &'a XmlTree, expected: &str) -> Result<&'a Element> {
    let root = tree.root();
    if root.name() != expected {
        return Err(NcbiError::MissingRootContainer {
            expected: expected.to_string(),
            found: root.name().to_string(),
        });
    }
    Ok(root)
}

/// The XML dialects a payload can be extracted from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `PubmedArticleSet` documents from the literature index
    #[default]
    Pubmed,
    /// `pmc-articleset` documents from the full-text archive
    Pmc,
}

impl Dialect {
    pub fn parser(&self) -> &'static dyn CitationParser {
        match self {
            Dialect::Pubmed => &PubmedXmlParser,
            Dialect::Pmc => &PmcXmlParser,
        }
    }

    pub fn parse(&self, tree: &XmlTree) -> Result<Vec<Citation>> {
        self.parser().parse(tree)
    }

    pub fn parse_bytes(&self, data: &[u8]) -> Result<Vec<Citation>> {
        self.parser().parse_bytes(data)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Pubmed => write!(f, "pubmed"),
            Dialect::Pmc => write!(f, "pmc"),
        }
    }
}
