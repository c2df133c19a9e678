//! Request parameters for EFetch and the file archive

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NcbiError, Result};
use crate::parser::Dialect;

/// Entrez database to fetch from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Db {
    #[default]
    Pubmed,
    Pmc,
}

impl Db {
    pub fn as_str(&self) -> &'static str {
        match self {
            Db::Pubmed => "pubmed",
            Db::Pmc => "pmc",
        }
    }

    /// XML dialect this database returns
    pub fn dialect(&self) -> Dialect {
        match self {
            Db::Pubmed => Dialect::Pubmed,
            Db::Pmc => Dialect::Pmc,
        }
    }
}

/// EFetch `retmode`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetMode {
    #[default]
    #[serde(rename = "xml")]
    Xml,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "asn.1")]
    Asn1,
}

impl RetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetMode::Xml => "xml",
            RetMode::Text => "text",
            RetMode::Asn1 => "asn.1",
        }
    }
}

/// EFetch `rettype`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetType {
    Uilist,
    #[default]
    Abstract,
    Docsum,
    Medline,
}

impl RetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetType::Uilist => "uilist",
            RetType::Abstract => "abstract",
            RetType::Docsum => "docsum",
            RetType::Medline => "medline",
        }
    }
}

/// Retention class of the PubMed file archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadPath {
    /// Daily update files
    #[default]
    UpdateFiles,
    /// Annual baseline files
    Baseline,
}

impl DownloadPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadPath::UpdateFiles => "updatefiles",
            DownloadPath::Baseline => "baseline",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Db, RetMode, RetType, DownloadPath);

/// Database and response format of an EFetch pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub db: Db,
    pub retmode: RetMode,
    pub rettype: RetType,
}

impl FetchOptions {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            ..Default::default()
        }
    }

    pub fn with_retmode(mut self, retmode: RetMode) -> Self {
        self.retmode = retmode;
        self
    }

    pub fn with_rettype(mut self, rettype: RetType) -> Self {
        self.rettype = rettype;
        self
    }

    /// Extractor for these options; only XML responses have one
    pub fn dialect(&self) -> Result<Dialect> {
        match self.retmode {
            RetMode::Xml => Ok(self.db.dialect()),
            RetMode::Text | RetMode::Asn1 => Err(NcbiError::UnsupportedFormat {
                retmode: self.retmode.to_string(),
            }),
        }
    }

    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("db".to_string(), self.db.to_string()),
            ("retmode".to_string(), self.retmode.to_string()),
            ("rettype".to_string(), self.rettype.to_string()),
        ]
    }
}
