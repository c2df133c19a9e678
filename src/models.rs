use serde::{Deserialize, Serialize};

/// An author of a citation
///
/// Either a personal name or a collective (organisation) name is expected,
/// but every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// First name
    pub fore_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Initials
    pub initials: Option<String>,
    /// Organisation name
    pub collective_name: Option<String>,
    /// ORCID identifier as written in the source
    pub orcid: Option<String>,
    /// Affiliation strings in document order
    pub affiliations: Option<Vec<String>>,
    /// E-mail addresses, first-seen order, no duplicates
    pub emails: Option<Vec<String>>,
}

impl Author {
    pub fn has_email(&self, email: &str) -> bool {
        self.emails
            .as_ref()
            .is_some_and(|emails| emails.iter().any(|e| e == email))
    }
}

/// Journal and issue details
///
/// All values are kept as free text; sources use formats like `"17-18"` for
/// issues or `"Pt 13"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub title: Option<String>,
    pub iso_abbreviation: Option<String>,
    /// Print and/or electronic ISSNs
    pub issn: Option<Vec<String>>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pub_year: Option<String>,
    pub pub_month: Option<String>,
    pub pub_day: Option<String>,
}

/// A free-text corresponding-author note and the addresses it contains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    pub emails: Vec<String>,
    pub notes: String,
}

/// A controlled-vocabulary term: unique identifier plus label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshTerm {
    pub ui: Option<String>,
    pub value: Option<String>,
}

/// A MeSH descriptor with its optional qualifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshHeading {
    pub descriptor_name: MeshTerm,
    pub qualifier_name: Option<Vec<MeshTerm>>,
}

/// Unified citation record produced by both dialect extractors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// PubMed ID; empty when the source record carries none
    pub pmid: String,
    /// PubMed Central ID
    pub pmc: Option<String>,
    /// Digital Object Identifier
    pub doi: Option<String>,
    /// Article title; empty when the source omits it
    pub title: String,
    /// Abstract segments joined by a space, each optionally prefixed by its label
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub author_list: Option<Vec<Author>>,
    pub journal: Journal,
    /// Publication type UIs, e.g. `D016428` for "Journal Article"
    pub publication_type_list: Vec<String>,
    pub correspondence: Vec<Correspondence>,
    pub mesh_list: Option<Vec<MeshHeading>>,
}

impl Citation {
    /// Whether the record can be traced back to a source identifier
    pub fn has_identifier(&self) -> bool {
        !self.pmid.trim().is_empty() || self.pmc.is_some()
    }

    /// First author whose last name matches exactly
    pub fn author_by_last_name(&self, last_name: &str) -> Option<&Author> {
        self.author_list
            .as_deref()?
            .iter()
            .find(|author| author.last_name.as_deref() == Some(last_name))
    }

    /// Heading whose descriptor UI matches
    pub fn mesh_heading(&self, descriptor_ui: &str) -> Option<&MeshHeading> {
        self.mesh_list
            .as_deref()?
            .iter()
            .find(|heading| heading.descriptor_name.ui.as_deref() == Some(descriptor_ui))
    }
}
