use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::common::{extract_emails, unique_list};
use crate::error::Result;
use crate::models::{Author, Citation, Journal, MeshHeading, MeshTerm};
use crate::parser::{CitationParser, article_set};
use crate::xml::{
    Element, XmlTree, collect_element_text, collect_element_text_with_prefix, find_all, find_safe,
    text_safe,
};

const ARTICLE_SET: &str = "PubmedArticleSet";

/// Extractor for the PubMed `PubmedArticleSet` dialect
///
/// See <https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_250101.dtd>
///
/// Records sharing a PMID with an earlier record in the same document are
/// dropped; the first occurrence wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct PubmedXmlParser;

impl PubmedXmlParser {
    fn pmid(article: &Element) -> Option<String> {
        text_safe(article, ".//MedlineCitation/PMID").map(|pmid| pmid.trim().to_string())
    }

    fn article_id(article: &Element, id_type: &str) -> Option<String> {
        text_safe(
            article,
            &format!(r#".//PubmedData/ArticleIdList/ArticleId[@IdType="{id_type}"]"#),
        )
    }

    fn doi(article: &Element) -> Option<String> {
        Self::article_id(article, "doi").or_else(|| {
            text_safe(
                article,
                r#".//MedlineCitation/Article/ELocationID[@EIdType="doi"]"#,
            )
        })
    }

    fn title(article: &Element) -> Option<String> {
        find_safe(article, ".//MedlineCitation/Article/ArticleTitle").map(collect_element_text)
    }

    fn abstract_text(article: &Element) -> Option<String> {
        let segments: Vec<String> =
            find_all(article, ".//MedlineCitation/Article/Abstract/AbstractText")
                .into_iter()
                .map(|segment| collect_element_text_with_prefix(segment, "Label"))
                .collect();

        (!segments.is_empty()).then(|| segments.join(" "))
    }

    fn author(author: &Element) -> Author {
        let affiliations: Vec<String> = find_all(author, ".//AffiliationInfo/Affiliation")
            .into_iter()
            .map(collect_element_text)
            .collect();

        let emails = unique_list(
            affiliations
                .iter()
                .flat_map(|affiliation| extract_emails(affiliation)),
        );

        Author {
            fore_name: text_safe(author, "ForeName"),
            last_name: text_safe(author, "LastName"),
            initials: text_safe(author, "Initials"),
            collective_name: find_safe(author, "CollectiveName").map(collect_element_text),
            orcid: text_safe(author, r#"Identifier[@Source="ORCID"]"#),
            affiliations: (!affiliations.is_empty()).then_some(affiliations),
            emails: (!emails.is_empty()).then_some(emails),
        }
    }

    fn author_list(article: &Element) -> Option<Vec<Author>> {
        let authors: Vec<Author> = find_all(article, ".//MedlineCitation/Article/AuthorList/Author")
            .into_iter()
            .map(Self::author)
            .collect();

        (!authors.is_empty()).then_some(authors)
    }

    fn journal(article: &Element) -> Journal {
        let Some(journal) = find_safe(article, ".//MedlineCitation/Article/Journal") else {
            return Journal::default();
        };

        let issn: Vec<String> = find_all(journal, "ISSN")
            .into_iter()
            .map(collect_element_text)
            .filter(|issn| !issn.is_empty())
            .collect();

        let pub_date = find_safe(journal, "JournalIssue/PubDate");
        let pub_year = pub_date.and_then(|date| {
            text_safe(date, "Year").or_else(|| {
                text_safe(date, "MedlineDate").and_then(|medline| medline_year(&medline))
            })
        });

        Journal {
            title: text_safe(journal, "Title"),
            iso_abbreviation: text_safe(journal, "ISOAbbreviation"),
            issn: (!issn.is_empty()).then_some(issn),
            volume: text_safe(journal, "JournalIssue/Volume"),
            issue: text_safe(journal, "JournalIssue/Issue"),
            pub_year,
            pub_month: pub_date.and_then(|date| text_safe(date, "Month")),
            pub_day: pub_date.and_then(|date| text_safe(date, "Day")),
        }
    }

    fn publication_type_list(article: &Element) -> Vec<String> {
        find_all(
            article,
            ".//MedlineCitation/Article/PublicationTypeList/PublicationType",
        )
        .into_iter()
        .filter_map(|publication_type| publication_type.get("UI").map(str::to_string))
        .collect()
    }

    fn mesh_term(element: &Element) -> MeshTerm {
        let value = collect_element_text(element);
        MeshTerm {
            ui: element.get("UI").map(str::to_string),
            value: (!value.is_empty()).then_some(value),
        }
    }

    fn mesh_heading(heading: &Element) -> MeshHeading {
        let qualifiers: Vec<MeshTerm> = find_all(heading, "QualifierName")
            .into_iter()
            .map(Self::mesh_term)
            .collect();

        MeshHeading {
            descriptor_name: find_safe(heading, "DescriptorName")
                .map(Self::mesh_term)
                .unwrap_or_default(),
            qualifier_name: (!qualifiers.is_empty()).then_some(qualifiers),
        }
    }

    fn mesh_list(article: &Element) -> Option<Vec<MeshHeading>> {
        let heading_list = find_safe(article, ".//MedlineCitation/MeshHeadingList")?;
        Some(
            find_all(heading_list, "MeshHeading")
                .into_iter()
                .map(Self::mesh_heading)
                .collect(),
        )
    }

    fn citation(article: &Element) -> Citation {
        Citation {
            pmid: Self::pmid(article).unwrap_or_default(),
            pmc: Self::article_id(article, "pmc"),
            doi: Self::doi(article),
            title: Self::title(article).unwrap_or_default(),
            abstract_text: Self::abstract_text(article),
            author_list: Self::author_list(article),
            journal: Self::journal(article),
            publication_type_list: Self::publication_type_list(article),
            correspondence: Vec::new(),
            mesh_list: Self::mesh_list(article),
        }
    }
}

impl CitationParser for PubmedXmlParser {
    fn root_tag(&self) -> &'static str {
        ARTICLE_SET
    }

    #[instrument(skip(self, tree))]
    fn parse(&self, tree: &XmlTree) -> Result<Vec<Citation>> {
        let article_set = article_set(tree, ARTICLE_SET)?;
        let articles = find_all(article_set, ".//PubmedArticle");

        let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
        let mut citations = Vec::with_capacity(articles.len());

        for article in articles {
            let citation = Self::citation(article);
            if !citation.pmid.is_empty() && !seen.insert(citation.pmid.clone()) {
                warn!(pmid = %citation.pmid, "Skipping record with duplicate PMID");
                continue;
            }
            citations.push(citation);
        }

        debug!(citations = citations.len(), "Parsed PubmedArticleSet");
        Ok(citations)
    }
}

/// Leading year of a free-form `MedlineDate` such as `"1998 Dec-1999 Jan"`
fn medline_year(medline_date: &str) -> Option<String> {
    let year: String = medline_date.trim().chars().take(4).collect();
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
}
