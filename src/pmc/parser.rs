use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::common::unique_list;
use crate::error::Result;
use crate::models::{Author, Citation, Correspondence, Journal};
use crate::parser::{CitationParser, article_set};
use crate::xml::{Element, XmlTree, collect_element_text, find_all, find_safe, text_safe};

const ARTICLE_SET: &str = "pmc-articleset";

/// Extractor for the PMC `pmc-articleset` dialect
///
/// See <https://dtd.nlm.nih.gov/ncbi/pmc/articleset/nlm-articleset-2.0.dtd>
///
/// Author e-mails are gathered from the `<contrib>` itself and from any
/// `<corresp>` note the contrib points at with an `xref`. A note referenced by
/// more than one author is not attributed to any of them; it is still reported
/// through [`Citation::correspondence`] with its raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PmcXmlParser;

/// Per-article lookup state
struct ArticleContext<'a> {
    article: &'a Element,
    /// How many author contribs reference each corresp id
    corresp_references: HashMap<String, usize>,
}

impl<'a> ArticleContext<'a> {
    fn new(article: &'a Element, authors: &[&'a Element]) -> Self {
        let mut corresp_references: HashMap<String, usize> = HashMap::new();
        for author in authors {
            for rid in xref_ids(author, "corresp") {
                *corresp_references.entry(rid).or_default() += 1;
            }
        }
        Self {
            article,
            corresp_references,
        }
    }

    fn affiliations(&self, author: &Element) -> Option<Vec<String>> {
        let mut affiliations: Vec<String> = xref_ids(author, "aff")
            .into_iter()
            .filter_map(|rid| find_safe(self.article, &format!(r#".//aff[@id="{rid}"]"#)))
            .map(collect_element_text)
            .collect();

        // Affiliations nested directly in the contrib
        affiliations.extend(find_all(author, "aff").into_iter().map(collect_element_text));
        affiliations.retain(|affiliation| !affiliation.is_empty());

        (!affiliations.is_empty()).then_some(affiliations)
    }

    fn emails(&self, author: &Element) -> Option<Vec<String>> {
        // Embedded within <contrib>
        let mut emails: Vec<String> = find_all(author, ".//email")
            .into_iter()
            .map(collect_element_text)
            .collect();

        // Referenced from <contrib> and owned by this author alone
        for rid in xref_ids(author, "corresp") {
            if self.corresp_references.get(&rid).copied().unwrap_or(0) > 1 {
                debug!(rid = %rid, "Correspondence note shared by several authors, not attributing");
                continue;
            }
            if let Some(corresp) =
                find_safe(self.article, &format!(r#".//author-notes/corresp[@id="{rid}"]"#))
            {
                emails.extend(
                    find_all(corresp, ".//email")
                        .into_iter()
                        .map(collect_element_text),
                );
            }
        }

        emails.retain(|email| !email.is_empty());
        let emails = unique_list(emails);
        (!emails.is_empty()).then_some(emails)
    }

    fn author(&self, author: &Element) -> Author {
        Author {
            fore_name: text_safe(author, ".//name/given-names"),
            last_name: text_safe(author, ".//name/surname"),
            initials: None,
            collective_name: find_safe(author, "collab").map(collect_element_text),
            orcid: text_safe(author, r#".//contrib-id[@contrib-id-type="orcid"]"#),
            affiliations: self.affiliations(author),
            emails: self.emails(author),
        }
    }
}

impl PmcXmlParser {
    fn article_id(article: &Element, id_type: &str) -> Option<String> {
        text_safe(
            article,
            &format!(r#".//front/article-meta/article-id[@pub-id-type="{id_type}"]"#),
        )
    }

    fn pmc(article: &Element) -> Option<String> {
        Self::article_id(article, "pmc").or_else(|| Self::article_id(article, "pmcid"))
    }

    fn title(article: &Element) -> String {
        find_safe(article, ".//front/article-meta/title-group/article-title")
            .map(collect_element_text)
            .unwrap_or_default()
    }

    fn abstract_text(article: &Element) -> Option<String> {
        let abstracts: Vec<String> = find_all(article, ".//front/article-meta/abstract")
            .into_iter()
            .map(collect_element_text)
            .filter(|text| !text.is_empty())
            .collect();

        (!abstracts.is_empty()).then(|| abstracts.join(" "))
    }

    fn authors(article: &Element) -> Vec<&Element> {
        find_all(
            article,
            r#".//front/article-meta/contrib-group/contrib[@contrib-type="author"]"#,
        )
    }

    fn journal(article: &Element) -> Journal {
        let mut journal = Journal::default();

        if let Some(journal_meta) = find_safe(article, ".//front/journal-meta") {
            let issn: Vec<String> = find_all(journal_meta, ".//issn")
                .into_iter()
                .map(collect_element_text)
                .filter(|issn| !issn.is_empty())
                .collect();

            journal.title = text_safe(journal_meta, ".//journal-title-group/journal-title")
                .or_else(|| text_safe(journal_meta, ".//journal-title"));
            journal.iso_abbreviation = text_safe(
                journal_meta,
                r#"journal-id[@journal-id-type="iso-abbrev"]"#,
            );
            journal.issn = (!issn.is_empty()).then_some(issn);
        }

        if let Some(article_meta) = find_safe(article, ".//front/article-meta") {
            journal.volume = text_safe(article_meta, "volume");
            journal.issue = text_safe(article_meta, "issue");

            // Print date first, then electronic, then whatever comes first
            let pub_date = find_safe(article_meta, r#"pub-date[@pub-type="ppub"]"#)
                .or_else(|| find_safe(article_meta, r#"pub-date[@pub-type="epub"]"#))
                .or_else(|| find_safe(article_meta, "pub-date"));
            if let Some(pub_date) = pub_date {
                journal.pub_year = text_safe(pub_date, "year");
                journal.pub_month = text_safe(pub_date, "month");
                journal.pub_day = text_safe(pub_date, "day");
            }
        }

        journal
    }

    fn correspondence(article: &Element) -> Vec<Correspondence> {
        find_all(article, ".//author-notes/corresp")
            .into_iter()
            .map(|corresp| Correspondence {
                emails: find_all(corresp, ".//email")
                    .into_iter()
                    .map(collect_element_text)
                    .collect(),
                notes: collect_element_text(corresp),
            })
            .collect()
    }

    fn citation(article: &Element) -> Citation {
        let authors = Self::authors(article);
        let context = ArticleContext::new(article, &authors);
        let author_list: Vec<Author> = authors
            .iter()
            .map(|author| context.author(author))
            .collect();

        Citation {
            pmid: Self::article_id(article, "pmid")
                .map(|pmid| pmid.trim().to_string())
                .unwrap_or_default(),
            pmc: Self::pmc(article),
            doi: Self::article_id(article, "doi"),
            title: Self::title(article),
            abstract_text: Self::abstract_text(article),
            author_list: (!author_list.is_empty()).then_some(author_list),
            journal: Self::journal(article),
            publication_type_list: Vec::new(),
            correspondence: Self::correspondence(article),
            mesh_list: None,
        }
    }
}

impl CitationParser for PmcXmlParser {
    fn root_tag(&self) -> &'static str {
        ARTICLE_SET
    }

    #[instrument(skip(self, tree))]
    fn parse(&self, tree: &XmlTree) -> Result<Vec<Citation>> {
        let article_set = article_set(tree, ARTICLE_SET)?;
        let citations: Vec<Citation> = find_all(article_set, ".//article")
            .into_iter()
            .map(Self::citation)
            .collect();

        debug!(citations = citations.len(), "Parsed pmc-articleset");
        Ok(citations)
    }
}

/// Ids referenced by `<xref ref-type="...">` inside `element`
///
/// A single `rid` may list several whitespace-separated ids.
fn xref_ids(element: &Element, ref_type: &str) -> Vec<String> {
    find_all(element, &format!(r#".//xref[@ref-type="{ref_type}"]"#))
        .into_iter()
        .filter_map(|xref| xref.get("rid"))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}
