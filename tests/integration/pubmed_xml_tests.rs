mod common;
use common::read_fixture;
use ncbiutils::{Citation, CitationParser, NcbiError, PubmedXmlParser, XmlTree};
use rstest::rstest;
use tracing::info;

fn parse_fixture(filename: &str) -> Vec<Citation> {
    PubmedXmlParser
        .parse_bytes(&read_fixture("pubmed_xml", filename))
        .unwrap_or_else(|e| panic!("Failed to parse {filename}: {e}"))
}

fn find<'a>(citations: &'a [Citation], pmid: &str) -> &'a Citation {
    citations
        .iter()
        .find(|c| c.pmid == pmid)
        .unwrap_or_else(|| panic!("No citation with PMID {pmid}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_yields_two_citations_in_order() {
        let citations = parse_fixture("double.xml");
        let pmids: Vec<&str> = citations.iter().map(|c| c.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["31302001", "22454523"]);
    }

    #[rstest]
    #[case(
        "31302001",
        None,
        "10.1016/j.molcel.2019.06.008",
        "Sirt3, as a major mitochondrial nicotinamide",
        "SENP1-Sirt3 Signaling Controls Mitochondrial",
        "Cheng",
        Some("jkcheng@shsmu.edu.cn"),
        "Molecular cell",
        "Mol Cell",
        "1097-4164",
        "75",
        "4",
        "2019"
    )]
    #[case(
        "22454523",
        Some("PMC4067266"),
        "10.1242/jcs.103564",
        "Botulinum neurotoxins (BoNTs) are classified",
        "Botulinum neurotoxin D-C uses synaptotagmin",
        "Dong",
        None,
        "Journal of cell science",
        "J Cell Sci",
        "1477-9137",
        "125",
        "Pt 13",
        "2012"
    )]
    #[allow(clippy::too_many_arguments)]
    fn test_complete_citation_attributes(
        #[case] pmid: &str,
        #[case] pmc: Option<&str>,
        #[case] doi: &str,
        #[case] abstract_fragment: &str,
        #[case] title_fragment: &str,
        #[case] last_name: &str,
        #[case] email: Option<&str>,
        #[case] journal_title: &str,
        #[case] iso_abbreviation: &str,
        #[case] issn: &str,
        #[case] volume: &str,
        #[case] issue: &str,
        #[case] pub_year: &str,
    ) {
        let citations = parse_fixture("double.xml");
        let citation = find(&citations, pmid);

        assert_eq!(citation.pmc.as_deref(), pmc);
        assert_eq!(citation.doi.as_deref(), Some(doi));
        assert!(
            citation
                .abstract_text
                .as_deref()
                .is_some_and(|a| a.contains(abstract_fragment))
        );
        assert!(citation.title.contains(title_fragment));

        let author = citation
            .author_by_last_name(last_name)
            .expect("author should be present");
        if let Some(email) = email {
            assert!(author.has_email(email), "{:?}", author.emails);
        }

        let journal = &citation.journal;
        assert_eq!(journal.title.as_deref(), Some(journal_title));
        assert_eq!(journal.iso_abbreviation.as_deref(), Some(iso_abbreviation));
        assert!(journal.issn.as_ref().unwrap().iter().any(|i| i == issn));
        assert_eq!(journal.volume.as_deref(), Some(volume));
        assert_eq!(journal.issue.as_deref(), Some(issue));
        assert_eq!(journal.pub_year.as_deref(), Some(pub_year));

        assert!(citation.publication_type_list.iter().any(|t| t == "D016428"));
        info!(pmid, "Citation attributes matched");
    }

    #[test]
    fn test_mesh_headings() {
        let citations = parse_fixture("double.xml");

        let heading = find(&citations, "31302001")
            .mesh_heading("D008928")
            .expect("Mitochondria heading");
        assert_eq!(heading.descriptor_name.value.as_deref(), Some("Mitochondria"));
        let qualifiers: Vec<(&str, &str)> = heading
            .qualifier_name
            .as_ref()
            .unwrap()
            .iter()
            .map(|q| (q.ui.as_deref().unwrap(), q.value.as_deref().unwrap()))
            .collect();
        assert_eq!(
            qualifiers,
            vec![
                ("Q000235", "genetics"),
                ("Q000378", "metabolism"),
                ("Q000473", "pathology")
            ]
        );

        let acetylation = find(&citations, "31302001")
            .mesh_heading("D000107")
            .unwrap();
        assert_eq!(acetylation.qualifier_name, None);

        let synaptotagmin = find(&citations, "22454523")
            .mesh_heading("D050861")
            .unwrap();
        assert_eq!(
            synaptotagmin.descriptor_name.value.as_deref(),
            Some("Synaptotagmin II")
        );
    }

    #[test]
    fn test_inline_markup_is_flattened() {
        let citations = parse_fixture("double.xml");
        let abstract_text = find(&citations, "22454523").abstract_text.clone().unwrap();
        assert!(abstract_text.contains("that BoNT/D-C uses synaptotagmin"));
        assert!(!abstract_text.contains("<i>"));
    }

    #[test]
    fn test_author_details() {
        let citations = parse_fixture("double.xml");
        let cheng = find(&citations, "31302001")
            .author_by_last_name("Cheng")
            .unwrap();
        assert_eq!(cheng.fore_name.as_deref(), Some("Jinke"));
        assert_eq!(cheng.initials.as_deref(), Some("J"));
        assert_eq!(cheng.orcid.as_deref(), Some("0000-0002-1825-0097"));
        assert_eq!(cheng.emails, Some(vec!["jkcheng@shsmu.edu.cn".to_string()]));

        let wang = find(&citations, "31302001")
            .author_by_last_name("Wang")
            .unwrap();
        assert_eq!(wang.emails, None);
        assert_eq!(wang.affiliations.as_ref().map(Vec::len), Some(1));

        let peng = find(&citations, "22454523")
            .author_by_last_name("Peng")
            .unwrap();
        assert_eq!(peng.affiliations, None);
    }

    #[test]
    fn test_no_title_no_abstract() {
        let citations = parse_fixture("no_title_abstract.xml");
        let citation = find(&citations, "33279447");

        assert_eq!(citation.title, "");
        assert_eq!(citation.abstract_text, None);
        assert_eq!(citation.doi.as_deref(), Some("10.1016/j.reuma.2020.11.001"));

        let author = citation.author_by_last_name("Vicente Moreno").unwrap();
        assert!(author.has_email("dr.vicentemoreno@gmail.com"));

        let journal = &citation.journal;
        assert_eq!(journal.title.as_deref(), Some("Reumatologia clinica"));
        assert_eq!(
            journal.iso_abbreviation.as_deref(),
            Some("Reumatol Clin (Engl Ed)")
        );
        assert_eq!(journal.issn, Some(vec!["2173-5743".to_string()]));
        assert_eq!(journal.volume, None);
        assert_eq!(journal.issue, None);
        assert_eq!(journal.pub_year.as_deref(), Some("2020"));
        assert_eq!(citation.publication_type_list, vec!["D016428"]);
        assert_eq!(citation.mesh_list, None);
    }

    #[test]
    fn test_missing_article_set_is_structural_error() {
        let err = PubmedXmlParser
            .parse_bytes(&read_fixture("pubmed_xml", "no_pubmedarticleset.xml"))
            .unwrap_err();

        assert!(matches!(
            err,
            NcbiError::MissingRootContainer { ref expected, ref found }
                if expected == "PubmedArticleSet" && found == "eFetchResult"
        ));
        assert!(err.is_structural_error());
    }

    #[test]
    fn test_malformed_document_is_xml_error() {
        let err = PubmedXmlParser
            .parse_bytes(b"<PubmedArticleSet><PubmedArticle></PubmedArticleSet>")
            .unwrap_err();
        assert!(matches!(err, NcbiError::XmlError(_)));
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let data = read_fixture("pubmed_xml", "double.xml");
        let tree = XmlTree::from_raw(&data).unwrap();

        let first = PubmedXmlParser.parse(&tree).unwrap();
        let second = PubmedXmlParser.parse(&tree).unwrap();
        let from_bytes = PubmedXmlParser.parse_bytes(&data).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, from_bytes);
    }

    #[test]
    fn test_duplicate_pmid_keeps_first_occurrence() {
        let xml = r#"<PubmedArticleSet>
            <PubmedArticle><MedlineCitation><PMID>31302001</PMID></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>31302001</PMID></MedlineCitation></PubmedArticle>
            <PubmedArticle><MedlineCitation><PMID>22454523</PMID></MedlineCitation></PubmedArticle>
        </PubmedArticleSet>"#;

        let citations = PubmedXmlParser.parse_bytes(xml.as_bytes()).unwrap();
        let pmids: Vec<&str> = citations.iter().map(|c| c.pmid.as_str()).collect();
        assert_eq!(pmids, vec!["31302001", "22454523"]);
    }

    #[test]
    fn test_collective_author_alongside_personal_author() {
        let citations = parse_fixture("collective_author.xml");
        let authors = citations[0].author_list.as_ref().unwrap();
        assert_eq!(authors.len(), 2);

        assert_eq!(authors[0].last_name.as_deref(), Some("Estrada"));
        assert_eq!(authors[0].collective_name, None);

        let consortium = &authors[1];
        assert_eq!(
            consortium.collective_name.as_deref(),
            Some("GEFOS/GENOMOS consortium and the Genetic Factors for Osteoporosis")
        );
        assert_eq!(consortium.fore_name, None);
        assert_eq!(consortium.last_name, None);
        assert_eq!(consortium.initials, None);
    }

    #[test]
    fn test_declared_latin1_document() {
        let mut xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>1</PMID><Article><ArticleTitle>".to_vec();
        xml.extend_from_slice(b"Caf\xE9 study");
        xml.extend_from_slice(b"</ArticleTitle><AuthorList><Author><LastName>M\xFCller</LastName></Author></AuthorList></Article></MedlineCitation></PubmedArticle></PubmedArticleSet>");

        let citations = PubmedXmlParser.parse_bytes(&xml).unwrap();
        assert_eq!(citations[0].title, "Caf\u{e9} study");
        let author = &citations[0].author_list.as_ref().unwrap()[0];
        assert_eq!(author.last_name.as_deref(), Some("M\u{fc}ller"));
    }
}
