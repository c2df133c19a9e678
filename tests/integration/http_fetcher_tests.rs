//! Integration tests for the reqwest-backed fetcher using mocked HTTP responses
//!
//! They use wiremock to simulate NCBI endpoints; no real API calls are made.

use futures_util::TryStreamExt;
use ncbiutils::{
    Chunk, ClientConfig, Efetch, Fetch, FetchOptions, HttpFetcher, HttpMethod, NcbiError,
};
use rstest::rstest;
use tracing_test::traced_test;
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TWO_ARTICLES: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
    <PubmedArticle>
        <MedlineCitation><PMID Version="1">31302001</PMID>
            <Article><ArticleTitle>SENP1-Sirt3 Signaling Controls Mitochondrial Protein Acetylation</ArticleTitle></Article>
        </MedlineCitation>
    </PubmedArticle>
    <PubmedArticle>
        <MedlineCitation><PMID Version="1">22454523</PMID>
            <Article><ArticleTitle>Botulinum neurotoxin D-C uses synaptotagmin I and II as receptors</ArticleTitle></Article>
        </MedlineCitation>
    </PubmedArticle>
</PubmedArticleSet>"#;

fn mock_config(mock_server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(mock_server.uri())
        .with_rate_limit(100.0) // High rate limit for tests
}

fn fetcher(mock_server: &MockServer) -> HttpFetcher {
    HttpFetcher::new(&mock_config(mock_server)).expect("client should build")
}

#[rstest]
#[case(200)]
#[case(204)]
#[tokio::test]
async fn test_success_status_returns_body(#[case] status: u16) {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(status).set_body_string(match status {
            204 => "",
            _ => "payload",
        }))
        .mount(&mock_server)
        .await;

    let response = fetcher(&mock_server)
        .fetch(HttpMethod::Get, &format!("{}/ok", mock_server.uri()), &[])
        .await
        .expect("2xx should succeed");

    assert_eq!(response.status, status);
    if status == 200 {
        assert_eq!(response.text(), "payload");
    }
}

#[rstest]
#[case(400)]
#[case(404)]
#[case(500)]
#[tokio::test]
async fn test_error_status_becomes_api_error(#[case] status: u16) {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&mock_server)
        .await;

    let err = fetcher(&mock_server)
        .fetch(HttpMethod::Get, &mock_server.uri(), &[])
        .await
        .unwrap_err();

    match err {
        NcbiError::ApiError { status: got, ref message } => {
            assert_eq!(got, status);
            assert!(message.starts_with(&format!("HTTP {status}")));
        }
        ref other => panic!("expected ApiError, got {other:?}"),
    }
    assert!(err.is_transport_error());
}

#[tokio::test]
#[traced_test]
async fn test_get_sends_query_parameters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = vec![("db".to_string(), "pubmed".to_string())];
    fetcher(&mock_server)
        .fetch(
            HttpMethod::Get,
            &format!("{}/esearch.fcgi", mock_server.uri()),
            &params,
        )
        .await
        .unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_user_agent_carries_contact_email() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_regex(
            "user-agent",
            r"^ncbiutils-rs/\S+ \(mailto:me@example\.com\)$",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = mock_config(&mock_server).with_email("me@example.com");
    HttpFetcher::new(&config)
        .unwrap()
        .fetch(HttpMethod::Get, &mock_server.uri(), &[])
        .await
        .unwrap();
}

#[tokio::test]
#[traced_test]
async fn test_efetch_posts_form_batches() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/efetch.fcgi"))
        .and(body_string_contains("db=pubmed"))
        .and(body_string_contains("id=31302001%2C22454523"))
        .and(body_string_contains("retmode=xml"))
        .and(body_string_contains("retstart=0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TWO_ARTICLES)
                .insert_header("content-type", "application/xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let efetch = Efetch::new(mock_config(&mock_server), FetchOptions::default()).unwrap();
    let chunks: Vec<Chunk> = efetch
        .chunks(vec!["31302001".to_string(), "22454523".to_string()])
        .try_collect()
        .await
        .unwrap();

    assert_eq!(chunks.len(), 1);
    let citations = chunks[0].citations().expect("batch should succeed");
    assert_eq!(citations.len(), 2);
    assert!(citations[1].title.contains("synaptotagmin"));
}

#[tokio::test]
#[traced_test]
async fn test_efetch_server_error_isolated_to_batch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("id=2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_ARTICLES))
        .mount(&mock_server)
        .await;

    let config = mock_config(&mock_server).with_retmax(1);
    let efetch = Efetch::new(config, FetchOptions::default()).unwrap();
    let chunks: Vec<Chunk> = efetch
        .chunks(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        .try_collect()
        .await
        .unwrap();

    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].is_ok());
    assert!(matches!(
        chunks[1].error(),
        Some(NcbiError::ApiError { status: 500, .. })
    ));
    assert_eq!(chunks[1].ids, vec!["2".to_string()]);
    assert!(chunks[2].is_ok());
}
