//! Common test utilities for the XML fixtures and mocked fetchers
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ncbiutils::{Fetch, FetchResponse, HttpMethod, NcbiError, Result};

const TEST_DATA: &str = "tests/integration/test_data";

/// Path of a fixture under `tests/integration/test_data/<dialect>/`
pub fn fixture_path(dialect: &str, filename: &str) -> PathBuf {
    Path::new(TEST_DATA).join(dialect).join(filename)
}

/// Raw bytes of a fixture, panicking with the path if it is missing
pub fn read_fixture(dialect: &str, filename: &str) -> Vec<u8> {
    let path = fixture_path(dialect, filename);
    fs::read(&path).unwrap_or_else(|_| panic!("Failed to read XML fixture: {:?}", path))
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// One request seen by [`ScriptedFetch`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Responder = Box<dyn Fn(&RecordedRequest) -> Result<FetchResponse> + Send + Sync>;

/// In-memory [`Fetch`] that records requests and answers through a closure
pub struct ScriptedFetch {
    responder: Responder,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedFetch {
    pub fn new<R>(responder: R) -> Self
    where
        R: Fn(&RecordedRequest) -> Result<FetchResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers 200 with `body`
    pub fn always(body: Vec<u8>) -> Self {
        Self::new(move |_| Ok(FetchResponse::new(200, body.clone())))
    }

    /// Shared handle to the recorded requests, usable after the fetcher moves
    pub fn request_log(&self) -> Arc<Mutex<Vec<RecordedRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl Fetch for ScriptedFetch {
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
    ) -> Result<FetchResponse> {
        let request = RecordedRequest {
            method,
            url: url.to_string(),
            params: params.to_vec(),
        };
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// A PubmedArticleSet with one minimal record per id
pub fn pubmed_set_for(ids: &str) -> Vec<u8> {
    let mut xml = String::from("<PubmedArticleSet>");
    for id in ids.split(',').filter(|id| !id.is_empty()) {
        xml.push_str(&format!(
            "<PubmedArticle><MedlineCitation><PMID>{id}</PMID>\
             <Article><ArticleTitle>Article {id}</ArticleTitle></Article>\
             </MedlineCitation></PubmedArticle>"
        ));
    }
    xml.push_str("</PubmedArticleSet>");
    xml.into_bytes()
}

pub fn service_unavailable() -> NcbiError {
    NcbiError::ApiError {
        status: 503,
        message: "HTTP 503 Service Unavailable: Service Unavailable".to_string(),
    }
}
