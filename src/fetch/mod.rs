//! Remote cover acquisition.
//!
//! Given a publication's landing page, try to come away with one image:
//!
//! 1. GET the page. An `image/*` response is saved as-is.
//! 2. An HTML response is mined for `<img>` candidates
//!    ([`candidates::collect_candidates`]): noise like logos and tracking
//!    pixels is filtered out, the rest is shuffled.
//! 3. Candidates are tried in turn; the first one served with an `image/*`
//!    content type wins.
//!
//! Every request is preceded by a fixed pause (`fetch.delay_ms`) and bounded
//! by `fetch.timeout_secs`. Scraping is unreliable by nature, so errors here
//! never stop a build: the resolver logs them and falls back to the
//! placeholder.
//!
//! Picking the first candidate that downloads is effectively random when
//! shuffling is on. No attempt is made to find the "best" or largest image.

pub mod candidates;

use crate::config::FetchConfig;
use rand::seq::SliceRandom;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use ureq::Body;
use ureq::http::Response;
use url::Url;

pub use candidates::collect_candidates;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{url} served {content_type}, expected an image or HTML page")]
    UnsupportedContentType { url: String, content_type: String },
    #[error("no usable image on {url} ({tried} candidates tried)")]
    NoUsableImage { url: String, tried: usize },
}

/// Something that can produce a cover image for a landing page.
///
/// The production implementation is [`RemoteFetcher`]; tests substitute a
/// stub so resolver policy can be exercised offline.
pub trait CoverSource {
    /// Download a cover for `page_url` into `dest`.
    fn fetch_cover(&self, page_url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Blocking HTTP cover fetcher.
pub struct RemoteFetcher {
    agent: ureq::Agent,
    config: FetchConfig,
}

fn content_type(response: &Response<Body>) -> String {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("html")
}

impl RemoteFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(cfg),
            config: config.clone(),
        }
    }

    /// GET after the polite delay.
    fn get(&self, url: &str) -> Result<Response<Body>, FetchError> {
        if self.config.delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.delay_ms));
        }
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .header("User-Agent", self.config.user_agent.as_str())
            .call()?;
        Ok(response)
    }

    /// Save an image response body to `dest`. The body is read completely
    /// before anything is written.
    fn save(response: Response<Body>, dest: &Path) -> Result<(), FetchError> {
        let bytes = response.into_body().read_to_vec()?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, bytes)?;
        Ok(())
    }

    /// `Ok(true)` when the candidate was an image and has been saved.
    fn try_candidate(&self, candidate: &Url, dest: &Path) -> Result<bool, FetchError> {
        let response = self.get(candidate.as_str())?;
        if !is_image(&content_type(&response)) {
            return Ok(false);
        }
        Self::save(response, dest)?;
        Ok(true)
    }
}

impl CoverSource for RemoteFetcher {
    fn fetch_cover(&self, page_url: &str, dest: &Path) -> Result<(), FetchError> {
        let page = Url::parse(page_url)?;
        let response = self.get(page.as_str())?;
        let content_type = content_type(&response);

        if is_image(&content_type) {
            log::info!("{page} is an image, saving directly");
            return Self::save(response, dest);
        }
        if !is_html(&content_type) {
            return Err(FetchError::UnsupportedContentType {
                url: page.to_string(),
                content_type,
            });
        }

        let html = response.into_body().read_to_string()?;
        let mut found = collect_candidates(&html, &page, &self.config);
        if self.config.shuffle {
            found.shuffle(&mut rand::thread_rng());
        }
        let tried = found.len();

        for candidate in &found {
            match self.try_candidate(candidate, dest) {
                Ok(true) => {
                    log::info!("cover for {page}: {candidate}");
                    return Ok(());
                }
                Ok(false) => log::debug!("{candidate}: not an image"),
                Err(e) => log::debug!("{candidate}: {e}"),
            }
        }

        Err(FetchError::NoUsableImage {
            url: page.to_string(),
            tried,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn offline_config() -> FetchConfig {
        FetchConfig {
            delay_ms: 0,
            timeout_secs: 2,
            ..FetchConfig::default()
        }
    }

    /// Document order, no pause.
    fn ordered_config() -> FetchConfig {
        FetchConfig {
            shuffle: false,
            ..offline_config()
        }
    }

    // =========================================================================
    // Local HTTP server
    // =========================================================================

    /// Serves canned responses on an ephemeral 127.0.0.1 port.
    ///
    /// Routes map a request path to a content type and body; any other path
    /// gets a 404. Request paths are recorded in arrival order.
    struct TestServer {
        base: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl TestServer {
        fn start(routes: &[(&str, &str, &[u8])]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let routes: HashMap<String, (String, Vec<u8>)> = routes
                .iter()
                .map(|(path, ct, body)| (path.to_string(), (ct.to_string(), body.to_vec())))
                .collect();
            let requests = Arc::new(Mutex::new(Vec::new()));
            let log = Arc::clone(&requests);

            std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { continue };
                    let Some(path) = read_request_path(&mut stream) else {
                        continue;
                    };
                    log.lock().unwrap().push(path.clone());
                    let response = match routes.get(&path) {
                        Some((ct, body)) => http_response("200 OK", ct, body),
                        None => http_response("404 Not Found", "text/plain", b"not found"),
                    };
                    let _ = stream.write_all(&response);
                }
            });

            Self { base, requests }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn read_request_path(stream: &mut TcpStream) -> Option<String> {
        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).ok()?;
            if n == 0 {
                return None;
            }
            head.extend_from_slice(&chunk[..n]);
        }
        let head = String::from_utf8_lossy(&head);
        head.lines()
            .next()?
            .split_whitespace()
            .nth(1)
            .map(str::to_string)
    }

    fn http_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn content_type_predicates() {
        assert!(is_image("image/jpeg"));
        assert!(is_image("image/png; charset=binary"));
        assert!(!is_image("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(!is_html("application/pdf"));
        assert!(!is_image(""));
    }

    #[test]
    fn invalid_page_url_is_error() {
        let tmp = TempDir::new().unwrap();
        let fetcher = RemoteFetcher::new(&offline_config());
        let result = fetcher.fetch_cover("not a url", &tmp.path().join("x.jpg"));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn unreachable_host_is_http_error_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("x.jpg");
        let fetcher = RemoteFetcher::new(&offline_config());
        let result = fetcher.fetch_cover("http://127.0.0.1:9/paper", &dest);
        assert!(matches!(result, Err(FetchError::Http(_))));
        assert!(!dest.exists());
    }

    // =========================================================================
    // fetch_cover
    // =========================================================================

    #[test]
    fn image_page_is_saved_directly() {
        let server = TestServer::start(&[("/cover.png", "image/png", b"png bytes".as_slice())]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("original/2021_Smith_Foo.jpg");

        RemoteFetcher::new(&ordered_config())
            .fetch_cover(&server.url("/cover.png"), &dest)
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"png bytes");
        assert_eq!(server.requests(), vec!["/cover.png"]);
    }

    #[test]
    fn html_candidates_tried_in_document_order() {
        let page = r#"<html><body>
            <img src="/gone.jpg">
            <img src="/first.jpg">
            <img src="/second.jpg">
        </body></html>"#;
        let server = TestServer::start(&[
            ("/paper", "text/html; charset=utf-8", page.as_bytes()),
            ("/first.jpg", "image/jpeg", b"first".as_slice()),
            ("/second.jpg", "image/jpeg", b"second".as_slice()),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("cover.jpg");

        RemoteFetcher::new(&ordered_config())
            .fetch_cover(&server.url("/paper"), &dest)
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"first");
        assert_eq!(server.requests(), vec!["/paper", "/gone.jpg", "/first.jpg"]);
    }

    #[test]
    fn html_candidate_is_skipped_for_next_image() {
        let page = r#"<img src="/frame.jpg"><img src="/cover.jpg">"#;
        let server = TestServer::start(&[
            ("/paper", "text/html", page.as_bytes()),
            ("/frame.jpg", "text/html", b"<html>login</html>".as_slice()),
            ("/cover.jpg", "image/jpeg", b"cover".as_slice()),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("cover.jpg");

        RemoteFetcher::new(&ordered_config())
            .fetch_cover(&server.url("/paper"), &dest)
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"cover");
        assert_eq!(server.requests(), vec!["/paper", "/frame.jpg", "/cover.jpg"]);
    }

    #[test]
    fn pdf_page_is_unsupported() {
        let server = TestServer::start(&[(
            "/paper.pdf",
            "application/pdf",
            b"%PDF-1.7".as_slice(),
        )]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("cover.jpg");

        let result =
            RemoteFetcher::new(&ordered_config()).fetch_cover(&server.url("/paper.pdf"), &dest);

        match result {
            Err(FetchError::UnsupportedContentType { content_type, .. }) => {
                assert_eq!(content_type, "application/pdf")
            }
            other => panic!("expected UnsupportedContentType, got {other:?}"),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn page_without_usable_image_writes_nothing() {
        let page = r#"<img src="/gone.jpg"><img src="/frame.jpg">"#;
        let server = TestServer::start(&[
            ("/paper", "text/html", page.as_bytes()),
            ("/frame.jpg", "text/html", b"<html></html>".as_slice()),
        ]);
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("original/cover.jpg");

        let result =
            RemoteFetcher::new(&ordered_config()).fetch_cover(&server.url("/paper"), &dest);

        assert!(matches!(result, Err(FetchError::NoUsableImage { tried: 2, .. })));
        assert!(!dest.exists());
        assert!(!tmp.path().join("original").exists());
        assert_eq!(server.requests(), vec!["/paper", "/gone.jpg", "/frame.jpg"]);
    }
}
