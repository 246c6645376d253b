use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{LaunchOptions, ValidatorRule};
use crate::cookies::CookieBlob;

use super::{BrowserError, BrowserSession};

fn unreachable_options() -> LaunchOptions {
    LaunchOptions {
        chrome_path: Some(PathBuf::from("/nonexistent/chrome")),
        debug_port: 9777,
        ..Default::default()
    }
}

fn og_validators() -> Vec<ValidatorRule> {
    vec![ValidatorRule::new(
        r#"[property="og:description"]"#,
        regex::Regex::new("og:description").unwrap(),
    )]
}

/// A stand-in Chrome debug endpoint: a wiremock `/json/version` pointing at
/// a WebSocket loop that answers every CDP command a session issues.
struct FakeChrome {
    http: MockServer,
    /// Every CDP method received, in order.
    methods: Arc<Mutex<Vec<String>>>,
    /// When set, content extraction evaluates to a page exception.
    fail_content: Arc<AtomicBool>,
}

impl FakeChrome {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_port = listener.local_addr().unwrap().port();
        let methods: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let fail_content = Arc::new(AtomicBool::new(false));

        {
            let methods = methods.clone();
            let fail_content = fail_content.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let methods = methods.clone();
                    let fail_content = fail_content.clone();
                    tokio::spawn(async move {
                        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                        let mut context_seq = 0u32;
                        while let Some(Ok(msg)) = ws.next().await {
                            let Message::Text(text) = msg else { continue };
                            let request: Value = serde_json::from_str(&text).unwrap();
                            let id = request["id"].as_u64().unwrap();
                            let cdp_method = request["method"].as_str().unwrap().to_string();
                            methods.lock().push(cdp_method.clone());

                            let result = match cdp_method.as_str() {
                                "Target.createBrowserContext" => {
                                    context_seq += 1;
                                    json!({"browserContextId": format!("ctx-{context_seq}")})
                                }
                                "Target.createTarget" => json!({"targetId": "target-1"}),
                                "Target.attachToTarget" => json!({"sessionId": "session-1"}),
                                "Storage.getCookies" => json!({"cookies": [{
                                    "name": "srv", "value": "1",
                                    "domain": ".example.com", "path": "/",
                                    "expires": -1.0, "secure": false,
                                    "httpOnly": false, "session": true,
                                }]}),
                                "DOM.getDocument" => json!({"root": {"nodeId": 1}}),
                                "DOM.querySelector" => json!({"nodeId": 7}),
                                "Runtime.evaluate" => {
                                    let expression = request["params"]["expression"]
                                        .as_str()
                                        .unwrap_or_default();
                                    if expression.contains("readyState") {
                                        json!({"result": {"value": "complete"}})
                                    } else if fail_content.load(Ordering::SeqCst) {
                                        json!({"exceptionDetails": {"text": "boom"}})
                                    } else {
                                        json!({"result": {"value":
                                            "<html><head><meta property=\"og:description\"></head></html>"}})
                                    }
                                }
                                _ => json!({}),
                            };

                            let response = json!({"id": id, "result": result}).to_string();
                            if ws.send(Message::Text(response.into())).await.is_err() {
                                break;
                            }
                        }
                    });
                }
            });
        }

        let http = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "Chrome/120.0.0.0",
                "Protocol-Version": "1.3",
                "User-Agent": "Mozilla/5.0",
                "webSocketDebuggerUrl": format!("ws://127.0.0.1:{ws_port}/devtools/browser/fake"),
            })))
            .mount(&http)
            .await;

        Self {
            http,
            methods,
            fail_content,
        }
    }

    fn options(&self) -> LaunchOptions {
        LaunchOptions {
            debug_port: Url::parse(&self.http.uri()).unwrap().port().unwrap(),
            ..Default::default()
        }
    }

    fn count(&self, cdp_method: &str) -> usize {
        self.methods.lock().iter().filter(|m| *m == cdp_method).count()
    }
}

#[tokio::test]
async fn test_try_browser_launch_failure() {
    let mut session =
        BrowserSession::new(unreachable_options(), None, CookieBlob::disabled());

    let result = session
        .try_browser("https://example.com/", &og_validators())
        .await;

    assert!(matches!(result, Err(BrowserError::LaunchFailed(_))));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let mut session =
        BrowserSession::new(unreachable_options(), None, CookieBlob::disabled());

    session.close().await;
    session.close().await;
}

#[tokio::test]
async fn test_reset_context_removes_blob() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cookies.json");
    tokio::fs::write(&path, r#"[{"name":"a","value":"b","domain":"example.com"}]"#)
        .await
        .unwrap();

    let mut session = BrowserSession::new(
        unreachable_options(),
        None,
        CookieBlob::at(path.clone()),
    );

    session.reset_context().await;
    assert!(!path.exists());
}

#[tokio::test]
async fn test_reset_context_recreates_and_reseeds() {
    let fake = FakeChrome::start().await;
    let dir = TempDir::new().unwrap();
    let blob_path = dir.path().join("cookies.json");
    let seed = r#"[{"name":"a","value":"1","domain":"example.com","path":"/","secure":false}]"#;
    tokio::fs::write(&blob_path, seed).await.unwrap();

    let mut session =
        BrowserSession::new(fake.options(), None, CookieBlob::at(blob_path.clone()));
    let validators = og_validators();

    let html = session
        .try_browser("https://example.com/", &validators)
        .await
        .unwrap();
    assert!(html.unwrap().contains("og:description"));
    assert_eq!(fake.count("Target.createBrowserContext"), 1);
    assert_eq!(fake.count("Storage.setCookies"), 1);

    session.reset_context().await;
    assert_eq!(fake.count("Target.disposeBrowserContext"), 1);
    assert!(!blob_path.exists());

    // Put seed cookies back so the next generation's fresh read is visible.
    tokio::fs::write(&blob_path, seed).await.unwrap();

    let html = session
        .try_browser("https://example.com/", &validators)
        .await
        .unwrap();
    assert!(html.is_some());

    // Exactly one new context, seeded again from the re-read blob.
    assert_eq!(fake.count("Target.createBrowserContext"), 2);
    assert_eq!(fake.count("Storage.setCookies"), 2);

    session.close().await;
}

#[tokio::test]
async fn test_failed_content_extraction_still_closes_page() {
    let fake = FakeChrome::start().await;
    fake.fail_content.store(true, Ordering::SeqCst);

    let mut session = BrowserSession::new(fake.options(), None, CookieBlob::disabled());

    let result = session
        .try_browser("https://example.com/", &og_validators())
        .await;

    assert!(matches!(result, Err(BrowserError::Cdp(_))));
    assert_eq!(fake.count("Target.closeTarget"), 1);

    session.close().await;
}
