use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use url::Url;

use super::*;
use crate::cookies::CookieBlob;

fn write_blob(dir: &tempfile::TempDir, json: &str) -> CookieBlob {
    let path = dir.path().join("cookies.json");
    std::fs::write(&path, json).unwrap();
    CookieBlob::at(path)
}

fn set_cookie(jar: &SyncedJar, line: &str, url: &Url) {
    let value = HeaderValue::from_str(line).unwrap();
    let mut iter = std::iter::once(&value);
    jar.set_cookies(&mut iter, url);
}

#[tokio::test]
async fn test_sync_loads_persisted_cookies() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(
        &dir,
        r#"[{"name":"a","value":"1","domain":"example.com","path":"/","expires":"2030-01-01T00:00:00Z","secure":false}]"#,
    );
    let jar = SyncedJar::new(blob);

    jar.sync().await;

    assert_eq!(jar.known_cookies(), 1);
    let header = jar.cookies(&Url::parse("http://example.com/").unwrap()).unwrap();
    assert_eq!(header.to_str().unwrap(), "a=1");
}

#[tokio::test]
async fn test_persisted_cookies_apply_to_subdomains() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(
        &dir,
        r#"[{"name":"a","value":"1","domain":"example.com","path":"/","secure":false}]"#,
    );
    let jar = SyncedJar::new(blob);

    jar.sync().await;

    let header = jar
        .cookies(&Url::parse("http://www.example.com/").unwrap())
        .unwrap();
    assert_eq!(header.to_str().unwrap(), "a=1");
}

#[tokio::test]
async fn test_missing_blob_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(
        &dir,
        r#"[{"name":"a","value":"1","domain":"example.com","path":"/","secure":false}]"#,
    );
    let jar = SyncedJar::new(blob.clone());
    jar.sync().await;
    assert_eq!(jar.known_cookies(), 1);

    std::fs::remove_file(blob.path().unwrap()).unwrap();
    jar.sync().await;

    // No-op: the previous jar state survives.
    assert_eq!(jar.known_cookies(), 1);
    assert!(jar.cookies(&Url::parse("http://example.com/").unwrap()).is_some());
}

#[tokio::test]
async fn test_malformed_blob_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(
        &dir,
        r#"[{"name":"a","value":"1","domain":"example.com","path":"/","secure":false}]"#,
    );
    let jar = SyncedJar::new(blob.clone());
    jar.sync().await;

    std::fs::write(blob.path().unwrap(), b"{\"not\":\"a list\"}").unwrap();
    jar.sync().await;

    assert_eq!(jar.known_cookies(), 1);
}

#[tokio::test]
async fn test_response_cookies_accumulate() {
    let dir = tempfile::tempdir().unwrap();
    let jar = SyncedJar::new(CookieBlob::at(dir.path().join("cookies.json")));
    let url = Url::parse("http://example.com/").unwrap();

    set_cookie(&jar, "session=abc; Path=/", &url);

    assert_eq!(jar.known_cookies(), 1);
    let header = jar.cookies(&url).unwrap();
    assert_eq!(header.to_str().unwrap(), "session=abc");
}

#[tokio::test]
async fn test_both_sources_merge_into_one_header() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(
        &dir,
        r#"[{"name":"persisted","value":"p","domain":"example.com","path":"/","secure":false}]"#,
    );
    let jar = SyncedJar::new(blob);
    let url = Url::parse("http://example.com/").unwrap();

    jar.sync().await;
    set_cookie(&jar, "own=o; Path=/", &url);

    let header = jar.cookies(&url).unwrap();
    let line = header.to_str().unwrap();
    assert!(line.contains("persisted=p"));
    assert!(line.contains("own=o"));
    assert_eq!(jar.known_cookies(), 2);
}

#[tokio::test]
async fn test_reset_clears_then_resyncs() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(
        &dir,
        r#"[{"name":"persisted","value":"p","domain":"example.com","path":"/","secure":false}]"#,
    );
    let jar = SyncedJar::new(blob);
    let url = Url::parse("http://example.com/").unwrap();

    jar.sync().await;
    set_cookie(&jar, "session=abc; Path=/", &url);
    assert_eq!(jar.known_cookies(), 2);

    jar.reset().await;

    // The response-fed cookie is gone, the persisted one is re-loaded.
    assert_eq!(jar.known_cookies(), 1);
    assert_eq!(jar.cookies(&url).unwrap().to_str().unwrap(), "persisted=p");
}

#[tokio::test]
async fn test_reset_with_no_blob_empties_jar() {
    let dir = tempfile::tempdir().unwrap();
    let jar = SyncedJar::new(CookieBlob::at(dir.path().join("cookies.json")));
    let url = Url::parse("http://example.com/").unwrap();

    set_cookie(&jar, "session=abc; Path=/", &url);
    jar.reset().await;

    assert_eq!(jar.known_cookies(), 0);
    assert!(jar.cookies(&url).is_none());
}

#[tokio::test]
async fn test_records_without_domain_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let blob = write_blob(&dir, r#"[{"name":"a","value":"1"}]"#);
    let jar = SyncedJar::new(blob);

    jar.sync().await;

    assert_eq!(jar.known_cookies(), 0);
}
