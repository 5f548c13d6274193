use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Mock, Server, ServerGuard};
use predicates::prelude::*;
use serde_json::json;

const APP_API: &str = "/api/client/v2.0/app/app-123";

fn mock_sources(server: &mut ServerGuard) -> Vec<Mock> {
    let url = server.url();

    let page1 = server
        .mock("GET", "/repos/owner/repo/releases?page=1")
        .match_header("authorization", "Bearer gh-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header(
            "link",
            &format!(r#"<{}/repos/owner/repo/releases?page=2>; rel="last""#, url),
        )
        .with_body(
            r#"[{"tag_name": "v2", "assets": [{"name": "basic", "download_count": 10}, {"name": "update", "download_count": 5}]}]"#,
        )
        .expect(1)
        .create();

    let page2 = server
        .mock("GET", "/repos/owner/repo/releases?page=2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"tag_name": "v1", "assets": [{"name": "basic", "download_count": 3}]}]"#)
        .expect(1)
        .create();

    let products = server
        .mock("GET", "/v2/products")
        .match_header("authorization", "Bearer gr-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"products": [{"sales_count": 42}, {"sales_count": 7}]}"#)
        .expect(1)
        .create();

    vec![page1, page2, products]
}

fn mock_login(server: &mut ServerGuard) -> Vec<Mock> {
    let login = server
        .mock("POST", format!("{}/auth/providers/api-key/login", APP_API).as_str())
        .with_status(200)
        .with_body(r#"{"access_token": "session", "user_id": "user-1"}"#)
        .expect(1)
        .create();

    let profile = server
        .mock("GET", "/api/client/v2.0/auth/profile")
        .with_status(200)
        .with_body(r#"{"user_id": "user-1"}"#)
        .expect(1)
        .create();

    vec![login, profile]
}

fn source_args(url: &str) -> Vec<String> {
    vec![
        "--github-token".to_string(),
        "gh-token".to_string(),
        "--storefront-token".to_string(),
        "gr-token".to_string(),
        "--releases-url".to_string(),
        format!("{}/repos/owner/repo/releases", url),
        "--products-url".to_string(),
        format!("{}/v2/products", url),
    ]
}

fn run_command(url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("downloads-sync"));
    cmd.env("RUST_LOG", "info")
        .arg("run")
        .args(source_args(url))
        .args(["--app-id", "app-123", "--app-api-key", "key"])
        .args(["--database", "droptop", "--collection", "stats"])
        .args(["--app-services-url", url])
        .arg("--sentry-dsn")
        .arg(format!("{}/9", url.replace("http://", "http://public@")));
    cmd
}

#[test]
fn test_show_prints_summary() {
    let mut server = Server::new();
    let url = server.url();
    let mocks = mock_sources(&mut server);

    Command::new(cargo::cargo_bin!("downloads-sync"))
        .arg("show")
        .args(source_args(&url))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""basic_downloads": 10"#))
        .stdout(predicate::str::contains(r#""update_downloads": 5"#))
        .stdout(predicate::str::contains(r#""supporter_downloads": 42"#));

    for mock in &mocks {
        mock.assert();
    }
}

#[test]
fn test_show_fails_on_http_error() {
    let mut server = Server::new();
    let url = server.url();

    let _releases = server
        .mock("GET", "/repos/owner/repo/releases?page=1")
        .with_status(404)
        .create();
    let _products = server
        .mock("GET", "/v2/products")
        .with_status(200)
        .with_body(r#"{"products": [{"sales_count": 1}]}"#)
        .create();

    Command::new(cargo::cargo_bin!("downloads-sync"))
        .arg("show")
        .args(source_args(&url))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not Found"));
}

#[test]
fn test_run_end_to_end() {
    let mut server = Server::new();
    let url = server.url();
    let sources = mock_sources(&mut server);
    let session = mock_login(&mut server);

    let upsert = server
        .mock("POST", format!("{}/functions/call", APP_API).as_str())
        .match_header("authorization", "Bearer session")
        .match_body(Matcher::PartialJson(json!({
            "name": "updateOne",
            "service": "mongodb-atlas",
            "arguments": [{
                "database": "droptop",
                "collection": "stats",
                "query": {"title": "downloads"},
                "update": {"$set": {
                    "basic_downloads": 10,
                    "update_downloads": 5,
                    "supporter_downloads": 42
                }},
                "upsert": true
            }]
        })))
        .with_status(200)
        .with_body(r#"{"matchedCount": 1, "modifiedCount": 1}"#)
        .expect(1)
        .create();

    let sentry = server
        .mock("POST", "/api/9/store/")
        .expect(0)
        .create();

    run_command(&url)
        .assert()
        .success()
        .stderr(predicate::str::contains("Downloads updated successfully"));

    for mock in sources.iter().chain(session.iter()) {
        mock.assert();
    }
    upsert.assert();
    sentry.assert();
}

#[test]
fn test_run_reports_failed_write_and_exits_cleanly() {
    let mut server = Server::new();
    let url = server.url();
    let _sources = mock_sources(&mut server);
    let _session = mock_login(&mut server);

    let upsert = server
        .mock("POST", format!("{}/functions/call", APP_API).as_str())
        .with_status(500)
        .expect(1)
        .create();

    let sentry = server
        .mock("POST", "/api/9/store/")
        .match_header("x-sentry-auth", Matcher::Regex("sentry_key=public".to_string()))
        .match_body(Matcher::Regex("Internal Server Error".to_string()))
        .with_status(200)
        .expect(1)
        .create();

    run_command(&url)
        .assert()
        .success()
        .stderr(predicate::str::contains("Error updating downloads"));

    upsert.assert();
    sentry.assert();
}

#[test]
fn test_run_requires_credentials() {
    Command::new(cargo::cargo_bin!("downloads-sync"))
        .env_clear()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--github-token"));
}
