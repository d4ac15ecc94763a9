//! End-to-end tests of the command-line commands, using mocked endpoints and a temporary store

use compare_pulse_lib::commands::TestHost;
use compare_pulse_lib::run;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A temporary directory holding a settings file pointed at the mock server, plus a store.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(server: &MockServer) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let settings = format!(
            r#"
cache_ttl = "1h"
github_api_url = "{uri}"
npm_downloads_url = "{uri}"
npm_registry_url = "{uri}"
request_timeout = "5s"
max_retries = 0
"#,
            uri = server.uri()
        );
        fs::write(dir.path().join("pulse.toml"), settings).expect("write settings");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn common_args(&self) -> Vec<String> {
        vec![
            "--config".to_string(),
            path_str(&self.path("pulse.toml")),
            "--store-dir".to_string(),
            path_str(&self.path("store")),
            "--color".to_string(),
            "never".to_string(),
        ]
    }

    async fn run(&self, host: &mut TestHost, command: &[&str]) -> compare_pulse_lib::Result<()> {
        let mut args: Vec<String> = vec!["compare-pulse".to_string()];
        args.extend(command.iter().map(ToString::to_string));
        args.extend(self.common_args());
        run(host, args).await
    }
}

fn path_str(path: &Path) -> String {
    path.to_str().expect("valid path").to_string()
}

async fn mount_openspec(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/Fission-AI/OpenSpec"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stargazers_count": 2500,
            "forks_count": 150,
            "subscribers_count": 20,
            "open_issues_count": 12
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/Fission-AI/OpenSpec/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{}, {}, {}])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/Fission-AI/OpenSpec/stats/commit_activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "total": 4 }, { "total": 6 }, { "total": 1 }, { "total": 9 }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/downloads/point/last-week/@fission-ai/openspec"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "downloads": 31_337 })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/@fission-ai%2Fopenspec"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dist-tags": { "latest": "0.9.1" },
            "maintainers": [{ "name": "one" }]
        })))
        .mount(server)
        .await;
}

async fn configure_openspec(ws: &Workspace) {
    let mut host = TestHost::new();
    ws.run(
        &mut host,
        &[
            "config",
            "set",
            "openspec",
            "--repo",
            "https://github.com/Fission-AI/OpenSpec",
            "--package",
            "@fission-ai/openspec",
        ],
    )
    .await
    .expect("config set");
}

#[tokio::test]
async fn test_init_writes_default_settings() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temp_dir.path().join("generated.toml");

    let mut host = TestHost::new();
    run(&mut host, ["compare-pulse", "init", output.to_str().expect("valid path")])
        .await
        .expect("init");

    let text = fs::read_to_string(&output).expect("read generated settings");
    assert!(text.contains("cache_ttl"));
    assert!(text.contains("github_api_url"));
    assert!(host.output_text().contains("Generated default settings file"));
}

#[tokio::test]
async fn test_config_set_and_show() {
    let server = MockServer::start().await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let mut host = TestHost::new();
    ws.run(&mut host, &["config", "show"]).await.expect("config show");

    let output = host.output_text();
    assert!(output.contains("openspec"));
    assert!(output.contains("Fission-AI/OpenSpec (from 'https://github.com/Fission-AI/OpenSpec')"));
    assert!(output.contains("@fission-ai/openspec"));
    assert!(output.contains("speckit"));
    assert!(output.contains("not configured"));

    let mut host = TestHost::new();
    ws.run(&mut host, &["config", "show", "--json"]).await.expect("config show --json");
    let parsed: Value = serde_json::from_str(&host.output_text()).expect("valid JSON");
    assert_eq!(parsed["openspec"]["githubRepo"], "https://github.com/Fission-AI/OpenSpec");
    assert_eq!(parsed["openspec"]["npmPkg"], "@fission-ai/openspec");
    assert_eq!(parsed["speckit"]["name"], "SpecKit");
}

#[tokio::test]
async fn test_config_set_warns_about_malformed_repository() {
    let server = MockServer::start().await;
    let ws = Workspace::new(&server);

    let mut host = TestHost::new();
    ws.run(&mut host, &["config", "set", "speckit", "--repo", "spec kit"])
        .await
        .expect("config set");

    assert!(host.error_text().contains("not a recognizable repository reference"));
}

#[tokio::test]
async fn test_refresh_json_then_show_from_cache() {
    let server = MockServer::start().await;
    mount_openspec(&server).await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh", "--json"]).await.expect("refresh");

    let parsed: Value = serde_json::from_str(&host.output_text()).expect("valid JSON");
    let openspec = &parsed["metrics"]["openspec"];
    assert_eq!(openspec["stars"], 2500);
    assert_eq!(openspec["forks"], 150);
    assert_eq!(openspec["releases"], 3);
    assert_eq!(openspec["commits4w"], json!([4, 6, 1, 9]));
    assert_eq!(openspec["npmDownloads"], 31_337);
    assert_eq!(openspec["npmVersion"], "0.9.1");
    assert_eq!(parsed["metrics"]["speckit"]["stars"], 0);

    let requests = server.received_requests().await.map_or(0, |r| r.len());

    let mut host = TestHost::new();
    ws.run(&mut host, &["show"]).await.expect("show");

    let output = host.output_text();
    assert!(output.contains("Stars"));
    assert!(output.contains("2,500"));
    assert!(output.contains("4 / 6 / 1 / 9 (20)"));
    assert!(host.error_text().is_empty(), "unexpected errors: {}", host.error_text());
    assert_eq!(server.received_requests().await.map_or(0, |r| r.len()), requests);
}

#[tokio::test]
async fn test_refresh_table_reports_cache_use() {
    let server = MockServer::start().await;
    mount_openspec(&server).await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh"]).await.expect("first refresh");
    assert!(!host.output_text().contains("served from cache"));

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh"]).await.expect("second refresh");
    assert!(host.output_text().contains("OpenSpec: values served from cache"));

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh", "--ignore-cached"]).await.expect("forced refresh");
    assert!(!host.output_text().contains("OpenSpec: values served from cache"));
}

#[tokio::test]
async fn test_refresh_exit_code_on_incomplete_metrics() {
    let server = MockServer::start().await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh", "--ignore-cached"]).await.expect("refresh");
    assert_eq!(host.exit_code, None);
    assert!(host.output_text().contains("OpenSpec: could not fetch"));

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh", "--ignore-cached", "--error-if-incomplete"])
        .await
        .expect("refresh");
    assert_eq!(host.exit_code, Some(1));
    assert!(host.error_text().contains("could not be fetched"));
}

#[tokio::test]
async fn test_refresh_exit_code_when_complete() {
    let server = MockServer::start().await;
    mount_openspec(&server).await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh", "--error-if-incomplete"]).await.expect("refresh");
    assert_eq!(host.exit_code, None);
    assert!(host.error_text().is_empty(), "unexpected errors: {}", host.error_text());
}

#[tokio::test]
async fn test_clear_cache_then_show_has_nothing_cached() {
    let server = MockServer::start().await;
    mount_openspec(&server).await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let mut host = TestHost::new();
    ws.run(&mut host, &["refresh"]).await.expect("refresh");

    let mut host = TestHost::new();
    ws.run(&mut host, &["clear-cache"]).await.expect("clear-cache");
    assert!(host.output_text().contains("Cleared cached metrics for OpenSpec and SpecKit"));

    let mut host = TestHost::new();
    ws.run(&mut host, &["show"]).await.expect("show");
    assert!(host.error_text().contains("No cached metrics for OpenSpec and SpecKit"));
}

#[tokio::test]
async fn test_export_writes_document() {
    let server = MockServer::start().await;
    mount_openspec(&server).await;
    let ws = Workspace::new(&server);
    configure_openspec(&ws).await;

    let output = path_str(&ws.path("export.json"));

    let mut host = TestHost::new();
    ws.run(&mut host, &["export", &output, "--refresh"]).await.expect("export");
    assert!(host.output_text().contains("Exported community data to"));

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&output).expect("read export")).expect("valid JSON");
    assert_eq!(parsed["config"]["openspec"]["npmPkg"], "@fission-ai/openspec");
    assert_eq!(parsed["metrics"]["openspec"]["stars"], 2500);
}

#[tokio::test]
async fn test_invalid_settings_file_is_rejected() {
    let server = MockServer::start().await;
    let ws = Workspace::new(&server);
    fs::write(ws.path("pulse.toml"), "cache_ttl = \"0s\"\n").expect("write settings");

    let mut host = TestHost::new();
    let result = ws.run(&mut host, &["show"]).await;
    assert!(result.is_err());
}
