//! End-to-end tests for the `ggrama` binary
//!
//! Each test points the binary at a wiremock llama-server and a throwaway HOME,
//! so only the bundled resources and the files created here are visible.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    home: TempDir,
    model: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let models = home.path().join("models");
        fs::create_dir_all(&models).unwrap();
        let model = models.join("tiny.gguf");
        fs::write(&model, b"GGUF").unwrap();
        Self { home, model }
    }

    fn root(&self) -> &Path {
        self.home.path()
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ggrama").unwrap();
        cmd.env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join(".config"))
            .env_remove("GGRAMA_LOG")
            .current_dir(self.root());
        cmd
    }
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "tiny",
        "choices": [{ "text": text, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 30, "completion_tokens": 7 }
    }))
}

async fn server_answering(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(completion(text))
        .mount(&server)
        .await;
    server
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|req| serde_json::from_slice(&req.body).unwrap())
        .collect()
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking<F>(f: F)
where
    F: FnOnce() + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn prints_pretty_json_for_the_bundled_answer_schema() {
    let fixture = Fixture::new();
    let server = server_answering(r#"{"answer": "Rayleigh scattering"}"#).await;

    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "answer", "-M"])
        .arg(&fixture.model)
        .args(["why", "is", "the", "sky", "blue"]);
    run_blocking(move || {
        cmd.assert()
            .success()
            .stdout("{\n  \"answer\": \"Rayleigh scattering\"\n}\n");
    })
    .await;

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body["model"], "tiny");
    assert!(body.get("max_tokens").is_none());
    assert!(body["prompt"]
        .as_str()
        .unwrap()
        .contains("### Instruction:\nwhy is the sky blue\n"));
    assert!(body["grammar"].as_str().unwrap().starts_with("root ::= "));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn output_file_gets_compact_json() {
    let fixture = Fixture::new();
    let server = server_answering(r#"{"answer": "42"}"#).await;
    let out = fixture.root().join("result.json");

    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "answer", "-M"])
        .arg(&fixture.model)
        .arg("-o")
        .arg(&out)
        .arg("meaning of life");
    run_blocking(move || {
        cmd.assert().success().stdout(predicate::str::is_empty());
    })
    .await;

    assert_eq!(fs::read_to_string(&out).unwrap(), r#"{"answer":"42"}"#);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn prompt_is_read_from_stdin_and_input_file_fills_input_data() {
    let fixture = Fixture::new();
    let server = server_answering(r#"{"answer": "csv"}"#).await;

    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "answer", "-M"])
        .arg(&fixture.model)
        .write_stdin("what format is this?\n");
    run_blocking(move || {
        cmd.assert().success();
    })
    .await;

    let input = fixture.write("data.txt", "a,b\n1,2\n");
    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "answer", "-M"])
        .arg(&fixture.model)
        .arg("-i")
        .arg(&input)
        .write_stdin("ignored when --input is given");
    run_blocking(move || {
        cmd.assert().success();
    })
    .await;

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let first = bodies[0]["prompt"].as_str().unwrap();
    assert!(first.contains("### Instruction:\nwhat format is this?\n"));
    let second = bodies[1]["prompt"].as_str().unwrap();
    assert!(second.contains("### Input:\na,b\n1,2\n"));
    assert!(!second.contains("ignored"));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn later_config_files_and_flags_win() {
    let fixture = Fixture::new();
    let server = server_answering(r#"{"answer": "layered"}"#).await;

    let first = fixture.write(
        "first.json",
        r#"{
            "endpoint": "http://127.0.0.1:9",
            "model_name": "missing.gguf",
            "model_paths": ["/nonexistent"],
            "schema_name": "nope"
        }"#,
    );
    let second = fixture.write(
        "second.toml",
        &format!(
            "endpoint = \"{}\"\nmodel_name = \"tiny\"\nmodel_paths = [\"models\"]\n",
            server.uri()
        ),
    );

    let mut cmd = fixture.command();
    cmd.arg("-c")
        .arg(&first)
        .arg("-c")
        .arg(&second)
        .args(["-s", "answer", "hello"]);
    run_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"answer\": \"layered\""));
    })
    .await;

    assert_eq!(request_bodies(&server).await.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn gbnf_schemas_are_used_verbatim() {
    let fixture = Fixture::new();
    let server = server_answering(r#"{"ok": true}"#).await;

    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "json", "-M"])
        .arg(&fixture.model)
        .arg("anything");
    run_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"ok\": true"));
    })
    .await;

    let bodies = request_bodies(&server).await;
    assert!(bodies[0]["grammar"]
        .as_str()
        .unwrap()
        .starts_with("root   ::= object"));
}

#[test]
#[serial]
fn missing_schema_fails_with_searched_paths() {
    let fixture = Fixture::new();

    fixture
        .command()
        .args(["--endpoint", "http://127.0.0.1:9", "-s", "no-such-schema", "-M"])
        .arg(&fixture.model)
        .arg("hello")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error: schema 'no-such-schema' not found in: "))
        .stderr(predicate::str::contains("schemas"));
}

#[test]
#[serial]
fn missing_model_name_is_reported() {
    let fixture = Fixture::new();

    fixture
        .command()
        .args(["-s", "answer", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no model name configured"));
}

#[test]
#[serial]
fn empty_prompt_is_an_error() {
    let fixture = Fixture::new();

    fixture
        .command()
        .args(["-s", "answer", "-M"])
        .arg(&fixture.model)
        .write_stdin("   \n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no prompt given"));
}

#[test]
#[serial]
fn unparseable_config_file_is_reported() {
    let fixture = Fixture::new();
    let broken = fixture.write("broken.json", "{ model_name: ");

    fixture
        .command()
        .arg("-c")
        .arg(&broken)
        .arg("hello")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load configuration"))
        .stderr(predicate::str::contains("broken.json"));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn non_json_model_output_fails() {
    let fixture = Fixture::new();
    let server = server_answering("{\"answer\": ").await;

    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "answer", "-M"])
        .arg(&fixture.model)
        .arg("hello");
    run_blocking(move || {
        cmd.assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("model output is not valid JSON"));
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn server_errors_fail_the_run() {
    let fixture = Fixture::new();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
        .mount(&server)
        .await;

    let mut cmd = fixture.command();
    cmd.args(["--endpoint", server.uri().as_str(), "-s", "answer", "-M"])
        .arg(&fixture.model)
        .arg("hello");
    run_blocking(move || {
        cmd.assert()
            .code(1)
            .stderr(predicate::str::contains("503"))
            .stderr(predicate::str::contains("loading model"));
    })
    .await;
}

#[cfg(not(feature = "llama-cpp"))]
#[test]
#[serial]
fn llama_cpp_backend_needs_the_feature() {
    let fixture = Fixture::new();

    fixture
        .command()
        .args(["--backend", "llama-cpp", "-s", "answer", "-M"])
        .arg(&fixture.model)
        .arg("hello")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("llama-cpp backend is not compiled in"));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn flags_after_prompt_words_still_apply() {
    let fixture = Fixture::new();
    let server = server_answering(r#"{"answer": "Paris"}"#).await;

    let mut cmd = fixture.command();
    cmd.args(["capital", "of", "France", "-s", "answer", "--endpoint"])
        .arg(server.uri())
        .arg("-M")
        .arg(&fixture.model);
    run_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"answer\": \"Paris\""));
    })
    .await;

    let bodies = request_bodies(&server).await;
    assert!(bodies[0]["prompt"]
        .as_str()
        .unwrap()
        .contains("### Instruction:\ncapital of France\n"));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn timeout_flag_bounds_the_server_request() {
    let fixture = Fixture::new();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(completion(r#"{"answer": "late"}"#).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut cmd = fixture.command();
    cmd.args(["--timeout", "1", "-s", "answer", "--endpoint"])
        .arg(server.uri())
        .arg("-M")
        .arg(&fixture.model)
        .arg("hello");
    run_blocking(move || {
        cmd.assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("llama-server"));
    })
    .await;
}
