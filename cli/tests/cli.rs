use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Canned `(path, status, body)` routes served from a background thread
fn spawn_server(routes: Vec<(&'static str, u16, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            handle(stream, &routes);
        }
    });

    format!("http://{}", addr)
}

fn handle(mut stream: TcpStream, routes: &[(&'static str, u16, String)]) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let (status, body) = routes
        .iter()
        .find(|(route, _, _)| *route == path)
        .map(|(_, status, body)| (*status, body.clone()))
        .unwrap_or((404, "no such route".to_string()));

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

fn models_route(ids: &[&str]) -> (&'static str, u16, String) {
    let data: Vec<_> = ids.iter().map(|id| json!({"id": id, "object": "model"})).collect();
    ("/v1/models", 200, json!({ "data": data }).to_string())
}

fn chat_route(answer: &str) -> (&'static str, u16, String) {
    let body = json!({
        "id": "chatcmpl-1",
        "model": "local-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": answer},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    });
    ("/v1/chat/completions", 200, body.to_string())
}

/// The binary in an empty directory with none of the probe variables set
fn lmprobe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lmprobe").expect("lmprobe binary");
    cmd.current_dir(dir.path())
        .env_remove("LMSTUDIO_API_BASE")
        .env_remove("OLLAMA_API_BASE")
        .env_remove("CAI_MODEL")
        .env_remove("LMSTUDIO_API_KEY")
        .env_remove("LMPROBE_AGENT")
        .env_remove("LMPROBE_TIMEOUT_SECS")
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn agents_lists_builtin_agents() {
    let dir = TempDir::new().unwrap();
    lmprobe(&dir)
        .arg("agents")
        .assert()
        .success()
        .stdout(predicate::str::contains("one_tool_agent"))
        .stdout(predicate::str::contains("basic_agent"))
        .stdout(predicate::str::contains("generic_linux_command"));
}

#[test]
fn check_against_closed_port_exits_2() {
    let dir = TempDir::new().unwrap();
    lmprobe(&dir)
        .args(["check", "--api-base", &format!("{}/v1", unused_url())])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Cannot connect"));
}

#[test]
fn server_error_status_exits_2() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![("/v1/models", 500, "internal error".to_string())]);

    lmprobe(&dir)
        .args(["--api-base", &format!("{}/v1", base)])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("HTTP 500: internal error"))
        .stdout(predicate::str::contains("Agent Response").not());
}

#[test]
fn missing_api_base_prints_warning() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["a"])]);

    // A base from the config file counts as configured
    std::fs::write(
        dir.path().join("lmprobe.json"),
        json!({ "api_base": format!("{}/v1", base) }).to_string(),
    )
    .unwrap();
    lmprobe(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No LMSTUDIO_API_BASE configured").not());

    let empty = TempDir::new().unwrap();
    lmprobe(&empty)
        .args(["check", "--timeout", "1"])
        .assert()
        .stdout(predicate::str::contains("No LMSTUDIO_API_BASE configured"));
}

#[test]
fn check_summarises_models() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["m1", "m2", "m3", "m4", "m5"])]);

    lmprobe(&dir)
        .env("LMSTUDIO_API_BASE", format!("{}/v1", base))
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 models available"))
        .stdout(predicate::str::contains("   - m3"))
        .stdout(predicate::str::contains("   - m4").not())
        .stdout(predicate::str::contains("... and 2 more"));
}

#[test]
fn full_run_reports_agent_responses() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["local-model"]), chat_route("pong")]);

    lmprobe(&dir)
        .args([
            "--api-base",
            &format!("{}/v1", base),
            "--agent",
            "basic_agent",
            "--prompt",
            "ping",
            "--prompt",
            "ping again",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test 1/2: ping"))
        .stdout(predicate::str::contains("Test 2/2: ping again"))
        .stdout(predicate::str::contains("Agent Response: pong"))
        .stdout(predicate::str::contains("integration successful"));
}

#[test]
fn unknown_agent_exits_3() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["local-model"])]);

    lmprobe(&dir)
        .args(["--api-base", &format!("{}/v1", base), "--agent", "nope"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Agent not found: nope"));
}

#[test]
fn failing_chat_exits_4() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![
        models_route(&["local-model"]),
        ("/v1/chat/completions", 500, "model crashed".to_string()),
    ]);

    lmprobe(&dir)
        .args([
            "--api-base",
            &format!("{}/v1", base),
            "--agent",
            "basic_agent",
            "--prompt",
            "first",
            "--prompt",
            "second",
        ])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Error running agent on test 1"))
        .stdout(predicate::str::contains("Test 2/2").not());
}

#[test]
fn invalid_api_base_is_config_error() {
    let dir = TempDir::new().unwrap();
    lmprobe(&dir)
        .args(["check", "--api-base", "not a url"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration validation failed"));
}

#[test]
fn dotenv_in_working_directory_configures_api_base() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["local-model"])]);
    std::fs::write(
        dir.path().join(".env"),
        format!("LMSTUDIO_API_BASE={}/v1\nCAI_MODEL=local-model\n", base),
    )
    .unwrap();

    lmprobe(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "API Base: {}/v1 (env LMSTUDIO_API_BASE)",
            base
        )))
        .stdout(predicate::str::contains("1 models available"))
        .stdout(predicate::str::contains("No LMSTUDIO_API_BASE configured").not());
}

#[test]
fn real_environment_beats_dotenv() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["local-model"])]);
    std::fs::write(
        dir.path().join(".env"),
        format!("LMSTUDIO_API_BASE={}/v1\n", unused_url()),
    )
    .unwrap();

    lmprobe(&dir)
        .env("LMSTUDIO_API_BASE", format!("{}/v1", base))
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("API Base: {}/v1", base)));
}

#[test]
fn working_directory_dotenv_beats_home_dotenv() {
    let work = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["local-model"])]);
    std::fs::write(
        work.path().join(".env"),
        format!("LMSTUDIO_API_BASE={}/v1\n", base),
    )
    .unwrap();
    std::fs::write(
        home.path().join(".env"),
        format!("LMSTUDIO_API_BASE={}/v1\nLMPROBE_AGENT=basic_agent\n", unused_url()),
    )
    .unwrap();

    lmprobe(&work)
        .env("HOME", home.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("API Base: {}/v1", base)))
        .stdout(predicate::str::contains("Agent: basic_agent (env LMPROBE_AGENT)"));
}

#[test]
fn malformed_dotenv_is_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let base = spawn_server(vec![models_route(&["local-model"])]);
    std::fs::write(dir.path().join(".env"), "this is not an assignment\n").unwrap();

    lmprobe(&dir)
        .env_remove("RUST_LOG")
        .args(["check", "--api-base", &format!("{}/v1", base)])
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring"))
        .stderr(predicate::str::contains(".env"));
}
