use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn nero() -> Command {
    let mut cmd = Command::cargo_bin("nero").unwrap();
    cmd.env_remove("NERO_ENDPOINT").env_remove("NERO_PORT");
    cmd
}

#[test]
fn test_cli_help() {
    nero()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: nero [OPTIONS] <COMMAND>"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("--endpoint <ENDPOINT>"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_serve_help() {
    nero()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: nero serve"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("9900"));
}

#[test]
fn test_cli_no_command() {
    nero()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: nero [OPTIONS] <COMMAND>"));
}

#[test]
fn test_cli_rejects_invalid_endpoint() {
    nero()
        .args(["--endpoint", "ftp://127.0.0.1/chat", "chat"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid endpoint"));
}

#[test]
fn test_chat_with_closed_input_prints_greetings() {
    nero()
        .args(["chat", "--endpoint", "http://127.0.0.1:1/chat"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("네로: 안냥! 고양이 타로 상담사 네로다냥"));
}

#[test]
fn test_chat_unreachable_service_prints_fallback() {
    nero()
        .args(["chat", "--endpoint", "http://127.0.0.1:1/chat"])
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("나: hello"))
        .stdout(predicate::str::contains("네로: 죄송해요, 일시적인 오류가 발생했어요 😿"));
}

// The mock server runs on its own thread, so the blocking command below does not starve it.
#[tokio::test(flavor = "multi_thread")]
async fn test_chat_round_trip_against_reading_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "card reading" })))
        .expect(1)
        .mount(&server)
        .await;

    nero()
        .env("NERO_ENDPOINT", format!("{}/chat", server.uri()))
        .arg("chat")
        .write_stdin("hello\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("나: hello"))
        .stdout(predicate::str::contains("네로가 타로 카드를 읽고 있어요... 🔮"))
        .stdout(predicate::str::contains("네로: card reading"));
}
