//! The interactive shell driven by scripted input.

use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::io::BufReader;

use maestro::cli::shell::run_shell;
use maestro::error::{MaestroError, Result};
use maestro::tools::Invokable;

/// Answers every request by echoing it, failing on "boom".
#[derive(Default)]
struct EchoAssistant {
    seen: Mutex<Vec<String>>,
}

impl EchoAssistant {
    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Invokable for EchoAssistant {
    fn name(&self) -> &str {
        "Echo"
    }

    fn description(&self) -> &str {
        "Echoes requests"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.seen.lock().unwrap().push(input.to_string());
        if input == "boom" {
            return Err(MaestroError::BackendUnavailable(
                "connection refused".into(),
            ));
        }
        Ok(format!("echo: {input}"))
    }
}

async fn drive(assistant: &EchoAssistant, input: &str) -> String {
    let mut output = Vec::new();
    run_shell(
        assistant,
        BufReader::new(input.as_bytes()),
        &mut output,
        std::future::pending(),
    )
    .await
    .unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn quit_ends_the_session() {
    let assistant = EchoAssistant::default();
    let output = drive(&assistant, "play something\nQUIT\nnever sent\n").await;

    assert_eq!(assistant.seen(), vec!["play something".to_string()]);
    assert!(output.starts_with("Spotify assistant ready. Type 'quit' to exit.\n"));
    assert!(output.contains("\nAssistant: echo: play something\n"));
    assert!(output.ends_with("\nGoodbye!\n"));
}

#[tokio::test]
async fn blank_lines_are_skipped() {
    let assistant = EchoAssistant::default();
    drive(&assistant, "\n   \n  hello  \nexit\n").await;
    assert_eq!(assistant.seen(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn failed_request_prints_help_and_continues() {
    let assistant = EchoAssistant::default();
    let output = drive(&assistant, "boom\nstill here\nq\n").await;

    assert_eq!(
        assistant.seen(),
        vec!["boom".to_string(), "still here".to_string()]
    );
    assert!(output.contains("⚠️"));
    assert!(output.contains("not reachable"));
    assert!(output.contains("echo: still here"));
}

#[tokio::test]
async fn end_of_input_ends_the_session() {
    let assistant = EchoAssistant::default();
    let output = drive(&assistant, "last request").await;

    assert_eq!(assistant.seen(), vec!["last request".to_string()]);
    assert!(output.ends_with("\nGoodbye!\n"));
}

#[tokio::test]
async fn shutdown_signal_stops_the_loop() {
    let assistant = EchoAssistant::default();
    let mut output = Vec::new();
    run_shell(
        &assistant,
        BufReader::new(&b"never handled\n"[..]),
        &mut output,
        std::future::ready(()),
    )
    .await
    .unwrap();

    assert!(assistant.seen().is_empty());
    let output = String::from_utf8(output).unwrap();
    assert!(output.ends_with("\nGoodbye!\n"));
}
