//! Interactive read-eval-print loop.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::Result;
use crate::tools::Invokable;

use super::errors::format_error_help;

const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Whether a line asks the shell to stop.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Read requests line by line and print each answer until an exit
/// command, end of input, or `shutdown` resolves.
///
/// A failed request prints guidance and the loop keeps going.
pub async fn run_shell<R, W, S>(
    assistant: &dyn Invokable,
    input: R,
    mut output: W,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();

    output
        .write_all(b"Spotify assistant ready. Type 'quit' to exit.\n")
        .await?;

    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let line = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if is_exit_command(line) {
            break;
        }

        debug!(chars = line.len(), "handling request");
        let answer = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            answer = assistant.invoke(line) => answer,
        };
        let text = match answer {
            Ok(text) => format!("\nAssistant: {text}\n"),
            Err(err) => format!("\n⚠️  {}\n", format_error_help(&err)),
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.write_all(b"\nGoodbye!\n").await?;
    output.flush().await?;
    Ok(())
}
