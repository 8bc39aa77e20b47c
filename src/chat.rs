// Terminal front-end: one line of input is one submission.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

use crate::constants::{CAT_NAME, LOADING_TEXT, USER_NAME};
use crate::conversation::{Conversation, Message};
use crate::exchange::ReadingTransport;

pub fn render_message(message: &Message) -> String {
    let speaker = if message.is_user { USER_NAME } else { CAT_NAME };
    format!("{}: {}", speaker, message.text)
}

pub fn render_loading() -> String {
    format!("{}: {}", CAT_NAME, LOADING_TEXT)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await.context("Failed to flush output")
}

/// Runs a chat session until `input` is exhausted and returns the final conversation.
///
/// Blank lines are ignored. Every accepted line is echoed as the user's
/// message, followed by the loading line and then the cat's reply.
pub async fn run_chat<R, W, T>(input: R, output: &mut W, transport: &T) -> Result<Conversation>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    T: ReadingTransport,
{
    let mut conversation = Conversation::new();
    for message in conversation.messages() {
        write_line(output, &render_message(message)).await?;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        conversation.update_draft(line);
        let Some(pending) = conversation.begin_submit() else {
            continue;
        };

        if let Some(question) = conversation.messages().last() {
            write_line(output, &render_message(question)).await?;
        }
        write_line(output, &render_loading()).await?;

        let outcome = transport.exchange(pending.message()).await;
        let reply = conversation.complete(pending, outcome);
        write_line(output, &render_message(reply)).await?;
    }

    info!(messages = conversation.messages().len(), "Input closed, ending chat");
    Ok(conversation)
}
