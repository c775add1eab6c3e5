use anyhow::Result;
use finbot::{ConversationContext, FinanceBot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;

pub const GREETING: &str = "Hello! How can I help you with your banking questions today?";
pub const FAREWELL: &str = "Goodbye! Have a great day.";
pub const INTERRUPTED_FAREWELL: &str = "Goodbye!";

pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Reads questions from `input` until `exit`, `quit` or end of input.
///
/// One `ConversationContext` spans the whole loop.
pub async fn run_chat<R, W>(bot: &FinanceBot, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut context = ConversationContext::new();
    let mut lines = input.lines();

    output
        .write_all(format!("Finance Bot: {GREETING}\n").as_bytes())
        .await?;

    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            break;
        }

        let outcome = bot.ask_with_context(question, &mut context).await;
        info!(answered = outcome.is_answered(), "Turn finished");
        output
            .write_all(format!("Finance Bot:\n{}\n", outcome.answer()).as_bytes())
            .await?;
    }

    output
        .write_all(format!("Finance Bot: {FAREWELL}\n").as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}
