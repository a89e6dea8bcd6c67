//! TUI-less "say" command

use std::error::Error;

use crate::core::completion::CompletionClient;
use crate::core::message::Message;
use crate::core::session::{ChatSession, SubmitOutcome};
use crate::core::storage::SnapshotStorage;
use crate::ui::transcript::TranscriptRenderer;

/// Send `prompt` through `session` and return the bot message it produced.
///
/// Both messages are saved to the conversation like any exchange in the
/// full-screen chat. Returns `None` when the prompt is blank.
pub async fn say<S, C>(session: &mut ChatSession<S>, client: &C, prompt: &str) -> Option<Message>
where
    S: SnapshotStorage,
    C: CompletionClient + ?Sized,
{
    match session.submit(client, prompt).await {
        SubmitOutcome::Dispatched(_) => session.messages().last().cloned(),
        SubmitOutcome::Ignored | SubmitOutcome::Busy => None,
    }
}

pub async fn run_say<S, C>(
    session: &mut ChatSession<S>,
    client: &C,
    renderer: &(dyn TranscriptRenderer + Send + Sync),
    prompt: &str,
) -> Result<(), Box<dyn Error>>
where
    S: SnapshotStorage,
    C: CompletionClient + ?Sized,
{
    if prompt.trim().is_empty() {
        eprintln!("Usage: gemchat say <prompt>");
        std::process::exit(1);
    }

    let Some(reply) = say(session, client, prompt).await else {
        return Ok(());
    };

    for line in renderer.render_text(std::slice::from_ref(&reply), false) {
        println!("{line}");
    }
    Ok(())
}
