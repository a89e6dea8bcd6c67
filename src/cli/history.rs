//! Line-oriented access to the saved conversation.

use crate::core::session::ChatSession;
use crate::core::storage::SnapshotStorage;
use crate::ui::transcript::TranscriptRenderer;

pub const EMPTY_HISTORY: &str = "No conversation history.";

pub fn history_lines<S: SnapshotStorage>(
    session: &ChatSession<S>,
    renderer: &(dyn TranscriptRenderer + Send + Sync),
) -> Vec<String> {
    if session.messages().is_empty() {
        return vec![EMPTY_HISTORY.to_string()];
    }
    renderer.render_text(session.messages(), false)
}

pub fn run_history<S: SnapshotStorage>(
    session: &ChatSession<S>,
    renderer: &(dyn TranscriptRenderer + Send + Sync),
) {
    for line in history_lines(session, renderer) {
        println!("{line}");
    }
}

/// Reset the conversation and describe the result. `Err` carries the line to
/// show when the saved snapshot could not be removed.
pub fn clear_conversation<S: SnapshotStorage>(
    session: &mut ChatSession<S>,
) -> Result<String, String> {
    let count = session.messages().len();
    let key = session.store().key().to_string();
    match session.reset() {
        Ok(()) => Ok(format!("✅ Cleared conversation '{key}' ({count} messages)")),
        Err(err) => Err(format!(
            "❌ Failed to clear conversation '{key}': {err}\n   The saved history will be restored on the next start."
        )),
    }
}

pub fn run_clear<S: SnapshotStorage>(session: &mut ChatSession<S>) {
    match clear_conversation(session) {
        Ok(message) => println!("{message}"),
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}
