use super::*;
use crate::core::message::{Sender, ERROR_REPLY, FALLBACK_REPLY};
use crate::core::storage::{FailingStorage, FileStorage, MemoryStorage};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

enum Scripted {
    Reply(Option<&'static str>),
    NetworkFailure,
    Status(StatusCode),
    Malformed,
}

/// Completion client that replays canned outcomes and records prompts.
struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

fn network_error() -> CompletionError {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("invalid URL should fail to build");
    CompletionError::Transport(err)
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected completion call");
        match next {
            Scripted::Reply(text) => Ok(text.map(str::to_string)),
            Scripted::NetworkFailure => Err(network_error()),
            Scripted::Status(status) => Err(CompletionError::Status {
                status,
                message: "boom".to_string(),
            }),
            Scripted::Malformed => Err(CompletionError::Decode(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            )),
        }
    }
}

fn memory_session() -> ChatSession<MemoryStorage> {
    ChatSession::open(ConversationStore::new(MemoryStorage::new(), "chatHistory"))
}

fn persisted(session: &ChatSession<MemoryStorage>) -> Vec<Message> {
    session.store().load()
}

#[tokio::test]
async fn reply_text_is_appended_after_user_message() {
    let client = ScriptedClient::new([Scripted::Reply(Some("hi there"))]);
    let mut session = memory_session();

    let outcome = session.submit(&client, "hello").await;

    assert!(matches!(outcome, SubmitOutcome::Dispatched(_)));
    let expected = vec![Message::user("hello"), Message::bot("hi there")];
    assert_eq!(session.messages(), expected.as_slice());
    assert_eq!(persisted(&session), expected);
    assert!(!session.is_waiting_for_reply());
    assert_eq!(client.prompts(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn missing_candidates_fall_back_to_canned_reply() {
    let client = ScriptedClient::new([Scripted::Reply(None)]);
    let mut session = memory_session();

    session.submit(&client, "hello").await;

    assert_eq!(
        session.messages(),
        &[Message::user("hello"), Message::bot(FALLBACK_REPLY)]
    );
    assert_eq!(persisted(&session), session.messages());
}

#[tokio::test]
async fn empty_reply_text_falls_back_to_canned_reply() {
    let client = ScriptedClient::new([Scripted::Reply(Some(""))]);
    let mut session = memory_session();

    session.submit(&client, "hello").await;

    assert_eq!(session.messages()[1], Message::fallback_reply());
}

#[tokio::test]
async fn network_failure_becomes_error_message() {
    let client = ScriptedClient::new([Scripted::NetworkFailure]);
    let mut session = memory_session();

    session.submit(&client, "hello").await;

    assert_eq!(
        session.messages(),
        &[Message::user("hello"), Message::bot(ERROR_REPLY)]
    );
    assert!(!session.is_waiting_for_reply());
    assert_eq!(persisted(&session), session.messages());
}

#[tokio::test]
async fn status_and_decode_failures_become_error_message() {
    let client = ScriptedClient::new([
        Scripted::Status(StatusCode::INTERNAL_SERVER_ERROR),
        Scripted::Malformed,
    ]);
    let mut session = memory_session();

    session.submit(&client, "first").await;
    session.submit(&client, "second").await;

    let senders: Vec<Sender> = session.messages().iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![Sender::User, Sender::Bot, Sender::User, Sender::Bot]
    );
    assert_eq!(session.messages()[1].text, ERROR_REPLY);
    assert_eq!(session.messages()[3].text, ERROR_REPLY);
}

#[tokio::test]
async fn whitespace_only_input_is_a_no_op() {
    let client = ScriptedClient::new(Vec::<Scripted>::new());
    let mut session = memory_session();

    for input in ["", "   ", "\n\t "] {
        let outcome = session.submit(&client, input).await;
        assert_eq!(outcome, SubmitOutcome::Ignored);
    }

    assert!(session.messages().is_empty());
    assert!(!session.is_waiting_for_reply());
    assert!(client.prompts().is_empty());
    assert!(!session.store().storage().contains("chatHistory"));
}

#[test]
fn user_message_is_appended_before_reply_arrives() {
    let mut session = memory_session();

    let SubmitOutcome::Dispatched(pending) = session.begin_submit("  hello  ") else {
        panic!("submission should dispatch");
    };
    assert_eq!(pending.prompt, "hello");
    assert_eq!(session.messages(), &[Message::user("hello")]);
    assert!(session.is_waiting_for_reply());
    assert_eq!(persisted(&session), vec![Message::user("hello")]);
}

#[test]
fn submissions_while_waiting_are_rejected() {
    let mut session = memory_session();
    let SubmitOutcome::Dispatched(first) = session.begin_submit("one") else {
        panic!("first submission should dispatch");
    };

    assert_eq!(session.begin_submit("two"), SubmitOutcome::Busy);
    assert_eq!(session.messages(), &[Message::user("one")]);
    assert!(session.is_waiting_for_reply());

    session.complete(first.token, Ok(Some("reply".to_string())));
    assert!(matches!(
        session.begin_submit("two"),
        SubmitOutcome::Dispatched(_)
    ));
}

#[test]
fn draft_is_cleared_on_dispatch_and_kept_when_busy() {
    let mut session = memory_session();

    session.draft_mut().push_str("first");
    assert!(matches!(session.submit_draft(), SubmitOutcome::Dispatched(_)));
    assert_eq!(session.draft(), "");

    session.draft_mut().push_str("second");
    assert_eq!(session.submit_draft(), SubmitOutcome::Busy);
    assert_eq!(session.draft(), "second");
}

#[test]
fn stale_results_are_dropped() {
    let mut session = memory_session();
    let SubmitOutcome::Dispatched(pending) = session.begin_submit("hello") else {
        panic!("submission should dispatch");
    };

    assert!(session
        .complete(pending.token + 1, Ok(Some("wrong".to_string())))
        .is_none());
    assert!(session.is_waiting_for_reply());

    let appended = session
        .complete(pending.token, Ok(Some("right".to_string())))
        .cloned();
    assert_eq!(appended, Some(Message::bot("right")));

    // A duplicate delivery for the same token is ignored too.
    assert!(session
        .complete(pending.token, Ok(Some("again".to_string())))
        .is_none());
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn reset_clears_memory_and_storage() {
    let client = ScriptedClient::new([Scripted::Reply(Some("hi there"))]);
    let mut session = memory_session();
    session.submit(&client, "hello").await;

    session.reset().expect("reset succeeds");

    assert!(session.messages().is_empty());
    assert!(!session.store().storage().contains("chatHistory"));
    assert!(persisted(&session).is_empty());
}

#[test]
fn reset_twice_matches_reset_once() {
    let mut session = memory_session();
    session.begin_submit("hello");

    session.reset().expect("reset succeeds");
    let once = session.state().clone();
    session.reset().expect("reset succeeds");

    assert_eq!(session.state(), &once);
    assert!(!session.store().storage().contains("chatHistory"));
}

#[test]
fn reset_abandons_outstanding_request() {
    let mut session = memory_session();
    let SubmitOutcome::Dispatched(pending) = session.begin_submit("hello") else {
        panic!("submission should dispatch");
    };

    session.reset().expect("reset succeeds");
    assert!(!session.is_waiting_for_reply());

    assert!(session
        .complete(pending.token, Ok(Some("late".to_string())))
        .is_none());
    assert!(session.messages().is_empty());
    assert!(persisted(&session).is_empty());

    assert!(matches!(
        session.begin_submit("again"),
        SubmitOutcome::Dispatched(_)
    ));
}

#[tokio::test]
async fn history_survives_reopening() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let client = ScriptedClient::new([
        Scripted::Reply(Some("hi there")),
        Scripted::Reply(Some("still here")),
    ]);

    {
        let store = ConversationStore::new(FileStorage::new(temp_dir.path()), "chatHistory");
        let mut session = ChatSession::open(store);
        session.submit(&client, "hello").await;
    }

    let store = ConversationStore::new(FileStorage::new(temp_dir.path()), "chatHistory");
    let mut session = ChatSession::open(store);
    assert_eq!(
        session.messages(),
        &[Message::user("hello"), Message::bot("hi there")]
    );

    session.submit(&client, "are you there?").await;
    assert_eq!(session.messages().len(), 4);
    assert_eq!(client.prompts(), vec!["hello", "are you there?"]);
}

fn failing_session() -> ChatSession<FailingStorage> {
    ChatSession::open(ConversationStore::new(FailingStorage, "chatHistory"))
}

#[test]
fn unreadable_storage_opens_as_empty_history() {
    let session = failing_session();
    assert!(session.messages().is_empty());
    assert!(!session.is_waiting_for_reply());
}

#[tokio::test]
async fn save_failures_do_not_interrupt_the_conversation() {
    let client = ScriptedClient::new([
        Scripted::Reply(Some("hi there")),
        Scripted::Reply(Some("again")),
    ]);
    let mut session = failing_session();

    let outcome = session.submit(&client, "hello").await;
    assert!(matches!(outcome, SubmitOutcome::Dispatched(_)));
    assert_eq!(
        session.messages(),
        &[Message::user("hello"), Message::bot("hi there")]
    );
    assert!(!session.is_waiting_for_reply());

    assert!(matches!(
        session.submit(&client, "more").await,
        SubmitOutcome::Dispatched(_)
    ));
    assert_eq!(session.messages().len(), 4);
}

#[test]
fn reset_clears_memory_even_when_removal_fails() {
    let mut session = failing_session();
    let SubmitOutcome::Dispatched(pending) = session.begin_submit("hello") else {
        panic!("submission should dispatch");
    };

    let err = session.reset().expect_err("removal should fail");
    assert!(matches!(err, StorageError::Remove { .. }));
    assert!(session.messages().is_empty());
    assert!(!session.is_waiting_for_reply());
    assert!(session
        .complete(pending.token, Ok(Some("late".to_string())))
        .is_none());
}
