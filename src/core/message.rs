use serde::{Deserialize, Serialize};

/// Bot text used when the remote call succeeds but carries no reply.
pub const FALLBACK_REPLY: &str = "I'm not sure how to respond.";

/// Bot text appended when the remote call fails for any reason.
pub const ERROR_REPLY: &str = "Error fetching response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Bot,
}

/// One turn in the conversation. Messages are never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    pub fn is_bot(self) -> bool {
        self == Sender::Bot
    }
}

impl AsRef<str> for Sender {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            _ => Err(format!("invalid message sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn fallback_reply() -> Self {
        Self::bot(FALLBACK_REPLY)
    }

    pub fn error_reply() -> Self {
        Self::bot(ERROR_REPLY)
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }

    pub fn is_bot(&self) -> bool {
        self.sender.is_bot()
    }
}
