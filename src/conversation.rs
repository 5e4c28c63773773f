use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of turns kept in a conversation.
pub const MAX_HISTORY: usize = 100;

pub const SYSTEM_PREAMBLE: &str = "You are EDIT, a friendly and knowledgeable AI assistant. \
Answer the user's latest message clearly and helpfully, keeping the earlier turns of the \
conversation in mind.\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user", alias = "User", alias = "USER")]
    User,
    #[serde(
        rename = "assistant",
        alias = "Assistant",
        alias = "ASSISTANT",
        alias = "bot",
        alias = "model"
    )]
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single turn. The wire form is `{"role": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(rename = "message")]
    pub text: String,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Ordered, bounded conversation history. Oldest turns are evicted first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    messages: VecDeque<Message>,
}

impl History {
    /// Builds a history from caller-supplied turns, keeping only the newest
    /// `MAX_HISTORY` of them.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut history = Self {
            messages: messages.into(),
        };
        history.bound();
        history
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages.into()
    }

    fn bound(&mut self) {
        while self.messages.len() > MAX_HISTORY {
            self.messages.pop_front();
        }
    }
}

/// Appends a turn and trims the front of the history back down to
/// `MAX_HISTORY`. The appended turn is never evicted.
pub fn append_and_bound(mut history: History, role: Role, text: impl Into<String>) -> History {
    history.messages.push_back(Message::new(role, text));
    history.bound();
    history
}

/// Flattens the history into a single prompt that ends with an empty
/// assistant cue.
pub fn render_prompt(history: &History, system_preamble: &str) -> String {
    let mut prompt = String::from(system_preamble);
    for message in history.messages() {
        prompt.push_str(message.role.label());
        prompt.push_str(": ");
        prompt.push_str(&message.text);
        prompt.push('\n');
    }
    prompt.push_str(Role::Assistant.label());
    prompt.push(':');
    prompt
}
