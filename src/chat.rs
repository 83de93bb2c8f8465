//! Scripted farm assistant.
//!
//! Replies are chosen by keyword, first match wins:
//! 1. "irrigate" or "water": soil moisture advice for the current field
//! 2. "mortality" on a livestock field: mortality rate report
//! 3. "fungicide": marketplace lookup
//! 4. anything else: a generic prompt

use crate::commands::Output;
use crate::models::{Field, FieldType};
use serde::Serialize;

pub const BOT_NAME: &str = "AgriBot";

pub const DEFAULT_REPLY: &str =
    "I'm processing your request. Please ask for data on yield, soil, weather, or marketplace assistance.";

pub const FUNGICIDE_REPLY: &str = "I have checked the Marketplace and found Azoxystrobin Fungicide (1L) from AgroChemicals Ltd. available for Ksh 5,500. Do you want me to navigate you to their listing?";

/// Pick the assistant's reply to `message` for the given field.
pub fn respond(message: &str, field: Option<&Field>) -> String {
    let lower = message.to_lowercase();
    let field_name = field.map(|f| f.name.as_str()).unwrap_or("your field");

    if lower.contains("irrigate") || lower.contains("water") {
        format!(
            "The Soil Moisture for {} is 27% (Low). I recommend initiating irrigation for 12 hours starting tonight, then checking the moisture level again tomorrow morning.",
            field_name
        )
    } else if lower.contains("mortality")
        && field.is_some_and(|f| f.field_type == FieldType::Livestock)
    {
        format!(
            "The daily mortality rate for {} is 0.15%, which is below the target of 0.2%. Excellent management!",
            field_name
        )
    } else if lower.contains("fungicide") {
        FUNGICIDE_REPLY.to_string()
    } else {
        DEFAULT_REPLY.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    /// Non-blank lines of the message
    pub paragraphs: Vec<String>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: &str) -> Self {
        Self {
            sender,
            paragraphs: text
                .split('\n')
                .filter(|p| !p.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Conversation shown in the chat panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    /// A reply is on its way
    pub typing: bool,
}

impl ChatSession {
    pub fn push_user(&mut self, text: &str) {
        self.messages.push(ChatMessage::new(Sender::User, text));
        self.typing = true;
    }

    pub fn push_reply(&mut self, text: &str) {
        self.messages.push(ChatMessage::new(Sender::Ai, text));
        self.typing = false;
    }

    /// Drop the typing indicator without a reply.
    pub fn abandon_reply(&mut self) {
        self.typing = false;
    }
}

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatExchange {
    pub field: Option<String>,
    pub question: String,
    pub reply: Option<String>,
}

impl Output for ChatExchange {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match &self.reply {
            Some(reply) => format!("{}: {}", BOT_NAME, reply),
            None => format!("{} did not answer (cancelled)", BOT_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed;

    fn maize() -> Field {
        seed::default_fields().remove(0)
    }

    fn coop() -> Field {
        seed::default_fields().remove(1)
    }

    #[test]
    fn test_irrigation_reply_names_field() {
        let reply = respond("Should I IRRIGATE today?", Some(&maize()));
        assert!(reply.starts_with("The Soil Moisture for Maize Field 1 is 27% (Low)."));
    }

    #[test]
    fn test_water_keyword_wins_over_fungicide() {
        let reply = respond("water or fungicide?", Some(&maize()));
        assert!(reply.contains("Soil Moisture"));
    }

    #[test]
    fn test_mortality_only_for_livestock() {
        let reply = respond("what is the mortality rate", Some(&coop()));
        assert!(reply.contains("Poultry Coop 1 is 0.15%"));
        let reply = respond("what is the mortality rate", Some(&maize()));
        assert_eq!(reply, DEFAULT_REPLY);
    }

    #[test]
    fn test_fungicide_reply() {
        assert_eq!(respond("Need fungicide", Some(&maize())), FUNGICIDE_REPLY);
    }

    #[test]
    fn test_missing_field_does_not_panic() {
        let reply = respond("water", None);
        assert!(reply.contains("your field"));
        assert_eq!(respond("mortality", None), DEFAULT_REPLY);
    }

    #[test]
    fn test_message_paragraphs_skip_blank_lines() {
        let msg = ChatMessage::new(Sender::User, "first\n\n  \nsecond");
        assert_eq!(msg.paragraphs, vec!["first", "second"]);
    }

    #[test]
    fn test_session_typing_indicator() {
        let mut session = ChatSession::default();
        session.push_user("hi");
        assert!(session.typing);
        session.push_reply(DEFAULT_REPLY);
        assert!(!session.typing);
        assert_eq!(session.messages.len(), 2);
    }
}
