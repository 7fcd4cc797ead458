use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// The system/user pair sent to the completion endpoint. Built only through
/// [`Conversation::new`], so the turn order cannot drift.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![
                ChatMessage { role: Role::System, content: system.into() },
                ChatMessage { role: Role::User, content: user.into() }
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    pub fn user(&self) -> &str {
        &self.messages[1].content
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseOptionError {
    message: String,
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseOptionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    En,
}

impl FromStr for Language {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pt" | "pt-br" | "portugues" | "português" => Ok(Language::Pt),
            "en" | "english" => Ok(Language::En),
            _ =>
                Err(ParseOptionError {
                    message: format!("Invalid language: '{}' (expected pt or en)", s),
                }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Pt => write!(f, "pt"),
            Language::En => write!(f, "en"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficHint {
    Unknown,
    Low,
    Medium,
    High,
}

impl TrafficHint {
    pub const ALL: [TrafficHint; 4] = [
        TrafficHint::Unknown,
        TrafficHint::Low,
        TrafficHint::Medium,
        TrafficHint::High,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TrafficHint::Unknown => "unknown",
            TrafficHint::Low => "low",
            TrafficHint::Medium => "medium",
            TrafficHint::High => "high",
        }
    }
}

impl FromStr for TrafficHint {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(TrafficHint::Unknown),
            "low" => Ok(TrafficHint::Low),
            "medium" => Ok(TrafficHint::Medium),
            "high" => Ok(TrafficHint::High),
            _ =>
                Err(ParseOptionError {
                    message: format!(
                        "Invalid traffic hint: '{}' (expected unknown, low, medium or high)",
                        s
                    ),
                }),
        }
    }
}

impl fmt::Display for TrafficHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
