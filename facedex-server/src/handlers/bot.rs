//! Conversational labeling webhook
//!
//! Decodes a bot update, dispatches the conversational command, and
//! replies with text plus gateway image links. The transport encoding is
//! deliberately thin; the labeling logic lives in `claim::LabelSession`.
//!
//! Database outages in this flow degrade to a user-visible "nothing
//! found" reply with a logged warning; the conversation never sees a
//! stack of infrastructure errors.

use axum::extract::State;
use axum::Json;
use facedex_core::FacedexError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::claim::LabelSession;
use crate::error::ApiError;
use crate::state::AppState;

/// Incoming bot update. Invalid shapes fail fast with 400 before any
/// business logic runs.
#[derive(Debug, Deserialize)]
pub struct BotUpdate {
    pub message: Option<BotMessage>,
}

#[derive(Debug, Deserialize)]
pub struct BotMessage {
    pub chat: BotChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BotChat {
    pub id: i64,
}

/// Outgoing reply: text plus zero or more gateway image links.
#[derive(Debug, Serialize)]
pub struct BotReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub photo_urls: Vec<String>,
}

/// A parsed conversational command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Offer one unnamed face for labeling.
    GetUnnamedFace,
    /// Photos containing a face with this name.
    Find(String),
    /// Free text: a name for the pending face.
    Label(String),
}

impl Command {
    /// Parse a message text. `/getface` and `get-unnamed-face` trigger
    /// selection, `/find <name>` searches, anything else is a label.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let stripped = text.strip_prefix('/').unwrap_or(text);
        if stripped == "getface" || stripped == "get-unnamed-face" {
            return Some(Command::GetUnnamedFace);
        }
        if let Some(rest) = stripped.strip_prefix("find ") {
            return Some(Command::Find(rest.trim().to_string()));
        }
        if stripped == "find" {
            return Some(Command::Find(String::new()));
        }
        Some(Command::Label(text.to_string()))
    }
}

/// POST /bot/webhook
pub async fn webhook(
    State(state): State<AppState>,
    Json(update): Json<BotUpdate>,
) -> Result<Json<BotReply>, ApiError> {
    let message = update
        .message
        .ok_or_else(|| ApiError::bad_request("update has no message"))?;
    let text = message
        .text
        .ok_or_else(|| ApiError::bad_request("message has no text"))?;

    let command = match Command::parse(&text) {
        Some(command) => command,
        None => return Err(ApiError::bad_request("empty message text")),
    };

    let reply = dispatch(&state, message.chat.id, command).await;
    Ok(Json(reply))
}

async fn dispatch(state: &AppState, chat_id: i64, command: Command) -> BotReply {
    match command {
        Command::GetUnnamedFace => get_unnamed_face(state, chat_id).await,
        Command::Find(name) => find_by_name(state, &name).await,
        Command::Label(name) => label(state, chat_id, &name).await,
    }
}

async fn get_unnamed_face(state: &AppState, chat_id: i64) -> BotReply {
    let offered = state.offers.get(&chat_id).map(|e| *e.value());
    let mut session = LabelSession::resume(
        state.faces.clone(),
        state.config.claim_lease(),
        state.config.bind_offer,
        offered,
    );

    match session.select_unnamed().await {
        Ok(Some(face)) => {
            state.offers.insert(chat_id, face.face_id);
            BotReply {
                reply: "Who is this?".into(),
                photo_urls: vec![format!(
                    "{}/image?face={}.jpg",
                    state.config.gateway_base_url, face.face_id
                )],
            }
        }
        Ok(None) => BotReply {
            reply: "No unnamed faces available.".into(),
            photo_urls: Vec::new(),
        },
        Err(e) => degraded("face selection", e),
    }
}

async fn find_by_name(state: &AppState, name: &str) -> BotReply {
    if name.is_empty() {
        return BotReply {
            reply: "Usage: /find <name>".into(),
            photo_urls: Vec::new(),
        };
    }

    let session = LabelSession::new(
        state.faces.clone(),
        state.config.claim_lease(),
        state.config.bind_offer,
    );

    match session.find_by_name(name).await {
        Ok(photo_ids) if photo_ids.is_empty() => BotReply {
            reply: format!("No photos found for {name}."),
            photo_urls: Vec::new(),
        },
        Ok(photo_ids) => BotReply {
            reply: format!("Photos with {name}:"),
            photo_urls: photo_ids
                .into_iter()
                .map(|id| format!("{}/image?photo={id}", state.config.gateway_base_url))
                .collect(),
        },
        Err(e) => degraded("name lookup", e),
    }
}

async fn label(state: &AppState, chat_id: i64, name: &str) -> BotReply {
    let offered = state.offers.get(&chat_id).map(|e| *e.value());
    let mut session = LabelSession::resume(
        state.faces.clone(),
        state.config.claim_lease(),
        state.config.bind_offer,
        offered,
    );

    match session.assign_name(name).await {
        Ok(Some(face_id)) => {
            state.offers.remove(&chat_id);
            BotReply {
                reply: format!("Got it, that face is now {name} ({face_id})."),
                photo_urls: Vec::new(),
            }
        }
        Ok(None) => BotReply {
            reply: "There is no face waiting for a name.".into(),
            photo_urls: Vec::new(),
        },
        // A named face stays named; the attempt is a no-op for the caller.
        Err(FacedexError::Conflict(_)) => BotReply {
            reply: "That face already has a name.".into(),
            photo_urls: Vec::new(),
        },
        Err(FacedexError::InvalidInput(msg)) => BotReply {
            reply: format!("Cannot use that as a name: {msg}"),
            photo_urls: Vec::new(),
        },
        Err(e) => degraded("naming", e),
    }
}

/// The preserved degradation path: infrastructure failures become a
/// polite empty answer, explicitly logged, never a masked crash.
fn degraded(operation: &str, error: FacedexError) -> BotReply {
    warn!(operation, error = %error, "conversational flow degraded");
    BotReply {
        reply: "Nothing found right now, try again later.".into(),
        photo_urls: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_getface_variants() {
        assert_eq!(Command::parse("/getface"), Some(Command::GetUnnamedFace));
        assert_eq!(
            Command::parse("get-unnamed-face"),
            Some(Command::GetUnnamedFace)
        );
    }

    #[test]
    fn parses_find_with_name() {
        assert_eq!(
            Command::parse("/find Alice"),
            Some(Command::Find("Alice".into()))
        );
        assert_eq!(Command::parse("/find"), Some(Command::Find(String::new())));
    }

    #[test]
    fn bare_text_is_a_label() {
        assert_eq!(Command::parse("Bob"), Some(Command::Label("Bob".into())));
        // Names are exact and case-sensitive; parsing does not normalize.
        assert_eq!(
            Command::parse("  Anna Lee "),
            Some(Command::Label("Anna Lee".into()))
        );
    }

    #[test]
    fn empty_text_is_no_command() {
        assert_eq!(Command::parse("   "), None);
    }
}
