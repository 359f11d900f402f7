//! Message vocabulary shared by the controller, the coordinator and the scraper engine.
//!
//! Every message serializes as `{"action": ..., "data": ...}`. Commands travel in an
//! [`Envelope`] that carries a one-shot acknowledgement slot; events are fire-and-forget.

use crate::models::{DiscoveredEntity, SearchQuery, SearchType};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Lifecycle commands sent from the controller to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    StartSearch(StartSearch),
    StopSearch,
    PauseSearch,
    ResumeSearch,
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Self::StartSearch(_) => "START_SEARCH",
            Self::StopSearch => "STOP_SEARCH",
            Self::PauseSearch => "PAUSE_SEARCH",
            Self::ResumeSearch => "RESUME_SEARCH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSearch {
    pub search_term: String,
    pub search_type: SearchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl From<StartSearch> for SearchQuery {
    fn from(start: StartSearch) -> Self {
        SearchQuery::new(start.search_term, start.search_type, start.city)
    }
}

/// Notifications emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    ProfileFound(DiscoveredEntity),
    ContentScriptLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
}

/// Receipt for a command. Says nothing about whether the command's work has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: AckStatus,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            status: AckStatus::Ok,
        }
    }
}

pub struct Envelope {
    pub command: Command,
    pub ack: oneshot::Sender<Ack>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_command_wire_shape() {
        let command: Command = serde_json::from_value(json!({
            "action": "START_SEARCH",
            "data": { "searchTerm": "acme", "searchType": "pages", "city": "Lima" }
        }))
        .unwrap();

        assert_eq!(
            command,
            Command::StartSearch(StartSearch {
                search_term: "acme".to_string(),
                search_type: SearchType::Pages,
                city: Some("Lima".to_string()),
            })
        );
        assert_eq!(command.action(), "START_SEARCH");
    }

    #[test]
    fn dataless_commands_carry_only_the_action() {
        assert_eq!(
            serde_json::to_value(Command::PauseSearch).unwrap(),
            json!({ "action": "PAUSE_SEARCH" })
        );
        let stop: Command = serde_json::from_value(json!({ "action": "STOP_SEARCH" })).unwrap();
        assert_eq!(stop, Command::StopSearch);
    }

    #[test]
    fn city_is_optional_on_start() {
        let command: Command = serde_json::from_value(json!({
            "action": "START_SEARCH",
            "data": { "searchTerm": "ana", "searchType": "people" }
        }))
        .unwrap();
        let Command::StartSearch(start) = command else {
            panic!("expected START_SEARCH");
        };
        assert_eq!(start.city, None);
    }

    #[test]
    fn ack_and_profile_event_shapes() {
        assert_eq!(serde_json::to_value(Ack::ok()).unwrap(), json!({ "status": "ok" }));

        let event = Event::ProfileFound(DiscoveredEntity {
            name: "Ana".to_string(),
            profile_url: "https://www.facebook.com/profile/ana".to_string(),
            entity_type: SearchType::People,
        });
        assert_eq!(
            serde_json::to_value(event).unwrap(),
            json!({
                "action": "PROFILE_FOUND",
                "data": {
                    "name": "Ana",
                    "profileUrl": "https://www.facebook.com/profile/ana",
                    "type": "people"
                }
            })
        );
    }
}
