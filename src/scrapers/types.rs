use crate::models::SearchQuery;
use serde::{Deserialize, Serialize};

/// Flags and counters of the current search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub is_searching: bool,
    /// Only meaningful while `is_searching` is set
    pub is_paused: bool,
    /// Fixed for the whole session, replaced only by a new start
    pub query: SearchQuery,
    /// Scroll actions since the session started
    pub scroll_count: u64,
}

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnginePhase {
    #[default]
    Idle,
    /// Waiting for the browser to load the search URL
    Navigating,
    /// Navigated, waiting for the results page to render
    Settling,
    Scrolling,
    Paused,
    /// Searching, but navigation failed and no scroll loop is armed
    Stalled,
}

/// Read-only snapshot published by the engine after every state change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub phase: EnginePhase,
    pub state: SearchState,
    pub processed_urls: usize,
    /// Height the next tick is compared against, once the loop is armed
    pub document_height: Option<u64>,
    pub stagnant_ticks: u32,
}
