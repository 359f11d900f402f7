use crate::bus::{Command, Event, StartSearch};
use crate::models::{DiscoveredEntity, SearchType};
use crate::scrapers::EngineHandle;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A discovery as the controller received it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(flatten)]
    pub entity: DiscoveredEntity,
    pub received_at: DateTime<Utc>,
}

/// User-facing side of a search: holds the intent, issues commands, collects results.
///
/// Flags are flipped optimistically when a command is issued; the engine is never asked
/// for confirmation.
pub struct Controller {
    target: Option<EngineHandle>,
    search_term: String,
    search_type: SearchType,
    city: String,
    is_searching: bool,
    is_paused: bool,
    results: Vec<ResultRow>,
}

impl Controller {
    pub fn new(target: Option<EngineHandle>) -> Self {
        Self {
            target,
            search_term: String::new(),
            search_type: SearchType::People,
            city: String::new(),
            is_searching: false,
            is_paused: false,
            results: Vec::new(),
        }
    }

    pub fn attach(&mut self, target: EngineHandle) {
        self.target = Some(target);
    }

    /// Forget the engine; later commands are dropped
    pub fn detach(&mut self) -> Option<EngineHandle> {
        self.target.take()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_search_type(&mut self, search_type: SearchType) {
        self.search_type = search_type;
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn can_start(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.results
    }

    /// Clear previous results and start a search. Does nothing for a blank term.
    pub async fn start(&mut self) {
        if !self.can_start() {
            debug!("Start ignored: empty search term");
            return;
        }

        self.results.clear();
        self.is_searching = true;
        self.is_paused = false;

        let city = Some(self.city.trim().to_string()).filter(|city| !city.is_empty());
        self.dispatch(Command::StartSearch(StartSearch {
            search_term: self.search_term.clone(),
            search_type: self.search_type,
            city,
        }))
        .await;
    }

    pub async fn stop(&mut self) {
        self.is_searching = false;
        self.is_paused = false;
        self.dispatch(Command::StopSearch).await;
    }

    /// Pause a running search, or resume a paused one. Does nothing without a search.
    pub async fn toggle_pause(&mut self) {
        if !self.is_searching {
            debug!("Pause toggle ignored: no search running");
            return;
        }
        let command = if self.is_paused {
            Command::ResumeSearch
        } else {
            Command::PauseSearch
        };
        self.is_paused = !self.is_paused;
        self.dispatch(command).await;
    }

    pub fn absorb(&mut self, event: Event) {
        match event {
            Event::ProfileFound(entity) => {
                info!("{}. {} ({})", self.results.len() + 1, entity.name, entity.profile_url);
                self.results.push(ResultRow {
                    entity,
                    received_at: Utc::now(),
                });
            }
            Event::ContentScriptLoaded => debug!("Engine announced itself"),
        }
    }

    /// Commands without a live engine are dropped silently
    async fn dispatch(&self, command: Command) {
        let Some(target) = &self.target else {
            debug!(action = command.action(), "No active engine, command dropped");
            return;
        };
        if let Err(e) = target.send(command).await {
            debug!("{}, command dropped", e);
        }
    }

    pub async fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.results)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        info!("💾 Saved {} results to {}", self.results.len(), path.display());
        Ok(())
    }
}
