use crate::models::SearchQuery;
use crate::scrapers::stagnation::{StagnationSignal, StagnationTracker};
use crate::scrapers::types::SearchState;
use std::collections::HashSet;

/// Links already emitted in the current session
#[derive(Debug, Default)]
pub struct ProcessedUrls {
    seen: HashSet<String>,
}

impl ProcessedUrls {
    /// Record `key`; false if it was already there
    pub fn insert(&mut self, key: String) -> bool {
        self.seen.insert(key)
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

/// Everything the engine tracks for one search, from START to STOP.
///
/// Transitions:
/// - `reset` (START): any state to searching with a fresh query and zeroed counters.
///   Processed links survive a restart; only STOP clears them.
/// - `stop` (STOP): any state to idle, processed links cleared
/// - `pause` / `resume`: toggle only while searching
#[derive(Debug)]
pub struct SearchSession {
    state: SearchState,
    processed: ProcessedUrls,
    stagnation: StagnationTracker,
}

impl SearchSession {
    pub fn new(stagnation_threshold: u32) -> Self {
        Self {
            state: SearchState::default(),
            processed: ProcessedUrls::default(),
            stagnation: StagnationTracker::new(stagnation_threshold),
        }
    }

    pub fn reset(&mut self, query: SearchQuery) {
        self.state = SearchState {
            is_searching: true,
            is_paused: false,
            query,
            scroll_count: 0,
        };
        self.stagnation.disarm();
    }

    pub fn stop(&mut self) {
        self.state.is_searching = false;
        self.state.is_paused = false;
        self.processed.clear();
        self.stagnation.disarm();
    }

    /// Returns whether the session moved to paused
    pub fn pause(&mut self) -> bool {
        if !self.state.is_searching || self.state.is_paused {
            return false;
        }
        self.state.is_paused = true;
        true
    }

    /// Returns whether the session left paused
    pub fn resume(&mut self) -> bool {
        if !self.state.is_paused {
            return false;
        }
        self.state.is_paused = false;
        true
    }

    /// Ticks do work only in this state
    pub fn is_active(&self) -> bool {
        self.state.is_searching && !self.state.is_paused
    }

    /// Begin stagnation tracking from the height seen when the loop is armed
    pub fn arm(&mut self, baseline_height: u64) {
        self.stagnation.arm(baseline_height);
    }

    pub fn record_scroll(&mut self) {
        self.state.scroll_count += 1;
    }

    /// True the first time `key` is seen this session
    pub fn admit(&mut self, key: String) -> bool {
        self.processed.insert(key)
    }

    pub fn observe_height(&mut self, height: u64) -> StagnationSignal {
        self.stagnation.observe(height)
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn processed(&self) -> &ProcessedUrls {
        &self.processed
    }

    pub fn stagnation(&self) -> &StagnationTracker {
        &self.stagnation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchType;

    fn query() -> SearchQuery {
        SearchQuery::new("acme", SearchType::Pages, None)
    }

    #[test]
    fn start_pause_resume_stop() {
        let mut session = SearchSession::new(5);
        assert!(!session.is_active());

        session.reset(query());
        assert!(session.is_active());
        assert_eq!(session.state().query, query());

        assert!(session.pause());
        assert!(session.state().is_paused);
        assert!(!session.is_active());
        assert!(!session.pause(), "already paused");

        assert!(session.resume());
        assert!(session.is_active());
        assert!(!session.resume(), "not paused");

        session.stop();
        assert!(!session.state().is_searching);
        assert!(!session.state().is_paused);
    }

    #[test]
    fn pause_and_resume_are_ignored_while_idle() {
        let mut session = SearchSession::new(5);
        assert!(!session.pause());
        assert!(!session.state().is_paused);
        assert!(!session.resume());
    }

    #[test]
    fn stop_clears_pause_and_processed_and_is_idempotent() {
        let mut session = SearchSession::new(5);
        session.reset(query());
        session.admit("/pages/a".to_string());
        session.pause();

        session.stop();
        assert!(session.processed().is_empty());
        assert!(!session.state().is_paused);
        let after_first = session.state().clone();

        session.stop();
        assert!(session.processed().is_empty());
        assert_eq!(session.state(), &after_first);
    }

    #[test]
    fn start_resets_counters_and_unpauses() {
        let mut session = SearchSession::new(5);
        session.reset(query());
        session.record_scroll();
        session.record_scroll();
        session.admit("/pages/a".to_string());
        session.pause();

        let next = SearchQuery::new("ana", SearchType::People, Some("Lima".to_string()));
        session.reset(next.clone());

        assert_eq!(session.state().scroll_count, 0);
        assert!(session.is_active());
        assert_eq!(session.state().query, next);
        assert!(session.processed().contains("/pages/a"));
    }

    #[test]
    fn admit_is_at_most_once_per_session() {
        let mut session = SearchSession::new(5);
        session.reset(query());

        assert!(session.admit("/pages/a".to_string()));
        assert!(!session.admit("/pages/a".to_string()));
        assert!(session.admit("/pages/b".to_string()));
        assert_eq!(session.processed().len(), 2);
        assert!(session.processed().contains("/pages/a"));

        session.stop();
        session.reset(query());
        assert!(session.admit("/pages/a".to_string()), "new session forgets old links");
    }
}
