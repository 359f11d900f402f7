//! The scraper engine: one task that owns the search session and drives the page.
//!
//! Commands, the pending navigation, the post-navigation settle delay and the scroll
//! ticks are multiplexed in a single `select!` loop, so a command is always handled
//! between ticks and never while one is in progress. Navigation runs on its own task,
//! which keeps the inbox answering while the browser loads the results page.

use crate::bus::{Ack, Command, Envelope, Event};
use crate::config::{DedupKey, EngineConfig};
use crate::error::{Result, ScoutError};
use crate::models::{DiscoveredEntity, SearchQuery};
use crate::scrapers::extract::Extractor;
use crate::scrapers::session::SearchSession;
use crate::scrapers::stagnation::StagnationSignal;
use crate::scrapers::traits::PageDriver;
use crate::scrapers::types::{EnginePhase, EngineStatus};
use crate::scrapers::url_builder::build_search_url;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, error, info, warn};
use url::Url;

const COMMAND_BUFFER: usize = 32;

enum Phase {
    Idle,
    Navigating(JoinHandle<Result<()>>),
    Settling(Pin<Box<Sleep>>),
    Scrolling(Interval),
    Stalled,
}

enum Due {
    Navigated(Result<()>),
    Settled,
    Tick,
}

/// Resolves when the current phase has timed work to do; never while idle or stalled
async fn next_due(phase: &mut Phase) -> Due {
    match phase {
        Phase::Navigating(task) => {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(e.into()),
            };
            Due::Navigated(result)
        }
        Phase::Settling(sleep) => {
            sleep.as_mut().await;
            Due::Settled
        }
        Phase::Scrolling(interval) => {
            interval.tick().await;
            Due::Tick
        }
        Phase::Idle | Phase::Stalled => std::future::pending().await,
    }
}

pub struct ScraperEngine<P: PageDriver> {
    page: Arc<P>,
    config: EngineConfig,
    origin: Url,
    session: SearchSession,
    extractor: Option<Extractor>,
    phase: Phase,
    events: mpsc::UnboundedSender<Event>,
    status: watch::Sender<EngineStatus>,
}

impl<P: PageDriver + 'static> ScraperEngine<P> {
    pub fn new(page: P, config: &EngineConfig, events: mpsc::UnboundedSender<Event>) -> Result<Self> {
        let origin = config.origin_url()?;
        let (status, _) = watch::channel(EngineStatus::default());

        Ok(Self {
            page: Arc::new(page),
            config: config.clone(),
            origin,
            session: SearchSession::new(config.stagnation_threshold),
            extractor: None,
            phase: Phase::Idle,
            events,
            status,
        })
    }

    /// Run the engine on its own task
    pub fn spawn(self) -> (EngineHandle, JoinHandle<()>) {
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let handle = EngineHandle {
            commands,
            status: self.status.subscribe(),
        };
        let task = tokio::spawn(self.run(inbox));
        (handle, task)
    }

    async fn run(mut self, mut inbox: mpsc::Receiver<Envelope>) {
        info!(driver = self.page.driver_name(), "Scraper engine loaded");
        self.emit(Event::ContentScriptLoaded);
        self.publish_status();

        loop {
            tokio::select! {
                envelope = inbox.recv() => {
                    let Some(Envelope { command, ack }) = envelope else {
                        info!("Command channel closed, scraper engine stopping");
                        break;
                    };
                    // Receipt only; the command's async work may still be pending.
                    let _ = ack.send(Ack::ok());
                    self.handle(command).await;
                }
                due = next_due(&mut self.phase) => self.on_due(due).await,
            }
        }
    }

    async fn on_due(&mut self, due: Due) {
        match due {
            Due::Navigated(result) => self.navigated(result),
            Due::Settled => self.arm().await,
            Due::Tick => self.tick().await,
        }
    }

    /// Replace the current phase, cancelling a navigation still in flight
    fn enter(&mut self, phase: Phase) {
        if let Phase::Navigating(task) = std::mem::replace(&mut self.phase, phase) {
            debug!("Abandoning pending navigation");
            task.abort();
        }
    }

    pub async fn handle(&mut self, command: Command) {
        debug!(action = command.action(), "Command received");
        match command {
            Command::StartSearch(start) => self.start(start.into()).await,
            Command::StopSearch => self.stop(),
            Command::PauseSearch => self.pause(),
            Command::ResumeSearch => self.resume(),
        }
        self.publish_status();
    }

    async fn start(&mut self, query: SearchQuery) {
        info!(
            term = %query.term,
            search_type = %query.search_type,
            city = ?query.city,
            "Starting search"
        );

        // Drops any previous navigation, settle timer or scroll interval.
        self.enter(Phase::Idle);
        let search_type = query.search_type;
        let url = build_search_url(&self.origin, &query);
        self.session.reset(query);

        self.extractor = match Extractor::for_type(search_type, self.origin.clone()) {
            Ok(extractor) => Some(extractor),
            Err(e) => {
                error!("Cannot extract {} results: {}", search_type, e);
                self.enter(Phase::Stalled);
                return;
            }
        };

        info!("Search URL: {}", url);
        let page = Arc::clone(&self.page);
        self.enter(Phase::Navigating(tokio::spawn(async move {
            page.navigate(&url).await
        })));
    }

    fn navigated(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                debug!("Waiting {:?} for results to render", self.config.settle_delay());
                let settle = Box::pin(time::sleep(self.config.settle_delay()));
                self.enter(Phase::Settling(settle));
            }
            Err(e) => {
                error!("{}; search stays active without a scroll loop until restarted", e);
                self.enter(Phase::Stalled);
            }
        }
        self.publish_status();
    }

    fn stop(&mut self) {
        info!("Stopping search");
        if !self.session.processed().is_empty() {
            debug!("Forgetting {} processed links", self.session.processed().len());
        }
        self.enter(Phase::Idle);
        self.extractor = None;
        self.session.stop();
    }

    fn pause(&mut self) {
        if self.session.pause() {
            info!("Pausing search");
        } else {
            debug!("Pause ignored: no running search");
        }
    }

    fn resume(&mut self) {
        if self.session.resume() {
            info!("Resuming search");
        } else {
            debug!("Resume ignored: search is not paused");
        }
    }

    /// Start the periodic tick. The first tick fires one period from now.
    async fn arm(&mut self) {
        let baseline = match self.page.document_height().await {
            Ok(height) => height,
            Err(e) => {
                warn!("Could not read document height, starting from 0: {}", e);
                0
            }
        };
        self.session.arm(baseline);

        let period = self.config.tick_interval();
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.enter(Phase::Scrolling(interval));

        info!("Starting scroll loop every {:?}", period);
        self.publish_status();
    }

    /// One scroll/extract cycle. A no-op unless searching and not paused.
    pub async fn tick(&mut self) {
        if !self.session.is_active() {
            debug!("Tick skipped: search paused");
            return;
        }

        match self.page.scroll_by(self.config.scroll_step_px).await {
            Ok(()) => self.session.record_scroll(),
            Err(e) => warn!("Scroll failed: {}", e),
        }

        self.process_visible().await;

        match self.page.document_height().await {
            Ok(height) => match self.session.observe_height(height) {
                StagnationSignal::Backoff => info!(
                    scrolls = self.session.state().scroll_count,
                    backoffs = self.session.stagnation().backoffs(),
                    "No new content found, waiting longer"
                ),
                StagnationSignal::Unchanged(ticks) => {
                    debug!(ticks, "Document height unchanged")
                }
                StagnationSignal::Grew => debug!(height, "New content loaded"),
            },
            Err(e) => warn!("Could not read document height: {}", e),
        }

        self.publish_status();
    }

    async fn process_visible(&mut self) {
        let html = match self.page.document_html().await {
            Ok(html) => html,
            Err(e) => {
                warn!("Skipping extraction this tick: {}", e);
                return;
            }
        };
        let Some(extractor) = &self.extractor else {
            return;
        };

        let search_type = extractor.search_type();
        let candidates = extractor.extract(&html);

        for candidate in candidates {
            let key = match self.config.dedup_key {
                DedupKey::Normalized => candidate.profile_url.clone(),
                DedupKey::Raw => candidate.raw_href.clone(),
            };
            if !self.session.admit(key) {
                continue;
            }

            let entity = DiscoveredEntity {
                name: candidate.name,
                profile_url: candidate.profile_url,
                entity_type: search_type,
            };
            info!(name = %entity.name, url = %entity.profile_url, "{} found", search_type);
            self.emit(Event::ProfileFound(entity));
        }
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("No listener for engine events");
        }
    }

    fn current_phase(&self) -> EnginePhase {
        let paused = self.session.state().is_paused;
        match &self.phase {
            Phase::Idle => EnginePhase::Idle,
            Phase::Stalled => EnginePhase::Stalled,
            Phase::Navigating(_) if paused => EnginePhase::Paused,
            Phase::Navigating(_) => EnginePhase::Navigating,
            Phase::Settling(_) if paused => EnginePhase::Paused,
            Phase::Settling(_) => EnginePhase::Settling,
            Phase::Scrolling(_) if paused => EnginePhase::Paused,
            Phase::Scrolling(_) => EnginePhase::Scrolling,
        }
    }

    fn publish_status(&self) {
        self.status.send_replace(EngineStatus {
            phase: self.current_phase(),
            state: self.session.state().clone(),
            processed_urls: self.session.processed().len(),
            document_height: self.session.stagnation().baseline(),
            stagnant_ticks: self.session.stagnation().unchanged(),
        });
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Wait for the next timed step and run it, as the spawned loop would
    #[cfg(test)]
    pub(crate) async fn advance(&mut self) {
        let due = next_due(&mut self.phase).await;
        self.on_due(due).await;
    }
}

/// Addressable end of a running engine
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Envelope>,
    status: watch::Receiver<EngineStatus>,
}

impl EngineHandle {
    /// Deliver a command and wait for its receipt
    pub async fn send(&self, command: Command) -> Result<Ack> {
        let action = command.action();
        let (ack, receipt) = oneshot::channel();

        self.commands
            .send(Envelope { command, ack })
            .await
            .map_err(|_| ScoutError::MissingTarget { action })?;

        receipt
            .await
            .map_err(|_| ScoutError::MissingTarget { action })
    }

    pub fn status(&self) -> EngineStatus {
        self.status.borrow().clone()
    }
}
