use crate::bus::Event;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Relay between the engine and the controller. Logs lifecycle traffic, forwards everything.
pub struct Coordinator {
    from_engine: mpsc::UnboundedReceiver<Event>,
    to_controller: mpsc::UnboundedSender<Event>,
}

impl Coordinator {
    pub fn new(
        from_engine: mpsc::UnboundedReceiver<Event>,
        to_controller: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            from_engine,
            to_controller,
        }
    }

    /// Relay until the engine side closes
    pub async fn run(mut self) {
        info!("Coordinator installed");

        while let Some(event) = self.from_engine.recv().await {
            match &event {
                Event::ContentScriptLoaded => info!("Scraper engine loaded in page"),
                Event::ProfileFound(entity) => debug!(url = %entity.profile_url, "Relaying discovery"),
            }
            if self.to_controller.send(event).is_err() {
                debug!("Controller is gone, dropping event");
            }
        }

        info!("Coordinator stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveredEntity, SearchType};

    #[tokio::test]
    async fn forwards_events_in_order_and_unchanged() {
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let (controller_tx, mut controller_rx) = mpsc::unbounded_channel();
        let relay = tokio::spawn(Coordinator::new(engine_rx, controller_tx).run());

        let entity = DiscoveredEntity {
            name: "Lima Runners".to_string(),
            profile_url: "https://www.facebook.com/groups/lima-runners/".to_string(),
            entity_type: SearchType::Groups,
        };
        engine_tx.send(Event::ContentScriptLoaded).unwrap();
        engine_tx.send(Event::ProfileFound(entity.clone())).unwrap();
        drop(engine_tx);

        assert_eq!(controller_rx.recv().await, Some(Event::ContentScriptLoaded));
        assert_eq!(controller_rx.recv().await, Some(Event::ProfileFound(entity)));
        relay.await.unwrap();
        assert_eq!(controller_rx.recv().await, None);
    }

    #[tokio::test]
    async fn keeps_draining_when_controller_is_gone() {
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let (controller_tx, controller_rx) = mpsc::unbounded_channel();
        drop(controller_rx);
        let relay = tokio::spawn(Coordinator::new(engine_rx, controller_tx).run());

        engine_tx.send(Event::ContentScriptLoaded).unwrap();
        drop(engine_tx);
        relay.await.unwrap();
    }
}
