// src/services/watch.rs

use crate::models::{ServiceError, TeamEvent};
use crate::services::leaderboard;
use crate::utils::store::TeamStore;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

// Events buffered per team channel before slow observers start skipping
const CHANNEL_CAPACITY: usize = 16;

// Fan-out registry for live team updates. All observers of a team share one
// underlying broadcast channel; the channel is created by the first
// subscriber and removed when the last subscription is dropped.
//
// Constructed once in main and injected; nothing in here is a process-wide
// singleton.
#[derive(Clone)]
pub struct WatchRegistry {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<TeamEvent>>>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        WatchRegistry {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // Register an observer for a team. The returned subscription is the
    // cancellation handle: dropping it unregisters the observer.
    pub fn subscribe(&self, team_id: &str) -> Result<TeamSubscription, ServiceError> {
        let mut channels = self.channels.lock().map_err(|e| {
            warn!("Watch registry lock error: {:?}", e);
            ServiceError::BackendUnavailable("Watch registry unavailable".to_string())
        })?;

        let sender = channels.entry(team_id.to_string()).or_insert_with(|| {
            debug!("Opening watch channel for team: {}", team_id);
            broadcast::channel(CHANNEL_CAPACITY).0
        });

        let receiver = sender.subscribe();

        Ok(TeamSubscription {
            team_id: team_id.to_string(),
            registry: self.clone(),
            receiver,
        })
    }

    // Push an event to every observer of a team. Returns how many observers
    // will see it; teams nobody watches are skipped entirely.
    pub fn publish(&self, team_id: &str, event: TeamEvent) -> usize {
        let mut channels = match self.channels.lock() {
            Ok(channels) => channels,
            Err(e) => {
                warn!("Watch registry lock error during publish: {:?}", e);
                return 0;
            }
        };

        // Sweep channels whose observers all disappeared without an orderly
        // release (e.g. dropped mid-send)
        channels.retain(|_, sender| sender.receiver_count() > 0);

        match channels.get(team_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    // Whether any observer currently watches the team
    pub fn is_watched(&self, team_id: &str) -> bool {
        self.observer_count(team_id) > 0
    }

    pub fn observer_count(&self, team_id: &str) -> usize {
        match self.channels.lock() {
            Ok(channels) => channels
                .get(team_id)
                .map(|sender| sender.receiver_count())
                .unwrap_or(0),
            Err(_) => 0,
        }
    }

    // Called from TeamSubscription::drop while its receiver is still alive:
    // a count of one means the caller is the last observer
    fn release(&self, team_id: &str) {
        if let Ok(mut channels) = self.channels.lock() {
            if let Some(sender) = channels.get(team_id) {
                if sender.receiver_count() <= 1 {
                    debug!("Closing watch channel for team: {}", team_id);
                    channels.remove(team_id);
                }
            }
        }
    }
}

impl Default for WatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// One observer's registration on a team channel
pub struct TeamSubscription {
    team_id: String,
    registry: WatchRegistry,
    receiver: broadcast::Receiver<TeamEvent>,
}

impl TeamSubscription {
    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    // Wait for the next event. Returns None once the channel is gone.
    // An observer that falls behind the channel buffer resumes from the
    // oldest retained event instead of failing.
    pub async fn next(&mut self) -> Option<TeamEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "Observer of team {} lagged, skipped {} events",
                        self.team_id, skipped
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for TeamSubscription {
    fn drop(&mut self) {
        self.registry.release(&self.team_id);
    }
}

// Recompute a team's snapshot and push it to watchers. A failed projection
// read is pushed as an explicit unavailable event, never as an empty
// leaderboard; a vanished team is pushed as deleted.
pub fn publish_team_update(store: &TeamStore, registry: &WatchRegistry, team_id: &str) {
    let event = match leaderboard::snapshot(store, team_id) {
        Ok(Some(snapshot)) => TeamEvent::Snapshot(snapshot),
        Ok(None) => TeamEvent::Deleted,
        Err(e) => TeamEvent::Unavailable {
            message: e.to_string(),
        },
    };

    registry.publish(team_id, event);
}
