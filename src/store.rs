//! Data Store
//!
//! Per-resource state, concurrent refresh cycles and the polling task.

use crate::api::ResourceClient;
use crate::model::{Event, FlightTask, Mission, Node, Stage, Weapon};
use crate::normalize::{
    normalize_event_list, normalize_flight_task_list, normalize_mission_list,
    normalize_stage_list, normalize_weapon_list,
};
use crate::resource::{fetch_list, fetch_nodes, ResourceKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

// =========================================================================
// Resource State
// =========================================================================

/// Data, loading flag and last error for one resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceState<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T> ResourceState<T> {
    /// Start a refresh. Returns whether the loading flag was raised, which
    /// only happens while nothing is held yet.
    fn begin(&mut self) -> bool {
        let show_loading = self.data.is_empty();
        if show_loading {
            self.loading = true;
        }
        self.error = None;
        show_loading
    }

    /// Record the outcome. A failure keeps the previous data.
    fn settle(&mut self, result: Result<Vec<T>, String>, show_loading: bool) {
        match result {
            Ok(data) => self.data = data,
            Err(message) => self.error = Some(message),
        }
        if show_loading {
            self.loading = false;
        }
    }
}

/// Point-in-time copy of every resource
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub missions: ResourceState<Mission>,
    pub stages: ResourceState<Stage>,
    pub flight_tasks: ResourceState<FlightTask>,
    pub weapons: ResourceState<Weapon>,
    pub nodes: ResourceState<Node>,
    pub events: ResourceState<Event>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StoreSnapshot {
    /// Resources held by the store, in display order
    pub const KINDS: [ResourceKind; 6] = [
        ResourceKind::Missions,
        ResourceKind::Stages,
        ResourceKind::FlightTasks,
        ResourceKind::Weapons,
        ResourceKind::Nodes,
        ResourceKind::Events,
    ];

    /// One resource's state as JSON; `None` for kinds the store does not hold
    pub fn resource_json(&self, kind: ResourceKind) -> Option<Value> {
        let value = match kind {
            ResourceKind::Missions => serde_json::to_value(&self.missions),
            ResourceKind::Stages => serde_json::to_value(&self.stages),
            ResourceKind::FlightTasks => serde_json::to_value(&self.flight_tasks),
            ResourceKind::Weapons => serde_json::to_value(&self.weapons),
            ResourceKind::Nodes => serde_json::to_value(&self.nodes),
            ResourceKind::Events => serde_json::to_value(&self.events),
            ResourceKind::NodeMetrics | ResourceKind::Pods => return None,
        };
        value.ok()
    }

    /// Item count and error for one resource
    pub fn summary(&self, kind: ResourceKind) -> Option<(usize, Option<&str>)> {
        fn parts<T>(state: &ResourceState<T>) -> (usize, Option<&str>) {
            (state.data.len(), state.error.as_deref())
        }
        match kind {
            ResourceKind::Missions => Some(parts(&self.missions)),
            ResourceKind::Stages => Some(parts(&self.stages)),
            ResourceKind::FlightTasks => Some(parts(&self.flight_tasks)),
            ResourceKind::Weapons => Some(parts(&self.weapons)),
            ResourceKind::Nodes => Some(parts(&self.nodes)),
            ResourceKind::Events => Some(parts(&self.events)),
            ResourceKind::NodeMetrics | ResourceKind::Pods => None,
        }
    }
}

// =========================================================================
// Store
// =========================================================================

type Slot<T> = fn(&mut StoreSnapshot) -> &mut ResourceState<T>;

struct Shared {
    client: ResourceClient,
    state: RwLock<StoreSnapshot>,
    /// Completed refresh cycles
    cycles: watch::Sender<u64>,
}

impl Shared {
    async fn refresh_all(&self) {
        futures::join!(
            self.load(ResourceKind::Missions, |s| &mut s.missions, normalize_mission_list),
            self.load(ResourceKind::Stages, |s| &mut s.stages, normalize_stage_list),
            self.load(
                ResourceKind::FlightTasks,
                |s| &mut s.flight_tasks,
                normalize_flight_task_list
            ),
            self.load(ResourceKind::Weapons, |s| &mut s.weapons, normalize_weapon_list),
            self.load_nodes(),
            self.load(ResourceKind::Events, |s| &mut s.events, normalize_event_list),
        );

        self.state.write().await.last_updated = Some(Utc::now());
        self.cycles.send_modify(|count| *count += 1);
        tracing::debug!("Refresh cycle complete");
    }

    async fn load<T>(&self, kind: ResourceKind, slot: Slot<T>, normalize: fn(&Value) -> Vec<T>) {
        let show_loading = slot(&mut *self.state.write().await).begin();

        let result = fetch_list(&self.client, kind, normalize)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to load {}: {}", kind, e);
                e.to_string()
            });

        slot(&mut *self.state.write().await).settle(result, show_loading);
    }

    async fn load_nodes(&self) {
        let show_loading = self.state.write().await.nodes.begin();

        let result = fetch_nodes(&self.client).await;

        let mut state = self.state.write().await;
        match result {
            Ok(fetched) => {
                state.nodes.settle(Ok(fetched.nodes), show_loading);
                state.nodes.error = fetched.warning;
            }
            Err(e) => {
                tracing::warn!("Failed to load nodes: {}", e);
                state.nodes.settle(Err(e.to_string()), show_loading);
            }
        }
    }
}

/// Holds resource state and owns the polling task
pub struct DataStore {
    shared: Arc<Shared>,
    refresh_interval: Duration,
    poller: Option<JoinHandle<()>>,
}

impl DataStore {
    pub fn new(client: ResourceClient, refresh_interval: Duration) -> Self {
        let (cycles, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                client,
                state: RwLock::new(StoreSnapshot::default()),
                cycles,
            }),
            refresh_interval,
            poller: None,
        }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.shared.client
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Refresh every resource concurrently and wait for all of them to settle
    pub async fn refresh_all(&self) {
        self.shared.refresh_all().await;
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.shared.state.read().await.clone()
    }

    /// Receiver that changes after every completed refresh cycle
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.cycles.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start refreshing on the configured interval. The first cycle runs one
    /// interval from now.
    ///
    /// Returns `false` when already polling or when the interval is zero.
    pub fn start_polling(&mut self) -> bool {
        if self.is_polling() {
            return false;
        }
        if self.refresh_interval.is_zero() {
            tracing::info!("Polling disabled (interval is zero)");
            return false;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.refresh_interval;
        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                shared.refresh_all().await;
            }
        }));
        tracing::info!("Polling every {:?}", period);
        true
    }

    /// Cancel the polling task. Restarting requires another `start_polling`.
    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
            tracing::info!("Polling stopped");
        }
    }
}

impl Drop for DataStore {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
    }
}
