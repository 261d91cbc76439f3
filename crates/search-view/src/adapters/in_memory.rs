use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use search_debugger_core_types::{SearchState, StateId};
use search_debugger_event_bus::{EventBus, InMemoryBus};
use tracing::warn;

use crate::errors::ViewResult;
use crate::model::SearchEvent;
use crate::ports::{SearchEventSource, SearchSubscription};

const DEFAULT_BUS_CAPACITY: usize = 1_024;

/// Search event source backed by an in-process state table.
///
/// Recording a state and publishing its event happen together, so a
/// subscriber that resolves an id from an event always finds the state.
pub struct InMemorySearchSource {
    states: RwLock<BTreeMap<StateId, SearchState>>,
    bus: Arc<InMemoryBus<SearchEvent>>,
}

impl InMemorySearchSource {
    pub fn new() -> Arc<Self> {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            states: RwLock::new(BTreeMap::new()),
            bus: InMemoryBus::new(capacity),
        })
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }

    pub async fn add_state(&self, state: SearchState) {
        self.record(&state);
        self.publish(SearchEvent::StateAdded { state }).await;
    }

    pub async fn update_state(&self, state: SearchState) {
        self.record(&state);
        self.publish(SearchEvent::StateUpdated { state }).await;
    }

    pub async fn better_state(&self, state: SearchState) {
        self.record(&state);
        self.publish(SearchEvent::BetterState { state }).await;
    }

    pub async fn plan_found(&self, states: Vec<SearchState>) {
        self.publish(SearchEvent::PlanFound { states }).await;
    }

    /// Routes a replayed event through the matching recorder.
    pub async fn apply(&self, event: SearchEvent) {
        match event {
            SearchEvent::StateAdded { state } => self.add_state(state).await,
            SearchEvent::StateUpdated { state } => self.update_state(state).await,
            SearchEvent::BetterState { state } => self.better_state(state).await,
            SearchEvent::PlanFound { states } => self.plan_found(states).await,
        }
    }

    fn record(&self, state: &SearchState) {
        self.states.write().insert(state.id, state.clone());
    }

    async fn publish(&self, event: SearchEvent) {
        let kind = event.kind();
        if let Err(err) = self.bus.publish(event).await {
            warn!(event = kind, ?err, "search event publish failed");
        }
    }
}

#[async_trait]
impl SearchEventSource for InMemorySearchSource {
    fn subscribe(&self) -> SearchSubscription {
        SearchSubscription::new(self.bus.subscribe())
    }

    async fn state_by_id(&self, id: StateId) -> ViewResult<Option<SearchState>> {
        Ok(self.states.read().get(&id).cloned())
    }

    async fn all_states(&self) -> ViewResult<Vec<SearchState>> {
        Ok(self.states.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_replaces_recorded_state() {
        let source = InMemorySearchSource::new();
        source.add_state(SearchState::new(1, "a")).await;
        source
            .update_state(SearchState::new(1, "a").with_detail("h", 3))
            .await;
        let state = source.state_by_id(StateId(1)).await.unwrap().unwrap();
        assert_eq!(state.detail.get("h"), Some(&serde_json::json!(3)));
        assert_eq!(source.len(), 1);
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let source = InMemorySearchSource::new();
        let mut sub = source.subscribe();
        source.add_state(SearchState::new(1, "a")).await;
        source.plan_found(vec![SearchState::new(1, "a")]).await;
        assert_eq!(sub.receiver_mut().recv().await.unwrap().kind(), "stateAdded");
        assert_eq!(sub.receiver_mut().recv().await.unwrap().kind(), "planFound");
    }

    #[tokio::test]
    async fn all_states_sorted_by_id() {
        let source = InMemorySearchSource::new();
        source.add_state(SearchState::new(3, "c")).await;
        source.add_state(SearchState::new(1, "a")).await;
        let ids: Vec<_> = source
            .all_states()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id.0)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
