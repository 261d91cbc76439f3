use std::sync::Arc;

use search_debugger_core_types::{DebuggerStatus, SearchState, StateId};
use serde_json::Value;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::correlate::{ScrollOutcome, StateLogCorrelator, ToggleOutcome};
use crate::errors::{ViewError, ViewResult};
use crate::model::{
    png_data_uri, HostCommand, InboundMessage, OutboundMessage, PlanContext, SearchEvent,
};
use crate::policy::ViewPolicyHandle;
use crate::ports::{
    AnimationPort, DebuggerHost, EditorPort, PlanReportPort, PresentationSurface,
    SearchEventSource, SearchSubscription,
};

/// Collaborators the view talks to.
#[derive(Clone)]
pub struct ViewPorts {
    pub surface: Arc<dyn PresentationSurface>,
    pub host: Arc<dyn DebuggerHost>,
    pub editor: Arc<dyn EditorPort>,
    pub plan_report: Arc<dyn PlanReportPort>,
    pub animation: Arc<dyn AnimationPort>,
}

#[derive(Debug)]
struct AnimationCompletion {
    token: u64,
    result: ViewResult<Vec<u8>>,
}

enum SubscriptionPoll {
    Event(SearchEvent),
    Lagged(u64),
    Closed,
}

/// Relays search events to the presentation surface and surface commands to
/// the host, correlating selected states with an external log.
///
/// All handlers take `&mut self`; the view is driven from one task, either by
/// calling the handlers directly or through [`SearchDebuggerView::run`].
pub struct SearchDebuggerView {
    ports: ViewPorts,
    policy: ViewPolicyHandle,
    source: Option<Arc<dyn SearchEventSource>>,
    subscription: Option<SearchSubscription>,
    correlator: StateLogCorrelator,
    pending_resend: bool,
    status: DebuggerStatus,
    plan_context: PlanContext,
    animation_token: u64,
    animations_in_flight: usize,
    completions_tx: mpsc::UnboundedSender<AnimationCompletion>,
    completions_rx: mpsc::UnboundedReceiver<AnimationCompletion>,
}

impl SearchDebuggerView {
    pub fn new(policy: ViewPolicyHandle, ports: ViewPorts) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            ports,
            policy,
            source: None,
            subscription: None,
            correlator: StateLogCorrelator::new(),
            pending_resend: false,
            status: DebuggerStatus::off(),
            plan_context: PlanContext::default(),
            animation_token: 0,
            animations_in_flight: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn is_pending_resend(&self) -> bool {
        self.pending_resend
    }

    pub fn debugger_status(&self) -> DebuggerStatus {
        self.status
    }

    pub fn correlator(&self) -> &StateLogCorrelator {
        &self.correlator
    }

    /// Live policy; updates apply to later log scans.
    pub fn policy(&self) -> &ViewPolicyHandle {
        &self.policy
    }

    pub fn set_plan_context(&mut self, context: PlanContext) {
        self.plan_context = context;
    }

    /// Starts relaying events from `source`, releasing any previous subscription first.
    pub fn observe(&mut self, source: Arc<dyn SearchEventSource>) {
        if self.subscription.take().is_some() {
            debug!("released previous search subscription");
        }
        self.subscription = Some(source.subscribe());
        self.source = Some(source);
    }

    pub async fn set_debugger_state(&mut self, on: bool, port: u16) {
        self.apply_debugger_status(DebuggerStatus::new(on, port)).await;
    }

    async fn apply_debugger_status(&mut self, status: DebuggerStatus) {
        self.status = status;
        info!(status = %self.status, "debugger state changed");
        self.show_debugger_status().await;
    }

    pub async fn on_search_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::StateAdded { state } => {
                self.post(OutboundMessage::StateAdded { state }).await
            }
            SearchEvent::StateUpdated { state } => {
                self.post(OutboundMessage::StateUpdated { state }).await
            }
            SearchEvent::BetterState { state } => self.display_better_state(&state).await,
            SearchEvent::PlanFound { states } => {
                self.post(OutboundMessage::ShowPlan { state: states }).await
            }
        }
    }

    /// Handles every event already queued on the current subscription.
    pub async fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(subscription) = self.subscription.as_mut() else {
                return handled;
            };
            match subscription.receiver_mut().try_recv() {
                Ok(event) => {
                    self.on_search_event(event).await;
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => self.on_subscription_lagged(skipped).await,
                Err(TryRecvError::Empty) => return handled,
                Err(TryRecvError::Closed) => {
                    self.on_subscription_closed();
                    return handled;
                }
            }
        }
    }

    pub async fn on_visibility_changed(&mut self, visible: bool) {
        if !visible {
            return;
        }
        self.show_debugger_status().await;
        if self.pending_resend {
            self.show_all_states().await;
            self.pending_resend = false;
        }
    }

    pub async fn on_message(&mut self, message: Value) {
        match InboundMessage::parse(&message) {
            Ok(parsed) => self.dispatch(parsed).await,
            Err(ViewError::UnknownCommand(command)) => {
                warn!(%command, "unexpected command from presentation surface")
            }
            Err(err) => warn!(%err, "ignoring malformed presentation surface message"),
        }
    }

    async fn dispatch(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::Onload => self.show_debugger_status().await,
            InboundMessage::StateSelected {
                state_id,
                state_info,
            } => self.on_state_selected(state_id, state_info).await,
            InboundMessage::StartDebugger => {
                self.execute_host(HostCommand::Start).await;
                self.correlator.reset_cache();
            }
            InboundMessage::StopDebugger => self.execute_host(HostCommand::Stop).await,
            InboundMessage::Reset => self.execute_host(HostCommand::Reset).await,
            InboundMessage::ToggleStateLog => self.toggle_state_log().await,
        }
    }

    async fn on_state_selected(&mut self, state_id: Option<StateId>, state_info: String) {
        let Some(state_id) = state_id else {
            debug!("state selection cleared");
            return;
        };
        self.request_node_image(state_info);

        // Plan and log scroll are independent; report the first failure only.
        let plan = self.show_state_plan(state_id).await;
        let scroll = self.scroll_state_log(state_id).await.map(|_| ());
        if let Err(err) = plan.and(scroll) {
            warn!(state = %state_id, %err, "state selection failed");
            self.ports
                .host
                .show_error(&format!("Error while displaying state-plan: {err}"))
                .await;
        }
    }

    async fn display_better_state(&mut self, state: &SearchState) {
        if let Err(err) = self.show_state_plan(state.id).await {
            warn!(state = %state.id, %err, "cannot display better state");
            self.ports.host.show_error(&err.to_string()).await;
        }
    }

    /// Renders the plan leading to `state_id` and pushes it to the surface.
    pub async fn show_state_plan(&mut self, state_id: StateId) -> ViewResult<()> {
        let Some(state) = self.lookup_state(state_id).await? else {
            return Ok(());
        };
        let html = self
            .ports
            .plan_report
            .render_state_plan(&state, &self.plan_context)
            .await?;
        self.post(OutboundMessage::ShowStatePlan { state: html })
            .await;
        Ok(())
    }

    pub async fn scroll_state_log(&mut self, state_id: StateId) -> ViewResult<ScrollOutcome> {
        if !self.correlator.is_bound() {
            return Ok(ScrollOutcome::NoLog);
        }
        let Some(state) = self.lookup_state(state_id).await? else {
            return Ok(ScrollOutcome::UnknownState);
        };
        let pattern = self.policy.pattern();
        self.correlator
            .scroll_to(&state, &pattern, self.ports.editor.as_ref())
            .await
    }

    pub async fn toggle_state_log(&mut self) {
        match self.correlator.toggle(self.ports.editor.as_ref()).await {
            Ok(ToggleOutcome::Unbound) => {
                self.post(OutboundMessage::StateLog { state: None }).await
            }
            Ok(ToggleOutcome::Bound(path)) => {
                let state = Some(path.display().to_string());
                self.post(OutboundMessage::StateLog { state }).await
            }
            Ok(ToggleOutcome::Unchanged) => {}
            Err(err) => warn!(%err, "cannot toggle state log"),
        }
    }

    /// Re-sends every state the source currently knows about.
    pub async fn show_all_states(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        match source.all_states().await {
            Ok(states) => {
                debug!(count = states.len(), "re-sending all states");
                self.post(OutboundMessage::ShowAllStates { state: states })
                    .await
            }
            Err(err) => warn!(%err, "cannot fetch states for resend"),
        }
    }

    /// Session reset: empties the surface and forgets the log binding and its cache.
    pub async fn clear(&mut self) {
        self.post(OutboundMessage::clear()).await;
        self.correlator.clear();
    }

    /// Waits until every animation request issued so far has been handled.
    pub async fn settle_animations(&mut self) {
        while self.animations_in_flight > 0 {
            match self.completions_rx.recv().await {
                Some(done) => self.on_animation_completion(done).await,
                None => return,
            }
        }
    }

    /// Drives the view until the surface's inbound channel closes.
    pub async fn run(
        &mut self,
        mut inbound: mpsc::Receiver<Value>,
        mut visibility: mpsc::Receiver<bool>,
    ) {
        info!("search debugger view running");
        loop {
            tokio::select! {
                message = inbound.recv() => match message {
                    Some(message) => self.on_message(message).await,
                    None => break,
                },
                Some(visible) = visibility.recv() => self.on_visibility_changed(visible).await,
                polled = next_search_event(&mut self.subscription) => match polled {
                    SubscriptionPoll::Event(event) => self.on_search_event(event).await,
                    SubscriptionPoll::Lagged(skipped) => self.on_subscription_lagged(skipped).await,
                    SubscriptionPoll::Closed => self.on_subscription_closed(),
                },
                Some(done) = self.completions_rx.recv() => self.on_animation_completion(done).await,
            }
        }
        info!("presentation surface closed, view stopped");
    }

    fn request_node_image(&mut self, state_info: String) {
        if !self.policy.snapshot().animate_selection {
            return;
        }
        self.animation_token += 1;
        self.animations_in_flight += 1;
        let token = self.animation_token;
        let animation = Arc::clone(&self.ports.animation);
        let context = self.plan_context.clone();
        let completions = self.completions_tx.clone();
        let render =
            tokio::spawn(async move { animation.render_node(&state_info, &context).await });
        // A render task that dies still completes, so in-flight accounting settles.
        tokio::spawn(async move {
            let result = match render.await {
                Ok(result) => result,
                Err(err) => Err(ViewError::Animation(format!("render task failed: {err}"))),
            };
            let _ = completions.send(AnimationCompletion { token, result });
        });
    }

    async fn on_animation_completion(&mut self, done: AnimationCompletion) {
        self.animations_in_flight = self.animations_in_flight.saturating_sub(1);
        if done.token != self.animation_token {
            debug!(
                token = done.token,
                latest = self.animation_token,
                "dropping stale node image"
            );
            return;
        }
        match done.result {
            Ok(bytes) => {
                let state = png_data_uri(&bytes);
                self.post(OutboundMessage::GetPngOfNode { state }).await
            }
            Err(err) => warn!(%err, "node image request failed"),
        }
    }

    async fn on_subscription_lagged(&mut self, skipped: u64) {
        warn!(skipped, "search subscription lagged, re-sending all states");
        self.show_all_states().await;
    }

    fn on_subscription_closed(&mut self) {
        info!("search event source closed");
        self.subscription = None;
    }

    async fn lookup_state(&self, state_id: StateId) -> ViewResult<Option<SearchState>> {
        match &self.source {
            Some(source) => source.state_by_id(state_id).await,
            None => Ok(None),
        }
    }

    async fn execute_host(&mut self, command: HostCommand) {
        match self.ports.host.execute(command).await {
            Ok(status) if status != self.status => self.apply_debugger_status(status).await,
            Ok(_) => debug!(command = command.as_str(), "debugger status unchanged"),
            Err(err) => warn!(command = command.as_str(), %err, "host command failed"),
        }
    }

    async fn show_debugger_status(&mut self) {
        let state = self.status;
        self.post(OutboundMessage::DebuggerState { state }).await;
    }

    /// Sends regardless of visibility; a send while hidden schedules a full resend.
    async fn post(&mut self, message: OutboundMessage) {
        if !self.ports.surface.is_visible() {
            self.pending_resend = true;
        }
        let command = message.kind();
        if let Err(err) = self.ports.surface.post(message).await {
            warn!(command, %err, "failed to deliver message to presentation surface");
        }
    }
}

async fn next_search_event(subscription: &mut Option<SearchSubscription>) -> SubscriptionPoll {
    match subscription {
        Some(subscription) => match subscription.receiver_mut().recv().await {
            Ok(event) => SubscriptionPoll::Event(event),
            Err(RecvError::Lagged(skipped)) => SubscriptionPoll::Lagged(skipped),
            Err(RecvError::Closed) => SubscriptionPoll::Closed,
        },
        None => std::future::pending().await,
    }
}
