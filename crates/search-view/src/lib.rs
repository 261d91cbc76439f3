//! Search debugger view: relays planner search events to a sandboxed
//! presentation surface, gates delivery on visibility, and correlates
//! selected states with lines of an external planner log.

pub mod adapters;
pub mod api;
pub mod correlate;
pub mod errors;
pub mod model;
pub mod policy;
pub mod ports;

pub use api::{SearchDebuggerView, ViewPorts};
pub use correlate::{ScrollOutcome, StateLogCorrelator, ToggleOutcome};
pub use errors::{ViewError, ViewResult};
pub use model::{HostCommand, InboundMessage, OutboundMessage, PlanContext, SearchEvent};
pub use policy::{LogPattern, ViewPolicyHandle, ViewPolicyView};
