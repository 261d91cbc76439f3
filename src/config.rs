use search_debugger_net::PlanimationConfig;
use search_view::ViewPolicyView;
use serde::{Deserialize, Serialize};

/// Matches planner log lines such as `; 42 expanded` and captures the state id.
pub const DEFAULT_STATE_LOG_PATTERN: &str = r"^; (\d+)\b";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchDebuggerSection {
    pub state_log_pattern: String,
    /// Port the planner debugger listens on; 0 lets the host pick one.
    pub port: u16,
    pub animate_selection: bool,
}

impl Default for SearchDebuggerSection {
    fn default() -> Self {
        Self {
            state_log_pattern: DEFAULT_STATE_LOG_PATTERN.to_string(),
            port: 0,
            animate_selection: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub search_debugger: SearchDebuggerSection,
    pub planimation: PlanimationConfig,
}

impl AppConfig {
    pub fn view_policy(&self) -> ViewPolicyView {
        ViewPolicyView {
            state_log_pattern: self.search_debugger.state_log_pattern.clone(),
            animate_selection: self.animation_enabled(),
        }
    }

    /// Node images need an animation profile to render against.
    pub fn animation_enabled(&self) -> bool {
        self.search_debugger.animate_selection
            && !self.planimation.animation_profile.trim().is_empty()
    }
}
