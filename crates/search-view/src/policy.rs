use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ViewError, ViewResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewPolicyView {
    /// Regex with exactly one capture group; group 1 is compared to a state's `origId`.
    pub state_log_pattern: String,
    pub animate_selection: bool,
}

impl Default for ViewPolicyView {
    fn default() -> Self {
        Self {
            state_log_pattern: String::new(),
            animate_selection: true,
        }
    }
}

impl ViewPolicyView {
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            state_log_pattern: pattern.into(),
            ..Self::default()
        }
    }
}

/// Compiled log-line correlation pattern.
#[derive(Debug, Clone)]
pub struct LogPattern {
    regex: Regex,
}

impl LogPattern {
    pub fn compile(pattern: &str) -> ViewResult<Self> {
        if pattern.is_empty() {
            return Err(ViewError::Config(
                "state log pattern must not be empty".into(),
            ));
        }
        let regex = Regex::new(pattern)
            .map_err(|err| ViewError::Config(format!("invalid state log pattern: {err}")))?;
        // captures_len counts the implicit whole-match group.
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(ViewError::Config(format!(
                "state log pattern must have exactly one capture group, found {groups}"
            )));
        }
        Ok(Self { regex })
    }

    /// Text of the capture group in `line`, if the pattern matches.
    pub fn capture<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

#[derive(Debug)]
struct ActivePolicy {
    view: ViewPolicyView,
    pattern: LogPattern,
}

impl ActivePolicy {
    fn compile(view: ViewPolicyView) -> ViewResult<Self> {
        let pattern = LogPattern::compile(&view.state_log_pattern)?;
        Ok(Self { view, pattern })
    }
}

/// Shared, hot-updatable view policy. Every snapshot it hands out has been validated.
#[derive(Clone, Debug)]
pub struct ViewPolicyHandle {
    inner: Arc<RwLock<ActivePolicy>>,
}

impl ViewPolicyHandle {
    pub fn new_with(view: ViewPolicyView) -> ViewResult<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(ActivePolicy::compile(view)?)),
        })
    }

    pub fn snapshot(&self) -> ViewPolicyView {
        self.inner.read().view.clone()
    }

    pub fn pattern(&self) -> LogPattern {
        self.inner.read().pattern.clone()
    }

    /// Replaces the live policy; an invalid view leaves the previous one in place.
    pub fn update(&self, view: ViewPolicyView) -> ViewResult<()> {
        let compiled = ActivePolicy::compile(view)?;
        *self.inner.write() = compiled;
        Ok(())
    }
}
