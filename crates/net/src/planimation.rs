//! Client for the Planimation rendering service.
//!
//! The service takes a domain, a problem and an animation profile as a
//! multipart form and answers with a PNG of the requested state. The state
//! is described by substituting its sub-goal into the problem's goal.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use reqwest::multipart::Form;
use search_view::model::PlanContext;
use search_view::ports::AnimationPort;
use search_view::{ViewError, ViewResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{NetError, NetResult};
use crate::http::{ensure, post_succeeded, HttpHelper};

static GOAL_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\(:goal.*$").unwrap());

pub const DEFAULT_ENDPOINT: &str = "https://planimation.planning.domains/downloadVisualisation";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanimationConfig {
    pub url: String,
    /// Fallback domain text when the view has no plan context.
    pub domain: String,
    /// Fallback problem text whose goal gets replaced.
    pub problem_template: String,
    pub animation_profile: String,
    pub timeout_secs: u64,
}

impl Default for PlanimationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            domain: String::new(),
            problem_template: String::new(),
            animation_profile: String::new(),
            timeout_secs: 30,
        }
    }
}

pub struct PlanimationClient {
    http: HttpHelper,
    config: PlanimationConfig,
}

impl PlanimationClient {
    pub fn new(config: PlanimationConfig) -> NetResult<Self> {
        let http = HttpHelper::new(Duration::from_secs(config.timeout_secs.max(1)))?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: HttpHelper, config: PlanimationConfig) -> Self {
        Self { http, config }
    }

    /// Replaces the `(:goal ...)` section, up to the end of the problem, with `sub_goal`.
    pub fn substitute_goal(&self, problem: &str, sub_goal: &str) -> String {
        let replacement = format!("(:goal {})\n)", sub_goal.trim());
        GOAL_SECTION
            .replace(problem, NoExpand(&replacement))
            .into_owned()
    }

    pub async fn render(&self, sub_goal: &str, context: &PlanContext) -> NetResult<Vec<u8>> {
        let domain = context
            .domain
            .clone()
            .unwrap_or_else(|| self.config.domain.clone());
        let problem = context
            .problem
            .as_deref()
            .unwrap_or(&self.config.problem_template);
        let form = Form::new()
            .text("domain", domain)
            .text("problem", self.substitute_goal(problem, sub_goal))
            .text("animation", self.config.animation_profile.clone())
            .text("fileType", "png");

        debug!(url = %self.config.url, "requesting node image");
        let response = self
            .http
            .client()
            .post(&self.config.url)
            .multipart(form)
            .send()
            .await?;
        let response = ensure(response, &self.config.url, post_succeeded)?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl AnimationPort for PlanimationClient {
    async fn render_node(&self, state_info: &str, context: &PlanContext) -> ViewResult<Vec<u8>> {
        self.render(state_info, context)
            .await
            .map_err(|err: NetError| ViewError::Animation(err.to_string()))
    }
}
