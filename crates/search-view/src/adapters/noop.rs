use async_trait::async_trait;

use crate::errors::{ViewError, ViewResult};
use crate::model::PlanContext;
use crate::ports::AnimationPort;

/// Animation port for setups without a rendering service.
#[derive(Default)]
pub struct NoopAnimation;

#[async_trait]
impl AnimationPort for NoopAnimation {
    async fn render_node(&self, _state_info: &str, _context: &PlanContext) -> ViewResult<Vec<u8>> {
        Err(ViewError::Animation("no animation service configured".into()))
    }
}
