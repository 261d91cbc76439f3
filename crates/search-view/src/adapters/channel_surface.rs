use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::{ViewError, ViewResult};
use crate::model::OutboundMessage;
use crate::ports::PresentationSurface;

/// Surface that forwards outbound messages into a channel.
///
/// Whoever owns the receiver plays the display: it serialises messages,
/// buffers them, or asserts on them in tests.
pub struct ChannelSurface {
    sender: mpsc::UnboundedSender<OutboundMessage>,
    visible: AtomicBool,
}

impl ChannelSurface {
    pub fn new(visible: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let surface = Arc::new(Self {
            sender,
            visible: AtomicBool::new(visible),
        });
        (surface, receiver)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

#[async_trait]
impl PresentationSurface for ChannelSurface {
    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    async fn post(&self, message: OutboundMessage) -> ViewResult<()> {
        self.sender
            .send(message)
            .map_err(|_| ViewError::SurfaceClosed)
    }
}
