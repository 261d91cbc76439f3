mod channel_surface;
mod in_memory;
mod noop;

pub use channel_surface::ChannelSurface;
pub use in_memory::InMemorySearchSource;
pub use noop::NoopAnimation;
