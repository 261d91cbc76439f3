pub mod errors;
pub mod http;
pub mod planimation;

pub use errors::{NetError, NetResult};
pub use http::HttpHelper;
pub use planimation::{PlanimationClient, PlanimationConfig};
