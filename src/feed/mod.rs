pub mod client;
pub mod model;

pub use model::{FeedPhase, LiveFeed};
