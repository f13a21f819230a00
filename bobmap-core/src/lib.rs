pub mod feed;
pub mod graph;
pub mod matching;
pub mod models;
pub mod profile;

pub use feed::{FeedFilter, NotificationFeed};
pub use graph::SocialGraphStore;
pub use matching::MatchCache;
pub use models::*;
pub use profile::{evaluate, Answer, ProfileScore};
