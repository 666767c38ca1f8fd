mod cache;
mod observe;

pub use cache::MemCache;
pub use observe::{Observable, Subscription};
