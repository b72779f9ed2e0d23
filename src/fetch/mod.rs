pub mod client;
pub mod rewrite;

pub use client::{error_message, ApiClient, MarketApi};
pub use rewrite::{ErrorRewrites, RewriteRule};
