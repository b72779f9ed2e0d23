pub mod text;
pub mod time;

pub use text::{is_ticker_char, normalize_ticker, truncate_to_width};
pub use time::{current_human_timestamp, format_published_at};
