pub mod dashboard;

pub use dashboard::{draw_dashboard, handle_key, run_dashboard, LoopControl};
