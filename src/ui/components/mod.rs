pub mod chart;
pub mod news;
pub mod terminal;
pub mod utils;

pub use terminal::TerminalGuard;
