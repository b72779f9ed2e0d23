pub mod bootstrap;
pub mod controller;
pub mod gate;
pub mod state;

pub use bootstrap::run;
pub use controller::{Dashboard, Settled, Submission};
pub use gate::{RequestGate, RequestKind};
pub use state::{DashboardState, Focus, PriceSnapshot, Slice, SliceStatus};
