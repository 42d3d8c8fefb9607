//! Application shell: screen navigation, form state, and the read models
//! (dashboard statistics, history filtering) over the session's inspection
//! log. Event-driven; the async pipeline and advisory calls happen outside
//! and feed back in as events.

mod state;
mod stats;

pub use state::{AppEvent, AppState, PreviewRef, Screen};
pub use stats::{DashboardStats, filter_history};
