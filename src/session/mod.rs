pub mod controller;
pub mod events;
pub mod state;

pub use controller::{MonitorController, SessionSnapshot};
pub use events::MonitorEvent;
pub use state::{SessionState, SyncState, SyncStatus};
