pub mod periodic;

pub use periodic::{PeriodicTask, TickFlow};
