pub mod buffer;

pub use buffer::{TrendBuffer, TrendSummary, SEED_SAMPLES, TREND_CAPACITY};
