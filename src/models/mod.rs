pub mod sample;

pub use sample::{format_label, Sample};
