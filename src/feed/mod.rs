pub mod source;

use serde::{Deserialize, Serialize};

pub use source::{BpmRange, RandomSource, SampleSource, ScriptedSource};

/// How a reading was acquired. Each method draws from its own range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Acquisition {
    Periodic,
    Refresh,
    Sync,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionRanges {
    pub periodic: BpmRange,
    pub refresh: BpmRange,
    pub sync: BpmRange,
}

impl Default for AcquisitionRanges {
    fn default() -> Self {
        Self {
            periodic: BpmRange::new(68, 112),
            refresh: BpmRange::new(65, 120),
            sync: BpmRange::new(60, 110),
        }
    }
}

/// One source per acquisition method.
pub struct SampleFeeds {
    periodic: Box<dyn SampleSource>,
    refresh: Box<dyn SampleSource>,
    sync: Box<dyn SampleSource>,
}

impl SampleFeeds {
    pub fn new(
        periodic: Box<dyn SampleSource>,
        refresh: Box<dyn SampleSource>,
        sync: Box<dyn SampleSource>,
    ) -> Self {
        Self {
            periodic,
            refresh,
            sync,
        }
    }

    pub fn random(ranges: &AcquisitionRanges) -> Self {
        Self::new(
            Box::new(RandomSource::new(ranges.periodic)),
            Box::new(RandomSource::new(ranges.refresh)),
            Box::new(RandomSource::new(ranges.sync)),
        )
    }

    pub fn produce(&mut self, acquisition: Acquisition) -> i32 {
        match acquisition {
            Acquisition::Periodic => self.periodic.produce_reading(),
            Acquisition::Refresh => self.refresh.produce_reading(),
            Acquisition::Sync => self.sync.produce_reading(),
        }
    }
}
