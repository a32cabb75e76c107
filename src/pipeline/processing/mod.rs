// Pipeline processing: cleaning, filtering, aggregation, sorting and enrichment

pub mod aggregate;
pub mod clean;
pub mod filter;
pub mod sort;
pub mod transform;

use serde::Serialize;

use crate::error::Result;
use crate::types::{BikeRecord, BrandCounts};

/// A single transformation step over a loaded dataset
pub trait Stage {
    type Output: StageOutput;

    /// Short name used in logs, metrics and the CLI
    fn name(&self) -> &'static str;

    fn apply(&self, records: Vec<BikeRecord>) -> Result<Self::Output>;
}

/// Anything a stage can write out
pub trait StageOutput: Serialize {
    fn record_count(&self) -> usize;
}

impl StageOutput for Vec<BikeRecord> {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl StageOutput for BrandCounts {
    fn record_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;

    use crate::types::BikeRecord;

    pub fn records(value: Value) -> Vec<BikeRecord> {
        serde_json::from_value(value).unwrap()
    }

    pub fn ids(records: &[BikeRecord]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.model_id().and_then(Value::as_i64).unwrap())
            .collect()
    }
}
