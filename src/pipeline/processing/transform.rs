use serde_json::Value;
use tracing::info;

use crate::constants::PRICE_PER_WEIGHT;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::Stage;
use crate::types::BikeRecord;

/// `price_gbp / weight_kg`, or `None` when either is missing or weight is zero
pub fn price_per_weight(record: &BikeRecord) -> Option<f64> {
    let price = record.price_gbp()?;
    let weight = record.weight_kg()?;
    if weight == 0.0 {
        return None;
    }
    Some(price / weight)
}

/// Adds `price_per_weight` to every record, leaving all other fields intact
pub fn with_price_per_weight(records: Vec<BikeRecord>) -> Vec<BikeRecord> {
    records
        .into_iter()
        .map(|mut record| {
            let ratio = price_per_weight(&record).map_or(Value::Null, Value::from);
            record.set(PRICE_PER_WEIGHT, ratio);
            record
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PricePerWeightTransformer;

impl Stage for PricePerWeightTransformer {
    type Output = Vec<BikeRecord>;

    fn name(&self) -> &'static str {
        "transform"
    }

    fn apply(&self, records: Vec<BikeRecord>) -> Result<Self::Output> {
        let transformed = with_price_per_weight(records);
        let nulls = transformed
            .iter()
            .filter(|r| !r.has_value(PRICE_PER_WEIGHT))
            .count();

        metrics::transform::null_ratios(nulls);
        info!(records = transformed.len(), null_ratios = nulls, "Added price_per_weight");
        Ok(transformed)
    }
}
