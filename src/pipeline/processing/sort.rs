use serde_json::{Map, Value};
use std::cmp::Ordering;
use tracing::info;

use crate::constants::{PRICE_GBP, SORT_PROJECTION, WEIGHT_KG};
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::Stage;
use crate::types::BikeRecord;

/// Sort key component; absent or non-numeric values sort last
fn key_part(record: &BikeRecord, field: &str) -> f64 {
    record
        .get(field)
        .and_then(Value::as_f64)
        .unwrap_or(f64::INFINITY)
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    // JSON numbers are never NaN
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn compare(a: &BikeRecord, b: &BikeRecord) -> Ordering {
    cmp_f64(key_part(a, PRICE_GBP), key_part(b, PRICE_GBP))
        .then_with(|| cmp_f64(key_part(a, WEIGHT_KG), key_part(b, WEIGHT_KG)))
}

/// Narrows a record to `model_id`, `price_gbp` and `weight_kg`.
///
/// Every key must exist; an explicit `null` is carried over as `null`.
fn project(index: usize, record: &BikeRecord) -> Result<BikeRecord> {
    let mut projected = Map::with_capacity(SORT_PROJECTION.len());
    for field in SORT_PROJECTION {
        let value = record
            .get_raw(field)
            .ok_or(PipelineError::MissingField { index, field })?;
        projected.insert(field.to_string(), value.clone());
    }
    Ok(BikeRecord::from(projected))
}

/// Stable ascending sort by price, then weight, projected to three fields.
///
/// `index` in a `MissingField` error refers to the record's position in the
/// input.
pub fn sort_by_price_then_weight(records: &[BikeRecord]) -> Result<Vec<BikeRecord>> {
    let mut order: Vec<(usize, &BikeRecord)> = records.iter().enumerate().collect();
    // slice::sort_by is stable
    order.sort_by(|(_, a), (_, b)| compare(a, b));

    order
        .into_iter()
        .map(|(index, record)| project(index, record))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceWeightSorter;

impl Stage for PriceWeightSorter {
    type Output = Vec<BikeRecord>;

    fn name(&self) -> &'static str {
        "sort"
    }

    fn apply(&self, records: Vec<BikeRecord>) -> Result<Self::Output> {
        let sorted = sort_by_price_then_weight(&records)?;
        info!(records = sorted.len(), "Sorted records by price then weight");
        Ok(sorted)
    }
}
