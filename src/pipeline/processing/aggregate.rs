use tracing::info;

use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::Stage;
use crate::types::{BikeRecord, BrandCounts};

/// Counts records per brand. Records without a non-empty string brand are
/// skipped rather than bucketed under a placeholder.
pub fn count_by_brand(records: &[BikeRecord]) -> BrandCounts {
    let mut counts = BrandCounts::new();
    for brand in records.iter().filter_map(BikeRecord::brand) {
        if !brand.is_empty() {
            counts.increment(brand);
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrandAggregator;

impl Stage for BrandAggregator {
    type Output = BrandCounts;

    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn apply(&self, records: Vec<BikeRecord>) -> Result<Self::Output> {
        let counts = count_by_brand(&records);
        let without_brand = records.len() - counts.total();

        metrics::aggregator::brands_counted(counts.len());
        metrics::aggregator::records_without_brand(without_brand);
        info!(
            records = records.len(),
            brands = counts.len(),
            without_brand,
            "Counted records per brand"
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::test_support::records;
    use serde_json::json;

    #[test]
    fn test_single_brand() {
        let input = records(json!([
            {"model_id": 1, "brand": "CycloX"},
            {"model_id": 2, "brand": "CycloX"}
        ]));

        let counts = count_by_brand(&input);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("CycloX"), Some(2));
    }

    #[test]
    fn test_skips_missing_and_empty_brands() {
        let input = records(json!([
            {"model_id": 1, "brand": "Trek"},
            {"model_id": 2, "brand": ""},
            {"model_id": 3, "brand": null},
            {"model_id": 4},
            {"model_id": 5, "brand": "Giant"},
            {"model_id": 6, "brand": "Trek"}
        ]));

        let counts = count_by_brand(&input);
        let entries: Vec<(&str, usize)> = counts.iter().collect();
        assert_eq!(entries, vec![("Trek", 2), ("Giant", 1)]);
        assert_eq!(counts.get(""), None);
    }

    #[test]
    fn test_sum_equals_records_with_brand() {
        let input = records(json!([
            {"brand": "A"}, {"brand": "B"}, {"brand": "A"}, {"brand": ""}, {}, {"brand": "C"}
        ]));

        let with_brand = input
            .iter()
            .filter(|r| r.brand().is_some_and(|b| !b.is_empty()))
            .count();
        assert_eq!(count_by_brand(&input).total(), with_brand);
        assert_eq!(with_brand, 4);
    }

    #[test]
    fn test_brands_are_case_sensitive() {
        let input = records(json!([{"brand": "trek"}, {"brand": "Trek"}]));
        assert_eq!(count_by_brand(&input).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let counts = count_by_brand(&[]);
        assert!(counts.is_empty());
        assert_eq!(serde_json::to_string(&counts).unwrap(), "{}");
    }
}
