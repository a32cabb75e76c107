use tracing::info;

use crate::config::FilterConfig;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::Stage;
use crate::types::BikeRecord;

/// Keeps records of one category that are at or under a price ceiling and,
/// by default, in stock.
#[derive(Debug, Clone)]
pub struct MountainBikeFilter {
    config: FilterConfig,
}

impl Default for MountainBikeFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl MountainBikeFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Type must match exactly, price must be a number under the ceiling and
    /// `in_stock` must be the boolean `true`, not merely truthy.
    pub fn matches(&self, record: &BikeRecord) -> bool {
        let type_matches = record.bike_type() == Some(self.config.bike_type.as_str());
        let price_ok = record
            .price_gbp()
            .is_some_and(|price| price <= self.config.max_price_gbp);
        let stock_ok = !self.config.require_in_stock || record.in_stock() == Some(true);

        type_matches && price_ok && stock_ok
    }

    pub fn filter(&self, records: Vec<BikeRecord>) -> Vec<BikeRecord> {
        let total = records.len();
        let kept: Vec<BikeRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        metrics::filter::rejected(total - kept.len());
        kept
    }
}

impl Stage for MountainBikeFilter {
    type Output = Vec<BikeRecord>;

    fn name(&self) -> &'static str {
        "filter"
    }

    fn apply(&self, records: Vec<BikeRecord>) -> Result<Self::Output> {
        let total = records.len();
        let kept = self.filter(records);
        info!(
            bike_type = %self.config.bike_type,
            max_price_gbp = self.config.max_price_gbp,
            input = total,
            kept = kept.len(),
            "Filtered records"
        );
        Ok(kept)
    }
}

/// Mountain bikes priced at or under £1000 that are in stock
pub fn filter_mountain_bikes(records: Vec<BikeRecord>) -> Vec<BikeRecord> {
    MountainBikeFilter::default().filter(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::clean::clean;
    use crate::pipeline::processing::test_support::{ids, records};
    use serde_json::json;

    #[test]
    fn test_keeps_only_qualifying_mountain_bikes() {
        let input = records(json!([
            {"model_id": 1, "type": "Mountain Bike", "price_gbp": 1000, "in_stock": true},
            {"model_id": 2, "type": "Mountain Bike", "price_gbp": 1000.01, "in_stock": true},
            {"model_id": 3, "type": "mountain bike", "price_gbp": 500, "in_stock": true},
            {"model_id": 4, "type": "Mountain Bike", "price_gbp": 500, "in_stock": false},
            {"model_id": 5, "type": "Road Bike", "price_gbp": 500, "in_stock": true},
            {"model_id": 6, "type": "Mountain Bike", "price_gbp": 450.5, "in_stock": true}
        ]));

        assert_eq!(ids(&filter_mountain_bikes(input)), vec![1, 6]);
    }

    #[test]
    fn test_truthy_stock_is_not_enough() {
        let input = records(json!([
            {"model_id": 1, "type": "Mountain Bike", "price_gbp": 100, "in_stock": 1},
            {"model_id": 2, "type": "Mountain Bike", "price_gbp": 100, "in_stock": "yes"}
        ]));

        assert!(filter_mountain_bikes(input).is_empty());
    }

    #[test]
    fn test_missing_fields_fail_predicate() {
        let input = records(json!([
            {"model_id": 1, "price_gbp": 100, "in_stock": true},
            {"model_id": 2, "type": "Mountain Bike", "in_stock": true},
            {"model_id": 3, "type": "Mountain Bike", "price_gbp": null, "in_stock": true},
            {"model_id": 4, "type": "Mountain Bike", "price_gbp": 100}
        ]));

        assert!(filter_mountain_bikes(input).is_empty());
    }

    #[test]
    fn test_no_matches() {
        let input = records(json!([
            {"model_id": 1, "type": "Road Bike", "price_gbp": 500, "in_stock": true}
        ]));
        assert_eq!(filter_mountain_bikes(input), Vec::new());
    }

    #[test]
    fn test_filtered_is_subset_of_cleaned() {
        let cleaned = clean(records(json!([
            {"model_id": 1, "type": "Mountain Bike", "price_gbp": 900, "weight_kg": 13, "in_stock": true},
            {"model_id": 2, "type": "Mountain Bike", "price_gbp": 1500, "weight_kg": 12, "in_stock": true},
            {"model_id": 3, "type": "Hybrid", "price_gbp": 400, "weight_kg": 11, "in_stock": true},
            {"model_id": 4, "type": "Mountain Bike", "price_gbp": 800, "weight_kg": 14, "in_stock": true}
        ])));

        let filtered = filter_mountain_bikes(cleaned.clone());
        assert_eq!(ids(&filtered), vec![1, 4]);
        for bike in &filtered {
            assert!(cleaned.contains(bike));
            assert_eq!(bike.bike_type(), Some("Mountain Bike"));
            assert!(bike.price_gbp().unwrap() <= 1000.0);
            assert_eq!(bike.in_stock(), Some(true));
        }
    }

    #[test]
    fn test_configured_filter() {
        let filter = MountainBikeFilter::new(FilterConfig {
            bike_type: "Road Bike".to_string(),
            max_price_gbp: 600.0,
            require_in_stock: false,
        });
        let input = records(json!([
            {"model_id": 1, "type": "Road Bike", "price_gbp": 550, "in_stock": false},
            {"model_id": 2, "type": "Road Bike", "price_gbp": 650, "in_stock": true}
        ]));

        assert_eq!(ids(&filter.filter(input)), vec![1]);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_mountain_bikes(Vec::new()).is_empty());
    }
}
