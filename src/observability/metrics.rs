//! Metrics for the bike pipeline
//!
//! Recording goes through the `metrics` facade. This crate installs no
//! exporter, so every call is a no-op unless the embedding application sets
//! a global recorder.

use std::fmt;

/// Enum representing all metric names used in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Stage lifecycle
    StageRunsSuccess,
    StageRunsError,
    StageRecordsIn,
    StageRecordsOut,
    StageDuration,

    // Cleaner
    CleanerDroppedMissingFields,
    CleanerDroppedDuplicates,
    CleanerOverridesApplied,

    // Filter
    FilterRecordsRejected,

    // Aggregator
    AggregatorBrandsCounted,
    AggregatorRecordsWithoutBrand,

    // Transformer
    TransformNullRatios,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::StageRunsSuccess => "bike_stage_runs_success_total",
            MetricName::StageRunsError => "bike_stage_runs_error_total",
            MetricName::StageRecordsIn => "bike_stage_records_in_total",
            MetricName::StageRecordsOut => "bike_stage_records_out_total",
            MetricName::StageDuration => "bike_stage_duration_seconds",

            MetricName::CleanerDroppedMissingFields => "bike_cleaner_dropped_missing_fields_total",
            MetricName::CleanerDroppedDuplicates => "bike_cleaner_dropped_duplicates_total",
            MetricName::CleanerOverridesApplied => "bike_cleaner_overrides_applied_total",

            MetricName::FilterRecordsRejected => "bike_filter_records_rejected_total",

            MetricName::AggregatorBrandsCounted => "bike_aggregator_brands_counted",
            MetricName::AggregatorRecordsWithoutBrand => "bike_aggregator_records_without_brand_total",

            MetricName::TransformNullRatios => "bike_transform_null_ratios_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            StageRunsSuccess,
            StageRunsError,
            StageRecordsIn,
            StageRecordsOut,
            StageDuration,
            CleanerDroppedMissingFields,
            CleanerDroppedDuplicates,
            CleanerOverridesApplied,
            FilterRecordsRejected,
            AggregatorBrandsCounted,
            AggregatorRecordsWithoutBrand,
            TransformNullRatios,
        ]
        .into_iter()
    }

    /// Returns (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::StageRunsSuccess => ("stage", "Stage runs that wrote their output", None),
            MetricName::StageRunsError => ("stage", "Stage runs aborted by an error", None),
            MetricName::StageRecordsIn => ("stage", "Records read by a stage", None),
            MetricName::StageRecordsOut => ("stage", "Records written by a stage", None),
            MetricName::StageDuration => ("stage", "Wall time of a stage run", Some("s")),

            MetricName::CleanerDroppedMissingFields => ("cleaner", "Records dropped for missing required fields", None),
            MetricName::CleanerDroppedDuplicates => ("cleaner", "Records dropped as duplicate model ids", None),
            MetricName::CleanerOverridesApplied => ("cleaner", "Model name overrides applied", None),

            MetricName::FilterRecordsRejected => ("filter", "Records failing the filter predicate", None),

            MetricName::AggregatorBrandsCounted => ("aggregator", "Distinct brands in the last run", None),
            MetricName::AggregatorRecordsWithoutBrand => ("aggregator", "Records skipped for missing brand", None),

            MetricName::TransformNullRatios => ("transform", "Records given a null price_per_weight", None),
        }
    }
}

pub mod stage {
    use super::MetricName;

    /// Record a completed stage run
    pub fn completed(stage: &'static str, records_in: usize, records_out: usize, secs: f64) {
        ::metrics::counter!(MetricName::StageRunsSuccess.as_str(), "stage" => stage).increment(1);
        ::metrics::counter!(MetricName::StageRecordsIn.as_str(), "stage" => stage)
            .increment(records_in as u64);
        ::metrics::counter!(MetricName::StageRecordsOut.as_str(), "stage" => stage)
            .increment(records_out as u64);
        ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage).record(secs);
    }

    /// Record a stage run that was aborted
    pub fn failed(stage: &'static str) {
        ::metrics::counter!(MetricName::StageRunsError.as_str(), "stage" => stage).increment(1);
    }
}

pub mod cleaner {
    use super::MetricName;

    pub fn dropped_missing_fields(count: usize) {
        ::metrics::counter!(MetricName::CleanerDroppedMissingFields.as_str()).increment(count as u64);
    }

    pub fn dropped_duplicates(count: usize) {
        ::metrics::counter!(MetricName::CleanerDroppedDuplicates.as_str()).increment(count as u64);
    }

    pub fn override_applied() {
        ::metrics::counter!(MetricName::CleanerOverridesApplied.as_str()).increment(1);
    }
}

pub mod filter {
    use super::MetricName;

    pub fn rejected(count: usize) {
        ::metrics::counter!(MetricName::FilterRecordsRejected.as_str()).increment(count as u64);
    }
}

pub mod aggregator {
    use super::MetricName;

    pub fn brands_counted(count: usize) {
        ::metrics::gauge!(MetricName::AggregatorBrandsCounted.as_str()).set(count as f64);
    }

    pub fn records_without_brand(count: usize) {
        ::metrics::counter!(MetricName::AggregatorRecordsWithoutBrand.as_str())
            .increment(count as u64);
    }
}

pub mod transform {
    use super::MetricName;

    pub fn null_ratios(count: usize) {
        ::metrics::counter!(MetricName::TransformNullRatios.as_str()).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
    }

    #[test]
    fn test_counters_follow_naming_convention() {
        for metric in MetricName::all_metrics() {
            assert!(metric.as_str().starts_with("bike_"));
            let (phase, description, _) = metric.metadata();
            assert!(!phase.is_empty());
            assert!(!description.is_empty());
        }
        assert_eq!(
            MetricName::StageDuration.to_string(),
            "bike_stage_duration_seconds"
        );
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        stage::completed("clean", 3, 2, 0.01);
        stage::failed("sort");
        cleaner::dropped_duplicates(1);
        transform::null_ratios(0);
    }
}
