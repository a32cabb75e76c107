use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::CleanerConfig;
use crate::constants::{MODEL_NAME, REQUIRED_FIELDS};
use crate::error::{PipelineError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::Stage;
use crate::types::{BikeRecord, ModelKey};

/// Counts from a single cleaning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub input: usize,
    pub kept: usize,
    pub missing_fields: usize,
    pub duplicates: usize,
    pub overrides_applied: usize,
}

/// Drops incomplete records and keeps the first record seen for each model_id.
///
/// Dropping is part of normal operation and never produces an error.
#[derive(Debug, Clone, Default)]
pub struct RecordCleaner {
    model_name_overrides: HashMap<ModelKey, String>,
}

impl RecordCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CleanerConfig) -> Result<Self> {
        let mut model_name_overrides = HashMap::new();
        for (id, name) in &config.model_name_overrides {
            let parsed: i64 = id.trim().parse().map_err(|_| {
                PipelineError::Config(format!(
                    "cleaner.model_name_overrides key '{}' is not an integer model_id",
                    id
                ))
            })?;
            model_name_overrides.insert(ModelKey::Int(parsed), name.clone());
        }

        if !model_name_overrides.is_empty() {
            warn!(
                count = model_name_overrides.len(),
                "Model name overrides are enabled; these are one-off data patches"
            );
        }

        Ok(Self {
            model_name_overrides,
        })
    }

    pub fn clean(&self, records: Vec<BikeRecord>) -> (Vec<BikeRecord>, CleanSummary) {
        let mut summary = CleanSummary {
            input: records.len(),
            ..Default::default()
        };
        let mut seen: HashSet<ModelKey> = HashSet::new();
        let mut cleaned = Vec::with_capacity(records.len());

        for mut record in records {
            if !REQUIRED_FIELDS.iter().all(|field| record.has_value(field)) {
                summary.missing_fields += 1;
                continue;
            }

            let Some(key) = record.model_key() else {
                summary.missing_fields += 1;
                continue;
            };

            if !seen.insert(key.clone()) {
                debug!(model_id = ?key, "Dropping duplicate model_id");
                summary.duplicates += 1;
                continue;
            }

            if let Some(name) = self.model_name_overrides.get(&key) {
                warn!(model_id = ?key, model_name = %name, "Applying model_name override");
                record.set(MODEL_NAME, Value::String(name.clone()));
                summary.overrides_applied += 1;
                metrics::cleaner::override_applied();
            }

            cleaned.push(record);
        }

        summary.kept = cleaned.len();
        metrics::cleaner::dropped_missing_fields(summary.missing_fields);
        metrics::cleaner::dropped_duplicates(summary.duplicates);
        (cleaned, summary)
    }
}

impl Stage for RecordCleaner {
    type Output = Vec<BikeRecord>;

    fn name(&self) -> &'static str {
        "clean"
    }

    fn apply(&self, records: Vec<BikeRecord>) -> Result<Self::Output> {
        let (cleaned, summary) = self.clean(records);
        info!(
            input = summary.input,
            kept = summary.kept,
            missing_fields = summary.missing_fields,
            duplicates = summary.duplicates,
            overrides_applied = summary.overrides_applied,
            "Cleaned records"
        );
        Ok(cleaned)
    }
}

/// Cleans `records` with no model name overrides
pub fn clean(records: Vec<BikeRecord>) -> Vec<BikeRecord> {
    RecordCleaner::new().clean(records).0
}
