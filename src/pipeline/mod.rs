// Stage runner: file in, one transformation, file out

pub mod io;
pub mod processing;

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::observability::metrics;
use processing::aggregate::BrandAggregator;
use processing::clean::RecordCleaner;
use processing::filter::MountainBikeFilter;
use processing::sort::PriceWeightSorter;
use processing::transform::PricePerWeightTransformer;
use processing::{Stage, StageOutput};

/// The stages the pipeline knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Clean,
    Filter,
    Aggregate,
    Sort,
    Transform,
}

impl StageKind {
    /// Stages that consume the cleaned dataset
    pub const FAN_OUT: [StageKind; 4] = [
        StageKind::Filter,
        StageKind::Aggregate,
        StageKind::Sort,
        StageKind::Transform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Clean => "clean",
            StageKind::Filter => "filter",
            StageKind::Aggregate => "aggregate",
            StageKind::Sort => "sort",
            StageKind::Transform => "transform",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single stage run
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: &'static str,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub input_records: usize,
    pub output_records: usize,
    pub duration_secs: f64,
    pub completed_at: DateTime<Utc>,
}

/// Reads `input`, applies `stage` and writes the result to `output`.
///
/// Any failure aborts the run before the output file is touched.
#[instrument(skip(stage), fields(stage_name = stage.name()))]
pub fn run_stage<S: Stage>(stage: &S, input: &Path, output: &Path) -> Result<StageReport> {
    let name = stage.name();
    let started = Instant::now();

    let outcome = io::read_records(input).and_then(|records| {
        let input_records = records.len();
        let result = stage.apply(records)?;
        io::write_json(output, &result)?;
        Ok((input_records, result.record_count()))
    });

    let (input_records, output_records) = match outcome {
        Ok(counts) => counts,
        Err(e) => {
            metrics::stage::failed(name);
            return Err(e);
        }
    };

    let duration_secs = started.elapsed().as_secs_f64();
    metrics::stage::completed(name, input_records, output_records, duration_secs);
    info!(
        input = %input.display(),
        output = %output.display(),
        input_records,
        output_records,
        "Stage finished"
    );

    Ok(StageReport {
        stage: name,
        input_file: input.to_path_buf(),
        output_file: output.to_path_buf(),
        input_records,
        output_records,
        duration_secs,
        completed_at: Utc::now(),
    })
}

/// Configured set of stages plus the file layout they run against
pub struct Pipeline {
    config: Config,
    cleaner: RecordCleaner,
    filter: MountainBikeFilter,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let cleaner = RecordCleaner::from_config(&config.cleaner)?;
        let filter = MountainBikeFilter::new(config.filter.clone());
        Ok(Self {
            config,
            cleaner,
            filter,
        })
    }

    pub fn default_input(&self, kind: StageKind) -> PathBuf {
        let paths = &self.config.paths;
        match kind {
            StageKind::Clean => paths.resolve(&paths.raw_data),
            _ => paths.resolve(&paths.cleaned_data),
        }
    }

    pub fn default_output(&self, kind: StageKind) -> PathBuf {
        let paths = &self.config.paths;
        let file = match kind {
            StageKind::Clean => &paths.cleaned_data,
            StageKind::Filter => &paths.filtered_bikes,
            StageKind::Aggregate => &paths.brand_counts,
            StageKind::Sort => &paths.sorted_bicycles,
            StageKind::Transform => &paths.price_per_weight,
        };
        paths.resolve(file)
    }

    /// Runs one stage, with optional overrides for its input and output files
    pub fn run(
        &self,
        kind: StageKind,
        input: Option<&Path>,
        output: Option<&Path>,
    ) -> Result<StageReport> {
        let input = input.map_or_else(|| self.default_input(kind), Path::to_path_buf);
        let output = output.map_or_else(|| self.default_output(kind), Path::to_path_buf);

        match kind {
            StageKind::Clean => run_stage(&self.cleaner, &input, &output),
            StageKind::Filter => run_stage(&self.filter, &input, &output),
            StageKind::Aggregate => run_stage(&BrandAggregator, &input, &output),
            StageKind::Sort => run_stage(&PriceWeightSorter, &input, &output),
            StageKind::Transform => run_stage(&PricePerWeightTransformer, &input, &output),
        }
    }

    /// Cleans the raw file, then runs every fan-out stage over the cleaned file.
    ///
    /// Stops at the first failing stage; outputs of stages that already
    /// finished are left in place.
    pub fn run_all(&self) -> Result<Vec<StageReport>> {
        let mut reports = Vec::with_capacity(1 + StageKind::FAN_OUT.len());
        reports.push(self.run(StageKind::Clean, None, None)?);
        for kind in StageKind::FAN_OUT {
            reports.push(self.run(kind, None, None)?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_paths() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        assert_eq!(
            pipeline.default_input(StageKind::Clean),
            PathBuf::from("./bike_data.json")
        );
        assert_eq!(
            pipeline.default_input(StageKind::Sort),
            PathBuf::from("./cleaned_data.json")
        );
        assert_eq!(
            pipeline.default_output(StageKind::Aggregate),
            PathBuf::from("./brand_counts.json")
        );
        assert_eq!(
            pipeline.default_output(StageKind::Transform),
            PathBuf::from("./price_per_weight.json")
        );
    }

    #[test]
    fn test_fan_out_excludes_clean() {
        assert!(!StageKind::FAN_OUT.contains(&StageKind::Clean));
        assert_eq!(StageKind::Sort.to_string(), "sort");
    }
}
