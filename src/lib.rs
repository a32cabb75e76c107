pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod types;

pub use error::{PipelineError, Result};
pub use pipeline::processing::aggregate::count_by_brand;
pub use pipeline::processing::clean::clean;
pub use pipeline::processing::filter::filter_mountain_bikes;
pub use pipeline::processing::sort::sort_by_price_then_weight;
pub use pipeline::processing::transform::with_price_per_weight;
pub use types::{BikeRecord, BrandCounts};
