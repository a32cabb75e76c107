/// Field names recognised on a bike record
pub const MODEL_ID: &str = "model_id";
pub const PRICE_GBP: &str = "price_gbp";
pub const WEIGHT_KG: &str = "weight_kg";
pub const IN_STOCK: &str = "in_stock";
pub const BIKE_TYPE: &str = "type";
pub const BRAND: &str = "brand";
pub const MODEL_NAME: &str = "model_name";
pub const PRICE_PER_WEIGHT: &str = "price_per_weight";

/// Fields that must be present and non-null for a record to survive cleaning
pub const REQUIRED_FIELDS: [&str; 4] = [MODEL_ID, PRICE_GBP, WEIGHT_KG, IN_STOCK];

/// Fields kept by the sorter's projection, in output order
pub const SORT_PROJECTION: [&str; 3] = [MODEL_ID, PRICE_GBP, WEIGHT_KG];

// Filter defaults
pub const MOUNTAIN_BIKE: &str = "Mountain Bike";
pub const MAX_PRICE_GBP: f64 = 1000.0;

// Default file names, relative to the data directory
pub const RAW_DATA_FILE: &str = "bike_data.json";
pub const CLEANED_DATA_FILE: &str = "cleaned_data.json";
pub const FILTERED_BIKES_FILE: &str = "filtered_bikes.json";
pub const BRAND_COUNTS_FILE: &str = "brand_counts.json";
pub const SORTED_BICYCLES_FILE: &str = "sorted_bicycles.json";
pub const PRICE_PER_WEIGHT_FILE: &str = "price_per_weight.json";

pub const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";
pub const CONFIG_ENV_VAR: &str = "BIKE_PIPELINE_CONFIG";

/// Indentation used for every JSON output file
pub const OUTPUT_INDENT: &[u8] = b"    ";
