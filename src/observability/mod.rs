// Observability: metric names and recording helpers

pub mod metrics;
