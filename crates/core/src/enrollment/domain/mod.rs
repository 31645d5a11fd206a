pub mod enrollment_aggregator;
pub mod sample_set;
