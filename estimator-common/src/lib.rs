pub mod config;
pub mod params;
pub mod sample;
pub mod snapshot;
pub mod view;

// Re-export key types for easier use by dependent crates
pub use config::{CadenceConfig, EstimatorConfig, OutputConfig, SamplingConfig};
pub use params::RateParameters;
pub use sample::Sample;
pub use snapshot::MetricsSnapshot;
pub use view::{LabelDisplay, Renderer, UserPrompt};
