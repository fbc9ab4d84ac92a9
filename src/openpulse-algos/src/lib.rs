mod error;
pub use error::SignalError;

pub(crate) mod window;
pub use window::SlidingWindow;

pub(crate) mod filter;
pub use filter::{BandpassFilter, FilterConfig};

pub(crate) mod features;
pub use features::{FeatureExtractor, WindowFeatures};

pub(crate) mod rate;
pub use rate::RateEstimator;

pub(crate) mod estimate;
pub use estimate::{Estimate, VitalKind, VitalsEstimate};

pub(crate) mod pipeline;
pub use pipeline::{PipelineConfig, PulsePipeline};
