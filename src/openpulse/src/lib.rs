mod dataset;
pub use dataset::LabeledRow;

mod logfile;
pub use logfile::EstimateLog;

mod session;
pub use session::StreamSession;
