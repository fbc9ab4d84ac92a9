use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use openpulse_algos::VitalsEstimate;

/// Append-only estimate log. One timestamped row per completed window,
/// with the derived values that fed the estimate.
pub struct EstimateLog {
    file: File,
}

impl EstimateLog {
    const HEADER: &'static str = "timestamp,hr,spo2,ir_dc,red_dc,r";

    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut log = Self { file };
        if log.file.metadata()?.len() == 0 {
            writeln!(log.file, "{}", Self::HEADER)?;
        }
        Ok(log)
    }

    pub fn append(&mut self, estimate: &VitalsEstimate) -> io::Result<()> {
        writeln!(
            self.file,
            "{},{:.1},{:.1},{:.1},{:.1},{:.4}",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.6f"),
            estimate.heart_rate.value,
            estimate.spo2.value,
            estimate.features.ir_dc,
            estimate.features.red_dc,
            estimate.features.ratio,
        )
    }
}
