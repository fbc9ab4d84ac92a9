use std::sync::Mutex;

use openpulse_algos::{PulsePipeline, VitalsEstimate};
use openpulse_codec::{FrameAssembler, Record, StreamProtocol};

/// One transport stream end to end: fragment reassembly feeding the
/// windowed estimator. The assembler sits behind a mutex because BLE
/// stacks deliver notifications from their own callback threads and
/// fragments must apply in arrival order; the pipeline is mutated only
/// by the single consumer of the assembler's output.
#[derive(Debug)]
pub struct StreamSession {
    assembler: Mutex<FrameAssembler>,
    pipeline: PulsePipeline,
}

impl StreamSession {
    pub fn new(protocol: StreamProtocol, pipeline: PulsePipeline) -> Self {
        Self {
            assembler: Mutex::new(FrameAssembler::new(protocol)),
            pipeline,
        }
    }

    /// Feeds one transport fragment and returns the estimates unlocked by
    /// the records it completed (usually none or one).
    pub fn handle_fragment(&mut self, fragment: &[u8]) -> Vec<VitalsEstimate> {
        let records = {
            let mut assembler = self
                .assembler
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            assembler.feed(fragment)
        };

        records
            .into_iter()
            .filter_map(|record| match record {
                Record::Ppg(ppg) => self.pipeline.push(&ppg),
                Record::Imu(_) => None,
            })
            .collect()
    }

    pub fn parse_errors(&self) -> u64 {
        self.assembler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .parse_errors()
    }

    pub fn pipeline(&self) -> &PulsePipeline {
        &self.pipeline
    }
}
