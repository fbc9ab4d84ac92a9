#[macro_use]
extern crate log;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use openpulse::{EstimateLog, LabeledRow, StreamSession};
use openpulse_algos::{FilterConfig, PipelineConfig, PulsePipeline};
use openpulse_calibrate::{
    CalibrationCoefficients, CalibrationTrainer, LabeledSample, TrainingOutcome,
};
use openpulse_codec::StreamProtocol;

#[derive(Parser)]
pub struct OpenPulseCli {
    #[clap(subcommand)]
    pub subcommand: OpenPulseCommand,
}

#[derive(Subcommand)]
pub enum OpenPulseCommand {
    ///
    /// Fit the candidate regressors on a labeled dataset and persist the winners
    ///
    Train {
        /// JSON array of rows collected against a reference oximeter
        dataset: PathBuf,
        #[arg(long, env, default_value = "calibration_constants.json")]
        output: PathBuf,
        /// Partition seed; a fixed seed makes training reproducible
        #[arg(long, env, default_value_t = 42)]
        seed: u64,
    },
    ///
    /// Replay a captured raw stream through the live pipeline
    ///
    Replay {
        /// Raw capture of the transport byte stream
        capture: PathBuf,
        /// Calibration coefficients file; defaults to the uncalibrated curves
        #[arg(long, env)]
        coefficients: Option<PathBuf>,
        /// Fragment size used to chop the capture, mimicking transport chunking
        #[arg(long, default_value_t = 20)]
        chunk_size: usize,
        #[arg(long, default_value_t = 100.0)]
        sample_rate_hz: f64,
        #[arg(long, default_value_t = 200)]
        window_len: usize,
        /// Append one timestamped row per estimate to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        println!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = OpenPulseCli::parse();
    match cli.subcommand {
        OpenPulseCommand::Train {
            dataset,
            output,
            seed,
        } => train(&dataset, &output, seed),
        OpenPulseCommand::Replay {
            capture,
            coefficients,
            chunk_size,
            sample_rate_hz,
            window_len,
            log_file,
        } => replay(
            &capture,
            coefficients.as_deref(),
            chunk_size,
            sample_rate_hz,
            window_len,
            log_file.as_deref(),
        ),
    }
}

fn train(dataset: &std::path::Path, output: &std::path::Path, seed: u64) -> anyhow::Result<()> {
    let raw = fs::read_to_string(dataset)
        .with_context(|| format!("reading {}", dataset.display()))?;
    let rows: Vec<LabeledRow> = serde_json::from_str(&raw).context("parsing labeled dataset")?;
    info!("loaded {} labeled rows", rows.len());

    let hr_samples: Vec<LabeledSample> = rows.iter().map(LabeledRow::hr_sample).collect();
    let spo2_samples: Vec<LabeledSample> = rows.iter().map(LabeledRow::spo2_sample).collect();

    let trainer = CalibrationTrainer::default().with_seed(seed);

    info!("training models for heart rate");
    let hr = trainer.fit(&hr_samples)?;
    report_winner("heart rate", &hr);

    info!("training models for SpO2");
    let spo2 = trainer.fit(&spo2_samples)?;
    report_winner("SpO2", &spo2);

    // Both targets trained; only now does anything touch the disk.
    let coefficients = CalibrationCoefficients::Fitted {
        hr: hr.model,
        spo2: spo2.model,
    };
    let json = serde_json::to_string_pretty(&coefficients)?;
    fs::write(output, json).with_context(|| format!("writing {}", output.display()))?;
    info!("saved calibration to {}", output.display());

    Ok(())
}

fn report_winner(label: &str, outcome: &TrainingOutcome) {
    info!(
        "{label} winner: {} (RMSE={:.2} MAE={:.2} R2={:.3})",
        outcome.kind, outcome.metrics.rmse, outcome.metrics.mae, outcome.metrics.r2
    );
}

fn replay(
    capture: &std::path::Path,
    coefficients: Option<&std::path::Path>,
    chunk_size: usize,
    sample_rate_hz: f64,
    window_len: usize,
    log_file: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let coefficients = match coefficients {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).context("parsing calibration coefficients")?
        }
        None => {
            warn!("no coefficients file given, using the uncalibrated default curves");
            CalibrationCoefficients::default_affine()
        }
    };
    let (hr_model, spo2_model) = coefficients.into_models();

    let config = PipelineConfig {
        window_len,
        filter: FilterConfig {
            sample_rate_hz,
            ..FilterConfig::default()
        },
        ..PipelineConfig::default()
    };
    let pipeline = PulsePipeline::new(config, hr_model, spo2_model)?;
    let mut session = StreamSession::new(StreamProtocol::PpgKeyValue, pipeline);

    let bytes =
        fs::read(capture).with_context(|| format!("reading {}", capture.display()))?;
    let mut estimate_log = log_file.map(EstimateLog::open).transpose()?;

    for chunk in bytes.chunks(chunk_size.max(1)) {
        for estimate in session.handle_fragment(chunk) {
            println!(
                "HR={:5.1} bpm   SpO2={:5.1}%   (IR={:.0}, RED={:.0})",
                estimate.heart_rate.value,
                estimate.spo2.value,
                estimate.features.ir,
                estimate.features.red
            );
            if let Some(log) = estimate_log.as_mut() {
                log.append(&estimate)?;
            }
        }
    }

    info!("dropped records: {}", session.parse_errors());
    info!(
        "windows: {} estimated, {} skipped as degenerate",
        session.pipeline().windows_processed(),
        session.pipeline().degenerate_windows()
    );

    Ok(())
}
