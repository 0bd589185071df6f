//! Removes noise from WAV files.
//!
//! Usage:
//!   anc desired.wav reference.wav output.wav   - LMS or RLS cancellation
//!   anc input.wav output.wav                   - AR prediction, no reference

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use micro_anc::config::{
    EngineConfig, GainDenominator, LmsOptions, PredictorOptions, RlsOptions, StepNormalization,
    DEFAULT_EPS,
};
use micro_anc::{run, run_single, Engine, Sample, SignalExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    Lms,
    Rls,
    Predictive,
}

#[derive(Parser, Debug)]
#[command(name = "anc", version, about = "Adaptive noise cancellation for WAV files")]
struct Args {
    /// DESIRED REFERENCE OUTPUT, or INPUT OUTPUT for the predictive engine
    #[arg(required = true, num_args = 2..=3)]
    paths: Vec<PathBuf>,

    /// Engine to use [default: lms with a reference, predictive without]
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,

    /// Number of filter taps
    #[arg(long)]
    order: Option<usize>,

    /// LMS step size
    #[arg(long)]
    mu: Option<f64>,

    /// Normalize the LMS step by the reference power (default)
    #[arg(long, conflicts_with = "plain")]
    normalized: bool,

    /// Use the plain LMS step. Needs a tiny --mu, around 1e-9 for 16 bit input
    #[arg(long, requires = "mu")]
    plain: bool,

    /// Regularization of the normalized LMS step
    #[arg(long, conflicts_with = "plain")]
    eps: Option<f64>,

    /// RLS forgetting factor
    #[arg(long)]
    lambda: Option<f64>,

    /// RLS initialization, P = I / delta
    #[arg(long)]
    delta: Option<f64>,

    /// Use the diagonal only RLS gain denominator
    #[arg(long)]
    legacy_gain: bool,

    /// Predictor coefficients, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    coefficients: Option<Vec<f64>>,

    /// Engine configuration as a JSON file. Replaces all engine options.
    #[arg(
        long,
        value_name = "JSON",
        conflicts_with_all = ["engine", "order", "mu", "normalized", "plain", "eps", "lambda", "delta", "legacy_gain", "coefficients"]
    )]
    config: Option<PathBuf>,

    /// Also write the output as "index amplitude" lines to this file
    #[arg(long, value_name = "PATH")]
    waveform: Option<PathBuf>,

    /// Increase logging, -v for info and -vv for debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn has_reference(&self) -> bool {
        self.paths.len() == 3
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        if let Some(path) = &self.config {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: EngineConfig = serde_json::from_str(&json)
                .with_context(|| format!("parsing {}", path.display()))?;
            return Ok(config);
        }

        let engine = match self.engine {
            Some(engine) => engine,
            None if self.has_reference() => EngineArg::Lms,
            None => EngineArg::Predictive,
        };
        let unused = |used_by: &str, flags: &[(&str, bool)]| -> Result<()> {
            for (flag, given) in flags {
                if *given {
                    bail!("--{} is not used by the {} engine", flag, used_by);
                }
            }
            Ok(())
        };

        let config = match engine {
            EngineArg::Lms => {
                unused(
                    "LMS",
                    &[
                        ("lambda", self.lambda.is_some()),
                        ("delta", self.delta.is_some()),
                        ("legacy-gain", self.legacy_gain),
                        ("coefficients", self.coefficients.is_some()),
                    ],
                )?;
                let defaults = LmsOptions::default();
                let normalization = if self.plain {
                    StepNormalization::None
                } else {
                    StepNormalization::Power {
                        eps: self.eps.unwrap_or(DEFAULT_EPS),
                    }
                };
                EngineConfig::Lms(LmsOptions {
                    order: self.order.unwrap_or(defaults.order),
                    mu: self.mu.unwrap_or(defaults.mu),
                    normalization,
                })
            }
            EngineArg::Rls => {
                unused(
                    "RLS",
                    &[
                        ("mu", self.mu.is_some()),
                        ("normalized", self.normalized),
                        ("plain", self.plain),
                        ("eps", self.eps.is_some()),
                        ("coefficients", self.coefficients.is_some()),
                    ],
                )?;
                let defaults = RlsOptions::default();
                EngineConfig::Rls(RlsOptions {
                    order: self.order.unwrap_or(defaults.order),
                    lambda: self.lambda.unwrap_or(defaults.lambda),
                    delta: self.delta.unwrap_or(defaults.delta),
                    gain_denominator: if self.legacy_gain {
                        GainDenominator::LegacyDiagonal
                    } else {
                        GainDenominator::Quadratic
                    },
                })
            }
            EngineArg::Predictive => {
                unused(
                    "predictive",
                    &[
                        ("order", self.order.is_some()),
                        ("mu", self.mu.is_some()),
                        ("normalized", self.normalized),
                        ("plain", self.plain),
                        ("eps", self.eps.is_some()),
                        ("lambda", self.lambda.is_some()),
                        ("delta", self.delta.is_some()),
                        ("legacy-gain", self.legacy_gain),
                    ],
                )?;
                EngineConfig::Predictive(match &self.coefficients {
                    Some(coefficients) => PredictorOptions {
                        coefficients: coefficients.clone(),
                    },
                    None => PredictorOptions::default(),
                })
            }
        };
        Ok(config)
    }
}

fn read_input(path: &Path) -> Result<Vec<Sample>> {
    anc_io::read_signal(path).with_context(|| format!("reading {}", path.display()))
}

fn process(args: &Args) -> Result<()> {
    let config = args.engine_config()?;
    config.validate()?;
    let mut engine = config.build()?;

    let output_path = &args.paths[args.paths.len() - 1];
    let output = match (args.has_reference(), engine.requires_reference()) {
        (true, true) => {
            let desired = read_input(&args.paths[0])?;
            let reference = read_input(&args.paths[1])?;
            log::info!(
                "Filtering {} samples with the {} engine",
                desired.len(),
                engine.kind()
            );
            run(&desired, &reference, &mut engine)?
        }
        (false, false) => {
            let input = read_input(&args.paths[0])?;
            log::info!(
                "Filtering {} samples with the {} engine",
                input.len(),
                engine.kind()
            );
            run_single(&input, &mut engine)?
        }
        (false, true) => bail!(
            "the {} engine needs DESIRED REFERENCE OUTPUT paths",
            engine.kind()
        ),
        (true, false) => bail!(
            "the {} engine takes INPUT OUTPUT paths, got a reference",
            engine.kind()
        ),
    };

    anc_io::write_wav(output_path, anc_io::TARGET_SAMPLE_RATE, 1, 16, &output)
        .with_context(|| format!("writing {}", output_path.display()))?;
    log::info!(
        "Wrote {} ({:.1} dBFS RMS)",
        output_path.display(),
        output.rms_level_db()
    );

    if let Some(path) = &args.waveform {
        anc_io::write_waveform(path, &output)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Wrote waveform {}", path.display());
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        // --help and --version
        Err(err) => err.exit(),
    };
    init_logging(args.verbose);

    match process(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
