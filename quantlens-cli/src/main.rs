//! QuantLens CLI: batch front end for the calculation engines.
//!
//! Commands:
//! - `validate`: data-quality report per price file
//! - `risk`: risk metrics for one file, optionally against a benchmark
//! - `momentum`: RSI, MACD, Stochastic, Williams %R and ROC
//! - `moving-average`: one moving average, or a fast/slow crossover
//!
//! Reports are printed to stdout as JSON; logs go to stderr.

mod input;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use quantlens_core::{
    AnalysisConfig, MomentumIndicatorEngine, MovingAverageEngine, PriceSeriesValidator,
    RiskMetricsEngine,
};
use rayon::prelude::*;
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "quantlens",
    about = "QuantLens CLI: price validation, risk and indicator reports"
)]
struct Cli {
    /// TOML config with optional [validation], [risk], [momentum],
    /// [moving_average] and [crossover] tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check price files for gaps, outliers, splits and duplicates.
    Validate {
        /// Price files (.json record or CSV with date,close[,high,low,volume]).
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compute VaR, CVaR, drawdown and risk-adjusted ratios.
    Risk {
        /// Price file of the asset.
        file: PathBuf,

        /// Price file of a benchmark for beta, alpha and correlation.
        #[arg(long)]
        benchmark: Option<PathBuf>,
    },
    /// Compute momentum oscillators.
    Momentum {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Which indicator to report.
        #[arg(long, value_enum, default_value_t = IndicatorChoice::All)]
        indicator: IndicatorChoice,
    },
    /// Compute a moving average, or a crossover with --crossover.
    MovingAverage {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Use the [crossover] config instead of [moving_average].
        #[arg(long, default_value_t = false)]
        crossover: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndicatorChoice {
    Rsi,
    Macd,
    Stochastic,
    WilliamsR,
    Roc,
    All,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = execute(&cli)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Run the selected command and return its JSON output.
fn execute(cli: &Cli) -> Result<Value> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Validate { files } => for_each_file(files, |path| {
            let record = input::load_record(path)?;
            let report = PriceSeriesValidator::validate_record(&record, &config.validation);
            Ok(serde_json::to_value(report)?)
        }),
        Commands::Risk { file, benchmark } => {
            let series = input::load_series(file)?;
            let benchmark = benchmark.as_deref().map(input::load_series).transpose()?;
            let report = RiskMetricsEngine::compute(&series, benchmark.as_ref(), &config.risk)
                .with_context(|| format!("risk metrics failed for {}", file.display()))?;
            Ok(serde_json::to_value(report)?)
        }
        Commands::Momentum { files, indicator } => for_each_file(files, |path| {
            let series = input::load_series(path)?;
            let cfg = &config.momentum;
            let value = match indicator {
                IndicatorChoice::Rsi => serde_json::to_value(MomentumIndicatorEngine::rsi(&series, cfg)?)?,
                IndicatorChoice::Macd => serde_json::to_value(MomentumIndicatorEngine::macd(&series, cfg)?)?,
                IndicatorChoice::Stochastic => {
                    serde_json::to_value(MomentumIndicatorEngine::stochastic(&series, cfg)?)?
                }
                IndicatorChoice::WilliamsR => {
                    serde_json::to_value(MomentumIndicatorEngine::williams_r(&series, cfg)?)?
                }
                IndicatorChoice::Roc => serde_json::to_value(MomentumIndicatorEngine::roc(&series, cfg)?)?,
                IndicatorChoice::All => {
                    serde_json::to_value(MomentumIndicatorEngine::compute_all(&series, cfg)?)?
                }
            };
            Ok(value)
        }),
        Commands::MovingAverage { files, crossover } => for_each_file(files, |path| {
            let series = input::load_series(path)?;
            let value = if *crossover {
                serde_json::to_value(MovingAverageEngine::crossover(&series, &config.crossover)?)?
            } else {
                serde_json::to_value(MovingAverageEngine::compute(&series, &config.moving_average)?)?
            };
            Ok(value)
        }),
    }
}

/// Process files in parallel; results keep input order.
fn for_each_file<F>(files: &[PathBuf], f: F) -> Result<Value>
where
    F: Fn(&Path) -> Result<Value> + Send + Sync,
{
    tracing::debug!(files = files.len(), "processing price files");
    let reports = files
        .par_iter()
        .map(|path| f(path.as_path()).with_context(|| format!("failed to process {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, closes: &[f64]) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "date,close").unwrap();
        let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for (i, c) in closes.iter().enumerate() {
            writeln!(f, "{},{c}", base + chrono::Duration::days(i as i64)).unwrap();
        }
        path
    }

    fn trend(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| 100.0 + step * i as f64 + (i as f64 * 0.5).sin()).collect()
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["quantlens", "momentum", "a.csv", "--indicator", "williams-r", "--pretty"])
            .unwrap();
        assert!(cli.pretty);
        assert!(matches!(
            cli.command,
            Commands::Momentum {
                indicator: IndicatorChoice::WilliamsR,
                ..
            }
        ));
    }

    #[test]
    fn validate_requires_files() {
        assert!(Cli::try_parse_from(["quantlens", "validate"]).is_err());
    }

    #[test]
    fn validate_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = ["aaa", "bbb", "ccc"]
            .iter()
            .map(|name| write_csv(&dir, &format!("{name}.csv"), &trend(40, 0.5)))
            .collect();
        let cli = Cli {
            config: None,
            pretty: false,
            command: Commands::Validate { files },
        };

        let out = execute(&cli).unwrap();
        let tickers: Vec<&str> = out
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["ticker"].as_str().unwrap())
            .collect();
        assert_eq!(tickers, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn risk_with_benchmark_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let asset = write_csv(&dir, "asset.csv", &trend(80, 0.3));
        let bench = write_csv(&dir, "index.csv", &trend(80, 0.1));
        let config = dir.path().join("quantlens.toml");
        std::fs::write(&config, "[risk]\nconfidence_level = 0.99\nvar_method = \"parametric\"\n").unwrap();

        let cli = Cli {
            config: Some(config),
            pretty: false,
            command: Commands::Risk {
                file: asset,
                benchmark: Some(bench),
            },
        };
        let out = execute(&cli).unwrap();
        assert_eq!(out["confidence_level"], 0.99);
        assert_eq!(out["var_method"], "parametric");
        assert_eq!(out["benchmark"]["ticker"], "INDEX");
        assert_eq!(out["benchmark"]["beta"]["status"], "defined");
    }

    #[test]
    fn momentum_single_indicator() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_csv(&dir, "up.csv", &trend(60, 1.0));
        let cli = Cli {
            config: None,
            pretty: false,
            command: Commands::Momentum {
                files: vec![file],
                indicator: IndicatorChoice::Roc,
            },
        };
        let out = execute(&cli).unwrap();
        assert_eq!(out[0]["signal"], "bullish");
        assert_eq!(out[0]["period"], 12);
    }

    #[test]
    fn short_file_is_an_error_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_csv(&dir, "short.csv", &trend(10, 1.0));
        let cli = Cli {
            config: None,
            pretty: false,
            command: Commands::MovingAverage {
                files: vec![file],
                crossover: true,
            },
        };
        let err = execute(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("short.csv"));
        assert!(format!("{err:#}").contains("requires at least 200 points"));
    }

    #[test]
    fn bad_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_csv(&dir, "x.csv", &trend(60, 1.0));
        let config = dir.path().join("bad.toml");
        std::fs::write(&config, "[crossover]\nfast_period = 50\nslow_period = 50\n").unwrap();
        let cli = Cli {
            config: Some(config),
            pretty: false,
            command: Commands::MovingAverage {
                files: vec![file],
                crossover: true,
            },
        };
        let err = execute(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }
}
