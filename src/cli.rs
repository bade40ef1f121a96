//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::{format_comparison, format_summary};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_strategy, BacktestConfig, BacktestResult};
use crate::domain::comparison::compare_strategies;
use crate::domain::config_validation::{
    load_all_strategies, load_backtest_config, load_risk_free_rate, load_strategy,
    strategy_kind, validate_backtest_config, validate_strategy_config, StrategyKind,
};
use crate::domain::error::AlgoTraderError;
use crate::domain::metrics::{summarize_with_rate, Performance};
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{SignalGenerator, Strategy};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// Fewest bars that give the simulator one bar to act on.
pub const MIN_BARS: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "algotrader", about = "Single-asset trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the trade ledger and equity curve
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// OHLC CSV file, overriding [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// ema_crossover, ema_rsi or macd, overriding [strategy] kind
        #[arg(short, long)]
        strategy: Option<String>,
        /// Output directory, overriding [output] dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Run every strategy over the same data and print a comparison table
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Validate a configuration file without running anything
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            output,
            log_level,
        } => run_backtest(
            &config,
            data.as_deref(),
            strategy.as_deref(),
            output.as_deref(),
            log_level.as_deref(),
        ),
        Command::Compare {
            config,
            data,
            log_level,
        } => run_compare(&config, data.as_deref(), log_level.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn init_logging(config: &dyn ConfigPort, cli_level: Option<&str>) -> Result<(), AlgoTraderError> {
    let config_level = config.get_string("log", "level");
    let filter = logging::resolve_filter(cli_level, config_level.as_deref());
    logging::init_tracing(&filter).map_err(|reason| AlgoTraderError::ConfigInvalid {
        section: "log".to_string(),
        key: "level".to_string(),
        reason,
    })
}

/// `--data` when given, else `[data] path`.
pub fn resolve_data_path(
    config: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<PathBuf, AlgoTraderError> {
    if let Some(path) = data_override {
        return Ok(path.to_path_buf());
    }
    match config.get_string("data", "path") {
        Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p.trim())),
        _ => Err(AlgoTraderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

/// `--output` when given, else `[output] dir`, else the working directory.
pub fn resolve_output_dir(config: &dyn ConfigPort, output_override: Option<&Path>) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| {
            config
                .get_string("output", "dir")
                .filter(|d| !d.trim().is_empty())
                .map(|d| PathBuf::from(d.trim()))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `--strategy` when given, else `[strategy] kind`.
pub fn resolve_strategy(
    config: &dyn ConfigPort,
    kind_override: Option<&str>,
) -> Result<Strategy, AlgoTraderError> {
    let kind: StrategyKind = match kind_override {
        Some(s) => s.parse()?,
        None => strategy_kind(config)?,
    };
    load_strategy(config, kind)
}

pub fn load_bars(data_port: &dyn DataPort) -> Result<Vec<PriceBar>, AlgoTraderError> {
    let bars = data_port.fetch_bars()?;
    if bars.is_empty() {
        return Err(AlgoTraderError::EmptySeries);
    }
    if bars.len() < MIN_BARS {
        return Err(AlgoTraderError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    Ok(bars)
}

/// Outcome of one backtest pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRun {
    pub strategy: &'static str,
    pub result: BacktestResult,
    pub performance: Performance,
}

/// Load bars, simulate, summarize and persist the ledger and equity curve.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
    risk_free_rate: f64,
) -> Result<BacktestRun, AlgoTraderError> {
    tracing::info!(source = %data_port.source(), "loading price data");
    let bars = load_bars(data_port)?;

    let (_, result) = run_strategy(&bars, strategy, bt_config)?;
    let performance = summarize_with_rate(&result.trades, &result.equity_curve, risk_free_rate);

    report_port.write(&result, strategy.name())?;

    Ok(BacktestRun {
        strategy: strategy.name(),
        result,
        performance,
    })
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    strategy_override: Option<&str>,
    output_override: Option<&Path>,
    log_level: Option<&str>,
) -> Result<(), AlgoTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    init_logging(&config, log_level)?;
    tracing::info!(config = %config_path.display(), "loaded config");

    let bt_config = load_backtest_config(&config)?;
    let risk_free_rate = load_risk_free_rate(&config)?;
    let strategy = resolve_strategy(&config, strategy_override)?;

    let data_port = CsvAdapter::new(resolve_data_path(&config, data_override)?);
    let report_port = CsvReportAdapter::new(resolve_output_dir(&config, output_override));

    let run = run_backtest_pipeline(
        &data_port,
        &report_port,
        &strategy,
        &bt_config,
        risk_free_rate,
    )?;

    print!(
        "{}",
        format_summary(
            run.strategy,
            bt_config.initial_balance,
            &run.result,
            &run.performance
        )
    );
    Ok(())
}

fn run_compare(
    config_path: &Path,
    data_override: Option<&Path>,
    log_level: Option<&str>,
) -> Result<(), AlgoTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    init_logging(&config, log_level)?;

    let bt_config = load_backtest_config(&config)?;
    let risk_free_rate = load_risk_free_rate(&config)?;
    let strategies = load_all_strategies(&config)?;

    let data_port = CsvAdapter::new(resolve_data_path(&config, data_override)?);
    let bars = load_bars(&data_port)?;

    let rows = compare_strategies(&bars, &strategies, &bt_config, risk_free_rate)?;
    print!("{}", format_comparison(&rows, bt_config.initial_balance));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), AlgoTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    validate_backtest_config(&config)?;
    validate_strategy_config(&config)?;

    let kind = strategy_kind(&config)?;
    println!("Config validated successfully (strategy: {})", kind);
    Ok(())
}
