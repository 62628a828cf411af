mod input;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mpticks_common::{Config, ReportConfig};
use mpticks_core::{build_report, export_json, LinearHistogram};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mpticks", version, about = "Usage histograms for mpticks user exports")]
struct Cli {
    /// -v for info, -vv for debug (RUST_LOG wins when set)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print user, import, route and tick distributions
    Report {
        /// export file, directory, or glob pattern
        input: String,
        #[arg(long)] bar_width: Option<usize>,
        #[arg(long)] label_width: Option<usize>,
        #[arg(long)] json: Option<PathBuf>,
    },
    /// Render a histogram of integers read from FILE or stdin
    Hist {
        #[arg(long, allow_hyphen_values = true)] min: i64,
        #[arg(long, allow_hyphen_values = true)] max: i64,
        #[arg(long)] buckets: usize,
        #[arg(long, default_value_t = 20)] bar_width: usize,
        #[arg(long, default_value_t = 0)] label_width: usize,
        file: Option<PathBuf>,
    },
    /// Print the effective config
    Config {
        #[arg(long)] init: bool,
    },
    Completions { shell: Shell },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Report { input, bar_width, label_width, json } => {
            let config = Config::load()?;
            run_report(input, bar_width, label_width, json, config)?
        }
        Commands::Hist { min, max, buckets, bar_width, label_width, file } => {
            run_hist(min, max, buckets, bar_width, label_width, file)?
        }
        Commands::Config { init } => run_config(init)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mpticks", &mut io::stdout());
        }
    }
    Ok(())
}

fn run_report(input: String, bar_width: Option<usize>, label_width: Option<usize>, json: Option<PathBuf>, config: Config) -> anyhow::Result<()> {
    let report_cfg = ReportConfig {
        bar_width: bar_width.unwrap_or(config.report.bar_width),
        label_width: label_width.unwrap_or(config.report.label_width),
    };
    let report = build_report(&input, &config.histograms)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.write(&mut out, &report_cfg)?;
    out.flush()?;
    if let Some(path) = json {
        export_json(&path, &report)?;
        eprintln!("Exported to {}", path.display());
    }
    Ok(())
}

fn run_hist(min: i64, max: i64, buckets: usize, bar_width: usize, label_width: usize, file: Option<PathBuf>) -> anyhow::Result<()> {
    let mut hist = LinearHistogram::new(min, max, buckets)?;
    let values = match &file {
        Some(path) => input::read_values(std::fs::File::open(path)?)?,
        None => input::read_values(io::stdin().lock())?,
    };
    debug!(values = values.len(), step = hist.step(), "read values");
    hist.extend(values);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    hist.render(&mut out, label_width, bar_width)?;
    out.flush()?;
    Ok(())
}

fn run_config(init: bool) -> anyhow::Result<()> {
    if init {
        let path = Config::resolved_path();
        if path.exists() { anyhow::bail!("config already exists: {}", path.display()); }
        Config::default().save()?;
        info!(path = %path.display(), "wrote default config");
        println!("Wrote {}", path.display());
        return Ok(());
    }
    let config = Config::load()?;
    print!("{}", config.to_toml()?);
    Ok(())
}
