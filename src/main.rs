// src/main.rs
use std::path::PathBuf;
use std::sync::mpsc::channel;
use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use timescan::engine::spawn_scan;
use timescan::signal::SimulatedSource;
use timescan::types::{ScanCommand, ScanMessage};
use timescan::{DataRecorder, ScanConfig, ScanDriver};

/// Watch live values at a fixed cadence and keep a rolling window of their history.
#[derive(Parser, Debug)]
#[command(name = "timescan", version)]
struct Args {
    /// Names of the values to monitor.
    signals: Vec<String>,
    /// Start monitoring right away (otherwise only print the resolved config).
    #[arg(short, long)]
    start: bool,
    /// Seconds between two reads.
    #[arg(short, long)]
    interval: Option<f64>,
    /// Seconds of history kept in the window.
    #[arg(short, long)]
    period: Option<f64>,
    /// Keep going after the window has filled once.
    #[arg(short, long)]
    continuous: bool,
    /// Directory for the data file.
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,
    /// Name of the data file.
    #[arg(short = 'f', long = "file", conflicts_with = "autoname")]
    file: Option<String>,
    /// Pick a time-stamped data file name.
    #[arg(short = 'N', long)]
    autoname: bool,
    /// Lower bound of the Y axis.
    #[arg(short = 'm', long, conflicts_with = "automin", allow_negative_numbers = true)]
    min: Option<f64>,
    #[arg(long)]
    automin: bool,
    /// Upper bound of the Y axis.
    #[arg(short = 'M', long, conflicts_with = "automax", allow_negative_numbers = true)]
    max: Option<f64>,
    #[arg(long)]
    automax: bool,
    /// Logarithmic Y axis.
    #[arg(short, long)]
    log: bool,
    /// Normalize every channel onto a common scale.
    #[arg(short, long)]
    normalize: bool,
    /// JSON scan configuration; command line options override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop a continuous scan after this many points.
    #[arg(long)]
    ticks: Option<usize>,
    /// Seed of the simulated value source.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn build_config(args: &Args) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ScanConfig::default(),
    };
    if let Some(period) = args.period {
        config.set_period(period)?;
    }
    if let Some(interval) = args.interval {
        config.set_interval(interval)?;
    }
    config.continuous |= args.continuous;
    if args.dir.is_some() {
        config.save_dir = args.dir.clone();
    }
    if args.file.is_some() {
        config.save_name = args.file.clone();
        config.auto_name = false;
    }
    config.auto_name |= args.autoname;
    match args.min {
        Some(min) => config.range.set_min(min),
        None if args.automin => config.range.set_auto_min(true),
        None => {}
    }
    match args.max {
        Some(max) => config.range.set_max(max),
        None if args.automax => config.range.set_auto_max(true),
        None => {}
    }
    config.range.log_scale |= args.log;
    config.range.normalize |= args.normalize;
    for signal in &args.signals {
        if !config.channels.contains(signal) {
            config.channels.push(signal.clone());
        }
    }
    Ok(config)
}

// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;
    if !args.start {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    ensure!(!config.channels.is_empty(), "no signals to monitor");
    let mut driver = ScanDriver::new(SimulatedSource::new(args.seed), config.clone())?;
    if let Some(recorder) = DataRecorder::from_config(&config) {
        driver.add_sink(Box::new(recorder));
    }

    let (tx, rx) = channel();
    let (tx_cmd, rx_cmd) = channel();
    let handle = spawn_scan(driver, tx, rx_cmd);
    tx_cmd
        .send(ScanCommand::Start)
        .context("scan thread exited before start")?;

    let mut ticks = 0;
    // rx 在扫描线程退出后关闭
    for msg in rx.iter() {
        match msg {
            ScanMessage::Tick(report) => {
                ticks += 1;
                let values: Vec<String> =
                    report.record.values.iter().map(|(_, v)| v.to_string()).collect();
                println!(
                    "{} {} {}",
                    report.record.index + 1,
                    report.record.timestamp.format("%H:%M:%S%.3f"),
                    values.join(" ")
                );
                log::info!("axis range [{}, {}]", report.range.0, report.range.1);
                if args.ticks.is_some_and(|n| ticks >= n) {
                    tx_cmd.send(ScanCommand::Stop).ok();
                }
            }
            ScanMessage::Status(false) => {
                tx_cmd.send(ScanCommand::Shutdown).ok();
            }
            ScanMessage::Overrun(missed) => log::debug!("{missed} timer fires dropped"),
            ScanMessage::Status(true) | ScanMessage::Range(..) => {}
            ScanMessage::Error(err) => log::error!("{err}"),
        }
    }

    let driver = handle
        .join()
        .map_err(|_| anyhow!("scan thread panicked"))?;
    for channel in driver.channels().iter() {
        log::info!(
            "{}: min {:?}, max {:?}",
            channel.name(),
            channel.min(),
            channel.max()
        );
    }
    Ok(())
}
