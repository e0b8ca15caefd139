//! WeatherVerse dashboard CLI.
//!
//! Run with: `cargo run -p weatherverse-client -- watch`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use time::UtcOffset;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use weatherverse_client::{
    ClientConfig, DashboardPoller, Snapshot, StationClient, SubmitReading, Trend,
};
use weatherverse_types::{Reading, parse_timestamp};

#[derive(Parser)]
#[command(name = "weatherverse")]
#[command(author, version, about = "Dashboard for the WeatherVerse station", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service URL (overrides config)
    #[arg(short, long, global = true, env = "WEATHERVERSE_URL")]
    url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the service and print each new reading (default)
    Watch {
        /// Seconds between polls (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Do not raise alerts
        #[arg(long)]
        no_alerts: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Submit one reading
    Send {
        /// Temperature in °C
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: f64,

        /// Relative humidity in %
        #[arg(short = 'H', long)]
        humidity: f64,

        /// Device timestamp (RFC 3339, or ISO 8601 without offset for UTC)
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Submit random sample readings
    Simulate {
        /// Number of readings to send
        #[arg(short = 'n', long, default_value = "24")]
        count: u32,

        /// Seconds between readings
        #[arg(short, long, default_value = "1")]
        interval_secs: u64,
    },

    /// Print the readings retained by the service
    History {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    // The local offset can only be read safely while the process is single-threaded.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(Cli::parse(), local_offset))
}

async fn run(cli: Cli, local_offset: UtcOffset) -> Result<()> {

    let filter = if cli.verbose {
        EnvFilter::new("weatherverse_client=debug")
    } else {
        EnvFilter::from_default_env().add_directive("weatherverse_client=info".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::load_default()?,
    };
    if let Some(url) = cli.url {
        config.dashboard.url = url;
    }

    match cli.command.unwrap_or(Commands::Watch {
        interval: None,
        no_alerts: false,
        format: OutputFormat::Text,
    }) {
        Commands::Watch {
            interval,
            no_alerts,
            format,
        } => {
            if let Some(secs) = interval {
                config.dashboard.poll_interval_secs = secs;
            }
            if no_alerts {
                config.alerts.enabled = false;
            }
            config.validate()?;
            watch(config, format, local_offset).await
        }
        Commands::Send {
            temperature,
            humidity,
            timestamp,
        } => {
            let mut reading = SubmitReading::new(temperature, humidity);
            if let Some(ts) = timestamp {
                reading = reading.at(parse_timestamp(&ts)?);
            }
            let client = StationClient::new(&config.dashboard.url)?;
            let ack = client.submit(&reading).await?;
            println!("Recorded {temperature}°C, {humidity}% at {}", ack.timestamp);
            Ok(())
        }
        Commands::Simulate {
            count,
            interval_secs,
        } => simulate(&config.dashboard.url, count, interval_secs).await,
        Commands::History { format } => {
            let client = StationClient::new(&config.dashboard.url)?;
            print_history(&client.history().await?, format, local_offset)
        }
    }
}

async fn watch(config: ClientConfig, format: OutputFormat, local_offset: UtcOffset) -> Result<()> {
    let client = Arc::new(StationClient::new(&config.dashboard.url)?);
    if !client.is_up().await {
        warn!(
            "Service at {} is not responding yet, polling anyway",
            client.base_url()
        );
    }

    let trigger = config
        .alerts
        .trigger()
        .context("Failed to set up alert notifier")?;
    info!(
        "Polling {} every {}s",
        client.base_url(),
        config.dashboard.poll_interval_secs
    );

    let options = config.dashboard.poller_options().utc_offset(local_offset);
    let poller = DashboardPoller::spawn(client, options, trigger);
    let mut snapshots = poller.subscribe();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    print_snapshot(&snapshot, format, local_offset)?;
                }
            }
        }
    }

    poller.stop().await;
    Ok(())
}

async fn simulate(url: &str, count: u32, interval_secs: u64) -> Result<()> {
    let client = StationClient::new(url)?;

    for i in 0..count {
        if i > 0 {
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }

        let reading = {
            let mut rng = rand::rng();
            SubmitReading::new(
                f64::from(rng.random_range(25..=34)),
                f64::from(rng.random_range(30..=49)),
            )
        };

        match client.submit(&reading).await {
            Ok(_) => println!(
                "[{}/{}] sent {}°C, {}%",
                i + 1,
                count,
                reading.temperature,
                reading.humidity
            ),
            Err(e) => warn!("Failed to send sample reading: {}", e),
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &Snapshot, format: OutputFormat, offset: UtcOffset) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(snapshot)?),
        OutputFormat::Text => {
            let current = &snapshot.current;
            let mut line = format!(
                "[{}] {:.1}°C ({}, {})  {:.1}% ({})  {}",
                clock(current, offset),
                current.temperature(),
                trend_label(snapshot.temperature_trend, "°C"),
                snapshot.temperature_band,
                current.humidity(),
                trend_label(snapshot.humidity_trend, "%"),
                snapshot.time_of_day,
            );
            if snapshot.heat_wave {
                line.push_str("  HEAT WAVE");
            }
            if snapshot.high_humidity {
                line.push_str("  HIGH HUMIDITY");
            }
            println!("{line}");
        }
    }
    Ok(())
}

fn print_history(readings: &[Reading], format: OutputFormat, offset: UtcOffset) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(readings)?),
        OutputFormat::Text if readings.is_empty() => println!("No readings yet"),
        OutputFormat::Text => {
            println!("{:<8} {:>8} {:>8}", "Time", "Temp", "Humidity");
            for reading in readings {
                println!(
                    "{:<8} {:>6.1}°C {:>7.1}%",
                    clock(reading, offset),
                    reading.temperature(),
                    reading.humidity()
                );
            }
        }
    }
    Ok(())
}

fn trend_label(trend: Option<Trend>, unit: &str) -> String {
    trend.map_or_else(|| "first reading".to_string(), |t| t.label(unit))
}

fn clock(reading: &Reading, offset: UtcOffset) -> String {
    let ts = reading.timestamp().to_offset(offset);
    format!("{:02}:{:02}:{:02}", ts.hour(), ts.minute(), ts.second())
}
