use clap::{App, Arg};
use colored::*;
use linksim::config::{
    SimulatorConfig, DEFAULT_BROKER, DEFAULT_FIXTURE, DEFAULT_PACKET_INTERVAL_MS,
};
use linksim::simulator::Simulator;
use std::io::Write;
use std::time::Duration;
use tokio::time;
use tracing::error;

const STATUS_PERIOD_MS: u64 = 500;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let matches = App::new("linksim")
        .version("0.1.0")
        .author("Ground Segment Tools Team")
        .about("🛰️  CCSDS Link Simulator - replays recorded telemetry over MQTT")
        .arg(
            Arg::with_name("broker")
                .short("b")
                .long("broker")
                .value_name("URL")
                .help("MQTT broker address (tcp://, ssl:// or tls://)")
                .takes_value(true)
                .default_value(DEFAULT_BROKER),
        )
        .arg(
            Arg::with_name("fixture")
                .short("f")
                .long("fixture")
                .value_name("FILE")
                .help("Recorded CCSDS packet file to replay")
                .takes_value(true)
                .default_value(DEFAULT_FIXTURE),
        )
        .arg(
            Arg::with_name("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .help("Pause between telemetry packets in milliseconds")
                .takes_value(true)
                .default_value("1000")
                .validator(|v| match v.parse::<u64>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err("Interval must be a whole number of milliseconds".into()),
                }),
        )
        .get_matches();

    let config = SimulatorConfig {
        broker: matches.value_of("broker").unwrap_or(DEFAULT_BROKER).into(),
        fixture: matches.value_of("fixture").unwrap_or(DEFAULT_FIXTURE).into(),
        packet_interval: Duration::from_millis(
            matches
                .value_of("interval-ms")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PACKET_INTERVAL_MS),
        ),
        ..SimulatorConfig::default()
    };

    println!("{}", "🛰️  CCSDS Link Simulator".bold());
    println!("========================");

    let mut simulator = Simulator::new(config);
    if let Err(e) = simulator.start().await {
        error!("❌ Startup failed: {}", e);
        return Err(e.into());
    }

    let stats = simulator.stats();
    let mut status_interval = time::interval(Duration::from_millis(STATUS_PERIOD_MS));
    let mut previous = None;

    loop {
        tokio::select! {
            _ = status_interval.tick() => {
                let snapshot = stats.snapshot();
                if previous.as_ref() != Some(&snapshot) {
                    print!("\r{}", snapshot);
                    std::io::stdout().flush().ok();
                    previous = Some(snapshot);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    simulator.shutdown().await;
    println!("{}", "🚀 Link simulator stopped".green());

    Ok(())
}
