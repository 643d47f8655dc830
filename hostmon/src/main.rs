use clap::{Arg, ArgAction, Command};
use hostmon_core::{config::CliConfig, Config, HostSample, LinuxProvider, MetricsCollector};
use std::{io::Write, path::PathBuf, process, thread};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("hostmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Host telemetry collector - per-interval disk, network and CPU deltas as JSON")
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("PATH")
                .help("Host root containing proc, sys and the listing utilities")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .value_name("MS")
                .help("Sampling interval in milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("samples")
                .long("samples")
                .short('n')
                .value_name("COUNT")
                .help("Number of samples to emit before exiting")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("disk")
                .long("disk")
                .value_name("DEVICE")
                .help("Block device to sample (repeatable); defaults to every device found")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print JSON output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity (repeatable)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    init_logging(matches.get_count("verbose"))?;

    // Build CLI configuration
    let cli_config = CliConfig {
        root: matches.get_one::<PathBuf>("root").cloned(),
        interval_ms: matches.get_one::<u64>("interval").copied(),
        samples: matches.get_one::<u64>("samples").copied(),
        disks: matches
            .get_many::<String>("disk")
            .map(|disks| disks.cloned().collect())
            .unwrap_or_default(),
        pretty: matches.get_flag("pretty"),
    };

    // Load configuration
    let config_path = matches.get_one::<PathBuf>("config");
    let config = Config::load(Some(&cli_config), config_path.map(PathBuf::as_path))?;

    run_collector(config)
}

/// Logs go to stderr; stdout carries one JSON sample per interval
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("hostmon={}", level).parse()?)
        .add_directive(format!("hostmon_core={}", level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_collector(config: Config) -> anyhow::Result<()> {
    let provider = LinuxProvider::from_config(&config);
    let mut collector = MetricsCollector::new(provider, config.disks.clone());
    collector.init()?;
    info!(root = %config.root.display(), interval_ms = config.interval_ms, "collector started");

    let stdout = std::io::stdout();
    let mut emitted = 0u64;
    while config.samples.map_or(true, |samples| emitted < samples) {
        thread::sleep(config.interval());
        let sample = collector.collect()?;
        write_sample(&mut stdout.lock(), &sample, config.pretty)?;
        emitted += 1;
    }

    Ok(())
}

fn write_sample<W: Write>(writer: &mut W, sample: &HostSample, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, sample)?;
    } else {
        serde_json::to_writer(&mut *writer, sample)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
