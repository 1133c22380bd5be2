// TeleSift - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Subsystem descriptor loading (built-in + user-defined)
// 4. One extraction run from a file or the controller socket
// 5. Writing tables and printing a summary

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use telesift::app::{self, sink, source};
use telesift::core::decode::Decoder;
use telesift::core::model::Subsystem;
use telesift::platform::config::{self, OutputFormat, PlatformPaths};
use telesift::util::{self, error::Result};

/// TeleSift command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "telesift", version, about = "Extract structured tables from telescope controller telemetry dumps")]
struct Cli {
    /// Read a captured dump from disk instead of the controller socket.
    #[arg(short = 'f', long = "file", conflicts_with = "address")]
    file: Option<PathBuf>,

    /// Controller address (HOST:PORT). Overrides [source] address.
    #[arg(short = 'a', long = "address")]
    address: Option<String>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Additional directory containing user-defined subsystem descriptors.
    #[arg(long = "descriptors")]
    descriptors: Option<PathBuf>,

    /// Output format. Overrides [output] format.
    #[arg(long = "format", value_parser = ["csv", "json"])]
    format: Option<String>,

    /// Output directory. Overrides [output] directory.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only run subsystems whose id matches this glob (repeatable).
    #[arg(long = "only")]
    only: Vec<String>,

    /// List loaded subsystems and exit.
    #[arg(long = "list")]
    list: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "TeleSift starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    if let Err(e) = run(&cli, &platform_paths, app_config) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, paths: &PlatformPaths, app_config: config::AppConfig) -> Result<()> {
    // Descriptor directory: CLI override > config > platform default
    let descriptor_dir = cli
        .descriptors
        .as_deref()
        .or(app_config.descriptor_dir.as_deref())
        .unwrap_or(paths.user_descriptors_dir.as_path());

    let (subsystems, descriptor_errors) =
        app::descriptor_mgr::load_all_descriptors(Some(descriptor_dir));
    for err in &descriptor_errors {
        tracing::warn!(error = %err, "Descriptor loading warning");
    }

    if cli.list {
        print_subsystems(&subsystems);
        return Ok(());
    }

    let patterns = if cli.only.is_empty() {
        &app_config.enabled
    } else {
        &cli.only
    };
    let subsystems = app::pipeline::select_subsystems(subsystems, patterns)?;

    let decoder = Decoder::from_labels(&app_config.primary_encoding, &app_config.fallback_encoding)?;
    tracing::debug!(
        primary = decoder.primary_name(),
        fallback = decoder.fallback_name(),
        "Decoder ready"
    );

    let mut log_source: Box<dyn source::LogSource> = match cli.file {
        Some(ref path) => Box::new(source::FileSource::new(path)),
        None => {
            let mut tcp = source::TcpSource::new(
                cli.address
                    .clone()
                    .unwrap_or_else(|| app_config.source_address.clone()),
            );
            tcp.connect_timeout = Duration::from_millis(app_config.connect_timeout_ms);
            tcp.read_timeout = Duration::from_millis(app_config.read_timeout_ms);
            tcp.max_bytes = app_config.max_bytes;
            Box::new(tcp)
        }
    };

    let report = app::pipeline::run(log_source.as_mut(), &decoder, &subsystems)?;

    let format = cli
        .format
        .as_deref()
        .and_then(OutputFormat::from_label)
        .unwrap_or(app_config.output_format);
    let output_dir = cli.output.clone().unwrap_or(app_config.output_dir);

    let mut record_sink: Box<dyn sink::RecordSink> = match format {
        OutputFormat::Csv => Box::new(sink::CsvDirSink::new(&output_dir)),
        OutputFormat::Json => Box::new(sink::JsonSink::new(&output_dir)),
    };
    let written = app::pipeline::write_outputs(&report, record_sink.as_mut())?;

    println!(
        "{} bytes from {} ({}), {} entries, {} lines skipped",
        report.bytes_received,
        report.source,
        report.encoding,
        report.entries,
        report.lines_skipped
    );
    for output in &report.outputs {
        if output.is_empty() {
            println!("  {:<16} no data", output.subsystem_id);
            continue;
        }
        for table in &output.tables {
            println!(
                "  {:<16} {:<16} {:>6} rows",
                output.subsystem_id,
                table.name,
                table.rows.len()
            );
        }
    }
    println!(
        "{written} tables written to {} as {}",
        output_dir.display(),
        format.label()
    );

    Ok(())
}

fn print_subsystems(subsystems: &[Subsystem]) {
    for s in subsystems {
        println!(
            "{:<16} {:<24} channel={:<4} {:<16} {}{}",
            s.id,
            s.name,
            s.filter.channel.as_deref().unwrap_or("*"),
            s.extraction.label(),
            s.extraction.table_names().join(","),
            if s.is_builtin { "" } else { "  (user)" }
        );
    }
}
