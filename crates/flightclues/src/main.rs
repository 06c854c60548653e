//! `fclues` - CLI for flightclues
//!
//! This binary scans a flight record store for hidden characters, verifies the
//! assembled token against the endpoint, downloads the documents it unlocks
//! and manages the store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use flightclues::cli::{
    Cli, Command, ConfigCommand, DownloadCommand, FetchCommand, MapCommand, OutputFormat,
    ScanCommand, VerifyCommand,
};
use flightclues::download::DocumentClient;
use flightclues::fetch::{write_store, FetchClient, StopReason};
use flightclues::pipeline::run;
use flightclues::record::resolve_store_path;
use flightclues::report::{
    render_downloads, render_json, render_plain, render_route_map, render_verification,
};
use flightclues::visual::{plot_routes, AirportTable};
use flightclues::{init_logging, Config, HttpGateway, RecordSet, ScanEngine, VerificationGateway};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Validation failures of a config file are reported by `config validate` itself
    if let Command::Config(config_cmd) = &cli.command {
        return handle_config(cli.config.clone(), config_cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Scan(cmd) => handle_scan(&config, cmd).await,
        Command::Fetch(cmd) => handle_fetch(&config, cmd).await,
        Command::Verify(cmd) => handle_verify(&config, &cmd).await,
        Command::Download(cmd) => handle_download(&config, cmd).await,
        Command::Map(cmd) => handle_map(&config, cmd),
        Command::Config(_) => Ok(()),
    }
}

fn load_records(path: &std::path::Path) -> anyhow::Result<RecordSet> {
    RecordSet::load(path).map_err(|e| {
        if e.is_input_missing() {
            anyhow::Error::new(e).context("no records to analyze; run `fclues fetch` first")
        } else {
            anyhow::Error::new(e)
        }
    })
}

fn load_airports(config: &Config) -> anyhow::Result<AirportTable> {
    let mut airports = AirportTable::builtin()?;
    if let Some(path) = &config.visual.airports_path {
        let extra = AirportTable::load(path)
            .with_context(|| format!("failed to load airports from {}", path.display()))?;
        airports.extend(extra);
    }
    Ok(airports)
}

async fn handle_scan(config: &Config, cmd: ScanCommand) -> anyhow::Result<()> {
    let path = resolve_store_path(cmd.records, &config.input.records_path);
    let records = load_records(&path)?;
    let engine = ScanEngine::with_config(config.detector_config());

    let gateway = if config.verify.enabled && !cmd.no_verify {
        Some(HttpGateway::new(&config.verify.base_url, config.verify_timeout())?)
    } else {
        None
    };
    let airports = if cmd.visual || config.visual.on_failure {
        Some(load_airports(config)?)
    } else {
        None
    };

    let report = run(
        &records,
        &engine,
        gateway.as_ref().map(|g| g as &dyn VerificationGateway),
        airports.as_ref(),
    )
    .await;

    if let Some(map) = &report.route_map {
        map.write_svg(&config.visual.output_path)?;
    }

    match cmd.format {
        OutputFormat::Plain => {
            print!("{}", render_plain(&report));
            if report.route_map.is_some() {
                println!("Route map written to {}", config.visual.output_path.display());
            }
        }
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }
    Ok(())
}

async fn handle_fetch(config: &Config, cmd: FetchCommand) -> anyhow::Result<()> {
    let path = resolve_store_path(cmd.records, &config.input.records_path);
    if path.exists() && !cmd.force {
        println!(
            "Record store {} already exists; use --force to download it again.",
            path.display()
        );
        return Ok(());
    }

    let client = FetchClient::new(
        &config.verify.base_url,
        config.fetch.page_size,
        config.fetch_timeout(),
    )?;
    let summary = client.fetch_all().await;

    match &summary.stop_reason {
        StopReason::EmptyPage { .. } => {}
        StopReason::Status { page, status } => {
            println!("Listing stopped at page {page} with status {status}");
        }
        StopReason::Failed { page, reason } => {
            println!("Listing stopped at page {page}: {reason}");
        }
    }

    if summary.records.is_empty() {
        bail!("no records were fetched from {}", client.page_url(1));
    }

    write_store(&path, &summary.records)?;
    println!(
        "Saved {} records from {} pages to {}",
        summary.records.len(),
        summary.pages,
        path.display()
    );
    Ok(())
}

async fn handle_verify(config: &Config, cmd: &VerifyCommand) -> anyhow::Result<()> {
    let token = cmd.token.trim();
    if token.is_empty() {
        bail!("token cannot be empty");
    }

    let gateway = HttpGateway::new(&config.verify.base_url, config.verify_timeout())?;
    let outcome = gateway.verify(token).await;
    print!("{}", render_verification(&outcome, token));
    Ok(())
}

async fn handle_download(config: &Config, cmd: DownloadCommand) -> anyhow::Result<()> {
    let token = cmd.token.trim();
    if token.is_empty() {
        bail!("token cannot be empty");
    }

    let files = if cmd.files.is_empty() {
        config.download.files.clone()
    } else {
        cmd.files
    };
    let output_dir = cmd
        .output
        .unwrap_or_else(|| config.download.output_dir.clone());

    let client = DocumentClient::new(&config.verify.base_url, token, config.download_timeout())?;
    let results = client
        .download_all(&files, &output_dir)
        .await
        .with_context(|| format!("failed to prepare {}", output_dir.display()))?;

    print!("{}", render_downloads(&results, &output_dir));
    Ok(())
}

fn handle_map(config: &Config, cmd: MapCommand) -> anyhow::Result<()> {
    let path = resolve_store_path(cmd.records, &config.input.records_path);
    let records = load_records(&path)?;
    let airports = load_airports(config)?;

    let map = plot_routes(&records, &airports);
    let output = cmd.output.unwrap_or_else(|| config.visual.output_path.clone());
    map.write_svg(&output)?;

    print!("{}", render_route_map(&map));
    println!("Route map written to {}", output.display());
    Ok(())
}

fn handle_config(
    config_path: Option<std::path::PathBuf>,
    cmd: &ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .clone()
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Input]");
    println!("  Records path:       {}", config.input.records_path.display());
    println!();
    println!("[Scan]");
    println!("  Benign markers:     {}", config.scan.benign_markers_enabled);
    println!("  Markers:            {}", config.scan.benign_markers.join(", "));
    println!(
        "  Leading anomalies:  {}",
        config.scan.leading_anomalies.len()
    );
    println!();
    println!("[Verify]");
    println!("  Enabled:            {}", config.verify.enabled);
    println!("  Base URL:           {}", config.verify.base_url);
    println!("  Timeout (secs):     {}", config.verify.timeout_secs);
    println!();
    println!("[Visual]");
    println!("  On failure:         {}", config.visual.on_failure);
    println!("  Output path:        {}", config.visual.output_path.display());
    if let Some(path) = &config.visual.airports_path {
        println!("  Airports file:      {}", path.display());
    }
    println!();
    println!("[Fetch]");
    println!("  Page size:          {}", config.fetch.page_size);
    println!("  Timeout (secs):     {}", config.fetch.timeout_secs);
    println!();
    println!("[Download]");
    println!("  Files:              {}", config.download.files.join(", "));
    println!("  Output dir:         {}", config.download.output_dir.display());
    println!("  Timeout (secs):     {}", config.download.timeout_secs);
}
