use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tally_handler::{config, logging, normalize_event, replay, LogFormat, ReplayError};

fn event_arg() -> Arg {
    Arg::new("event")
        .long("event")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Path to a recorded stream event (JSON)")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new("tally")
        .version(tally_handler::VERSION)
        .about("Aggregate product quantities from store change streams")
        .subcommand_required(true)
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("process")
                .about("Replay an event against an in-memory store and print the counters")
                .arg(event_arg())
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("table")
                        .long("table")
                        .help("Table name (overrides config file and TABLE_NAME)"),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print the normalized change records of an event")
                .arg(event_arg()),
        );

    let matches = cli.get_matches();

    let format = if matches.get_flag("json-logs") {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init(format);

    match matches.subcommand() {
        Some(("process", args)) => process(args).await,
        Some(("normalize", args)) => normalize(args),
        _ => Ok(()),
    }
}

fn read_event(args: &ArgMatches) -> Result<String> {
    let path = args
        .get_one::<PathBuf>("event")
        .context("--event is required")?;
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

async fn process(args: &ArgMatches) -> Result<()> {
    let payload = read_event(args)?;

    let mut config = config::resolve(
        args.get_one::<PathBuf>("config").map(PathBuf::as_path),
        |name| std::env::var(name).ok(),
    )?;
    if let Some(table) = args.get_one::<String>("table") {
        config.table_name.clone_from(table);
    }
    config.validate()?;

    let outcome = match replay(&payload, config).await {
        Ok(outcome) => outcome,
        Err(ReplayError::Batch(e)) => {
            tracing::error!(error = %e, retryable = e.is_retryable(), "replayed batch failed");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let ack = &outcome.acknowledgement;
    tracing::info!(
        batch_id = %ack.batch_id,
        records = ack.records_seen,
        eligible = ack.records_eligible,
        writes = ack.writes_issued,
        "replay complete"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn normalize(args: &ArgMatches) -> Result<()> {
    let payload = read_event(args)?;
    let records = normalize_event(&payload)?;
    tracing::info!(records = records.len(), "normalized event");
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
