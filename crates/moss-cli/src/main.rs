mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, SubmitArgs};
use dotenv::dotenv;
use moss_core::config::parse_flag;
use moss_core::session::ResultId;
use moss_core::{AppConfig, Language, ReportFetcher, SessionClient};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match moss_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Submit(submit)) => run_submit(&config, &submit),
        Some(Commands::Save { id, dir }) => run_save(&config, &id, &dir),
        Some(Commands::Languages) => {
            for lang in Language::ALL {
                println!("{}", lang);
            }
            Ok(())
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn run_submit(config: &AppConfig, args: &SubmitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = config.options.to_session_config()?;
    let mut client =
        SessionClient::with_server(config.userid, &config.server, config.port).with_config(session);

    if let Some(lang) = &args.language {
        client.set_language(lang)?;
    }
    if let Some(flag) = &args.directory {
        client.set_directory_mode(parse_flag("directory", flag)?);
    }
    if let Some(flag) = &args.experimental {
        client.set_experimental(parse_flag("experimental", flag)?);
    }
    if let Some(limit) = args.max_matches {
        client.set_ignore_limit(limit)?;
    }
    if let Some(limit) = args.show {
        client.set_result_limit(limit)?;
    }
    if let Some(comment) = &args.comment {
        client.set_comment(comment.clone());
    }

    for path in &args.base_files {
        client.add_base_file(path)?;
    }
    for pattern in &args.base_patterns {
        let added = client.add_base_by_wildcard(pattern)?;
        info!("{} base files matched {}", added, pattern);
    }
    for path in &args.files {
        client.add_file(path)?;
    }
    for pattern in &args.patterns {
        let added = client.add_by_wildcard(pattern)?;
        info!("{} files matched {}", added, pattern);
    }

    if client.files().is_empty() {
        return Err("no files to submit".into());
    }
    if config.userid == 0 {
        warn!("No MOSS user id configured; set MOSS_USERID or `userid` in Moss.toml");
    }

    info!(
        "Submitting {} files ({} base) as {}",
        client.files().len(),
        client.base_files().len(),
        client.config().language()
    );

    let reporter = CliReporter::new();
    let id = client.send_with(&reporter)?;
    drop(reporter);

    info!("Results: {}", format!("http://{}/results/{}", config.server, id).green());

    if let Some(dir) = &args.save {
        save_report(config, id, dir)?;
    }

    Ok(())
}

fn run_save(config: &AppConfig, id: &str, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let id: ResultId = id
        .parse()
        .map_err(|e| format!("invalid result id '{}': {}", id, e))?;
    save_report(config, id, dir)
}

fn save_report(
    config: &AppConfig,
    id: ResultId,
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let timeout = config.http_timeout_secs.map(Duration::from_secs);
    let fetcher = ReportFetcher::new(&config.server, timeout)?;
    let reporter = CliReporter::new();
    let summary = fetcher.save_report_with(dir, id, &reporter)?;

    info!(
        "{} match cases, {} pages written to {}",
        format!("{}", summary.cases).cyan(),
        format!("{}", summary.pages_written).cyan(),
        summary.directory.display().to_string().cyan(),
    );
    Ok(())
}
