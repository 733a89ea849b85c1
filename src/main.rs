// glyph-pool - command-line entry point

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use glyph_pool::cli::{Cli, Commands, ConfigCommands};
use glyph_pool::commands::{self, ImageSource};
use glyph_pool::models::response::{CommandResponse, HealthResponse, ResolveEntry, SaveTarget};
use glyph_pool::services::{ComposedCell, ComposedSentence};
use glyph_pool::storage::config::ConfigService;
use glyph_pool::{logging, AppConfig, AppError, AppResult, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => ConfigService::at_path(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;

    logging::init(&config.get_config().log_level, cli.verbose);
    tracing::debug!(path = %config.path().display(), "configuration loaded");

    let json = cli.json;
    let code = match cli.command {
        Commands::Config { action } => {
            let result = match action {
                ConfigCommands::Show => commands::get_settings(&config),
                ConfigCommands::SetRemote { path } => commands::set_remote(&mut config, &path),
                ConfigCommands::DisableRemote => commands::set_remote_enabled(&mut config, false),
                ConfigCommands::EnableRemote => commands::set_remote_enabled(&mut config, true),
                ConfigCommands::Reset => commands::reset_settings(&mut config),
            };
            report(json, result, print_config)?
        }
        command => {
            let state = AppState::from_config(config.get_config(), cli.local_only)
                .context("failed to start glyph services")?;
            dispatch(&state, command, json).await?
        }
    };

    Ok(code)
}

async fn dispatch(state: &AppState, command: Commands, json: bool) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Whoami => report(json, commands::whoami(state), |id| println!("{}", id)),
        Commands::Save {
            character,
            image_file,
            data_url,
        } => {
            let source = match (image_file, data_url) {
                (Some(path), _) => ImageSource::File(path),
                (None, Some(url)) => ImageSource::DataUrl(url),
                (None, None) => {
                    return report::<()>(
                        json,
                        Err(AppError::validation("one of --image-file or --data-url is required")),
                        |_| {},
                    )
                }
            };
            let result = commands::save_glyph(state, &character, source).await;
            report(json, result, |saved| {
                println!("{} {:?} -> {}", saved_label(saved.target), saved.character, saved.id)
            })
        }
        Commands::Resolve { characters } => {
            let result = commands::resolve_glyphs(state, &characters).await;
            report(json, result, |entries| print_resolution(entries))
        }
        Commands::Compose { sentence } => {
            let result = commands::compose_sentence(state, sentence.as_deref()).await;
            report(json, result, print_composition)
        }
        Commands::Export { character, out } => {
            let result = commands::export_glyph(state, &character, &out).await;
            report(json, result, |exported| {
                println!(
                    "wrote {} bytes ({} glyph for {:?}) to {}",
                    exported.bytes, exported.source, exported.character, exported.path
                )
            })
        }
        Commands::Doctor => {
            let result = commands::get_health(state).await;
            report(json, result, print_health)
        }
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Print a command result and map it to an exit code.
fn report<T: Serialize>(
    json: bool,
    result: AppResult<T>,
    render: impl FnOnce(&T),
) -> anyhow::Result<ExitCode> {
    if json {
        let response: CommandResponse<T> = result.into();
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(if response.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    match result {
        Ok(data) => {
            render(&data);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn saved_label(target: SaveTarget) -> &'static str {
    match target {
        SaveTarget::Pool => "saved to pool",
        SaveTarget::Local => "saved locally",
    }
}

fn print_config(config: &AppConfig) {
    println!("remote_enabled:       {}", config.remote_enabled);
    println!(
        "remote_database_path: {}",
        config.remote_database_path.as_deref().unwrap_or("(default)")
    );
    println!(
        "local_storage_path:   {}",
        config.local_storage_path.as_deref().unwrap_or("(default)")
    );
    println!("local_quota_bytes:    {}", config.local_quota_bytes);
    println!("sentence:             {}", config.sentence);
    println!("log_level:            {}", config.log_level);
}

fn print_resolution(entries: &[ResolveEntry]) {
    for entry in entries {
        println!("{}\t{}", entry.character, entry.source);
    }
}

fn print_composition(composed: &ComposedSentence) {
    for cell in &composed.cells {
        match cell {
            ComposedCell::Glyph {
                character,
                provenance,
                ..
            } => println!("{}\t{}", character, provenance),
            ComposedCell::DefaultType { character } => println!("{}\tdefault", character),
            ComposedCell::Space => println!("\tspace"),
        }
    }
    println!(
        "own: {}, global: {}, default: {}",
        composed.own_count(),
        composed.global_count(),
        composed.default_count()
    );
}

fn print_health(health: &HealthResponse) {
    println!("status:    {}", health.status);
    println!("identity:  {}", health.identity);
    println!("local:     {}", if health.local_healthy { "ok" } else { "unavailable" });
    if !health.remote_configured {
        println!("pool:      disabled (local-only)");
    } else if health.remote_reachable {
        match health.artifact_count {
            Some(count) => println!("pool:      ok ({} glyphs)", count),
            None => println!("pool:      ok"),
        }
    } else {
        println!("pool:      unreachable");
    }
    if let Some(error) = &health.remote_error {
        println!("pool error: {}", error);
    }
}
