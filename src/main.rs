mod cli;
mod config;
mod draft;
mod export;
mod notify;
mod report;
mod session;
mod submit;
mod summary;

use crate::cli::form::run_form;
use crate::cli::{Cli, Commands, ConfigCommands};
use crate::config::{Config, WEBHOOK_ENV, parse_webhook_url};
use crate::draft::DraftStore;
use crate::report::Field;
use crate::session::FormSession;
use crate::submit::{HttpTransport, Submitter};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fill => handle_fill(),
        Commands::Show { json } => handle_show(json),
        Commands::Set { field, value } => handle_set(&field, &value),
        Commands::Submit => handle_submit(),
        Commands::Copy => handle_copy(),
        Commands::Export { dir } => handle_export(dir),
        Commands::Clear => handle_clear(),
        Commands::Config { command } => handle_config_command(command),
        Commands::Doctor => handle_doctor(),
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_or_default_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_fill() -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;
    let submitter = build_submitter(&config);

    run_form(&mut session, &submitter, &config.report_dir)
}

fn handle_show(json: bool) -> Result<()> {
    let config = load_or_default_config()?;
    let session = open_session(&config)?;
    let report = session.report();

    if json {
        let content =
            serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{content}");
        return Ok(());
    }

    for field in Field::ALL {
        if field == Field::IncidentDetails && !report.needs_incident_details() {
            continue;
        }
        println!("{:<28} {}", field.label(), report.get_field(field));
    }

    if report.incident_details_missing() {
        println!("! Incident details are required when a complaint or accident is reported.");
    }

    Ok(())
}

fn handle_set(field: &str, value: &str) -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;
    let field = field.parse::<Field>()?;
    let derived_before = session.report().present.clone();

    session.set_field(field, value)?;

    println!("{} = {}", field.label(), session.report().get_field(field));
    if field.feeds_derivation() && session.report().present != derived_before {
        println!(
            "{} = {} (auto-calculated)",
            Field::Present.label(),
            session.report().present
        );
    }

    Ok(())
}

fn handle_submit() -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;
    let submitter = build_submitter(&config);

    println!("Sending...");
    let result = session.submit(&submitter);

    if let Some(notice) = session.notice() {
        println!("{notice}");
    }

    match result {
        Ok(receipt) => {
            println!("- timestamp: {}", receipt.timestamp);
            if let Some(status) = receipt.status {
                println!("- http status: {status}");
            }
            println!("- delivery is not confirmed by the sheet; check the spreadsheet if in doubt");
            Ok(())
        }
        Err(error) => Err(error).context("Report was not submitted"),
    }
}

fn handle_copy() -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    let copied = session.copy_summary();
    if let Some(notice) = session.notice() {
        println!("{notice}");
    }

    if !copied {
        println!("{}", summary::build_summary(session.report()));
    }

    Ok(())
}

fn handle_export(dir: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config()?;
    let session = open_session(&config)?;
    let export_dir = dir.unwrap_or_else(|| config.report_dir.clone());

    let saved = export::save_export(session.report(), &export_dir)?;

    println!("Report exported: {}", session.report().date);
    println!("- Markdown: {}", saved.markdown_path.display());
    println!("- JSON: {}", saved.json_path.display());

    Ok(())
}

fn handle_clear() -> Result<()> {
    let config = load_or_default_config()?;
    let drafts = DraftStore::new(&config.draft_path);
    drafts.clear()?;

    println!("Draft cleared: {}", drafts.path().display());
    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = load_or_default_config()?;

    match config.resolve_webhook_url() {
        Some(url) => match parse_webhook_url(&url) {
            Ok(_) => println!("[OK] webhook URL configured"),
            Err(error) => {
                println!("[WARN] webhook URL invalid: {error}");
                issues.push("webhook url invalid".to_string());
            }
        },
        None => {
            println!(
                "[WARN] webhook URL not set. Run `dailyreport config set webhook.url <URL>` or set {WEBHOOK_ENV}"
            );
            issues.push("webhook url missing".to_string());
        }
    }

    let drafts = DraftStore::new(&config.draft_path);
    if !config.draft_path.exists() {
        println!("[OK] no draft yet: {}", config.draft_path.display());
    } else if drafts.load().is_some() {
        println!("[OK] draft readable: {}", config.draft_path.display());
    } else {
        println!(
            "[WARN] draft unreadable, a fresh report will replace it: {}",
            config.draft_path.display()
        );
        issues.push("draft malformed".to_string());
    }

    match summary::clipboard_available() {
        Some(program) => println!("[OK] clipboard command available: {program}"),
        None => {
            println!("[WARN] no clipboard command found (pbcopy, wl-copy, xclip, xsel, clip)");
            issues.push("clipboard missing".to_string());
        }
    }

    if config.verify_status {
        println!("[OK] webhook HTTP status is checked on submit");
    } else {
        println!("[OK] fire-and-forget submission (webhook status not checked)");
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

fn open_session(config: &Config) -> Result<FormSession> {
    let drafts = DraftStore::new(&config.draft_path);
    let session = FormSession::open(drafts, config.notice_duration())
        .with_context(|| format!("Failed to open draft: {}", config.draft_path.display()))?;

    Ok(session.clear_after_submit(config.clear_after_submit))
}

fn build_submitter(config: &Config) -> Submitter<HttpTransport> {
    Submitter::new(
        config.resolve_webhook_url(),
        HttpTransport::new(config.submit_timeout()),
    )
    .verify_status(config.verify_status)
}

fn load_or_default_config() -> Result<Config> {
    if Config::config_path()?.exists() {
        return Config::load();
    }

    let config = Config::default();
    config.save()?;
    Ok(config)
}
