use clap::{Args, Subcommand};

use crate::cmd::prompt::{ask, display_value};
use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored and effective configuration.
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring support-desk.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!();

    ask(
        "Support API base URL (e.g., http://localhost:8000)",
        cfg.api_base_url.as_deref(),
    )?
    .apply(&mut cfg.api_base_url);
    ask("Request timeout in seconds", cfg.request_timeout_secs.as_deref())?
        .apply(&mut cfg.request_timeout_secs);
    ask(
        "Search debounce in milliseconds",
        cfg.search_debounce_ms.as_deref(),
    )?
    .apply(&mut cfg.search_debounce_ms);

    // Refuse to store values that would break every later command.
    AppConfig::resolve(&cfg, |_| None)?;
    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Stored API base URL: {}", display_value(cfg.api_base_url.as_deref()));
    println!(
        "Stored request timeout: {}",
        display_value(cfg.request_timeout_secs.as_deref())
    );
    println!(
        "Stored search debounce: {}",
        display_value(cfg.search_debounce_ms.as_deref())
    );

    let effective = AppConfig::load()?;
    println!();
    println!("Effective API base URL: {}", effective.api_base_url);
    println!(
        "Effective request timeout: {}s",
        effective.request_timeout.as_secs()
    );
    println!(
        "Effective search debounce: {}ms",
        effective.search_debounce.as_millis()
    );

    Ok(())
}
