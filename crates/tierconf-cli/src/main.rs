// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tierconf_core::{ClientSettings, ConfigClient};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const ENV_LOG_LEVEL: &str = "TIERCONF_LOG_LEVEL";

/// Runs one configuration operation. Settings come from the `TIERCONF_*`
/// environment variables and may be overridden by flags. Without a remote
/// service the local store lives only as long as this process.
#[derive(Debug, Parser)]
#[command(name = "configctl", version)]
struct Cli {
    /// Consult the remote configuration service before the local store.
    #[arg(long, global = true)]
    remote: bool,

    /// Remote service address (`host:port` or URL).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Per-call remote deadline in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a value.
    Set { key: String, value: String },
    /// Read a value, printing the default when the key is unknown.
    Get {
        key: String,
        #[arg(long)]
        default: Option<String>,
    },
    /// Report whether a key exists.
    Has { key: String },
    /// Print every entry as JSON.
    All,
    /// Delete a key.
    Remove { key: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let settings = apply_flags(ClientSettings::from_os_env(), &cli);
    if let Err(err) = settings.validate() {
        error!("{err}");
        return ExitCode::from(2);
    }
    debug!(
        remote_enabled = settings.remote_enabled,
        endpoint = %settings.remote_endpoint,
        timeout = ?settings.remote_timeout,
        "starting configctl"
    );

    let client = ConfigClient::from_settings(&settings);
    let mut stdout = io::stdout().lock();
    match run(&client, &cli.command, &mut stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let log_level = env::var(ENV_LOG_LEVEL)
        .map(|val| val.to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = format!("h2=off,hyper=off,reqwest=off,rustls=off,{log_level}");
    let filter = EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("configctl: a global tracing subscriber is already installed");
    }
}

/// Layers command-line flags over environment-derived settings.
fn apply_flags(mut settings: ClientSettings, cli: &Cli) -> ClientSettings {
    if cli.remote {
        settings.remote_enabled = true;
    }
    if let Some(endpoint) = &cli.endpoint {
        settings.remote_endpoint = endpoint.clone();
    }
    if let Some(ms) = cli.timeout_ms.filter(|ms| *ms > 0) {
        settings.remote_timeout = Duration::from_millis(ms);
    }
    settings
}

/// Executes `command`, writing its result to `out`.
///
/// Returns `false` when the answer is negative (unknown key, nothing removed),
/// which the binary turns into exit status 1.
fn run(client: &ConfigClient, command: &Command, out: &mut impl Write) -> anyhow::Result<bool> {
    let positive = match command {
        Command::Set { key, value } => {
            let ok = client.set(key, value);
            writeln!(out, "{ok}")?;
            ok
        }
        Command::Get { key, default } => match client.get(key, default.as_deref()) {
            Some(value) => {
                writeln!(out, "{value}")?;
                true
            }
            None => false,
        },
        Command::Has { key } => {
            let found = client.has(key);
            writeln!(out, "{found}")?;
            found
        }
        Command::All => {
            let entries: BTreeMap<_, _> = client.all().into_iter().collect();
            let json =
                serde_json::to_string_pretty(&entries).context("failed to encode entries")?;
            writeln!(out, "{json}")?;
            true
        }
        Command::Remove { key } => {
            let removed = client.remove(key);
            writeln!(out, "{removed}")?;
            removed
        }
    };
    Ok(positive)
}
