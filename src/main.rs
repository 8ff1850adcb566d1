mod cli;

use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use applink_filter::{AppLinkRewriter, FilterConfig, RewriteContext, TextFilter};
use cli::Cli;

fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let context = build_context(&cli, &config)?;

    let text = read_input(&cli)?;
    let filtered = AppLinkRewriter::new().filter(&text, &context);

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(filtered.as_bytes())
        .context("failed to write filtered text")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<FilterConfig> {
    match &cli.config {
        Some(path) => FilterConfig::from_path(path),
        None => {
            let cwd = env::current_dir().context("failed to resolve current directory")?;
            Ok(FilterConfig::discover(&cwd))
        }
    }
}

fn build_context(cli: &Cli, config: &FilterConfig) -> Result<RewriteContext> {
    let mut context = config.to_context();

    if let Some(base_url) = &cli.base_url {
        context.base_url = base_url.clone();
    }
    if context.base_url.is_empty() {
        bail!("no site root configured: pass --base-url or set `wwwroot` in the settings file");
    }
    if let Some(scheme) = &cli.scheme {
        context = context.with_configured_scheme(scheme.as_str());
    }
    if let Some(username) = &cli.username {
        context = context.with_current_user(1, username.as_str());
    }

    debug!(
        base_url = %context.base_url,
        scheme = %context.configured_scheme,
        "filter context ready"
    );
    Ok(context.non_interactive(cli.non_interactive))
}

fn read_input(cli: &Cli) -> Result<String> {
    match cli.input.as_deref() {
        Some(path) if !cli.reads_stdin() => {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
