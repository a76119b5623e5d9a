pub mod cli;
pub mod config;
pub mod extract;
pub mod filter;
pub mod mbox;
pub mod message;
pub mod search;

use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub use cli::{Cli, ColorMode, Commands, OutputFormat, cli_parse};
pub use config::{MailfilterConfig, load_config};
pub use filter::{CompiledFilter, Expression, FilterError, evaluate};
pub use mbox::{MboxReader, RawMessage};
pub use message::Message;

/// Compile the filter given on the command line, if any
fn build_filter(
    filter_expr: Option<&str>,
    config: &MailfilterConfig,
) -> anyhow::Result<Option<CompiledFilter>> {
    let Some(text) = filter_expr else {
        return Ok(None);
    };

    let filter = CompiledFilter::with_aliases(text, &config.fields.aliases)
        .with_context(|| format!("Invalid filter expression '{text}'"))?;
    tracing::info!(filter = %filter, "compiled filter");
    Ok(Some(filter))
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr);
    if let Err(e) = subscriber.try_init() {
        eprintln!("Failed to init tracing subscriber: {e}");
    }
}

fn apply_color_mode(color_mode: ColorMode) {
    match color_mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose, cli.quiet);
    apply_color_mode(cli.color);

    let config = load_config(cli.config.as_deref()).context("Failed to load config")?;
    let format = cli.format.unwrap_or(config.output.format);
    if let Some(config_path) = &cli.config {
        tracing::info!(path = %config_path.display(), "loaded config");
    }

    match &cli.command {
        Commands::Count { file, filter, by } => {
            // A malformed filter must fail before the archive is touched
            let compiled = build_filter(filter.as_deref(), &config)?;
            let by = by.as_deref().map(|field| config.fields.resolve(field));

            let reader = mbox::open(file)?;
            let summary =
                search::count_matches(reader, compiled.as_ref(), &config.archive, by.as_deref())
                    .with_context(|| format!("Failed to scan archive '{}'", file.display()))?;
            tracing::info!(
                messages = summary.stats.messages,
                matches = summary.stats.matches,
                "scan finished"
            );

            match format {
                OutputFormat::Text => print!("{}", search::format_count_text(&summary)),
                OutputFormat::Json => println!(
                    "{}",
                    search::format_count_json(file, filter.as_deref(), &summary)
                ),
            }
        }
        Commands::Extract {
            file,
            filter,
            output,
        } => {
            let compiled = build_filter(filter.as_deref(), &config)?;
            let reader = mbox::open(file)?;

            let stats = match output {
                Some(path) => {
                    let out = File::create(path).with_context(|| {
                        format!("Failed to create output file '{}'", path.display())
                    })?;
                    let mut out = BufWriter::new(out);
                    extract::extract_matches(reader, compiled.as_ref(), &config.archive, &mut out)
                }
                None => {
                    let mut out = io::stdout().lock();
                    extract::extract_matches(reader, compiled.as_ref(), &config.archive, &mut out)
                }
            }
            .with_context(|| format!("Failed to extract from archive '{}'", file.display()))?;
            tracing::info!(
                messages = stats.messages,
                matches = stats.matches,
                "extraction finished"
            );

            match format {
                OutputFormat::Text => {
                    if !cli.quiet {
                        eprint!("{}", extract::format_extract_text(&stats, output.as_deref()));
                    }
                }
                OutputFormat::Json => {
                    let summary = extract::format_extract_json(
                        file,
                        filter.as_deref(),
                        &stats,
                        output.as_deref(),
                    );
                    // Messages already went to stdout, keep the summary apart
                    if output.is_some() {
                        println!("{summary}");
                    } else {
                        eprintln!("{summary}");
                    }
                }
            }
        }
    }

    io::stdout().flush().context("Failed to flush stdout")?;
    Ok(())
}
