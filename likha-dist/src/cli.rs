///
/// This module implements the CLI interface for likha-dist: command parsing,
/// the async entrypoint and rendering of resolved download links and bucket listings.
///
/// All resolution logic (data model, storage contract, resolver, sessions) lives in the
/// [`likha-dist-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: use the installed `likha-dist` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`likha-dist-core`]: ../../likha-dist-core/
use crate::load_config::{load_config, CliConfig, KEY_ENV, URL_ENV};
use crate::storage::SupabaseStorage;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use likha_dist_core::inventory::{list_inventory, StoredObject};
use likha_dist_core::links::Resolution;
use likha_dist_core::session::LinkSession;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for likha-dist: resolve Likha APK download links.
#[derive(Parser)]
#[clap(
    name = "likha-dist",
    version,
    about = "Resolve Likha APK download links from Supabase Storage with static and release fallbacks"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve download links against storage, falling back to defaults
    Resolve {
        /// Path to the YAML config file (built-in catalog when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Write the result to this file instead of stdout
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Print the default links without contacting storage
    Defaults {
        /// Path to the YAML config file (built-in catalog when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// List every object in the bucket with its public URL
    Objects {
        /// Path to the YAML config file (only `storage` settings are used)
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Resolve {
            config,
            format,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            tracing::info!(command = "resolve", "Starting download link resolution");
            let resolution = resolve_with(config).await;
            tracing::info!(command = "resolve", status = ?resolution.status, "Resolution finished");
            let rendered = render(&resolution, format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write links to {}", path.display()))?;
                    tracing::info!(path = %path.display(), "Wrote download links");
                }
                None => print!("{rendered}"),
            }
            Ok(())
        }
        Commands::Defaults { config, format } => {
            let config = load_config(config.as_deref())?;
            let defaults = Resolution::pending(config.resolver.default_links());
            print!("{}", render(&defaults, format)?);
            Ok(())
        }
        Commands::Objects { config, format } => {
            let config = load_config(config.as_deref())?;
            let bucket = config.resolver.bucket.clone();
            let storage = storage_from(config)?;
            tracing::info!(command = "objects", bucket = %bucket, "Listing bucket objects");
            let objects = list_inventory(&storage, &bucket)
                .await
                .with_context(|| format!("Failed to list objects in bucket `{bucket}`"))?;
            print!("{}", render_inventory(&objects, format)?);
            Ok(())
        }
    }
}

/// Builds the storage client; unlike `resolve`, a missing credential is an error here.
fn storage_from(config: CliConfig) -> Result<SupabaseStorage> {
    let Some(creds) = config.credentials else {
        anyhow::bail!("{URL_ENV} and {KEY_ENV} must be set to list storage objects");
    };
    SupabaseStorage::new(&creds.url, creds.api_key, config.timeout)
        .map_err(|e| anyhow::anyhow!("Failed to set up storage client: {e}"))
}

/// Runs one session to completion; Ctrl-C cancels it and keeps the last snapshot.
async fn resolve_with(config: CliConfig) -> Resolution {
    let resolver = Arc::new(config.resolver);

    let storage = match config.credentials {
        Some(creds) => SupabaseStorage::new(&creds.url, creds.api_key, config.timeout),
        None => Err("storage credentials missing".into()),
    };
    let storage = match storage {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, "Cannot query storage, using default links");
            return Resolution::degraded(resolver.default_links());
        }
    };

    let mut session = LinkSession::start(resolver.clone(), Arc::new(storage));
    tokio::select! {
        res = session.settled() => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning resolution");
            let last = session.cancel();
            if last.status.is_terminal() {
                last
            } else {
                Resolution::degraded(last.links)
            }
        }
    }
}

/// Renders a resolution as pretty JSON or as one `name<TAB>url` line per asset.
pub fn render(resolution: &Resolution, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(resolution)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            writeln!(out, "status\t{:?}", resolution.status)?;
            if let Some(notice) = resolution.notice() {
                writeln!(out, "notice\t{notice}")?;
            }
            for (name, url) in resolution.links.iter() {
                writeln!(out, "{name}\t{url}")?;
            }
            Ok(out)
        }
    }
}

/// Renders the bucket inventory as a pretty JSON array or as `name<TAB>url` lines.
pub fn render_inventory(objects: &[StoredObject], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(objects)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for object in objects {
                writeln!(out, "{}\t{}", object.name, object.url)?;
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use likha_dist_core::config::ResolverConfig;

    #[test]
    fn text_output_lists_every_asset() {
        let res = Resolution::degraded(ResolverConfig::default().default_links());
        let text = render(&res, OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "status\tDegraded");
        assert_eq!(lines[1], "notice\tUsing fallback download links");
        assert_eq!(lines.len(), 6);
        assert!(lines.contains(&"kinder\t/downloads/likha-kinder.apk"));
    }

    #[test]
    fn json_output_is_machine_readable() {
        let res = Resolution::resolved(ResolverConfig::default().default_links());
        let json: serde_json::Value =
            serde_json::from_str(&render(&res, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["links"]["grade1"], "/downloads/likha-grade1.apk");
    }

    #[test]
    fn inventory_renders_one_line_per_object() {
        let objects = vec![
            StoredObject {
                name: "likha-grade1.apk".into(),
                url: "https://cdn.example/likha-grade1.apk".into(),
            },
            StoredObject {
                name: "likha-kinder.apk".into(),
                url: "https://cdn.example/likha-kinder.apk".into(),
            },
        ];

        let text = render_inventory(&objects, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "likha-grade1.apk\thttps://cdn.example/likha-grade1.apk\nlikha-kinder.apk\thttps://cdn.example/likha-kinder.apk\n"
        );

        let json: serde_json::Value =
            serde_json::from_str(&render_inventory(&objects, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[1]["name"], "likha-kinder.apk");
        assert_eq!(json[1]["url"], "https://cdn.example/likha-kinder.apk");
        assert_eq!(render_inventory(&[], OutputFormat::Json).unwrap(), "[]\n");
    }
}
