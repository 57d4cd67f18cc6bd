use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use mockup_forge::config::Config;
use mockup_forge::constants::{MOCKUPS_PREFIX, PNG_CONTENT_TYPE};
use mockup_forge::handler;
use mockup_forge::logging::{self, LogFormat};
use mockup_forge::mockup::MockupService;
use mockup_forge::storage::{MockObjectStore, ObjectStore, S3ObjectStore};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Mockup Forge - composites customer logos onto the product mockup template
#[derive(Parser, Debug)]
#[command(name = "mockup-forge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format, overrides the configuration file
    #[arg(long)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single event through the pipeline and print the response envelope
    Generate {
        /// Event JSON file, or "-" to read stdin
        #[arg(long)]
        event: String,

        /// Use an in-memory store instead of S3
        #[arg(long)]
        dry_run: bool,

        /// Background image seeded into the in-memory store
        #[arg(long, requires = "dry_run")]
        background: Option<PathBuf>,

        /// Write the generated mockup to this file
        #[arg(long, requires = "dry_run")]
        output: Option<PathBuf>,
    },

    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    let log_format = args.log_format.unwrap_or(config.logging.format);
    logging::init_subscriber(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        config_file = %args
            .config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string()),
        bucket = %config.storage.bucket,
        region = %config.storage.region,
        background_key = %config.storage.background_key,
        url_expiration_secs = config.storage.url_expiration_secs,
        "Configuration loaded"
    );

    let config = Arc::new(config);

    match args.command {
        Command::Generate {
            event,
            dry_run,
            background,
            output,
        } => {
            let event = read_event(&event)?;

            if dry_run {
                let store = MockObjectStore::new();
                if let Some(path) = background {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    store.insert(
                        &config.storage.bucket,
                        &config.storage.background_key,
                        bytes,
                        PNG_CONTENT_TYPE,
                    );
                }

                let status = generate(config.clone(), Arc::new(store.clone()), event).await?;

                if let Some(path) = output {
                    write_mockup(&store, &config.storage.bucket, &path)?;
                }
                Ok(status)
            } else {
                let store = S3ObjectStore::from_config(&config.storage).await;
                generate(config, Arc::new(store), event).await
            }
        }
        Command::Serve => {
            let store = S3ObjectStore::from_config(&config.storage).await;
            let service = Arc::new(MockupService::new(config.clone(), Arc::new(store))?);
            mockup_forge::server::serve(service, &config.server)
                .await
                .context("Server failed")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_event(source: &str) -> anyhow::Result<serde_json::Value> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read event from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))?
    };

    serde_json::from_str(&raw).context("Event is not valid JSON")
}

async fn generate(
    config: Arc<Config>,
    store: Arc<dyn ObjectStore>,
    event: serde_json::Value,
) -> anyhow::Result<ExitCode> {
    let service = MockupService::new(config, store)?;
    let envelope = handler::handle_event(&service, event).await;

    println!("{}", serde_json::to_string_pretty(&envelope)?);

    Ok(if envelope.status_code == 200 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn write_mockup(store: &MockObjectStore, bucket: &str, path: &Path) -> anyhow::Result<()> {
    let prefix = format!("{}/", MOCKUPS_PREFIX);
    let Some(key) = store
        .written_keys()
        .into_iter()
        .rev()
        .find(|key| key.starts_with(&prefix))
    else {
        bail!("No mockup was generated");
    };

    let Some(object) = store.object(bucket, &key) else {
        bail!("Mockup {} missing from store", key);
    };

    std::fs::write(path, &object.body)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(key = %key, path = %path.display(), "Mockup written");
    Ok(())
}
