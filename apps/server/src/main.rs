use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use livestream_auth::{AuthContext, CredentialStore};
use livestream_config::{load as load_config, AppConfig};
use livestream_gateway::{serve, GatewayState};
use livestream_media::{extract_key_from_url, S3Location};
use livestream_runtime::{certs, shutdown_signal, telemetry, AdminServices};
use livestream_settings::{SettingsPanel, SettingsUpdate, SyncOutcome};
use tracing::info;

mod console;

use console::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "livestream")]
#[command(about = "iNube LiveStream admin tooling (console by default)")]
struct Cli {
    /// Bearer token for admin API calls; falls back to the stored token
    #[arg(long, global = true, env = "LIVESTREAM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dev server
    Serve,
    /// Generate the self-signed certificate used for LAN HTTPS
    GenCert {
        /// Overwrite existing certificate files
        #[arg(long)]
        force: bool,
    },
    /// Read or change the platform settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Save or forget the admin API token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Print a time-limited download URL for a stored object
    Presign {
        key: String,
        /// Lifetime in seconds
        #[arg(long)]
        expires: Option<u64>,
    },
    /// Print the object key of a bucket URL
    ExtractKey { url: String },
    /// Start interactive admin console (default)
    Console,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Get,
    /// Change one field and save, e.g. `set securitySettings.sessionTimeout 45`
    Set { path: String, value: String },
}

#[derive(Subcommand)]
enum TokenAction {
    Set { token: String },
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let token = cli.token.as_deref();

    match cli.command.unwrap_or(Commands::Console) {
        Commands::Serve => run_server(config).await,
        Commands::GenCert { force } => gen_cert(&config, force),
        Commands::Settings { action } => run_settings(&config, token, action).await,
        Commands::Token { action } => run_token(&config, action),
        Commands::Presign { key, expires } => presign(&config, &key, expires),
        Commands::ExtractKey { url } => extract_key(&config, &url),
        Commands::Console => console::run(&config, token).await,
    }
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting LiveStream dev server");

    let state = GatewayState::new(config).context("failed to initialise dev server state")?;
    serve(state, shutdown_signal()).await
}

fn gen_cert(config: &AppConfig, force: bool) -> anyhow::Result<()> {
    let paths = certs::provision(&config.tls, &config.http.network_ip, force)
        .context("failed to provision certificates")?;

    if paths.generated {
        println!("Generated certificate for {}", paths.subject_alt_names.join(", "));
    } else {
        println!("Certificates already exist (use --force to regenerate)");
    }
    println!("  cert: {}", paths.cert_path.display());
    println!("  key:  {}", paths.key_path.display());
    Ok(())
}

async fn run_settings(
    config: &AppConfig,
    token: Option<&str>,
    action: SettingsAction,
) -> anyhow::Result<()> {
    let services = AdminServices::initialise(config).context("failed to initialise admin services")?;
    let panel = SettingsPanel::new((*services.settings_api).clone(), ConsoleNotifier);

    let auth = services.credential(token).context("no admin credential")?;
    expect_completed(panel.mount(&auth).await)?;

    match action {
        SettingsAction::Get => {
            println!("{}", serde_json::to_string_pretty(&panel.settings())?);
        }
        SettingsAction::Set { path, value } => {
            let update = SettingsUpdate::parse_path(&path, &value)?;
            panel.handle_change(update);

            // The credential is resolved again for the write.
            let auth = services.credential(token).context("no admin credential")?;
            expect_completed(panel.save_settings(&auth).await)?;
        }
    }

    Ok(())
}

fn expect_completed(outcome: SyncOutcome) -> anyhow::Result<()> {
    match outcome {
        SyncOutcome::Completed => Ok(()),
        SyncOutcome::Failed(error) => Err(error.into()),
        SyncOutcome::Skipped => bail!("settings panel was busy"),
        SyncOutcome::Cancelled => bail!("settings request was cancelled"),
    }
}

fn run_token(config: &AppConfig, action: TokenAction) -> anyhow::Result<()> {
    let services = AdminServices::initialise(config).context("failed to initialise admin services")?;
    let store = services.credentials.as_ref();

    match action {
        TokenAction::Set { token } => {
            let context = AuthContext::bearer(token)?;
            store.store(&context).context("failed to store token")?;
            println!("Token saved to {}", store.path().display());
        }
        TokenAction::Clear => {
            store.clear().context("failed to remove token")?;
            println!("Token removed");
        }
    }
    Ok(())
}

fn presign(config: &AppConfig, key: &str, expires: Option<u64>) -> anyhow::Result<()> {
    let services = AdminServices::initialise(config).context("failed to initialise admin services")?;
    let presigner = services.presigner()?;

    let url = presigner.presign_get(key, expires.map(Duration::from_secs))?;
    println!("{url}");
    Ok(())
}

fn extract_key(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let Some(bucket) = config.storage.bucket.as_deref().filter(|bucket| !bucket.is_empty()) else {
        bail!("storage.bucket is not configured");
    };
    let location = S3Location::new(bucket, config.storage.region.as_str());

    match extract_key_from_url(url, &location) {
        Some(key) => println!("{key}"),
        None => println!("URL does not point into s3://{}", location.bucket),
    }
    Ok(())
}
