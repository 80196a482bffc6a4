//! Interactive admin console driving a [`SettingsPanel`].

use anyhow::Context;
use livestream_config::AppConfig;
use livestream_runtime::AdminServices;
use livestream_settings::{
    Notification, NotificationLevel, Notifier, SettingsError, SettingsPanel, SettingsUpdate,
    StreamingQuality, SyncOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Prints panel notifications the way a toast would show them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => println!("[ok] {}", notification.message),
            NotificationLevel::Error => eprintln!("[error] {}", notification.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    Help,
    Show,
    Reload,
    Set { path: String, value: String },
    Save,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    /// `None` for blank lines.
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "/help" | "/h" => Self::Help,
            "/show" | "/s" => Self::Show,
            "/reload" | "/r" => Self::Reload,
            "/save" => Self::Save,
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/set" => match (words.next(), words.next()) {
                (Some(path), Some(value)) => Self::Set {
                    path: path.to_string(),
                    value: value.to_string(),
                },
                _ => Self::Unknown(line.trim().to_string()),
            },
            _ => Self::Unknown(line.trim().to_string()),
        };
        Some(command)
    }
}

pub async fn run(config: &AppConfig, token: Option<&str>) -> anyhow::Result<()> {
    info!("starting interactive console");

    let services = AdminServices::initialise(config).context("failed to initialise admin services")?;
    let panel = SettingsPanel::new((*services.settings_api).clone(), ConsoleNotifier);

    println!("LiveStream Admin Console");
    println!("Type '/help' for commands, '/quit' to exit");
    println!("---");

    match services.credential(token) {
        Ok(auth) => report(panel.mount(&auth).await),
        Err(error) => {
            warn!(%error, "no admin credential, showing defaults");
            println!("No admin credential; showing defaults. Use --token or `livestream token set`.");
            report(panel.fail_fetch(SettingsError::FetchFailed(error.to_string())));
        }
    }
    print_settings(&panel);

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let Some(command) = ConsoleCommand::parse(&line) else {
            continue;
        };

        match command {
            ConsoleCommand::Quit => {
                println!("Goodbye!");
                break;
            }
            ConsoleCommand::Help => print_help(),
            ConsoleCommand::Show => print_settings(&panel),
            ConsoleCommand::Reload => match services.credential(token) {
                Ok(auth) => report(panel.fetch_settings(&auth).await),
                Err(error) => println!("Cannot reload: {error}"),
            },
            ConsoleCommand::Set { path, value } => match SettingsUpdate::parse_path(&path, &value) {
                Ok(update) => {
                    panel.handle_change(update);
                    println!("{} updated (not saved yet)", update.path());
                }
                Err(error) => println!("{error}"),
            },
            ConsoleCommand::Save => {
                if !panel.can_save() {
                    println!("Nothing to save while the panel is {:?}", panel.phase());
                    continue;
                }
                match services.credential(token) {
                    Ok(auth) => report(panel.save_settings(&auth).await),
                    Err(error) => println!("Cannot save: {error}"),
                }
            }
            ConsoleCommand::Unknown(input) => {
                println!("Unknown command: {input}");
                println!("Type '/help' for available commands");
            }
        }
    }

    panel.close();
    Ok(())
}

fn report(outcome: SyncOutcome) {
    match outcome {
        SyncOutcome::Completed => {}
        SyncOutcome::Failed(error) => println!("  ({error})"),
        SyncOutcome::Skipped => println!("Request skipped: panel is busy"),
        SyncOutcome::Cancelled => println!("Request cancelled"),
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  /help, /h               - Show this help");
    println!("  /show, /s               - Show the current settings");
    println!("  /reload, /r             - Fetch the settings again");
    println!("  /set <field> <value>    - Change one field locally");
    println!("  /save                   - Send the settings to the server");
    println!("  /quit, /exit, /q        - Exit console");
    println!();
    println!("Fields: streamingQuality ({}), maxStreamDuration, autoCloseInactiveStreams,",
        StreamingQuality::ALL.map(StreamingQuality::as_str).join("|"));
    println!("  locationTrackingInterval, retentionPeriod, maxParticipantsPerStream,");
    println!("  notificationSettings.{{email,inApp,sms}},");
    println!("  securitySettings.{{twoFactorAuth,passwordExpiry,sessionTimeout}}");
}

fn print_settings<A, N>(panel: &SettingsPanel<A, N>)
where
    A: livestream_settings::SettingsApi,
    N: Notifier,
{
    let settings = panel.settings();
    let notifications = &settings.notification_settings;
    let security = &settings.security_settings;

    println!("Streaming");
    println!("  streamingQuality            {}", settings.streaming_quality.label());
    println!("  maxStreamDuration           {} min", settings.max_stream_duration);
    println!("  autoCloseInactiveStreams    {}", settings.auto_close_inactive_streams);
    println!("  maxParticipantsPerStream    {}", settings.max_participants_per_stream);
    println!("Tracking & retention");
    println!("  locationTrackingInterval    {} s", settings.location_tracking_interval);
    println!("  retentionPeriod             {} days", settings.retention_period);
    println!("Notifications");
    println!("  email                       {}", notifications.email);
    println!("  inApp                       {}", notifications.in_app);
    println!("  sms                         {}", notifications.sms);
    println!("Security");
    println!("  twoFactorAuth               {}", security.two_factor_auth);
    println!("  passwordExpiry              {} days", security.password_expiry);
    println!("  sessionTimeout              {} min", security.session_timeout);
}
