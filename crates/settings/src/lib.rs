//! # LiveStream admin settings
//!
//! The settings record edited from the admin panel, the REST client for
//! `/api/admin/settings`, and the panel state machine that keeps the two in
//! sync: fetch once on mount, apply typed single-field edits locally, and
//! write the whole record back on an explicit save.

pub mod client;
pub mod error;
pub mod model;
pub mod notify;
pub mod panel;
pub mod update;

pub use client::{HttpSettingsClient, SettingsApi, SETTINGS_PATH};
pub use error::{SettingsError, SettingsResult};
pub use model::{NotificationSettings, SecuritySettings, Settings, StreamingQuality};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use panel::{PanelPhase, SettingsPanel, SyncOutcome};
pub use update::{NotificationField, SecurityField, SettingsUpdate, TopLevelField};
