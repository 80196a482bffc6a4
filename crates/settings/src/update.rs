//! Typed single-field edits to a [`Settings`] record.

use crate::error::SettingsError;
use crate::model::{Settings, StreamingQuality};

pub const NOTIFICATION_SECTION: &str = "notificationSettings";
pub const SECURITY_SECTION: &str = "securitySettings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelField {
    StreamingQuality(StreamingQuality),
    MaxStreamDuration(u32),
    AutoCloseInactiveStreams(bool),
    LocationTrackingInterval(u32),
    RetentionPeriod(u32),
    MaxParticipantsPerStream(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationField {
    Email(bool),
    InApp(bool),
    Sms(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityField {
    TwoFactorAuth(bool),
    PasswordExpiry(u32),
    SessionTimeout(u32),
}

/// One leaf edit: either a top-level field or a field of a nested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsUpdate {
    TopLevel(TopLevelField),
    Notification(NotificationField),
    Security(SecurityField),
}

impl From<TopLevelField> for SettingsUpdate {
    fn from(field: TopLevelField) -> Self {
        Self::TopLevel(field)
    }
}

impl From<NotificationField> for SettingsUpdate {
    fn from(field: NotificationField) -> Self {
        Self::Notification(field)
    }
}

impl From<SecurityField> for SettingsUpdate {
    fn from(field: SecurityField) -> Self {
        Self::Security(field)
    }
}

impl Settings {
    /// Copy of `self` with exactly the leaf named by `update` replaced.
    pub fn apply(&self, update: SettingsUpdate) -> Settings {
        let mut next = self.clone();

        match update {
            SettingsUpdate::TopLevel(field) => match field {
                TopLevelField::StreamingQuality(value) => next.streaming_quality = value,
                TopLevelField::MaxStreamDuration(value) => next.max_stream_duration = value,
                TopLevelField::AutoCloseInactiveStreams(value) => {
                    next.auto_close_inactive_streams = value
                }
                TopLevelField::LocationTrackingInterval(value) => {
                    next.location_tracking_interval = value
                }
                TopLevelField::RetentionPeriod(value) => next.retention_period = value,
                TopLevelField::MaxParticipantsPerStream(value) => {
                    next.max_participants_per_stream = value
                }
            },
            SettingsUpdate::Notification(field) => {
                let section = &mut next.notification_settings;
                match field {
                    NotificationField::Email(value) => section.email = value,
                    NotificationField::InApp(value) => section.in_app = value,
                    NotificationField::Sms(value) => section.sms = value,
                }
            }
            SettingsUpdate::Security(field) => {
                let section = &mut next.security_settings;
                match field {
                    SecurityField::TwoFactorAuth(value) => section.two_factor_auth = value,
                    SecurityField::PasswordExpiry(value) => section.password_expiry = value,
                    SecurityField::SessionTimeout(value) => section.session_timeout = value,
                }
            }
        }

        next
    }
}

impl SettingsUpdate {
    /// Build an update from the `(section, key, value)` triple used by text
    /// front ends. `section` is `None` or empty for top-level fields.
    ///
    /// ```
    /// use livestream_settings::{SecurityField, SettingsUpdate};
    ///
    /// let update = SettingsUpdate::parse(Some("securitySettings"), "twoFactorAuth", "false").unwrap();
    /// assert_eq!(update, SettingsUpdate::Security(SecurityField::TwoFactorAuth(false)));
    /// ```
    pub fn parse(section: Option<&str>, key: &str, raw: &str) -> Result<Self, SettingsError> {
        let section = section.map(str::trim).filter(|s| !s.is_empty());

        let update = match (section, key.trim()) {
            (None, "streamingQuality") => TopLevelField::StreamingQuality(
                raw.parse().map_err(SettingsError::InvalidUpdate)?,
            )
            .into(),
            (None, "maxStreamDuration") => {
                TopLevelField::MaxStreamDuration(parse_count(key, raw)?).into()
            }
            (None, "autoCloseInactiveStreams") => {
                TopLevelField::AutoCloseInactiveStreams(parse_flag(key, raw)?).into()
            }
            (None, "locationTrackingInterval") => {
                TopLevelField::LocationTrackingInterval(parse_count(key, raw)?).into()
            }
            (None, "retentionPeriod") => TopLevelField::RetentionPeriod(parse_count(key, raw)?).into(),
            (None, "maxParticipantsPerStream") => {
                TopLevelField::MaxParticipantsPerStream(parse_count(key, raw)?).into()
            }
            (Some(NOTIFICATION_SECTION), "email") => {
                NotificationField::Email(parse_flag(key, raw)?).into()
            }
            (Some(NOTIFICATION_SECTION), "inApp") => {
                NotificationField::InApp(parse_flag(key, raw)?).into()
            }
            (Some(NOTIFICATION_SECTION), "sms") => NotificationField::Sms(parse_flag(key, raw)?).into(),
            (Some(SECURITY_SECTION), "twoFactorAuth") => {
                SecurityField::TwoFactorAuth(parse_flag(key, raw)?).into()
            }
            (Some(SECURITY_SECTION), "passwordExpiry") => {
                SecurityField::PasswordExpiry(parse_count(key, raw)?).into()
            }
            (Some(SECURITY_SECTION), "sessionTimeout") => {
                SecurityField::SessionTimeout(parse_count(key, raw)?).into()
            }
            (Some(section), key) => {
                return Err(SettingsError::InvalidUpdate(format!(
                    "unknown field `{section}.{key}`"
                )))
            }
            (None, key) => {
                return Err(SettingsError::InvalidUpdate(format!("unknown field `{key}`")))
            }
        };

        Ok(update)
    }

    /// Parse a dotted path such as `securitySettings.sessionTimeout`.
    pub fn parse_path(path: &str, raw: &str) -> Result<Self, SettingsError> {
        match path.split_once('.') {
            Some((section, key)) => Self::parse(Some(section), key, raw),
            None => Self::parse(None, path, raw),
        }
    }

    /// Dotted path of the field this update touches.
    pub fn path(&self) -> &'static str {
        match self {
            Self::TopLevel(field) => match field {
                TopLevelField::StreamingQuality(_) => "streamingQuality",
                TopLevelField::MaxStreamDuration(_) => "maxStreamDuration",
                TopLevelField::AutoCloseInactiveStreams(_) => "autoCloseInactiveStreams",
                TopLevelField::LocationTrackingInterval(_) => "locationTrackingInterval",
                TopLevelField::RetentionPeriod(_) => "retentionPeriod",
                TopLevelField::MaxParticipantsPerStream(_) => "maxParticipantsPerStream",
            },
            Self::Notification(field) => match field {
                NotificationField::Email(_) => "notificationSettings.email",
                NotificationField::InApp(_) => "notificationSettings.inApp",
                NotificationField::Sms(_) => "notificationSettings.sms",
            },
            Self::Security(field) => match field {
                SecurityField::TwoFactorAuth(_) => "securitySettings.twoFactorAuth",
                SecurityField::PasswordExpiry(_) => "securitySettings.passwordExpiry",
                SecurityField::SessionTimeout(_) => "securitySettings.sessionTimeout",
            },
        }
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(SettingsError::InvalidUpdate(format!(
            "`{key}` expects true or false, got `{other}`"
        ))),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<u32, SettingsError> {
    raw.trim().parse::<u32>().map_err(|_| {
        SettingsError::InvalidUpdate(format!(
            "`{key}` expects a non-negative integer, got `{}`",
            raw.trim()
        ))
    })
}
