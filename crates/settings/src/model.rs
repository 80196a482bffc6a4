use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform-wide parameters managed from the admin panel.
///
/// Field names follow the camelCase wire format of `/api/admin/settings`.
/// Keys the server sends that are not modelled here are carried through
/// untouched so a save never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub streaming_quality: StreamingQuality,
    /// Minutes.
    pub max_stream_duration: u32,
    pub auto_close_inactive_streams: bool,
    /// Seconds.
    pub location_tracking_interval: u32,
    /// Days.
    pub retention_period: u32,
    pub max_participants_per_stream: u32,
    pub notification_settings: NotificationSettings,
    pub security_settings: SecuritySettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email: bool,
    pub in_app: bool,
    pub sms: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub two_factor_auth: bool,
    /// Days.
    pub password_expiry: u32,
    /// Minutes.
    pub session_timeout: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamingQuality {
    SD,
    HD,
    FHD,
}

impl StreamingQuality {
    pub const ALL: [StreamingQuality; 3] = [Self::SD, Self::HD, Self::FHD];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SD => "SD",
            Self::HD => "HD",
            Self::FHD => "FHD",
        }
    }

    /// Label shown next to the option in the admin panel.
    pub fn label(self) -> &'static str {
        match self {
            Self::SD => "Standard Definition (480p)",
            Self::HD => "High Definition (720p)",
            Self::FHD => "Full HD (1080p)",
        }
    }
}

impl fmt::Display for StreamingQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamingQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SD" => Ok(Self::SD),
            "HD" => Ok(Self::HD),
            "FHD" => Ok(Self::FHD),
            other => Err(format!("unknown streaming quality `{other}`")),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            streaming_quality: StreamingQuality::HD,
            max_stream_duration: 120,
            auto_close_inactive_streams: true,
            location_tracking_interval: 30,
            retention_period: 30,
            max_participants_per_stream: 5,
            notification_settings: NotificationSettings::default(),
            security_settings: SecuritySettings::default(),
            extra: Map::new(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            in_app: true,
            sms: false,
        }
    }
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_auth: true,
            password_expiry: 90,
            session_timeout: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_panel_prefill() {
        let settings = Settings::default();

        assert_eq!(settings.streaming_quality, StreamingQuality::HD);
        assert_eq!(settings.max_stream_duration, 120);
        assert!(settings.auto_close_inactive_streams);
        assert_eq!(settings.location_tracking_interval, 30);
        assert_eq!(settings.retention_period, 30);
        assert_eq!(settings.max_participants_per_stream, 5);
        assert!(settings.security_settings.two_factor_auth);
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let value = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(value["streamingQuality"], "HD");
        assert_eq!(value["maxStreamDuration"], 120);
        assert_eq!(value["notificationSettings"]["inApp"], true);
        assert_eq!(value["securitySettings"]["twoFactorAuth"], true);
        assert_eq!(value["securitySettings"]["passwordExpiry"], 90);
    }

    #[test]
    fn unknown_server_fields_survive_a_round_trip() {
        let mut body = serde_json::to_value(Settings::default()).unwrap();
        body["recordingBucket"] = json!("inube-recordings");

        let settings: Settings = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(settings.extra["recordingBucket"], "inube-recordings");
        assert_eq!(serde_json::to_value(&settings).unwrap(), body);
    }

    #[test]
    fn negative_durations_are_rejected() {
        let mut body = serde_json::to_value(Settings::default()).unwrap();
        body["maxStreamDuration"] = json!(-5);

        assert!(serde_json::from_value::<Settings>(body).is_err());
    }

    #[test]
    fn streaming_quality_parses_case_insensitively() {
        assert_eq!("fhd".parse::<StreamingQuality>(), Ok(StreamingQuality::FHD));
        assert_eq!(" SD ".parse::<StreamingQuality>(), Ok(StreamingQuality::SD));
        assert!("4K".parse::<StreamingQuality>().is_err());
        assert_eq!(StreamingQuality::HD.to_string(), "HD");
    }
}
