//! AWS Signature Version 4 query-string signing for `GET` object requests.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use livestream_config::StorageConfig;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::error::{PresignError, PresignResult};
use crate::location::{S3Location, StorageCredentials};

pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(3600);
/// Longest lifetime S3 accepts for a SigV4 pre-signed URL (seven days).
pub const MAX_EXPIRY: Duration = Duration::from_secs(604_800);

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const TERMINATOR: &str = "aws4_request";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

type HmacSha256 = Hmac<Sha256>;

/// Issues time-limited download links for private objects.
#[derive(Debug, Clone)]
pub struct Presigner {
    location: S3Location,
    credentials: StorageCredentials,
    default_expiry: Duration,
}

impl Presigner {
    pub fn new(location: S3Location, credentials: StorageCredentials) -> Self {
        Self {
            location,
            credentials,
            default_expiry: DEFAULT_EXPIRY,
        }
    }

    pub fn with_default_expiry(mut self, expiry: Duration) -> Self {
        self.default_expiry = expiry;
        self
    }

    pub fn from_config(config: &StorageConfig) -> PresignResult<Self> {
        Self::try_from_config(config).map_err(|err| {
            error!(%err, "storage is not configured for pre-signing");
            err
        })
    }

    fn try_from_config(config: &StorageConfig) -> PresignResult<Self> {
        let bucket = config
            .bucket
            .as_deref()
            .map(str::trim)
            .filter(|bucket| !bucket.is_empty())
            .ok_or(PresignError::MissingBucket)?;

        let (access_key_id, secret_access_key) = match (
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
        ) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => (id, secret),
            _ => return Err(PresignError::MissingCredentials),
        };

        let mut credentials = StorageCredentials::new(access_key_id, secret_access_key);
        credentials.session_token = config
            .session_token
            .clone()
            .filter(|token| !token.is_empty());

        Ok(
            Self::new(S3Location::new(bucket, config.region.as_str()), credentials)
                .with_default_expiry(Duration::from_secs(config.default_expiry_seconds)),
        )
    }

    pub fn location(&self) -> &S3Location {
        &self.location
    }

    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    /// Signed `GET` URL for `key`, valid for `expires_in` (or the default
    /// expiry) from now.
    pub fn presign_get(&self, key: &str, expires_in: Option<Duration>) -> PresignResult<String> {
        self.presign_get_at(key, expires_in, Utc::now())
    }

    pub fn presign_get_at(
        &self,
        key: &str,
        expires_in: Option<Duration>,
        now: DateTime<Utc>,
    ) -> PresignResult<String> {
        let host = self.location.host();
        let request = PresignRequest {
            host: &host,
            region: &self.location.region,
            key,
            credentials: &self.credentials,
            expires_in: expires_in.unwrap_or(self.default_expiry),
            now,
        };

        presign(&request).map_err(|err| {
            error!(%err, key, "failed to generate pre-signed URL");
            err
        })
    }
}

struct PresignRequest<'a> {
    host: &'a str,
    region: &'a str,
    key: &'a str,
    credentials: &'a StorageCredentials,
    expires_in: Duration,
    now: DateTime<Utc>,
}

fn presign(request: &PresignRequest<'_>) -> PresignResult<String> {
    if request.key.is_empty() {
        return Err(PresignError::EmptyKey);
    }

    let seconds = request.expires_in.as_secs();
    if seconds == 0 || request.expires_in > MAX_EXPIRY {
        return Err(PresignError::ExpiryOutOfRange(seconds));
    }

    let amz_date = request.now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = request.now.format("%Y%m%d").to_string();
    let scope = format!("{date}/{}/{SERVICE}/{TERMINATOR}", request.region);
    let path = encode_path(request.key);

    let mut params = BTreeMap::new();
    params.insert("X-Amz-Algorithm", ALGORITHM.to_string());
    params.insert(
        "X-Amz-Credential",
        format!("{}/{scope}", request.credentials.access_key_id),
    );
    params.insert("X-Amz-Date", amz_date.clone());
    params.insert("X-Amz-Expires", seconds.to_string());
    if let Some(token) = &request.credentials.session_token {
        params.insert("X-Amz-Security-Token", token.clone());
    }
    params.insert("X-Amz-SignedHeaders", "host".to_string());

    let query = params
        .iter()
        .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_request = format!(
        "GET\n{path}\n{query}\nhost:{host}\n\nhost\n{UNSIGNED_PAYLOAD}",
        host = request.host
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(&request.credentials.secret_access_key, &date, request.region)?;
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

    debug!(host = request.host, key = request.key, expires = seconds, "signed object URL");

    Ok(format!(
        "https://{}{path}?{query}&X-Amz-Signature={signature}",
        request.host
    ))
}

/// Percent-encode every path segment, keeping `/` separators.
fn encode_path(key: &str) -> String {
    let segments = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>();
    format!("/{}", segments.join("/"))
}

fn signing_key(secret: &str, date: &str, region: &str) -> PresignResult<Vec<u8>> {
    let date_key = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let region_key = hmac(&date_key, region.as_bytes())?;
    let service_key = hmac(&region_key, SERVICE.as_bytes())?;
    hmac(&service_key, TERMINATOR.as_bytes())
}

fn hmac(key: &[u8], data: &[u8]) -> PresignResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| PresignError::SigningFailed(err.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
