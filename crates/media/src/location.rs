use std::fmt;

use regex::Regex;
use tracing::debug;

/// A bucket in a specific region, addressed virtual-host style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub region: String,
}

impl S3Location {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    pub fn host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }
}

/// Access key pair used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl StorageCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Recover the object key from a virtual-host style URL of `location`.
///
/// Returns `None` for empty input, other hosts, other regions, or a URL
/// without a key. Query string and fragment are ignored.
pub fn extract_key_from_url(url: &str, location: &S3Location) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let pattern = format!(
        r"^https?://{}\.s3\.{}\.amazonaws\.com/([^?#]+)(?:[?#].*)?$",
        regex::escape(&location.bucket),
        regex::escape(&location.region),
    );
    let matcher = Regex::new(&pattern).ok()?;
    let raw_key = matcher.captures(url)?.get(1)?.as_str();

    if !escapes_are_well_formed(raw_key) {
        debug!(raw_key, "object key has a malformed percent escape");
        return None;
    }

    match urlencoding::decode(raw_key) {
        Ok(key) => Some(key.into_owned()),
        Err(err) => {
            debug!(%err, "object key is not valid UTF-8 after decoding");
            None
        }
    }
}

/// Every `%` must introduce two hex digits.
fn escapes_are_well_formed(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let well_formed = bytes
                .get(index + 1..index + 3)
                .is_some_and(|digits| digits.iter().all(u8::is_ascii_hexdigit));
            if !well_formed {
                return false;
            }
            index += 3;
        } else {
            index += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> S3Location {
        S3Location::new("inube-media", "ap-south-1")
    }

    #[test]
    fn host_is_virtual_hosted() {
        assert_eq!(location().host(), "inube-media.s3.ap-south-1.amazonaws.com");
    }

    #[test]
    fn extracts_plain_key() {
        let url = "https://inube-media.s3.ap-south-1.amazonaws.com/recordings/a.mp4";
        assert_eq!(
            extract_key_from_url(url, &location()).as_deref(),
            Some("recordings/a.mp4")
        );
    }

    #[test]
    fn extracts_key_from_presigned_url_and_decodes_it() {
        let url = "http://inube-media.s3.ap-south-1.amazonaws.com/streams/site%20visit.mp4?X-Amz-Expires=3600#t=5";
        assert_eq!(
            extract_key_from_url(url, &location()).as_deref(),
            Some("streams/site visit.mp4")
        );
    }

    #[test]
    fn malformed_escapes_are_not_keys() {
        let loc = S3Location::new("b", "r-1");
        assert_eq!(extract_key_from_url("https://b.s3.r-1.amazonaws.com/%ZZ", &loc), None);
        assert_eq!(extract_key_from_url("https://b.s3.r-1.amazonaws.com/clip%", &loc), None);
        assert_eq!(extract_key_from_url("https://b.s3.r-1.amazonaws.com/a%2", &loc), None);
        assert_eq!(
            extract_key_from_url("https://b.s3.r-1.amazonaws.com/100%25/x", &loc).as_deref(),
            Some("100%/x")
        );
    }

    #[test]
    fn rejects_other_buckets_and_regions() {
        let loc = location();
        assert_eq!(
            extract_key_from_url("https://other.s3.ap-south-1.amazonaws.com/a.mp4", &loc),
            None
        );
        assert_eq!(
            extract_key_from_url("https://inube-media.s3.us-east-1.amazonaws.com/a.mp4", &loc),
            None
        );
        assert_eq!(
            extract_key_from_url("https://xinube-media.s3.ap-south-1.amazonaws.com/a.mp4", &loc),
            None
        );
    }

    #[test]
    fn bucket_dots_are_literal() {
        let loc = S3Location::new("media.inube", "ap-south-1");
        assert_eq!(
            extract_key_from_url("https://mediaXinube.s3.ap-south-1.amazonaws.com/a.mp4", &loc),
            None
        );
        assert_eq!(
            extract_key_from_url("https://media.inube.s3.ap-south-1.amazonaws.com/a.mp4", &loc)
                .as_deref(),
            Some("a.mp4")
        );
    }

    #[test]
    fn malformed_input_is_absent() {
        let loc = location();
        assert_eq!(extract_key_from_url("", &loc), None);
        assert_eq!(extract_key_from_url("not a url", &loc), None);
        assert_eq!(
            extract_key_from_url("https://inube-media.s3.ap-south-1.amazonaws.com/", &loc),
            None
        );
        assert_eq!(
            extract_key_from_url("ftp://inube-media.s3.ap-south-1.amazonaws.com/a.mp4", &loc),
            None
        );
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = StorageCredentials::new("AKID", "top-secret").with_session_token("sess-xyz");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("sess-xyz"));
    }
}
