use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Where the login form sends the user once the authenticator accepts them.
pub const POST_LOGIN_PATH: &str = "/dashboard";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credential available")]
    MissingCredential,
    #[error("credential is empty")]
    EmptyCredential,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store error: {0}")]
    Store(#[from] std::io::Error),
    #[error("authentication backend error: {0}")]
    Backend(String),
}

/// Bearer credential threaded explicitly into every authenticated request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    token: String,
}

impl AuthContext {
    pub fn bearer(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(AuthError::EmptyCredential);
        }
        Ok(Self { token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Persistent source of the bearer credential issued by the login flow.
pub trait CredentialStore: Send + Sync {
    /// Read the current credential. Implementations must not cache: a
    /// credential replaced between two calls is observed by the second.
    fn load(&self) -> Result<Option<AuthContext>, AuthError>;
    fn store(&self, context: &AuthContext) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Keeps the token in a single file, read on every `load`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<AuthContext>, AuthError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored credential");
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        match AuthContext::bearer(contents) {
            Ok(context) => Ok(Some(context)),
            Err(AuthError::EmptyCredential) => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn store(&self, context: &AuthContext) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = open_private(&self.path)?;
        file.write_all(context.token().as_bytes())?;
        debug!(path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// Open `path` for writing, readable by the owner only on unix. An existing
/// file is narrowed to 0600 before anything is written to it.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::File::create(path)
}

/// Resolve the credential for one call: an explicit token wins over the store.
pub fn resolve_credential(
    explicit: Option<&str>,
    store: &dyn CredentialStore,
) -> Result<AuthContext, AuthError> {
    if let Some(token) = explicit.filter(|token| !token.trim().is_empty()) {
        return AuthContext::bearer(token);
    }
    store.load()?.ok_or(AuthError::MissingCredential)
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session issued by an authentication backend.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub context: AuthContext,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub redirect_to: String,
    pub session: Option<AuthSession>,
}

/// Contract point for credential validation and session issuance.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError>;
}

/// Stand-in used until a real authentication backend is wired in: it never
/// validates anything and always forwards to the dashboard without a session.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderAuthenticator;

#[async_trait]
impl Authenticator for PlaceholderAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginOutcome, AuthError> {
        info!(email = %credentials.email, "login submitted to placeholder authenticator");
        Ok(LoginOutcome {
            redirect_to: POST_LOGIN_PATH.to_string(),
            session: None,
        })
    }
}

/// The two controlled fields of the login page.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    credentials: Credentials,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    pub fn password(&self) -> &str {
        &self.credentials.password
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.credentials.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = password.into();
    }

    pub async fn submit(&self, authenticator: &dyn Authenticator) -> Result<LoginOutcome, AuthError> {
        authenticator.authenticate(&self.credentials).await
    }
}

impl From<Credentials> for LoginForm {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}
