//! Self-signed certificates for serving the dev site over HTTPS on the LAN.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use livestream_config::TlsConfig;
use rcgen::{generate_simple_self_signed, CertifiedKey};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CertError {
    #[error("failed to generate certificate: {0}")]
    Generate(#[from] rcgen::Error),

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub subject_alt_names: Vec<String>,
    /// `false` when existing files were kept.
    pub generated: bool,
}

/// Ensure a certificate/key pair exists at the configured paths.
///
/// Both files are regenerated when either is missing or `force` is set.
pub fn provision(
    tls: &TlsConfig,
    network_ip: &str,
    force: bool,
) -> Result<CertificatePaths, CertError> {
    let subject_alt_names = tls.resolved_subject_alt_names(network_ip);
    let mut paths = CertificatePaths {
        cert_path: tls.cert_path.clone(),
        key_path: tls.key_path.clone(),
        subject_alt_names,
        generated: false,
    };

    if !force && paths.cert_path.exists() && paths.key_path.exists() {
        info!(
            cert = %paths.cert_path.display(),
            "certificates already exist, keeping them"
        );
        return Ok(paths);
    }

    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(paths.subject_alt_names.clone())?;

    write_pem(&paths.cert_path, &cert.pem())?;
    write_private_pem(&paths.key_path, &key_pair.serialize_pem())?;

    info!(
        cert = %paths.cert_path.display(),
        key = %paths.key_path.display(),
        names = ?paths.subject_alt_names,
        "generated self-signed certificate"
    );

    paths.generated = true;
    Ok(paths)
}

fn write_pem(path: &Path, contents: &str) -> Result<(), CertError> {
    create_parent(path)?;
    std::fs::write(path, contents).map_err(|source| CertError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// The key is created owner-only; an existing file is narrowed to 0600
/// before the new key is written into it.
fn write_private_pem(path: &Path, contents: &str) -> Result<(), CertError> {
    create_parent(path)?;
    open_private(path)
        .and_then(|mut file| file.write_all(contents.as_bytes()))
        .map_err(|source| CertError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn create_parent(path: &Path) -> Result<(), CertError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CertError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
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
fn open_private(path: &Path) -> io::Result<File> {
    File::create(path)
}
