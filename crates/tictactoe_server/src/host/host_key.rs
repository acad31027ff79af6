//! Host key loading and first-run generation.

use std::path::Path;

use rand_core::OsRng;
use russh::keys::PrivateKey;
use russh::keys::ssh_key::{Algorithm, LineEnding};
use tracing::{info, instrument, warn};

use crate::HostError;

/// Loads the host key at `path`, generating an Ed25519 key there if
/// the file does not exist.
#[instrument(skip(path), fields(key_path = %path.display()))]
pub fn load_or_create_host_key(path: &Path) -> Result<PrivateKey, HostError> {
    if path.exists() {
        info!("Loading host key");
        return Ok(russh::keys::load_secret_key(path, None)?);
    }

    warn!("Host key not found, generating a new Ed25519 key");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)?;
    let encoded = key.to_openssh(LineEnding::LF)?;
    std::fs::write(path, encoded.as_bytes())?;
    restrict_permissions(path)?;

    info!("Host key written");
    Ok(key)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
