//! `VBoxManage` discovery and raw-to-VDI conversion.
//!
//! The conversion utility is an external collaborator: it is located up
//! front (so a missing install fails before any download) and invoked only
//! after the pipeline reports the artifact trusted. Nothing about its output
//! is verified here.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("VBoxManage not found; VirtualBox must be installed")]
    VboxManageNotFound,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("VBoxManage exited with {0}")]
    Failed(ExitStatus),
}

/// Locate the `VBoxManage` executable on PATH; on Windows also try the
/// default VirtualBox install directory.
pub fn find_vboxmanage() -> Result<PathBuf, ConvertError> {
    if let Ok(path) = which::which("VBoxManage") {
        return Ok(path);
    }
    #[cfg(windows)]
    {
        if let Ok(path) = which::which("VBoxManage.exe") {
            return Ok(path);
        }
        let default = PathBuf::from(r"C:\Program Files\Oracle\VirtualBox\VBoxManage.exe");
        if default.exists() {
            return Ok(default);
        }
    }
    Err(ConvertError::VboxManageNotFound)
}

/// Run `VBoxManage convertdd <raw> <vdi> --format VDI`, inheriting stdio so
/// the utility's own progress output stays visible.
pub async fn convert_to_vdi(
    vboxmanage: &Path,
    raw_image: &Path,
    vdi_image: &Path,
) -> Result<(), ConvertError> {
    let status = Command::new(vboxmanage)
        .arg("convertdd")
        .arg(raw_image)
        .arg(vdi_image)
        .args(["--format", "VDI"])
        .status()
        .await
        .map_err(|source| ConvertError::Spawn {
            program: vboxmanage.display().to_string(),
            source,
        })?;

    if !status.success() {
        return Err(ConvertError::Failed(status));
    }
    Ok(())
}
