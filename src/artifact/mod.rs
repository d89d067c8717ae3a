//! Firmware artifact handling
//!
//! Names the produced binary after the resolved board, firmware version and
//! language, moves it to the output directory and checks it against the
//! board's size budget.

mod naming;
mod size;

pub use naming::{read_firmware_version, ArtifactName};
pub use size::SizeCheck;

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Move `from` to `to`, falling back to copy + remove across filesystems.
///
/// Returns the size of the installed file.
pub fn install_artifact(from: &Path, to: &Path) -> io::Result<u64> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_err() {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(fs::metadata(to)?.len())
}

/// Hex SHA-256 of a file's contents
pub fn compute_sha256(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
