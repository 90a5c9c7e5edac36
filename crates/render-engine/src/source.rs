//! Uploaded assets and container sniffing.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use clipmix_common::error::{ClipmixError, ClipmixResult};

/// One uploaded asset, in upload order.
#[derive(Debug, Clone)]
pub enum ClipSource {
    /// A file already on disk.
    Path(PathBuf),

    /// Raw bytes received from the host (e.g. a browser upload).
    Upload { name: String, bytes: Vec<u8> },
}

impl ClipSource {
    pub fn upload(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Human-readable label for messages.
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Upload { name, .. } => name.clone(),
        }
    }

    /// Reject anything that is not an MP4 (ISO-BMFF) container.
    pub fn ensure_mp4(&self) -> ClipmixResult<()> {
        let is_mp4 = match self {
            Self::Path(path) => {
                if !path.exists() {
                    return Err(ClipmixError::FileNotFound { path: path.clone() });
                }
                file_is_mp4(path)?
            }
            Self::Upload { bytes, .. } => is_mp4_header(bytes),
        };

        if is_mp4 {
            Ok(())
        } else {
            Err(ClipmixError::decode(format!(
                "{} is not an MP4 file",
                self.label()
            )))
        }
    }
}

/// Whether `header` starts with an ISO-BMFF `ftyp` box.
pub fn is_mp4_header(header: &[u8]) -> bool {
    header.len() >= 12 && &header[4..8] == b"ftyp"
}

fn file_is_mp4(path: &Path) -> ClipmixResult<bool> {
    let mut header = [0u8; 12];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < header.len() {
        let read = file.read(&mut header[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(is_mp4_header(&header[..filled]))
}
