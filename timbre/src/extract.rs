use crate::domain::AudioUrl;
use crate::ports::MediaExtractor;
use shared::{Error, Result};
use std::process::Command;
use tracing::debug;

/// `yt-dlp`-backed extractor.
///
/// Runs `yt-dlp -g -f bestaudio <url>` and returns the trimmed stdout, which
/// for that flag combination is the direct audio stream URL. The call blocks
/// for however long the tool takes; the resolver always runs it on the worker
/// pool.
pub struct YtDlpExtractor {
    binary: String,
}

impl YtDlpExtractor {
    pub const DEFAULT_BINARY: &str = "yt-dlp";

    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BINARY)
    }
}

impl MediaExtractor for YtDlpExtractor {
    fn extract(&self, url: &str) -> Result<AudioUrl> {
        debug!("running {} for: {}", self.binary, url);
        let output = Command::new(&self.binary)
            .args(["-g", "-f", "bestaudio"])
            .arg(url)
            .output()
            .map_err(|e| Error::ExtractionFailed(format!("failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExtractionFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| Error::ExtractionFailed(format!("{} produced non-UTF-8 output", self.binary)))?;
        Ok(stdout.trim().to_owned())
    }
}
