//! Statistics about the harvested input corpus

use std::path::Path;

/// Size of the `.html` corpus fed to the converters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputStats {
    /// Number of `.html` files
    pub file_count: u64,

    /// Combined size of those files in bytes
    pub total_bytes: u64,
}

impl InputStats {
    /// Scans the top level of `dir` for `.html` files
    ///
    /// Subdirectories and files with other extensions are ignored.
    ///
    /// # Returns
    ///
    /// * `Ok(InputStats)` - Counts for the directory
    /// * `Err(std::io::Error)` - The directory or a file's metadata could not be read
    pub async fn collect(dir: &Path) -> std::io::Result<Self> {
        let mut stats = Self::default();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_html_file(&path) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                stats.file_count += 1;
                stats.total_bytes += metadata.len();
            }
        }

        Ok(stats)
    }

    /// Total size in mebibytes
    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Whether `path` names an `.html` file
pub fn is_html_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("html")
}
