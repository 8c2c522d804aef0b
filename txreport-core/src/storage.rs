use crate::cache::{ReportCacheKey, ReportCacheValue};
use crate::report::ResponseEnvelope;
use crate::types::ExtractionStats;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Storage abstraction for caching extraction results
pub trait ReportStorage {
    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>>;
    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()>;
}

/// File-based storage implementation using local cache directory
pub struct FileStorage {
    cache_dir: String,
}

impl FileStorage {
    pub fn new(cache_dir: &str) -> Result<Self> {
        // Ensure cache directory exists
        fs::create_dir_all(format!("{cache_dir}/reports"))?;

        Ok(Self {
            cache_dir: cache_dir.to_string(),
        })
    }

    fn report_path(&self, cache_key: &ReportCacheKey) -> String {
        format!("{}/reports/{}.json", self.cache_dir, cache_key.to_cache_hash())
    }
}

impl ReportStorage for FileStorage {
    fn get_report(&self, cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>> {
        let path = self.report_path(cache_key);
        if Path::new(&path).exists() {
            let json_str = fs::read_to_string(path)?;
            let cache_value: ReportCacheValue = serde_json::from_str(&json_str)
                .map_err(|e| anyhow!("Failed to deserialize cached ReportCacheValue: {}", e))?;
            Ok(Some(cache_value))
        } else {
            Ok(None)
        }
    }

    fn store_report(&self, cache_key: &ReportCacheKey, cache_value: &ReportCacheValue) -> Result<()> {
        let path = self.report_path(cache_key);
        let json_str = serde_json::to_string_pretty(cache_value)
            .map_err(|e| anyhow!("Failed to serialize ReportCacheValue: {}", e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

/// No-op storage implementation that disables all caching
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl ReportStorage for NoOpStorage {
    fn get_report(&self, _cache_key: &ReportCacheKey) -> Result<Option<ReportCacheValue>> {
        Ok(None) // Always cache miss
    }

    fn store_report(&self, _cache_key: &ReportCacheKey, _cache_value: &ReportCacheValue) -> Result<()> {
        Ok(()) // No-op
    }
}

/// Hash of the full document bytes. Weekly reports share a template, so
/// sampling only the head and tail would collide.
pub fn calculate_document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Calculate hash for configuration data (for cache key)
pub fn calculate_config_hash<T: serde::Serialize>(config: &T) -> Result<String> {
    let config_json = serde_json::to_string(config)
        .map_err(|e| anyhow!("Failed to serialize config for hashing: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ===== RUN LOG =====
// One pretty-printed JSON file per processed document, written after the
// response is built. Consumers treat these as an audit trail only.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub id: uuid::Uuid,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub stats: ExtractionStats,
    pub response: ResponseEnvelope,
}

impl RunLogEntry {
    pub fn new(source: &str, stats: ExtractionStats, response: ResponseEnvelope) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.to_string(),
            stats,
            response,
        }
    }

    /// `parsed_<YYYYmmdd_HHMMSS>_<id prefix>.json`
    pub fn file_name(&self) -> String {
        let id = self.id.simple().to_string();
        format!(
            "parsed_{}_{}.json",
            self.created_at.format("%Y%m%d_%H%M%S"),
            &id[..8]
        )
    }
}

pub struct RunLog {
    dir: PathBuf,
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, entry: &RunLogEntry) -> Result<PathBuf> {
        let path = self.dir.join(entry.file_name());
        let json_str = serde_json::to_string_pretty(entry)
            .map_err(|e| anyhow!("Failed to serialize RunLogEntry: {}", e))?;
        fs::write(&path, json_str)?;
        log::debug!("Run log written to {}", path.display());
        Ok(path)
    }
}
