use crate::types::ExtractionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version constants for cache invalidation
pub mod versions {
    pub const TXREPORT_VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Bump when the row grammar or section rules change behaviour
    pub const EXTRACTION_VERSION: &str = "1.0.0";
}

/// Cache key (PDF + Config → ExtractionResult)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ReportCacheKey {
    pub pdf_hash: String,
    pub config_hash: String,
    pub txreport_version: String,
    pub extraction_version: String,
}

impl ReportCacheKey {
    pub fn new(pdf_hash: String, config_hash: String) -> Self {
        Self {
            pdf_hash,
            config_hash,
            txreport_version: versions::TXREPORT_VERSION.to_string(),
            extraction_version: versions::EXTRACTION_VERSION.to_string(),
        }
    }

    /// Compute cache key hash for storage
    pub fn to_cache_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.pdf_hash);
        hasher.update(&self.config_hash);
        hasher.update(&self.txreport_version);
        hasher.update(&self.extraction_version);
        format!("{:x}", hasher.finalize())
    }
}

/// Cache value (extraction result with metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCacheValue {
    pub result: ExtractionResult,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub cache_version: String,
}

impl ReportCacheValue {
    pub fn new(result: ExtractionResult, processing_time_ms: u64) -> Self {
        Self {
            result,
            created_at: Utc::now(),
            processing_time_ms,
            cache_version: versions::TXREPORT_VERSION.to_string(),
        }
    }
}
