use crate::cache::{ReportCacheKey, ReportCacheValue};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::preprocessors::{Preprocessor, TextPreprocessor};
use crate::rules::extract_records;
use crate::storage::{
    calculate_config_hash, calculate_document_hash, NoOpStorage, ReportStorage, RunLog,
    RunLogEntry,
};
use crate::types::*;
use anyhow::Result;
use std::path::Path;
use std::time::{Duration, Instant};

#[cfg(feature = "pdf-extract-backend")]
use crate::{preprocessors::PdfPreprocessor, storage::FileStorage};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.0}ms ({:.1}%)",
                step,
                duration.as_millis(),
                percentage
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

pub struct ReportProcessor {
    preprocessor: Box<dyn Preprocessor>,
    storage: Box<dyn ReportStorage + Send + Sync>,
    run_log: Option<RunLog>,
}

impl ReportProcessor {
    /// Create ReportProcessor with full dependency injection
    pub fn new_with_dependencies(
        preprocessor: Box<dyn Preprocessor>,
        storage: Box<dyn ReportStorage + Send + Sync>,
    ) -> Self {
        Self {
            preprocessor,
            storage,
            run_log: None,
        }
    }

    /// Convenience constructor for CLI usage with the pdf-extract backend
    #[cfg(feature = "pdf-extract-backend")]
    pub fn new_cli_pdf(cache_dir: &str) -> Result<Self> {
        let preprocessor = Box::new(PdfPreprocessor::new_with_pdf_extract());
        let storage = Box::new(FileStorage::new(cache_dir)?);
        Ok(Self::new_with_dependencies(preprocessor, storage))
    }

    /// Convenience constructor for form-feed separated text dumps (no cache)
    pub fn new_text() -> Self {
        Self::new_with_dependencies(Box::new(TextPreprocessor::new()), Box::new(NoOpStorage::new()))
    }

    /// Write a JSON run log for every document when the config asks for it
    pub fn set_run_log(&mut self, run_log: RunLog) {
        self.run_log = Some(run_log);
    }

    pub fn preprocessor_name(&self) -> &str {
        self.preprocessor.name()
    }

    /// Process file with specific config and optional profiling
    pub fn process_file_with_config_and_profiling(
        &mut self,
        input_path: &str,
        config: &ExtractionConfig,
        enable_profiling: bool,
        skip_cache: bool,
    ) -> Result<ExtractionResult> {
        let mut profiler = StepProfiler::new(enable_profiling);
        let result = self.process_file_with_profiler(input_path, config, &mut profiler, skip_cache);
        profiler.print_summary();
        result
    }

    /// Process file with specific config (pure function approach)
    /// PDF + Config → ExtractionResult, cached on both
    pub fn process_file_with_config(
        &mut self,
        input_path: &str,
        config: &ExtractionConfig,
    ) -> Result<ExtractionResult> {
        self.process_file_with_profiler(input_path, config, &mut StepProfiler::new(false), false)
    }

    fn process_file_with_profiler(
        &mut self,
        input_path: &str,
        config: &ExtractionConfig,
        profiler: &mut StepProfiler,
        skip_cache: bool,
    ) -> Result<ExtractionResult> {
        let path = Path::new(input_path);
        self.check_input(path, config)?;

        let bytes = profiler.time_step("1. Read input", || std::fs::read(path))?;
        let result = self.process_bytes_with_profiler(&bytes, config, profiler, skip_cache)?;

        if config.write_run_log {
            self.write_run_log(input_path, &result, config)?;
        }
        Ok(result)
    }

    /// Process raw document bytes (already uploaded / read).
    /// `source` labels the document in the run log, e.g. the upload file name.
    pub fn process_bytes_with_config(
        &mut self,
        source: &str,
        bytes: &[u8],
        config: &ExtractionConfig,
        skip_cache: bool,
    ) -> Result<ExtractionResult> {
        if bytes.len() as u64 > config.max_input_bytes {
            return Err(too_large(bytes.len() as u64, config).into());
        }
        let result =
            self.process_bytes_with_profiler(bytes, config, &mut StepProfiler::new(false), skip_cache)?;

        if config.write_run_log {
            self.write_run_log(source, &result, config)?;
        }
        Ok(result)
    }

    fn process_bytes_with_profiler(
        &mut self,
        bytes: &[u8],
        config: &ExtractionConfig,
        profiler: &mut StepProfiler,
        skip_cache: bool,
    ) -> Result<ExtractionResult> {
        let start_time = Instant::now();
        config.validate()?;

        let cache_key = profiler.time_step("2. Cache Key Generation", || {
            let config_hash = calculate_config_hash(config)?;
            Ok::<ReportCacheKey, anyhow::Error>(ReportCacheKey::new(
                calculate_document_hash(bytes),
                config_hash,
            ))
        })?;

        if skip_cache {
            log::info!("Skipping cache lookup (skip_cache enabled)");
        } else if let Some(cached) =
            profiler.time_step("3. Cache Lookup", || self.storage.get_report(&cache_key))?
        {
            log::info!(
                "Cache hit: {} records for document {}",
                cached.result.count(),
                &cache_key.pdf_hash[..12]
            );
            return Ok(cached.result);
        }

        let pages = profiler.time_step("4. Document → Pages", || {
            self.preprocessor.extract_pages(bytes)
        })?;
        log::info!(
            "{} produced {} pages",
            self.preprocessor.name(),
            pages.len()
        );

        let result = profiler.time_step("5. Pages → Records", || extract_records(&pages, config))?;
        log::info!(
            "Extracted {} records (header page: {:?}, termination: {:?})",
            result.count(),
            result.header_page,
            result.termination
        );

        if !skip_cache {
            profiler.time_step("6. Cache Storage", || {
                let processing_time = start_time.elapsed().as_millis() as u64;
                let cache_value = ReportCacheValue::new(result.clone(), processing_time);
                self.storage.store_report(&cache_key, &cache_value)
            })?;
        }

        Ok(result)
    }

    /// Extract from pages supplied by an external page-text source
    pub fn process_pages(
        &self,
        pages: &[PageText],
        config: &ExtractionConfig,
    ) -> Result<ExtractionResult> {
        Ok(extract_records(pages, config)?)
    }

    fn check_input(&self, path: &Path, config: &ExtractionConfig) -> Result<()> {
        if !self.preprocessor.supports_file_type(path) {
            return Err(ExtractError::InvalidInput(format!(
                "{} does not support {}",
                self.preprocessor.name(),
                path.display()
            ))
            .into());
        }

        let size = std::fs::metadata(path)?.len();
        if size > config.max_input_bytes {
            return Err(too_large(size, config).into());
        }
        Ok(())
    }

    fn write_run_log(
        &self,
        source: &str,
        result: &ExtractionResult,
        config: &ExtractionConfig,
    ) -> Result<()> {
        let Some(run_log) = &self.run_log else {
            log::warn!("write_run_log is enabled but no run log directory is configured");
            return Ok(());
        };
        let entry = RunLogEntry::new(
            source,
            result.stats.clone(),
            result.to_envelope(&config.header_marker),
        );
        run_log.write(&entry)?;
        Ok(())
    }
}

fn too_large(size: u64, config: &ExtractionConfig) -> ExtractError {
    ExtractError::InvalidInput(format!(
        "input is {size} bytes, limit is {} bytes",
        config.max_input_bytes
    ))
}
