use anyhow::Result;
use clap::Parser;
use std::path::Path;

// Import from txreport-core
use txreport_core::preprocessors::TextPreprocessor;
use txreport_core::storage::{FileStorage, RunLog};
use txreport_core::{ExtractionConfig, ExtractionResult, ReportProcessor, RolloverPolicy, Termination};

#[derive(Parser)]
#[command(name = "txreport")]
#[command(about = "Extract Weekly Terminal Transactions records from PDF reports")]
struct Args {
    /// Path to the PDF report (or form-feed separated text dump with --text)
    #[arg(short, long, required_unless_present = "show_configs")]
    input: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: envelope, records, or flat
    #[arg(short = 'f', long, default_value = "envelope")]
    output_format: String,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Skip cache and force fresh processing (useful for development/testing)
    #[arg(long)]
    skip_cache: bool,

    /// Directory for cached extraction results
    #[arg(long, default_value = ".txreport_cache")]
    cache_dir: String,

    /// Write a JSON run log for this document into the given directory
    #[arg(long)]
    log_dir: Option<String>,

    /// Scan to end of document instead of stopping when numbering restarts
    #[arg(long)]
    no_rollover: bool,

    /// Stop after this many records
    #[arg(long)]
    max_records: Option<usize>,

    /// Treat the input as a form-feed separated text dump instead of a PDF
    #[arg(long)]
    text: bool,
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    println!("🦀 txreport - Weekly Terminal Transactions extractor");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    // Check if input file exists
    let input = args.input.clone().unwrap_or_default();
    if !Path::new(&input).exists() {
        eprintln!("❌ Input not found at: {}", input);
        std::process::exit(1);
    }

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Could not load config: {e}");
            std::process::exit(1);
        }
    };

    // Apply CLI overrides to config
    if args.no_rollover {
        config.rollover = RolloverPolicy::Disabled;
    }
    if args.max_records.is_some() {
        config.max_records = args.max_records;
    }
    if args.log_dir.is_some() {
        config.write_run_log = true;
    }
    log::debug!("Effective config: {:?}", config);

    let mut processor = match create_processor(&args) {
        Ok(processor) => processor,
        Err(e) => {
            eprintln!("❌ Could not set up processor: {e}");
            std::process::exit(1);
        }
    };
    if let Some(log_dir) = &args.log_dir {
        processor.set_run_log(RunLog::new(log_dir)?);
    }

    println!("📄 Processing: {} ({})", input, processor.preprocessor_name());

    match processor.process_file_with_config_and_profiling(
        &input,
        &config,
        args.profile,
        args.skip_cache,
    ) {
        Ok(result) => {
            print_summary(&result);

            let output_path = args
                .output
                .clone()
                .unwrap_or_else(|| default_output_path(&input));
            save_result(&result, &output_path, &args.output_format, &config)?;
        }
        Err(e) => {
            eprintln!("❌ Processing failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// An explicit config path must load; only the no-path case uses defaults
fn load_config(path: Option<&str>) -> Result<ExtractionConfig> {
    match path {
        Some(config_path) => {
            let config = ExtractionConfig::load_from_file(config_path)
                .map_err(|e| anyhow::anyhow!("{config_path}: {e}"))?;
            println!("📋 Loaded config from: {}", config_path);
            Ok(config)
        }
        None => {
            println!("📋 Using default config");
            Ok(ExtractionConfig::load_with_fallback(None))
        }
    }
}

fn create_processor(args: &Args) -> Result<ReportProcessor> {
    if args.text {
        println!("🚀 Using text dump input");
        let storage = FileStorage::new(&args.cache_dir)?;
        return Ok(ReportProcessor::new_with_dependencies(
            Box::new(TextPreprocessor::new()),
            Box::new(storage),
        ));
    }
    create_pdf_processor(args)
}

#[cfg(feature = "pdf-extract-backend")]
fn create_pdf_processor(args: &Args) -> Result<ReportProcessor> {
    println!("🚀 Using pdf-extract backend");
    ReportProcessor::new_cli_pdf(&args.cache_dir)
}

/// Fallback when no backend is compiled in
#[cfg(not(feature = "pdf-extract-backend"))]
fn create_pdf_processor(_args: &Args) -> Result<ReportProcessor> {
    Err(anyhow::anyhow!(
        "No PDF backend compiled in!\n\
         Compile with: --features pdf-extract-backend, or pass --text for text dumps"
    ))
}

fn default_output_path(input: &str) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{input_name}_transactions.json")
}

fn print_summary(result: &ExtractionResult) {
    match result.header_page {
        Some(page) => println!("✅ Section found on page {page}"),
        None => println!("⚠️  No page found with the section header"),
    }
    println!("📊 Extraction metrics:");
    println!("   - Records: {}", result.count());
    println!("   - Pages scanned: {}", result.stats.pages_scanned);
    println!("   - Lines skipped: {}", result.stats.lines_skipped);
    match &result.termination {
        Termination::SequenceRollover {
            page_number,
            sequence_number,
            ..
        } => println!(
            "   - Stopped: numbering restarted at {sequence_number} on page {page_number}"
        ),
        Termination::RecordLimit { limit } => println!("   - Stopped: record limit {limit}"),
        Termination::EndOfDocument | Termination::HeaderNotFound => {
            println!("   - Stopped: end of document")
        }
    }
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --config <path>         Load custom config file");
    println!("  --input <path>          PDF report to process");
    println!("  --output <path>         Output file path (auto-generated if not specified)");
    println!("  --output-format <fmt>   Output format: envelope, records, or flat");
    println!("  --text                  Input is a form-feed separated text dump");
    println!("  --no-rollover           Do not stop when sequence numbers restart");
    println!("  --max-records <n>       Stop after n records");
    println!("  --log-dir <path>        Write a JSON run log per document");
    println!("  --cache-dir <path>      Cache directory (default: .txreport_cache)");

    println!("\n📄 Output Formats:");
    println!("  envelope  - page_number, count, data and message (default)");
    println!("  records   - Plain array of records with sequence and page numbers");
    println!("  flat      - One tab-separated line per record");

    println!("\n📁 Config file keys (YAML):");
    println!("  header_marker    - Phrase that opens the table (default: Weekly Terminal Transactions)");
    println!("  rollover         - {{mode: restart_at, value: 1}} or {{mode: disabled}}");
    println!("  max_records      - Optional record cap");
    println!("  footer_pattern   - Regex for pagination footers");
    println!("  max_input_bytes  - Input size limit (default: 15 MB)");
    println!("  write_run_log    - Write a JSON run log per document");

    println!("\n📁 Example config files in ./configs/:");
    println!("  default.yaml              - Stop when S/N restarts at 1");
    println!("  per-page-numbering.yaml   - Scan to end of document, cap at 366 rows");

    println!("\n📝 Usage Examples:");
    println!("  cargo run -- -i weekly.pdf");
    println!("  cargo run -- -i weekly.pdf -o /path/to/output.json -f records");
    println!("  cargo run -- -i pages.txt --text --no-rollover");
}

fn save_result(
    result: &ExtractionResult,
    output_path: &str,
    format: &str,
    config: &ExtractionConfig,
) -> Result<()> {
    result.save_with_format(output_path, format, &config.header_marker)?;

    match format {
        "records" => println!("💾 Records saved to: {}", output_path),
        "flat" => println!("💾 Flat format results saved to: {}", output_path),
        "envelope" => println!("💾 Envelope saved to: {}", output_path),
        _ => {
            println!("⚠️  Unknown output format '{}', using default envelope format", format);
            println!("💾 Envelope saved to: {}", output_path);
        }
    }

    Ok(())
}
