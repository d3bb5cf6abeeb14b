//! CLI binary for medreport-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` / `AnalysisConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use medreport_ocr::{
    analyze_report, extract_text, extract_to_file, AnalysisConfig, AnalysisKind, ExtractError,
    ExtractionConfig, ExtractionConfigBuilder, ExtractionProgressCallback, ExtractionStrategy,
    InputKind, NormalizationRules, PageSelection,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the input is classified and tables are tried, then a page
/// bar once the OCR fallback knows how many pages it will recognise.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, kind: InputKind) {
        self.bar.set_message(format!("{kind} input"));
    }

    fn on_strategy_selected(&self, strategy: ExtractionStrategy) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Strategy: {strategy}"))
        ));
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        if self.bar.length() != Some(total_pages as u64) {
            self.activate_bar(total_pages);
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{text_len:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, strategy: ExtractionStrategy, text_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} chars extracted ({})",
            green("✔"),
            bold(&text_len.to_string()),
            strategy
        );
    }

    fn on_extraction_failed(&self, _error: &ExtractError) {
        // anyhow prints the error itself once main returns.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a scanned lab report (stdout)
  medocr cbc_report.pdf

  # Extract to a file
  medocr cbc_report.pdf -o cbc.txt

  # Photo of a medicine box, with the label profile
  medocr --profile medicine-label box.jpg

  # Only pages 2-3, OCR only (skip table detection)
  medocr --pages 2-3 --no-tables report.pdf

  # Extract and analyse with Gemini, saving a combined report
  GEMINI_API_KEY=... medocr --analyze report.pdf --report analysis.txt

  # Keep the preprocessed frames for inspection
  medocr --debug-frames ./frames scan.png

ENVIRONMENT VARIABLES:
  MEDOCR_TESSERACT        Path to the tesseract binary
  MEDOCR_PDFIUM_LIB       Path to libpdfium (or the directory containing it)
  MEDOCR_LLM_PROVIDER     Analysis provider (gemini, openai, anthropic, ollama)
  MEDOCR_MODEL            Analysis model ID (default: gemini-2.5-flash)
  GEMINI_API_KEY          Google Gemini API key
  OPENAI_API_KEY          OpenAI API key
  RUST_LOG                Log filter, e.g. medreport_ocr=debug
"#;

/// Extract text from medical report PDFs and images with OCR.
#[derive(Parser, Debug)]
#[command(
    name = "medocr",
    version,
    about = "Extract text from medical report PDFs and images with OCR",
    long_about = "Extract text from scanned medical reports. PDFs are searched for structured \
tables first; when none are found every page is rendered and recognised with tesseract. \
Images are preprocessed and recognised directly. Optionally send the text to an LLM for a \
plain-language analysis.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF (.pdf) or image (.png, .jpg, .jpeg) file.
    input: PathBuf,

    /// Write the extracted text to this file instead of stdout.
    #[arg(short, long, env = "MEDOCR_OUTPUT")]
    output: Option<PathBuf>,

    /// Preset tuned for a kind of document.
    #[arg(long, env = "MEDOCR_PROFILE", value_enum, default_value = "lab-report")]
    profile: ProfileArg,

    /// tesseract binary.
    #[arg(long = "tesseract", env = "MEDOCR_TESSERACT")]
    tesseract_path: Option<PathBuf>,

    /// pdfium shared library, or the directory that contains it.
    #[arg(long = "pdfium-lib", env = "MEDOCR_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Rendering DPI for the OCR fallback (72–600).
    #[arg(long, env = "MEDOCR_DPI",
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: Option<u32>,

    /// Contrast gain (0–10].
    #[arg(long, env = "MEDOCR_CONTRAST")]
    contrast: Option<f32>,

    /// Brightness offset (−255–255).
    #[arg(long, env = "MEDOCR_BRIGHTNESS", allow_negative_numbers = true)]
    brightness: Option<f32>,

    /// Skip the 3×3 blur.
    #[arg(long)]
    no_denoise: bool,

    /// Upscale to this percentage before OCR (10–800).
    #[arg(long, env = "MEDOCR_RESIZE", conflicts_with = "no_resize")]
    resize: Option<u32>,

    /// Do not resize frames.
    #[arg(long)]
    no_resize: bool,

    /// tesseract engine mode (--oem, 0–3).
    #[arg(long, env = "MEDOCR_OEM")]
    oem: Option<u8>,

    /// tesseract page segmentation mode (--psm, 0–13).
    #[arg(long, env = "MEDOCR_PSM")]
    psm: Option<u8>,

    /// tesseract language(s), e.g. eng or eng+deu.
    #[arg(long, env = "MEDOCR_LANG")]
    lang: Option<String>,

    /// Replace the character whitelist.
    #[arg(long, env = "MEDOCR_WHITELIST", conflicts_with = "no_whitelist")]
    whitelist: Option<String>,

    /// Allow every character.
    #[arg(long)]
    no_whitelist: bool,

    /// Post-OCR character clean-up.
    #[arg(long, env = "MEDOCR_NORMALIZE", value_enum)]
    normalize: Option<NormalizeArg>,

    /// Go straight to OCR for PDFs.
    #[arg(long, env = "MEDOCR_NO_TABLES")]
    no_tables: bool,

    /// Minimum aligned rows for a table.
    #[arg(long, env = "MEDOCR_TABLE_MIN_ROWS")]
    table_min_rows: Option<usize>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "MEDOCR_PAGES", default_value = "all")]
    pages: String,

    /// Directory for rendered-page scratch files.
    #[arg(long, env = "MEDOCR_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Save every preprocessed frame as frame-N.png here.
    #[arg(long, env = "MEDOCR_DEBUG_FRAMES")]
    debug_frames: Option<PathBuf>,

    /// Send the extracted text to an LLM for analysis.
    #[arg(long, env = "MEDOCR_ANALYZE")]
    analyze: bool,

    /// What the analysis should contain.
    #[arg(long, env = "MEDOCR_ANALYSIS", value_enum, default_value = "full")]
    analysis: AnalysisArg,

    /// LLM provider for --analyze (gemini, openai, anthropic, ollama).
    #[arg(long, env = "MEDOCR_LLM_PROVIDER")]
    provider: Option<String>,

    /// LLM model for --analyze.
    #[arg(long, env = "MEDOCR_MODEL")]
    model: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "MEDOCR_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "MEDOCR_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retries on LLM failure.
    #[arg(long, env = "MEDOCR_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Text file with a custom analysis prompt containing {text}.
    #[arg(long, env = "MEDOCR_PROMPT")]
    prompt: Option<PathBuf>,

    /// With --analyze: also write the combined text + analysis report here.
    #[arg(long, requires = "analyze")]
    report: Option<PathBuf>,

    /// Output structured JSON instead of plain text.
    #[arg(long, env = "MEDOCR_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MEDOCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MEDOCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MEDOCR_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    LabReport,
    MedicineLabel,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum NormalizeArg {
    LabValues,
    Alphanumeric,
    None,
}

impl From<NormalizeArg> for NormalizationRules {
    fn from(v: NormalizeArg) -> Self {
        match v {
            NormalizeArg::LabValues => NormalizationRules::LabValues,
            NormalizeArg::Alphanumeric => NormalizationRules::Alphanumeric,
            NormalizeArg::None => NormalizationRules::None,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AnalysisArg {
    Full,
    Summary,
    Values,
    Medicine,
}

impl From<AnalysisArg> for AnalysisKind {
    fn from(v: AnalysisArg) -> Self {
        match v {
            AnalysisArg::Full => AnalysisKind::FullAnalysis,
            AnalysisArg::Summary => AnalysisKind::QuickSummary,
            AnalysisArg::Values => AnalysisKind::ValueExtraction,
            AnalysisArg::Medicine => AnalysisKind::MedicineLabel,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // Config errors surface before the spinner starts.
    let mut config = build_config(&cli)?;
    let analysis_config = if cli.analyze {
        Some(build_analysis_config(&cli).await?)
    } else {
        None
    };

    if show_progress {
        config.progress_callback =
            Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>);
    }

    // ── Extract and analyse ──────────────────────────────────────────────
    if let Some(analysis_config) = analysis_config {
        let report = analyze_report(&cli.input, &config, &analysis_config)
            .await
            .context("Analysis failed")?;

        if let Some(ref path) = cli.report {
            std::fs::write(path, report.to_report_string())
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }
        if let Some(ref path) = cli.output {
            std::fs::write(path, &report.extraction.text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        if cli.json {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            match report.analysis {
                Some(ref analysis) => {
                    println!("{analysis}");
                    if let Some(specialty) = report.specialty {
                        eprintln!(
                            "{} Suggested specialist: {}",
                            cyan("◆"),
                            bold(&specialty.to_string())
                        );
                    }
                }
                None => println!("{}", report.extraction.text),
            }
            if !cli.quiet {
                eprintln!(
                    "   {} tokens in  /  {} tokens out",
                    dim(&report.input_tokens.to_string()),
                    dim(&report.output_tokens.to_string()),
                );
            }
        }
        return Ok(());
    }

    // ── Extract only ─────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} OCR page(s), {} table(s)  {}ms  →  {}",
                green("✔"),
                stats.ocr_pages,
                stats.tables_found,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = extract_text(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.text.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !show_progress && !cli.json {
            eprintln!(
                "Extracted {} chars via {} in {}ms",
                output.text.len(),
                output.strategy,
                output.stats.total_duration_ms
            );
        }
    }

    Ok(())
}

/// Map CLI args onto the selected profile.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let profile = match cli.profile {
        ProfileArg::LabReport => ExtractionConfig::lab_report(),
        ProfileArg::MedicineLabel => ExtractionConfig::medicine_label(),
    };
    let (profile_alpha, profile_beta) = (profile.contrast_alpha, profile.contrast_beta);
    let mut builder = ExtractionConfigBuilder::from_config(profile)
        .pages(parse_pages(&cli.pages)?)
        .table_extraction(!cli.no_tables);

    if let Some(ref p) = cli.tesseract_path {
        builder = builder.tesseract_path(p);
    }
    if let Some(ref p) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(p);
    }
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }
    if cli.contrast.is_some() || cli.brightness.is_some() {
        builder = builder.contrast(
            cli.contrast.unwrap_or(profile_alpha),
            cli.brightness.unwrap_or(profile_beta),
        );
    }
    if cli.no_denoise {
        builder = builder.denoise(false);
    }
    if cli.no_resize {
        builder = builder.resize_percent(None);
    } else if let Some(pct) = cli.resize {
        builder = builder.resize_percent(Some(pct));
    }
    if let Some(oem) = cli.oem {
        builder = builder.engine_mode(oem);
    }
    if let Some(psm) = cli.psm {
        builder = builder.page_segmentation(psm);
    }
    if let Some(ref lang) = cli.lang {
        builder = builder.language(lang);
    }
    if cli.no_whitelist {
        builder = builder.char_whitelist(None);
    } else if let Some(ref wl) = cli.whitelist {
        builder = builder.char_whitelist(Some(wl.clone()));
    }
    if let Some(rules) = cli.normalize {
        builder = builder.normalization(rules.into());
    }
    if let Some(n) = cli.table_min_rows {
        builder = builder.table_min_rows(n);
    }
    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_dir(dir);
    }
    if let Some(ref dir) = cli.debug_frames {
        builder = builder.debug_frames_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

async fn build_analysis_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder()
        .kind(cli.analysis.into())
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries);

    if let Some(ref name) = cli.provider {
        builder = builder.provider_name(name);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref path) = cli.prompt {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }

    builder.build().context("Invalid analysis configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}
