//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and renders results; all conversion logic lives in
//! the library.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    convert_batch, convert_document, inspect, ConversionConfig, ConversionProgressCallback,
    OutputFormat, PageFailurePolicy, PageRange, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one live bar per document, reset when the
/// next document in a batch starts.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_document_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_document_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.reset();
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }

    fn on_page_done(&self, page_num: usize, total: usize, bytes: u64) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>7} bytes", bytes)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let msg = truncate_message(error, 80);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_document_complete(&self, written: usize, total_pages: usize) {
        let failed = total_pages.saturating_sub(written);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} page(s) converted",
                green("✔"),
                bold(&written.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages converted  ({} failed)",
                if written == 0 { red("✘") } else { cyan("⚠") },
                bold(&written.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate a long error message to keep the output tidy.
///
/// The cut lands on a char boundary, never inside a multibyte character
/// (error text includes file paths, which are frequently non-ASCII).
fn truncate_message(error: &str, max_len: usize) -> String {
    if error.len() <= max_len {
        return error.to_string();
    }
    let cut = (0..max_len)
        .rev()
        .find(|&i| error.is_char_boundary(i))
        .unwrap_or(0);
    format!("{}\u{2026}", &error[..cut])
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single file, print files into output/
  pdf2img document.pdf -o output/

  # Batch: every PDF under input/, JPEGs at 150 DPI
  pdf2img -i input/ -o output/ -f JPG -d 150

  # Recursive batch, mirroring the directory tree
  pdf2img -i input/ -o output/ -r --format PNG

  # Only pages 3-15, custom filename prefix
  pdf2img --pages 3-15 --prefix scan report.pdf -o out/

  # Inspect page count and metadata, no conversion
  pdf2img --inspect-only document.pdf -o .

NAMING:
  Single-page documents collapse to <stem>.<ext>; multi-page documents
  produce <stem>_page_001.<ext>, <stem>_page_002.<ext>, … so a plain
  alphabetical sort equals page order.

EXIT CODES:
  0  the tool ran; conversion failures are reported on stderr
  1  invalid invocation, or the input path does not exist

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Full path to the pdfium shared library
  PDF2IMG_DPI       Default for --dpi
  PDF2IMG_FORMAT    Default for --format
"#;

/// Convert PDF files to raster images (PNG, JPEG, TIFF).
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF files to raster images",
    long_about = "Convert PDF documents to raster image files, one PDF at a time or a whole \
directory tree in batch. Rasterisation is delegated to the pdfium engine; output \
filenames are deterministic and sort in page order.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(clap::ArgGroup::new("source").required(true).args(["input_file", "input_dir"]))
)]
struct Cli {
    /// PDF file to convert.
    input_file: Option<PathBuf>,

    /// Directory of PDF files for batch conversion.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for the images.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Rendering DPI (72–1200).
    #[arg(short, long, env = "PDF2IMG_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    dpi: u32,

    /// Output format.
    #[arg(short, long, env = "PDF2IMG_FORMAT", value_enum, default_value = "png")]
    format: FormatArg,

    /// Recurse into subdirectories (batch mode only).
    #[arg(short, long)]
    recursive: bool,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2IMG_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Page range to convert, e.g. 3-15 or a single page number.
    #[arg(long)]
    pages: Option<String>,

    /// Filename prefix for output images (single-file mode; default: the PDF's stem).
    #[arg(long)]
    prefix: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMG_PASSWORD")]
    password: Option<String>,

    /// Full path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the run statistics as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpg,
    Jpeg,
    Tiff,
    Bmp,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpg | FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Tiff => OutputFormat::Tiff,
            FormatArg::Bmp => OutputFormat::Bmp,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    // ── Validate input paths before any work ─────────────────────────────
    if let Some(ref file) = cli.input_file {
        if !file.exists() {
            eprintln!("Input file does not exist: {}", file.display());
            std::process::exit(1);
        }
    }
    if let Some(ref dir) = cli.input_dir {
        if !dir.exists() {
            eprintln!("Input directory does not exist: {}", dir.display());
            std::process::exit(1);
        }
    }

    let config = build_config(&cli, show_progress)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let file = cli
            .input_file
            .as_ref()
            .context("--inspect-only requires a PDF file argument")?;
        let info = inspect(file, &config).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", info.path.display());
            if let Some(ref t) = info.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = info.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", info.page_count);
            println!("PDF Version:  {}", info.pdf_version);
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    if let Some(ref input_file) = cli.input_file {
        // A conversion failure is reported, not escalated: exit 1 is
        // reserved for an invalid invocation or a missing input path.
        let stats = match convert_document(input_file, &cli.output_dir, &config).await {
            Ok(stats) => stats,
            Err(e) => {
                eprintln!("{} {e}", red("✘"));
                return Ok(());
            }
        };

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&stats.report())
                    .context("Failed to serialise stats")?
            );
        } else if !cli.quiet && !show_progress {
            // The progress callback already printed the summary tick.
            eprintln!(
                "Converted {} page(s), {} bytes, in {:.2}s",
                stats.pages_converted,
                stats.total_bytes,
                stats.elapsed().as_secs_f64()
            );
            if stats.pages_failed > 0 {
                eprintln!("  {} page(s) failed", stats.pages_failed);
            }
        }
    } else if let Some(ref input_dir) = cli.input_dir {
        let batch = convert_batch(input_dir, &cli.output_dir, &config, cli.recursive)
            .await
            .context("Batch conversion failed")?;

        if cli.json {
            let summary = serde_json::json!({
                "succeeded": batch.succeeded,
                "total": batch.total,
                "elapsed_ms": batch.elapsed.as_millis() as u64,
                "pages": batch.pages,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise stats")?
            );
        } else if !cli.quiet {
            let tick = if batch.succeeded == batch.total {
                green("✔")
            } else {
                cyan("⚠")
            };
            eprintln!(
                "{tick} {}/{} file(s) converted in {:.2}s  →  {}",
                bold(&batch.succeeded.to_string()),
                batch.total,
                batch.elapsed.as_secs_f64(),
                bold(&cli.output_dir.display().to_string()),
            );
            eprintln!(
                "   {} page(s)  /  {} bytes written",
                dim(&batch.pages.pages_converted.to_string()),
                dim(&batch.pages.total_bytes.to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, show_progress: bool) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .format(cli.format.into())
        .quality(cli.quality)
        // The CLI is the tolerant path: a bad page is warned about and
        // skipped so long runs are never sunk by one page.
        .on_page_failure(PageFailurePolicy::SkipAndLog);

    if let Some(ref pages) = cli.pages {
        builder = builder.pages(parse_pages(pages)?);
    }
    if let Some(ref prefix) = cli.prefix {
        builder = builder.prefix(prefix.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if show_progress {
        let cb = CliProgressCallback::new();
        builder = builder.progress_callback(cb as ProgressCallback);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` ("5" or "3-15") into a `PageRange`.
fn parse_pages(s: &str) -> Result<PageRange> {
    let s = s.trim();

    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start.trim().parse().context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }

        return Ok(PageRange::new(start, end));
    }

    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageRange::new(page, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_messages_alone() {
        assert_eq!(truncate_message("disk full", 80), "disk full");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' spans two bytes right at the cut point; slicing a byte index
        // inside it would panic.
        let mut msg = "x".repeat(78);
        msg.push_str("ééé éé ééé éééé");
        assert!(msg.len() > 80);
        let truncated = truncate_message(&msg, 80);
        assert!(truncated.ends_with('\u{2026}'));
        assert!(truncated.len() <= 83);
    }

    #[test]
    fn truncate_handles_pathological_paths() {
        let msg = format!("Failed to write '/tmp/{}.png'", "ée".repeat(60));
        let truncated = truncate_message(&msg, 80);
        assert!(truncated.chars().count() < msg.chars().count());
    }

    #[test]
    fn parse_pages_accepts_single_and_range() {
        assert_eq!(parse_pages("5").unwrap(), PageRange::new(5, 5));
        assert_eq!(parse_pages("3-15").unwrap(), PageRange::new(3, 15));
        assert_eq!(parse_pages(" 2 - 4 ").unwrap(), PageRange::new(2, 4));
    }

    #[test]
    fn parse_pages_rejects_nonsense() {
        assert!(parse_pages("abc").is_err());
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("9-3").is_err());
    }
}
