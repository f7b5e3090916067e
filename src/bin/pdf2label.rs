//! CLI binary for edgequake-pdf2label.
//!
//! A thin shim over the library crate that maps CLI flags to `LabelConfig`,
//! runs one batch and then optionally saves or discards the labels.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2label::pipeline::text::check_tool;
use edgequake_pdf2label::{
    ArtifactReport, BatchOutput, Command, CommandOutcome, Footer, LabelConfig,
    LabelProgressCallback, LabelRecord, LabelSession, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` reports the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Extracting text…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }
}

impl LabelProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering labels for {total_pages} pages…"))
        ));
    }

    fn on_label_rendered(&self, page_num: usize, total: usize, record: &LabelRecord) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<24}  {}",
            green("✓"),
            page_num,
            total,
            record.order_item,
            dim(&format!("{}.png", record.safe_filename())),
        ));
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, page_num: usize, total: usize, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            yellow("–"),
            page_num,
            total,
            dim(reason),
        ));
        self.bar.inc(1);
    }

    fn on_page_failed(&self, page_num: usize, total: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['\u{2026}']).collect()
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_pages: usize, rendered: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        let failed = total_pages.saturating_sub(rendered + skipped);

        if failed == 0 {
            eprintln!(
                "{} {} labels rendered{}",
                green("✔"),
                bold(&rendered.to_string()),
                if skipped > 0 {
                    format!("  ({skipped} pages skipped)")
                } else {
                    String::new()
                }
            );
        } else {
            eprintln!(
                "{} {}/{} labels rendered  ({} failed)",
                if rendered == 0 { red("✘") } else { cyan("⚠") },
                bold(&rendered.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render labels next to the PDF
  pdf2label pedidos.pdf

  # Render, then move the PNGs to the printer spool folder
  pdf2label pedidos.pdf --save-to /srv/labels/spool

  # Preview run: render, then delete without asking
  pdf2label pedidos.pdf --discard --yes

  # Re-run from text already produced by pdftotext
  pdf2label pedidos.txt -o /tmp/labels

  # JSON summary for scripting
  pdf2label --json pedidos.pdf > batch.json

ASSETS:
  The logo (projelmec.png) and fonts (arialbd.ttf, arial.ttf) are looked up
  next to the executable, in the current directory and in the output
  directory; fonts also in the usual system font folders. Use --asset-dir
  to replace that search list. Without fonts a builtin bitmap face is used;
  without a logo the header stays blank.

ENVIRONMENT VARIABLES:
  PDF2LABEL_PDFTOTEXT     Path to the pdftotext binary
  PDF2LABEL_OUTPUT_DIR    Directory to write labels to
  PDF2LABEL_LOGO          Explicit logo image
  RUST_LOG                Override the log filter (e.g. edgequake_pdf2label=debug)

SETUP:
  pdftotext ships with poppler-utils:
    Debian/Ubuntu:  sudo apt-get install poppler-utils
    macOS:          brew install poppler
"#;

/// Turn label PDFs into 640×400 PNG labels.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2label",
    version,
    about = "Turn label PDFs into 640×400 PNG labels",
    long_about = "Extract the title, code, client code and order/item of every page of a \
label PDF (via pdftotext -fixed) and render each one onto the fixed label template. \
The PNGs can then be moved elsewhere (--save-to) or deleted (--discard).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF document, or a `.txt` file already produced by pdftotext.
    input: PathBuf,

    /// Write labels here instead of next to the input.
    #[arg(short, long, env = "PDF2LABEL_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// After rendering, move the labels into this directory.
    #[arg(long, env = "PDF2LABEL_SAVE_TO", conflicts_with = "discard")]
    save_to: Option<PathBuf>,

    /// After rendering, delete the labels again.
    #[arg(long)]
    discard: bool,

    /// Confirm --discard without prompting.
    #[arg(short, long)]
    yes: bool,

    /// Path to the pdftotext binary.
    #[arg(long, env = "PDF2LABEL_PDFTOTEXT", default_value = "pdftotext")]
    pdftotext: PathBuf,

    /// Width passed to `pdftotext -fixed`.
    #[arg(long, env = "PDF2LABEL_FIXED_WIDTH", default_value_t = 800,
          value_parser = clap::value_parser!(u32).range(1..))]
    fixed_width: u32,

    /// Delete the intermediate .txt after reading it.
    #[arg(long, env = "PDF2LABEL_REMOVE_TEXT")]
    remove_text: bool,

    /// Explicit logo image, tried before the asset directories.
    #[arg(long, env = "PDF2LABEL_LOGO")]
    logo: Option<PathBuf>,

    /// Asset directory to search for logo and fonts (repeatable). Replaces
    /// the default search list.
    #[arg(long = "asset-dir", env = "PDF2LABEL_ASSET_DIRS", value_delimiter = ',')]
    asset_dirs: Vec<PathBuf>,

    /// Head-office footer line.
    #[arg(long, env = "PDF2LABEL_MATRIZ")]
    matriz: Option<String>,

    /// Branch footer line.
    #[arg(long, env = "PDF2LABEL_FILIAL")]
    filial: Option<String>,

    /// Website footer line.
    #[arg(long, env = "PDF2LABEL_WEBSITE")]
    website: Option<String>,

    /// Output a JSON summary of the batch (and of --save-to / --discard).
    #[arg(long, env = "PDF2LABEL_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2LABEL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2LABEL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2LABEL_QUIET")]
    quiet: bool,
}

/// Everything `--json` prints.
#[derive(Serialize)]
struct JsonSummary<'a> {
    batch: &'a BatchOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    relocated: Option<&'a ArtifactReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<&'a ArtifactReport>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let started = Instant::now();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn LabelProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Pre-flight: pdftotext must be runnable for PDF input ─────────────
    if !is_text_input(&cli.input) {
        check_tool(&config).context("pdftotext is required to read PDF documents")?;
    }

    if let Some(ref dir) = cli.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let mut session = LabelSession::new(config);
    let batch = match session.dispatch(Command::Process {
        document: cli.input.clone(),
    }) {
        Ok(CommandOutcome::Processed(batch)) => batch,
        Ok(other) => anyhow::bail!("Unexpected outcome for process: {:?}", other),
        Err(e) => return Err(e).with_context(|| format!("Failed to process {:?}", cli.input)),
    };

    // ── Save or discard ──────────────────────────────────────────────────
    let mut relocated = None;
    let mut deleted = None;

    if batch.count() > 0 {
        if let Some(ref dest) = cli.save_to {
            match session.dispatch(Command::Relocate {
                destination: dest.clone(),
            }) {
                Ok(CommandOutcome::Relocated(report)) => relocated = Some(report),
                Ok(other) => anyhow::bail!("Unexpected outcome for save: {:?}", other),
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to save labels to {:?}", dest))
                }
            }
        } else if cli.discard {
            let confirmed = cli.yes || confirm_discard(batch.count())?;
            match session.dispatch(Command::Delete { confirmed }) {
                Ok(CommandOutcome::Deleted(report)) => deleted = Some(report),
                Ok(other) => anyhow::bail!("Unexpected outcome for delete: {:?}", other),
                Err(e) if !confirmed => {
                    if !cli.quiet {
                        eprintln!("{} {}", yellow("–"), e);
                    }
                }
                Err(e) => return Err(e).context("Failed to delete labels"),
            }
        }
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let summary = JsonSummary {
            batch: &batch,
            relocated: relocated.as_ref(),
            deleted: deleted.as_ref(),
        };
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    if !show_progress && batch.stats.failed > 0 {
        eprintln!("  {} pages failed", batch.stats.failed);
    }
    if let Some(ref report) = relocated {
        print_artifact_line("moved", report, cli.save_to.as_deref());
    }
    if let Some(ref report) = deleted {
        print_artifact_line("deleted", report, None);
    }

    let elapsed = started.elapsed().as_secs_f64();
    let where_to = cli
        .save_to
        .as_deref()
        .filter(|_| relocated.is_some())
        .unwrap_or(batch.base_dir.as_path());
    println!(
        "{} labels in {:.2}s  →  {}",
        batch.count(),
        elapsed,
        bold(&where_to.display().to_string())
    );

    Ok(())
}

/// Map CLI args to `LabelConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<LabelConfig> {
    let defaults = Footer::default();
    let footer = Footer {
        matriz: cli.matriz.clone().unwrap_or(defaults.matriz),
        filial: cli.filial.clone().unwrap_or(defaults.filial),
        website: cli.website.clone().unwrap_or(defaults.website),
    };

    let mut builder = LabelConfig::builder()
        .pdftotext(cli.pdftotext.clone())
        .fixed_width(cli.fixed_width)
        .keep_text_file(!cli.remove_text)
        .footer(footer);

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(ref logo) = cli.logo {
        builder = builder.logo_path(logo.clone());
    }
    if !cli.asset_dirs.is_empty() {
        builder = builder.asset_dirs(cli.asset_dirs.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn is_text_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Ask on stderr/stdin; anything but `y`/`yes` declines.
fn confirm_discard(count: usize) -> Result<bool> {
    eprint!("Delete {count} label images? [y/N] ");
    io::stderr().flush().ok();
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_artifact_line(verb: &str, report: &ArtifactReport, dest: Option<&Path>) {
    let target = dest
        .map(|d| format!(" to {}", d.display()))
        .unwrap_or_default();
    eprintln!(
        "{} {} {}{}{}",
        if report.failed() == 0 { green("✔") } else { cyan("⚠") },
        bold(&report.applied().to_string()),
        verb,
        target,
        if report.missing() + report.failed() > 0 {
            dim(&format!(
                "  ({} already gone, {} failed)",
                report.missing(),
                report.failed()
            ))
        } else {
            String::new()
        },
    );
}
