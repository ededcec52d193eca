//! pagemark CLI - page, paragraph and figure renumbering for HTML books

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagemark::markup::TagKind;
use pagemark::{FileOutcome, NormalizeOptions, NormalizeResult, Outline};

/// File normalized when none is given.
const DEFAULT_INPUT: &str = "index.html";

/// Longest paragraph preview printed by `stats`, in characters.
const PREVIEW_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Renumber pages, paragraphs and figures in HTML books", long_about = None)]
struct Cli {
    /// HTML files to normalize in place (default: index.html)
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct StyleArgs {
    /// Spaces per indentation level
    #[arg(long, global = true, value_name = "N", env = "PAGEMARK_INDENT")]
    indent: Option<usize>,

    /// Figure caption label (e.g. "Fig. ")
    #[arg(long, global = true, value_name = "TEXT", env = "PAGEMARK_CAPTION_LABEL")]
    caption_label: Option<String>,

    /// Text between the figure number and the caption
    #[arg(long, global = true, value_name = "TEXT", env = "PAGEMARK_CAPTION_SEPARATOR")]
    caption_separator: Option<String>,

    /// Class marking numbered figure images
    #[arg(long, global = true, value_name = "CLASS", env = "PAGEMARK_FIGURE_CLASS")]
    figure_class: Option<String>,
}

impl StyleArgs {
    fn options(&self) -> NormalizeOptions {
        let mut options = NormalizeOptions::default();

        if let Some(width) = self.indent {
            options = options.with_indent_width(width);
        }
        if self.caption_label.is_some() || self.caption_separator.is_some() {
            let label = self
                .caption_label
                .clone()
                .unwrap_or_else(|| options.caption_label.clone());
            let separator = self
                .caption_separator
                .clone()
                .unwrap_or_else(|| options.caption_separator.clone());
            options = options.with_caption(label, separator);
        }
        if let Some(ref class) = self.figure_class {
            options = options.with_figure_class(class.clone());
        }

        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize files (in place unless --output or --stdout is given)
    Run {
        /// Input HTML files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Write the result to this file instead (single input only)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the result instead of writing it (single input only)
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Report files that are not normalized; exit status 1 if any
    Check {
        /// Input HTML files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show the pages, paragraphs and figures of the normalized document
    Stats {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = cli.style.options();

    let result = match cli.command {
        Some(Commands::Run {
            inputs,
            output,
            stdout,
        }) => cmd_run(&inputs, output.as_deref(), stdout, &options),
        Some(Commands::Check { inputs }) => cmd_check(&inputs, &options),
        Some(Commands::Stats { input, json }) => cmd_stats(&input, json, &options).map(|_| true),
        Some(Commands::Version) => {
            cmd_version();
            Ok(true)
        }
        None => {
            let inputs = if cli.inputs.is_empty() {
                vec![PathBuf::from(DEFAULT_INPUT)]
            } else {
                cli.inputs
            };
            cmd_run(&inputs, None, false, &options)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn cmd_run(
    inputs: &[PathBuf],
    output: Option<&Path>,
    stdout: bool,
    options: &NormalizeOptions,
) -> CliResult<bool> {
    if output.is_some() || stdout {
        let [input] = inputs else {
            return Err("--output and --stdout take a single input file".into());
        };

        let content = fs::read_to_string(input)?;
        let result = pagemark::normalize_with_options(&content, options)?;

        if let Some(path) = output {
            fs::write(path, &result.content)?;
            println!("{} {}", "Saved to".green(), path.display());
        } else {
            print!("{}", result.content);
        }
        return Ok(true);
    }

    if let [input] = inputs {
        let result = pagemark::normalize_file(input, options)?;
        print_done(input, &result);
        return Ok(true);
    }

    let pb = progress_bar(inputs.len())?;
    let outcomes = pagemark::normalize_files_with_progress(inputs, options, true, |outcome| {
        pb.set_message(outcome.path.display().to_string());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => print_done(&outcome.path, result),
            Err(e) => {
                failed += 1;
                print_failed(outcome, e);
            }
        }
    }

    let total = pagemark::batch_report(&outcomes);
    println!(
        "\n{} {} files: {} pages, {} paragraphs, {} figures",
        "Total:".cyan().bold(),
        outcomes.len() - failed,
        total.page_count,
        total.paragraph_count(),
        total.figure_count
    );

    Ok(failed == 0)
}

fn cmd_check(inputs: &[PathBuf], options: &NormalizeOptions) -> CliResult<bool> {
    let outcomes = pagemark::normalize_files_with_progress(inputs, options, false, |_| {})?;

    let mut dirty = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) if result.changed() => {
                dirty += 1;
                println!(
                    "{} {} would be renumbered",
                    "CHANGE:".yellow().bold(),
                    outcome.path.display()
                );
            }
            Ok(_) => println!("{} {}", "OK:".green().bold(), outcome.path.display()),
            Err(e) => {
                dirty += 1;
                print_failed(outcome, e);
            }
        }
    }

    if dirty > 0 {
        println!(
            "\n{} of {} files need normalizing",
            dirty.to_string().yellow().bold(),
            outcomes.len()
        );
    }

    Ok(dirty == 0)
}

fn cmd_stats(input: &Path, json: bool, options: &NormalizeOptions) -> CliResult<()> {
    let content = fs::read_to_string(input)?;
    let outline = pagemark::outline(&content, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outline)?);
        return Ok(());
    }

    print_outline(input, &outline);
    Ok(())
}

fn print_outline(input: &Path, outline: &Outline) {
    println!("{}", "Document Outline".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), outline.pages.len());
    println!(
        "{}: {} ({} headings)",
        "Paragraphs".bold(),
        outline.paragraph_count(),
        outline.heading_count()
    );
    println!("{}: {}", "Figures".bold(), outline.figures.len());

    for page in &outline.pages {
        println!();
        println!(
            "{} {}",
            format!("Page {}", page.ordinal.unwrap_or_default()).cyan().bold(),
            page.id.as_deref().unwrap_or_default().dimmed()
        );
        for paragraph in &page.paragraphs {
            let kind = match paragraph.kind {
                TagKind::Heading(level) => format!("h{}", level),
                TagKind::Body => "p".to_string(),
            };
            println!(
                "  {:<10} {:<3} {}",
                paragraph.id.as_deref().unwrap_or_default().dimmed(),
                kind,
                preview(&paragraph.text)
            );
        }
    }

    if !outline.figures.is_empty() {
        println!();
        println!("{}", "Figures".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for figure in &outline.figures {
            println!(
                "  {} {}",
                figure.alt.as_deref().unwrap_or_default(),
                figure.src.as_deref().unwrap_or_default().dimmed()
            );
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}

fn progress_bar(len: usize) -> CliResult<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn print_done(path: &Path, result: &NormalizeResult) {
    if !result.changed() {
        println!("{} {} unchanged", "OK:".green().bold(), path.display());
        return;
    }

    let report = &result.report;
    println!(
        "{} renumbered {} ({} pages, {} paragraphs, {} figures)",
        "OK:".green().bold(),
        path.display(),
        report.page_count,
        report.paragraph_count(),
        report.figure_count
    );
}

fn print_failed(outcome: &FileOutcome, error: &pagemark::Error) {
    eprintln!(
        "{} {}: {}",
        "FAILED:".red().bold(),
        outcome.path.display(),
        error
    );
}

fn cmd_version() {
    println!("{} {}", "pagemark".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Page, paragraph and figure renumbering for HTML books");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagemark".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["pagemark"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.inputs.is_empty());
    }

    #[test]
    fn test_style_flags_map_onto_options() {
        let cli = Cli::try_parse_from([
            "pagemark",
            "--indent",
            "4",
            "--caption-label",
            "Fig. ",
            "--figure-class",
            "figure",
            "book.html",
        ])
        .unwrap();
        let options = cli.style.options();

        assert_eq!(options.indent_width, 4);
        assert_eq!(options.caption_label, "Fig. ");
        assert_eq!(options.caption_separator, NormalizeOptions::default().caption_separator);
        assert_eq!(options.figure_class, "figure");
        assert_eq!(cli.inputs, vec![PathBuf::from("book.html")]);
    }

    #[test]
    fn test_run_rejects_output_with_many_inputs() {
        let inputs = vec![PathBuf::from("a.html"), PathBuf::from("b.html")];
        let result = cmd_run(&inputs, None, true, &NormalizeOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_run_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.html");
        let output = dir.path().join("out.html");
        fs::write(&input, "<section class=\"page\"><p>x</p></section>\n").unwrap();

        let ok = cmd_run(&[input.clone()], Some(output.as_path()), false, &NormalizeOptions::default()).unwrap();

        assert!(ok);
        assert!(fs::read_to_string(&output).unwrap().contains("id=\"p1-1\""));
        assert_eq!(
            fs::read_to_string(&input).unwrap(),
            "<section class=\"page\"><p>x</p></section>\n"
        );
    }

    #[test]
    fn test_check_reports_dirty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "<section class=\"page\"></section>\n").unwrap();
        let options = NormalizeOptions::default();

        assert!(!cmd_check(&[path.clone()], &options).unwrap());

        pagemark::normalize_file(&path, &options).unwrap();
        assert!(cmd_check(&[path], &options).unwrap());
    }

    #[test]
    fn test_empty_caption_separator_is_rejected() {
        let cli = Cli::try_parse_from(["pagemark", "--caption-separator", "", "book.html"]).unwrap();
        let options = cli.style.options();

        let result = cmd_check(&cli.inputs, &options);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_batch_of_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.html");
        let b = dir.path().join("b.html");
        fs::write(&a, "<section class=\"page\"><p>x</p></section>\n").unwrap();
        fs::write(&b, "<section class=\"page\"></section>\n").unwrap();

        let ok = cmd_run(&[a.clone(), b], None, false, &NormalizeOptions::default()).unwrap();

        assert!(ok);
        assert!(fs::read_to_string(&a).unwrap().contains("id=\"p1-1\""));
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let text = "あ".repeat(100);
        let out = preview(&text);
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 1);
        assert!(out.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }
}
