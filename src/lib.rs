//! # pagemark
//!
//! Structural normalizer for paginated HTML documents.
//!
//! Given a document made of page containers holding headings, paragraphs
//! and figures, pagemark regenerates every derived annotation: page ids and
//! page-number markers, per-page paragraph ids, document-wide figure
//! numbers with caption prefixes, and canonical indentation. The output is
//! a fixed point: normalizing it again changes nothing.
//!
//! ## Quick Start
//!
//! ```
//! let html = r#"<body>
//! <section class="page"><p>Hello</p></section>
//! </body>
//! "#;
//!
//! let normalized = pagemark::normalize(html)?;
//! assert!(normalized.contains(r#"<p id="p1-1" data-para="1">"#));
//! assert_eq!(pagemark::normalize(&normalized)?, normalized);
//! # Ok::<(), pagemark::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Lossless markup tree**: untouched regions come back byte for byte
//! - **Stable numbering**: pages, paragraphs per page, figures per document
//! - **Configurable vocabulary**: tag, class names, caption label, indentation
//! - **Parallel batches**: independent files are processed with Rayon

pub mod error;
pub mod markup;
pub mod model;
pub mod passes;

pub use error::{Error, Result};
pub use markup::Document;
pub use model::{FigureEntry, Outline, PageEntry, ParagraphEntry};
pub use passes::{NormalizeOptions, NormalizeReport, NormalizeResult, Pass, Pipeline};

use std::fs;
use std::path::{Path, PathBuf};

/// Normalize a document with default options.
///
/// # Example
///
/// ```
/// let out = pagemark::normalize("<section class=\"page\"></section>")?;
/// assert!(out.contains("<div class=\"page-number\">1</div>"));
/// # Ok::<(), pagemark::Error>(())
/// ```
pub fn normalize(input: &str) -> Result<String> {
    let result = normalize_with_options(input, &NormalizeOptions::default())?;
    Ok(result.content)
}

/// Normalize a document with custom options.
///
/// # Example
///
/// ```
/// use pagemark::{normalize_with_options, NormalizeOptions};
///
/// let options = NormalizeOptions::new().with_caption("Fig. ", ": ");
/// let result = normalize_with_options("<img class=\"fig\" alt=\"chart\">", &options)?;
/// assert!(result.content.contains("alt=\"Fig. 1: chart\""));
/// assert_eq!(result.report.figure_count, 1);
/// # Ok::<(), pagemark::Error>(())
/// ```
pub fn normalize_with_options(input: &str, options: &NormalizeOptions) -> Result<NormalizeResult> {
    let pipeline = Pipeline::new(options.clone())?;
    Ok(pipeline.run(input))
}

/// Normalize a file in place.
///
/// The file is read as UTF-8 and written back only when its content
/// changes.
///
/// # Example
///
/// ```no_run
/// use pagemark::{normalize_file, NormalizeOptions};
///
/// let result = normalize_file("index.html", &NormalizeOptions::default())?;
/// println!("{} pages", result.report.page_count);
/// # Ok::<(), pagemark::Error>(())
/// ```
pub fn normalize_file<P: AsRef<Path>>(path: P, options: &NormalizeOptions) -> Result<NormalizeResult> {
    let pipeline = Pipeline::new(options.clone())?;
    process_file(&pipeline, path.as_ref(), true)
}

/// Normalize a file without writing it. `changed()` on the result tells
/// whether the file is already normalized.
pub fn check_file<P: AsRef<Path>>(path: P, options: &NormalizeOptions) -> Result<NormalizeResult> {
    let pipeline = Pipeline::new(options.clone())?;
    process_file(&pipeline, path.as_ref(), false)
}

/// Outline of the normalized form of `input`.
pub fn outline(input: &str, options: &NormalizeOptions) -> Result<Outline> {
    let result = normalize_with_options(input, options)?;
    Ok(Outline::parse(&result.content, options))
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    /// The file
    pub path: PathBuf,

    /// Normalization result, or why the file could not be processed
    pub result: Result<NormalizeResult>,
}

impl FileOutcome {
    /// Whether the file was processed.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the file was rewritten (or would be, in check mode).
    pub fn changed(&self) -> bool {
        self.result.as_ref().map_or(false, NormalizeResult::changed)
    }
}

/// Normalize several files in place.
///
/// Files are independent; with the `parallel` feature they are processed
/// concurrently. Outcomes are returned in input order. Fails only when the
/// options are invalid; per-file errors are carried in each outcome.
pub fn normalize_files<P>(paths: &[P], options: &NormalizeOptions) -> Result<Vec<FileOutcome>>
where
    P: AsRef<Path> + Sync,
{
    normalize_files_with_progress(paths, options, true, |_| {})
}

/// Like [`normalize_files`], calling `on_done` as each file finishes. With
/// `write` unset nothing is written (check mode).
pub fn normalize_files_with_progress<P, F>(
    paths: &[P],
    options: &NormalizeOptions,
    write: bool,
    on_done: F,
) -> Result<Vec<FileOutcome>>
where
    P: AsRef<Path> + Sync,
    F: Fn(&FileOutcome) + Sync,
{
    let pipeline = Pipeline::new(options.clone())?;

    let process = |path: &P| {
        let path = path.as_ref();
        let outcome = FileOutcome {
            path: path.to_path_buf(),
            result: process_file(&pipeline, path, write),
        };
        on_done(&outcome);
        outcome
    };

    #[cfg(feature = "parallel")]
    let outcomes = {
        use rayon::prelude::*;
        paths.par_iter().map(process).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes = paths.iter().map(process).collect();

    Ok(outcomes)
}

/// Totals over the files of a batch that were processed.
pub fn batch_report(outcomes: &[FileOutcome]) -> NormalizeReport {
    let mut total = NormalizeReport::new();
    for result in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        total.merge(&result.report);
    }
    total
}

fn process_file(pipeline: &Pipeline, path: &Path, write: bool) -> Result<NormalizeResult> {
    let input = read_document(path)?;
    let result = pipeline.run(&input);

    if write && result.changed() {
        fs::write(path, &result.content)?;
        log::info!(
            "{}: {} pages, {} paragraphs, {} figures",
            path.display(),
            result.report.page_count,
            result.report.paragraph_count(),
            result.report.figure_count
        );
    } else {
        log::debug!("{}: unchanged", path.display());
    }

    Ok(result)
}

fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_default_options() {
        let out = normalize("<section class=\"page\"><p>x</p></section>\n").unwrap();
        assert!(out.contains("<section class=\"page\" id=\"page-1\" data-page=\"1\">"));
        assert!(out.contains("<p id=\"p1-1\" data-para=\"1\">"));
    }

    #[test]
    fn test_normalize_rejects_invalid_options() {
        let options = NormalizeOptions::new().with_figure_class("two words");
        let result = normalize_with_options("<p>x</p>", &options);
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_outline_is_of_normalized_form() {
        let src = "<section class=\"page\"><h1>T</h1><p>a</p></section><section class=\"page\"><img class=\"fig\"></section>";
        let options = NormalizeOptions::default();
        let outline = outline(src, &options).unwrap();

        assert_eq!(outline.pages.len(), 2);
        assert_eq!(outline.paragraph_count(), 2);
        assert_eq!(outline.figures.len(), 1);
        assert!(outline.is_consistent(&options));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = check_file("/nonexistent/index.html", &NormalizeOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_file_outcome_changed() {
        let outcome = FileOutcome {
            path: PathBuf::from("a.html"),
            result: Err(Error::Encoding("invalid utf-8".to_string())),
        };
        assert!(!outcome.is_ok());
        assert!(!outcome.changed());
    }

    #[test]
    fn test_batch_report_skips_failed_files() {
        let options = NormalizeOptions::default();
        let ok = |src: &str| FileOutcome {
            path: PathBuf::from("a.html"),
            result: normalize_with_options(src, &options),
        };
        let outcomes = vec![
            ok("<section class=\"page\"><p>a</p><p>b</p></section>"),
            FileOutcome {
                path: PathBuf::from("b.html"),
                result: Err(Error::Encoding("invalid utf-8".to_string())),
            },
            ok("<section class=\"page\"><img class=\"fig\"></section><section class=\"page\"></section>"),
        ];

        let total = batch_report(&outcomes);
        assert_eq!(total.page_count, 3);
        assert_eq!(total.paragraphs_per_page, vec![2, 0, 0]);
        assert_eq!(total.paragraph_count(), 2);
        assert_eq!(total.figure_count, 1);
        assert!(total.changed);
    }
}
