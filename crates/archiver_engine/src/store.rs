use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use archiver_core::{merge_records, PostRecord};
use archiver_logging::{archive_debug, archive_info};
use serde::Serialize;

use crate::convert::markdown_to_html;
use crate::filename::filename_from_url;
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError, WriteOutcome};

/// Output roots shared by every publication; each store namespaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRoots {
    pub markdown_dir: PathBuf,
    pub html_dir: PathBuf,
    pub data_dir: PathBuf,
    /// Stylesheet linked from every post page, relative to the working dir.
    pub stylesheet: PathBuf,
}

impl Default for StoreRoots {
    fn default() -> Self {
        Self {
            markdown_dir: PathBuf::from("substack_md_files"),
            html_dir: PathBuf::from("substack_html_pages"),
            data_dir: PathBuf::from("data"),
            stylesheet: PathBuf::from("assets/css/essay-styles.css"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerMerge {
    pub added: usize,
    pub total: usize,
}

/// Per-publication archive: Markdown and HTML files plus the JSON ledger.
///
/// Single writer only; concurrent runs against one ledger lose records.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    markdown: AtomicFileWriter,
    html: AtomicFileWriter,
    data: AtomicFileWriter,
    ledger_filename: String,
    stylesheet: PathBuf,
}

impl ArchiveStore {
    pub fn new(roots: &StoreRoots, writer_name: &str) -> Self {
        Self {
            markdown: AtomicFileWriter::new(roots.markdown_dir.join(writer_name)),
            html: AtomicFileWriter::new(roots.html_dir.join(writer_name)),
            data: AtomicFileWriter::new(roots.data_dir.clone()),
            ledger_filename: format!("{writer_name}.json"),
            stylesheet: roots.stylesheet.clone(),
        }
    }

    /// Create the namespaced output directories up front.
    pub fn prepare(&self) -> Result<(), PersistError> {
        for dir in [self.markdown.dir(), self.html.dir(), self.data.dir()] {
            if !dir.exists() {
                archive_info!("Creating directory {}", dir.display());
            }
            ensure_output_dir(dir)?;
        }
        Ok(())
    }

    pub fn markdown_path(&self, url: &str) -> PathBuf {
        self.markdown.dir().join(filename_from_url(url, "md"))
    }

    pub fn html_path(&self, url: &str) -> PathBuf {
        self.html.dir().join(filename_from_url(url, "html"))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data.dir().join(&self.ledger_filename)
    }

    /// A Markdown file on disk is the canonical "already processed" signal.
    pub fn is_archived(&self, url: &str) -> bool {
        self.markdown_path(url).exists()
    }

    /// Never overwrites: an existing file is left untouched and reported.
    pub fn write_markdown(&self, url: &str, content: &str) -> Result<WriteOutcome, PersistError> {
        let outcome = self
            .markdown
            .write_new(&filename_from_url(url, "md"), content)?;
        if let WriteOutcome::AlreadyExists(path) = &outcome {
            archive_info!("File already exists: {}", path.display());
        }
        Ok(outcome)
    }

    /// Render `markdown` and save it as a standalone page.
    pub fn write_html(&self, url: &str, title: &str, markdown: &str) -> Result<PathBuf, PersistError> {
        let href = relative_href(self.html.dir(), &self.stylesheet);
        let page = wrap_html_document(title, &markdown_to_html(markdown), &href);
        self.html.write(&filename_from_url(url, "html"), &page)
    }

    /// Existing ledger records; an absent file is an empty ledger.
    pub fn load_ledger(&self) -> Result<Vec<PostRecord>, PersistError> {
        let path = self.ledger_path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&content).map_err(|err| PersistError::Json {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Append unseen records to the ledger and write it back.
    pub fn merge_ledger(&self, records: Vec<PostRecord>) -> Result<LedgerMerge, PersistError> {
        let mut ledger = self.load_ledger()?;
        let added = merge_records(&mut ledger, records);
        let json = to_pretty_json(&ledger).map_err(|err| PersistError::Json {
            path: self.ledger_path().display().to_string(),
            message: err.to_string(),
        })?;
        let path = self.data.write(&self.ledger_filename, &json)?;
        archive_debug!("Ledger {} now holds {} records", path.display(), ledger.len());
        Ok(LedgerMerge {
            added,
            total: ledger.len(),
        })
    }
}

/// Four-space indented JSON, non-ASCII written as-is.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn wrap_html_document(title: &str, body_html: &str, stylesheet_href: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="{stylesheet_href}">
</head>
<body>
    <main class="markdown-content">
{body_html}
    </main>
</body>
</html>
"#,
        title = html_escape::encode_text(title),
        stylesheet_href = html_escape::encode_double_quoted_attribute(stylesheet_href),
    )
}

/// Path from `from_dir` to `target` with `/` separators.
fn relative_href(from_dir: &Path, target: &Path) -> String {
    let from = absolute(from_dir);
    let to = absolute(target);
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat("..".to_string()).take(from_parts.len() - common);
    let downs = to_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    ups.chain(downs).collect::<Vec<_>>().join("/")
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
