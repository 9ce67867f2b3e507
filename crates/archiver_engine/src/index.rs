use std::fs;
use std::path::{Path, PathBuf};

use archiver_core::PostRecord;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::store::to_pretty_json;

const AUTHOR_MARKER: &str = "<!-- AUTHOR_NAME -->";
const DATA_PLACEHOLDER: &str = r#"<script type="application/json" id="essaysData"></script>"#;
const AUTHOR_TOKEN: &str = "author_name";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot read template {path}: {source}")]
    Template {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot read ledger {path}: {message}")]
    Ledger { path: String, message: String },
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Render `{html_root}/{writer}.html` from `template`, embedding the ledger
/// as the page's essay data.
pub fn render_author_index(
    template: &Path,
    html_root: &Path,
    writer_name: &str,
    ledger: &Path,
) -> Result<PathBuf, IndexError> {
    let ledger_err = |message: String| IndexError::Ledger {
        path: ledger.display().to_string(),
        message,
    };
    let raw = fs::read_to_string(ledger).map_err(|e| ledger_err(e.to_string()))?;
    let essays: Vec<PostRecord> =
        serde_json::from_str(&raw).map_err(|e| ledger_err(e.to_string()))?;
    let embedded = to_pretty_json(&essays).map_err(|e| ledger_err(e.to_string()))?;

    let template_html = fs::read_to_string(template).map_err(|source| IndexError::Template {
        path: template.display().to_string(),
        source,
    })?;

    let page = fill_template(&template_html, writer_name, &embedded);
    let writer = AtomicFileWriter::new(html_root.to_path_buf());
    Ok(writer.write(&format!("{writer_name}.html"), &page)?)
}

fn fill_template(template: &str, writer_name: &str, essays_json: &str) -> String {
    let data_script =
        format!(r#"<script type="application/json" id="essaysData">{essays_json}</script>"#);
    template
        .replace(AUTHOR_MARKER, writer_name)
        .replace(DATA_PLACEHOLDER, &data_script)
        .replace(AUTHOR_TOKEN, writer_name)
}
