use archiver_core::{Post, DATE_NOT_FOUND};
use archiver_logging::archive_debug;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::convert::{Converter, Html2MdConverter};
use crate::header::build_markdown_document;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no title found")]
    MissingTitle,
    #[error("no content container found")]
    MissingContent,
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// CSS selectors locating each post field in a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSelectors {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub like_count: String,
    pub content: String,
}

impl Default for PostSelectors {
    fn default() -> Self {
        Self {
            title: "h1.post-title, h2".to_string(),
            subtitle: "h3.subtitle".to_string(),
            date: "div.pencraft.pc-reset._color-pub-secondary-text_3axfk_207\
                   ._line-height-20_3axfk_95._font-meta_3axfk_131._size-11_3axfk_35\
                   ._weight-medium_3axfk_162._transform-uppercase_3axfk_242\
                   ._reset_3axfk_1._meta_3axfk_442"
                .to_string(),
            like_count: "a.post-ufi-button .label".to_string(),
            content: "div.available-content".to_string(),
        }
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<Post, ExtractError>;
}

/// Field extraction for the platform's post layout.
///
/// Title and content are required; the other fields fall back to defaults.
pub struct PostExtractor {
    title: Selector,
    subtitle: Selector,
    date: Selector,
    like_count: Selector,
    content: Selector,
    converter: Box<dyn Converter>,
}

impl PostExtractor {
    pub fn new(selectors: &PostSelectors) -> Result<Self, ExtractError> {
        Ok(Self {
            title: compile(&selectors.title)?,
            subtitle: compile(&selectors.subtitle)?,
            date: compile(&selectors.date)?,
            like_count: compile(&selectors.like_count)?,
            content: compile(&selectors.content)?,
            converter: Box::new(Html2MdConverter),
        })
    }

    pub fn with_converter(mut self, converter: Box<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }
}

impl Extractor for PostExtractor {
    fn extract(&self, html: &str) -> Result<Post, ExtractError> {
        let doc = Html::parse_document(html);

        let title = first_text(&doc, &self.title)
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::MissingTitle)?;
        let subtitle = first_text(&doc, &self.subtitle).unwrap_or_default();
        // Only a missing element or one without any text gets the placeholder;
        // whitespace-only text trims to an empty date.
        let date = doc
            .select(&self.date)
            .next()
            .map(|node| node.text().collect::<String>())
            .filter(|raw| !raw.is_empty())
            .map(|raw| raw.trim().to_string())
            .unwrap_or_else(|| DATE_NOT_FOUND.to_string());
        let like_count = first_text(&doc, &self.like_count)
            .filter(|l| !l.is_empty() && l.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or_else(|| "0".to_string());

        let content_html = doc
            .select(&self.content)
            .next()
            .map(|node| node.html())
            .ok_or(ExtractError::MissingContent)?;

        let body = self.converter.to_markdown(&content_html);
        archive_debug!(
            "Extracted {:?}: {} bytes of html, {} bytes of markdown",
            title,
            content_html.len(),
            body.len()
        );
        let markdown = build_markdown_document(&title, &subtitle, &date, &like_count, &body);

        Ok(Post {
            title,
            subtitle,
            date,
            like_count,
            markdown,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
