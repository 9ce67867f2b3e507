use pulldown_cmark::{html, Options, Parser};

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

/// HTML to Markdown keeping hyperlinks; lines are never re-wrapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}

/// Render Markdown to an HTML fragment with tables, footnotes and
/// strikethrough enabled.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
