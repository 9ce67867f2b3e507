use archiver_core::DATE_NOT_FOUND;
use archiver_engine::{
    markdown_to_html, Converter, ExtractError, Extractor, PostExtractor, PostSelectors,
};
use pretty_assertions::assert_eq;

const DATE_CLASSES: &str = "pencraft pc-reset _color-pub-secondary-text_3axfk_207 \
    _line-height-20_3axfk_95 _font-meta_3axfk_131 _size-11_3axfk_35 _weight-medium_3axfk_162 \
    _transform-uppercase_3axfk_242 _reset_3axfk_1 _meta_3axfk_442";

fn post_page(likes: &str) -> String {
    format!(
        r#"<html><head><title>ignored</title></head><body>
        <article>
            <h1 class="post-title">  On Archives  </h1>
            <h3 class="subtitle">Why we keep things</h3>
            <div class="{DATE_CLASSES}">Mar 3, 2024</div>
            <a class="post-ufi-button style-button"><div class="label">{likes}</div></a>
            <div class="available-content">
                <p>First paragraph with a <a href="https://example.com/ref">reference</a>.</p>
                <p>Second paragraph.</p>
            </div>
        </article></body></html>"#
    )
}

fn extractor() -> PostExtractor {
    PostExtractor::new(&PostSelectors::default()).unwrap()
}

#[test]
fn all_fields_are_extracted() {
    let post = extractor().extract(&post_page("42")).unwrap();

    assert_eq!(post.title, "On Archives");
    assert_eq!(post.subtitle, "Why we keep things");
    assert_eq!(post.date, "Mar 3, 2024");
    assert_eq!(post.like_count, "42");
    assert!(post.markdown.starts_with(
        "# On Archives\n\n## Why we keep things\n\n**Mar 3, 2024**\n\n**Likes:** 42\n\n"
    ));
    assert!(post.markdown.contains("[reference](https://example.com/ref)"));
    assert!(post.markdown.contains("Second paragraph."));
}

#[test]
fn non_numeric_like_label_becomes_zero() {
    let post = extractor().extract(&post_page("cool")).unwrap();
    assert_eq!(post.like_count, "0");

    let negative = extractor().extract(&post_page("-3")).unwrap();
    assert_eq!(negative.like_count, "0");
}

#[test]
fn missing_title_fails_extraction() {
    let html = r#"<div class="available-content"><p>Body</p></div>"#;
    assert_eq!(extractor().extract(html), Err(ExtractError::MissingTitle));

    let blank = r#"<h1 class="post-title">   </h1><div class="available-content"></div>"#;
    assert_eq!(extractor().extract(blank), Err(ExtractError::MissingTitle));
}

#[test]
fn missing_content_container_fails_extraction() {
    let html = r#"<h1 class="post-title">Title</h1><p>Stray body</p>"#;
    assert_eq!(extractor().extract(html), Err(ExtractError::MissingContent));
}

#[test]
fn optional_fields_fall_back_to_defaults() {
    let html = r#"<h2>Plain heading title</h2><div class="available-content"><p>x</p></div>"#;
    let post = extractor().extract(html).unwrap();

    assert_eq!(post.title, "Plain heading title");
    assert_eq!(post.subtitle, "");
    assert_eq!(post.date, DATE_NOT_FOUND);
    assert_eq!(post.like_count, "0");
    assert!(post
        .markdown
        .starts_with("# Plain heading title\n\n**Date not found**\n\n**Likes:** 0\n\n"));
}

#[test]
fn blank_date_element_is_kept_empty() {
    let page = |date_text: &str| {
        format!(
            r#"<h1 class="post-title">Dated</h1><div class="{DATE_CLASSES}">{date_text}</div>
               <div class="available-content"><p>x</p></div>"#
        )
    };

    let whitespace = extractor().extract(&page("   ")).unwrap();
    assert_eq!(whitespace.date, "");

    let empty = extractor().extract(&page("")).unwrap();
    assert_eq!(empty.date, DATE_NOT_FOUND);
}

#[test]
fn invalid_selector_is_reported_at_construction() {
    let selectors = PostSelectors {
        title: "h1[".to_string(),
        ..PostSelectors::default()
    };
    let err = PostExtractor::new(&selectors).err().expect("selector error");
    assert!(matches!(err, ExtractError::InvalidSelector { .. }));
}

struct Shouting;
impl Converter for Shouting {
    fn to_markdown(&self, html: &str) -> String {
        html.to_uppercase()
    }
}

#[test]
fn converter_can_be_swapped() {
    let post = extractor()
        .with_converter(Box::new(Shouting))
        .extract(&post_page("1"))
        .unwrap();
    assert!(post.markdown.contains("SECOND PARAGRAPH."));
}

#[test]
fn long_lines_are_not_wrapped() {
    let sentence = "word ".repeat(60);
    let html = format!(
        r#"<h1 class="post-title">T</h1><div class="available-content"><p>{sentence}</p></div>"#
    );
    let post = extractor().extract(&html).unwrap();
    let body_line = post
        .markdown
        .lines()
        .find(|line| line.starts_with("word"))
        .expect("body line");
    assert!(body_line.len() >= sentence.trim_end().len());
}

#[test]
fn markdown_renders_to_html_with_tables() {
    let html = markdown_to_html("# Head\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
    assert!(html.contains("<h1>Head</h1>"));
    assert!(html.contains("<table>"));
    assert!(html.contains("<del>gone</del>"));
}
