/// Prefix the converted body with the post's metadata block.
pub fn build_markdown_document(
    title: &str,
    subtitle: &str,
    date: &str,
    like_count: &str,
    body_markdown: &str,
) -> String {
    let mut doc = format!("# {title}\n\n");
    if !subtitle.is_empty() {
        doc.push_str(&format!("## {subtitle}\n\n"));
    }
    doc.push_str(&format!("**{date}**\n\n"));
    doc.push_str(&format!("**Likes:** {like_count}\n\n"));
    doc.push_str(body_markdown);
    doc
}
