use std::collections::HashSet;

/// Path fragments that mark non-post pages in a publication sitemap.
pub const DEFAULT_EXCLUDED_KEYWORDS: &[&str] = &["about", "archive", "podcast"];

/// Keep every URL that contains none of `keywords`, dropping repeats.
///
/// Order of first occurrence is preserved.
pub fn filter_urls<S: AsRef<str>>(urls: &[String], keywords: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter(|url| {
            keywords
                .iter()
                .all(|keyword| !url.contains(keyword.as_ref()))
        })
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}
