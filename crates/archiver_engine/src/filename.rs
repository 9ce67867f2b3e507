/// `{last path segment of url}.{extension}`.
///
/// Distinct URLs sharing a last segment map to the same file; the archive
/// treats the second one as already saved.
pub fn filename_from_url(url: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    let without_suffix = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/');
    let segment = without_suffix.rsplit('/').next().unwrap_or(without_suffix);
    format!("{segment}.{extension}")
}
