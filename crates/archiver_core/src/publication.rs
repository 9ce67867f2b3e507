use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublicationError {
    #[error("invalid publication url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("publication url {0} has no host")]
    MissingHost(String),
}

/// A publication identified by its base URL.
///
/// The base URL always ends in `/` so endpoint URLs can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    base_url: String,
    writer_name: String,
}

impl Publication {
    pub fn parse(raw: &str) -> Result<Self, PublicationError> {
        let trimmed = raw.trim();
        let parsed = Url::parse(trimmed).map_err(|err| PublicationError::InvalidUrl {
            url: trimmed.to_string(),
            message: err.to_string(),
        })?;
        let writer_name = writer_name_from_url(&parsed)
            .ok_or_else(|| PublicationError::MissingHost(trimmed.to_string()))?;

        let mut base_url = trimmed.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            base_url,
            writer_name,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Short name used to namespace every output path of this publication.
    pub fn writer_name(&self) -> &str {
        &self.writer_name
    }

    pub fn sitemap_url(&self) -> String {
        format!("{}sitemap.xml", self.base_url)
    }

    pub fn feed_url(&self) -> String {
        format!("{}feed.xml", self.base_url)
    }
}

/// First host label, or the second one when the first is `www`.
pub fn writer_name_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let mut labels = host.split('.');
    let first = labels.next()?;
    let name = if first.eq_ignore_ascii_case("www") {
        labels.next().unwrap_or(first)
    } else {
        first
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_www_host_keeps_its_only_label() {
        let url = Url::parse("https://www/").unwrap();
        assert_eq!(writer_name_from_url(&url).as_deref(), Some("www"));
    }

    #[test]
    fn file_urls_have_no_writer_name() {
        let err = Publication::parse("file:///tmp/feed.xml").unwrap_err();
        assert!(matches!(err, PublicationError::MissingHost(_)));
    }
}
