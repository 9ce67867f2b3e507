use serde::{Deserialize, Serialize};

/// Placeholder stored when a post carries no date element.
pub const DATE_NOT_FOUND: &str = "Date not found";

/// A post as extracted from its rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub like_count: String,
    pub markdown: String,
}

impl Post {
    pub fn into_record(self, file_link: String, html_link: String) -> PostRecord {
        PostRecord {
            title: self.title,
            subtitle: self.subtitle,
            like_count: self.like_count,
            date: self.date,
            file_link,
            html_link,
        }
    }
}

/// One ledger entry. Field order matches the on-disk JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub subtitle: String,
    pub like_count: String,
    pub date: String,
    pub file_link: String,
    pub html_link: String,
}

/// Append each incoming record that is not already in `existing`.
///
/// Returns the number of records appended. Existing entries are never touched.
pub fn merge_records(existing: &mut Vec<PostRecord>, incoming: Vec<PostRecord>) -> usize {
    let mut added = 0;
    for record in incoming {
        if !existing.contains(&record) {
            existing.push(record);
            added += 1;
        }
    }
    added
}
