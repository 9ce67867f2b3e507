use std::fs;
use std::path::Path;
use std::sync::Mutex;

use archiver_core::{PostOutcome, PostRecord};
use archiver_engine::{
    ArchiveConfig, ArchiveEvent, Archiver, DiscoverySource, NullProgressSink, ProgressSink,
    StoreRoots,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ArchiveEvent>>,
}

impl RecordingSink {
    fn started_totals(&self) -> Vec<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ArchiveEvent::PostStarted { total, .. } => Some(*total),
                _ => None,
            })
            .collect()
    }

    fn outcomes(&self) -> Vec<PostOutcome> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ArchiveEvent::PostFinished { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ArchiveEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn config_for(server: &MockServer, root: &Path) -> ArchiveConfig {
    let mut config = ArchiveConfig::new(server.uri());
    config.roots = StoreRoots {
        markdown_dir: root.join("md"),
        html_dir: root.join("html"),
        data_dir: root.join("data"),
        stylesheet: root.join("assets/css/essay-styles.css"),
    };
    config
}

fn post_page(title: &str, likes: &str) -> String {
    format!(
        r#"<html><body><article>
            <h1 class="post-title">{title}</h1>
            <h3 class="subtitle">A subtitle</h3>
            <a class="post-ufi-button"><div class="label">{likes}</div></a>
            <div class="available-content"><p>Body of {title}.</p></div>
        </article></body></html>"#
    )
}

async fn mount_sitemap(server: &MockServer, slugs: &[&str]) {
    let entries: String = slugs
        .iter()
        .map(|slug| format!("<url><loc>{}/{slug}</loc></url>", server.uri()))
        .collect();
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, html: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .expect(hits)
        .mount(server)
        .await;
}

fn ledger(root: &Path) -> Vec<PostRecord> {
    let raw = fs::read_to_string(root.join("data/127.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn full_run_writes_markdown_html_and_ledger() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/first", "p/second", "about"]).await;
    mount_page(&server, "/p/first", post_page("First", "12"), 1).await;
    mount_page(&server, "/p/second", post_page("Second", "3"), 1).await;

    let archiver = Archiver::direct(config_for(&server, temp.path())).unwrap();
    assert_eq!(archiver.publication().writer_name(), "127");
    let summary = archiver.run(&NullProgressSink).await.unwrap();
    let store = archiver.store();
    assert_eq!(store.ledger_path(), temp.path().join("data/127.json"));
    assert!(store.is_archived(&format!("{}/p/first", server.uri())));

    assert_eq!(summary.source, DiscoverySource::Sitemap);
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.saved, 2);
    assert_eq!((summary.ledger_added, summary.ledger_total), (2, 2));

    let markdown = fs::read_to_string(temp.path().join("md/127/first.md")).unwrap();
    assert!(markdown.starts_with("# First\n\n## A subtitle\n\n**Date not found**\n\n**Likes:** 12\n\n"));
    assert!(markdown.contains("Body of First."));

    let page = fs::read_to_string(temp.path().join("html/127/second.html")).unwrap();
    assert!(page.contains("<title>Second</title>"));
    assert!(page.contains("../../assets/css/essay-styles.css"));

    let records = ledger(temp.path());
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(records[0].like_count, "12");
    assert!(records[0].file_link.ends_with("first.md"));
    assert!(records[0].html_link.ends_with("first.html"));
    assert!(!temp.path().join("html/127.html").exists());
}

#[tokio::test]
async fn second_run_adds_nothing() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/first", "p/second"]).await;
    mount_page(&server, "/p/first", post_page("First", "1"), 1).await;
    mount_page(&server, "/p/second", post_page("Second", "2"), 1).await;

    let archiver = Archiver::direct(config_for(&server, temp.path())).unwrap();
    archiver.run(&NullProgressSink).await.unwrap();
    let before = fs::read_to_string(temp.path().join("md/127/first.md")).unwrap();

    let summary = archiver.run(&NullProgressSink).await.unwrap();
    assert_eq!(summary.saved, 0);
    assert_eq!(summary.already_archived, 2);
    assert_eq!((summary.ledger_added, summary.ledger_total), (0, 2));
    assert_eq!(
        fs::read_to_string(temp.path().join("md/127/first.md")).unwrap(),
        before
    );
    assert_eq!(ledger(temp.path()).len(), 2);
}

#[tokio::test]
async fn limit_counts_every_attempt() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/a", "p/b", "p/c", "p/d", "p/e"]).await;
    mount_page(&server, "/p/a", post_page("A", "0"), 0).await;
    mount_page(&server, "/p/b", post_page("B", "0"), 1).await;
    for route in ["/p/c", "/p/d", "/p/e"] {
        mount_page(&server, route, post_page("Later", "0"), 0).await;
    }
    fs::create_dir_all(temp.path().join("md/127")).unwrap();
    fs::write(temp.path().join("md/127/a.md"), "archived earlier").unwrap();

    let mut config = config_for(&server, temp.path());
    config.post_limit = Some(2);
    let sink = RecordingSink::default();
    let summary = Archiver::direct(config).unwrap().run(&sink).await.unwrap();

    assert_eq!(summary.attempts, 2);
    assert_eq!(
        sink.outcomes(),
        vec![PostOutcome::AlreadyArchived, PostOutcome::Saved]
    );
    assert_eq!(sink.started_totals(), vec![2, 2]);
    assert_eq!(ledger(temp.path()).len(), 1);
}

#[tokio::test]
async fn unextractable_post_writes_nothing() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/untitled"]).await;
    mount_page(
        &server,
        "/p/untitled",
        r#"<div class="available-content"><p>no heading</p></div>"#.to_string(),
        1,
    )
    .await;

    let summary = Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    assert_eq!(summary.unextractable, 1);
    assert!(!temp.path().join("md/127/untitled.md").exists());
    assert!(!temp.path().join("html/127/untitled.html").exists());
    assert!(ledger(temp.path()).is_empty());
}

#[tokio::test]
async fn odd_like_label_is_stored_as_zero() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/cool"]).await;
    mount_page(&server, "/p/cool", post_page("Cool", "cool"), 1).await;

    Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    assert_eq!(ledger(temp.path())[0].like_count, "0");
}

#[tokio::test]
async fn paywalled_post_is_skipped_and_shrinks_the_total() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/gated", "p/open"]).await;
    mount_page(
        &server,
        "/p/gated",
        r#"<h1 class="post-title">Gated</h1><h2 class="paywall-title">Paid only</h2>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/p/open", post_page("Open", "5"), 1).await;

    let sink = RecordingSink::default();
    let summary = Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&sink)
        .await
        .unwrap();

    assert_eq!(summary.paywalled, 1);
    assert_eq!(summary.saved, 1);
    assert_eq!(sink.started_totals(), vec![2, 1]);
    assert!(!temp.path().join("md/127/gated.md").exists());
    assert!(matches!(
        sink.events.lock().unwrap().last(),
        Some(ArchiveEvent::RunFinished(_))
    ));
}

#[tokio::test]
async fn colliding_filenames_keep_the_first_post() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/same", "p/same/"]).await;
    mount_page(&server, "/p/same", post_page("Same", "1"), 1).await;
    mount_page(&server, "/p/same/", post_page("Other", "1"), 0).await;

    let summary = Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    assert_eq!((summary.saved, summary.already_archived), (1, 1));
    let markdown = fs::read_to_string(temp.path().join("md/127/same.md")).unwrap();
    assert!(markdown.starts_with("# Same"));
}

#[tokio::test]
async fn failing_post_does_not_stop_the_run() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/broken", "p/fine"]).await;
    Mock::given(method("GET"))
        .and(path("/p/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/p/fine", post_page("Fine", "9"), 1).await;

    let summary = Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    assert_eq!((summary.failed, summary.saved), (1, 1));
    assert_eq!(ledger(temp.path())[0].title, "Fine");
}

#[tokio::test]
async fn feed_is_used_when_sitemap_is_missing() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let feed = format!(
        "<rss><channel><item><link>{}/p/recent</link></item></channel></rss>",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(feed, "application/rss+xml"))
        .mount(&server)
        .await;
    mount_page(&server, "/p/recent", post_page("Recent", "4"), 1).await;

    let summary = Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    assert_eq!(summary.source, DiscoverySource::Feed);
    assert_eq!(summary.saved, 1);
}

#[tokio::test]
async fn nothing_discovered_still_leaves_an_empty_ledger() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let summary = Archiver::direct(config_for(&server, temp.path()))
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    assert_eq!(summary.source, DiscoverySource::None);
    assert_eq!(summary.attempts, 0);
    assert!(ledger(temp.path()).is_empty());
}

#[tokio::test]
async fn author_index_is_rendered_from_template() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_sitemap(&server, &["p/first"]).await;
    mount_page(&server, "/p/first", post_page("First", "1"), 1).await;

    let template = temp.path().join("author_template.html");
    fs::write(
        &template,
        r#"<h1><!-- AUTHOR_NAME --></h1><script type="application/json" id="essaysData"></script>"#,
    )
    .unwrap();
    let mut config = config_for(&server, temp.path());
    config.index_template = Some(template);

    Archiver::direct(config)
        .unwrap()
        .run(&NullProgressSink)
        .await
        .unwrap();

    let index = fs::read_to_string(temp.path().join("html/127.html")).unwrap();
    assert!(index.starts_with("<h1>127</h1>"));
    assert!(index.contains("\"title\": \"First\""));
}

#[test]
fn invalid_publication_url_is_rejected() {
    let config = ArchiveConfig::new("::nope::");
    assert!(Archiver::direct(config).is_err());
}
