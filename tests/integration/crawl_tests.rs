//! Integration tests for the crawler
//!
//! Most tests drive the coordinator with a scripted in-memory renderer so
//! crawl graphs, failures and timing are fully controlled. The last group
//! runs the whole pipeline through the HTTP renderer against wiremock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use webharvest::config::{CrawlConfig, OutputFormat};
use webharvest::crawler::{run_crawl, Coordinator, CrawlEvent, CrawlOutcome};
use webharvest::output::write_output;
use webharvest::render::{PageRenderer, RenderError, RenderOptions, RenderedPage, RendererKind};
use webharvest::{HarvestError, PageResult, RunState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the scripted renderer does for one URL
#[derive(Clone)]
enum Script {
    /// Navigation succeeds with this markup
    Page(String),
    /// Navigation times out
    Timeout,
}

#[derive(Default)]
struct Calls {
    opened: Mutex<Vec<String>>,
    shutdowns: AtomicUsize,
}

struct ScriptedRenderer {
    scripts: HashMap<String, Script>,
    delay: Duration,
    release_fails: bool,
    calls: Arc<Calls>,
}

impl ScriptedRenderer {
    fn new(scripts: &[(&str, Script)]) -> (Self, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let renderer = Self {
            scripts: scripts
                .iter()
                .map(|(url, script)| (url.to_string(), script.clone()))
                .collect(),
            delay: Duration::ZERO,
            release_fails: false,
            calls: calls.clone(),
        };
        (renderer, calls)
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing_release(mut self) -> Self {
        self.release_fails = true;
        self
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn open(&self, url: &str, options: &RenderOptions) -> Result<Box<dyn RenderedPage>, RenderError> {
        self.calls.opened.lock().unwrap().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.scripts.get(url) {
            Some(Script::Page(html)) => Ok(Box::new(ScriptedPage { html: html.clone() })),
            Some(Script::Timeout) => Err(RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: options.navigation_timeout.as_millis() as u64,
            }),
            None => Err(RenderError::Http {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn shutdown(&mut self) -> Result<(), RenderError> {
        self.calls.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.release_fails {
            return Err(RenderError::Close("browser went away".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedPage {
    html: String,
}

#[async_trait]
impl RenderedPage for ScriptedPage {
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError> {
        let tag = selector.trim_start_matches(|c: char| !c.is_alphanumeric());
        if self.html.contains(&format!("<{}", tag)) {
            Ok(())
        } else {
            Err(RenderError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// A page titled `title` whose body links to each of `links`
fn page(title: &str, links: &[&str]) -> Script {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    Script::Page(format!(
        "<html><head><title>{}</title></head><body><main><h1>{}</h1>{}</main></body></html>",
        title, title, anchors
    ))
}

fn config(max_pages: usize) -> CrawlConfig {
    let mut config = CrawlConfig::default();
    config.crawl.max_pages = max_pages;
    config
}

async fn crawl(seed: &str, config: &CrawlConfig, renderer: ScriptedRenderer) -> CrawlOutcome {
    Coordinator::new(seed, config, Box::new(renderer))
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap()
}

fn urls(pages: &[PageResult]) -> Vec<&str> {
    pages.iter().map(|p| p.url.as_str()).collect()
}

#[tokio::test]
async fn test_budget_of_one_captures_only_seed() {
    let (renderer, calls) = ScriptedRenderer::new(&[(
        "https://ex.com",
        page("Home", &["/a", "/b", "/c", "https://ex.com/d"]),
    )]);

    let outcome = crawl("https://ex.com", &config(1), renderer).await;

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(outcome.pages[0].url, "https://ex.com");
    assert_eq!(outcome.pages[0].title, "Home");
    assert_eq!(outcome.summary.frontier_remaining, 0);
    assert_eq!(calls.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let (renderer, _) = ScriptedRenderer::new(&[
        ("https://ex.com/", page("Root", &["/a", "/b"])),
        ("https://ex.com/a", page("A", &["/c"])),
        ("https://ex.com/b", page("B", &["/d"])),
        ("https://ex.com/c", page("C", &[])),
        ("https://ex.com/d", page("D", &[])),
    ]);

    let outcome = crawl("https://ex.com/", &config(10), renderer).await;

    assert_eq!(
        urls(&outcome.pages),
        vec![
            "https://ex.com/",
            "https://ex.com/a",
            "https://ex.com/b",
            "https://ex.com/c",
            "https://ex.com/d"
        ]
    );
}

#[tokio::test]
async fn test_navigation_timeout_skips_page_and_continues() {
    let (renderer, calls) = ScriptedRenderer::new(&[
        ("https://ex.com/", page("Root", &["/slow", "/fast"])),
        ("https://ex.com/slow", Script::Timeout),
        ("https://ex.com/fast", page("Fast", &[])),
    ]);

    let outcome = crawl("https://ex.com/", &config(10), renderer).await;

    assert_eq!(urls(&outcome.pages), vec!["https://ex.com/", "https://ex.com/fast"]);
    assert_eq!(outcome.summary.pages_failed, 1);
    assert_eq!(outcome.summary.visited, 3);
    assert!(calls
        .opened
        .lock()
        .unwrap()
        .contains(&"https://ex.com/slow".to_string()));
}

#[tokio::test]
async fn test_failed_pages_do_not_consume_budget() {
    let (renderer, _) = ScriptedRenderer::new(&[
        ("https://ex.com/", page("Root", &["/x", "/y", "/ok"])),
        ("https://ex.com/x", Script::Timeout),
        ("https://ex.com/ok", page("Ok", &[])),
    ]);

    let outcome = crawl("https://ex.com/", &config(2), renderer).await;

    assert_eq!(urls(&outcome.pages), vec!["https://ex.com/", "https://ex.com/ok"]);
    assert_eq!(outcome.summary.pages_failed, 2);
}

#[tokio::test]
async fn test_selector_timeout_still_yields_result() {
    let (renderer, _) = ScriptedRenderer::new(&[("https://ex.com", page("No article", &[]))]);
    let mut config = config(5);
    config.crawl.selector = "article".to_string();

    let outcome = crawl("https://ex.com", &config, renderer).await;

    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(outcome.pages[0].title, "No article");
    assert_eq!(outcome.pages[0].sanitized_html, "");
    assert_eq!(outcome.summary.pages_failed, 0);
}

#[tokio::test]
async fn test_budget_never_exceeded() {
    let pages: Vec<String> = (0..8).map(|i| format!("https://ex.com/p{}", i)).collect();
    let links: Vec<&str> = pages.iter().map(String::as_str).collect();

    for budget in 1..=10 {
        let mut scripts = vec![("https://ex.com/", page("Root", &links))];
        for url in &pages {
            scripts.push((url.as_str(), page(url, &links)));
        }
        let (renderer, _) = ScriptedRenderer::new(&scripts);

        let outcome = crawl("https://ex.com/", &config(budget), renderer).await;
        assert_eq!(outcome.pages.len(), budget.min(9), "budget {}", budget);
    }
}

#[tokio::test]
async fn test_each_url_captured_once() {
    let (renderer, calls) = ScriptedRenderer::new(&[
        ("https://ex.com/", page("Root", &["/a", "/b", "/a#top", "/"])),
        ("https://ex.com/a", page("A", &["/b", "/", "/a"])),
        ("https://ex.com/b", page("B", &["/a#intro", "https://ex.com/"])),
    ]);

    let outcome = crawl("https://ex.com/", &config(10), renderer).await;

    let mut seen = urls(&outcome.pages);
    assert_eq!(seen.len(), 3);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 3);
    assert_eq!(calls.opened.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_out_of_scope_links_not_followed() {
    let (renderer, calls) = ScriptedRenderer::new(&[
        (
            "https://ex.com/docs/",
            page(
                "Docs",
                &["/docs/intro", "/blog/news", "https://other.org/docs/", "mailto:a@ex.com"],
            ),
        ),
        ("https://ex.com/docs/intro", page("Intro", &[])),
        ("https://ex.com/blog/news", page("News", &[])),
    ]);

    let outcome = crawl("https://ex.com/docs/", &config(10), renderer).await;

    assert_eq!(
        urls(&outcome.pages),
        vec!["https://ex.com/docs/", "https://ex.com/docs/intro"]
    );
    assert!(!calls
        .opened
        .lock()
        .unwrap()
        .iter()
        .any(|u| u.contains("blog") || u.contains("other.org")));
}

#[tokio::test]
async fn test_explicit_pattern_overrides_default() {
    let (renderer, _) = ScriptedRenderer::new(&[
        ("https://ex.com/", page("Root", &["/guide/a", "/guide/a/b", "/api"])),
        ("https://ex.com/guide/a", page("A", &[])),
        ("https://ex.com/guide/a/b", page("B", &[])),
        ("https://ex.com/api", page("Api", &[])),
    ]);
    let mut config = config(10);
    config.crawl.pattern = Some("https://ex.com/guide/*".to_string());

    let outcome = crawl("https://ex.com/", &config, renderer).await;

    assert_eq!(urls(&outcome.pages), vec!["https://ex.com/", "https://ex.com/guide/a"]);
}

#[tokio::test]
async fn test_renderer_shut_down_once() {
    let (renderer, calls) = ScriptedRenderer::new(&[("https://ex.com", page("Home", &[]))]);
    crawl("https://ex.com", &config(3), renderer).await;
    assert_eq!(calls.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancellation_keeps_partial_results() {
    let links: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();

    let mut scripts = vec![("https://ex.com/".to_string(), page("Root", &link_refs))];
    for link in &links {
        scripts.push((format!("https://ex.com{}", link), page(link, &[])));
    }
    let script_refs: Vec<(&str, Script)> = scripts
        .iter()
        .map(|(url, script)| (url.as_str(), script.clone()))
        .collect();

    let (renderer, calls) = ScriptedRenderer::new(&script_refs);
    let renderer = renderer.with_delay(Duration::from_millis(20));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new("https://ex.com/", &config(50), Box::new(renderer))
        .unwrap()
        .with_events(tx);

    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        let mut captured = 0;
        while let Some(event) = rx.recv().await {
            if let CrawlEvent::PageCaptured { .. } = event {
                captured += 1;
                if captured == 3 {
                    trigger.cancel();
                }
            }
        }
    });

    let outcome = coordinator.run(cancel).await.unwrap();
    watcher.await.unwrap();

    assert_eq!(outcome.state, RunState::Aborted);
    assert!(outcome.pages.len() >= 3);
    assert!(outcome.pages.len() < 21);
    assert_eq!(outcome.summary.state, RunState::Aborted);
    assert_eq!(calls.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_events_bracket_the_run() {
    let (renderer, _) = ScriptedRenderer::new(&[
        ("https://ex.com/", page("Root", &["/a", "/missing"])),
        ("https://ex.com/a", page("A", &[])),
    ]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    Coordinator::new("https://ex.com/", &config(10), Box::new(renderer))
        .unwrap()
        .with_events(tx)
        .run(CancellationToken::new())
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(CrawlEvent::Started { .. })));
    assert!(matches!(
        events.last(),
        Some(CrawlEvent::Finished {
            state: RunState::Completed,
            captured: 2,
            failed: 1
        })
    ));
    let enqueued = events
        .iter()
        .filter(|e| matches!(e, CrawlEvent::Enqueued { .. }))
        .count();
    assert_eq!(enqueued, 2);
    assert!(events.iter().any(|e| matches!(
        e,
        CrawlEvent::PageFailed { url, .. } if url == "https://ex.com/missing"
    )));
}

#[tokio::test]
async fn test_invalid_seed_fails_before_rendering() {
    let mut config = config(5);
    config.renderer.kind = RendererKind::Chrome;

    let result = run_crawl("not-a-url", &config, CancellationToken::new(), None).await;
    assert!(matches!(result, Err(HarvestError::InvalidSeed(_))));
}

#[tokio::test]
async fn test_unparsable_document_skipped_and_crawl_continues() {
    let (renderer, calls) = ScriptedRenderer::new(&[
        ("https://ex.com", page("Home", &["/empty", "/ok"])),
        ("https://ex.com/empty", Script::Page("   ".to_string())),
        ("https://ex.com/ok", page("Ok", &[])),
    ]);

    let outcome = crawl("https://ex.com", &config(10), renderer).await;

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(urls(&outcome.pages), vec!["https://ex.com", "https://ex.com/ok"]);
    assert_eq!(outcome.summary.pages_failed, 1);
    assert_eq!(calls.opened.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_release_failure_reported_and_pages_kept() {
    let (renderer, calls) = ScriptedRenderer::new(&[
        ("https://ex.com", page("Home", &["/a"])),
        ("https://ex.com/a", page("A", &[])),
    ]);

    let outcome = crawl("https://ex.com", &config(10), renderer.failing_release()).await;

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(urls(&outcome.pages), vec!["https://ex.com", "https://ex.com/a"]);
    assert!(matches!(outcome.release_error, Some(RenderError::Close(_))));
    assert_eq!(calls.shutdowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_browser_launch_failure_is_resource_error() {
    let mut config = config(5);
    config.renderer.kind = RendererKind::Chrome;
    config.renderer.chrome_executable = Some("/nonexistent/chrome".into());

    let result = run_crawl("https://ex.com", &config, CancellationToken::new(), None).await;
    match result {
        Err(HarvestError::Resource(e)) => assert!(e.is_resource_fault()),
        other => panic!("expected a resource error, got {:?}", other.map(|o| o.pages.len())),
    }
}

// ===== End-to-end through the HTTP renderer =====

fn http_config(max_pages: usize) -> CrawlConfig {
    let mut config = config(max_pages);
    config.renderer.kind = RendererKind::Http;
    config.renderer.navigation_timeout_ms = 2_000;
    config.renderer.selector_timeout_ms = 100;
    config
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_crawl_end_to_end() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title><meta name="description" content="Start here"></head>
        <body>
            <nav><a href="/nav-only">Nav</a></nav>
            <main>
                <h1>Welcome</h1>
                <a href="/page1">Page 1</a>
                <a href="/page2#frag">Page 2</a>
                <a href="/broken">Broken</a>
                <a href="https://external.example.org/">Elsewhere</a>
                <img src="data:image/png;base64,AAA"><img src="/b.jpg" alt="B">
            </main>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/page1",
        r#"<html><head><title>One</title></head><body><main><p>First page</p><a href="/">Home</a></main></body></html>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/page2",
        r#"<html><head><title>Two</title></head><body><main><pre><code>fn main() {}</code></pre></main></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = run_crawl(&server.uri(), &http_config(10), CancellationToken::new(), None)
        .await
        .unwrap();

    let base = server.uri();
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(
        urls(&outcome.pages),
        vec![
            base.clone(),
            format!("{}/page1", base),
            format!("{}/page2", base)
        ]
    );
    assert_eq!(outcome.summary.pages_failed, 1);

    let home = &outcome.pages[0];
    assert_eq!(home.title, "Home");
    assert_eq!(home.metadata.get("description").map(String::as_str), Some("Start here"));
    assert_eq!(home.links.external.len(), 1);
    assert!(home.links.internal.iter().all(|l| !l.href.contains("nav-only")));
    assert_eq!(home.media.images.len(), 1);
    assert_eq!(home.media.images[0].src, format!("{}/b.jpg", base));
    assert!(home.markdown.contains("# Welcome"));
    assert!(home.html.contains("<nav>"));
    assert!(!home.sanitized_html.contains("<nav>"));

    assert!(outcome.pages[2].markdown.contains("```"));
}

#[tokio::test]
async fn test_http_crawl_writes_output() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Only</title></head><body><p>Body</p></body></html>"#.to_string(),
    )
    .await;

    let outcome = run_crawl(&server.uri(), &http_config(3), CancellationToken::new(), None)
        .await
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let json_path = dir.path().join("out.json");
    write_output(&outcome.pages, OutputFormat::Json, Some(&json_path)).unwrap();
    let parsed: Vec<PageResult> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed, outcome.pages);

    let md_path = dir.path().join("out.md");
    write_output(&outcome.pages, OutputFormat::Markdown, Some(&md_path)).unwrap();
    let md = std::fs::read_to_string(&md_path).unwrap();
    assert!(md.starts_with("# Only\n\nSource: "));
    assert!(md.contains("Body"));
}
