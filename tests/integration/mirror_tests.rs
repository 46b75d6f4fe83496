//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock documentation sites and tempfile
//! output directories to test the full discover-fetch-convert-save cycle.

use async_trait::async_trait;
use docmirror::config::Config;
use docmirror::crawler::PageRenderer;
use docmirror::{Mirror, SiteFamily};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for a mock site
fn create_test_config(base_url: &str, output: &Path, family: SiteFamily) -> Config {
    let mut config = Config::default();
    config.mirror.base_url = base_url.to_string();
    config.mirror.output_dir = output.display().to_string();
    config.mirror.concurrency = 4;
    config.mirror.family = family;
    config.http.timeout_secs = 5;
    config.http.idle_timeout_secs = 1;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

fn sitemap(base_url: &str, paths: &[&str]) -> ResponseTemplate {
    let urls: String = paths
        .iter()
        .map(|p| format!("<url><loc>{}{}</loc></url>", base_url, p))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            urls
        ),
        "application/xml",
    )
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn read(output: &Path, relative: &str) -> String {
    std::fs::read_to_string(output.join(relative))
        .unwrap_or_else(|e| panic!("missing {}: {}", relative, e))
}

#[tokio::test]
async fn test_full_mirror_with_shared_image() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(&server, "/sitemap.xml", sitemap(&base_url, &["/", "/guide/setup"])).await;
    mount_get(
        &server,
        "/",
        html(
            r#"<html><head><title>Home | Acme</title></head><body>
            <nav><a href="/guide/setup">Setup</a></nav>
            <main>
              <h1>Welcome</h1>
              <p>Acme documentation home page.</p>
              <p><img src="/assets/diagram.png" alt="Diagram"></p>
            </main>
            <footer>Copyright Acme</footer>
            </body></html>"#,
        ),
    )
    .await;
    mount_get(
        &server,
        "/guide/setup",
        html(
            r#"<html><body><main>
              <h1>Setup</h1>
              <p>Install the tool, then read <a href="/guide/usage">the usage guide</a>.</p>
              <p><img src="/assets/diagram.png" alt="Diagram"></p>
              <a rel="next" href="/guide/usage">Next</a>
            </main></body></html>"#,
        ),
    )
    .await;
    mount_get(
        &server,
        "/guide/usage",
        html(
            r#"<html><body><article>
              <h1>Usage</h1>
              <p>Run the tool against a site.</p>
              <pre><code class="language-sh">docmirror https://docs.example.com
</code></pre>
            </article></body></html>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/assets/diagram.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89u8, b'P', b'N', b'G']))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), SiteFamily::Generic);
    let stats = Mirror::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.discovered, 3);
    assert_eq!(stats.downloaded, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.images_downloaded, 1);

    let index = read(output.path(), "index.md");
    assert!(index.starts_with("# Welcome\n\nAcme documentation home page."));
    assert!(index.contains("![Diagram](img/diagram.png)"));
    assert!(!index.contains("Copyright"));
    assert!(!index.contains("[Setup]"));
    assert!(index.ends_with('\n'));

    let setup = read(output.path(), "guide/setup.md");
    assert!(setup.contains(&format!("[the usage guide]({}/guide/usage)", base_url)));
    assert!(setup.contains("![Diagram](../img/diagram.png)"));
    assert!(!setup.contains("Next"));

    let usage = read(output.path(), "guide/usage.md");
    assert!(usage.contains("```sh\ndocmirror https://docs.example.com\n```"));

    assert_eq!(
        std::fs::read(output.path().join("img/diagram.png")).unwrap(),
        vec![0x89u8, b'P', b'N', b'G']
    );
}

#[tokio::test]
async fn test_seeded_pages_terminate_without_links() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let pages = ["/", "/p1", "/p2", "/p3", "/p4"];

    mount_get(&server, "/sitemap.xml", sitemap(&base_url, &pages)).await;
    for page in pages {
        mount_get(
            &server,
            page,
            html(&format!(
                "<main><h1>Page {0}</h1><p>Content of page {0}.</p></main>",
                page
            )),
        )
        .await;
    }

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), SiteFamily::Generic);
    let run = Mirror::new(config).unwrap().run();
    let stats = tokio::time::timeout(Duration::from_secs(30), run)
        .await
        .expect("mirror did not terminate")
        .unwrap();

    assert_eq!(stats.discovered, 5);
    assert_eq!(stats.processed(), 5);
    assert_eq!(stats.downloaded, 5);
    for name in ["index.md", "p1.md", "p2.md", "p3.md", "p4.md"] {
        assert!(output.path().join(name).is_file(), "{} not written", name);
    }
}

#[tokio::test]
async fn test_skip_existing_avoids_fetch() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(&server, "/sitemap.xml", sitemap(&base_url, &["/", "/other"])).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<main><h1>Home</h1><p>Fresh home content.</p></main>"))
        .expect(0)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/other",
        html("<main><h1>Other</h1><p>Another page of content.</p></main>"),
    )
    .await;

    let output = tempfile::tempdir().unwrap();
    std::fs::write(output.path().join("index.md"), "old\n").unwrap();

    let mut config = create_test_config(&base_url, output.path(), SiteFamily::Generic);
    config.mirror.skip_existing = true;
    let stats = Mirror::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.downloaded, 1);
    assert_eq!(read(output.path(), "index.md"), "old\n");
    assert!(read(output.path(), "other.md").contains("Another page of content."));
}

#[tokio::test]
async fn test_stub_and_failed_pages_are_counted() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(
        &server,
        "/sitemap.xml",
        sitemap(&base_url, &["/", "/empty", "/broken"]),
    )
    .await;
    mount_get(
        &server,
        "/",
        html("<main><h1>Home</h1><p>Real content lives here.</p></main>"),
    )
    .await;
    mount_get(&server, "/empty", html("<main><h1>Empty</h1><p>tiny</p></main>")).await;
    mount_get(&server, "/broken", ResponseTemplate::new(500)).await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), SiteFamily::Generic);
    let stats = Mirror::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 1);
    assert!(!output.path().join("empty.md").exists());
    assert!(!output.path().join("broken.md").exists());
}

#[tokio::test]
async fn test_base_path_limits_scope() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(
        &server,
        "/docs/",
        html(
            r#"<html><body>
              <nav><a href="/docs/intro">Intro</a><a href="/blog/news">Blog</a></nav>
              <main><h1>Docs</h1><p>Documentation landing page.</p></main>
            </body></html>"#,
        ),
    )
    .await;
    mount_get(
        &server,
        "/docs",
        html(
            r#"<html><body>
              <nav><a href="/docs/intro">Intro</a><a href="/blog/news">Blog</a></nav>
              <main><h1>Docs</h1><p>Documentation landing page.</p></main>
            </body></html>"#,
        ),
    )
    .await;
    mount_get(
        &server,
        "/docs/intro",
        html("<main><h1>Intro</h1><p>Introduction to the product.</p></main>"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/blog/news"))
        .respond_with(html("<main><h1>News</h1><p>Not documentation.</p></main>"))
        .expect(0)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(
        &format!("{}/docs/", base_url),
        output.path(),
        SiteFamily::Mkdocs,
    );
    let stats = Mirror::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.downloaded, 2);
    assert!(read(output.path(), "index.md").contains("Documentation landing page."));
    assert!(read(output.path(), "intro.md").contains("Introduction to the product."));
    assert!(!output.path().join("blog").exists());
}

#[tokio::test]
async fn test_mintlify_manifest_and_raw_source() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(
        &server,
        "/mint.json",
        ResponseTemplate::new(200).set_body_raw(
            r#"{"name":"Acme","navigation":[{"group":"Start","pages":["intro"]}]}"#,
            "application/json",
        ),
    )
    .await;
    mount_get(
        &server,
        "/",
        html(r#"<div id="content-area"><h1>Home</h1><p>Welcome to the docs home.</p></div>"#),
    )
    .await;
    mount_get(
        &server,
        "/intro",
        html(r#"<div id="content-area"><h1>Intro</h1><p>Rendered intro text.</p></div>"#),
    )
    .await;
    mount_get(
        &server,
        "/intro.md",
        ResponseTemplate::new(200).set_body_raw(
            "# Intro\n\n![Logo](/logo.png)\n\nRaw source body.\n",
            "text/markdown",
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), SiteFamily::Mintlify);
    let stats = Mirror::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.downloaded, 2);
    assert_eq!(
        read(output.path(), "intro.md"),
        "# Intro\n\n![Logo](img/logo.png)\n\nRaw source body.\n"
    );
    assert!(read(output.path(), "index.md").contains("Welcome to the docs home."));
    assert!(output.path().join("img/logo.png").is_file());
}

/// Renderer double that serves canned HTML and counts calls
struct CannedRenderer {
    calls: AtomicUsize,
}

#[async_trait]
impl PageRenderer for CannedRenderer {
    async fn render(&self, url: &str) -> docmirror::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "<html><body><main><h1>Rendered</h1><p>Rendered body for {}.</p></main></body></html>",
            url
        ))
    }
}

#[tokio::test]
async fn test_renderer_used_for_client_side_family() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(&server, "/sitemap.xml", sitemap(&base_url, &["/api/overview"])).await;
    Mock::given(method("GET"))
        .and(path("/api/overview"))
        .respond_with(html(r#"<div id="root"></div>"#))
        .expect(0)
        .mount(&server)
        .await;

    let renderer = Arc::new(CannedRenderer {
        calls: AtomicUsize::new(0),
    });

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, output.path(), SiteFamily::Stoplight);
    let stats = Mirror::new(config)
        .unwrap()
        .with_renderer(renderer.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.downloaded, 2);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
    assert!(read(output.path(), "api/overview.md")
        .contains(&format!("Rendered body for {}/api/overview.", base_url)));
}

#[tokio::test]
async fn test_directory_urls_resolve_relative_links() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(
        &server,
        "/docs/sitemap.xml",
        sitemap(&base_url, &["/docs/", "/docs/guide/"]),
    )
    .await;
    mount_get(
        &server,
        "/docs/",
        html(r#"<main><h1>Docs</h1><p>Documentation landing page.</p><p><a href="guide/">Guide</a></p></main>"#),
    )
    .await;
    mount_get(
        &server,
        "/docs/guide/",
        html(
            r#"<main>
              <h1>Guide</h1>
              <p>Read the guide, then continue with <a href="../setup/">setup</a>.</p>
              <p><img src="img/shot.png" alt="Shot"></p>
            </main>"#,
        ),
    )
    .await;
    mount_get(
        &server,
        "/docs/setup/",
        html("<main><h1>Setup</h1><p>Setup instructions live here.</p></main>"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/guide/img/shot.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8, 7, 7]))
        .expect(1)
        .mount(&server)
        .await;
    for slashless in ["/docs", "/docs/guide", "/docs/setup"] {
        Mock::given(method("GET"))
            .and(path(slashless))
            .respond_with(ResponseTemplate::new(404))
            .expect(0)
            .mount(&server)
            .await;
    }

    let output = tempfile::tempdir().unwrap();
    let config = create_test_config(
        &format!("{}/docs/", base_url),
        output.path(),
        SiteFamily::Generic,
    );
    let stats = Mirror::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.downloaded, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.images_downloaded, 1);
    assert_eq!(stats.images_failed, 0);

    let guide = read(output.path(), "guide.md");
    assert!(guide.contains(&format!("[setup]({}/docs/setup/)", base_url)));
    assert!(guide.contains("![Shot](img/shot.png)"));
    assert!(read(output.path(), "setup.md").contains("Setup instructions live here."));
    assert_eq!(std::fs::read(output.path().join("img/shot.png")).unwrap(), vec![7u8, 7, 7]);
}

#[tokio::test]
async fn test_shutdown_finishes_page_in_progress_and_abandons_queue() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_get(&server, "/sitemap.xml", sitemap(&base_url, &["/", "/a", "/b"])).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html(r#"<main><h1>Home</h1><p>Slow home page content.</p><a href="/c">C</a></main>"#)
                .set_delay(Duration::from_millis(1000)),
        )
        .expect(1)
        .mount(&server)
        .await;
    for queued in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(queued))
            .respond_with(html("<main><h1>Queued</h1><p>Should never be fetched.</p></main>"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let output = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&base_url, output.path(), SiteFamily::Generic);
    config.mirror.concurrency = 1;

    let run = Mirror::new(config)
        .unwrap()
        .run_with_shutdown(async {
            tokio::time::sleep(Duration::from_millis(300)).await;
        });
    let stats = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("mirror did not stop after shutdown")
        .unwrap();

    assert_eq!(stats.downloaded, 1);
    assert_eq!(stats.processed(), 1);
    let index = read(output.path(), "index.md");
    assert!(index.starts_with("# Home\n\nSlow home page content."));
    assert!(index.ends_with('\n'));
    for name in ["a.md", "b.md", "c.md"] {
        assert!(!output.path().join(name).exists(), "{} written after shutdown", name);
    }
}
