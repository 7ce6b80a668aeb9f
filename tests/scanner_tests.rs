use std::time::Duration;

use site_scan_rs::scanner;
use site_scan_rs::types::{Site, SiteStatus};
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn site(name: &str, url: String) -> Site {
    Site {
        name: name.to_string(),
        url,
    }
}

/// Loopback port 1 is closed; connects are refused near-instantly, which
/// makes this a reliable transport-failure target without leaving the host.
const REFUSED_URL: &str = "http://127.0.0.1:1/";

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn results_preserve_registry_order_regardless_of_completion_order() {
    let server = MockServer::start().await;
    // The slowest target comes first so completion order inverts input order.
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/medium"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sites = vec![
        site("Slow", format!("{}/slow", server.uri())),
        site("Medium", format!("{}/medium", server.uri())),
        site("Fast", format!("{}/fast", server.uri())),
    ];

    let results = scanner::scan_sites(&sites, None, TIMEOUT).await.unwrap();

    assert_eq!(results.sites.len(), sites.len());
    for (i, r) in results.sites.iter().enumerate() {
        assert_eq!(r.name, sites[i].name);
        assert_eq!(r.url, sites[i].url);
        assert_eq!(r.status, SiteStatus::Up);
    }
}

#[tokio::test]
async fn error_statuses_are_still_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sites = vec![
        site("Missing", format!("{}/missing", server.uri())),
        site("Broken", format!("{}/broken", server.uri())),
    ];

    let results = scanner::scan_sites(&sites, None, TIMEOUT).await.unwrap();

    // 4xx/5xx mean "the server answered": UP with the code, never DOWN.
    assert_eq!(results.sites[0].status, SiteStatus::Up);
    assert_eq!(results.sites[0].status_code, Some(404));
    assert_eq!(results.sites[1].status, SiteStatus::Up);
    assert_eq!(results.sites[1].status_code, Some(500));
    assert_eq!(results.up_count, 2);
}

#[tokio::test]
async fn successful_probe_reports_latency() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sites = vec![site("Fast", server.uri())];
    let results = scanner::scan_sites(&sites, None, TIMEOUT).await.unwrap();

    let r = &results.sites[0];
    assert_eq!(r.status, SiteStatus::Up);
    assert_eq!(r.status_code, Some(200));
    assert!(r.response_time.is_some());
}

#[tokio::test]
async fn fast_transport_failure_suppresses_latency() {
    let sites = vec![site("Dead", REFUSED_URL.to_string())];
    let results = scanner::scan_sites(&sites, None, TIMEOUT).await.unwrap();

    let r = &results.sites[0];
    assert_eq!(r.status, SiteStatus::Down);
    assert_eq!(r.status_code, None);
    // A loopback refusal resolves in well under the noise floor, so no
    // latency value is reported for it.
    assert_eq!(r.response_time, None);
}

#[tokio::test]
async fn slow_failure_reports_measured_latency() {
    let server = MockServer::start().await;
    // Response arrives long after the probe timeout: transport-level DOWN.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let sites = vec![site("Hanging", server.uri())];
    let results = scanner::scan_sites(&sites, None, Duration::from_millis(300))
        .await
        .unwrap();

    let r = &results.sites[0];
    assert_eq!(r.status, SiteStatus::Down);
    assert_eq!(r.status_code, None);
    let elapsed = r.response_time.expect("timeout took longer than the noise floor");
    assert!(elapsed > 100);
}

#[tokio::test]
async fn duplicate_sites_get_independent_probes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let twice = site("Twin", server.uri());
    let sites = vec![twice.clone(), twice];
    let results = scanner::scan_sites(&sites, None, TIMEOUT).await.unwrap();

    assert_eq!(results.sites.len(), 2);
    assert!(results.sites.iter().all(|r| r.status == SiteStatus::Up));
    // Mock expectation (2 requests) is verified when `server` drops.
}

#[tokio::test]
async fn empty_registry_yields_empty_results() {
    let results = scanner::scan_sites(&[], None, TIMEOUT).await.unwrap();
    assert_eq!(results.total, 0);
    assert!(results.sites.is_empty());
}

#[tokio::test]
async fn probes_run_concurrently_not_serially() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let sites: Vec<Site> = (0..4)
        .map(|i| site(&format!("S{i}"), server.uri()))
        .collect();

    let started = Instant::now();
    let results = scanner::scan_sites(&sites, None, TIMEOUT).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(results.up_count, 4);
    // Serial probing would take at least 4 x 800ms.
    assert!(
        elapsed < Duration::from_millis(2400),
        "scan took {elapsed:?}, expected concurrent fan-out"
    );
}

#[tokio::test]
async fn concurrency_cap_preserves_contract() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sites: Vec<Site> = (0..6)
        .map(|i| site(&format!("S{i}"), format!("{}/{i}", server.uri())))
        .collect();

    let results = scanner::scan_sites(&sites, Some(2), TIMEOUT).await.unwrap();

    assert_eq!(results.sites.len(), 6);
    for (i, r) in results.sites.iter().enumerate() {
        assert_eq!(r.name, sites[i].name);
        assert_eq!(r.url, sites[i].url);
    }
}
