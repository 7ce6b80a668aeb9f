use std::path::PathBuf;
use std::time::Duration;

use site_scan_rs::types::ScanResults;
use site_scan_rs::{probe, scanner, server, sites};
use std::fs::File;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// site-scan-rs — Concurrent website availability scanner with a tiny embedded web UI.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "site-scan-rs",
    version,
    about = "Concurrent website availability scanner with a tiny embedded web UI.",
    long_about = None
)]
struct Cli {
    /// Path to sites list file (`Name | URL` per line). Falls back to the built-in list if missing.
    #[arg(long, default_value = "sites.txt")]
    sites: PathBuf,

    /// Max concurrent probes. If omitted, all sites are probed at once.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-site probe timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = probe::DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Write results as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Start the embedded HTTP UI server instead of running a one-shot scan.
    #[arg(long = "serve-ui", default_value_t = false)]
    serve_ui: bool,

    /// Bind address for the UI server.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "site_scan_rs=info,tower_http=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    println!("site-scan-rs configuration:");
    println!("  sites        : {}", cli.sites.display());
    println!(
        "  concurrency  : {}",
        cli.concurrency
            .map(|n| n.to_string())
            .unwrap_or_else(|| "<unbounded>".to_string())
    );
    println!("  timeout_ms   : {}", cli.timeout_ms);
    println!(
        "  output       : {}",
        cli.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );
    println!("  serve_ui     : {}", cli.serve_ui);

    let site_list = sites::load_sites_or_default(&cli.sites);
    println!("Loaded {} sites", site_list.len());

    let timeout = Duration::from_millis(cli.timeout_ms);

    // Serve the dashboard until Ctrl+C; scans are triggered from the UI.
    if cli.serve_ui {
        let bind = cli.bind.clone();
        let concurrency = cli.concurrency;
        tokio::spawn(async move {
            if let Err(e) = server::spawn_server(&bind, site_list, concurrency, timeout).await {
                eprintln!("HTTP UI server error: {e}");
            }
        });
        println!("UI server starting at http://{} (Ctrl+C to stop)", cli.bind);
        let _ = tokio::signal::ctrl_c().await;
        return Ok(());
    }

    let results = scanner::scan_sites(&site_list, cli.concurrency, timeout).await?;
    print_results_table(&results);

    if let Some(path) = cli.output.as_deref() {
        if let Err(e) = write_results_json(path, &results) {
            eprintln!("Failed to write JSON to {}: {}", path.display(), e);
        } else {
            println!("Wrote JSON results to {}", path.display());
        }
    }

    Ok(())
}

fn print_results_table(results: &ScanResults) {
    let mut name_w = 4usize.max("name".len());
    let mut url_w = 3usize.max("url".len());
    for r in &results.sites {
        name_w = name_w.max(r.name.len().min(40));
        url_w = url_w.max(r.url.len().min(60));
    }
    let status_w = 6usize.max("status".len());
    let code_w = 4usize.max("code".len());
    let lat_w = 10usize.max("latency_ms".len());

    println!(
        "\nSites up: {}/{} (scan took {} ms)",
        results.up_count, results.total, results.elapsed_ms
    );
    println!(
        "{:<name_w$}  {:<url_w$}  {:<status_w$}  {:>code_w$}  {:>lat_w$}",
        "name",
        "url",
        "status",
        "code",
        "latency_ms",
        name_w = name_w,
        url_w = url_w,
        status_w = status_w,
        code_w = code_w,
        lat_w = lat_w
    );
    println!(
        "{:-<name_w$}  {:-<url_w$}  {:-<status_w$}  {:-<code_w$}  {:-<lat_w$}",
        "",
        "",
        "",
        "",
        "",
        name_w = name_w,
        url_w = url_w,
        status_w = status_w,
        code_w = code_w,
        lat_w = lat_w
    );
    for r in &results.sites {
        let mut name = r.name.clone();
        if name.len() > 40 {
            name.truncate(40);
        }
        let mut url = r.url.clone();
        if url.len() > 60 {
            url.truncate(60);
        }
        let status = if r.is_up() { "UP" } else { "DOWN" };
        let code = r
            .status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let latency = r
            .response_time
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<name_w$}  {:<url_w$}  {:<status_w$}  {:>code_w$}  {:>lat_w$}",
            name,
            url,
            status,
            code,
            latency,
            name_w = name_w,
            url_w = url_w,
            status_w = status_w,
            code_w = code_w,
            lat_w = lat_w
        );
    }
}

fn write_results_json(path: &std::path::Path, results: &ScanResults) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}
