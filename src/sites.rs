use crate::types::Site;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Parse a sites file content into an ordered list of targets.
///
/// Supported formats per line:
/// - `Name | URL` (first `|` separates the label from the URL)
/// - comments: everything after `#` is ignored
/// - whitespace and blank lines are ignored
///
/// Order is preserved and duplicates are kept: the same site listed twice is
/// probed twice and reported twice.
pub fn parse_sites_str(s: &str) -> Result<Vec<Site>> {
    let mut out: Vec<Site> = Vec::new();

    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        // Strip comments and trim
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        if line.is_empty() {
            continue;
        }

        let Some((name, url)) = line.split_once('|') else {
            bail!("line {line_no}: expected `Name | URL`, got: {line}");
        };
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() {
            bail!("line {line_no}: empty site name");
        }
        validate_url(url).with_context(|| format!("line {line_no}: invalid URL: {url}"))?;

        out.push(Site {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    Ok(out)
}

/// Load a sites list from a file path. Errors if the file cannot be read or parsed.
pub fn load_sites_from_path(path: impl AsRef<Path>) -> Result<Vec<Site>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read sites file: {}", path.as_ref().display()))?;
    parse_sites_str(&content)
}

/// URLs must be absolute http(s); anything else is a configuration error,
/// surfaced at load time rather than reported as a DOWN probe.
fn validate_url(s: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(s).map_err(|e| anyhow::anyhow!(e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("unsupported scheme: {other}"),
    }
}

/// A small built-in registry used when no sites file is given.
/// The shipped `sites.txt` carries the full list.
pub fn default_sites() -> Vec<Site> {
    const DEFAULT: &[(&str, &str)] = &[
        ("IIIT Bangalore (Main)", "https://www.iiitb.ac.in/"),
        ("CSE Department", "https://cse.iiitb.ac.in/"),
        ("DHSS Department", "https://dhss.iiitb.ac.in/"),
        ("DSAI Department", "https://dsai.iiitb.ac.in/"),
        ("ECE Department", "https://ece.iiitb.ac.in/"),
        ("MOSIP", "https://www.mosip.io/"),
        ("COSS", "https://coss.org.in/"),
        ("CDPI", "https://cdpi.dev/"),
        ("Cognitive Science Lab", "https://cognitive.iiitb.ac.in/"),
        ("Innovation Centre", "https://ic.iiitb.ac.in/"),
        ("Web Science Lab", "https://wsl.iiitb.ac.in/"),
        ("RISE", "https://rise.iiitb.ac.in/"),
    ];
    DEFAULT
        .iter()
        .map(|&(name, url)| Site {
            name: name.to_string(),
            url: url.to_string(),
        })
        .collect()
}

/// Load a sites list from a file, or return the built-in list if missing or empty.
pub fn load_sites_or_default(path: impl AsRef<Path>) -> Vec<Site> {
    match load_sites_from_path(&path) {
        Ok(v) if !v.is_empty() => v,
        _ => default_sites(),
    }
}
