use serde::{Deserialize, Serialize};

/// A named endpoint to probe. Names are human labels and need not be unique.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub name: String,
    pub url: String,
}

/// Probe classification: UP means the server answered with any HTTP status,
/// DOWN means the request never completed (timeout, DNS, TLS, reset).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SiteStatus {
    Up,
    Down,
}

/// One probe outcome for a single site.
///
/// The serialized shape is the wire contract consumed by the dashboard:
/// `{name, url, status, statusCode, responseTime}` with `null` for absent
/// fields. `statusCode` is present iff UP; `responseTime` is present when UP,
/// and on DOWN only when the failure took longer than the noise floor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteResult {
    pub name: String,
    pub url: String,
    pub status: SiteStatus,
    pub status_code: Option<u16>,
    pub response_time: Option<u64>,
}

impl SiteResult {
    pub fn is_up(&self) -> bool {
        self.status == SiteStatus::Up
    }
}

/// Aggregate results and progress counters for one scan.
///
/// `sites` preserves registry order, one entry per configured site,
/// duplicates included.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanResults {
    pub total: u64,
    pub checked: u64,
    pub up_count: u64,
    pub started_at: String,
    pub elapsed_ms: u64,
    pub sites: Vec<SiteResult>,
}
