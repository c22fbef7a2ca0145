use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::probe::ProbeResult;

/// Aggregate outcome over every probed address.
///
/// `failed_addresses` keeps the order the results were handed in, which for a
/// fan-out run is completion order. It is not stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub total: usize,
    pub failed_count: usize,
    pub failed_addresses: Vec<Ipv4Addr>,
}

impl Verdict {
    pub fn is_healthy(&self) -> bool {
        self.failed_count == 0
    }

    /// One-line summary in the style monitoring plugins print.
    pub fn summary(&self) -> String {
        if self.is_healthy() {
            format!(
                "OK - all probes ({}/{}) succeeded",
                self.total, self.total
            )
        } else {
            format!(
                "CRITICAL - some probes ({}/{}) failed",
                self.failed_count, self.total
            )
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Fold per-address results into a [`Verdict`]. Pure; never re-sorts.
pub fn aggregate(results: &[ProbeResult]) -> Verdict {
    let failed_addresses: Vec<Ipv4Addr> = results
        .iter()
        .filter(|r| !r.healthy)
        .map(|r| r.address)
        .collect();

    Verdict {
        total: results.len(),
        failed_count: failed_addresses.len(),
        failed_addresses,
    }
}
