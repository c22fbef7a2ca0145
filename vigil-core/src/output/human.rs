use super::OutputFormatter;
use crate::check::CheckReport;
use crate::probe::ProbeResult;

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

/// Monitoring-plugin style output: one summary line, then optional detail.
pub struct HumanFormatter {
    verbose: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Append one line per unhealthy address with its reason.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    fn detail_line(&self, result: &ProbeResult) -> String {
        format!(
            "  {} ({}, {}): {}",
            result.address,
            result.mode,
            format_duration_ms(result.duration_ms),
            result.reason.as_deref().unwrap_or("unhealthy")
        )
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &CheckReport) -> String {
        let mut output = report.verdict.summary();

        if self.verbose {
            for result in report.results.iter().filter(|r| !r.healthy) {
                output.push('\n');
                output.push_str(&self.detail_line(result));
            }
        }

        output
    }

    fn format_error(&self, error: &dyn std::fmt::Display) -> String {
        format!("CRITICAL - {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VigilError;
    use crate::probe::ProbeMode;
    use crate::verdict::aggregate;
    use chrono::Utc;
    use std::net::Ipv4Addr;

    fn report(results: Vec<ProbeResult>) -> CheckReport {
        CheckReport {
            host: "example.com".to_string(),
            mode: ProbeMode::Http,
            addresses: results.iter().map(|r| r.address).collect(),
            verdict: aggregate(&results),
            results,
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(15), "15ms");
        assert_eq!(format_duration_ms(2500), "2.5s");
    }

    #[test]
    fn test_summary_only_by_default() {
        let report = report(vec![
            ProbeResult::healthy(Ipv4Addr::new(192, 0, 2, 1), ProbeMode::Http),
            ProbeResult::unhealthy(Ipv4Addr::new(192, 0, 2, 2), ProbeMode::Http, "down"),
        ]);

        assert_eq!(
            HumanFormatter::new().format_report(&report),
            "CRITICAL - some probes (1/2) failed"
        );
    }

    #[test]
    fn test_verbose_lists_failures() {
        let report = report(vec![
            ProbeResult::healthy(Ipv4Addr::new(192, 0, 2, 1), ProbeMode::Http),
            ProbeResult::unhealthy(
                Ipv4Addr::new(192, 0, 2, 2),
                ProbeMode::Http,
                "no redirect to HTTPS observed",
            )
            .with_duration_ms(40),
        ]);

        let output = HumanFormatter::new().verbose().format_report(&report);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "CRITICAL - some probes (1/2) failed");
        assert_eq!(
            lines[1],
            "  192.0.2.2 (http, 40ms): no redirect to HTTPS observed"
        );
    }

    #[test]
    fn test_format_error() {
        let error = VigilError::NoAddresses("example.com".to_string());
        assert_eq!(
            HumanFormatter::new().format_error(&error),
            "CRITICAL - No A records found for example.com"
        );
    }
}
