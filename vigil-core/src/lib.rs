pub mod check;
pub mod dns;
pub mod error;
pub mod fanout;
pub mod output;
pub mod probe;
pub mod validation;
pub mod verdict;

pub use error::{Result, VigilError};
pub use validation::{normalize_host, parse_dns_server};

pub use check::{CheckReport, HealthCheck};
pub use dns::{AddressResolver, DnsResolver};
pub use fanout::FanOutCoordinator;
pub use probe::{Probe, ProbeConfig, ProbeExecutor, ProbeMode, ProbeResult};
pub use verdict::{aggregate, Verdict};

pub use output::{OutputFormat, OutputFormatter};
