use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use vigil_core::output::{get_formatter, OutputFormat};
use vigil_core::{parse_dns_server, CheckReport, DnsResolver, HealthCheck, ProbeConfig};

/// Exit status when every address passed.
const EXIT_OK: i32 = 0;
/// Exit status when any address failed or the host could not be resolved.
const EXIT_CRITICAL: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Resolve a host and health-check every address it points to")]
#[command(version)]
struct Cli {
    /// An FQDN to check
    #[arg(long = "host_name", default_value = "localhost")]
    host_name: String,

    /// Probe over HTTPS instead of HTTP
    #[arg(
        long = "use_ssl",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    use_ssl: bool,

    /// Require plain HTTP to redirect to HTTPS
    #[arg(
        long = "check_redirect_ssl",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    check_redirect_ssl: bool,

    /// Check TLS certificate expiration dates instead of HTTP reachability
    #[arg(
        long = "check_cert_date",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    check_cert_date: bool,

    /// Number of days before expiration at which a certificate fails
    #[arg(long = "cert_warn_days", default_value_t = 90)]
    cert_warn_days: u32,

    /// DNS server to query (port 53 unless given as ip:port)
    #[arg(long = "dns_server", default_value = "8.8.8.8")]
    dns_server: String,

    /// Per-operation probe timeout in seconds
    #[arg(long, default_value_t = 2)]
    timeout: u64,

    /// Output format (human or json)
    #[arg(short, long, default_value = "human")]
    format: String,

    /// List every failing address with its reason
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::new()
            .with_tls(self.use_ssl)
            .with_redirect_to_tls(self.check_redirect_ssl)
            .with_cert_expiry_check(self.check_cert_date)
            .with_cert_warn_days(self.cert_warn_days)
            .with_timeout(Duration::from_secs(self.timeout))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for the summary
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?)
        .init();

    let cli = Cli::parse();

    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();
    let formatter = get_formatter(output_format, cli.verbose);

    let code = match run(&cli).await {
        Ok(report) => {
            println!("{}", formatter.format_report(&report));
            if report.is_healthy() {
                EXIT_OK
            } else {
                EXIT_CRITICAL
            }
        }
        Err(e) => {
            println!("{}", formatter.format_error(&e));
            EXIT_CRITICAL
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli) -> anyhow::Result<CheckReport> {
    let server = parse_dns_server(&cli.dns_server)?;
    let resolver = DnsResolver::new(server);

    let check = HealthCheck::new(resolver, cli.probe_config());
    Ok(check.run(&cli.host_name).await?)
}
