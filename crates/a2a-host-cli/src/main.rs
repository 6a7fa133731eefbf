use a2a_host_cli::{HostClient, SuiteOptions, run_suite};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "a2a-host-check", version, about = "Run black-box checks against an A2A host agent")]
struct Args {
    /// Base URL of the service.
    #[arg(long, env = "A2A_API_BASE_URL", default_value = "http://localhost:8003")]
    base_url: String,

    /// Pause between chat checks, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,

    /// Skip the streaming check.
    #[arg(long)]
    skip_stream: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let client = HostClient::new(&args.base_url).context("invalid --base-url")?;
    let options = SuiteOptions {
        pause: Duration::from_millis(args.pause_ms),
        skip_stream: args.skip_stream,
    };

    println!("Starting A2A host agent checks against {}", client.base_url());
    let report = run_suite(&client, &options).await;

    let mut stdout = std::io::stdout().lock();
    report.render(&mut stdout).context("failed to write report")?;
    drop(stdout);

    std::process::exit(report.exit_code());
}
