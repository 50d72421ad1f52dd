use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

use wazuh_discord::discord::config::DEFAULT_TIMEOUT_SECS;
use wazuh_discord::{DeliveryConfig, HttpTransport, NotifyError, SystemClock, exit_code, prepare, read_input, run};

#[derive(Parser)]
#[command(name = "custom-discord")]
#[command(about = "Forward one Wazuh alert (JSON on stdin) to a Discord webhook")]
struct Args {
    /// Read the alert from this file instead of stdin ("-" means stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Dashboard base URL when the alert's integration block has none
    #[arg(long)]
    dashboard_url: Option<String>,

    /// Webhook URL when the alert's integration block has none
    #[arg(long)]
    webhook_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Print the Discord payload instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn delivery_config(&self) -> DeliveryConfig {
        let mut config = DeliveryConfig {
            timeout_secs: self.timeout_secs,
            webhook_url: self.webhook_url.clone(),
            ..DeliveryConfig::default()
        };
        if let Some(url) = &self.dashboard_url {
            config.dashboard_url = url.clone();
        }
        config
    }
}

async fn execute(args: &Args) -> Result<(), NotifyError> {
    let config = args.delivery_config();
    debug!("Delivery config: {:?}", config);
    let input = read_input(args.input.as_deref()).await?;
    debug!("Read {} bytes of alert input", input.len());

    if args.dry_run {
        let (_, payload) = prepare(&input, &SystemClock, &config)?;
        let json = serde_json::to_string_pretty(&payload).map_err(|e| NotifyError::Unexpected(e.into()))?;
        println!("{}", json);
        return Ok(());
    }

    let transport = HttpTransport::new(&config).map_err(|e| NotifyError::Unexpected(e.into()))?;
    run(&input, &transport, &SystemClock, &config).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // stderr belongs to the single ERROR line unless logging is asked for
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    }

    info!("🚀 Starting Wazuh Discord integration");

    let result = execute(&args).await;
    if let Err(e) = &result {
        eprintln!("{}", e.report_line());
    }

    ExitCode::from(exit_code(&result) as u8)
}
