use booking_esb::core::Storage;
use booking_esb::utils::error::{EsbError, ErrorSeverity};
use booking_esb::utils::{logger, validation::Validate};
use booking_esb::{app, CliConfig, Gateway, GatewayConfig, HttpTransport, LocalStorage};
use clap::Parser;

fn report_and_exit(e: &EsbError) -> ! {
    tracing::error!(
        "❌ booking-esb failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting booking-esb");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        report_and_exit(&e);
    }

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = match GatewayConfig::from_file(&cli.config).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => report_and_exit(&e),
    };

    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let output = match app::execute(&gateway, &cli.command, cli.format).await {
        Ok(output) => output,
        Err(e) => report_and_exit(&e),
    };

    match &cli.output {
        Some(path) => {
            let storage = LocalStorage::new(".".to_string());
            if let Err(e) = storage.write_file(path, output.as_bytes()).await {
                report_and_exit(&e);
            }
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => println!("{}", output),
    }

    Ok(())
}
