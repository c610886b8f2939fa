use anyhow::Context;
use clap::Parser;
use feedback_relay::utils::error::ErrorCategory;
use feedback_relay::utils::{logger, validation::Validate};
use feedback_relay::{CliConfig, FeedbackRelay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting feedback-relay CLI");

    let config = match cli.relay_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.category()));
        }
    };

    let relay = FeedbackRelay::from_config(&config).context("failed to build relay")?;
    let event = cli.to_event().context("failed to read input text")?;

    match relay.relay(&event).await {
        Ok(feedback) => {
            println!("{}", feedback);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Feedback request failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.category()));
        }
    }
}

fn exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Client => 1,
        ErrorCategory::Upstream => 2,
        ErrorCategory::Config => 3,
        ErrorCategory::Internal => 4,
    }
}
