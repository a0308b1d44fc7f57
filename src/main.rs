use std::sync::Arc;

use lead_intake::channels::{Channel, TelegramChannel};
use lead_intake::config::FlowConfig;
use lead_intake::flow::{Catalog, FlowController, FlowDeps};
use lead_intake::notify::{MailerConfig, Notifier, SmtpNotifier};
use lead_intake::store::{LeadStore, LibSqlLeadStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Read bot token from environment
    let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_else(|_| {
        eprintln!("Error: TELEGRAM_BOT_TOKEN not set");
        eprintln!("  export TELEGRAM_BOT_TOKEN=123456:ABC-...");
        std::process::exit(1);
    });

    let catalog = Catalog::standard();
    let flow_config = FlowConfig::from_env();

    eprintln!("🤖 Lead Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Questions: {}", catalog.len());

    // ── Lead store ──────────────────────────────────────────────────────
    let db_path = std::env::var("LEAD_INTAKE_DB_PATH")
        .unwrap_or_else(|_| "./data/lead-intake.db".to_string());

    let db_path_ref = std::path::Path::new(&db_path);
    let leads: Arc<dyn LeadStore> = Arc::new(
        LibSqlLeadStore::new_local(db_path_ref)
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open lead store at {}: {}", db_path, e);
                std::process::exit(1);
            }),
    );

    eprintln!("   Database: {}", db_path);

    // ── Operator notifier ───────────────────────────────────────────────
    let notifier: Option<Arc<dyn Notifier>> = match MailerConfig::from_env() {
        Some(mailer_config) => {
            eprintln!(
                "   Notifier: enabled (SMTP: {}, operator: {})",
                mailer_config.smtp_host, mailer_config.notify_address
            );
            Some(Arc::new(SmtpNotifier::new(&mailer_config)?))
        }
        None => {
            eprintln!("   Notifier: disabled (EMAIL_SMTP_HOST / NOTIFY_EMAIL not set)");
            None
        }
    };

    // ── Telegram channel ────────────────────────────────────────────────
    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(bot_token));

    if let Err(e) = channel.health_check().await {
        eprintln!("Error: Telegram health check failed: {}", e);
        std::process::exit(1);
    }
    eprintln!("   Telegram: connected\n");

    // ── Flow ────────────────────────────────────────────────────────────
    let deps = FlowDeps {
        channel,
        leads,
        notifier,
    };

    let controller = FlowController::new(catalog, deps, flow_config);
    controller.run().await?;

    Ok(())
}
