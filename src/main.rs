use anyhow::Context;
use bookshop_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshop settings")?;
    bookshop_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        port = settings.server.port,
        "bookshop-app bootstrap starting"
    );

    bookshop_app::run(settings).await
}
