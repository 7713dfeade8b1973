use anyhow::Context;
use bookstore_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        data_dir = %settings.storage.data_dir.display(),
        reports_dir = %settings.reports.dir.display(),
        "bookstore-app starting"
    );

    bookstore_app::app::run(settings).await
}
