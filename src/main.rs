use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment is used as is.
    dotenvy::dotenv().ok();

    ai_llm_service::telemetry::init("info", Level::DEBUG);

    api::start().await?;

    Ok(())
}
