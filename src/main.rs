use sider_probe::{ProbeConfig, Prober};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the report
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sider_probe=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ProbeConfig::default();
    debug!("配置: {}", serde_json::to_string(&config)?);
    info!("目标: {} ({} 个模型)", config.base_url, config.models.len());

    let prober = Prober::new(config)?;
    let mut stdout = std::io::stdout();
    // Per-model failures are part of the report, not the exit status.
    prober.run_all(&mut stdout).await?;

    Ok(())
}
