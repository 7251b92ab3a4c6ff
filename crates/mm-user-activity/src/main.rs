use anyhow::Context;
use mm_user_activity::{Config, ConfigError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = match Config::parse_from(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Args(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };

    init_tracing(&config.log_level);
    info!(
        site = %config.site_url,
        token_file = %config.token_file.display(),
        "starting user export"
    );

    let report = mm_user_activity::run(&config)
        .await
        .context("user export failed")?;

    info!(users = report.rows, outfile = %report.path.display(), "done");
    Ok(())
}
