use std::sync::Arc;

use anyhow::Context;

use covid_dash::config::DashboardConfig;
use covid_dash::data::provider::fetch_tables;
use covid_dash::{server, Dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading configuration")?;
    let addr = config.socket_addr()?;

    let data = fetch_tables(&config.historical_source, &config.latest_source)
        .await
        .context("loading dashboard tables")?;
    let dashboard = Arc::new(Dashboard::new(data)?);

    server::serve(dashboard, addr, &config.assets_dir).await
}
