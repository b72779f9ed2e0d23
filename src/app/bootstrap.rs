use std::sync::Arc;

use log::info;

use crate::app::controller::Dashboard;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::ApiClient;
use crate::ui::run_dashboard;

/// Entry point used by `main` to start the interactive dashboard.
pub async fn run(config: Config) -> Result<()> {
    let client = ApiClient::from_config(&config)?;
    info!("Starting dashboard against {}", client.base());
    let mut dashboard = Dashboard::new(Arc::new(client), &config);
    run_dashboard(&mut dashboard).await
}
