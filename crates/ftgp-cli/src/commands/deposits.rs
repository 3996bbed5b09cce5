use std::sync::Arc;

use anyhow::Result;
use ftgp_application::{DepositWorkflow, LedgerSession};
use ftgp_infrastructure::{ConfigService, connect_ledger};

use super::render;

/// One-shot listing: connect, refresh, print.
pub async fn list(service: &ConfigService) -> Result<()> {
    let config = service.get_config()?;
    let connection = connect_ledger(&config).await?;
    let session = LedgerSession::connect(connection.wallet, connection.ledger).await?;
    let workflow = DepositWorkflow::new(Arc::clone(&session), &config.workflow);

    let deposits = workflow.refresh().await?;
    render::deposits(&deposits);
    Ok(())
}
