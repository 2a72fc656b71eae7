use anyhow::Result;
use rota_core::repository::SqliteRepository;
use rota_core::scheduler::{RecurrenceSweeper, SweepConfig};
use std::sync::Arc;

use crate::cli::SweepCommand;

pub async fn sweep(
    repo: SqliteRepository,
    config: SweepConfig,
    command: SweepCommand,
) -> Result<()> {
    let mut sweeper = RecurrenceSweeper::new(Arc::new(repo), config);

    if command.watch {
        println!("Sweeping for missed recurrences; press Ctrl-C to stop.");
        sweeper.run().await;
        Ok(())
    } else {
        let summary = sweeper.sweep_once().await?;
        println!(
            "Swept {} completed recurring task(s): {} spawned, {} failed.",
            summary.examined, summary.spawned, summary.failures
        );
        Ok(())
    }
}
