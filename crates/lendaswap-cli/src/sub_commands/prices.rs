use anyhow::Result;
use clap::Args;
use lendaswap::{ApiUrl, PriceFeed};
use tokio::sync::broadcast::error::RecvError;

#[derive(Args)]
pub struct PricesSubCommand {
    /// Stop after this many updates
    #[arg(short, long)]
    count: Option<usize>,
}

pub async fn prices(api_url: &ApiUrl, sub_command_args: &PricesSubCommand) -> Result<()> {
    let feed = PriceFeed::new(api_url)?;
    let mut receiver = feed.subscribe().await;
    let mut received = 0;

    loop {
        if sub_command_args.count.is_some_and(|count| received >= count) {
            break;
        }

        tokio::select! {
            update = receiver.recv() => match update {
                Ok(update) => {
                    received += 1;
                    for pair in update.pairs {
                        println!(
                            "{} {} {} {} {}",
                            pair.pair,
                            pair.tiers.tier_1,
                            pair.tiers.tier_100,
                            pair.tiers.tier_1000,
                            pair.tiers.tier_5000
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} price updates", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    feed.stop().await;

    Ok(())
}
