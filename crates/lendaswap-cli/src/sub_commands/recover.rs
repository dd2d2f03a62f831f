use anyhow::Result;
use lendaswap::SwapWallet;

use super::print_swap;

pub async fn recover(wallet: &SwapWallet) -> Result<()> {
    let records = wallet.recover_swaps().await?;

    for record in &records {
        print_swap(record);
    }

    println!(
        "Recovered {} swaps, next key index {}",
        records.len(),
        wallet.key_index().await?
    );

    Ok(())
}
