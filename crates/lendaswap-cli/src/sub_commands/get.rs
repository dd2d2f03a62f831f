use anyhow::Result;
use clap::Args;
use lendaswap::SwapWallet;

use super::print_swap;

#[derive(Args)]
pub struct GetSubCommand {
    /// Swap id
    id: String,
    /// Print the full server response
    #[arg(long)]
    json: bool,
}

pub async fn get(wallet: &SwapWallet, sub_command_args: &GetSubCommand) -> Result<()> {
    let record = wallet.get_swap(&sub_command_args.id).await?;

    if sub_command_args.json {
        println!("{}", serde_json::to_string_pretty(&record.response)?);
    } else {
        print_swap(&record);
    }

    Ok(())
}

pub async fn list(wallet: &SwapWallet) -> Result<()> {
    let mut records = wallet.list_all_swaps().await?;
    records.sort_by_key(|record| record.secret_bundle.key_index);

    for record in &records {
        print_swap(record);
    }

    Ok(())
}
