use anyhow::Result;
use clap::Args;
use lendaswap::SwapWallet;

#[derive(Args)]
pub struct DeleteSubCommand {
    /// Swap id
    id: String,
}

pub async fn delete(wallet: &SwapWallet, sub_command_args: &DeleteSubCommand) -> Result<()> {
    wallet.delete_swap(&sub_command_args.id).await?;
    println!("Deleted {}", sub_command_args.id);
    Ok(())
}

pub async fn clear(wallet: &SwapWallet) -> Result<()> {
    let deleted = wallet.clear_swap_storage().await?;
    println!("Deleted {} swaps, `recover` restores them from the seed", deleted);
    Ok(())
}
