use anyhow::Result;
use clap::Args;
use lendaswap::SwapWallet;

#[derive(Args)]
pub struct ClaimSubCommand {
    /// Swap id
    id: String,
}

pub async fn claim(wallet: &SwapWallet, sub_command_args: &ClaimSubCommand) -> Result<()> {
    // Latest status first, claim gating reads the stored record
    wallet.get_swap(&sub_command_args.id).await?;

    match wallet.claim(&sub_command_args.id).await? {
        Some(txid) => println!("Claimed in {}", txid),
        None => println!("Preimage revealed, the relay completes the claim"),
    }

    Ok(())
}

#[derive(Args)]
pub struct RefundSubCommand {
    /// Swap id
    id: String,
    /// Arkade address receiving the refund
    refund_address: String,
}

pub async fn refund(wallet: &SwapWallet, sub_command_args: &RefundSubCommand) -> Result<()> {
    wallet.get_swap(&sub_command_args.id).await?;

    let txid = wallet
        .refund(&sub_command_args.id, &sub_command_args.refund_address)
        .await?;

    println!("Refunded in {}", txid);

    Ok(())
}
