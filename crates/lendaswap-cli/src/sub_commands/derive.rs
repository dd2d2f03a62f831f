use anyhow::Result;
use clap::Args;
use lendaswap::SwapWallet;

#[derive(Args)]
pub struct DeriveSubCommand {
    /// Re-derive the keys at this index instead of reserving the next one
    #[arg(short, long)]
    index: Option<u32>,
}

pub async fn derive(wallet: &SwapWallet, sub_command_args: &DeriveSubCommand) -> Result<()> {
    let bundle = match sub_command_args.index {
        Some(index) => wallet.derive_swap_params_at_index(index).await?,
        None => wallet.derive_swap_params().await?,
    };

    println!("index: {}", bundle.key_index);
    println!("public key: {}", bundle.public_key_hex());
    println!("hash lock: {}", bundle.hash_lock());
    println!("user id: {}", bundle.user_id_hex());

    Ok(())
}

pub async fn xpub(wallet: &SwapWallet) -> Result<()> {
    println!("{}", wallet.identity_xpub().await?);
    println!("next key index: {}", wallet.key_index().await?);
    Ok(())
}
