use anyhow::Result;
use bip39::Mnemonic;
use clap::Args;
use lendaswap::{Error, SwapWallet};
use rand::Rng;

#[derive(Args)]
pub struct InitSubCommand {
    /// Import this mnemonic instead of generating one
    #[arg(long)]
    mnemonic: Option<String>,
}

pub async fn init(wallet: &SwapWallet, sub_command_args: &InitSubCommand) -> Result<()> {
    if let Some(mnemonic) = &sub_command_args.mnemonic {
        wallet.import_seed(mnemonic).await?;
        println!("Imported seed, run `recover` to restore earlier swaps");
        return Ok(());
    }

    match wallet.get_seed().await {
        Ok(_) => {
            println!("Wallet already has a seed");
            return Ok(());
        }
        Err(Error::NoSeed) => (),
        Err(err) => return Err(err.into()),
    }

    let mut entropy = [0u8; 16];
    rand::rng().fill(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)?;

    wallet.import_seed(&mnemonic.to_string()).await?;

    println!("Created new seed, write it down:");
    println!("{}", mnemonic);

    Ok(())
}

pub async fn show_seed(wallet: &SwapWallet) -> Result<()> {
    println!("{}", wallet.get_seed().await?);
    Ok(())
}
