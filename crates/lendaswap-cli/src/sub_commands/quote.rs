use anyhow::Result;
use clap::Args;
use lendaswap::api::TokenId;
use lendaswap::SwapWallet;

#[derive(Args)]
pub struct QuoteSubCommand {
    /// Source token, e.g. btc_arkade
    from: TokenId,
    /// Target token, e.g. usdc_pol
    to: TokenId,
    /// Amount in sats
    base_amount: u64,
}

pub async fn quote(wallet: &SwapWallet, sub_command_args: &QuoteSubCommand) -> Result<()> {
    let quote = wallet
        .get_quote(
            sub_command_args.from.clone(),
            sub_command_args.to.clone(),
            sub_command_args.base_amount,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&quote)?);

    Ok(())
}

pub async fn tokens(wallet: &SwapWallet) -> Result<()> {
    for token in wallet.get_tokens().await? {
        println!("{}", serde_json::to_string(&token)?);
    }

    for pair in wallet.get_asset_pairs().await? {
        println!("{} -> {}", pair.source.token_id, pair.target.token_id);
    }

    Ok(())
}

pub async fn version(wallet: &SwapWallet) -> Result<()> {
    let version = wallet.get_version().await?;
    println!("{} ({})", version.tag, version.commit_hash);
    Ok(())
}
