use anyhow::Result;
use clap::Args;
use lendaswap::api::{EvmChain, GetSwapResponse, TokenId};
use lendaswap::SwapWallet;

use super::print_swap;

#[derive(Args)]
pub struct BtcToEvmSubCommand {
    /// EVM address receiving the tokens
    target_address: String,
    /// Token amount to receive
    target_amount: f64,
    /// Token to receive, e.g. usdc_pol
    target_token: TokenId,
    /// EVM chain
    #[arg(short, long, default_value = "polygon")]
    chain: EvmChain,
}

pub async fn btc_to_evm(wallet: &SwapWallet, sub_command_args: &BtcToEvmSubCommand) -> Result<()> {
    let record = wallet
        .create_btc_to_evm_swap(
            &sub_command_args.target_address,
            sub_command_args.target_amount,
            sub_command_args.target_token.clone(),
            sub_command_args.chain,
        )
        .await?;

    print_swap(&record);
    if let GetSwapResponse::BtcToEvm(response) = &record.response {
        println!(
            "Pay {} sats to {} or the invoice {}",
            response.sats_receive, response.htlc_address_arkade, response.ln_invoice
        );
    }

    Ok(())
}

#[derive(Args)]
pub struct EvmToArkadeSubCommand {
    /// Arkade address receiving the BTC
    target_address: String,
    /// EVM address funding the swap
    user_address: String,
    /// Token amount to send
    source_amount: f64,
    /// Token to send, e.g. usdc_pol
    source_token: TokenId,
    /// EVM chain
    #[arg(short, long, default_value = "polygon")]
    chain: EvmChain,
}

pub async fn evm_to_arkade(
    wallet: &SwapWallet,
    sub_command_args: &EvmToArkadeSubCommand,
) -> Result<()> {
    let record = wallet
        .create_evm_to_arkade_swap(
            &sub_command_args.target_address,
            &sub_command_args.user_address,
            sub_command_args.source_amount,
            sub_command_args.source_token.clone(),
            sub_command_args.chain,
        )
        .await?;

    print_swap(&record);
    if let GetSwapResponse::EvmToBtc(response) = &record.response {
        println!("Fund the EVM HTLC at {}", response.htlc_address_evm);
    }

    Ok(())
}

#[derive(Args)]
pub struct EvmToLightningSubCommand {
    /// Invoice to pay
    bolt11_invoice: String,
    /// EVM address funding the swap
    user_address: String,
    /// Token to send, e.g. usdc_pol
    source_token: TokenId,
    /// EVM chain
    #[arg(short, long, default_value = "polygon")]
    chain: EvmChain,
}

pub async fn evm_to_lightning(
    wallet: &SwapWallet,
    sub_command_args: &EvmToLightningSubCommand,
) -> Result<()> {
    let record = wallet
        .create_evm_to_lightning_swap(
            &sub_command_args.bolt11_invoice,
            &sub_command_args.user_address,
            sub_command_args.source_token.clone(),
            sub_command_args.chain,
        )
        .await?;

    print_swap(&record);
    if let GetSwapResponse::EvmToBtc(response) = &record.response {
        println!("Fund the EVM HTLC at {}", response.htlc_address_evm);
    }

    Ok(())
}
