use lendaswap::SwapRecord;

pub mod claim;
pub mod create_swap;
pub mod delete;
pub mod derive;
pub mod get;
pub mod init;
pub mod prices;
pub mod quote;
pub mod recover;

/// One line per swap: id, direction, status and key index
pub fn print_swap(record: &SwapRecord) {
    let common = record.response.common();
    println!(
        "{} {} {} index={} fee={} sats amount={}",
        record.id(),
        record.direction(),
        record.status(),
        record.secret_bundle.key_index,
        common.fee_sats,
        common.asset_amount
    );
}
