//! Terminal rendering of pair records

use crate::inspector::{PairRecord, TokenInfo, LP_TOKEN_DECIMALS};

use console::style;

const EXPLORER_URL: &str = "https://etherscan.io/address";

pub fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔍 PAIRLENS - Uniswap V2 Pair Inspector").cyan().bold()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

pub fn print_record(record: &PairRecord) {
    println!(
        "{} {}",
        style(format!("{} / {} Pair", record.token0.symbol, record.token1.symbol))
            .green()
            .bold(),
        style(format!("@ block {}", record.block_number)).dim()
    );
    println!("  Address:        {}", record.pair_address);
    println!(
        "  Explorer:       {}",
        style(format!("{}/{}", EXPLORER_URL, record.pair_address)).underlined()
    );
    println!();

    print_token("Token 0", &record.token0, &record.reserves.reserve0);
    print_token("Token 1", &record.token1, &record.reserves.reserve1);

    println!("  {}", style("Pool").bold());
    println!(
        "    LP Supply:    {} ({} raw, {} decimals assumed)",
        format_amount(record.total_supply),
        record.total_supply_raw,
        LP_TOKEN_DECIMALS
    );
    if let Some(price) = record.token0_price() {
        println!(
            "    Price:        1 {} = {} {}",
            record.token0.symbol,
            format_amount(price),
            record.token1.symbol
        );
    }
    if let Some(price) = record.token1_price() {
        println!(
            "                  1 {} = {} {}",
            record.token1.symbol,
            format_amount(price),
            record.token0.symbol
        );
    }
    match record.reserves.last_updated() {
        Some(ts) => println!(
            "    Last Sync:    {} ({})",
            ts.format("%Y-%m-%d %H:%M:%S UTC"),
            record.reserves.block_timestamp_last
        ),
        None => println!("    Last Sync:    {}", record.reserves.block_timestamp_last),
    }
    println!();
}

pub fn print_error(message: &str) {
    println!("{} {}", style("✗").red().bold(), style(message).red());
}

fn print_token(label: &str, token: &TokenInfo, raw_reserve: &str) {
    println!(
        "  {} {}",
        style(label).bold(),
        style(format!("{} ({})", token.symbol, token.name)).yellow()
    );
    println!("    Address:      {}", token.address);
    println!("    Decimals:     {}", token.decimals);
    println!(
        "    Reserve:      {} {} ({} raw)",
        format_amount(token.reserve),
        token.symbol,
        raw_reserve
    );
    println!();
}

/// At most 6 fraction digits, trailing zeros trimmed
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.6}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');

    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1000.0), "1000");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(2.0), "2");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(1.23456789), "1.234568");
        assert_eq!(format_amount(0.0000001), "0");
    }
}
