//! Market overview command implementation.

use anyhow::Result;
use chrono::Utc;
use stocklens_analysis::{default_instruments, market_snapshot, Instrument, MarketQuote};
use stocklens_config::AppConfig;
use tracing::info;

use super::build_source;
use crate::cli::{MarketArgs, OutputFormat};

pub async fn run(args: MarketArgs, config: &AppConfig) -> Result<()> {
    let instruments = instruments(config);
    info!("Fetching market overview for {} instruments", instruments.len());

    let source = build_source(config, false)?;
    let today = Utc::now()
        .with_timezone(&config.data.timezone()?)
        .date_naive();
    let quotes = market_snapshot(source.as_ref(), &instruments, today).await;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&quotes)?),
        OutputFormat::Text => print!("{}", render(&quotes)),
    }

    Ok(())
}

fn instruments(config: &AppConfig) -> Vec<Instrument> {
    if config.market.instruments.is_empty() {
        return default_instruments();
    }
    config
        .market
        .instruments
        .iter()
        .map(|i| Instrument::new(&i.name, &i.symbol))
        .collect()
}

fn render(quotes: &[MarketQuote]) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{:<28} {:<10} {:>12} {:>10} {:>9}\n",
        "INSTRUMENT", "SYMBOL", "PRICE", "CHANGE", "CHANGE%"
    ));
    s.push_str("───────────────────────────────────────────────────────────────────────\n");
    for q in quotes {
        s.push_str(&format!(
            "{:<28} {:<10} {:>12.2} {:>+10.2} {:>+8.2}%\n",
            q.name, q.symbol, q.price, q.change, q.change_percent
        ));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocklens_config::InstrumentConfig;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::default();
        assert_eq!(instruments(&config), default_instruments());
    }

    #[test]
    fn test_configured_instruments() {
        let mut config = AppConfig::default();
        config.market.instruments = vec![InstrumentConfig {
            name: "Gold".to_string(),
            symbol: "GC=F".to_string(),
        }];
        assert_eq!(instruments(&config), vec![Instrument::new("Gold", "GC=F")]);
    }

    #[test]
    fn test_render_row() {
        let out = render(&[MarketQuote {
            name: "Gold".to_string(),
            symbol: "GC=F".to_string(),
            price: 2345.6,
            change: -12.3,
            change_percent: -0.52,
        }]);
        assert!(out.contains("Gold"));
        assert!(out.contains("2345.60"));
        assert!(out.contains("-0.52%"));
    }
}
