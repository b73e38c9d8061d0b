//! Market overview across a fixed list of instruments.

use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use stocklens_core::traits::PriceSource;
use stocklens_core::types::Bar;
use tracing::{debug, warn};

/// Calendar days fetched per instrument; covers long weekends.
const SNAPSHOT_LOOKBACK_DAYS: i64 = 7;

/// A named instrument in the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Latest session for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    /// Close minus open
    pub change: f64,
    pub change_percent: f64,
}

impl MarketQuote {
    fn unavailable(instrument: &Instrument) -> Self {
        Self {
            name: instrument.name.clone(),
            symbol: instrument.symbol.clone(),
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
        }
    }

    fn from_bar(instrument: &Instrument, bar: &Bar) -> Self {
        let change = bar.close - bar.open;
        let change_percent = if bar.open != 0.0 {
            change / bar.open * 100.0
        } else {
            0.0
        };
        Self {
            name: instrument.name.clone(),
            symbol: instrument.symbol.clone(),
            price: round2(bar.close),
            change: round2(change),
            change_percent: round2(change_percent),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Default overview instruments.
pub fn default_instruments() -> Vec<Instrument> {
    [
        ("S&P 500", "^GSPC"),
        ("VIX (Volatility Index)", "^VIX"),
        ("US 10-Year Yield", "^TNX"),
        ("Bonds", "^TYX"),
        ("USD Index", "DX-Y.NYB"),
        ("Gold", "GC=F"),
        ("Crude Oil", "CL=F"),
        ("Copper Prices", "HG=F"),
        ("Real Estate", "IYR"),
        ("EUR/USD", "EURUSD=X"),
    ]
    .into_iter()
    .map(|(name, symbol)| Instrument::new(name, symbol))
    .collect()
}

/// Fetch every instrument concurrently and quote its latest session.
///
/// Never fails: an instrument that cannot be fetched is quoted as zeros.
pub async fn market_snapshot(
    source: &dyn PriceSource,
    instruments: &[Instrument],
    today: NaiveDate,
) -> Vec<MarketQuote> {
    let end = today + Duration::days(1);
    let start = end - Duration::days(SNAPSHOT_LOOKBACK_DAYS);

    let fetches = instruments.iter().map(|instrument| async move {
        match source.fetch(&instrument.symbol, start, end).await {
            Ok(series) => match series.last() {
                Some(bar) => {
                    debug!("{} ({}) last session {}", instrument.name, instrument.symbol, bar.date);
                    MarketQuote::from_bar(instrument, bar)
                }
                None => {
                    warn!("No recent data for {} ({})", instrument.name, instrument.symbol);
                    MarketQuote::unavailable(instrument)
                }
            },
            Err(e) => {
                warn!("Failed to fetch {} ({}): {}", instrument.name, instrument.symbol, e);
                MarketQuote::unavailable(instrument)
            }
        }
    });

    join_all(fetches).await
}
