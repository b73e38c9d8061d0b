//! Yahoo Finance price history source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use stocklens_core::error::DataError;
use stocklens_core::traits::PriceSource;
use stocklens_core::types::{Bar, Fundamentals, PriceSeries};
use tracing::{debug, info, warn};

/// Yahoo source configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Exchange calendar used to turn bar timestamps into trading dates
    pub timezone: Tz,
    pub timeout: Duration,
    /// Query the quote-summary endpoint for fundamentals
    pub fetch_fundamentals: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timezone: chrono_tz::America::New_York,
            timeout: Duration::from_secs(30),
            fetch_fundamentals: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Daily bars from the Yahoo v8 chart endpoint.
pub struct YahooSource {
    config: YahooConfig,
    client: Client,
}

impl YahooSource {
    /// Create a new Yahoo source.
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Mozilla/5.0 (compatible; stocklens)"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Unix seconds of local midnight on `date` in the exchange calendar.
    fn local_midnight(&self, date: NaiveDate) -> Result<i64, DataError> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|dt| self.config.timezone.from_local_datetime(&dt).earliest())
            .map(|dt| dt.timestamp())
            .ok_or_else(|| DataError::Internal(format!("no local midnight for {}", date)))
    }

    async fn get_json(&self, url: &str, symbol: &str) -> Result<Value, DataError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        if let Some(err) = status_error(status, retry_after_secs(resp.headers()), symbol) {
            if !err.is_transient() {
                let text = resp.text().await.unwrap_or_default();
                debug!("{} body for {}: {}", status, symbol, text);
            }
            return Err(err);
        }

        resp.json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))
    }

    async fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.config.base_url,
            symbol,
            self.local_midnight(start)?,
            self.local_midnight(end)?,
        );
        debug!("Fetching chart: {}", url);

        let body = self.get_json(&url, symbol).await?;
        let chart: ChartResponse =
            serde_json::from_value(body).map_err(|e| DataError::ParseError(e.to_string()))?;
        let bars = parse_chart(symbol, chart, self.config.timezone)?;

        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect())
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Fundamentals {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=summaryProfile,summaryDetail,financialData",
            self.config.base_url, symbol
        );

        match self.get_json(&url, symbol).await {
            Ok(body) => parse_fundamentals(&body),
            Err(e) => {
                debug!("Fundamentals unavailable for {}: {}", symbol, e);
                Fundamentals::default()
            }
        }
    }
}

#[async_trait]
impl PriceSource for YahooSource {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let bars = self.fetch_bars(symbol, start, end).await?;
        info!("Fetched {} bars for {} ({} to {})", bars.len(), symbol, start, end);

        let fundamentals = if self.config.fetch_fundamentals && !bars.is_empty() {
            self.fetch_fundamentals(symbol).await
        } else {
            Fundamentals::default()
        };

        Ok(PriceSeries::new(symbol, bars)?.with_fundamentals(fundamentals))
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Map a non-success HTTP status to a data error. `None` for success.
fn status_error(
    status: StatusCode,
    retry_after_secs: Option<u64>,
    symbol: &str,
) -> Option<DataError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Some(DataError::RateLimited { retry_after_secs })
    } else if status == StatusCode::NOT_FOUND {
        Some(DataError::SymbolNotFound(symbol.to_string()))
    } else if status.is_server_error() {
        Some(DataError::ConnectionError(format!("HTTP {} for {}", status, symbol)))
    } else if !status.is_success() {
        Some(DataError::Internal(format!("HTTP {} for {}", status, symbol)))
    } else {
        None
    }
}

/// `Retry-After` in whole seconds. The HTTP-date form is ignored.
fn retry_after_secs(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Turn a chart response into ordered daily bars.
///
/// Rows with any missing field are dropped. When the provider repeats a
/// trading date the later row wins.
fn parse_chart(symbol: &str, resp: ChartResponse, tz: Tz) -> Result<Vec<Bar>, DataError> {
    if let Some(err) = resp.chart.error {
        return Err(if err.code == "Not Found" {
            DataError::SymbolNotFound(symbol.to_string())
        } else {
            DataError::Internal(format!("{}: {}", err.code, err.description))
        });
    }

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<Bar> = Vec::with_capacity(data.timestamp.len());
    let mut dropped = 0usize;

    for (i, &ts) in data.timestamp.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten().filter(|x| x.is_finite());
        let row = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        );

        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            dropped += 1;
            continue;
        };

        let date = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&tz).date_naive())
            .ok_or_else(|| DataError::ParseError(format!("invalid timestamp: {}", ts)))?;

        bars.push(Bar::new(date, open, high, low, close, volume));
    }

    if dropped > 0 {
        warn!("Dropped {} incomplete rows for {}", dropped, symbol);
    }

    bars.sort_by_key(|b| b.date);
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();

    Ok(bars)
}

/// Read `module.field.raw` as a number.
fn raw_number(body: &Value, module: &str, field: &str) -> Option<f64> {
    body.pointer("/quoteSummary/result/0")?
        .get(module)?
        .get(field)?
        .get("raw")?
        .as_f64()
}

/// Extract fundamentals, falling back to defaults for anything missing.
fn parse_fundamentals(body: &Value) -> Fundamentals {
    let defaults = Fundamentals::default();

    Fundamentals {
        sector: body
            .pointer("/quoteSummary/result/0/summaryProfile/sector")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(defaults.sector),
        market_cap: raw_number(body, "summaryDetail", "marketCap").unwrap_or(defaults.market_cap),
        pe_ratio: raw_number(body, "summaryDetail", "trailingPE").unwrap_or(defaults.pe_ratio),
        beta: raw_number(body, "summaryDetail", "beta").unwrap_or(defaults.beta),
        dividend_yield: raw_number(body, "summaryDetail", "dividendYield")
            .map(|y| y * 100.0)
            .unwrap_or(defaults.dividend_yield),
        debt_to_equity: raw_number(body, "financialData", "debtToEquity")
            .unwrap_or(defaults.debt_to_equity),
    }
}
