//! Financial Modeling Prep (FMP) data provider.
//!
//! Fetches daily close history from FMP's v3 REST API and condenses it to one
//! point per calendar month (the first trading day seen in each month), joins
//! the dividend series by month, and serves symbol search plus quote
//! snapshots for the popular listing. Handles rate limiting, retries with
//! exponential backoff, and the circuit breaker.

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::circuit_breaker::CircuitBreaker;
use super::provider::{
    DataError, PriceHistoryProvider, QuoteSnapshot, SymbolDirectory, SymbolMatch,
};
use crate::domain::PricePoint;

/// Default earliest date requested from the API.
pub const DEFAULT_HISTORY_FLOOR: (i32, u32, u32) = (2000, 1, 1);

/// Curated popular symbols shown when no search query is given.
pub const POPULAR_SYMBOLS: [&str; 8] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA", "META", "JPM",
];

// ── FMP response shapes ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    symbol: Option<String>,
    #[serde(default)]
    historical: Vec<DailyClose>,
}

#[derive(Debug, Deserialize)]
struct DailyClose {
    date: NaiveDate,
    close: f64,
    #[serde(rename = "adjClose")]
    adj_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DividendResponse {
    #[serde(default)]
    historical: Vec<DividendEntry>,
}

#[derive(Debug, Deserialize)]
struct DividendEntry {
    date: NaiveDate,
    #[serde(default)]
    dividend: f64,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    symbol: String,
    name: String,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "exchangeShortName", default)]
    exchange_short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteHit {
    symbol: String,
    price: f64,
    #[serde(default)]
    change: f64,
    #[serde(rename = "changesPercentage", default)]
    changes_percentage: f64,
}

/// FMP market-data provider.
pub struct FmpProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    api_key: String,
    history_floor: NaiveDate,
    max_retries: u32,
    base_delay: Duration,
}

impl FmpProvider {
    pub fn new(api_key: impl Into<String>, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        let (y, m, d) = DEFAULT_HISTORY_FLOOR;
        Self {
            client,
            circuit_breaker,
            base_url: "https://financialmodelingprep.com/api/v3".to_string(),
            api_key: api_key.into(),
            history_floor: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the earliest date requested from the API.
    pub fn with_history_floor(mut self, floor: NaiveDate) -> Self {
        self.history_floor = floor;
        self
    }

    pub fn history_floor(&self) -> NaiveDate {
        self.history_floor
    }

    /// Execute a GET with retry and circuit-breaker logic, parsing JSON.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);

                if !self.circuit_breaker.is_allowed() {
                    return Err(DataError::CircuitBreakerTripped);
                }
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        // Banned or expired key — stop hammering immediately
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(DataError::AuthenticationRequired(
                            "FMP rejected the API key".into(),
                        ));
                    }

                    // Unknown endpoint or symbol path; retrying won't help.
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::Other("HTTP 404 Not Found".into()));
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status}")));
                        continue;
                    }

                    let parsed: T = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!("failed to parse response: {e}"))
                    })?;
                    self.circuit_breaker.record_success();
                    return Ok(parsed);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    fn history_url(&self, symbol: &str) -> String {
        format!(
            "{}/historical-price-full/{symbol}?from={}&apikey={}",
            self.base_url, self.history_floor, self.api_key
        )
    }

    fn dividend_url(&self, symbol: &str) -> String {
        format!(
            "{}/historical-price-full/stock_dividend/{symbol}?apikey={}",
            self.base_url, self.api_key
        )
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?query={}&limit=20&apikey={}",
            self.base_url,
            urlencode(query),
            self.api_key
        )
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!("{}/quote/{symbol}?apikey={}", self.base_url, self.api_key)
    }
}

impl PriceHistoryProvider for FmpProvider {
    fn name(&self) -> &str {
        "financial_modeling_prep"
    }

    fn monthly_history(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let resp: HistoryResponse = self.get_json(&self.history_url(symbol))?;
        let daily = classify_history(resp, symbol, self.history_floor)?;

        let mut points = condense_monthly(daily);

        // Dividends are nice-to-have: a failed fetch degrades to zeros.
        match self.get_json::<DividendResponse>(&self.dividend_url(symbol)) {
            Ok(dividends) => join_dividends(&mut points, &dividends.historical),
            Err(e) => eprintln!("WARNING: no dividend data for {symbol}: {e}"),
        }

        Ok(points)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

impl SymbolDirectory for FmpProvider {
    fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, DataError> {
        let hits: Vec<SearchHit> = self.get_json(&self.search_url(query))?;
        Ok(select_main_listings(hits))
    }

    fn popular_quotes(&self) -> Result<Vec<QuoteSnapshot>, DataError> {
        let mut quotes = Vec::with_capacity(POPULAR_SYMBOLS.len());
        for symbol in POPULAR_SYMBOLS {
            match self.get_json::<Vec<QuoteHit>>(&self.quote_url(symbol)) {
                Ok(hits) => {
                    if let Some(hit) = hits.into_iter().next() {
                        quotes.push(QuoteSnapshot {
                            symbol: hit.symbol,
                            price: hit.price,
                            change: hit.change,
                            change_percent: hit.changes_percentage,
                        });
                    }
                }
                // Best-effort listing: skip symbols whose quote fails, but
                // a tripped breaker means every remaining one would fail too.
                Err(DataError::CircuitBreakerTripped) => break,
                Err(e) => eprintln!("WARNING: quote failed for {symbol}: {e}"),
            }
        }
        Ok(quotes)
    }

    fn popular_symbols(&self) -> &[&str] {
        &POPULAR_SYMBOLS
    }
}

// ── Condensation and selection helpers ──────────────────────────────

/// Map an empty history response to the right error.
///
/// FMP answers `{}` for unknown symbols but echoes the symbol back when it
/// exists and merely has nothing in the requested window.
fn classify_history(
    resp: HistoryResponse,
    symbol: &str,
    floor: NaiveDate,
) -> Result<Vec<DailyClose>, DataError> {
    if !resp.historical.is_empty() {
        return Ok(resp.historical);
    }
    Err(match resp.symbol {
        Some(_) => DataError::NoHistoryInRange {
            symbol: symbol.to_string(),
            floor,
        },
        None => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
    })
}

/// Condense a daily close series to one point per calendar month, keeping the
/// first trading day seen in each month. Input order does not matter.
fn condense_monthly(mut daily: Vec<DailyClose>) -> Vec<PricePoint> {
    daily.sort_by_key(|d| d.date);

    let mut points: Vec<PricePoint> = Vec::new();
    let mut current_month = None;

    for day in daily {
        let month = (day.date.year(), day.date.month());
        if current_month == Some(month) {
            continue;
        }
        current_month = Some(month);
        points.push(PricePoint {
            date: day.date,
            price: day.close,
            adjusted_price: day.adj_close,
            dividend: 0.0,
        });
    }

    points
}

/// Attach dividend cash amounts to the matching calendar month.
fn join_dividends(points: &mut [PricePoint], dividends: &[DividendEntry]) {
    for div in dividends {
        let month = (div.date.year(), div.date.month());
        if let Some(point) = points
            .iter_mut()
            .find(|p| (p.date.year(), p.date.month()) == month)
        {
            point.dividend = div.dividend;
        }
    }
}

/// Pick one main listing per company name.
///
/// Within each name group, prefer a NASDAQ/NYSE listing, then a plain
/// non-derivative symbol (no dots/dashes, not an F-suffix, at most five
/// characters), else the first hit. Group order follows the API's relevance
/// order.
fn select_main_listings(hits: Vec<SearchHit>) -> Vec<SymbolMatch> {
    let mut groups: Vec<(String, Vec<SearchHit>)> = Vec::new();
    for hit in hits {
        match groups.iter_mut().find(|(name, _)| *name == hit.name) {
            Some((_, group)) => group.push(hit),
            None => groups.push((hit.name.clone(), vec![hit])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(_, group)| {
            let us_listing = group.iter().position(|h| {
                let short = h.exchange_short_name.as_deref().unwrap_or("");
                let long = h.exchange.as_deref().unwrap_or("");
                matches!(short, "NASDAQ" | "NYSE") || matches!(long, "NASDAQ" | "NYSE")
            });
            let plain = group.iter().position(|h| {
                !h.symbol.contains('.')
                    && !h.symbol.contains('-')
                    && !h.symbol.ends_with('F')
                    && h.symbol.len() <= 5
            });

            let idx = us_listing.or(plain).unwrap_or(0);
            group.into_iter().nth(idx).map(|hit| SymbolMatch {
                exchange: hit
                    .exchange_short_name
                    .or(hit.exchange)
                    .unwrap_or_else(|| "US".to_string()),
                symbol: hit.symbol,
                name: hit.name,
            })
        })
        .collect()
}

/// Minimal percent-encoding for query strings.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
