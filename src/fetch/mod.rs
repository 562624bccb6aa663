// src/fetch/mod.rs

use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::error::FetchError;

pub mod query;

pub use query::{mask_key, TradeQuery, NUM_OF_ROWS, PAGE_NO};

/// Apartment trade endpoint of the public data portal.
pub const DEFAULT_BASE_URL: &str =
    "https://apis.data.go.kr/1613000/RTMSDataSvcAptTradeDev/getRTMSDataSvcAptTradeDev";

/// Issue one GET for `query` against `base_url` and return the raw body.
///
/// Logs a masked preview of the key and the redacted URL; the key itself
/// never reaches the log.
#[instrument(level = "info", skip_all)]
pub async fn fetch_trades(
    client: &Client,
    base_url: &str,
    query: &TradeQuery,
) -> Result<String, FetchError> {
    let key = query.service_key();
    info!(
        "Using Key: {} (Length: {})",
        mask_key(key),
        key.chars().count()
    );
    info!("URL: {}", query.redacted_url(base_url));

    let url = query.url(base_url)?;
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { status });
    }

    let body = resp.text().await?;
    debug!(bytes = body.len(), %status, "received response");
    Ok(body)
}
