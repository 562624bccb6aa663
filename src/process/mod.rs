// src/process/mod.rs

use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

use crate::error::ProcessError;

pub mod csv_writer;
pub mod response;

pub use csv_writer::{output_path, write_records};
pub use response::{Header, Record, TradeResponse};

/// How a well-formed response was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// CSV written with `rows` data rows.
    Written { path: PathBuf, rows: usize },
    /// The API answered with a non-success result code.
    Rejected { code: String, message: String },
    /// Success code, but no `<item>` elements.
    Empty,
}

/// Parse `xml` and, if it holds any items, write them as CSV to `path`.
///
/// Nothing is written unless the result is [`Outcome::Written`].
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn convert_response<P: AsRef<Path>>(xml: &str, path: P) -> Result<Outcome, ProcessError> {
    let resp = TradeResponse::parse(xml)?;

    if let (false, Some(h)) = (resp.is_success(), resp.header.as_ref()) {
        error!("API Error: [{}] {}", h.code, h.message);
        return Ok(Outcome::Rejected {
            code: h.code.clone(),
            message: h.message.clone(),
        });
    }

    if resp.items.is_empty() {
        info!("response is valid but holds no trades for this region/month");
        return Ok(Outcome::Empty);
    }

    let columns = resp.columns();
    let drifted = resp
        .items
        .iter()
        .skip(1)
        .filter(|r| r.field_names() != columns)
        .count();
    if drifted > 0 {
        warn!(
            drifted,
            "items with a field set differing from the first item; missing fields left empty, extra fields dropped"
        );
    }

    if let Some(total) = resp.total_count {
        if total > resp.items.len() as u64 {
            warn!(
                total,
                fetched = resp.items.len(),
                "only the first page was fetched"
            );
        }
    }

    let path = write_records(path.as_ref(), &columns, &resp.items)?;
    let rows = resp.items.len();
    info!(rows, "saved {}", path.display());
    Ok(Outcome::Written { path, rows })
}
