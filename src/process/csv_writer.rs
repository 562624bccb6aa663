// src/process/csv_writer.rs

use csv::{Terminator, WriterBuilder};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::Builder;
use tracing::{debug, instrument};

use super::response::Record;
use crate::error::ProcessError;

/// UTF-8 byte-order mark, so spreadsheet tools pick the right encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `<dir>/result_<lawd_cd>_<deal_ymd>.csv`
pub fn output_path(dir: &Path, lawd_cd: &str, deal_ymd: &str) -> PathBuf {
    dir.join(format!("result_{}_{}.csv", lawd_cd, deal_ymd))
}

/// Mode for the temp file: the existing target's, else what a plain create gets.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    if let Ok(meta) = fs::metadata(path) {
        return Some(meta.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // umask applies on create, as for `File::create`
        Some(fs::Permissions::from_mode(0o666))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ProcessError + '_ {
    move |source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `records` under `columns` to `path` and return the absolute path written.
///
/// Fields missing from a record become empty cells; fields not in `columns`
/// are dropped. Rows go to a temp file in the same directory which replaces
/// `path` only once everything was flushed.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), rows = records.len()))]
pub fn write_records(
    path: &Path,
    columns: &[String],
    records: &[Record],
) -> Result<PathBuf, ProcessError> {
    let abs = std::path::absolute(path).map_err(io_err(path))?;
    let dir = abs.parent().unwrap_or_else(|| Path::new("."));

    let mut builder = Builder::new();
    builder.prefix(".result").suffix(".csv.tmp");
    if let Some(perms) = target_permissions(&abs) {
        builder.permissions(perms);
    }
    let mut tmp = builder.tempfile_in(dir).map_err(io_err(dir))?;
    tmp.write_all(UTF8_BOM).map_err(io_err(tmp.path()))?;

    {
        let mut wtr = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .from_writer(tmp.as_file_mut());
        wtr.write_record(columns)?;
        for record in records {
            wtr.write_record(columns.iter().map(|c| record.get(c).unwrap_or("")))?;
        }
        wtr.flush().map_err(io_err(&abs))?;
    }

    tmp.persist(&abs).map_err(|e| ProcessError::Io {
        path: abs.clone(),
        source: e.error,
    })?;
    debug!("persisted {}", abs.display());
    Ok(abs)
}
