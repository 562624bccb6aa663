// src/config/mod.rs

use std::{
    env,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, error, instrument};

use crate::error::ConfigError;

/// Name of the credential in both the process environment and the env file.
pub const API_KEY_VAR: &str = "DATA_GO_KR_API_KEY";

/// Env file looked up one directory above the tool.
pub const ENV_FILE_NAME: &str = ".env.local";

/// Parse one `KEY=value` line. Returns the value when the line starts with
/// `key=`, trimmed and with one layer of matching quotes removed.
pub fn parse_env_line(line: &str, key: &str) -> Option<String> {
    let rest = line.strip_prefix(key)?.strip_prefix('=')?;
    Some(strip_quotes(rest.trim()).to_string())
}

fn strip_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Read `path` and return the first value stored under `key`.
///
/// `Ok(None)` covers both a missing file and a file without the key.
pub fn read_env_value(path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(contents.lines().find_map(|l| parse_env_line(l, key)))
}

/// Like [`read_env_value`], but read failures are reported and folded into "not found".
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_env_value(path: &Path, key: &str) -> Option<String> {
    match read_env_value(path, key) {
        Ok(Some(v)) => {
            debug!("found {} in env file", key);
            Some(v)
        }
        Ok(None) => {
            debug!("{} not present", key);
            None
        }
        Err(e) => {
            error!("Error reading {}: {}", ENV_FILE_NAME, e);
            None
        }
    }
}

/// `.env.local` one directory above the directory holding the executable.
pub fn default_env_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let tool_dir = exe.parent()?;
    Some(tool_dir.parent().unwrap_or(tool_dir).join(ENV_FILE_NAME))
}

/// Resolve the API key: process environment first, then the env file.
pub fn resolve_api_key(env_file: Option<&Path>) -> Option<String> {
    resolve_api_key_from(env::var(API_KEY_VAR).ok(), env_file)
}

/// Resolution with the environment value passed in. Blank values on either
/// side count as absent.
fn resolve_api_key_from(env_value: Option<String>, env_file: Option<&Path>) -> Option<String> {
    if let Some(v) = env_value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        debug!("using {} from process environment", API_KEY_VAR);
        return Some(v.to_string());
    }

    let path = match env_file {
        Some(p) => p.to_path_buf(),
        None => default_env_path()?,
    };
    load_env_value(&path, API_KEY_VAR).filter(|v| !v.is_empty())
}
