// src/cli/mod.rs

use chrono::NaiveDate;
use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    env, fmt,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use crate::error::InputError;
use crate::fetch::DEFAULT_BASE_URL;

pub const DEFAULT_LAWD_CD: &str = "11110";
pub const DEFAULT_DEAL_YMD: &str = "202401";

static LAWD_CD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").unwrap());
static DEAL_YMD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})$").unwrap());

/// Download one month of apartment trades for a region and save them as CSV.
#[derive(Debug, Parser)]
#[command(name = "aptscraper", version, about)]
pub struct Cli {
    /// 5-digit region code (prompted when omitted)
    #[arg(long, env = "LAWD_CD")]
    pub lawd_cd: Option<String>,

    /// Deal month as YYYYMM (prompted when omitted)
    #[arg(long, env = "DEAL_YMD")]
    pub deal_ymd: Option<String>,

    /// Env file holding DATA_GO_KR_API_KEY [default: ../.env.local next to the binary]
    #[arg(long, env = "APTSCRAPER_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Directory for result_<LAWD_CD>_<DEAL_YMD>.csv [default: the binary's directory]
    #[arg(long, env = "APTSCRAPER_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    #[arg(long, hide = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// A 5-digit LAWD_CD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionCode(String);

impl RegionCode {
    pub fn parse(s: &str) -> Result<Self, InputError> {
        let s = s.trim();
        if LAWD_CD_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InputError::InvalidRegionCode(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A YYYYMM DEAL_YMD naming a real calendar month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealYmd(String);

impl DealYmd {
    pub fn parse(s: &str) -> Result<Self, InputError> {
        let s = s.trim();
        let invalid = || InputError::InvalidDealYmd(s.to_string());
        let caps = DEAL_YMD_RE.captures(s).ok_or_else(invalid)?;
        let year: i32 = caps[1].parse().map_err(|_| invalid())?;
        let month: u32 = caps[2].parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DealYmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Print `prompt` and read one line; blank input yields `default`.
pub fn prompt_with_default<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: &str,
) -> io::Result<String> {
    let answer = read_line(input, output, prompt)?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

/// Ask for the API key by hand. `None` when left blank.
pub fn prompt_api_key<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<String>> {
    let key = read_line(input, output, "Please enter your API Key manually: ")?;
    Ok(Some(key).filter(|k| !k.is_empty()))
}

fn read_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Directory holding the running executable, falling back to the working directory.
pub fn tool_dir() -> io::Result<PathBuf> {
    match env::current_exe()?.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => env::current_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn region_code_requires_five_digits() {
        assert_eq!(RegionCode::parse(" 11110 ").unwrap().as_str(), "11110");
        assert!(RegionCode::parse("1111").is_err());
        assert!(RegionCode::parse("111100").is_err());
        assert!(RegionCode::parse("1111a").is_err());
    }

    #[test]
    fn deal_ymd_requires_real_month() {
        assert_eq!(DealYmd::parse("202401").unwrap().to_string(), "202401");
        assert!(DealYmd::parse("202413").is_err());
        assert!(DealYmd::parse("202400").is_err());
        assert!(DealYmd::parse("2024-01").is_err());
        assert!(DealYmd::parse("20241").is_err());
    }

    #[test]
    fn blank_prompt_takes_default() {
        let mut input = Cursor::new("\n");
        let mut out = Vec::new();
        let v = prompt_with_default(&mut input, &mut out, "LAWD_CD: ", DEFAULT_LAWD_CD).unwrap();
        assert_eq!(v, "11110");
        assert_eq!(String::from_utf8(out).unwrap(), "LAWD_CD: ");
    }

    #[test]
    fn prompt_answer_is_trimmed() {
        let mut input = Cursor::new("  26440 \n");
        let v = prompt_with_default(&mut input, &mut Vec::new(), "", DEFAULT_LAWD_CD).unwrap();
        assert_eq!(v, "26440");
    }

    #[test]
    fn blank_api_key_is_none() {
        let mut out = Vec::new();
        assert_eq!(prompt_api_key(&mut Cursor::new("   \n"), &mut out).unwrap(), None);
        assert_eq!(prompt_api_key(&mut Cursor::new(""), &mut out).unwrap(), None);
        assert_eq!(
            prompt_api_key(&mut Cursor::new("k3y\n"), &mut out).unwrap(),
            Some("k3y".to_string())
        );
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "aptscraper",
            "--lawd-cd",
            "11110",
            "--deal-ymd",
            "202402",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.lawd_cd.as_deref(), Some("11110"));
        assert_eq!(cli.deal_ymd.as_deref(), Some("202402"));
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert!(cli.verbose);
    }
}
