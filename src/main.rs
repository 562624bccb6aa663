use anyhow::{Context, Result};
use aptscraper::{
    cli::{self, Cli, DealYmd, RegionCode, DEFAULT_DEAL_YMD, DEFAULT_LAWD_CD},
    config::{self, API_KEY_VAR, ENV_FILE_NAME},
    fetch::{self, TradeQuery},
    logging,
    process::{self, Outcome},
};
use clap::Parser;
use reqwest::Client;
use std::{io, process::ExitCode};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    logging::init(args.verbose);
    println!("=== Apartment Trade API Test Tool ===");

    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    // ─── 1) credential ───────────────────────────────────────────────
    let api_key = match config::resolve_api_key(args.env_file.as_deref()) {
        Some(k) => k,
        None => {
            error!("{} not found in {}", API_KEY_VAR, ENV_FILE_NAME);
            match cli::prompt_api_key(&mut input, &mut output).context("reading API key")? {
                Some(k) => k,
                None => return Ok(ExitCode::FAILURE),
            }
        }
    };

    // ─── 2) region + month ───────────────────────────────────────────
    let lawd_cd = match args.lawd_cd {
        Some(v) => v,
        None => cli::prompt_with_default(
            &mut input,
            &mut output,
            "Enter LAWD_CD (5 digits, default 11110): ",
            DEFAULT_LAWD_CD,
        )
        .context("reading LAWD_CD")?,
    };
    let deal_ymd = match args.deal_ymd {
        Some(v) => v,
        None => cli::prompt_with_default(
            &mut input,
            &mut output,
            "Enter DEAL_YMD (YYYYMM, default 202401): ",
            DEFAULT_DEAL_YMD,
        )
        .context("reading DEAL_YMD")?,
    };
    let (lawd_cd, deal_ymd) = match (RegionCode::parse(&lawd_cd), DealYmd::parse(&deal_ymd)) {
        (Ok(l), Ok(d)) => (l, d),
        (Err(e), _) | (_, Err(e)) => {
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    // ─── 3) fetch ────────────────────────────────────────────────────
    info!("requesting trades for {} / {}", lawd_cd, deal_ymd);
    let query = TradeQuery::new(api_key, lawd_cd.clone(), deal_ymd.clone());
    let client = Client::new();
    let body = match fetch::fetch_trades(&client, &args.base_url, &query).await {
        Ok(b) => b,
        Err(e) => {
            error!("API Request Failed: {}", e);
            return Ok(ExitCode::SUCCESS);
        }
    };

    // ─── 4) parse + write ────────────────────────────────────────────
    let out_dir = match args.out_dir {
        Some(d) => d,
        None => cli::tool_dir().context("locating executable directory")?,
    };
    let path = process::output_path(&out_dir, lawd_cd.as_str(), deal_ymd.as_str());

    match process::convert_response(&body, &path) {
        Ok(Outcome::Written { path, rows }) => {
            println!("\n[Success]");
            println!("Saved to: {}", path.display());
            println!("Total rows: {}", rows);
        }
        Ok(Outcome::Rejected { .. }) | Ok(Outcome::Empty) => {}
        Err(e) => error!("Parsing/Saving Error: {}", e),
    }

    Ok(ExitCode::SUCCESS)
}
