// src/fetch/query.rs

use url::{form_urlencoded, Url};

use crate::cli::{DealYmd, RegionCode};
use crate::error::FetchError;

pub const NUM_OF_ROWS: u32 = 100;
pub const PAGE_NO: u32 = 1;

const REDACTED: &str = "********";

/// The five query parameters of one trade request.
#[derive(Clone)]
pub struct TradeQuery {
    service_key: String,
    lawd_cd: RegionCode,
    deal_ymd: DealYmd,
}

impl TradeQuery {
    pub fn new(service_key: impl Into<String>, lawd_cd: RegionCode, deal_ymd: DealYmd) -> Self {
        Self {
            service_key: service_key.into(),
            lawd_cd,
            deal_ymd,
        }
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }

    /// Percent-encode all parameters in a single pass.
    ///
    /// The key is issued pre-encoded with `+`, `/` and `=`; it must go through
    /// the same serializer as the rest so those characters are escaped exactly once.
    pub fn encode(&self) -> String {
        self.serialize(&self.service_key)
    }

    /// Same query with the service key replaced by a fixed mask, for logging.
    pub fn redacted(&self) -> String {
        self.serialize(REDACTED)
    }

    /// Full request URL against `base`.
    pub fn url(&self, base: &str) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!("{}?{}", base, self.encode()))?)
    }

    /// `base` plus the redacted query.
    pub fn redacted_url(&self, base: &str) -> String {
        format!("{}?{}", base, self.redacted())
    }

    fn serialize(&self, key: &str) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("serviceKey", key)
            .append_pair("LAWD_CD", self.lawd_cd.as_str())
            .append_pair("DEAL_YMD", self.deal_ymd.as_str())
            .append_pair("numOfRows", &NUM_OF_ROWS.to_string())
            .append_pair("pageNo", &PAGE_NO.to_string())
            .finish()
    }
}

impl std::fmt::Debug for TradeQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeQuery")
            .field("service_key", &mask_key(&self.service_key))
            .field("lawd_cd", &self.lawd_cd)
            .field("deal_ymd", &self.deal_ymd)
            .finish()
    }
}

/// First and last five characters of the key, or `****` for keys of 10 chars or fewer.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 10 {
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 5..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}
