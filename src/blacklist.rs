use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::KiraError;

const BOYLE_LAB_BASE: &str = "https://github.com/Boyle-Lab/Blacklist/raw/master/lists";
const KUNDAJE_BASE: &str = "http://mitra.stanford.edu/kundaje/akundaje/release/blacklists";

/// Download URL of the blacklist for an assembly key such as `hg38` or `dm3`.
pub fn blacklist_url(assembly: &str) -> Option<String> {
    let url = match assembly {
        "hg38" | "hg19" | "mm10" | "dm6" | "dm3" | "ce11" | "ce10" => {
            format!("{BOYLE_LAB_BASE}/{assembly}-blacklist.v2.bed.gz")
        }
        "mm9" => format!("{KUNDAJE_BASE}/mm9-mouse/mm9-blacklist.bed.gz"),
        _ => return None,
    };
    Some(url)
}

pub trait BlacklistSource: Send + Sync {
    fn download(&self, url: &str, destination: &Path) -> Result<(), KiraError>;
}

#[derive(Clone)]
pub struct BlacklistHttpClient {
    client: Client,
}

impl BlacklistHttpClient {
    pub fn new() -> Result<Self, KiraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-gm/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KiraError::BlacklistHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| KiraError::BlacklistHttp(err.to_string()))?;

        Ok(Self { client })
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, KiraError> {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(KiraError::BlacklistHttp(err.to_string()));
                }
            }
        }
    }
}

impl BlacklistSource for BlacklistHttpClient {
    fn download(&self, url: &str, destination: &Path) -> Result<(), KiraError> {
        let mut response = self.send_with_retries(url)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "blacklist request failed".to_string());
            return Err(KiraError::BlacklistStatus { status, message });
        }
        let mut file = std::fs::File::create(destination)
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| KiraError::BlacklistHttp(err.to_string()))?;
        Ok(())
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
