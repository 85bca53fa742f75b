//! Acquire raw image bytes from a URL or an inline base64 payload

use std::time::Duration;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use tracing::debug;

use crate::config::{FetchConfig, LimitsConfig};
use crate::error::{NormalizeError, Result};

/// Where the request's image bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput<'a> {
    Url(&'a str),
    /// base64 body with any data-URI prefix already removed
    Base64(&'a str),
}

impl<'a> ImageInput<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if is_http_url(trimmed) {
            ImageInput::Url(trimmed)
        } else {
            ImageInput::Base64(strip_data_uri_prefix(trimmed))
        }
    }
}

fn is_http_url(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Remove a leading `data:image/<subtype>;base64,` header if present
pub fn strip_data_uri_prefix(s: &str) -> &str {
    if let Some(rest) = s.strip_prefix("data:image/") {
        if let Some(idx) = rest.find(";base64,") {
            let subtype = &rest[..idx];
            if !subtype.is_empty()
                && subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return &rest[idx + ";base64,".len()..];
            }
        }
    }
    s
}

/// Standard alphabet, padding optional, stray trailing bits ignored
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a base64 body, tolerating embedded whitespace, missing padding and
/// the URL-safe alphabet
pub fn decode_base64(body: &str, max_bytes: usize) -> Result<Vec<u8>> {
    let compact: String = body
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    // 4 base64 chars carry 3 bytes; reject before allocating the output
    let estimated = compact.len() / 4 * 3;
    if estimated > max_bytes + 3 {
        return Err(NormalizeError::InputTooLarge { size: estimated, limit: max_bytes });
    }

    let bytes = LENIENT
        .decode(compact.as_bytes())
        .map_err(|e| NormalizeError::Decode(format!("invalid base64 payload: {}", e)))?;

    if bytes.len() > max_bytes {
        return Err(NormalizeError::InputTooLarge { size: bytes.len(), limit: max_bytes });
    }
    Ok(bytes)
}

/// Resolves `imageData` strings into byte buffers
pub struct ImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(fetch: &FetchConfig, limits: &LimitsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()
            .map_err(|e| NormalizeError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: limits.max_input_bytes,
        })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Read the full image payload described by `raw`
    pub async fn acquire(&self, raw: &str) -> Result<Vec<u8>> {
        match ImageInput::parse(raw) {
            ImageInput::Url(url) => self.fetch(url).await,
            ImageInput::Base64(body) => decode_base64(body, self.max_bytes),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching image from {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NormalizeError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NormalizeError::Fetch(format!("{} from {}", status, url)));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(NormalizeError::InputTooLarge { size: len as usize, limit: self.max_bytes });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| NormalizeError::Fetch(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(NormalizeError::InputTooLarge {
                    size: body.len() + chunk.len(),
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
