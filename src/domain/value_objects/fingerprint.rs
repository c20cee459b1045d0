use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MAX_FINGERPRINT_LEN: usize = 64;

const SIGNAL_DELIMITER: &str = "|";

/// Browser and device properties an embed can read without cookies.
///
/// Every field is optional because restricted environments (privacy modes,
/// sandboxed iframes, headless clients) may refuse to expose some of them.
/// Missing values hash as their zero value so a fingerprint is always produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowserSignals {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub screen_width: Option<u32>,
    #[serde(default)]
    pub screen_height: Option<u32>,
    #[serde(default)]
    pub color_depth: Option<u32>,
    #[serde(default)]
    pub timezone_offset_minutes: Option<i32>,
    #[serde(default)]
    pub hardware_concurrency: Option<u32>,
    #[serde(default)]
    pub platform: Option<String>,
}

impl BrowserSignals {
    fn components(&self) -> [String; 8] {
        [
            self.user_agent.clone().unwrap_or_default(),
            self.language.clone().unwrap_or_default(),
            self.screen_width.unwrap_or_default().to_string(),
            self.screen_height.unwrap_or_default().to_string(),
            self.color_depth.unwrap_or_default().to_string(),
            self.timezone_offset_minutes.unwrap_or_default().to_string(),
            self.hardware_concurrency.unwrap_or_default().to_string(),
            self.platform.clone().unwrap_or_default(),
        ]
    }
}

/// SHA-256 over the delimited signals, as 64 lowercase hex characters.
///
/// This is a heuristic identity: two devices with identical signals collide
/// and share a vote.
pub fn fingerprint(signals: &BrowserSignals) -> String {
    let joined = signals.components().join(SIGNAL_DELIMITER);
    hex::encode(Sha256::digest(joined.as_bytes()))
}

/// A fingerprint key must be non-empty and fit the `anonymous_votes.fingerprint` column.
pub fn is_valid_fingerprint(value: &str) -> bool {
    !value.trim().is_empty() && value.chars().count() <= MAX_FINGERPRINT_LEN
}
