use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which Stripe credential set is active for the whole platform.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    #[default]
    Test,
    Live,
}

impl BillingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingMode::Test => "test",
            BillingMode::Live => "live",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "test" => Some(BillingMode::Test),
            "live" => Some(BillingMode::Live),
            _ => None,
        }
    }
}

impl Display for BillingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
