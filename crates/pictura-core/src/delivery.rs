use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// How converted bytes are handed back to the caller.
///
/// `Disk` persists every output under the converted directory and answers with a
/// server-relative URL. `Inline` keeps nothing between calls and answers with a
/// base64 data URL, which suits single-invocation function deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Disk,
    Inline,
}

impl DeliveryMode {
    pub fn persists_artifacts(self) -> bool {
        matches!(self, DeliveryMode::Disk)
    }
}

impl FromStr for DeliveryMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disk" | "local" => Ok(DeliveryMode::Disk),
            "inline" | "memory" => Ok(DeliveryMode::Inline),
            _ => Err(anyhow::anyhow!("Invalid delivery mode: {}", s)),
        }
    }
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DeliveryMode::Disk => write!(f, "disk"),
            DeliveryMode::Inline => write!(f, "inline"),
        }
    }
}
