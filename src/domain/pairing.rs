use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Body of a pair request: the node id to assign and the setup code printed
/// on (or scanned from) the device.
#[derive(Debug, Deserialize)]
pub struct PairRequest {
    pub node_id: u64,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A syntactically valid Matter setup code. Only the shape is checked here:
/// either an `MT:`-prefixed onboarding payload or an 11- or 21-digit manual
/// pairing code. Decoding the payload is left to the chip-tool bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairingCode(String);

const PAYLOAD_PREFIX: &str = "MT:";

impl PairingCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_payload_char(c: char) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | '/')
    }
}

impl FromStr for PairingCode {
    type Err = PairingCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(PairingCodeError::Empty);
        }

        if let Some(payload) = code.strip_prefix(PAYLOAD_PREFIX) {
            if !payload.is_empty() && payload.chars().all(Self::is_payload_char) {
                return Ok(PairingCode(code.to_string()));
            }
            return Err(PairingCodeError::MalformedPayload(code.to_string()));
        }

        if matches!(code.len(), 11 | 21) && code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(PairingCode(code.to_string()));
        }

        Err(PairingCodeError::UnrecognizedFormat(code.to_string()))
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum PairingCodeError {
    #[error("setup code is empty")]
    Empty,
    #[error("onboarding payload '{0}' contains invalid characters")]
    MalformedPayload(String),
    #[error("'{0}' is neither an MT: onboarding payload nor a manual pairing code")]
    UnrecognizedFormat(String),
}
