use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Final state of one analysis run, as reported back over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// Analysis completed within every configured threshold.
    Success,
    /// Analysis completed but thresholds were breached or fixes failed.
    Fail,
    /// An uncaught error terminated the run.
    Crash,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutcomeEnvelope {
    value: RunOutcome,
}

impl RunOutcome {
    /// Wire form: `{"value":"SUCCESS"}` and friends.
    pub fn to_json(self) -> String {
        serde_json::to_string(&OutcomeEnvelope { value: self }).expect("outcome serializes")
    }

    pub fn from_json(data: &str) -> Result<RunOutcome> {
        let envelope: OutcomeEnvelope = serde_json::from_str(data)?;
        Ok(envelope.value)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
            Self::Crash => "CRASH",
        };
        write!(f, "{s}")
    }
}
