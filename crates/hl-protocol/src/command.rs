use std::fmt;
use std::str::FromStr;

/// Commands the master can issue to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Finalize,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Run => "RUN",
            Self::Finalize => "FINALIZE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUN" => Ok(Self::Run),
            "FINALIZE" => Ok(Self::Finalize),
            other => Err(format!("unknown command: {other}")),
        }
    }
}
