use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity assigned to a reported problem.
///
/// `WeakWarning` counts into the warnings bucket for thresholds and reports,
/// but keeps its own name in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProblemLevel {
    Error,
    Warning,
    WeakWarning,
    Info,
}

impl ProblemLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::WeakWarning => "WEAK_WARNING",
            Self::Info => "INFO",
        }
    }

    /// Interpret a severity name as found in an inspection profile.
    ///
    /// `INFORMATION` is the profile's "do not show" marker and maps to `None`;
    /// unknown names are treated as weak warnings rather than rejected.
    pub fn from_profile_level(level: &str) -> Option<ProblemLevel> {
        match level {
            "ERROR" => Some(Self::Error),
            "WARNING" => Some(Self::Warning),
            "WEAK_WARNING" => Some(Self::WeakWarning),
            "INFO" => Some(Self::Info),
            "INFORMATION" => None,
            _ => Some(Self::WeakWarning),
        }
    }
}

impl fmt::Display for ProblemLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProblemLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ERROR" => Ok(Self::Error),
            "WARNING" => Ok(Self::Warning),
            "WEAK_WARNING" => Ok(Self::WeakWarning),
            "INFO" => Ok(Self::Info),
            other => Err(format!("unknown ProblemLevel: {other}")),
        }
    }
}

/// How the emitting tool flagged a problem, before severity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    GenericErrorOrWarning,
    LikeUnknownSymbol,
    LikeDeprecated,
    LikeUnusedSymbol,
    Error,
    GenericError,
    WeakWarning,
    Information,
    Other,
}

/// Resolve the effective severity of a problem from the tool's highlight kind
/// and the level configured for its inspection (plugin buckets or profile).
///
/// Returns `None` when the problem must be dropped entirely.
pub fn effective_level(
    highlight: HighlightKind,
    configured: Option<ProblemLevel>,
) -> Option<ProblemLevel> {
    match highlight {
        // Default path: use the configured level (plugin or profile)
        HighlightKind::GenericErrorOrWarning
        | HighlightKind::LikeUnknownSymbol
        | HighlightKind::LikeDeprecated
        | HighlightKind::LikeUnusedSymbol => configured,
        // The tool forces an error, report it
        HighlightKind::Error | HighlightKind::GenericError => Some(ProblemLevel::Error),
        // The tool forces a weak warning, never report an error
        HighlightKind::WeakWarning => match configured {
            Some(ProblemLevel::Error) | None => Some(ProblemLevel::WeakWarning),
            other => other,
        },
        // The tool forces "do not show", it is not a problem at all
        HighlightKind::Information => None,
        HighlightKind::Other => Some(ProblemLevel::Info),
    }
}
