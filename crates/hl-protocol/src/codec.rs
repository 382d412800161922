use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::str::FromStr;

use hl_core::{Error, Result};

/// Fixed identifier shared by both peers. A line without this prefix is not a
/// protocol message and passes through as plain output.
pub const WIRE_IDENT: &str = "hlproxy2418: ";

/// Message types the master may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterOut {
    Command,
    Value,
}

impl MasterOut {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::Value => "VALUE",
        }
    }
}

impl fmt::Display for MasterOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MasterOut {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "COMMAND" => Ok(Self::Command),
            "VALUE" => Ok(Self::Value),
            other => Err(format!("unknown master message type: {other}")),
        }
    }
}

/// Message types the runner (slave) may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveOut {
    Error,
    Warning,
    Info,
    Value,
}

impl SlaveOut {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Value => "VALUE",
        }
    }
}

impl fmt::Display for SlaveOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlaveOut {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ERROR" => Ok(Self::Error),
            "WARNING" => Ok(Self::Warning),
            "INFO" => Ok(Self::Info),
            "VALUE" => Ok(Self::Value),
            other => Err(format!("unknown slave message type: {other}")),
        }
    }
}

/// Log level of a forwarded slave log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
}

/// One decoded line as seen by the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlaveFrame {
    /// A log line the runner forwarded, to be re-logged at the given level.
    Log(LogLevel, String),
    /// The final outcome payload; ends the wait for the current command.
    Value(String),
    /// A line that did not carry the protocol identifier.
    Plain(String),
}

/// Encode one protocol line (no trailing newline).
pub fn encode(kind: &str, payload: &str) -> String {
    format!("{WIRE_IDENT}{kind}: {}", STANDARD.encode(payload.as_bytes()))
}

fn decode_body(line: &str) -> Result<(String, String)> {
    let body = &line[WIRE_IDENT.len()..];
    let (kind, data) = body
        .split_once(": ")
        .ok_or_else(|| Error::Protocol(format!("malformed message: {body}")))?;
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| Error::Protocol(format!("invalid payload encoding: {e}")))?;
    let payload = String::from_utf8(bytes)
        .map_err(|e| Error::Protocol(format!("payload is not UTF-8: {e}")))?;
    Ok((kind.to_string(), payload))
}

/// Decode a line on the master side. Lines without the identifier pass
/// through unchanged.
pub fn decode_slave_line(line: &str) -> Result<SlaveFrame> {
    if !line.starts_with(WIRE_IDENT) {
        return Ok(SlaveFrame::Plain(line.to_string()));
    }
    let (kind, payload) = decode_body(line)?;
    let kind: SlaveOut = kind
        .parse()
        .map_err(|e: String| Error::Protocol(e))?;
    Ok(match kind {
        SlaveOut::Error => SlaveFrame::Log(LogLevel::Error, payload),
        SlaveOut::Warning => SlaveFrame::Log(LogLevel::Warning, payload),
        SlaveOut::Info => SlaveFrame::Log(LogLevel::Info, payload),
        SlaveOut::Value => SlaveFrame::Value(payload),
    })
}

/// Decode a line on the slave side. The master never writes plain lines, so
/// anything without the identifier is a protocol error.
pub fn decode_master_line(line: &str) -> Result<(MasterOut, String)> {
    if !line.starts_with(WIRE_IDENT) {
        return Err(Error::Protocol(format!("expected protocol message but was: {line}")));
    }
    let (kind, payload) = decode_body(line)?;
    let kind: MasterOut = kind
        .parse()
        .map_err(|e: String| Error::Protocol(e))?;
    Ok((kind, payload))
}
