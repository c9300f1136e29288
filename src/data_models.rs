use serde::Serialize;

use crate::error::ScanError;

/// Prefix the scanner prints in front of every positive match.
pub const FOUND_MARKER: &str = "[+] ";
/// Separates the platform name from the profile url on a found line.
pub const FIELD_SEPARATOR: &str = ": ";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FoundEvent {
    pub platform: String,
    pub exists: bool,
    pub url: String,
}

impl FoundEvent {
    pub fn new(platform: String, url: String) -> FoundEvent {
        FoundEvent {
            platform,
            exists: true,
            url,
        }
    }

    /// Parses a single line of scanner output.
    ///
    /// Only lines of the form `[+] <platform>: <url>` produce an event. The url
    /// is everything after the first separator, so it may itself contain `": "`.
    pub fn from_line(line: &str) -> Option<FoundEvent> {
        let rest = line.strip_prefix(FOUND_MARKER)?;
        let (platform, url) = rest.split_once(FIELD_SEPARATOR)?;
        Some(FoundEvent::new(
            platform.trim().to_string(),
            url.trim().to_string(),
        ))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub error: String,
}

impl From<&ScanError> for ErrorEvent {
    fn from(err: &ScanError) -> Self {
        ErrorEvent {
            error: err.to_string(),
        }
    }
}

/// One frame of the search event stream.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StreamEvent {
    Found(FoundEvent),
    Error(ErrorEvent),
}

impl StreamEvent {
    pub fn error(err: &ScanError) -> StreamEvent {
        StreamEvent::Error(err.into())
    }

    /// Nothing follows an error frame.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }
}
