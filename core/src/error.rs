//! Error types for the fetcher.
//!
//! # Design
//! Every failure mode of one call lands in `FetchError`: the timeout, the
//! unauthorized signal, other non-2xx statuses, body encode/decode failures,
//! and transport failures. `Unauthorized` gets a dedicated variant because
//! callers route 401s to a re-login flow; its numeric code survives
//! normalization, so the signal is still observable after the message is
//! cleaned (see DESIGN.md for the history of this choice).

use std::fmt;

/// Status code surfaced through [`FetchError::code`].
pub const UNAUTHORIZED_ERR_CODE: u16 = 401;

/// Errors returned by `Fetcher` calls.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// The transport did not settle within the timeout. The in-flight call
    /// keeps running detached; its result is never observed.
    Timeout,

    /// The server returned 401. The message is the response body text.
    Unauthorized { message: String },

    /// The server returned a non-2xx status other than 401. The message is
    /// the response body text.
    Http { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// A JSON response body could not be parsed.
    Deserialization(String),

    /// The transport failed before producing a status.
    Transport(String),
}

impl FetchError {
    /// The user-presentable message, mirroring what `Display` prints.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The unauthorized status code, when this error carries one.
    pub fn code(&self) -> Option<u16> {
        match self {
            FetchError::Unauthorized { .. } => Some(UNAUTHORIZED_ERR_CODE),
            _ => None,
        }
    }

    /// The HTTP status this error was derived from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Unauthorized { .. } => Some(UNAUTHORIZED_ERR_CODE),
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Rewrite the carried message through [`normalize_message`], keeping
    /// the variant (and therefore the code and status) intact.
    pub fn normalized(self) -> Self {
        fn strip(message: String) -> String {
            normalize_message(&message).to_string()
        }
        match self {
            FetchError::Timeout => FetchError::Timeout,
            FetchError::Unauthorized { message } => FetchError::Unauthorized {
                message: strip(message),
            },
            FetchError::Http { status, message } => FetchError::Http {
                status,
                message: strip(message),
            },
            FetchError::Serialization(message) => FetchError::Serialization(strip(message)),
            FetchError::Deserialization(message) => FetchError::Deserialization(strip(message)),
            FetchError::Transport(message) => FetchError::Transport(strip(message)),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "Request timed out."),
            FetchError::Unauthorized { message } => write!(f, "{message}"),
            FetchError::Http { message, .. } => write!(f, "{message}"),
            FetchError::Serialization(message) => write!(f, "serialization failed: {message}"),
            FetchError::Deserialization(message) => write!(f, "{message}"),
            FetchError::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Strip any number of redundant leading `"Error: "` labels from a message.
///
/// Some upstream layers prepend the label each time an error is re-wrapped,
/// so the stripping repeats until none remains; applying it to an already
/// clean message is a no-op.
pub fn normalize_message(message: &str) -> &str {
    let mut remaining = message;
    while let Some(rest) = remaining.strip_prefix("Error: ") {
        remaining = rest;
    }
    remaining
}
