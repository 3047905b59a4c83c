use std::io;
use thiserror::Error;

/// Errors reported by a message write.
///
/// Body-source errors and transport errors are fatal to the write and are surfaced unchanged.
/// [`SendError::EndOfStream`] is not a failure: it is the sentinel reported when a message that
/// requires the connection to be closed has been written completely.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid message head: {reason}")]
    InvalidHead { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// The message was sent completely and the transport must now be closed.
    #[error("end of stream: message sent, connection must be closed")]
    EndOfStream,

    #[error("connection already closed by a previous message")]
    Closed,

    #[error("message write already failed")]
    Poisoned,
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_head<S: ToString>(str: S) -> Self {
        Self::InvalidHead { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true for the close-after-write sentinel.
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, SendError::EndOfStream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_stream_is_distinct_from_eof() {
        let eof = SendError::io(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(!eof.is_end_of_stream());
        assert!(SendError::EndOfStream.is_end_of_stream());
    }

    #[test]
    fn test_display() {
        assert_eq!(SendError::invalid_body("too long").to_string(), "invalid body: too long");
        assert_eq!(SendError::invalid_head("HTTP/2.0").to_string(), "invalid message head: HTTP/2.0");
    }
}
