use thiserror::Error;

/// Why a piece of text did not yield a timestamp.
///
/// `extract_timestamp` folds every variant into `None`; the reasons only
/// surface through [`crate::inspect`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no run of 10 to 13 digits found")]
    NoCandidate,

    #[error("digits {digits} have canonical length {canonical_len}, expected 10 or 13")]
    UnsupportedLength { digits: String, canonical_len: usize },

    #[error("{seconds} seconds is outside the accepted epoch range")]
    OutOfRange { seconds: u64 },

    // Unreachable after the range check; lets the conversion to a UTC
    // instant propagate instead of panicking.
    #[error("{seconds} seconds cannot be represented as a UTC instant")]
    Unrepresentable { seconds: u64 },
}
