/// Core error type.
///
/// Adapter crates map their transport-specific failures into this type so the
/// lifecycle layer can propagate them unchanged (no retries, no logging here).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A response operation was attempted out of order: a second initial
    /// response, or a webhook operation before any initial response.
    #[error("protocol state error: {0}")]
    Protocol(String),

    /// A snapshot sub-record assumed present by an accessor is absent.
    #[error("missing data: {0}")]
    MissingData(&'static str),

    /// A field expected to be a numeric literal failed to parse.
    #[error("format error: {0}")]
    Format(String),

    /// HTTP/network failure reported by the webhook transport.
    #[error("transport error (status {status:?}): {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Application id resolution failed; no transport call was attempted.
    #[error("application id resolution failed: {0}")]
    Identity(String),

    /// Adapter configuration problem (missing env var, bad client setup).
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
