/// Error type shared by every crate in the workspace.
///
/// Variants follow the order in which a single API call can fail: building the
/// request, moving bytes over the wire, decoding the envelope, and finally the
/// API itself reporting `ok: false`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("request error: {0}")]
    Request(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("telegram api error {code}: {description}")]
    Api {
        code: i64,
        description: String,
        /// Seconds to wait before repeating the request, set on flood control errors.
        retry_after: Option<u32>,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Numeric API error code, if the API rejected the call.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
