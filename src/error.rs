use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[cfg(feature = "reqwest")]
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[cfg(feature = "reqwest")]
    #[error("signed authorization is not a valid header value : {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),
}

/// Failures of the signing core.
///
/// Signing is deterministic, so none of these are worth retrying with the
/// same input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignError {
    #[error("token cannot be used for signing : {0}")]
    InvalidToken(String),
    #[error("parameter {0} is reserved for the OAuth protocol")]
    ParameterCollision(String),
    #[error("parameter could not be encoded : {0}")]
    Encoding(String),
    #[error("unsupported oauth_signature_method : {0}")]
    UnsupportedSignatureMethod(String),
    #[error("unsupported HTTP method : {0}")]
    UnsupportedHttpMethod(String),
    #[error("system clock is before the Unix epoch : {0}")]
    Clock(String),
    #[error("invalid request url : {0}")]
    InvalidUrl(#[from] url::ParseError),
}
