use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::encoding::{normalize_parameters, normalize_url, percent_encode, Parameters};
use crate::{
    SignError, SignResult, SigningResult, Token, TokenKind, OAUTH_CALLBACK_KEY,
    OAUTH_CONSUMER_KEY, OAUTH_KEY_PREFIX, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY,
    OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY,
    OAUTH_VERSION, OAUTH_VERSION_KEY,
};

const NONCE_LENGTH: usize = 32;

/// Supported `oauth_signature_method` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureMethod {
    HmacSha1,
    /// Sends the signing key itself. Only use over TLS.
    PlainText,
}

impl SignatureMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::PlainText => "PLAINTEXT",
        }
    }

    fn sign(self, base_string: &str, key: &str) -> SignResult<String> {
        match self {
            SignatureMethod::HmacSha1 => {
                let mut mac = <Hmac<Sha1> as KeyInit>::new_from_slice(key.as_bytes())
                    .map_err(|e| SignError::Encoding(e.to_string()))?;
                mac.update(base_string.as_bytes());
                Ok(STANDARD.encode(mac.finalize().into_bytes()))
            }
            SignatureMethod::PlainText => Ok(key.to_string()),
        }
    }
}

impl Default for SignatureMethod {
    fn default() -> Self {
        SignatureMethod::HmacSha1
    }
}

impl FromStr for SignatureMethod {
    type Err = SignError;

    fn from_str(s: &str) -> SignResult<Self> {
        match s {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            "PLAINTEXT" => Ok(SignatureMethod::PlainText),
            other => Err(SignError::UnsupportedSignatureMethod(other.to_string())),
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods a request may be signed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Get
    }
}

impl FromStr for HttpMethod {
    type Err = SignError;

    fn from_str(s: &str) -> SignResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            _ => Err(SignError::UnsupportedHttpMethod(s.to_string())),
        }
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = SignError;

    fn try_from(method: &http::Method) -> SignResult<Self> {
        method.as_str().parse()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the signed parameters end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    /// `Authorization: OAuth ...` header value.
    HttpHeader,
    /// Unquoted, comma-separated SASL payload.
    Sasl,
}

impl Default for AuthMethod {
    fn default() -> Self {
        AuthMethod::HttpHeader
    }
}

/// Per-request signing options.
///
/// Nonce and timestamp are generated at signing time unless set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthParameters {
    auth_method: AuthMethod,
    nonce: Option<String>,
    realm: Option<String>,
    signature_method: SignatureMethod,
    timestamp: Option<u64>,
}

impl OAuthParameters {
    pub fn new() -> Self {
        Default::default()
    }

    /// set the output format
    pub fn auth_method(self, auth_method: AuthMethod) -> Self {
        OAuthParameters {
            auth_method,
            ..self
        }
    }

    /// set the oauth_nonce value
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value
    ///
    /// # Note
    /// The realm is sent in the Authorization header but never signed.
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<String>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_signature_method value
    pub fn signature_method(self, signature_method: SignatureMethod) -> Self {
        OAuthParameters {
            signature_method,
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    pub fn get_auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    pub fn get_signature_method(&self) -> SignatureMethod {
        self.signature_method
    }

    fn nonce_or_generate(&self) -> String {
        match self.nonce {
            Some(ref nonce) => nonce.clone(),
            None => rand::rng()
                .sample_iter(&Alphanumeric)
                .take(NONCE_LENGTH)
                .map(char::from)
                .collect(),
        }
    }

    fn timestamp_or_now(&self) -> SignResult<u64> {
        match self.timestamp {
            Some(timestamp) => Ok(timestamp),
            None => unix_seconds(SystemTime::now()),
        }
    }
}

fn unix_seconds(now: SystemTime) -> SignResult<u64> {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SignError::Clock(e.to_string()))
}

/// Signs requests with a borrowed [`Token`].
///
/// The signer holds no mutable state; one instance may be shared across
/// threads and used for any number of requests.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    token: &'a Token,
    parameters: OAuthParameters,
}

impl<'a> Signer<'a> {
    pub fn new(token: &'a Token, parameters: OAuthParameters) -> Self {
        Signer { token, parameters }
    }

    pub fn token(&self) -> &Token {
        self.token
    }

    pub fn parameters(&self) -> &OAuthParameters {
        &self.parameters
    }

    /// Signs a request and returns every signed parameter plus
    /// `oauth_signature`.
    ///
    /// `url` may carry a query string; its pairs are signed along with
    /// `params`.
    pub fn sign(
        &self,
        method: HttpMethod,
        url: &Url,
        params: &Parameters,
    ) -> SignResult<SigningResult> {
        let signature_method = self.parameters.signature_method;
        let (mut combined, base_string) = self.prepare(method, url, params)?;
        let signature = signature_method.sign(&base_string, &self.signing_key())?;

        tracing::debug!(
            http_method = method.as_str(),
            signature_method = signature_method.as_str(),
            parameters = combined.len(),
            "signed request"
        );

        combined.insert(OAUTH_SIGNATURE_KEY, signature);
        Ok(SigningResult::new(
            combined,
            self.parameters.auth_method,
            self.parameters.realm.clone(),
        ))
    }

    /// Builds the signature base string the signature would be computed
    /// over, without signing it.
    pub fn base_string(
        &self,
        method: HttpMethod,
        url: &Url,
        params: &Parameters,
    ) -> SignResult<String> {
        self.prepare(method, url, params).map(|(_, base)| base)
    }

    fn prepare(
        &self,
        method: HttpMethod,
        url: &Url,
        params: &Parameters,
    ) -> SignResult<(Parameters, String)> {
        self.token.validate()?;

        let mut combined = match url.query() {
            Some(query) => Parameters::from_urlencoded(query.as_bytes())?,
            None => Parameters::new(),
        };
        combined.extend(params.clone());
        if let Some((key, _)) = combined
            .iter()
            .find(|(key, _)| key.starts_with(OAUTH_KEY_PREFIX))
        {
            return Err(SignError::ParameterCollision(key.to_string()));
        }
        combined.extend(self.protocol_parameters()?);

        let normalized_url = normalize_url(url)?;
        let base_string = format!(
            "{}&{}&{}",
            method.as_str(),
            percent_encode(&normalized_url),
            percent_encode(&normalize_parameters(&combined))
        );
        tracing::trace!(
            url = %normalized_url,
            base_string = %base_string,
            "built signature base string"
        );
        Ok((combined, base_string))
    }

    fn protocol_parameters(&self) -> SignResult<Parameters> {
        let token = self.token;
        let mut oauth = Parameters::new();
        oauth.insert(OAUTH_CONSUMER_KEY, token.consumer_key());
        oauth.insert(OAUTH_NONCE_KEY, self.parameters.nonce_or_generate());
        oauth.insert(
            OAUTH_SIGNATURE_METHOD_KEY,
            self.parameters.signature_method.as_str(),
        );
        oauth.insert(
            OAUTH_TIMESTAMP_KEY,
            self.parameters.timestamp_or_now()?.to_string(),
        );
        oauth.insert(OAUTH_VERSION_KEY, OAUTH_VERSION);

        match token.kind() {
            TokenKind::AccessToken => {
                oauth.insert(OAUTH_TOKEN_KEY, token.token_string());
            }
            TokenKind::RequestToken if token.token_string().is_empty() => {
                if let Some(callback) = token.callback_url() {
                    oauth.insert(OAUTH_CALLBACK_KEY, callback.as_str());
                }
            }
            TokenKind::RequestToken => {
                oauth.insert(OAUTH_TOKEN_KEY, token.token_string());
                if let Some(verifier) = token.verifier_code() {
                    oauth.insert(OAUTH_VERIFIER_KEY, verifier);
                }
            }
            // rejected by validate()
            TokenKind::Invalid => {}
        }
        Ok(oauth)
    }

    fn signing_key(&self) -> String {
        format!(
            "{}&{}",
            percent_encode(self.token.consumer_secret()),
            percent_encode(self.token.token_secret())
        )
    }
}

/// Signs a request with freshly generated nonce and timestamp.
pub fn sign(
    token: &Token,
    url: &Url,
    method: HttpMethod,
    params: &Parameters,
    auth_method: AuthMethod,
) -> SignResult<SigningResult> {
    Signer::new(token, OAuthParameters::new().auth_method(auth_method)).sign(method, url, params)
}

/// Signs a request and renders it for `auth_method` in one step.
pub fn sign_request(
    token: &Token,
    url: &Url,
    auth_method: AuthMethod,
    method: HttpMethod,
    params: &Parameters,
) -> SignResult<String> {
    sign(token, url, method, params, auth_method).map(|result| result.render())
}
