use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{SignError, SignResult};

/// Classification of the credential set held by a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// No credentials; cannot sign anything.
    Invalid,
    /// Temporary credentials used during the authorization handshake.
    RequestToken,
    /// Long-lived credentials used for ordinary API calls.
    AccessToken,
}

impl Default for TokenKind {
    fn default() -> Self {
        TokenKind::Invalid
    }
}

/// OAuth 1.0a credential set.
///
/// `Token` is a plain value: cloning duplicates the credentials and no two
/// clones share mutable state. Promote a token by building a new one (or
/// through the `set_*` methods on an owned value) rather than mutating a
/// shared one while other threads sign with it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    consumer_key: String,
    consumer_secret: String,
    callback_url: Option<Url>,
    token: String,
    token_secret: String,
    verifier: Option<String>,
    service: Option<String>,
}

impl Token {
    /// Constructs an empty, [`TokenKind::Invalid`] token.
    pub fn new() -> Self {
        Default::default()
    }

    /// Constructs a request token carrying only the consumer credentials.
    pub fn request<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Token {
            kind: TokenKind::RequestToken,
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            ..Default::default()
        }
    }

    /// Constructs an access token.
    pub fn access<TKey, TSecret, TToken, TTokenSecret>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        token: TToken,
        token_secret: TTokenSecret,
    ) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
        TToken: Into<String>,
        TTokenSecret: Into<String>,
    {
        Token {
            kind: TokenKind::AccessToken,
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
            ..Default::default()
        }
    }

    /// Sets the redirect target used while obtaining a request token.
    pub fn callback(self, callback_url: Url) -> Self {
        Token {
            callback_url: Some(callback_url),
            ..self
        }
    }

    /// Sets the token string and secret issued by the provider.
    pub fn token<TToken, TSecret>(self, token: TToken, token_secret: TSecret) -> Self
    where
        TToken: Into<String>,
        TSecret: Into<String>,
    {
        Token {
            token: token.into(),
            token_secret: token_secret.into(),
            ..self
        }
    }

    /// Sets the verifier returned after the user granted access.
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<String>,
    {
        Token {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// Sets the label of the service/account this token belongs to.
    pub fn service<T>(self, service: T) -> Self
    where
        T: Into<String>,
    {
        Token {
            service: Some(service.into()),
            ..self
        }
    }

    // ------------------------------------------------------------------------
    // In-place setters for owned values

    pub fn set_kind(&mut self, kind: TokenKind) {
        self.kind = kind;
    }

    pub fn set_consumer_key<T: Into<String>>(&mut self, consumer_key: T) {
        self.consumer_key = consumer_key.into();
    }

    pub fn set_consumer_secret<T: Into<String>>(&mut self, consumer_secret: T) {
        self.consumer_secret = consumer_secret.into();
    }

    pub fn set_callback_url(&mut self, callback_url: Option<Url>) {
        self.callback_url = callback_url;
    }

    pub fn set_token_string<T: Into<String>>(&mut self, token: T) {
        self.token = token.into();
    }

    pub fn set_token_secret<T: Into<String>>(&mut self, token_secret: T) {
        self.token_secret = token_secret.into();
    }

    pub fn set_verifier(&mut self, verifier: Option<String>) {
        self.verifier = verifier;
    }

    pub fn set_service(&mut self, service: Option<String>) {
        self.service = service;
    }

    // ------------------------------------------------------------------------
    // Accessors

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn callback_url(&self) -> Option<&Url> {
        self.callback_url.as_ref()
    }

    pub fn token_string(&self) -> &str {
        &self.token
    }

    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }

    /// The verifier, if any. Access tokens never report one.
    pub fn verifier_code(&self) -> Option<&str> {
        match self.kind {
            TokenKind::AccessToken => None,
            _ => self.verifier.as_deref(),
        }
    }

    pub fn service_identifier(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Checks that the fields required by this token's kind are present.
    pub fn validate(&self) -> SignResult<()> {
        match self.kind {
            TokenKind::Invalid => Err(SignError::InvalidToken(
                "token kind is Invalid".to_string(),
            )),
            TokenKind::RequestToken => {
                self.validate_consumer()?;
                if self.verifier.is_some() && self.token.is_empty() {
                    return Err(SignError::InvalidToken(
                        "verifier supplied without the request token it authorizes".to_string(),
                    ));
                }
                Ok(())
            }
            TokenKind::AccessToken => {
                self.validate_consumer()?;
                if self.token.is_empty() {
                    return Err(SignError::InvalidToken(
                        "access token requires a token string".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    fn validate_consumer(&self) -> SignResult<()> {
        if self.consumer_key.is_empty() {
            return Err(SignError::InvalidToken("consumer key is empty".to_string()));
        }
        if self.consumer_secret.is_empty() {
            return Err(SignError::InvalidToken(
                "consumer secret is empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .field("verifier", &self.verifier.as_ref().map(|_| "<redacted>"))
            .field("service", &self.service)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CONSUMER_KEY: &str = "<CONSUMER_KEY>";
    static CONSUMER_SECRET: &str = "<CONSUMER_SECRET>";
    static TOKEN: &str = "<ACCESS_TOKEN>";
    static TOKEN_SECRET: &str = "<TOKEN_SECRET>";

    #[test]
    fn empty_token_is_invalid() {
        let token = Token::new();
        assert_eq!(token.kind(), TokenKind::Invalid);
        assert!(matches!(token.validate(), Err(SignError::InvalidToken(_))));
    }

    #[test]
    fn invalid_kind_fails_even_with_credentials() {
        let mut token = Token::access(CONSUMER_KEY, CONSUMER_SECRET, TOKEN, TOKEN_SECRET);
        token.set_kind(TokenKind::Invalid);
        assert!(matches!(token.validate(), Err(SignError::InvalidToken(_))));
    }

    #[test]
    fn request_token_requires_consumer_pair() {
        assert!(Token::request(CONSUMER_KEY, CONSUMER_SECRET).validate().is_ok());
        assert!(Token::request("", CONSUMER_SECRET).validate().is_err());
        assert!(Token::request(CONSUMER_KEY, "").validate().is_err());
    }

    #[test]
    fn verifier_requires_request_token_string() {
        let token = Token::request(CONSUMER_KEY, CONSUMER_SECRET).verifier("pin");
        assert!(token.validate().is_err());
        let token = token.token(TOKEN, TOKEN_SECRET);
        assert!(token.validate().is_ok());
        assert_eq!(token.verifier_code(), Some("pin"));
    }

    #[test]
    fn access_token_requires_token_string() {
        let token = Token::access(CONSUMER_KEY, CONSUMER_SECRET, "", TOKEN_SECRET);
        assert!(matches!(token.validate(), Err(SignError::InvalidToken(_))));
        let token = Token::access(CONSUMER_KEY, CONSUMER_SECRET, TOKEN, "");
        assert!(token.validate().is_ok());
    }

    #[test]
    fn access_token_hides_verifier() {
        let mut token = Token::request(CONSUMER_KEY, CONSUMER_SECRET)
            .token(TOKEN, TOKEN_SECRET)
            .verifier("pin");
        token.set_kind(TokenKind::AccessToken);
        assert_eq!(token.verifier_code(), None);
    }

    #[test]
    fn clones_do_not_alias() {
        let original = Token::access(CONSUMER_KEY, CONSUMER_SECRET, TOKEN, TOKEN_SECRET);
        let mut copy = original.clone();
        copy.set_token_secret("changed");
        assert_eq!(original.token_secret(), TOKEN_SECRET);
        assert_eq!(copy.token_secret(), "changed");
    }

    #[test]
    fn debug_redacts_secrets() {
        let token = Token::access(CONSUMER_KEY, CONSUMER_SECRET, TOKEN, TOKEN_SECRET)
            .service("tasks");
        let printed = format!("{:?}", token);
        assert!(!printed.contains(CONSUMER_SECRET));
        assert!(!printed.contains(TOKEN_SECRET));
        assert!(printed.contains(CONSUMER_KEY));
        assert!(printed.contains("tasks"));
    }
}
