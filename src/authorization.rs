use std::fmt;

use crate::encoding::{percent_encode, Parameters};
use crate::signer::AuthMethod;
use crate::{
    OAUTH_KEY_PREFIX, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_TIMESTAMP_KEY, REALM_KEY,
};

/// Output of a successful signing: every signed parameter plus
/// `oauth_signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningResult {
    parameters: Parameters,
    auth_method: AuthMethod,
    realm: Option<String>,
}

impl SigningResult {
    pub(crate) fn new(
        parameters: Parameters,
        auth_method: AuthMethod,
        realm: Option<String>,
    ) -> Self {
        SigningResult {
            parameters,
            auth_method,
            realm,
        }
    }

    /// All signed parameters, caller supplied ones included, in no
    /// particular order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter()
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.first(OAUTH_SIGNATURE_KEY)
    }

    pub fn nonce(&self) -> Option<&str> {
        self.first(OAUTH_NONCE_KEY)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.first(OAUTH_TIMESTAMP_KEY)
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// `oauth_*` pairs, percent-encoded, in signing order.
    fn oauth_pairs(&self) -> Vec<(String, String)> {
        self.parameters
            .encoded_sorted()
            .into_iter()
            .filter(|(k, _)| k.starts_with(OAUTH_KEY_PREFIX))
            .collect()
    }

    /// Renders the `Authorization` header value:
    /// `OAuth oauth_consumer_key="...", oauth_nonce="...", ...`.
    pub fn to_authorization_header(&self) -> String {
        let mut items = Vec::new();
        if let Some(ref realm) = self.realm {
            items.push(format!("{}=\"{}\"", REALM_KEY, percent_encode(realm)));
        }
        items.extend(
            self.oauth_pairs()
                .into_iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, v)),
        );
        format!("OAuth {}", items.join(", "))
    }

    /// Renders the same `oauth_*` pairs as `k=v,k=v` for a SASL exchange.
    pub fn to_sasl_string(&self) -> String {
        self.oauth_pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Renders according to the [`AuthMethod`] chosen at signing time.
    pub fn render(&self) -> String {
        match self.auth_method {
            AuthMethod::HttpHeader => self.to_authorization_header(),
            AuthMethod::Sasl => self.to_sasl_string(),
        }
    }
}

impl fmt::Display for SigningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
