/*!
simple-oauth1: OAuth 1.0a credentials and request signing.

# Overview

This library turns OAuth 1.0a credentials ([`Token`]) and the parameters of an
outgoing request into a signature the provider can verify, using either the
`HMAC-SHA1` or the `PLAINTEXT` signature method. The result is rendered as an
`Authorization` header value or as a SASL payload.

The library performs no I/O: obtaining request/access tokens and sending the
request are left to the caller. With the `reqwest` feature (enabled by
default) a thin wrapper signs `reqwest` requests on the way out.

# How to use

## Basic usecase 1 - building an Authorization header

```rust
use simple_oauth1::{sign, AuthMethod, HttpMethod, Parameters, Token};
use url::Url;

let token = Token::access("[CONSUMER_KEY]", "[CONSUMER_SECRET]", "[ACCESS_TOKEN]", "[TOKEN_SECRET]")
    .service("tasks");

let url = Url::parse("https://www.googleapis.com/tasks/v1/users/@me/lists").unwrap();
let mut params = Parameters::new();
params.insert("maxResults", "20");

let signed = sign(&token, &url, HttpMethod::Get, &params, AuthMethod::HttpHeader).unwrap();
let header = signed.to_authorization_header();
assert!(header.starts_with("OAuth oauth_consumer_key="));
```

## Basic usecase 2 - deterministic signing

```rust
use simple_oauth1::{HttpMethod, OAuthParameters, Parameters, SignatureMethod, Signer, Token};
use url::Url;

let token = Token::access("ck", "cs", "tk", "ts");
let options = OAuthParameters::new()
    .signature_method(SignatureMethod::PlainText)
    .nonce("abc123")
    .timestamp(1_318_622_958u64);

let url = Url::parse("https://api.example.com/v1/items").unwrap();
let signed = Signer::new(&token, options)
    .sign(HttpMethod::Get, &url, &Parameters::new())
    .unwrap();
assert_eq!(signed.signature(), Some("cs&ts"));
```

## Basic usecase 3 - signing reqwest requests

```rust,no_run
# #[cfg(feature = "reqwest")]
# async fn run() -> simple_oauth1::Result<()> {
use simple_oauth1::{OAuthClientProvider, Token};

let token = Token::access("[CONSUMER_KEY]", "[CONSUMER_SECRET]", "[ACCESS_TOKEN]", "[TOKEN_SECRET]");
let resp = reqwest::Client::new()
    .oauth1(&token)
    .post("https://api.twitter.com/1.1/statuses/update.json")
    .form(&[("status", "Hello, Twitter!")])
    .send()
    .await?;
# Ok(())
# }
```
*/
mod authorization;
#[cfg(feature = "reqwest")]
mod client;
mod encoding;
mod error;
#[cfg(feature = "reqwest")]
mod request;
mod signer;
mod token;

// exposed to external program
pub use authorization::SigningResult;
#[cfg(feature = "reqwest")]
pub use client::{Client, OAuthClientProvider};
pub use encoding::{normalize_parameters, normalize_url, percent_encode, Parameters};
pub use error::{Error, Result, SignError, SignResult};
#[cfg(feature = "reqwest")]
pub use request::RequestBuilder;
pub use signer::{
    sign, sign_request, AuthMethod, HttpMethod, OAuthParameters, SignatureMethod, Signer,
};
pub use token::{Token, TokenKind};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_consumer_key`.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_signature_method`.
pub const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
pub(crate) const OAUTH_VERSION: &str = "1.0";
