// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use std::convert::TryFrom;
use std::time::Duration;

use http::header::{HeaderValue, AUTHORIZATION};
use http::Method;
use reqwest::{
    header::HeaderMap, header::HeaderName, Body, RequestBuilder as ReqwestRequestBuilder,
    Response, Url,
};
use serde::Serialize;

use crate::{HttpMethod, Parameters, Result, Signer};

pub struct RequestBuilder<'a> {
    method: Method,
    inner: ReqwestRequestBuilder,
    signer: Signer<'a>,
    url: Option<Url>,
    body: Parameters,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(
        builder: ReqwestRequestBuilder,
        method: Method,
        url: Option<Url>,
        signer: Signer<'a>,
    ) -> Self {
        RequestBuilder {
            inner: builder,
            method,
            url,
            body: Parameters::new(),
            signer,
        }
    }

    // ------------------------------------------------------------------------
    // Finish building the request and send it to server with OAuth signature

    /// Constructs the Request and sends it to the target URL, returning a
    /// future Response.
    ///
    /// # Errors
    ///
    /// This method fails if the request cannot be signed or if reqwest
    /// fails to send it.
    pub async fn send(self) -> Result<Response> {
        Ok(self.generate_signature()?.send().await?)
    }

    /// Sign the captured method, URL, query and form body, and return the
    /// reqwest `RequestBuilder` carrying the `Authorization` header.
    pub fn generate_signature(self) -> Result<ReqwestRequestBuilder> {
        let url = match self.url {
            Some(url) => url,
            // reqwest reports the unparsable URL itself when building
            None => return Ok(self.inner),
        };
        let method = HttpMethod::try_from(&self.method)?;
        let signed = self.signer.sign(method, &url, &self.body)?;
        let header = HeaderValue::from_str(&signed.to_authorization_header())?;
        Ok(self.inner.header(AUTHORIZATION, header))
    }

    // ------------------------------------------------------------------------
    // Trapped with the wrapper

    /// Modify the query string of the URL.
    ///
    /// Modifies the URL of this request, adding the parameters provided.
    /// This method appends and does not overwrite. This means that it can
    /// be called multiple times and that existing query parameters are not
    /// overwritten if the same key is used. The key will simply show up
    /// twice in the query string.
    /// Calling `.query([("foo", "a"), ("foo", "b")])` gives `"foo=a&foo=b"`.
    ///
    /// Query parameters are covered by the signature.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        // update local-captured url
        if let Some(ref mut url) = self.url {
            let mut pairs = url.query_pairs_mut();
            let serializer = serde_urlencoded::Serializer::new(&mut pairs);

            let _ = query.serialize(serializer);
        }
        // cleanup
        if let Some(ref mut url) = self.url {
            if let Some("") = url.query() {
                url.set_query(None);
            }
        }
        self.inner = self.inner.query(query);
        self
    }

    /// Send a form body. The form fields are covered by the signature.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match Parameters::from_serialize(form) {
            Ok(params) => {
                self.inner = self.inner.form(form);
                self.body.extend(params);
                self
            }
            Err(_) => self.pass_through(|b| b.form(form)),
        }
    }

    // ------------------------------------------------------------------------
    // Pass-through to inner builder

    fn pass_through<F>(self, f: F) -> Self
    where
        F: FnOnce(ReqwestRequestBuilder) -> ReqwestRequestBuilder,
    {
        RequestBuilder {
            inner: f(self.inner),
            ..self
        }
    }

    /// Add a `Header` to this Request.
    pub fn header<K, V>(self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.pass_through(|b| b.header(key, value))
    }

    /// Add a set of Headers to the existing ones on this Request.
    pub fn headers(self, headers: HeaderMap) -> Self {
        self.pass_through(|b| b.headers(headers))
    }

    /// Set a raw request body. Raw bodies are not covered by the signature.
    pub fn body<T: Into<Body>>(self, body: T) -> Self {
        self.pass_through(|b| b.body(body))
    }

    /// Enables a request timeout.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.pass_through(|b| b.timeout(timeout))
    }

    /// Sends a multipart/form-data body.
    ///
    /// Note: multipart/form-data is not handled by the OAuth signer.
    #[cfg(feature = "multipart")]
    pub fn multipart(self, multipart: reqwest::multipart::Form) -> Self {
        self.pass_through(|b| b.multipart(multipart))
    }
}

#[cfg(test)]
mod tests {
    use http::header::AUTHORIZATION;
    use percent_encoding::percent_decode_str;

    use crate::{Error, OAuthClientProvider, OAuthParameters, SignError, Token};

    fn extract_signature(auth_header: &str) -> String {
        let content = auth_header.strip_prefix("OAuth ").unwrap();
        let mapped_header = content
            .split(", ")
            .map(|item| item.splitn(2, '=').collect::<Vec<&str>>())
            .filter(|v| v.len() == 2)
            .map(|v| (v[0], v[1]))
            .collect::<Vec<(&str, &str)>>();
        let sig_content = mapped_header.iter().find(|(k, _)| k == &"oauth_signature");
        percent_decode_str(sig_content.unwrap().1.trim_matches('"'))
            .decode_utf8()
            .unwrap()
            .to_string()
    }

    #[test]
    fn sign_get_query() {
        // OAuth Core 1.0, Appendix A.5
        let endpoint = "http://photos.example.net/photos";
        let token = Token::access(
            "dpf43f3p2l4k3l03",
            "kd94hf93k423kf44",
            "nnch734d00sl2jdk",
            "pfkkdhi9sl3r4s00",
        );
        let params = OAuthParameters::new()
            .nonce("kllo9940pd9333jh")
            .timestamp(1_191_242_096u64);

        let req = reqwest::Client::new()
            .oauth1_with_params(&token, params)
            .get(endpoint)
            .query(&[("file", "vacation.jpg"), ("size", "original")])
            .generate_signature()
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(req.url().query(), Some("file=vacation.jpg&size=original"));
        let sign = req.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(
            extract_signature(sign.to_str().unwrap()),
            "tR3+Ty81lMeYAr/Fid0kMTYa/WM="
        );
    }

    #[test]
    fn sign_post_body() {
        // https://developer.twitter.com/en/docs/authentication/oauth-1-0a/creating-a-signature
        let endpoint = url::Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap();
        let token = Token::access(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let params = OAuthParameters::new()
            .nonce("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .timestamp(1_318_622_958u64);

        let req = reqwest::Client::new()
            .oauth1_with_params(&token, params)
            .post(endpoint)
            .form(&[
                ("include_entities", "true"),
                (
                    "status",
                    "Hello Ladies + Gentlemen, a signed OAuth request!",
                ),
            ])
            .generate_signature()
            .unwrap()
            .build()
            .unwrap();

        let sign = req.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(
            extract_signature(sign.to_str().unwrap()),
            "hCtSmYh+iHYCEqBWrE7C7hYmtUk="
        );
    }

    #[test]
    fn invalid_token_is_not_sent() {
        let token = Token::new();
        let result = reqwest::Client::new()
            .oauth1(&token)
            .get("https://api.example.com/v1/items")
            .generate_signature();
        assert!(matches!(
            result,
            Err(Error::Signer(SignError::InvalidToken(_)))
        ));
    }

    #[test]
    fn unsupported_method_is_rejected() {
        let token = Token::access("ck", "cs", "tk", "ts");
        let result = reqwest::Client::new()
            .oauth1(&token)
            .request(http::Method::PATCH, "https://api.example.com/v1/items")
            .generate_signature();
        assert!(matches!(
            result,
            Err(Error::Signer(SignError::UnsupportedHttpMethod(_)))
        ));
    }

    #[test]
    fn reserved_query_parameter_is_rejected() {
        let token = Token::access("ck", "cs", "tk", "ts");
        let result = reqwest::Client::new()
            .oauth1(&token)
            .get("https://api.example.com/v1/items")
            .query(&[("oauth_token", "other")])
            .generate_signature();
        assert!(matches!(
            result,
            Err(Error::Signer(SignError::ParameterCollision(_)))
        ));
    }

    #[tokio::test]
    async fn send_refuses_unsigned_request() {
        let token = Token::request("", "cs");
        let result = reqwest::Client::new()
            .oauth1(&token)
            .post("https://api.example.com/oauth/request_token")
            .send()
            .await;
        assert!(matches!(
            result,
            Err(Error::Signer(SignError::InvalidToken(_)))
        ));
    }
}
