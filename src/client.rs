// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use reqwest::{Client as ReqwestClient, IntoUrl, Method};

use crate::{OAuthParameters, Signer, Token};

use super::request::RequestBuilder;

/// Adds OAuth 1.0a signing to `reqwest::Client`.
pub trait OAuthClientProvider {
    fn oauth1(self, token: &Token) -> Client<'_>
    where
        Self: Sized,
    {
        self.oauth1_with_params(token, OAuthParameters::new())
    }

    fn oauth1_with_params(self, token: &Token, params: OAuthParameters) -> Client<'_>
    where
        Self: Sized;
}

/// A `reqwest::Client` bound to the token every request is signed with.
#[derive(Debug)]
pub struct Client<'a> {
    inner: ReqwestClient,
    signer: Signer<'a>,
}

impl OAuthClientProvider for ReqwestClient {
    fn oauth1_with_params(self, token: &Token, parameters: OAuthParameters) -> Client<'_> {
        Client {
            inner: self,
            signer: Signer::new(token, parameters),
        }
    }
}

impl<'a> Client<'a> {
    /// Convenience method to make a `GET` request to a URL.
    pub fn get<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<'a> {
        self.request(Method::GET, url)
    }

    /// Convenience method to make a `POST` request to a URL.
    pub fn post<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<'a> {
        self.request(Method::POST, url)
    }

    /// Convenience method to make a `PUT` request to a URL.
    pub fn put<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<'a> {
        self.request(Method::PUT, url)
    }

    /// Convenience method to make a `DELETE` request to a URL.
    pub fn delete<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<'a> {
        self.request(Method::DELETE, url)
    }

    /// Convenience method to make a `HEAD` request to a URL.
    pub fn head<U: IntoUrl + Clone>(&self, url: U) -> RequestBuilder<'a> {
        self.request(Method::HEAD, url)
    }

    /// Start building a `Request` with the `Method` and `Url`.
    ///
    /// The request is signed when it is sent or when
    /// [`RequestBuilder::generate_signature`] is called.
    pub fn request<U: IntoUrl + Clone>(&self, method: Method, url: U) -> RequestBuilder<'a> {
        let cloned_url = url.clone().into_url().ok();
        RequestBuilder::new(
            self.inner.request(method.clone(), url),
            method,
            cloned_url,
            self.signer.clone(),
        )
    }
}
