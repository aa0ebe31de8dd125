//! HTTP seam between the client and the network.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`HttpTransport::post_form`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error type produced by transports (DNS, TLS, timeouts, etc).
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw HTTP answer: status code plus body text.
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one form-encoded POST and returns the raw answer.
///
/// Implement this to plug in another HTTP stack or a test double, then pass it
/// to [`crate::SatimClient::with_transport`] or
/// [`crate::SatimClientBuilder::transport`]. Status codes are interpreted by the
/// client, so implementations should return non-2xx answers as `Ok`.
pub trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
pub(crate) struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Redirects are not followed: a 3xx from the gateway is reported as an error.
    pub(crate) fn new(
        timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self.client.post(url).form(&params).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}
