use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream of response body chunks.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Minimal asynchronous HTTP surface the pipeline needs.
///
/// Implementations handle their own redirects and timeouts. Tests substitute
/// an in-memory client; production uses [`ReqwestClient`].
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + 'static;

    /// Open a streaming GET and return the response body.
    ///
    /// Non-success HTTP statuses must surface as `Err`, not as a body.
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<
        Output = std::result::Result<
            BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            Self::Error,
        >,
    > + Send;

    /// HEAD request: reachability probe plus Content-Length, if any.
    fn head(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Option<u64>, Self::Error>> + Send;
}

/// Production client backed by `reqwest`.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    type Error = reqwest::Error;

    async fn stream(
        &self,
        url: &str,
    ) -> std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error>
    {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(Box::pin(response.bytes_stream()))
    }

    async fn head(&self, url: &str) -> std::result::Result<Option<u64>, Self::Error> {
        let response = self.client.head(url).send().await?.error_for_status()?;
        let content_length = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        Ok(content_length)
    }
}
