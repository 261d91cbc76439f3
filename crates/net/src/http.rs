use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::{NetError, NetResult};

/// GET helpers accept exactly 200.
pub fn get_succeeded(status: StatusCode) -> bool {
    status == StatusCode::OK
}

/// POST helpers accept anything up to and including 204 No Content.
pub fn post_succeeded(status: StatusCode) -> bool {
    status.as_u16() <= StatusCode::NO_CONTENT.as_u16()
}

/// Thin typed wrapper over a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpHelper {
    client: Client,
}

impl HttpHelper {
    pub fn new(timeout: Duration) -> NetResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NetError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> NetResult<T> {
        let response = self.client.get(url).send().await?;
        let response = ensure(response, url, get_succeeded)?;
        Ok(response.json().await?)
    }

    pub async fn get_text(&self, url: &str) -> NetResult<String> {
        let response = self.client.get(url).send().await?;
        let response = ensure(response, url, get_succeeded)?;
        Ok(response.text().await?)
    }

    /// Posts `body` as JSON. An empty success body decodes as JSON `null`.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> NetResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        let response = ensure(response, url, post_succeeded)?;
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(text)?)
    }
}

pub(crate) fn ensure(
    response: Response,
    url: &str,
    accept: fn(StatusCode) -> bool,
) -> NetResult<Response> {
    let status = response.status();
    debug!(%url, status = status.as_u16(), "http response");
    if accept(status) {
        Ok(response)
    } else {
        Err(NetError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}
