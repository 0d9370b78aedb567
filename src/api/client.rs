use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CommentError;

/// コメントサーバーへの薄い JSON クライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid server URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid server URL: {}", base_url);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// パスセグメントを連結した絶対 URL
    ///
    /// 各セグメントはパーセントエンコードされるので、ID に `/` `#` `?` が含まれても
    /// 別のパスにはならない。
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base は new() で弾いている
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, CommentError> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await.map_err(network_error)?;
        decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, CommentError> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, CommentError> {
        let url = self.endpoint(segments);
        tracing::debug!(%url, "DELETE");
        let response = self.http.delete(url).send().await.map_err(network_error)?;
        decode(response).await
    }
}

fn network_error(err: reqwest::Error) -> CommentError {
    tracing::warn!(%err, "request failed");
    CommentError::Network(err.to_string())
}

/// レスポンスボディを JSON としてデコード
///
/// サーバーは 4xx/5xx でも `{ "error": ... }` を返すため、ステータスに関わらずまずデコードを試みる。
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CommentError> {
    let status = response.status();
    let text = response.text().await.map_err(network_error)?;
    serde_json::from_str(&text).map_err(|err| undecodable(status, &err))
}

fn undecodable(status: StatusCode, err: &serde_json::Error) -> CommentError {
    tracing::warn!(%status, %err, "undecodable response body");
    if status.is_success() {
        CommentError::Server(Some(format!("Invalid response from server: {}", err)))
    } else {
        CommentError::Server(Some(format!("Request failed ({})", status)))
    }
}
