//! リクエスト送出層
//!
//! すべてのインベントリAPIは「固定パスへJSONボディをPOSTし、JSONを受け取る」形をとる。
//! その送出を `RequestDispatcher` として抽象化し、HTTP実装とテスト用実装を差し替え可能にする。

use api_inventory_common::config::ClientConfig;
use api_inventory_common::error::{CommonError, InventoryError, InventoryResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// エラーメッセージに含めるレスポンスボディの最大長
const MAX_ERROR_BODY_LEN: usize = 512;

/// リクエスト送出インターフェース
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    /// `path` へ `body` をPOSTし、レスポンスJSONを返す
    ///
    /// ボディが空のレスポンスは `Value::Null` になる。
    async fn post(&self, path: &str, body: Value) -> InventoryResult<Value>;
}

/// reqwestによるHTTP実装
#[derive(Clone)]
pub struct HttpDispatcher {
    base_url: String,
    http_client: Client,
}

impl HttpDispatcher {
    /// 設定からディスパッチャーを作成
    pub fn new(config: &ClientConfig) -> InventoryResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| InventoryError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.normalized_base_url(),
            http_client,
        })
    }

    /// 既存のreqwest Clientから作成
    pub fn from_client(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }
}

#[async_trait]
impl RequestDispatcher for HttpDispatcher {
    async fn post(&self, path: &str, body: Value) -> InventoryResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InventoryError::Timeout(format!("{}: {}", path, e))
                } else {
                    InventoryError::Http(format!("Failed to send request to {}: {}", path, e))
                }
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| InventoryError::Http(format!("Failed to read {}: {}", path, e)))?;

        if !status.is_success() {
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            if text.len() > MAX_ERROR_BODY_LEN {
                let mut cut = MAX_ERROR_BODY_LEN;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(InventoryError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|source| InventoryError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// 型付きのリクエストを送り、型付きのレスポンスへ変換する
pub async fn dispatch<Req, Resp>(
    dispatcher: &dyn RequestDispatcher,
    path: &str,
    body: &Req,
) -> InventoryResult<Resp>
where
    Req: Serialize + ?Sized + Sync,
    Resp: DeserializeOwned,
{
    let body = serde_json::to_value(body).map_err(CommonError::from)?;
    let value = dispatcher.post(path, body).await?;
    serde_json::from_value(value).map_err(|source| InventoryError::Decode {
        path: path.to_string(),
        source,
    })
}
