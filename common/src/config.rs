//! 設定管理
//!
//! ClientConfig等の設定構造体

use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// インベントリクライアント設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// ダッシュボードサーバーのURL (デフォルト: "http://localhost:8080")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// リクエストタイムアウト（秒）(デフォルト: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// ストアイベントのチャネル容量 (デフォルト: 256)
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    256
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl ClientConfig {
    /// 設定値を検証する
    pub fn validate(&self) -> Result<(), CommonError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CommonError::Config(format!(
                "base_url must start with http:// or https://: `{}`",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CommonError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(CommonError::Config(
                "event_channel_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 末尾スラッシュを除いたベースURL
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }
}
