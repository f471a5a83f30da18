//! ロギング初期化
//!
//! `INVENTORY_LOG_LEVEL`（旧: `LOG_LEVEL`）でフィルタを指定する。未設定なら `info`。

use tracing_subscriber::EnvFilter;

use crate::config::get_env_with_fallback_or;

/// 既定のログフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info";

/// 環境変数からログフィルタ文字列を決定する
pub fn log_filter_from_env() -> String {
    get_env_with_fallback_or("INVENTORY_LOG_LEVEL", "LOG_LEVEL", DEFAULT_LOG_FILTER)
}

/// tracingサブスクライバーを初期化する
///
/// ログは標準エラーへ出力し、標準出力はコマンド結果のJSONに使う。
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(log_filter_from_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
