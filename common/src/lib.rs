//! API Inventory 共通型
//!
//! インベントリクライアントとストアが共有するデータ型・通信プロトコル・設定・エラー

#![warn(missing_docs)]

/// 設定構造体
pub mod config;

/// エラー型定義
pub mod error;

/// REST APIのリクエスト/レスポンス定義
pub mod protocol;

/// コアデータ型
pub mod types;
