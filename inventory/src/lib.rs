//! API Inventory client
//!
//! 発見済みAPIエンドポイントのインベントリを取得・保持するクライアントとストア

#![warn(missing_docs)]

/// 共通型定義（api-inventory-commonの再エクスポート）
pub use api_inventory_common as common;

/// REST APIクライアント
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ストアイベントバス
pub mod events;

/// ロギング初期化ユーティリティ
pub mod logging;

/// インベントリストア
pub mod store;

use std::sync::Arc;

use api_inventory_common::config::ClientConfig;
use api_inventory_common::error::InventoryResult;

use crate::api::{CollectionRegistryClient, HttpDispatcher, InventoryApiClient, RequestDispatcher};
use crate::events::StoreEventBus;
use crate::store::InventoryStore;

/// 一つのディスパッチャーを共有するクライアント群とストア
#[derive(Clone)]
pub struct InventoryContext {
    /// コレクション管理APIクライアント
    pub collections: CollectionRegistryClient,
    /// インベントリAPIクライアント
    pub api: InventoryApiClient,
    /// インベントリストア
    pub store: InventoryStore,
}

impl InventoryContext {
    /// 設定からHTTPディスパッチャーを作り、コンテキストを組み立てる
    pub fn from_config(config: &ClientConfig) -> InventoryResult<Self> {
        let dispatcher: Arc<dyn RequestDispatcher> = Arc::new(HttpDispatcher::new(config)?);
        Ok(Self::with_dispatcher(dispatcher, config.event_channel_capacity))
    }

    /// 任意のディスパッチャーからコンテキストを組み立てる
    pub fn with_dispatcher(
        dispatcher: Arc<dyn RequestDispatcher>,
        event_channel_capacity: usize,
    ) -> Self {
        let api = InventoryApiClient::new(dispatcher.clone());
        let events = Arc::new(StoreEventBus::with_capacity(event_channel_capacity));
        Self {
            collections: CollectionRegistryClient::new(dispatcher),
            store: InventoryStore::with_event_bus(api.clone(), events),
            api,
        }
    }
}
