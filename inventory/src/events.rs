//! ストアイベントバス
//!
//! ストアの状態変化を購読者（UI層・CLI等）へブロードキャストする。
//! 購読者は通知を受けてから `InventoryStore` のゲッターで最新値を読み直す。

use api_inventory_common::types::CollectionId;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// 破棄された取得結果の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    /// コレクション本体
    Collection,
    /// 機密パラメータ
    SensitiveParams,
    /// OpenAPI文書
    Content,
    /// ランタイムフィルタ
    Filters,
    /// エンドポイントパラメータ
    EndpointParams,
}

/// ストアイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum StoreEvent {
    /// コレクション単位の状態がクリアされた
    StateReset,
    /// エンドポイント単位の状態がクリアされた
    ParamsReset,
    /// ローディング状態が変化した
    LoadingChanged {
        /// 新しい値
        loading: bool,
    },
    /// コレクションを読み込んだ
    CollectionLoaded {
        /// コレクションID
        api_collection_id: CollectionId,
        /// エンドポイント数
        endpoint_count: usize,
    },
    /// 機密パラメータ一覧が変化した
    SensitiveParamsChanged {
        /// 件数
        count: usize,
    },
    /// OpenAPI文書を読み込んだ
    ContentLoaded {
        /// コレクションID
        api_collection_id: CollectionId,
    },
    /// フィルタ定義が更新された
    FiltersUpdated {
        /// 登録済みフィルタ数
        count: usize,
    },
    /// API情報一覧が更新された
    ApiInfoUpdated {
        /// 件数
        count: usize,
    },
    /// エンドポイントパラメータを読み込んだ
    ParamsLoaded {
        /// URL
        url: String,
        /// HTTPメソッド
        method: String,
        /// パラメータ数
        count: usize,
    },
    /// 新しい読み込みに追い越された結果を破棄した
    StaleResultDiscarded {
        /// 結果の種類
        kind: FetchKind,
        /// 結果の世代
        generation: u64,
    },
}

/// ストアイベントバス
#[derive(Clone)]
pub struct StoreEventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl StoreEventBus {
    /// 容量を指定してイベントバスを作成
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// イベントバスを購読
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// イベントを発行
    ///
    /// 購読者がいない場合でもエラーにはならない
    pub fn publish(&self, event: StoreEvent) {
        // 購読者がいない場合は送信に失敗するが、無視する
        let _ = self.sender.send(event);
    }
}

/// Arc でラップされたイベントバス
pub type SharedStoreEventBus = Arc<StoreEventBus>;
