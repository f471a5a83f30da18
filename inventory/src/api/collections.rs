//! コレクション管理APIクライアント
//!
//! 状態を持たない葉コンポーネント。

use std::sync::Arc;

use api_inventory_common::error::{InventoryError, InventoryResult};
use api_inventory_common::protocol::{
    CollectionsResponse, CreateCollectionRequest, DeleteCollectionRequest,
    DeleteMultipleCollectionsRequest,
};
use api_inventory_common::types::{ApiCollection, CollectionId};
use serde_json::{json, Value};
use tracing::debug;

use super::paths;
use super::transport::{dispatch, RequestDispatcher};

/// コレクション管理APIクライアント
#[derive(Clone)]
pub struct CollectionRegistryClient {
    dispatcher: Arc<dyn RequestDispatcher>,
}

impl CollectionRegistryClient {
    /// ディスパッチャーからクライアントを作成
    pub fn new(dispatcher: Arc<dyn RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// 全コレクションを取得
    pub async fn list_collections(&self) -> InventoryResult<CollectionsResponse> {
        dispatch(
            self.dispatcher.as_ref(),
            paths::GET_ALL_COLLECTIONS,
            &json!({}),
        )
        .await
    }

    /// コレクションを作成
    pub async fn create_collection(&self, name: &str) -> InventoryResult<CollectionsResponse> {
        debug!(collection_name = name, "Creating collection");
        let request = CreateCollectionRequest {
            collection_name: name.to_string(),
        };
        dispatch(self.dispatcher.as_ref(), paths::CREATE_COLLECTION, &request).await
    }

    /// コレクションを削除
    ///
    /// `is_logical_group` はサーバー側の削除方式を切り替えるだけで、ここでは解釈しない。
    pub async fn delete_collection(
        &self,
        api_collection_id: CollectionId,
        is_logical_group: bool,
    ) -> InventoryResult<CollectionsResponse> {
        debug!(api_collection_id, is_logical_group, "Deleting collection");
        let request = DeleteCollectionRequest {
            api_collection_id,
            is_logical_group,
        };
        dispatch(self.dispatcher.as_ref(), paths::DELETE_COLLECTION, &request).await
    }

    /// 複数コレクションを一括削除
    pub async fn delete_multiple_collections(
        &self,
        items: Vec<ApiCollection>,
    ) -> InventoryResult<CollectionsResponse> {
        debug!(count = items.len(), "Deleting collections");
        let request = DeleteMultipleCollectionsRequest {
            api_collection_response: items,
        };
        let raw: Value = dispatch(
            self.dispatcher.as_ref(),
            paths::DELETE_MULTIPLE_COLLECTIONS,
            &request,
        )
        .await?;
        normalize_collections_response(paths::DELETE_MULTIPLE_COLLECTIONS, raw)
    }
}

/// 一括削除のレスポンスを他の操作と同じ形へ揃える
///
/// 空のボディは空のレスポンス、`data` に包まれたものは中身を取り出す。
fn normalize_collections_response(
    path: &str,
    raw: Value,
) -> InventoryResult<CollectionsResponse> {
    let value = match raw {
        Value::Null => return Ok(CollectionsResponse::default()),
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(value).map_err(|source| InventoryError::Decode {
        path: path.to_string(),
        source,
    })
}
