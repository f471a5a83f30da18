//! 通信プロトコル定義
//!
//! インベントリAPIへ送るリクエストボディと、受け取るレスポンスの形

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{
    ApiCollection, ApiInfo, CollectionId, Endpoint, EndpointKey, EndpointParam, RuntimeFilter,
    SensitiveParam,
};

/// `{"data": ...}` 形式のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    /// 本体
    pub data: T,
}

/// コレクションIDだけを送るリクエスト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionIdRequest {
    /// コレクションID
    pub api_collection_id: CollectionId,
}

/// コレクション作成リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    /// 表示名
    pub collection_name: String,
}

/// コレクション削除リクエスト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCollectionRequest {
    /// コレクションID
    pub api_collection_id: CollectionId,
    /// 論理グループとして削除するか（サーバーへそのまま渡す）
    pub is_logical_group: bool,
}

/// コレクション一括削除リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMultipleCollectionsRequest {
    /// 削除対象
    pub api_collection_response: Vec<ApiCollection>,
}

/// コレクション管理APIのレスポンス
///
/// 一覧・作成・削除・一括削除のいずれもこの形に正規化する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionsResponse {
    /// コレクション一覧
    #[serde(default)]
    pub api_collections: Vec<ApiCollection>,
    /// その他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// コレクション取得レスポンスのエンドポイント要素
///
/// 識別情報は `_id` にネストされて返る。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpoint {
    /// 識別キー
    #[serde(rename = "_id")]
    pub id: EndpointKey,
    /// 初回検出時刻
    #[serde(default)]
    pub start_ts: i64,
}

impl From<RawEndpoint> for Endpoint {
    fn from(raw: RawEndpoint) -> Self {
        Endpoint::new(raw.id, raw.start_ts)
    }
}

/// コレクション取得レスポンスの本体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    /// 表示名
    #[serde(default)]
    pub name: Option<String>,
    /// エンドポイント一覧
    #[serde(default)]
    pub endpoints: Vec<RawEndpoint>,
    /// API情報一覧
    #[serde(default)]
    pub api_info_list: Vec<ApiInfo>,
}

/// 機密パラメータ取得リクエスト
///
/// url/method を省略するとコレクション全体が対象になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveParamsRequest {
    /// コレクションID
    pub api_collection_id: CollectionId,
    /// 対象URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 対象メソッド
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// 機密パラメータ取得レスポンスの本体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitiveParamsData {
    /// 機密パラメータ一覧
    #[serde(default)]
    pub endpoints: Vec<SensitiveParam>,
}

/// コンテンツ（OpenAPI文書）取得レスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentResponse {
    /// 本体（未登録なら無し）
    #[serde(default)]
    pub data: Option<ContentData>,
}

/// コンテンツ本体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentData {
    /// JSON文字列としてのOpenAPI文書
    #[serde(default)]
    pub content: Option<String>,
}

impl ContentResponse {
    /// 空でないコンテンツ文字列を取り出す
    pub fn into_content(self) -> Option<String> {
        self.data
            .and_then(|data| data.content)
            .filter(|content| !content.is_empty())
    }
}

/// ランタイムフィルタ取得レスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersResponse {
    /// フィルタ一覧
    #[serde(default)]
    pub runtime_filters: Vec<RuntimeFilter>,
}

/// エンドポイントパラメータ取得リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointParamsRequest {
    /// コレクションID
    pub api_collection_id: CollectionId,
    /// URL
    pub url: String,
    /// HTTPメソッド
    pub method: String,
}

/// エンドポイントパラメータ取得レスポンスの本体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointParamsData {
    /// パラメータ一覧
    #[serde(default)]
    pub params: Vec<EndpointParam>,
}

/// 機密フィールド追加リクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSensitiveFieldRequest {
    /// 対象パラメータ
    pub x: SensitiveParam,
}

/// HARアップロードリクエスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadHarRequest {
    /// HARファイル内容
    pub content: String,
    /// 取り込み先コレクションID
    pub api_collection_id: CollectionId,
    /// Kafka経由の取り込みを省略するか
    pub skip_kafka: bool,
}

/// OpenAPI文書保存リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveContentRequest {
    /// OpenAPI文書
    pub swagger_content: Value,
    /// ファイル名
    pub filename: String,
    /// コレクションID
    pub api_collection_id: CollectionId,
}

/// API情報一覧取得レスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfoListResponse {
    /// API情報一覧
    #[serde(default)]
    pub api_info_list: Vec<ApiInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_endpoint_flattens_identity() {
        let body = json!({
            "data": {
                "name": "shop",
                "endpoints": [
                    {
                        "_id": {"url": "/a", "method": "GET", "apiCollectionId": 7},
                        "startTs": 1700000000
                    }
                ],
                "apiInfoList": []
            }
        });
        let envelope: DataEnvelope<CollectionData> = serde_json::from_value(body).unwrap();
        let endpoints: Vec<Endpoint> = envelope
            .data
            .endpoints
            .into_iter()
            .map(Endpoint::from)
            .collect();

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].url, "/a");
        assert_eq!(endpoints[0].method, "GET");
        assert_eq!(endpoints[0].api_collection_id, 7);
        assert_eq!(endpoints[0].start_ts, 1700000000);
        assert!(endpoints[0].sensitive.is_none());
    }

    #[test]
    fn test_sensitive_params_request_omits_missing_endpoint() {
        let request = SensitiveParamsRequest {
            api_collection_id: 3,
            url: None,
            method: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"apiCollectionId": 3})
        );
    }

    #[test]
    fn test_content_response_without_content() {
        let empty: ContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.into_content().is_none());

        let blank: ContentResponse =
            serde_json::from_value(json!({"data": {"content": ""}})).unwrap();
        assert!(blank.into_content().is_none());

        let document = "{\"openapi\":\"3.0.0\"}";
        let filled: ContentResponse =
            serde_json::from_value(json!({"data": {"content": document}})).unwrap();
        assert_eq!(filled.into_content().as_deref(), Some(document));
    }

    #[test]
    fn test_delete_request_field_names() {
        let request = DeleteCollectionRequest {
            api_collection_id: 5,
            is_logical_group: true,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"apiCollectionId": 5, "isLogicalGroup": true})
        );
    }
}
