//! 共通型定義
//!
//! Collection, Endpoint, SensitiveParam等のコアデータ型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// APIコレクションID
pub type CollectionId = i32;

/// subTypeが付与されていない機密パラメータに使う既定のタグ名
pub const CUSTOM_SUB_TYPE: &str = "CUSTOM";

/// (url, method, apiCollectionId) による同一性
///
/// ストア内の比較はすべてこの3要素で行い、サロゲートIDは使わない。
pub trait EndpointIdentity {
    /// エンドポイントURL
    fn endpoint_url(&self) -> &str;
    /// HTTPメソッド
    fn endpoint_method(&self) -> &str;
    /// 所属コレクションID
    fn endpoint_collection_id(&self) -> CollectionId;

    /// 同じエンドポイントを指しているか
    fn same_endpoint<T: EndpointIdentity + ?Sized>(&self, other: &T) -> bool {
        self.endpoint_url() == other.endpoint_url()
            && self.endpoint_method() == other.endpoint_method()
            && self.endpoint_collection_id() == other.endpoint_collection_id()
    }

    /// 識別キーを複製して取得
    fn endpoint_key(&self) -> EndpointKey {
        EndpointKey {
            url: self.endpoint_url().to_string(),
            method: self.endpoint_method().to_string(),
            api_collection_id: self.endpoint_collection_id(),
        }
    }
}

macro_rules! impl_endpoint_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EndpointIdentity for $ty {
                fn endpoint_url(&self) -> &str {
                    &self.url
                }
                fn endpoint_method(&self) -> &str {
                    &self.method
                }
                fn endpoint_collection_id(&self) -> CollectionId {
                    self.api_collection_id
                }
            }
        )*
    };
}

/// エンドポイント識別キー
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointKey {
    /// URL
    pub url: String,
    /// HTTPメソッド
    pub method: String,
    /// コレクションID
    pub api_collection_id: CollectionId,
}

impl EndpointKey {
    /// 新しいキーを作成
    pub fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        api_collection_id: CollectionId,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            api_collection_id,
        }
    }
}

/// 機密データのサブタイプタグ
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubType {
    /// タグ名（例: "EMAIL", "CUSTOM"）
    pub name: String,
}

impl SubType {
    /// 名前からタグを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// 既定の CUSTOM タグ
    pub fn custom() -> Self {
        Self::new(CUSTOM_SUB_TYPE)
    }
}

/// コレクション内の発見済みエンドポイント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// URL
    pub url: String,
    /// HTTPメソッド
    pub method: String,
    /// コレクションID
    pub api_collection_id: CollectionId,
    /// 初回検出時刻（UNIX秒）
    #[serde(default)]
    pub start_ts: i64,
    /// 付与済みの機密サブタイプ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<BTreeSet<SubType>>,
    /// ユーザーが機密として保存したか
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_as_sensitive: Option<bool>,
}

impl Endpoint {
    /// キーと検出時刻からエンドポイントを作成
    pub fn new(key: EndpointKey, start_ts: i64) -> Self {
        Self {
            url: key.url,
            method: key.method,
            api_collection_id: key.api_collection_id,
            start_ts,
            sensitive: None,
            saved_as_sensitive: None,
        }
    }
}

/// 機密として登録されたパラメータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveParam {
    /// URL
    pub url: String,
    /// HTTPメソッド
    pub method: String,
    /// コレクションID
    pub api_collection_id: CollectionId,
    /// パラメータ名
    #[serde(default)]
    pub param: String,
    /// ヘッダーパラメータか
    #[serde(default)]
    pub is_header: bool,
    /// レスポンスコード（リクエスト側は -1）
    #[serde(default = "default_response_code")]
    pub response_code: i32,
    /// サブタイプ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SubType>,
    /// サーバー側で機密と判定済みか
    #[serde(default)]
    pub sensitive: bool,
}

fn default_response_code() -> i32 {
    -1
}

impl SensitiveParam {
    /// subTypeを返す。未設定なら CUSTOM
    pub fn sub_type_or_custom(&self) -> SubType {
        self.sub_type.clone().unwrap_or_else(SubType::custom)
    }

    /// (param, isHeader, responseCode) が一致するか
    pub fn same_param(&self, other: &EndpointParam) -> bool {
        self.param == other.param
            && self.is_header == other.is_header
            && self.response_code == other.response_code
    }
}

/// 選択中エンドポイントのパラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointParam {
    /// URL
    #[serde(default)]
    pub url: String,
    /// HTTPメソッド
    #[serde(default)]
    pub method: String,
    /// コレクションID
    #[serde(default)]
    pub api_collection_id: CollectionId,
    /// パラメータ名
    #[serde(default)]
    pub param: String,
    /// ヘッダーパラメータか
    #[serde(default)]
    pub is_header: bool,
    /// レスポンスコード
    #[serde(default = "default_response_code")]
    pub response_code: i32,
    /// サブタイプ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SubType>,
    /// 機密として保存済みか
    #[serde(default)]
    pub saved_as_sensitive: bool,
    /// サーバーが返したその他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ランタイムフィルタ定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeFilter {
    /// フィルタ名（マッピングのキー）
    pub custom_field_name: String,
    /// その他の定義
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// エンドポイント単位のAPI情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// 対象エンドポイント
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EndpointKey>,
    /// その他の情報
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// APIコレクション
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCollection {
    /// コレクションID
    pub id: CollectionId,
    /// 表示名
    #[serde(default, alias = "displayName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 作成時刻（UNIX秒）
    #[serde(default)]
    pub start_ts: i64,
    /// 所属エンドポイント（"<method> <url>" 形式）
    #[serde(default)]
    pub urls: Vec<String>,
    /// 論理グループか
    #[serde(default)]
    pub is_logical_group: bool,
    /// その他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiCollection {
    /// IDのみを持つコレクション（一括削除用）
    pub fn with_id(id: CollectionId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl_endpoint_identity!(EndpointKey, Endpoint, SensitiveParam, EndpointParam);
