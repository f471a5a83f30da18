//! REST APIクライアント
//!
//! ダッシュボードサーバーのコレクション管理API・インベントリAPIへの薄いラッパー。
//! 各操作は検証もリトライも行わず、失敗はそのまま呼び出し元へ返す。

pub mod collections;
pub mod inventory;
pub mod transport;

pub use collections::CollectionRegistryClient;
pub use inventory::InventoryApiClient;
pub use transport::{HttpDispatcher, RequestDispatcher};

/// APIパス定義
pub mod paths {
    /// コレクション一覧
    pub const GET_ALL_COLLECTIONS: &str = "/api/getAllCollections";
    /// コレクション作成
    pub const CREATE_COLLECTION: &str = "/api/createCollection";
    /// コレクション削除
    pub const DELETE_COLLECTION: &str = "/api/deleteCollection";
    /// コレクション一括削除
    pub const DELETE_MULTIPLE_COLLECTIONS: &str = "/api/deleteMultipleCollections";
    /// コレクション（エンドポイント一覧）取得
    pub const FETCH_API_COLLECTION: &str = "/api/fetchAPICollection";
    /// 機密パラメータ取得
    pub const FETCH_SENSITIVE_PARAMS: &str = "/api/fetchSensitiveParamsForEndpoints";
    /// OpenAPI文書取得
    pub const LOAD_CONTENT: &str = "/api/loadContent";
    /// ランタイムフィルタ取得
    pub const FETCH_FILTERS: &str = "/api/fetchFilters";
    /// エンドポイントパラメータ取得
    pub const LOAD_PARAMS_OF_ENDPOINT: &str = "/api/loadParamsOfEndpoint";
    /// 機密フィールド追加（トグル）
    pub const ADD_SENSITIVE_FIELD: &str = "/api/addSensitiveField";
    /// HARアップロード
    pub const UPLOAD_HAR: &str = "/api/uploadHar";
    /// OpenAPIファイル生成
    pub const GENERATE_OPEN_API_FILE: &str = "/api/generateOpenApiFile";
    /// Postmanエクスポート
    pub const CREATE_POSTMAN_API: &str = "/api/createPostmanApi";
    /// OpenAPI文書保存
    pub const SAVE_CONTENT: &str = "/api/saveContent";
    /// API情報一覧取得
    pub const FETCH_API_INFO_LIST: &str = "/api/fetchApiInfoList";
}
