//! インベントリAPIクライアント
//!
//! エンドポイント・パラメータ・機密情報の取得と、インポート/エクスポート操作

use std::sync::Arc;

use api_inventory_common::error::InventoryResult;
use api_inventory_common::protocol::{
    AddSensitiveFieldRequest, ApiInfoListResponse, CollectionData, CollectionIdRequest,
    ContentResponse, DataEnvelope, EndpointParamsData, EndpointParamsRequest, FiltersResponse,
    SaveContentRequest, SensitiveParamsData, SensitiveParamsRequest, UploadHarRequest,
};
use api_inventory_common::types::{
    ApiInfo, CollectionId, EndpointParam, RuntimeFilter, SensitiveParam,
};
use serde_json::{json, Value};
use tracing::debug;

use super::paths;
use super::transport::{dispatch, RequestDispatcher};

/// インベントリAPIクライアント
#[derive(Clone)]
pub struct InventoryApiClient {
    dispatcher: Arc<dyn RequestDispatcher>,
}

impl InventoryApiClient {
    /// ディスパッチャーからクライアントを作成
    pub fn new(dispatcher: Arc<dyn RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    fn dispatcher(&self) -> &dyn RequestDispatcher {
        self.dispatcher.as_ref()
    }

    /// コレクションのエンドポイント一覧を取得
    pub async fn fetch_api_collection(
        &self,
        api_collection_id: CollectionId,
    ) -> InventoryResult<CollectionData> {
        debug!(api_collection_id, "Fetching API collection");
        let envelope: DataEnvelope<CollectionData> = dispatch(
            self.dispatcher(),
            paths::FETCH_API_COLLECTION,
            &CollectionIdRequest { api_collection_id },
        )
        .await?;
        Ok(envelope.data)
    }

    /// 機密パラメータを取得
    ///
    /// `endpoint` に (url, method) を渡すとそのエンドポイントに限定する。
    pub async fn load_sensitive_parameters(
        &self,
        api_collection_id: CollectionId,
        endpoint: Option<(&str, &str)>,
    ) -> InventoryResult<Vec<SensitiveParam>> {
        let request = SensitiveParamsRequest {
            api_collection_id,
            url: endpoint.map(|(url, _)| url.to_string()),
            method: endpoint.map(|(_, method)| method.to_string()),
        };
        let envelope: DataEnvelope<SensitiveParamsData> =
            dispatch(self.dispatcher(), paths::FETCH_SENSITIVE_PARAMS, &request).await?;
        Ok(envelope.data.endpoints)
    }

    /// 保存済みOpenAPI文書（JSON文字列）を取得
    pub async fn load_content(
        &self,
        api_collection_id: CollectionId,
    ) -> InventoryResult<Option<String>> {
        let response: ContentResponse = dispatch(
            self.dispatcher(),
            paths::LOAD_CONTENT,
            &CollectionIdRequest { api_collection_id },
        )
        .await?;
        Ok(response.into_content())
    }

    /// ランタイムフィルタ定義を取得
    pub async fn fetch_filters(&self) -> InventoryResult<Vec<RuntimeFilter>> {
        let response: FiltersResponse =
            dispatch(self.dispatcher(), paths::FETCH_FILTERS, &json!({})).await?;
        Ok(response.runtime_filters)
    }

    /// エンドポイントのパラメータ一覧を取得
    pub async fn load_params_of_endpoint(
        &self,
        api_collection_id: CollectionId,
        url: &str,
        method: &str,
    ) -> InventoryResult<Vec<EndpointParam>> {
        let request = EndpointParamsRequest {
            api_collection_id,
            url: url.to_string(),
            method: method.to_string(),
        };
        let envelope: DataEnvelope<EndpointParamsData> =
            dispatch(self.dispatcher(), paths::LOAD_PARAMS_OF_ENDPOINT, &request).await?;
        Ok(envelope.data.params)
    }

    /// 機密フィールドの登録状態を切り替える
    pub async fn add_sensitive_field(&self, param: &SensitiveParam) -> InventoryResult<Value> {
        let request = AddSensitiveFieldRequest { x: param.clone() };
        dispatch(self.dispatcher(), paths::ADD_SENSITIVE_FIELD, &request).await
    }

    /// HARファイルをコレクションへ取り込む
    pub async fn upload_har_file(
        &self,
        content: String,
        api_collection_id: CollectionId,
        skip_kafka: bool,
    ) -> InventoryResult<Value> {
        let request = UploadHarRequest {
            content,
            api_collection_id,
            skip_kafka,
        };
        dispatch(self.dispatcher(), paths::UPLOAD_HAR, &request).await
    }

    /// コレクションのOpenAPIファイルを生成
    pub async fn download_open_api_file(
        &self,
        api_collection_id: CollectionId,
    ) -> InventoryResult<Value> {
        dispatch(
            self.dispatcher(),
            paths::GENERATE_OPEN_API_FILE,
            &CollectionIdRequest { api_collection_id },
        )
        .await
    }

    /// コレクションをPostmanへエクスポート
    pub async fn export_to_postman(
        &self,
        api_collection_id: CollectionId,
    ) -> InventoryResult<Value> {
        dispatch(
            self.dispatcher(),
            paths::CREATE_POSTMAN_API,
            &CollectionIdRequest { api_collection_id },
        )
        .await
    }

    /// OpenAPI文書を保存
    pub async fn save_content(&self, request: &SaveContentRequest) -> InventoryResult<Value> {
        dispatch(self.dispatcher(), paths::SAVE_CONTENT, request).await
    }

    /// API情報一覧を取得
    pub async fn fetch_api_info_list(
        &self,
        api_collection_id: CollectionId,
    ) -> InventoryResult<Vec<ApiInfo>> {
        let response: ApiInfoListResponse = dispatch(
            self.dispatcher(),
            paths::FETCH_API_INFO_LIST,
            &CollectionIdRequest { api_collection_id },
        )
        .await?;
        Ok(response.api_info_list)
    }
}
