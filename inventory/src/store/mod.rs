//! インベントリストア
//!
//! 選択中コレクションのエンドポイント・機密情報・エンドポイントパラメータ・フィルタを
//! メモリ上で保持し、APIクライアント呼び出しとミューテーションを仲介する。
//!
//! コレクション読み込みとエンドポイント読み込みはそれぞれ世代番号を持ち、
//! 後から開始した読み込みに追い越された結果は状態へ反映しない。

pub mod merge;
pub mod state;

pub use merge::merge_sensitive_params;
pub use state::InventoryState;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use api_inventory_common::error::{InventoryError, InventoryResult};
use api_inventory_common::protocol::SaveContentRequest;
use api_inventory_common::types::{
    ApiInfo, CollectionId, Endpoint, EndpointIdentity, EndpointParam, RuntimeFilter, SensitiveParam,
};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::InventoryApiClient;
use crate::events::{FetchKind, SharedStoreEventBus, StoreEvent};

/// コレクション読み込み後に並行して走る二次取得のハンドル
///
/// 破棄しても二次取得は止まらない。完了を待つ場合は `settled` を使う。
#[derive(Debug, Default)]
pub struct SecondaryFetches {
    handles: Vec<JoinHandle<()>>,
}

impl SecondaryFetches {
    /// 二次取得が起動されていないか（一次取得が失敗・破棄された場合）
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 起動された二次取得の数
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// すべての二次取得の完了を待つ
    pub async fn settled(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("Secondary fetch task failed: {}", e);
            }
        }
    }
}

/// インベントリストア
#[derive(Clone)]
pub struct InventoryStore {
    state: Arc<RwLock<InventoryState>>,
    api: InventoryApiClient,
    events: SharedStoreEventBus,
    collection_generation: Arc<AtomicU64>,
    params_generation: Arc<AtomicU64>,
}

impl InventoryStore {
    /// イベントバスを指定してストアを作成
    pub fn with_event_bus(api: InventoryApiClient, events: SharedStoreEventBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(InventoryState::default())),
            api,
            events,
            collection_generation: Arc::new(AtomicU64::new(0)),
            params_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// ストアイベントを購読
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// 状態のスナップショットを取得
    pub async fn snapshot(&self) -> InventoryState {
        self.state.read().await.clone()
    }

    fn next_collection_generation(&self) -> u64 {
        self.collection_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn next_params_generation(&self) -> u64 {
        self.params_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current_collection(&self, generation: u64) -> bool {
        self.collection_generation.load(Ordering::SeqCst) == generation
    }

    fn is_current_params(&self, generation: u64) -> bool {
        self.params_generation.load(Ordering::SeqCst) == generation
    }

    /// 世代が現在のものであれば書き込みロックを返す
    ///
    /// 世代の確認はロック取得後に行うため、確認から反映までの間に追い越されることはない。
    async fn write_if_current_collection(
        &self,
        generation: u64,
        kind: FetchKind,
    ) -> Option<RwLockWriteGuard<'_, InventoryState>> {
        let state = self.state.write().await;
        if self.is_current_collection(generation) {
            Some(state)
        } else {
            drop(state);
            self.discard(kind, generation);
            None
        }
    }

    fn discard(&self, kind: FetchKind, generation: u64) {
        debug!(?kind, generation, "Discarding stale fetch result");
        self.events.publish(StoreEvent::StaleResultDiscarded { kind, generation });
    }

    async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
        self.events.publish(StoreEvent::LoadingChanged { loading });
    }

    /// コレクション単位の状態をクリア
    pub async fn empty_state(&self) {
        self.state.write().await.empty_state();
        self.events.publish(StoreEvent::StateReset);
    }

    /// コレクションを読み込む
    ///
    /// 一次取得（エンドポイント一覧）が成功すると状態へ反映してローディングを解除し、
    /// 機密パラメータ・OpenAPI文書・フィルタの二次取得を待たずに返る。
    /// 一次取得の失敗はログに残すのみで呼び出し元へは返さない。
    pub async fn load_api_collection(
        &self,
        api_collection_id: CollectionId,
        should_load: bool,
    ) -> SecondaryFetches {
        let generation = self.next_collection_generation();
        // 進行中のエンドポイント読み込みも無効にする
        self.next_params_generation();

        {
            let mut state = self.state.write().await;
            state.last_fetched = Utc::now().timestamp();
            state.empty_state();
            if should_load {
                state.loading = true;
            }
        }
        self.events.publish(StoreEvent::StateReset);
        if should_load {
            self.events.publish(StoreEvent::LoadingChanged { loading: true });
        }

        let data = match self.api.fetch_api_collection(api_collection_id).await {
            Ok(data) => data,
            Err(e) => {
                warn!(api_collection_id, "Failed to load API collection: {}", e);
                if self.is_current_collection(generation) {
                    self.set_loading(false).await;
                }
                return SecondaryFetches::default();
            }
        };

        let endpoint_count = {
            let Some(mut state) = self
                .write_if_current_collection(generation, FetchKind::Collection)
                .await
            else {
                return SecondaryFetches::default();
            };
            state.save_api_collection(api_collection_id, data);
            state.loading = false;
            state.api_collection.len()
        };
        info!(api_collection_id, endpoint_count, "Loaded API collection");
        self.events.publish(StoreEvent::CollectionLoaded {
            api_collection_id,
            endpoint_count,
        });
        self.events.publish(StoreEvent::LoadingChanged { loading: false });

        let id = api_collection_id;
        SecondaryFetches {
            handles: vec![
                tokio::spawn(self.clone().refresh_sensitive_params(id, generation)),
                tokio::spawn(self.clone().refresh_content(id, generation)),
                tokio::spawn(self.clone().refresh_filters(generation)),
            ],
        }
    }

    async fn refresh_sensitive_params(self, api_collection_id: CollectionId, generation: u64) {
        let fields = match self
            .api
            .load_sensitive_parameters(api_collection_id, None)
            .await
        {
            Ok(fields) => fields,
            Err(e) => {
                warn!(api_collection_id, "Failed to load sensitive params: {}", e);
                return;
            }
        };

        let count = fields.len();
        {
            let Some(mut state) = self
                .write_if_current_collection(generation, FetchKind::SensitiveParams)
                .await
            else {
                return;
            };
            state.save_sensitive(fields);
        }
        self.events.publish(StoreEvent::SensitiveParamsChanged { count });
    }

    async fn refresh_content(self, api_collection_id: CollectionId, generation: u64) {
        let content = match self.api.load_content(api_collection_id).await {
            Ok(Some(content)) => content,
            Ok(None) => return,
            Err(e) => {
                warn!(api_collection_id, "Failed to load content: {}", e);
                return;
            }
        };

        let document: Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                let err = InventoryError::InvalidContent(e.to_string());
                warn!(api_collection_id, "{}", err);
                return;
            }
        };

        {
            let Some(mut state) = self
                .write_if_current_collection(generation, FetchKind::Content)
                .await
            else {
                return;
            };
            state.swagger_content = Some(document);
        }
        self.events.publish(StoreEvent::ContentLoaded { api_collection_id });
    }

    async fn refresh_filters(self, generation: u64) {
        let filters = match self.api.fetch_filters().await {
            Ok(filters) => filters,
            Err(e) => {
                warn!("Failed to load runtime filters: {}", e);
                return;
            }
        };

        let count = {
            let Some(mut state) = self
                .write_if_current_collection(generation, FetchKind::Filters)
                .await
            else {
                return;
            };
            state.merge_filters(filters);
            state.filters.len()
        };
        self.events.publish(StoreEvent::FiltersUpdated { count });
    }

    /// エンドポイントのパラメータを読み込む
    ///
    /// パラメータ取得後にエンドポイントの機密情報を取得してマージし、状態へ反映する。
    /// 機密情報の取得失敗はログに残し、マージせずに反映する。
    pub async fn load_params_of_endpoint(
        &self,
        api_collection_id: CollectionId,
        url: &str,
        method: &str,
    ) -> InventoryResult<()> {
        let generation = self.next_params_generation();
        {
            let mut state = self.state.write().await;
            state.empty_params();
            state.loading = true;
        }
        self.events.publish(StoreEvent::ParamsReset);
        self.events.publish(StoreEvent::LoadingChanged { loading: true });

        let params = match self
            .api
            .load_params_of_endpoint(api_collection_id, url, method)
            .await
        {
            Ok(params) => params,
            Err(e) => {
                if self.is_current_params(generation) {
                    self.set_loading(false).await;
                }
                return Err(e);
            }
        };

        let merged = match self
            .api
            .load_sensitive_parameters(api_collection_id, Some((url, method)))
            .await
        {
            Ok(sensitive) => merge_sensitive_params(&params, &sensitive),
            Err(e) => {
                warn!(url, method, "Failed to load endpoint sensitivity: {}", e);
                params
            }
        };

        let count = merged.len();
        {
            let mut state = self.state.write().await;
            if !self.is_current_params(generation) {
                drop(state);
                self.discard(FetchKind::EndpointParams, generation);
                return Ok(());
            }
            state.save_params(method.to_string(), url.to_string(), merged);
            state.loading = false;
        }
        debug!(url, method, count, "Loaded endpoint parameters");
        self.events.publish(StoreEvent::ParamsLoaded {
            url: url.to_string(),
            method: method.to_string(),
            count,
        });
        self.events.publish(StoreEvent::LoadingChanged { loading: false });
        Ok(())
    }

    /// 機密パラメータの登録を切り替え、サーバーの応答をそのまま返す
    pub async fn toggle_sensitive_param(&self, param: SensitiveParam) -> InventoryResult<Value> {
        let response = self.api.add_sensitive_field(&param).await?;

        let (saved, count) = {
            let mut state = self.state.write().await;
            let saved = state.toggle_sensitive(param);
            (saved, state.sensitive_params.len())
        };
        debug!(saved, "Toggled sensitive parameter");
        self.events.publish(StoreEvent::SensitiveParamsChanged { count });
        Ok(response)
    }

    async fn selected_collection_id(&self) -> CollectionId {
        self.state.read().await.api_collection_id
    }

    /// 選択中コレクションへHARファイルを取り込む
    pub async fn upload_har_file(
        &self,
        content: String,
        filename: &str,
        skip_kafka: bool,
    ) -> InventoryResult<Value> {
        let api_collection_id = self.selected_collection_id().await;
        info!(api_collection_id, filename, "Uploading HAR file");
        self.api
            .upload_har_file(content, api_collection_id, skip_kafka)
            .await
    }

    /// 選択中コレクションのOpenAPIファイルを生成
    pub async fn download_open_api_file(&self) -> InventoryResult<Value> {
        let api_collection_id = self.selected_collection_id().await;
        self.api.download_open_api_file(api_collection_id).await
    }

    /// 選択中コレクションをPostmanへエクスポート
    pub async fn export_to_postman(&self) -> InventoryResult<Value> {
        let api_collection_id = self.selected_collection_id().await;
        self.api.export_to_postman(api_collection_id).await
    }

    /// OpenAPI文書を保存し、成功したら状態へ反映する
    ///
    /// 成否にかかわらずローディングは解除する。
    /// 別コレクションの文書を保存した場合、それまでの読み込み結果は反映しない。
    pub async fn save_content(
        &self,
        swagger_content: Value,
        filename: String,
        api_collection_id: CollectionId,
    ) -> InventoryResult<()> {
        self.set_loading(true).await;

        let request = SaveContentRequest {
            swagger_content,
            filename,
            api_collection_id,
        };
        if let Err(e) = self.api.save_content(&request).await {
            warn!(api_collection_id, "Failed to save content: {}", e);
            self.set_loading(false).await;
            return Err(e);
        }

        {
            let mut state = self.state.write().await;
            if state.api_collection_id != api_collection_id {
                // 選択中コレクションが切り替わるため、進行中の読み込みを無効にする
                self.next_collection_generation();
                self.next_params_generation();
            }
            state.save_content(request.swagger_content, request.filename, api_collection_id);
            state.loading = false;
        }
        self.events.publish(StoreEvent::ContentLoaded { api_collection_id });
        self.events.publish(StoreEvent::LoadingChanged { loading: false });
        Ok(())
    }

    /// API情報一覧を取得して置き換える
    pub async fn fetch_api_info_list(
        &self,
        api_collection_id: CollectionId,
    ) -> InventoryResult<()> {
        let list = self.api.fetch_api_info_list(api_collection_id).await?;
        let count = list.len();
        self.state.write().await.api_info_list = list;
        self.events.publish(StoreEvent::ApiInfoUpdated { count });
        Ok(())
    }

    /// フィルタ定義を取得してマージする
    pub async fn fetch_filters(&self) -> InventoryResult<()> {
        let filters = self.api.fetch_filters().await?;
        let count = {
            let mut state = self.state.write().await;
            state.merge_filters(filters);
            state.filters.len()
        };
        self.events.publish(StoreEvent::FiltersUpdated { count });
        Ok(())
    }

    /// 取得時刻
    pub async fn fetch_ts(&self) -> i64 {
        self.state.read().await.fetch_ts
    }

    /// 読み込み中か
    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// 選択中コレクションのエンドポイント
    pub async fn api_collection(&self) -> Vec<Endpoint> {
        self.state.read().await.api_collection.clone()
    }

    /// 選択中コレクションID
    pub async fn api_collection_id(&self) -> CollectionId {
        self.selected_collection_id().await
    }

    /// 選択中コレクション名
    pub async fn api_collection_name(&self) -> String {
        self.state.read().await.api_collection_name.clone()
    }

    /// API情報一覧
    pub async fn api_info_list(&self) -> Vec<ApiInfo> {
        self.state.read().await.api_info_list.clone()
    }

    /// フィルタ定義
    pub async fn filters(&self) -> HashMap<String, RuntimeFilter> {
        self.state.read().await.filters.clone()
    }

    /// 機密パラメータ一覧
    pub async fn sensitive_params(&self) -> Vec<SensitiveParam> {
        self.state.read().await.sensitive_params.clone()
    }

    /// 選択中エンドポイントのパラメータ
    pub async fn parameters(&self) -> Vec<EndpointParam> {
        self.state.read().await.parameters.clone()
    }

    /// OpenAPI文書
    pub async fn swagger_content(&self) -> Option<Value> {
        self.state.read().await.swagger_content.clone()
    }

    /// 指定エンドポイントが機密パラメータ一覧に含まれるか
    pub async fn is_sensitive<T: EndpointIdentity + Sync + ?Sized>(&self, param: &T) -> bool {
        self.state.read().await.is_sensitive(param)
    }
}
