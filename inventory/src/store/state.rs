//! インベントリ状態スナップショット
//!
//! 状態遷移（ミューテーション）はすべて同期的なメソッドで、
//! ストアが書き込みロックを保持したまま呼び出す。

use std::collections::{BTreeSet, HashMap};

use api_inventory_common::protocol::CollectionData;
use api_inventory_common::types::{
    ApiInfo, CollectionId, Endpoint, EndpointIdentity, EndpointParam, RuntimeFilter, SensitiveParam,
};
use serde::Serialize;
use serde_json::Value;

/// ストアが保持する状態
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryState {
    /// 読み込み中か
    pub loading: bool,
    /// 取得時刻
    pub fetch_ts: i64,
    /// 最後にコレクション読み込みを開始した時刻（UNIX秒）
    pub last_fetched: i64,
    /// 選択中コレクションID
    pub api_collection_id: CollectionId,
    /// 選択中コレクション名
    pub api_collection_name: String,
    /// 選択中コレクションのエンドポイント
    pub api_collection: Vec<Endpoint>,
    /// 機密パラメータ一覧
    pub sensitive_params: Vec<SensitiveParam>,
    /// OpenAPI文書
    pub swagger_content: Option<Value>,
    /// 保存したOpenAPI文書のファイル名
    pub filename: Option<String>,
    /// API情報一覧
    pub api_info_list: Vec<ApiInfo>,
    /// フィルタ名 → 定義
    pub filters: HashMap<String, RuntimeFilter>,
    /// 選択中エンドポイントのパラメータ
    pub parameters: Vec<EndpointParam>,
    /// 選択中エンドポイントのURL
    pub url: String,
    /// 選択中エンドポイントのメソッド
    pub method: String,
}

impl InventoryState {
    /// コレクション単位の状態をクリア
    ///
    /// 機密パラメータ・API情報・フィルタはコレクションを跨いで保持する。
    pub fn empty_state(&mut self) {
        self.loading = false;
        self.fetch_ts = 0;
        self.api_collection_id = 0;
        self.api_collection = Vec::new();
        self.api_collection_name = String::new();
        self.swagger_content = None;
        self.parameters = Vec::new();
        self.url = String::new();
        self.method = String::new();
    }

    /// エンドポイント単位の状態をクリア
    pub fn empty_params(&mut self) {
        self.loading = false;
        self.parameters = Vec::new();
        self.url = String::new();
        self.method = String::new();
    }

    /// 取得したコレクションを反映
    pub fn save_api_collection(&mut self, api_collection_id: CollectionId, data: CollectionData) {
        self.api_collection_id = api_collection_id;
        self.api_collection_name = data.name.unwrap_or_default();
        self.api_collection = data.endpoints.into_iter().map(Endpoint::from).collect();
        self.api_info_list = data.api_info_list;
    }

    /// 機密パラメータの登録状態を反転する
    ///
    /// 戻り値は反転後の状態（true = 登録済み）。
    pub fn toggle_sensitive(&mut self, param: SensitiveParam) -> bool {
        let existing = self
            .sensitive_params
            .iter()
            .position(|x| x.same_endpoint(&param));
        let saved_as_sensitive = existing.is_none();

        if let Some(endpoint) = self
            .api_collection
            .iter_mut()
            .find(|x| x.same_endpoint(&param))
        {
            endpoint.saved_as_sensitive = Some(saved_as_sensitive);
        }

        match existing {
            None => self.sensitive_params.push(param),
            Some(index) => {
                self.sensitive_params.remove(index);
            }
        }

        saved_as_sensitive
    }

    /// 機密パラメータ一覧を置き換え、対応するエンドポイントへタグを付与する
    ///
    /// タグは追加のみで、以前の呼び出しで付与したものは残る。
    pub fn save_sensitive(&mut self, fields: Vec<SensitiveParam>) {
        for field in &fields {
            if let Some(endpoint) = self
                .api_collection
                .iter_mut()
                .find(|x| x.same_endpoint(field))
            {
                endpoint
                    .sensitive
                    .get_or_insert_with(BTreeSet::new)
                    .insert(field.sub_type_or_custom());
            }
        }
        self.sensitive_params = fields;
    }

    /// 選択中エンドポイントとパラメータを反映
    pub fn save_params(&mut self, method: String, url: String, parameters: Vec<EndpointParam>) {
        self.method = method;
        self.url = url;
        self.parameters = parameters;
    }

    /// フィルタ定義を名前ごとにマージ
    pub fn merge_filters(&mut self, filters: Vec<RuntimeFilter>) {
        for filter in filters {
            self.filters.insert(filter.custom_field_name.clone(), filter);
        }
    }

    /// 保存したOpenAPI文書を反映
    pub fn save_content(
        &mut self,
        swagger_content: Value,
        filename: String,
        api_collection_id: CollectionId,
    ) {
        self.filename = Some(filename);
        self.swagger_content = Some(swagger_content);
        self.api_collection_id = api_collection_id;
    }

    /// 指定エンドポイントが機密パラメータ一覧に含まれるか
    pub fn is_sensitive<T: EndpointIdentity + ?Sized>(&self, param: &T) -> bool {
        self.sensitive_params.iter().any(|x| x.same_endpoint(param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_inventory_common::protocol::RawEndpoint;
    use api_inventory_common::types::{EndpointKey, SubType};
    use serde_json::json;

    fn sensitive(
        url: &str,
        method: &str,
        id: CollectionId,
        sub_type: Option<&str>,
    ) -> SensitiveParam {
        SensitiveParam {
            url: url.to_string(),
            method: method.to_string(),
            api_collection_id: id,
            param: "email".to_string(),
            is_header: false,
            response_code: -1,
            sub_type: sub_type.map(SubType::new),
            sensitive: true,
        }
    }

    fn collection_data(endpoints: &[(&str, &str, CollectionId)]) -> CollectionData {
        CollectionData {
            name: Some("shop".to_string()),
            endpoints: endpoints
                .iter()
                .map(|(url, method, id)| RawEndpoint {
                    id: EndpointKey::new(*url, *method, *id),
                    start_ts: 1_700_000_000,
                })
                .collect(),
            api_info_list: Vec::new(),
        }
    }

    fn loaded_state() -> InventoryState {
        let mut state = InventoryState::default();
        state.save_api_collection(7, collection_data(&[("/a", "GET", 7), ("/b", "POST", 7)]));
        state
    }

    #[test]
    fn test_save_api_collection_flattens_endpoints() {
        let state = loaded_state();

        assert_eq!(state.api_collection_id, 7);
        assert_eq!(state.api_collection_name, "shop");
        assert_eq!(state.api_collection.len(), 2);
        assert_eq!(state.api_collection[0].url, "/a");
        assert_eq!(state.api_collection[0].start_ts, 1_700_000_000);
    }

    #[test]
    fn test_toggle_sensitive_alternates_membership() {
        let mut state = loaded_state();
        let param = sensitive("/a", "GET", 7, None);

        for round in 0..4 {
            let saved = state.toggle_sensitive(param.clone());
            let expected = round % 2 == 0;

            assert_eq!(saved, expected);
            assert_eq!(state.is_sensitive(&param), expected);
            assert_eq!(state.api_collection[0].saved_as_sensitive, Some(expected));
        }
        // 別エンドポイントには影響しない
        assert_eq!(state.api_collection[1].saved_as_sensitive, None);
    }

    #[test]
    fn test_toggle_sensitive_without_matching_endpoint() {
        let mut state = loaded_state();
        let param = sensitive("/missing", "GET", 7, None);

        assert!(state.toggle_sensitive(param.clone()));
        assert!(state.is_sensitive(&param));
        let endpoints = &state.api_collection;
        assert!(endpoints.iter().all(|e| e.saved_as_sensitive.is_none()));
    }

    #[test]
    fn test_empty_state_keeps_global_config() {
        let mut state = loaded_state();
        state.loading = true;
        state.fetch_ts = 99;
        state.swagger_content = Some(json!({"openapi": "3.0.0"}));
        state.save_sensitive(vec![sensitive("/a", "GET", 7, None)]);
        state.merge_filters(vec![RuntimeFilter {
            custom_field_name: "auth".to_string(),
            extra: Default::default(),
        }]);
        state.save_params("GET".to_string(), "/a".to_string(), Vec::new());

        state.empty_state();

        assert!(!state.loading);
        assert_eq!(state.fetch_ts, 0);
        assert_eq!(state.api_collection_id, 0);
        assert!(state.api_collection.is_empty());
        assert!(state.api_collection_name.is_empty());
        assert!(state.swagger_content.is_none());
        assert!(state.url.is_empty());
        assert!(state.method.is_empty());
        assert_eq!(state.sensitive_params.len(), 1);
        assert!(state.filters.contains_key("auth"));
    }

    #[test]
    fn test_empty_params_keeps_collection() {
        let mut state = loaded_state();
        state.loading = true;
        state.save_params("GET".to_string(), "/a".to_string(), Vec::new());

        state.empty_params();

        assert!(!state.loading);
        assert!(state.url.is_empty());
        assert!(state.method.is_empty());
        assert!(state.parameters.is_empty());
        assert_eq!(state.api_collection_id, 7);
        assert_eq!(state.api_collection.len(), 2);
    }

    #[test]
    fn test_is_sensitive_matches_first_entry() {
        let mut state = InventoryState::default();
        let first = sensitive("/a", "GET", 7, None);
        state.save_sensitive(vec![first.clone(), sensitive("/b", "POST", 7, None)]);

        assert!(state.is_sensitive(&first));
        assert!(state.is_sensitive(&EndpointKey::new("/b", "POST", 7)));
        assert!(!state.is_sensitive(&EndpointKey::new("/a", "GET", 8)));
    }

    #[test]
    fn test_save_sensitive_tags_are_additive() {
        let mut state = loaded_state();

        state.save_sensitive(vec![
            sensitive("/a", "GET", 7, Some("EMAIL")),
            sensitive("/a", "GET", 7, None),
        ]);
        state.save_sensitive(vec![
            sensitive("/a", "GET", 7, Some("EMAIL")),
            sensitive("/a", "GET", 7, Some("PHONE")),
        ]);

        let tags: Vec<&str> = state.api_collection[0]
            .sensitive
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(tags, vec!["CUSTOM", "EMAIL", "PHONE"]);
        assert_eq!(state.sensitive_params.len(), 2);
        assert!(state.api_collection[1].sensitive.is_none());
    }

    #[test]
    fn test_merge_filters_overwrites_by_name() {
        let mut state = InventoryState::default();
        let filter = |name: &str, version: i64| RuntimeFilter {
            custom_field_name: name.to_string(),
            extra: json!({"version": version}).as_object().unwrap().clone(),
        };

        state.merge_filters(vec![filter("auth", 1), filter("pii", 1)]);
        state.merge_filters(vec![filter("auth", 2)]);

        assert_eq!(state.filters.len(), 2);
        assert_eq!(state.filters["auth"].extra["version"], 2);
    }
}
