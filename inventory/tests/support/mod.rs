//! 統合テスト共通ヘルパー

#![allow(dead_code)]

use std::sync::Arc;

use api_inventory::api::{HttpDispatcher, RequestDispatcher};
use api_inventory::InventoryContext;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// モックサーバーへ接続するコンテキストを作成
pub fn context(server: &MockServer) -> InventoryContext {
    let dispatcher: Arc<dyn RequestDispatcher> =
        Arc::new(HttpDispatcher::from_client(&server.uri(), reqwest::Client::new()));
    InventoryContext::with_dispatcher(dispatcher, 64)
}

/// `fetchAPICollection` のレスポンスボディ
pub fn collection_body(name: &str, endpoints: &[(&str, &str, i32)]) -> Value {
    let endpoints: Vec<Value> = endpoints
        .iter()
        .map(|(url, method, id)| {
            json!({
                "_id": {"url": url, "method": method, "apiCollectionId": id},
                "startTs": 1_700_000_000
            })
        })
        .collect();
    json!({
        "data": {
            "name": name,
            "endpoints": endpoints,
            "apiInfoList": []
        }
    })
}

/// 指定コレクションの `fetchAPICollection` をモック
pub async fn mount_collection(server: &MockServer, id: i32, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/fetchAPICollection"))
        .and(body_partial_json(json!({"apiCollectionId": id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// 名前とエンドポイントを指定してコレクションをモック
pub async fn mount_endpoints(
    server: &MockServer,
    id: i32,
    name: &str,
    endpoints: &[(&str, &str, i32)],
) {
    mount_collection(server, id, collection_body(name, endpoints)).await;
}

/// 二次取得（機密・文書・フィルタ）を空の結果でモック
pub async fn mount_empty_secondary(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/fetchSensitiveParamsForEndpoints"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"endpoints": []}})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/loadContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/fetchFilters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"runtimeFilters": []})))
        .mount(server)
        .await;
}
