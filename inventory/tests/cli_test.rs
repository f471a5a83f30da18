//! Integration Test: CLIコマンド
//!
//! コレクションを指定するコマンドがストア経由で選択してから送出することを確認する。

mod support;

use api_inventory::cli::{self, CollectionArgs, Commands, UploadHarArgs};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_export_postman_selects_collection() {
    let server = MockServer::start().await;
    support::mount_endpoints(&server, 7, "shop", &[("/a", "GET", 7)]).await;
    support::mount_empty_secondary(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/createPostmanApi"))
        .and(body_json(json!({"apiCollectionId": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let context = support::context(&server);
    let command = Commands::ExportPostman(CollectionArgs { id: 7 });
    cli::execute(&context, command).await.unwrap();

    assert_eq!(context.store.api_collection_id().await, 7);
    assert_eq!(context.store.api_collection().await.len(), 1);
}

#[tokio::test]
async fn test_openapi_fails_when_collection_cannot_be_loaded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/fetchAPICollection"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generateOpenApiFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let context = support::context(&server);
    let command = Commands::Openapi(CollectionArgs { id: 9 });
    let err = cli::execute(&context, command).await.unwrap_err();

    assert!(err.to_string().contains("collection 9"));
}

#[tokio::test]
async fn test_upload_har_sends_file_to_selected_collection() {
    let server = MockServer::start().await;
    support::mount_endpoints(&server, 7, "shop", &[("/a", "GET", 7)]).await;
    support::mount_empty_secondary(&server).await;
    let body = json!({"content": "{\"log\":{}}", "apiCollectionId": 7, "skipKafka": false});
    Mock::given(method("POST"))
        .and(path("/api/uploadHar"))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("shop.har");
    std::fs::write(&file, "{\"log\":{}}").unwrap();

    let context = support::context(&server);
    let command = Commands::UploadHar(UploadHarArgs {
        id: 7,
        file,
        skip_kafka: false,
    });
    cli::execute(&context, command).await.unwrap();
}

#[tokio::test]
async fn test_upload_har_missing_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/uploadHar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let context = support::context(&server);
    let command = Commands::UploadHar(UploadHarArgs {
        id: 7,
        file: dir.path().join("missing.har"),
        skip_kafka: true,
    });
    let err = cli::execute(&context, command).await.unwrap_err();

    assert!(err.to_string().contains("Failed to read HAR file"));
}
