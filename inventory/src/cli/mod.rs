//! CLI module for api-inventory
//!
//! Provides command-line access to collection management and the inventory store.
//! Command results are printed to stdout as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use api_inventory_common::config::ClientConfig;
use api_inventory_common::types::{ApiCollection, CollectionId, SensitiveParam};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::client_config_from_env;
use crate::store::InventoryStore;
use crate::InventoryContext;

/// API inventory - Inspect and manage discovered API collections
#[derive(Parser, Debug)]
#[command(name = "api-inventory")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    INVENTORY_BASE_URL        Dashboard server URL (default: http://localhost:8080)
    INVENTORY_TIMEOUT_SECS    Request timeout in seconds (default: 30)
    INVENTORY_EVENT_CAPACITY  Store event channel capacity (default: 256)
    INVENTORY_LOG_LEVEL       Log level (default: info)
"#)]
pub struct Cli {
    /// Dashboard server URL (overrides INVENTORY_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides INVENTORY_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// 環境変数の設定にCLI引数を上書きしてクライアント設定を作る
    pub fn client_config(&self) -> ClientConfig {
        let mut config = client_config_from_env();
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.request_timeout_secs = timeout_secs;
        }
        config
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage API collections
    #[command(subcommand)]
    Collections(CollectionsCommand),
    /// Load a collection and print its endpoints, sensitive params and filters
    Endpoints(EndpointsArgs),
    /// Load the parameters of one endpoint
    Params(EndpointArgs),
    /// Toggle the sensitive flag of a parameter
    ToggleSensitive(ToggleSensitiveArgs),
    /// Generate the OpenAPI file of a collection
    Openapi(CollectionArgs),
    /// Export a collection to Postman
    ExportPostman(CollectionArgs),
    /// Upload a HAR file into a collection
    UploadHar(UploadHarArgs),
}

/// Collection management subcommands
#[derive(Subcommand, Debug)]
pub enum CollectionsCommand {
    /// List all collections
    List,
    /// Create a collection
    Create {
        /// Display name
        name: String,
    },
    /// Delete a collection
    Delete {
        /// Collection ID
        id: CollectionId,
        /// Delete as a logical group
        #[arg(long)]
        logical_group: bool,
    },
    /// Delete several collections at once
    DeleteMany {
        /// Collection IDs
        #[arg(required = true)]
        ids: Vec<CollectionId>,
    },
}

/// Arguments naming a single collection
#[derive(Args, Debug, Clone)]
pub struct CollectionArgs {
    /// Collection ID
    pub id: CollectionId,
}

/// Arguments for the endpoints subcommand
#[derive(Args, Debug, Clone)]
pub struct EndpointsArgs {
    /// Collection ID
    pub id: CollectionId,
    /// Do not wait for sensitive params, content and filters
    #[arg(long)]
    pub no_wait: bool,
}

/// Arguments naming a single endpoint
#[derive(Args, Debug, Clone)]
pub struct EndpointArgs {
    /// Collection ID
    pub id: CollectionId,
    /// Endpoint URL
    pub url: String,
    /// HTTP method
    pub method: String,
}

/// Arguments for the toggle-sensitive subcommand
#[derive(Args, Debug, Clone)]
pub struct ToggleSensitiveArgs {
    #[command(flatten)]
    endpoint: EndpointArgs,
    /// Parameter name
    #[arg(long)]
    pub param: String,
    /// The parameter is a header
    #[arg(long)]
    pub header: bool,
    /// Response code (-1 for request parameters)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub response_code: i32,
}

impl ToggleSensitiveArgs {
    fn into_param(self) -> SensitiveParam {
        SensitiveParam {
            url: self.endpoint.url,
            method: self.endpoint.method,
            api_collection_id: self.endpoint.id,
            param: self.param,
            is_header: self.header,
            response_code: self.response_code,
            sub_type: None,
            sensitive: true,
        }
    }
}

/// Arguments for the upload-har subcommand
#[derive(Args, Debug, Clone)]
pub struct UploadHarArgs {
    /// Collection ID
    pub id: CollectionId,
    /// HAR file path
    pub file: PathBuf,
    /// Skip Kafka ingestion on the server
    #[arg(long)]
    pub skip_kafka: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

/// コレクションを選択する（二次取得は待たない）
async fn select_collection(store: &InventoryStore, id: CollectionId) -> Result<()> {
    let secondary = store.load_api_collection(id, true).await;
    if secondary.is_empty() {
        anyhow::bail!("Failed to load collection {}", id);
    }
    Ok(())
}

/// Execute a parsed command
pub async fn execute(context: &InventoryContext, command: Commands) -> Result<()> {
    let store = &context.store;
    match command {
        Commands::Collections(command) => execute_collections(context, command).await,
        Commands::Endpoints(args) => {
            let secondary = store.load_api_collection(args.id, true).await;
            if secondary.is_empty() {
                anyhow::bail!("Failed to load collection {}", args.id);
            }
            if !args.no_wait {
                secondary.settled().await;
            }
            print_json(&store.snapshot().await)
        }
        Commands::Params(args) => {
            store
                .load_params_of_endpoint(args.id, &args.url, &args.method)
                .await?;
            print_json(&store.parameters().await)
        }
        Commands::ToggleSensitive(args) => {
            let response = store.toggle_sensitive_param(args.into_param()).await?;
            print_json(&response)
        }
        Commands::Openapi(args) => {
            select_collection(store, args.id).await?;
            print_json(&store.download_open_api_file().await?)
        }
        Commands::ExportPostman(args) => {
            select_collection(store, args.id).await?;
            print_json(&store.export_to_postman().await?)
        }
        Commands::UploadHar(args) => {
            let content = tokio::fs::read_to_string(&args.file)
                .await
                .with_context(|| format!("Failed to read HAR file `{}`", args.file.display()))?;
            let filename = args
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            select_collection(store, args.id).await?;
            let response = store
                .upload_har_file(content, &filename, args.skip_kafka)
                .await?;
            print_json(&response)
        }
    }
}

async fn execute_collections(
    context: &InventoryContext,
    command: CollectionsCommand,
) -> Result<()> {
    let collections = &context.collections;
    let response = match command {
        CollectionsCommand::List => collections.list_collections().await?,
        CollectionsCommand::Create { name } => collections.create_collection(&name).await?,
        CollectionsCommand::Delete { id, logical_group } => {
            collections.delete_collection(id, logical_group).await?
        }
        CollectionsCommand::DeleteMany { ids } => {
            let items = ids.into_iter().map(ApiCollection::with_id).collect();
            collections.delete_multiple_collections(items).await?
        }
    };
    print_json(&response)
}
