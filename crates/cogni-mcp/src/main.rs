//! Starts the cogni memory MCP server: loads process-wide configuration,
//! connects the SQL engine and vector index, builds the `StructuredMemoryBank`
//! and tool registry, and serves every registered tool over the stdio
//! transport. Blocks until the peer disconnects (EOF) or the process is
//! signaled.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tracing::info;

use cogni_bank::{MemoryBankHandle, StructuredMemoryBank};
use cogni_config::ConfigLoader;
use cogni_mcp::CogniMcpServer;
use cogni_sql::MySqlEngine;
use cogni_tools::context::SharedContext;
use cogni_tools::dispatch::ToolExecutor;
use cogni_tools::tools::build_registry;
use cogni_vector::{HashEmbeddingProvider, LanceVectorIndex};

/// `COGNI_CONFIG_PATH` points at an optional TOML file layered under the
/// built-in defaults and `COGNI_*` environment variables, matching
/// `ConfigLoader::load`'s precedence order.
const CONFIG_PATH_ENV: &str = "COGNI_CONFIG_PATH";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config = ConfigLoader::load(config_path.as_deref().map(std::path::Path::new)).context("failed to load cogni configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    info!(branch = %config.current_branch, namespace = %config.current_namespace, "starting cogni-mcp server");

    let sql_engine = Arc::new(
        MySqlEngine::connect(&config.sql)
            .await
            .context("failed to connect to the versioned SQL engine")?,
    );
    sql_engine.ensure_schema().await.context("failed to bootstrap the memory-surface schema")?;

    let embedder = Arc::new(HashEmbeddingProvider);
    let vector_index = Arc::new(
        LanceVectorIndex::connect(&config.vector_index_path, "memory_blocks", embedder)
            .await
            .context("failed to open the vector index")?,
    );

    let bank = StructuredMemoryBank::new(
        sql_engine.clone(),
        sql_engine,
        vector_index,
        config.current_branch.clone(),
        true,
    );
    let bank: Arc<dyn MemoryBankHandle> = Arc::new(bank);

    let context = Arc::new(SharedContext::new(config.current_namespace.clone()));
    let registry = build_registry(context.clone());
    let tool_count = registry.count();
    let executor = Arc::new(ToolExecutor::new(registry, Some(bank), context));

    info!(tool_count, "tool registry built, serving over stdio");

    let server = CogniMcpServer::new(executor);
    let service = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .context("failed to start the MCP stdio transport")?;

    service.waiting().await.context("MCP server transport failed")?;

    info!("cogni-mcp server shutting down");
    Ok(())
}
