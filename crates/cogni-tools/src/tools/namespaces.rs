//! Namespace management: `CreateNamespace`, `ListNamespaces`. Grounded in
//! `cogni-bank::StructuredMemoryBank::{create_namespace,list_namespaces}`
//! and the namespace validation cache's invalidate-on-create contract.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::MemoryBankHandle;
use cogni_core::Namespace;

use crate::descriptor::{make_tool, CogniTool};
use crate::error::Result;

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateNamespaceInput {
    id: String,
    name: String,
    slug: Option<String>,
    owner_id: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct CreateNamespaceOutput {
    success: bool,
    id: String,
}

async fn create_namespace(input: CreateNamespaceInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<CreateNamespaceOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let namespace = Namespace {
        id: input.id.clone(),
        name: input.name,
        slug: input.slug.unwrap_or_else(|| Namespace::normalize_id(&input.id)),
        owner_id: input.owner_id,
        created_at: chrono::Utc::now(),
        description: input.description,
        is_active: true,
    };
    let created = bank.create_namespace(namespace).await?;
    Ok(CreateNamespaceOutput {
        success: true,
        id: created.id,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListNamespacesInput {}

#[derive(Debug, Serialize, JsonSchema)]
struct NamespaceSummary {
    id: String,
    name: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct ListNamespacesOutput {
    success: bool,
    namespaces: Vec<NamespaceSummary>,
}

async fn list_namespaces(_input: ListNamespacesInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<ListNamespacesOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let namespaces = bank
        .list_namespaces()
        .await?
        .into_iter()
        .map(|(id, name)| NamespaceSummary { id, name })
        .collect();
    Ok(ListNamespacesOutput {
        success: true,
        namespaces,
    })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool(
            "CreateNamespace",
            "Creates a new namespace, invalidating the namespace validation cache.",
            true,
            create_namespace,
        ),
        make_tool("ListNamespaces", "Lists every known namespace.", true, list_namespaces),
    ]
}
