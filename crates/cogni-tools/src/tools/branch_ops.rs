//! Branch operations exposed as tools (§4.4 "Branch operations (exposed
//! as tools)"): `DoltCommit`, `DoltAdd`, `DoltReset`, `DoltStatus`,
//! `DoltCheckout`, `DoltBranch`, `DoltListBranches`, `DoltPush`,
//! `DoltPull`, `DoltMerge`, `DoltDiff`, `DoltAutoCommitAndPush`. Each is a
//! near-direct passthrough to the matching
//! `cogni-bank::StructuredMemoryBank` method, returning the active branch
//! per §4.4's "each returns a structured envelope including the active
//! branch".

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::MemoryBankHandle;
use cogni_sql::diff::StagedChange;

use crate::descriptor::{make_tool, CogniTool};
use crate::error::Result;

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltStatusInput {}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltStatusOutput {
    success: bool,
    staged: Vec<StagedChange>,
}

async fn dolt_status(_input: DoltStatusInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltStatusOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let staged = bank.status().await?;
    Ok(DoltStatusOutput { success: true, staged })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltAddInput {
    #[serde(default)]
    tables: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltAddOutput {
    success: bool,
}

async fn dolt_add(input: DoltAddInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltAddOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let tables: Vec<&str> = if input.tables.is_empty() {
        cogni_bank::STAGING_TABLES.to_vec()
    } else {
        input.tables.iter().map(String::as_str).collect()
    };
    bank.add_to_staging(&tables).await?;
    Ok(DoltAddOutput { success: true })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltCommitInput {
    message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltCommitOutput {
    success: bool,
    commit_hash: String,
}

async fn dolt_commit(input: DoltCommitInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltCommitOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let commit_hash = bank.commit(&input.message).await?;
    Ok(DoltCommitOutput { success: true, commit_hash })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltResetInput {
    #[serde(default)]
    hard: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltResetOutput {
    success: bool,
}

async fn dolt_reset(input: DoltResetInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltResetOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    bank.reset(input.hard).await?;
    Ok(DoltResetOutput { success: true })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltCheckoutInput {
    branch: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltCheckoutOutput {
    success: bool,
    active_branch: String,
}

async fn dolt_checkout(input: DoltCheckoutInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltCheckoutOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    bank.checkout(&input.branch).await?;
    Ok(DoltCheckoutOutput {
        success: true,
        active_branch: bank.active_branch().await,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltBranchInput {
    name: String,
    #[serde(default = "default_from_ref")]
    from_ref: String,
}

fn default_from_ref() -> String {
    "HEAD".to_string()
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltBranchOutput {
    success: bool,
    name: String,
}

async fn dolt_branch(input: DoltBranchInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltBranchOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    bank.create_branch(&input.name, &input.from_ref).await?;
    Ok(DoltBranchOutput {
        success: true,
        name: input.name,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltListBranchesInput {}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltListBranchesOutput {
    success: bool,
    branches: Vec<String>,
}

async fn dolt_list_branches(_input: DoltListBranchesInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltListBranchesOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let branches = bank.list_branches().await?;
    Ok(DoltListBranchesOutput { success: true, branches })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltPushInput {
    #[serde(default = "default_remote")]
    remote: String,
}

fn default_remote() -> String {
    "origin".to_string()
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltPushOutput {
    success: bool,
}

async fn dolt_push(input: DoltPushInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltPushOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    bank.push(&input.remote).await?;
    Ok(DoltPushOutput { success: true })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltPullInput {
    #[serde(default = "default_remote")]
    remote: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltPullOutput {
    success: bool,
}

async fn dolt_pull(input: DoltPullInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltPullOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    bank.pull(&input.remote).await?;
    Ok(DoltPullOutput { success: true })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltMergeInput {
    source_branch: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltMergeOutput {
    success: bool,
    commit_hash: String,
}

async fn dolt_merge(input: DoltMergeInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltMergeOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let commit_hash = bank.merge(&input.source_branch).await?;
    Ok(DoltMergeOutput { success: true, commit_hash })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltDiffInput {
    from_ref: String,
    to_ref: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltDiffOutput {
    success: bool,
    diff: cogni_sql::diff::BranchDiff,
}

async fn dolt_diff(input: DoltDiffInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DoltDiffOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let diff = bank.diff(&input.from_ref, &input.to_ref).await?;
    Ok(DoltDiffOutput { success: true, diff })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DoltAutoCommitAndPushInput {
    #[serde(default = "default_remote")]
    remote: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DoltAutoCommitAndPushOutput {
    success: bool,
    pushed: bool,
}

async fn dolt_auto_commit_and_push(
    input: DoltAutoCommitAndPushInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<DoltAutoCommitAndPushOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let pushed = bank.auto_commit_and_push(&input.remote).await?;
    Ok(DoltAutoCommitAndPushOutput { success: true, pushed })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool("DoltStatus", "Lists the currently staged changes on the active branch.", true, dolt_status),
        make_tool("DoltAdd", "Stages the fixed memory-surface tables, or an explicit subset.", true, dolt_add),
        make_tool("DoltCommit", "Commits the staged changes on the active branch.", true, dolt_commit),
        make_tool("DoltReset", "Discards the staged working set, optionally hard-resetting tracked tables.", true, dolt_reset),
        make_tool("DoltCheckout", "Switches the active branch.", true, dolt_checkout),
        make_tool("DoltBranch", "Creates a new branch from a starting ref.", true, dolt_branch),
        make_tool("DoltListBranches", "Lists every known branch.", true, dolt_list_branches),
        make_tool("DoltPush", "Pushes the active branch to a remote.", true, dolt_push),
        make_tool("DoltPull", "Pulls the active branch from a remote.", true, dolt_pull),
        make_tool("DoltMerge", "Merges a source branch into the active branch.", true, dolt_merge),
        make_tool("DoltDiff", "Diffs two refs on the memory-surface tables.", true, dolt_diff),
        make_tool(
            "DoltAutoCommitAndPush",
            "Composite status → add → commit → push, skipped when the working set is clean.",
            true,
            dolt_auto_commit_and_push,
        ),
    ]
}
