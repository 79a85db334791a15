//! `HealthCheck` — a lightweight liveness probe over the bank connection,
//! reporting the active branch so callers can detect an unexpected
//! checkout alongside basic reachability.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::MemoryBankHandle;

use crate::descriptor::{make_tool, CogniTool};
use crate::error::Result;

#[derive(Debug, Deserialize, JsonSchema)]
struct HealthCheckInput {}

#[derive(Debug, Serialize, JsonSchema)]
struct HealthCheckOutput {
    success: bool,
    healthy: bool,
    active_branch: String,
}

async fn health_check(_input: HealthCheckInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<HealthCheckOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let active_branch = bank.active_branch().await;
    let healthy = bank.status().await.is_ok();
    Ok(HealthCheckOutput {
        success: true,
        healthy,
        active_branch,
    })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![make_tool(
        "HealthCheck",
        "Reports bank reachability and the active branch.",
        true,
        health_check,
    )]
}
