use cogni_core::{BlockState, Metadata, Visibility};

/// Partial update to an existing block. `None` fields are left untouched;
/// `merge_tags`/`merge_metadata` control whether the corresponding `Some`
/// field replaces or is unioned with the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateBlockRequest {
    pub id: String,
    pub previous_block_version: Option<i64>,
    pub namespace_id: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Metadata>,
    pub state: Option<BlockState>,
    pub visibility: Option<Visibility>,
    pub merge_tags: bool,
    pub merge_metadata: bool,
}

impl UpdateBlockRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
