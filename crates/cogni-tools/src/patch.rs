use cogni_core::Metadata;

use crate::error::ToolError;

/// Patches larger than this many lines (text) or operations (JSON-Patch)
/// are rejected before any parsing is attempted.
pub const MAX_PATCH_SIZE: usize = 2000;

/// Applies a unified-diff text patch to `original`, producing the patched
/// text. Supports the standard `@@ -l,s +l,s @@` hunk header followed by
/// ` `/`-`/`+`-prefixed context/removed/added lines — the subset of the
/// format every unified-diff generator (including `similar`'s own
/// `unified_diff()` output) produces.
pub fn apply_text_patch(original: &str, patch_text: &str) -> Result<String, ToolError> {
    let patch_lines: Vec<&str> = patch_text.lines().collect();
    if patch_lines.len() > MAX_PATCH_SIZE {
        return Err(ToolError::PatchSizeLimit(format!(
            "patch has {} lines, limit is {MAX_PATCH_SIZE}",
            patch_lines.len()
        )));
    }

    let original_lines: Vec<&str> = original.lines().collect();
    let mut output: Vec<String> = Vec::with_capacity(original_lines.len());
    let mut source_cursor = 0usize; // 0-indexed position into original_lines
    let mut i = 0usize;
    let mut saw_hunk = false;

    while i < patch_lines.len() {
        let line = patch_lines[i];
        if line.starts_with("---") || line.starts_with("+++") {
            i += 1;
            continue;
        }
        if let Some(header) = line.strip_prefix("@@") {
            saw_hunk = true;
            let start = parse_hunk_start(header)
                .ok_or_else(|| ToolError::PatchParse(format!("malformed hunk header: {line}")))?;
            // Copy any untouched lines before this hunk verbatim.
            while source_cursor < start && source_cursor < original_lines.len() {
                output.push(original_lines[source_cursor].to_string());
                source_cursor += 1;
            }
            i += 1;
            while i < patch_lines.len() && !patch_lines[i].starts_with("@@") {
                let hunk_line = patch_lines[i];
                if let Some(rest) = hunk_line.strip_prefix(' ') {
                    if source_cursor >= original_lines.len() || original_lines[source_cursor] != rest {
                        return Err(ToolError::PatchApply(format!(
                            "context line mismatch at original line {}: expected {:?}",
                            source_cursor + 1,
                            rest
                        )));
                    }
                    output.push(rest.to_string());
                    source_cursor += 1;
                } else if let Some(rest) = hunk_line.strip_prefix('-') {
                    if source_cursor >= original_lines.len() || original_lines[source_cursor] != rest {
                        return Err(ToolError::PatchApply(format!(
                            "removal line mismatch at original line {}: expected {:?}",
                            source_cursor + 1,
                            rest
                        )));
                    }
                    source_cursor += 1;
                } else if let Some(rest) = hunk_line.strip_prefix('+') {
                    output.push(rest.to_string());
                } else if hunk_line.is_empty() {
                    // Tolerate a trailing blank line some diff tools emit.
                } else {
                    return Err(ToolError::PatchParse(format!("unrecognized patch line: {hunk_line:?}")));
                }
                i += 1;
            }
            continue;
        }
        return Err(ToolError::PatchParse(format!("unexpected line outside a hunk: {line:?}")));
    }

    if !saw_hunk {
        return Err(ToolError::PatchParse("patch contains no hunks".to_string()));
    }

    while source_cursor < original_lines.len() {
        output.push(original_lines[source_cursor].to_string());
        source_cursor += 1;
    }

    Ok(output.join("\n"))
}

fn parse_hunk_start(header: &str) -> Option<usize> {
    // header looks like " -12,5 +12,7 @@" (leading space, trailing " @@").
    let body = header.trim().trim_end_matches("@@").trim();
    let minus_field = body.split_whitespace().next()?;
    let line_part = minus_field.strip_prefix('-')?;
    let line_no: usize = line_part.split(',').next()?.parse().ok()?;
    Some(line_no.saturating_sub(1))
}

/// Applies an RFC-6902 JSON-Patch document to `target`, in place.
pub fn apply_json_patch(target: &mut serde_json::Value, patch_ops: &serde_json::Value) -> Result<(), ToolError> {
    let ops = patch_ops
        .as_array()
        .ok_or_else(|| ToolError::PatchParse("JSON-Patch document must be an array of operations".to_string()))?;
    if ops.len() > MAX_PATCH_SIZE {
        return Err(ToolError::PatchSizeLimit(format!(
            "patch has {} operations, limit is {MAX_PATCH_SIZE}",
            ops.len()
        )));
    }
    let patch: json_patch::Patch =
        serde_json::from_value(patch_ops.clone()).map_err(|e| ToolError::PatchParse(e.to_string()))?;
    json_patch::patch(target, &patch).map_err(|e| ToolError::PatchApply(e.to_string()))
}

/// Merges `incoming` into `current` when `merge` is set, otherwise
/// replaces outright. Shared by every update path's `merge_metadata` flag.
pub fn merge_metadata(current: &Metadata, incoming: Metadata, merge: bool) -> Metadata {
    if !merge {
        return incoming;
    }
    let mut merged = current.clone();
    merged.extend(incoming);
    merged
}

/// Deduplicating tag merge, mirroring `merge_metadata` for the `tags`
/// collection.
pub fn merge_tags(current: &[String], incoming: Vec<String>, merge: bool) -> Vec<String> {
    if !merge {
        return incoming;
    }
    let mut combined = current.to_vec();
    combined.extend(incoming);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_a_simple_single_hunk_patch() {
        let original = "line1\nline2\nline3\n";
        let patch = "@@ -1,3 +1,3 @@\n line1\n-line2\n+line2-changed\n line3\n";
        let patched = apply_text_patch(original, patch).unwrap();
        assert_eq!(patched, "line1\nline2-changed\nline3");
    }

    #[test]
    fn applies_an_addition_only_hunk() {
        let original = "line1\nline2\n";
        let patch = "@@ -1,2 +1,3 @@\n line1\n+inserted\n line2\n";
        let patched = apply_text_patch(original, patch).unwrap();
        assert_eq!(patched, "line1\ninserted\nline2");
    }

    #[test]
    fn mismatched_context_fails_to_apply() {
        let original = "line1\nline2\n";
        let patch = "@@ -1,2 +1,2 @@\n wrong-context\n-line2\n+line2-changed\n";
        assert!(apply_text_patch(original, patch).is_err());
    }

    #[test]
    fn oversized_patch_is_rejected() {
        let huge_patch: String = (0..MAX_PATCH_SIZE + 1).map(|i| format!("+line{i}\n")).collect();
        assert!(apply_text_patch("", &huge_patch).is_err());
    }

    #[test]
    fn json_patch_add_operation_applies() {
        let mut doc = serde_json::json!({"title": "old"});
        let ops = serde_json::json!([{"op": "replace", "path": "/title", "value": "new"}]);
        apply_json_patch(&mut doc, &ops).unwrap();
        assert_eq!(doc["title"], serde_json::json!("new"));
    }

    #[test]
    fn json_patch_on_missing_path_fails() {
        let mut doc = serde_json::json!({"title": "old"});
        let ops = serde_json::json!([{"op": "replace", "path": "/missing/nested", "value": "new"}]);
        assert!(apply_json_patch(&mut doc, &ops).is_err());
    }

    #[test]
    fn merge_tags_dedupe_is_left_to_caller() {
        let current = vec!["a".to_string()];
        let merged = merge_tags(&current, vec!["b".to_string()], true);
        assert_eq!(merged, vec!["a".to_string(), "b".to_string()]);
        let replaced = merge_tags(&current, vec!["b".to_string()], false);
        assert_eq!(replaced, vec!["b".to_string()]);
    }
}
