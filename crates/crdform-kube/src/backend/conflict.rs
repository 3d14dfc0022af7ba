//! Parsing of server-side apply conflict messages
//!
//! The API server reports ownership conflicts as text only:
//!
//! ```text
//! Apply failed with 1 conflict: conflict with "helm" using loki.grafana.com/v1: .spec.pollInterval
//! Apply failed with 2 conflicts: conflicts with "helm" using loki.grafana.com/v1:
//! - .spec.pollInterval
//! - .spec.evaluationInterval
//! ```

use crate::error::FieldConflict;

/// Extract `(field, manager)` pairs from an "Apply failed" message
///
/// Unrecognized lines are skipped; the caller keeps the raw message.
pub fn parse_apply_conflicts(message: &str) -> Vec<FieldConflict> {
    let mut conflicts = Vec::new();
    let mut manager: Option<String> = None;

    for line in message.lines().map(str::trim) {
        if let Some(field) = line.strip_prefix("- ") {
            if let Some(owner) = &manager {
                push(&mut conflicts, field, owner);
            }
            continue;
        }

        let Some((owner, rest)) = manager_clause(line) else {
            continue;
        };
        if let Some((_, field)) = rest.split_once(": ") {
            push(&mut conflicts, field, owner);
        }
        manager = Some(owner.to_string());
    }

    conflicts
}

/// Split `... conflict(s) with "owner"<rest>` into owner and rest
fn manager_clause(line: &str) -> Option<(&str, &str)> {
    let start = ["conflicts with \"", "conflict with \""]
        .iter()
        .find_map(|marker| line.find(marker).map(|idx| idx + marker.len()))?;
    let tail = &line[start..];
    let end = tail.find('"')?;
    Some((&tail[..end], &tail[end + 1..]))
}

fn push(conflicts: &mut Vec<FieldConflict>, field: &str, manager: &str) {
    let field = field.trim();
    if field.is_empty() {
        return;
    }
    conflicts.push(FieldConflict {
        field: field.to_string(),
        manager: manager.to_string(),
    });
}
