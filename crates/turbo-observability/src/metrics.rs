//! Per-session editor metrics.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SessionId;

/// Counters for one action kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    /// Times the action changed the page.
    pub applied: u64,
    /// Times the action was a no-op.
    pub unchanged: u64,
}

/// Metrics for a single backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendCallMetrics {
    /// Operation name (e.g. `save_page`, `upload_image`).
    pub operation: String,
    /// Call duration (microseconds).
    pub duration_us: u64,
    /// Whether the call succeeded.
    pub success: bool,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Metrics collected over one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorMetrics {
    /// Session ID for correlation.
    pub session_id: String,
    /// Dispatch counters keyed by action name.
    pub actions: BTreeMap<String, ActionCounts>,
    /// Undo steps actually taken.
    pub undo_count: u64,
    /// Redo steps actually taken.
    pub redo_count: u64,
    /// Deepest history observed.
    pub max_history_depth: usize,
    /// Backend calls in order.
    pub backend_calls: Vec<BackendCallMetrics>,
}

impl EditorMetrics {
    /// Create empty metrics for a session.
    pub fn new(session_id: &SessionId) -> Self {
        Self {
            session_id: session_id.to_string(),
            actions: BTreeMap::new(),
            undo_count: 0,
            redo_count: 0,
            max_history_depth: 0,
            backend_calls: Vec::new(),
        }
    }

    /// Record one dispatched action.
    pub fn record_action(&mut self, name: &str, applied: bool) {
        let counts = self.actions.entry(name.to_string()).or_default();
        if applied {
            counts.applied += 1;
        } else {
            counts.unchanged += 1;
        }
    }

    /// Record an undo step that moved the history cursor.
    pub fn record_undo(&mut self) {
        self.undo_count += 1;
    }

    /// Record a redo step that moved the history cursor.
    pub fn record_redo(&mut self) {
        self.redo_count += 1;
    }

    /// Track the history depth high-water mark.
    pub fn observe_history_depth(&mut self, depth: usize) {
        self.max_history_depth = self.max_history_depth.max(depth);
    }

    /// Record a backend call.
    pub fn record_backend_call(
        &mut self,
        operation: &str,
        duration: Duration,
        success: bool,
        error: Option<String>,
    ) {
        self.backend_calls.push(BackendCallMetrics {
            operation: operation.to_string(),
            duration_us: duration.as_micros() as u64,
            success,
            error,
        });
    }

    /// Counters for one action name.
    pub fn action(&self, name: &str) -> ActionCounts {
        self.actions.get(name).copied().unwrap_or_default()
    }

    /// Total actions that changed the page.
    pub fn total_applied(&self) -> u64 {
        self.actions.values().map(|c| c.applied).sum()
    }

    /// Failed backend calls.
    pub fn failed_backend_calls(&self) -> usize {
        self.backend_calls.iter().filter(|c| !c.success).count()
    }

    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Session: {}", self.session_id));
        lines.push(format!(
            "  Undo/redo: {}/{} (max depth {})",
            self.undo_count, self.redo_count, self.max_history_depth
        ));

        if !self.actions.is_empty() {
            lines.push("  Actions:".to_string());
            for (name, counts) in &self.actions {
                lines.push(format!(
                    "    {}: {} applied, {} unchanged",
                    name, counts.applied, counts.unchanged
                ));
            }
        }

        if !self.backend_calls.is_empty() {
            lines.push("  Backend:".to_string());
            for call in &self.backend_calls {
                let status = if call.success { "ok" } else { "FAILED" };
                lines.push(format!(
                    "    {} [{}]: {}us ({:.2}ms)",
                    call.operation,
                    status,
                    call.duration_us,
                    call.duration_us as f64 / 1000.0
                ));
            }
        }

        lines.join("\n")
    }
}
