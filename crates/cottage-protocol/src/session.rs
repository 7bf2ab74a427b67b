//! Per-session inspection state.
//!
//! History is stored oldest → newest. Callers that address entries by
//! position use *display indices*, where 0 is the most recent entry; this is
//! the order the history page lists them in.

use serde::{Deserialize, Serialize};

use crate::inspection::InspectionResult;

/// Maximum number of inspections kept per session.
pub const HISTORY_LIMIT: usize = 50;

/// Number of entries returned as "recent" in the statistics.
pub const RECENT_LIMIT: usize = 5;

/// Everything one browser session remembers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_result: Option<InspectionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_result: Option<InspectionResult>,
    #[serde(default)]
    inspection_history: Vec<InspectionResult>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh result as current and last, and append it to history.
    pub fn record(&mut self, result: InspectionResult) {
        self.current_result = Some(result.clone());
        self.last_result = Some(result.clone());
        self.inspection_history.push(result);

        if self.inspection_history.len() > HISTORY_LIMIT {
            let overflow = self.inspection_history.len() - HISTORY_LIMIT;
            self.inspection_history.drain(..overflow);
        }
    }

    /// Current result, falling back to the last one. `None` means there is
    /// nothing to report on yet.
    pub fn current(&self) -> Option<&InspectionResult> {
        self.current_result.as_ref().or(self.last_result.as_ref())
    }

    pub fn current_result(&self) -> Option<&InspectionResult> {
        self.current_result.as_ref()
    }

    pub fn last_result(&self) -> Option<&InspectionResult> {
        self.last_result.as_ref()
    }

    /// History in stored order (oldest first).
    pub fn history(&self) -> &[InspectionResult] {
        &self.inspection_history
    }

    /// History paired with display indices, most recent first.
    pub fn history_newest_first(&self) -> impl Iterator<Item = (usize, &InspectionResult)> {
        self.inspection_history.iter().rev().enumerate()
    }

    /// Make the history entry at `display_index` the current result.
    ///
    /// Returns the selected entry, or `None` (with no mutation) when the
    /// index is out of range.
    pub fn select_history_entry(&mut self, display_index: usize) -> Option<&InspectionResult> {
        let index = self.resolve_display_index(display_index)?;
        self.current_result = Some(self.inspection_history[index].clone());
        self.current_result.as_ref()
    }

    /// Remove the history entry at `display_index`. Out of range is a no-op.
    pub fn delete_entry(&mut self, display_index: usize) -> Option<InspectionResult> {
        let index = self.resolve_display_index(display_index)?;
        Some(self.inspection_history.remove(index))
    }

    /// Forget everything: history, current and last.
    pub fn clear(&mut self) {
        self.inspection_history.clear();
        self.current_result = None;
        self.last_result = None;
    }

    pub fn is_empty(&self) -> bool {
        self.current_result.is_none()
            && self.last_result.is_none()
            && self.inspection_history.is_empty()
    }

    pub fn stats(&self) -> InspectionStats {
        let normal_count = self
            .inspection_history
            .iter()
            .filter(|result| !result.predicted_class.is_issue())
            .count();
        let recent_start = self.inspection_history.len().saturating_sub(RECENT_LIMIT);

        InspectionStats {
            total_inspections: self.inspection_history.len(),
            normal_count,
            issues_count: self.inspection_history.len() - normal_count,
            recent_inspections: self.inspection_history[recent_start..].to_vec(),
        }
    }

    pub fn export(&self, export_date: impl Into<String>) -> HistoryExport {
        HistoryExport {
            export_date: export_date.into(),
            total_reports: self.inspection_history.len(),
            reports: self.inspection_history.clone(),
        }
    }

    fn resolve_display_index(&self, display_index: usize) -> Option<usize> {
        self.inspection_history
            .len()
            .checked_sub(1)?
            .checked_sub(display_index)
    }
}

/// Dashboard counters for `/api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionStats {
    pub total_inspections: usize,
    pub normal_count: usize,
    pub issues_count: usize,
    /// Up to [`RECENT_LIMIT`] entries, oldest first.
    pub recent_inspections: Vec<InspectionResult>,
}

/// Payload of `/api/export_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryExport {
    pub export_date: String,
    pub total_reports: usize,
    pub reports: Vec<InspectionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::ClassLabel;

    fn result(label: ClassLabel, n: usize) -> InspectionResult {
        InspectionResult::new(label, format!("2026-01-01 00:00:{n:02}"))
    }

    fn filled(n: usize) -> SessionState {
        let mut state = SessionState::new();
        for i in 0..n {
            let label = ClassLabel::ALL[i % ClassLabel::COUNT];
            state.record(result(label, i));
        }
        state
    }

    #[test]
    fn record_then_current_round_trips() {
        let mut state = SessionState::new();
        let recorded = result(ClassLabel::Spalling, 1);
        state.record(recorded.clone());

        let current = state.current().unwrap();
        assert_eq!(current.predicted_class, recorded.predicted_class);
        assert_eq!(current.timestamp, recorded.timestamp);
        assert_eq!(state.last_result(), Some(&recorded));
    }

    #[test]
    fn history_is_capped_to_most_recent_entries() {
        let state = filled(57);
        assert_eq!(state.history().len(), HISTORY_LIMIT);
        assert_eq!(state.history()[0].timestamp, "2026-01-01 00:00:07");
        assert_eq!(
            state.history().last().unwrap().timestamp,
            "2026-01-01 00:00:56"
        );
        let in_order = state
            .history()
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp);
        assert!(in_order);
    }

    #[test]
    fn current_falls_back_to_last() {
        let mut state = filled(2);
        state.current_result = None;
        assert_eq!(state.current().unwrap().timestamp, "2026-01-01 00:00:01");

        state.last_result = None;
        assert!(state.current().is_none());
    }

    #[test]
    fn select_uses_most_recent_first_indices() {
        let mut state = filled(3);
        let selected = state.select_history_entry(2).unwrap().clone();
        assert_eq!(selected.timestamp, "2026-01-01 00:00:00");
        assert_eq!(state.current_result(), Some(&selected));
        // last result is untouched by selection
        assert_eq!(state.last_result().unwrap().timestamp, "2026-01-01 00:00:02");
    }

    #[test]
    fn select_out_of_range_is_a_no_op() {
        let mut state = filled(3);
        let before = state.clone();
        assert!(state.select_history_entry(3).is_none());
        assert_eq!(state, before);

        let mut empty = SessionState::new();
        assert!(empty.select_history_entry(0).is_none());
    }

    #[test]
    fn delete_removes_exactly_one_entry() {
        let mut state = filled(4);
        let removed = state.delete_entry(0).unwrap();
        assert_eq!(removed.timestamp, "2026-01-01 00:00:03");
        assert_eq!(state.history().len(), 3);

        let removed = state.delete_entry(2).unwrap();
        assert_eq!(removed.timestamp, "2026-01-01 00:00:00");
        assert_eq!(state.history().len(), 2);

        assert!(state.delete_entry(2).is_none());
        assert!(state.delete_entry(usize::MAX).is_none());
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut state = filled(5);
        state.clear();
        assert!(state.is_empty());
        assert!(state.current().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn newest_first_pairs_display_indices() {
        let state = filled(3);
        let listed: Vec<(usize, String)> = state
            .history_newest_first()
            .map(|(i, r)| (i, r.timestamp.clone()))
            .collect();
        assert_eq!(listed[0], (0, "2026-01-01 00:00:02".to_owned()));
        assert_eq!(listed[2], (2, "2026-01-01 00:00:00".to_owned()));
    }

    #[test]
    fn stats_count_normal_and_issues() {
        let mut state = SessionState::new();
        state.record(result(ClassLabel::Normal, 0));
        state.record(result(ClassLabel::Algae, 1));
        state.record(result(ClassLabel::Normal, 2));

        let stats = state.stats();
        assert_eq!(stats.total_inspections, 3);
        assert_eq!(stats.normal_count, 2);
        assert_eq!(stats.issues_count, 1);
        assert_eq!(stats.recent_inspections.len(), 3);
    }

    #[test]
    fn stats_recent_is_last_five_in_stored_order() {
        let stats = filled(9).stats();
        assert_eq!(stats.recent_inspections.len(), RECENT_LIMIT);
        assert_eq!(stats.recent_inspections[0].timestamp, "2026-01-01 00:00:04");
        assert_eq!(stats.recent_inspections[4].timestamp, "2026-01-01 00:00:08");
    }

    #[test]
    fn empty_stats_are_zeroed() {
        let stats = SessionState::new().stats();
        assert_eq!(stats.total_inspections, 0);
        assert!(stats.recent_inspections.is_empty());
    }

    #[test]
    fn export_carries_full_history() {
        let export = filled(3).export("2026-02-02 10:00:00");
        assert_eq!(export.total_reports, 3);
        assert_eq!(export.reports.len(), 3);
        assert_eq!(export.export_date, "2026-02-02 10:00:00");
    }

    #[test]
    fn oversized_persisted_history_is_trimmed_on_next_record() {
        let mut state = SessionState {
            inspection_history: (0..60).map(|i| result(ClassLabel::Stain, i % 60)).collect(),
            ..SessionState::default()
        };
        state.record(result(ClassLabel::Normal, 59));
        assert_eq!(state.history().len(), HISTORY_LIMIT);
    }

    #[test]
    fn serde_roundtrip_preserves_state() {
        let state = filled(3);
        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        let empty: SessionState = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
