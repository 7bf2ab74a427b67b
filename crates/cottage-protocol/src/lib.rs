//! # cottage-protocol — shared inspection contract
//!
//! Types every other cottage crate speaks: the closed set of surface-condition
//! labels, the immutable result of one inspection, the per-session state
//! object and the static recommendation record.
//!
//! It is dependency-light (no tokio, axum or image stack) so storage backends
//! and the web layer can share it freely.
//!
//! ## Module Overview
//!
//! - [`label`] — `ClassLabel` (7 fixed classes, model output order)
//! - [`inspection`] — `InspectionResult`
//! - [`session`] — `SessionState`, `InspectionStats`, `HistoryExport`
//! - [`recommendation`] — `RecommendationEntry`, `SeverityTier`
//! - [`ids`] — `SessionId`
//! - [`error`] — `InspectionError`, `CottageResult`

pub mod error;
pub mod ids;
pub mod inspection;
pub mod label;
pub mod recommendation;
pub mod session;

pub use error::{CottageResult, InspectionError};
pub use ids::SessionId;
pub use inspection::{InspectionResult, TIMESTAMP_FORMAT, format_timestamp};
pub use label::ClassLabel;
pub use recommendation::{RecommendationEntry, SeverityTier};
pub use session::{HISTORY_LIMIT, HistoryExport, InspectionStats, RECENT_LIMIT, SessionState};
