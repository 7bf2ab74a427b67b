//! Inspection facade used by the web app.
//!
//! [`Inspector`] owns the classifier, the preprocessing settings and the
//! session store. It turns an [`ImageSource`] into an [`InspectionResult`]
//! and assembles the guidance shown next to a result.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cottage_advice::{RecommendationBook, label_emoji, label_severity, label_short_recommendation};
use cottage_protocol::{
    ClassLabel, CottageResult, InspectionError, InspectionResult, RecommendationEntry,
    SessionId, SessionState, SeverityTier,
};
use cottage_session::{InMemorySessionStore, SessionStore};
use cottage_vision::{
    ClassifierPort, ImageSource, PreprocessConfig, decode_image, label_for_scores, preprocess,
};
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct InspectorBuilder {
    classifier: Arc<dyn ClassifierPort>,
    preprocess: PreprocessConfig,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl InspectorBuilder {
    pub fn new(classifier: Arc<dyn ClassifierPort>) -> Self {
        Self {
            classifier,
            preprocess: PreprocessConfig::default(),
            sessions: None,
        }
    }

    pub fn preprocess(mut self, config: PreprocessConfig) -> Self {
        self.preprocess = config;
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    pub fn build(self) -> Inspector {
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::default()));
        info!(
            classifier = %self.classifier.describe(),
            target_size = self.preprocess.target_size,
            "inspector ready"
        );

        Inspector {
            classifier: self.classifier,
            preprocess: self.preprocess,
            sessions,
        }
    }
}

/// A result together with everything the report pages render beside it.
#[derive(Debug, Clone)]
pub struct InspectionReport {
    pub result: InspectionResult,
    pub recommendation: &'static str,
    pub severity: SeverityTier,
    pub emoji: &'static str,
    pub details: &'static RecommendationEntry,
}

impl InspectionReport {
    pub fn label(&self) -> ClassLabel {
        self.result.predicted_class
    }

    pub fn is_issue(&self) -> bool {
        self.result.predicted_class.is_issue()
    }
}

#[derive(Clone)]
pub struct Inspector {
    classifier: Arc<dyn ClassifierPort>,
    preprocess: PreprocessConfig,
    sessions: Arc<dyn SessionStore>,
}

impl Inspector {
    /// Decode, preprocess and classify `source`, stamping the result with
    /// the local time. CPU work runs on the blocking pool.
    #[instrument(skip(self, source), fields(source = source.kind(), file_name = source.file_name()))]
    pub async fn inspect(&self, source: ImageSource) -> CottageResult<InspectionResult> {
        let classifier = Arc::clone(&self.classifier);
        let config = self.preprocess;

        let label = tokio::task::spawn_blocking(move || {
            classify_source(classifier.as_ref(), &config, source)
        })
        .await
        .map_err(|error| {
            InspectionError::Inference(format!("classification task failed: {error}"))
        })??;

        let result = InspectionResult::now(label);
        info!(label = %label, timestamp = %result.timestamp, "inspection classified");
        Ok(result)
    }

    /// Classify and append to the session's history.
    #[instrument(skip(self, state, source), fields(session_id = %session_id))]
    pub async fn inspect_into(
        &self,
        session_id: &SessionId,
        state: &mut SessionState,
        source: ImageSource,
    ) -> CottageResult<InspectionResult> {
        let result = self.inspect(source).await?;
        state.record(result.clone());
        debug!(history_len = state.history().len(), "inspection recorded");
        Ok(result)
    }

    pub fn report(&self, result: &InspectionResult) -> InspectionReport {
        let label = result.predicted_class;
        InspectionReport {
            result: result.clone(),
            recommendation: label_short_recommendation(label),
            severity: label_severity(label),
            emoji: label_emoji(label),
            details: RecommendationBook::global().entry(label),
        }
    }

    /// Stored state for `session_id`, or a fresh one if none is live.
    pub async fn load_session(&self, session_id: &SessionId) -> Result<SessionState> {
        Ok(self.sessions.load(session_id).await?.unwrap_or_default())
    }

    pub async fn save_session(&self, session_id: &SessionId, state: &SessionState) -> Result<()> {
        self.sessions.save(session_id, state).await
    }

    /// Forget everything stored for `session_id`.
    pub async fn discard_session(&self, session_id: &SessionId) -> Result<()> {
        self.sessions.remove(session_id).await
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    pub fn classifier_description(&self) -> String {
        self.classifier.describe()
    }
}

fn classify_source(
    classifier: &dyn ClassifierPort,
    config: &PreprocessConfig,
    source: ImageSource,
) -> CottageResult<ClassLabel> {
    let bytes = source.into_bytes()?;
    let image = decode_image(&bytes)?;
    let tensor = preprocess(&image, config);
    let scores = classifier.scores(&tensor)?;
    label_for_scores(&scores)
}
