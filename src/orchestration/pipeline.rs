//! Release pipeline - main orchestrator for release distribution
//!
//! Sequences the remote steps of one distribution run:
//! - optional symbol session and symbol upload (best-effort)
//! - release session creation
//! - binary upload to the one-time URL
//! - commit on success, abort on transfer failure
//! - attaching the committed release to the distribution group
//!
//! Every step runs exactly once. Any signaled error moves the state machine
//! to `Failed` and stops all further network calls; the one exception is a
//! rejected binary transfer, which spends one extra call on aborting the
//! session before the pipeline reports the original failure.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::core::config::DistributeConfig;
use crate::core::error::DistributeError;
use crate::core::state_machine::{PipelineState, PipelineStateMachine};
use crate::core::traits::{
    DistributionApi, PublishedRelease, ReleaseSession, ReleaseStatus, SymbolSession,
    UploadOutcome,
};

/// Report returned after a successful distribution run
#[derive(Debug, Clone)]
pub struct DistributeReport {
    /// Full release metadata from the group publish response
    pub release: PublishedRelease,

    /// Public download link, when the service exposes one
    pub download_url: Option<String>,

    /// Non-fatal problems encountered along the way
    pub warnings: Vec<String>,

    /// When the pipeline finished
    pub completed_at: DateTime<Utc>,

    /// Wall-clock duration in milliseconds
    pub duration: u64,
}

/// Main release distribution orchestrator
pub struct ReleasePipeline<A: DistributionApi = ApiClient> {
    api: A,
    state_machine: PipelineStateMachine,
}

impl ReleasePipeline<ApiClient> {
    /// Create a pipeline against the production distribution API
    pub fn new() -> Self {
        Self::with_api(ApiClient::new())
    }
}

impl Default for ReleasePipeline<ApiClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: DistributionApi> ReleasePipeline<A> {
    /// Create a pipeline over any [`DistributionApi`] implementation
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            state_machine: PipelineStateMachine::new(),
        }
    }

    /// State the pipeline currently sits in
    pub fn state(&self) -> PipelineState {
        self.state_machine.state()
    }

    /// Human-readable transition history of this run
    pub fn state_history(&self) -> String {
        self.state_machine.history()
    }

    /// Run the whole pipeline for one immutable input
    ///
    /// # Arguments
    ///
    /// * `config` - Validated pipeline input; validation is re-checked here
    ///   so library callers cannot skip it
    pub async fn run(
        &mut self,
        config: &DistributeConfig,
    ) -> Result<DistributeReport, DistributeError> {
        let start_time = Instant::now();
        let mut warnings = Vec::new();

        if let Err(error) = config.validate() {
            return Err(self.fail(error));
        }

        // 1. Symbols first, and strictly best-effort: a broken symbol step
        //    must never cost us the release.
        if config.wants_symbol_upload()
            && let Some(archive) = &config.dsym
        {
            self.state_machine.transition(PipelineState::SymbolUploading);
            if let Err(warning) = self.upload_symbols_step(config, archive).await {
                warn!("{warning}");
                warnings.push(warning);
            }
        }

        // 2. Release session
        self.state_machine
            .transition(PipelineState::ReleaseSessionCreating);
        let session = match self
            .api
            .create_release_session(&config.api_token, &config.owner_name, &config.app_name)
            .await
        {
            Ok(session) => session,
            Err(error) => return Err(self.fail(error)),
        };
        let ReleaseSession {
            upload_id,
            upload_url,
        } = session;

        // 3. Binary upload, consuming the session's one-time URL
        self.state_machine.transition(PipelineState::BinaryUploading);
        let outcome = match self
            .api
            .upload_binary(&config.api_token, &upload_id, upload_url, &config.file)
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => return Err(self.fail(error)),
        };

        // 4. Commit or abort, decided solely by the transfer outcome
        self.state_machine.transition(PipelineState::Committing);
        let committed = match outcome {
            UploadOutcome::Success => {
                match self
                    .api
                    .update_release_status(
                        &config.api_token,
                        &config.owner_name,
                        &config.app_name,
                        &upload_id,
                        ReleaseStatus::Committed,
                    )
                    .await
                {
                    Ok(committed) => committed,
                    Err(error) => return Err(self.fail(error)),
                }
            }
            UploadOutcome::Failure { status, body } => {
                error!(status, "binary upload rejected, aborting release");
                // The abort call's own result is not what gets reported;
                // its failure is only logged.
                if let Err(abort_error) = self
                    .api
                    .update_release_status(
                        &config.api_token,
                        &config.owner_name,
                        &config.app_name,
                        &upload_id,
                        ReleaseStatus::Aborted,
                    )
                    .await
                {
                    warn!(error = %abort_error, "abort call failed");
                }
                self.state_machine.transition(PipelineState::Aborted);
                warn!("release aborted");
                return Err(DistributeError::TransferFailed { status, body });
            }
        };
        info!("release committed");

        // 5. Group publish, against the server-supplied release path
        self.state_machine.transition(PipelineState::GroupPublishing);
        let release = match self
            .api
            .publish_to_group(
                &config.api_token,
                &committed.release_url,
                &config.group,
                config.effective_release_notes(),
            )
            .await
        {
            Ok(release) => release,
            Err(error) => return Err(self.fail(error)),
        };

        self.state_machine.transition(PipelineState::Done);

        Ok(DistributeReport {
            download_url: release.download_url.clone(),
            release,
            warnings,
            completed_at: Utc::now(),
            duration: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Create the symbol session and push the archive, mapping every problem
    /// to a warning string
    async fn upload_symbols_step(
        &self,
        config: &DistributeConfig,
        archive: &std::path::Path,
    ) -> Result<(), String> {
        let session = self
            .api
            .create_symbol_session(&config.api_token, &config.owner_name, &config.app_name)
            .await
            .map_err(|e| format!("symbol session could not be created: {e}"))?;
        let SymbolSession {
            symbol_upload_id,
            upload_url,
        } = session;

        match self
            .api
            .upload_symbols(&config.api_token, &symbol_upload_id, upload_url, archive)
            .await
        {
            Ok(UploadOutcome::Success) => {
                info!("symbol archive uploaded");
                Ok(())
            }
            Ok(UploadOutcome::Failure { status, body }) => {
                Err(format!("symbol upload failed with HTTP {status}: {body}"))
            }
            Err(error) => Err(format!("symbol upload errored: {error}")),
        }
    }

    fn fail(&mut self, error: DistributeError) -> DistributeError {
        self.state_machine.transition(PipelineState::Failed);
        error
    }
}
