//! State behind the settings form: the draft being edited and the single
//! in-flight save.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    backend::Settings,
    client::{ApiError, DashboardApi},
    coordinates::ValidationError,
    settings::{SettingsDraft, prepare_settings_payload},
};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("A save is already in progress")]
    AlreadySaving,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct SettingsForm<A> {
    api: A,
    draft: Mutex<SettingsDraft>,
    saving: AtomicBool,
}

/// Clears the saving flag when the save finishes, whichever way it ends.
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: DashboardApi> SettingsForm<A> {
    /// A form holding the built-in draft until [`Self::load`] succeeds.
    pub fn new(api: A) -> Self {
        Self::with_draft(api, SettingsDraft::default())
    }

    pub fn with_draft(api: A, draft: SettingsDraft) -> Self {
        Self { api, draft: Mutex::new(draft), saving: AtomicBool::new(false) }
    }

    pub fn draft(&self) -> SettingsDraft {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply a user edit to the draft.
    pub fn edit(&self, apply: impl FnOnce(&mut SettingsDraft)) {
        let mut draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut *draft);
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Fetch the server's settings and replace the draft with them.
    pub async fn load(&self) -> Result<Settings, ApiError> {
        let settings = self.api.settings().await?;
        self.replace_draft(&settings);
        Ok(settings)
    }

    /// Validate and save the current draft.
    ///
    /// Invalid drafts never reach the network. On success the server's copy
    /// replaces the draft.
    pub async fn submit(&self) -> Result<Settings, SubmitError> {
        let payload = prepare_settings_payload(&self.draft())?;
        let _guard = SavingGuard::acquire(&self.saving).ok_or(SubmitError::AlreadySaving)?;

        let saved = self.api.update_settings(&payload).await?;
        tracing::debug!(id = ?saved.id, "settings saved");

        self.replace_draft(&saved);
        Ok(saved)
    }

    fn replace_draft(&self, settings: &Settings) {
        *self.draft.lock().unwrap_or_else(PoisonError::into_inner) = SettingsDraft::from(settings);
    }
}
