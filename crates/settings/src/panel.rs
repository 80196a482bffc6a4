//! In-memory view model of the admin settings panel.
//!
//! The panel starts in [`PanelPhase::Loading`] with default settings so it
//! is usable before the server answers, moves to [`PanelPhase::Ready`] once
//! the initial fetch settles (either way), and spends [`PanelPhase::Saving`]
//! while a write is in flight. Every request races the panel's cancellation
//! token; once the panel is closed or dropped, late responses are discarded.

use std::sync::{Mutex, MutexGuard, PoisonError};

use livestream_auth::AuthContext;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::SettingsApi;
use crate::error::SettingsError;
use crate::model::Settings;
use crate::notify::{Notification, Notifier};
use crate::update::SettingsUpdate;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load settings";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save settings";
pub const SAVE_SUCCEEDED_MESSAGE: &str = "Settings saved successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Loading,
    Ready,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The request succeeded and its effect was applied.
    Completed,
    /// The request failed; a notification was raised and local state kept.
    Failed(SettingsError),
    /// The panel was not in a phase that allows the request; nothing was sent.
    Skipped,
    /// The panel was closed before the response arrived.
    Cancelled,
}

struct PanelState {
    phase: PanelPhase,
    settings: Settings,
    mounted: bool,
}

pub struct SettingsPanel<A, N> {
    api: A,
    notifier: N,
    state: Mutex<PanelState>,
    cancel: CancellationToken,
}

impl<A, N> SettingsPanel<A, N>
where
    A: SettingsApi,
    N: Notifier,
{
    pub fn new(api: A, notifier: N) -> Self {
        Self::build(api, notifier, CancellationToken::new())
    }

    /// Tie the panel's requests to an enclosing cancellation scope. Closing
    /// or dropping the panel does not cancel the parent.
    pub fn with_cancellation(api: A, notifier: N, parent: &CancellationToken) -> Self {
        Self::build(api, notifier, parent.child_token())
    }

    fn build(api: A, notifier: N, cancel: CancellationToken) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(PanelState {
                phase: PanelPhase::Loading,
                settings: Settings::default(),
                mounted: false,
            }),
            cancel,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn phase(&self) -> PanelPhase {
        self.state().phase
    }

    pub fn settings(&self) -> Settings {
        self.state().settings.clone()
    }

    /// Whether the save control is enabled.
    pub fn can_save(&self) -> bool {
        self.phase() == PanelPhase::Ready
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Tear the panel down. Responses still in flight will be ignored.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Initial load. Only the first call issues a request.
    pub async fn mount(&self, auth: &AuthContext) -> SyncOutcome {
        {
            let mut state = self.state();
            if state.mounted {
                debug!("settings panel already mounted");
                return SyncOutcome::Skipped;
            }
            state.mounted = true;
        }

        self.fetch_settings(auth).await
    }

    /// Replace the local record with the server's copy. On failure the
    /// record is left as it was and one error notification is raised.
    pub async fn fetch_settings(&self, auth: &AuthContext) -> SyncOutcome {
        {
            let mut state = self.state();
            if state.phase == PanelPhase::Saving {
                return SyncOutcome::Skipped;
            }
            state.phase = PanelPhase::Loading;
        }

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return self.discarded("fetch"),
            result = self.api.fetch(auth) => result,
        };

        if self.cancel.is_cancelled() {
            return self.discarded("fetch");
        }

        let failure = {
            let mut state = self.state();
            state.phase = PanelPhase::Ready;
            match result {
                Ok(settings) => {
                    state.settings = settings;
                    None
                }
                Err(error) => Some(error),
            }
        };

        match failure {
            None => {
                info!("settings loaded");
                SyncOutcome::Completed
            }
            Some(error) => {
                warn!(%error, "settings fetch failed");
                self.notifier.notify(Notification::error(FETCH_FAILED_MESSAGE));
                SyncOutcome::Failed(error)
            }
        }
    }

    /// Settle a fetch that could not be sent at all, e.g. for lack of a
    /// credential. Counts as the mount; the record is kept, the panel
    /// becomes ready and one error notification is raised.
    pub fn fail_fetch(&self, error: SettingsError) -> SyncOutcome {
        if self.cancel.is_cancelled() {
            return self.discarded("fetch");
        }

        {
            let mut state = self.state();
            if state.phase == PanelPhase::Saving {
                return SyncOutcome::Skipped;
            }
            state.mounted = true;
            state.phase = PanelPhase::Ready;
        }

        warn!(%error, "settings fetch not attempted");
        self.notifier.notify(Notification::error(FETCH_FAILED_MESSAGE));
        SyncOutcome::Failed(error)
    }

    /// Apply one field edit to the local record and return the new record.
    pub fn handle_change(&self, update: SettingsUpdate) -> Settings {
        let mut state = self.state();
        state.settings = state.settings.apply(update);
        debug!(field = update.path(), "settings field changed");
        state.settings.clone()
    }

    /// Send the whole local record. Inert unless the panel is ready, so a
    /// second trigger while a save is in flight issues no request.
    pub async fn save_settings(&self, auth: &AuthContext) -> SyncOutcome {
        let snapshot = {
            let mut state = self.state();
            if state.phase != PanelPhase::Ready {
                debug!(phase = ?state.phase, "save ignored");
                return SyncOutcome::Skipped;
            }
            state.phase = PanelPhase::Saving;
            state.settings.clone()
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return self.discarded("save"),
            result = self.api.save(auth, &snapshot) => result,
        };

        if self.cancel.is_cancelled() {
            return self.discarded("save");
        }

        self.state().phase = PanelPhase::Ready;

        match result {
            Ok(()) => {
                info!("settings saved");
                self.notifier
                    .notify(Notification::success(SAVE_SUCCEEDED_MESSAGE));
                SyncOutcome::Completed
            }
            Err(error) => {
                warn!(%error, "settings save failed");
                self.notifier.notify(Notification::error(SAVE_FAILED_MESSAGE));
                SyncOutcome::Failed(error)
            }
        }
    }

    fn discarded(&self, operation: &'static str) -> SyncOutcome {
        debug!(operation, "panel closed, discarding response");
        SyncOutcome::Cancelled
    }
}

impl<A, N> SettingsPanel<A, N> {
    fn state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, N> Drop for SettingsPanel<A, N> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
