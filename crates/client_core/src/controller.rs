//! Spot management controller: keeps the local store, the table projection,
//! the open dialog and the notification consistent with the backend.
//!
//! State lives behind one async mutex that is never held across a backend
//! call, so the UI can keep reading snapshots while requests are in flight.

use std::{
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use futures::future::join;
use shared::{
    domain::{District, Spot, SpotId},
    protocol::CreateSpotRequest,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::{
    api::SpotApi,
    config::Settings,
    dialog::{DialogState, SpotDraft},
    notification::{
        Notification, Notifier, Severity, CREATE_SUCCEEDED, DEFAULT_AUTO_HIDE, DELETE_FAILED,
        DELETE_SUCCEEDED, RELOAD_FAILED, SAVE_FAILED, UPDATE_SUCCEEDED,
    },
    store::{FetchTicket, SpotStore},
    view::{self, SpotPage, ViewState, DEFAULT_ROWS_PER_PAGE},
};

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub rows_per_page: NonZeroUsize,
    pub notification_auto_hide: Duration,
    /// Keep the edit/delete dialog (and its draft) open when the backend
    /// rejects the write, instead of closing it like a success.
    pub keep_dialog_open_on_failure: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            notification_auto_hide: DEFAULT_AUTO_HIDE,
            keep_dialog_open_on_failure: false,
        }
    }
}

impl From<&Settings> for ControllerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            rows_per_page: settings.rows_per_page(),
            notification_auto_hide: settings.notification_auto_hide(),
            keep_dialog_open_on_failure: settings.keep_dialog_open_on_failure,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationState {
    pub fetching: bool,
    pub saving: bool,
    pub deleting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Nothing to act on: no open dialog, or a delete target without an id.
    Skipped,
    /// The same kind of write is already in flight.
    Busy,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    SpotsReloaded { count: usize },
    Notified(Notification),
}

#[derive(Debug, Clone)]
pub struct ControllerSnapshot {
    pub search_term: String,
    pub page: SpotPage,
    pub districts: Vec<District>,
    pub dialog: DialogState,
    pub operations: OperationState,
    pub notification: Option<Notification>,
}

struct ControllerState {
    store: SpotStore,
    view: ViewState,
    dialog: DialogState,
    /// Bumped whenever a dialog is opened or cancelled, so a finishing
    /// mutation only closes the dialog it was submitted from.
    dialog_generation: u64,
    notifier: Notifier,
    operations: OperationState,
}

impl ControllerState {
    fn set_dialog(&mut self, dialog: DialogState) {
        self.dialog = dialog;
        self.dialog_generation += 1;
    }

    fn clamp_page(&mut self) {
        let filtered = view::filter_spots(self.store.spots(), self.view.search_term()).len();
        if self.view.clamp_page(filtered) {
            debug!(page = self.view.page(), filtered, "clamped page to filtered results");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Save,
    Delete,
}

impl Mutation {
    fn name(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Save => SAVE_FAILED,
            Self::Delete => DELETE_FAILED,
        }
    }

    fn in_flight(self, operations: &mut OperationState) -> &mut bool {
        match self {
            Self::Save => &mut operations.saving,
            Self::Delete => &mut operations.deleting,
        }
    }
}

pub struct SpotController {
    api: Arc<dyn SpotApi>,
    keep_dialog_open_on_failure: bool,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl SpotController {
    pub fn new(api: Arc<dyn SpotApi>) -> Self {
        Self::with_options(api, ControllerOptions::default())
    }

    pub fn with_options(api: Arc<dyn SpotApi>, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            keep_dialog_open_on_failure: options.keep_dialog_open_on_failure,
            inner: Mutex::new(ControllerState {
                store: SpotStore::default(),
                view: ViewState::new(options.rows_per_page),
                dialog: DialogState::Closed,
                dialog_generation: 0,
                notifier: Notifier::new(options.notification_auto_hide),
                operations: OperationState::default(),
            }),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }

    /// Initial load: spots and districts are fetched concurrently and only
    /// applied when both succeed. On failure both lists keep their previous
    /// contents.
    pub async fn load_all(&self) -> Result<()> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            guard.operations.fetching = true;
            guard.store.begin_fetch()
        };

        let (spots, districts) = join(self.api.list_spots(), self.api.list_districts()).await;

        let mut guard = self.inner.lock().await;
        guard.operations.fetching = false;
        match (spots, districts) {
            (Ok(spots), Ok(districts)) => {
                let count = spots.len();
                if !guard.store.apply_load(ticket, spots, districts) {
                    debug!("discarding superseded initial load");
                    return Ok(());
                }
                guard.clamp_page();
                drop(guard);
                info!(count, "loaded spots and districts");
                self.emit(ControllerEvent::SpotsReloaded { count });
                Ok(())
            }
            (Err(err), _) | (_, Err(err)) => {
                error!(error = %err, "failed to load spots and districts");
                Err(err)
            }
        }
    }

    /// Re-fetches the spot list only.
    pub async fn refresh(&self) -> Result<()> {
        let ticket = self.inner.lock().await.store.begin_fetch();
        let spots = self.api.list_spots().await.inspect_err(|err| {
            error!(error = %err, "failed to refresh spots");
        })?;
        self.apply_spots(ticket, spots).await;
        Ok(())
    }

    async fn apply_spots(&self, ticket: FetchTicket, spots: Vec<Spot>) {
        let count = spots.len();
        {
            let mut guard = self.inner.lock().await;
            if !guard.store.apply_spots(ticket, spots) {
                debug!("discarding superseded spot list");
                return;
            }
            guard.clamp_page();
        }
        self.emit(ControllerEvent::SpotsReloaded { count });
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.view.set_search_term(term);
        guard.clamp_page();
    }

    pub async fn set_page(&self, page: usize) {
        self.inner.lock().await.view.set_page(page);
    }

    pub async fn set_rows_per_page(&self, rows_per_page: NonZeroUsize) {
        self.inner.lock().await.view.set_rows_per_page(rows_per_page);
    }

    pub async fn displayed_page(&self) -> SpotPage {
        let guard = self.inner.lock().await;
        view::project(guard.store.spots(), &guard.view)
    }

    pub async fn spots(&self) -> Vec<Spot> {
        self.inner.lock().await.store.spots().to_vec()
    }

    pub async fn districts(&self) -> Vec<District> {
        self.inner.lock().await.store.districts().to_vec()
    }

    pub async fn find_spot(&self, id: &SpotId) -> Option<Spot> {
        self.inner.lock().await.store.find(id).cloned()
    }

    pub async fn dialog(&self) -> DialogState {
        self.inner.lock().await.dialog.clone()
    }

    pub async fn selected_spot(&self) -> Option<Spot> {
        self.inner.lock().await.dialog.selected().cloned()
    }

    pub async fn operations(&self) -> OperationState {
        self.inner.lock().await.operations
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.inner
            .lock()
            .await
            .notifier
            .visible_at(Instant::now())
            .cloned()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let guard = self.inner.lock().await;
        ControllerSnapshot {
            search_term: guard.view.search_term().to_string(),
            page: view::project(guard.store.spots(), &guard.view),
            districts: guard.store.districts().to_vec(),
            dialog: guard.dialog.clone(),
            operations: guard.operations,
            notification: guard.notifier.visible_at(Instant::now()).cloned(),
        }
    }

    pub async fn open_create(&self) {
        self.inner.lock().await.set_dialog(DialogState::Edit(SpotDraft::new()));
    }

    /// Opens the edit dialog on a private copy of `spot`.
    pub async fn open_edit(&self, spot: &Spot) {
        self.inner
            .lock()
            .await
            .set_dialog(DialogState::Edit(SpotDraft::from_existing(spot)));
    }

    pub async fn open_delete(&self, spot: &Spot) {
        self.inner
            .lock()
            .await
            .set_dialog(DialogState::DeleteConfirm(spot.clone()));
    }

    /// Applies `edit` to the open draft. Returns `false` when no edit dialog
    /// is open.
    pub async fn edit_draft(&self, edit: impl FnOnce(&mut SpotDraft)) -> bool {
        let mut guard = self.inner.lock().await;
        match &mut guard.dialog {
            DialogState::Edit(draft) => {
                edit(draft);
                true
            }
            _ => false,
        }
    }

    pub async fn cancel_dialog(&self) {
        self.inner.lock().await.set_dialog(DialogState::Closed);
    }

    pub async fn dismiss_notification(&self) {
        self.inner.lock().await.notifier.dismiss();
    }

    /// Submits the edit dialog: create for a new draft, full-record update
    /// for an existing one.
    pub async fn save(&self) -> MutationOutcome {
        let (draft, generation) = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            let DialogState::Edit(draft) = &state.dialog else {
                return MutationOutcome::Skipped;
            };
            if state.operations.saving {
                return MutationOutcome::Busy;
            }
            state.operations.saving = true;
            (draft.spot().clone(), state.dialog_generation)
        };

        let (result, success_message) = match &draft.id {
            Some(id) => {
                debug!(spot_id = %id, "updating spot");
                (self.api.update_spot(id, &draft).await, UPDATE_SUCCEEDED)
            }
            None => {
                debug!("creating spot");
                let request = CreateSpotRequest::from(&draft);
                (self.api.create_spot(&request).await, CREATE_SUCCEEDED)
            }
        };

        self.finish(Mutation::Save, generation, result, success_message)
            .await
    }

    /// Confirms the open delete dialog.
    pub async fn delete_confirmed(&self) -> MutationOutcome {
        let (id, generation) = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            let DialogState::DeleteConfirm(spot) = &state.dialog else {
                return MutationOutcome::Skipped;
            };
            let Some(id) = spot.id.clone() else {
                return MutationOutcome::Skipped;
            };
            if state.operations.deleting {
                return MutationOutcome::Busy;
            }
            state.operations.deleting = true;
            (id, state.dialog_generation)
        };

        debug!(spot_id = %id, "deleting spot");
        let result = self.api.delete_spot(&id).await;
        self.finish(Mutation::Delete, generation, result, DELETE_SUCCEEDED)
            .await
    }

    async fn finish(
        &self,
        mutation: Mutation,
        generation: u64,
        result: Result<()>,
        success_message: &'static str,
    ) -> MutationOutcome {
        let (outcome, severity, message) = match result {
            Ok(()) => match self.refresh().await {
                Ok(()) => (MutationOutcome::Succeeded, Severity::Success, success_message),
                Err(_) => (MutationOutcome::Succeeded, Severity::Warning, RELOAD_FAILED),
            },
            Err(err) => {
                error!(operation = mutation.name(), error = %err, "spot mutation failed");
                (
                    MutationOutcome::Failed,
                    Severity::Error,
                    mutation.failure_message(),
                )
            }
        };

        let notification = {
            let mut guard = self.inner.lock().await;
            let state = &mut *guard;
            *mutation.in_flight(&mut state.operations) = false;
            let close =
                outcome == MutationOutcome::Succeeded || !self.keep_dialog_open_on_failure;
            if close && state.dialog_generation == generation {
                state.set_dialog(DialogState::Closed);
            }
            state.notifier.show(message, severity)
        };
        info!(operation = mutation.name(), ?outcome, "spot mutation finished");
        self.emit(ControllerEvent::Notified(notification));
        outcome
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
