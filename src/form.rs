//! Create/edit dialog controller and delete confirmation.
//!
//! The controller owns one draft at a time. Submitting validates locally
//! first; only a complete draft reaches the remote collection. After any
//! successful write the list view-model is told to refetch.
//!
//! Deletion is a two-step state machine so the confirmation can be rendered
//! as an ordinary dialog:
//!
//! ```text
//! Idle --request_delete(key)--> PendingConfirmation(key)
//! PendingConfirmation(key) --confirm_delete--> delete(key), Idle
//! PendingConfirmation(key) --cancel_delete---> Idle
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{DashboardError, RemoteError, ValidationError};
use crate::notify::{Notification, NotificationSink};
use crate::remote::{Draft, Entity, RemoteCollection, WriteKind};
use crate::view_model::ListViewModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode<K> {
    Create,
    Edit(K),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteState<K> {
    Idle,
    PendingConfirmation(K),
}

pub struct FormController<T: Entity> {
    remote: Arc<dyn RemoteCollection<T>>,
    sink: Arc<dyn NotificationSink>,
    mode: FormMode<T::Key>,
    draft: T::Draft,
    is_open: bool,
    is_submitting: bool,
    delete_state: DeleteState<T::Key>,
}

impl<T: Entity> FormController<T> {
    pub fn new(remote: Arc<dyn RemoteCollection<T>>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            remote,
            sink,
            mode: FormMode::Create,
            draft: T::Draft::default(),
            is_open: false,
            is_submitting: false,
            delete_state: DeleteState::Idle,
        }
    }

    pub fn mode(&self) -> &FormMode<T::Key> {
        &self.mode
    }

    pub fn draft(&self) -> &T::Draft {
        &self.draft
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn delete_state(&self) -> &DeleteState<T::Key> {
        &self.delete_state
    }

    /// Dialog heading, e.g. "Add New Employee" / "Edit Employee".
    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("Add New {}", T::NAME),
            FormMode::Edit(_) => format!("Edit {}", T::NAME),
        }
    }

    /// Submit button caption, e.g. "Create Employee" / "Update Employee".
    pub fn submit_label(&self) -> String {
        match self.mode {
            FormMode::Create => format!("Create {}", T::NAME),
            FormMode::Edit(_) => format!("Update {}", T::NAME),
        }
    }

    // -- Dialog ---------------------------------------------------------------

    pub fn open_for_create(&mut self) {
        self.draft = T::Draft::default();
        self.mode = FormMode::Create;
        self.is_open = true;
    }

    pub fn open_for_edit(&mut self, record: &T) {
        self.draft = record.to_draft();
        self.mode = FormMode::Edit(record.key().clone());
        self.is_open = true;
    }

    /// Close without saving. The draft is kept until the next open.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn update_field(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        self.draft.set_field(name, value)
    }

    fn reset(&mut self) {
        self.is_open = false;
        self.mode = FormMode::Create;
        self.draft = T::Draft::default();
    }

    /// Validate and save the draft.
    ///
    /// On success the dialog closes, the draft resets and `list` refetches.
    /// On a remote failure the dialog stays open with the draft intact and
    /// the error is reported through the notification sink.
    pub async fn submit(&mut self, list: &mut ListViewModel<T>) -> Result<T, DashboardError> {
        let kind = match self.mode {
            FormMode::Create => WriteKind::Insert,
            FormMode::Edit(_) => WriteKind::Update,
        };
        self.draft.validate(kind)?;

        self.is_submitting = true;
        let result = match &self.mode {
            FormMode::Create => self.remote.create(&self.draft).await,
            FormMode::Edit(key) => self.remote.update(key, &self.draft).await,
        };
        self.is_submitting = false;

        match result {
            Ok(record) => {
                let verb = match kind {
                    WriteKind::Insert => "created",
                    WriteKind::Update => "updated",
                };
                info!(table = T::TABLE, key = %record.key(), verb, "record saved");
                self.sink.notify(Notification::success(format!(
                    "{} {verb} successfully",
                    T::NAME
                )));
                self.reset();
                list.notify_mutation_completed().await;
                Ok(record)
            }
            Err(err) => {
                warn!(table = T::TABLE, error = %err, "save failed");
                let fallback = format!("Failed to save {}", T::NAME.to_lowercase());
                self.sink
                    .notify(Notification::error(err.user_message(&fallback)));
                Err(err.into())
            }
        }
    }

    // -- Delete ---------------------------------------------------------------

    /// Ask for confirmation before deleting `key`. Replaces any earlier
    /// pending request.
    pub fn request_delete(&mut self, key: T::Key) {
        self.delete_state = DeleteState::PendingConfirmation(key);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_state = DeleteState::Idle;
    }

    /// Delete the key awaiting confirmation. Returns `Ok(false)` when nothing
    /// was pending.
    pub async fn confirm_delete(
        &mut self,
        list: &mut ListViewModel<T>,
    ) -> Result<bool, RemoteError> {
        let key = match std::mem::replace(&mut self.delete_state, DeleteState::Idle) {
            DeleteState::PendingConfirmation(key) => key,
            DeleteState::Idle => return Ok(false),
        };

        match self.remote.delete(&key).await {
            Ok(()) => {
                info!(table = T::TABLE, key = %key, "record deleted");
                self.sink.notify(Notification::success(format!(
                    "{} deleted successfully",
                    T::NAME
                )));
                list.notify_mutation_completed().await;
                Ok(true)
            }
            Err(err) => {
                warn!(table = T::TABLE, key = %key, error = %err, "delete failed");
                let fallback = format!("Failed to delete {}", T::NAME.to_lowercase());
                self.sink
                    .notify(Notification::error(err.user_message(&fallback)));
                Err(err)
            }
        }
    }
}
