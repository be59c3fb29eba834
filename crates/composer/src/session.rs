use std::sync::Arc;

use crate::composer::{Composer, SubmitOutcome, SubmitTrigger};
use crate::config::ComposerSettings;
use crate::error::{ComposerResult, TransferSnafu};
use crate::{ConversationId, FileStore, FileUpload, InputControl, MessageSink};

/// Drives one composer against its collaborators.
///
/// The session owns the ordering rules around a file transfer: lock the
/// input surface before handing bytes to the store, unlock afterwards, and
/// drop completions that no longer match the slot instead of letting them
/// resurrect it.
pub struct ComposerSession {
    composer: Composer,
    store: Arc<dyn FileStore>,
    sink: Arc<dyn MessageSink>,
    input_control: Box<dyn InputControl>,
    conversation_id: Option<ConversationId>,
}

impl ComposerSession {
    pub fn new(
        settings: Arc<ComposerSettings>,
        store: Arc<dyn FileStore>,
        sink: Arc<dyn MessageSink>,
        input_control: Box<dyn InputControl>,
    ) -> Self {
        Self {
            composer: Composer::new(settings),
            store,
            sink,
            input_control,
            conversation_id: None,
        }
    }

    pub fn bind_conversation(&mut self, conversation_id: ConversationId) {
        self.conversation_id = Some(conversation_id);
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.composer.set_draft(draft);
    }

    /// Validates, uploads, and settles one picked file.
    ///
    /// Validation failures reset the host's picker row along with the slot.
    /// A store failure surfaces as a transfer error after the slot has
    /// settled to `Failed`, so the next submit still goes out text-only.
    pub async fn attach_file(&mut self, upload: FileUpload) -> ComposerResult<()> {
        let file_name = upload.file_name.clone();

        match self.composer.begin_selection(&file_name) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(error) => {
                self.input_control.clear_file_selection();
                return Err(error);
            }
        }

        if self.composer.transfer_started().is_err() {
            self.input_control.clear_file_selection();
            return Ok(());
        }

        self.input_control.set_locked(true);
        let outcome = self.store.store_file(upload).await;
        self.input_control.set_locked(false);

        match outcome {
            Ok(stored) => {
                if let Err(rejection) = self.composer.transfer_succeeded(&file_name, stored) {
                    tracing::warn!(
                        "dropped stale store confirmation for '{}': {:?}",
                        file_name,
                        rejection
                    );
                }
                // Reset the picker row on every settled transfer so re-picking
                // the same file re-triggers the selection handler.
                self.input_control.clear_file_selection();
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(
                    "file transfer for '{}' failed: {}",
                    file_name,
                    failure.detail
                );
                if let Err(rejection) = self.composer.transfer_failed(&failure.detail) {
                    tracing::warn!(
                        "dropped stale transfer failure for '{}': {:?}",
                        file_name,
                        rejection
                    );
                }
                self.composer.clear_attachment();
                self.input_control.clear_file_selection();
                TransferSnafu {
                    stage: "store-file",
                    detail: failure.detail,
                }
                .fail()
            }
        }
    }

    /// Submits via the send control.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.finish_submission(SubmitTrigger::SendControl).await
    }

    /// Submits via the enter key, honoring shift and IME composition.
    pub async fn press_enter(&mut self, shift: bool, ime_composing: bool) -> SubmitOutcome {
        self.finish_submission(SubmitTrigger::EnterKey {
            shift,
            ime_composing,
        })
        .await
    }

    async fn finish_submission(&mut self, trigger: SubmitTrigger) -> SubmitOutcome {
        let outcome = self.composer.take_submission(trigger);
        if let SubmitOutcome::Delivered(content) = &outcome {
            self.sink
                .deliver(content.clone(), self.conversation_id.as_ref())
                .await;
            self.input_control.clear_file_selection();
        }
        outcome
    }
}
