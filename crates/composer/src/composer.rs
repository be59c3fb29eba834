use std::sync::Arc;

use crate::StoredFile;
use crate::attachment::{
    AttachmentState, AttachmentTransition, AttachmentTransitionRejection,
    AttachmentTransitionResult,
};
use crate::config::ComposerSettings;
use crate::content::{self, MessageContent, SubmitRejection};
use crate::error::{AttachmentsSuppressedSnafu, ComposerResult, DisallowedExtensionSnafu};
use crate::inline::InlineAttachment;
use crate::validate::AllowedExtensions;

/// Input gesture that may request a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    SendControl,
    EnterKey { shift: bool, ime_composing: bool },
}

impl SubmitTrigger {
    /// Shift-enter inserts a newline and a composing IME owns the key, so
    /// neither requests a submission.
    pub fn requests_submission(&self) -> bool {
        match self {
            Self::SendControl => true,
            Self::EnterKey {
                shift,
                ime_composing,
            } => !shift && !ime_composing,
        }
    }
}

/// What a submission attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered(MessageContent),
    Refused(SubmitRejection),
    Ignored,
}

impl SubmitOutcome {
    pub fn delivered(&self) -> Option<&MessageContent> {
        match self {
            Self::Delivered(content) => Some(content),
            Self::Refused(_) | Self::Ignored => None,
        }
    }
}

/// Draft text plus the single attachment slot of a pending message.
///
/// Holds no I/O handles; collaborators report selection, transfer, and
/// completion events through the methods below and the composer keeps the
/// slot consistent.
pub struct Composer {
    draft: String,
    attachment: AttachmentState,
    settings: Arc<ComposerSettings>,
    allowed: AllowedExtensions,
}

impl Composer {
    pub fn new(settings: Arc<ComposerSettings>) -> Self {
        let allowed = settings.allowed_extensions();
        Self {
            draft: String::new(),
            attachment: AttachmentState::Empty,
            settings,
            allowed,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn attachment(&self) -> &AttachmentState {
        &self.attachment
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Attachments are suppressed while the workspace routes over its own data.
    pub fn attachments_enabled(&self) -> bool {
        !self.settings.oyd_enabled
    }

    /// The send control stays disabled for blank drafts and in-flight transfers.
    pub fn send_enabled(&self) -> bool {
        !self.draft.trim().is_empty() && !self.attachment.transfer_in_flight()
    }

    /// Attachment controls lock while a transfer is in flight.
    pub fn controls_locked(&self) -> bool {
        self.attachment.transfer_in_flight()
    }

    /// Validates a newly picked file and moves the slot to `Validating`.
    ///
    /// Returns `Ok(true)` when the selection was accepted, `Ok(false)` when it
    /// was dropped because a transfer holds the slot, and an error when
    /// attachments are suppressed or the extension is not allowed. A
    /// disallowed pick resets the slot so the previous selection cannot
    /// silently ride along.
    pub fn begin_selection(&mut self, file_name: &str) -> ComposerResult<bool> {
        if !self.attachments_enabled() {
            return AttachmentsSuppressedSnafu {
                stage: "begin-selection",
            }
            .fail();
        }

        if !self.allowed.permits(file_name) {
            tracing::warn!(
                "rejected selection of '{}': extension not in allow-list [{}]",
                file_name,
                self.allowed.describe()
            );
            self.attachment = AttachmentState::Empty;
            return DisallowedExtensionSnafu {
                stage: "begin-selection-validate",
                file_name: file_name.to_string(),
                allowed: self.allowed.describe(),
            }
            .fail();
        }

        match self.apply(AttachmentTransition::Select {
            file_name: file_name.to_string(),
        }) {
            Ok(_) => Ok(true),
            Err(rejection) => {
                tracing::warn!("dropped selection of '{}': {:?}", file_name, rejection);
                Ok(false)
            }
        }
    }

    /// Marks the validated selection as handed to the transfer collaborator.
    pub fn transfer_started(&mut self) -> AttachmentTransitionResult {
        let file_name = match &self.attachment {
            AttachmentState::Validating { file_name } => file_name.clone(),
            _ => return Err(AttachmentTransitionRejection::NoSelectionPending),
        };
        self.apply(AttachmentTransition::BeginTransfer { file_name })
    }

    /// Settles the slot with the server's stored reference.
    ///
    /// `local_file` is the name the transfer was started for; a completion
    /// reporting any other file is stale and leaves the slot untouched.
    pub fn transfer_succeeded(
        &mut self,
        local_file: &str,
        stored: StoredFile,
    ) -> AttachmentTransitionResult {
        self.apply(AttachmentTransition::ConfirmStored {
            local_file: local_file.to_string(),
            reference_id: stored.file_id,
            file_name: stored.filename,
        })
    }

    /// Settles the slot as failed, keeping the collaborator's detail verbatim.
    pub fn transfer_failed(&mut self, detail: &str) -> AttachmentTransitionResult {
        self.apply(AttachmentTransition::Fail {
            detail: detail.to_string(),
        })
    }

    /// Settles a pending selection with its inline encoding.
    pub fn attach_inline(&mut self, inline: InlineAttachment) -> AttachmentTransitionResult {
        self.apply(AttachmentTransition::ConfirmInline {
            encoded_data: inline.encoded_data,
            file_name: inline.file_name,
            mime_class: inline.mime_class,
        })
    }

    /// Empties the attachment slot.
    pub fn clear_attachment(&mut self) {
        self.attachment = AttachmentState::Empty;
    }

    /// Attempts a submission and, on success, consumes the draft and slot.
    ///
    /// The outgoing content is assembled before anything is cleared, so a
    /// refused attempt leaves the composer exactly as it was. The draft
    /// survives delivery when `clear_on_send` is off; the attachment slot
    /// never does.
    pub fn take_submission(&mut self, trigger: SubmitTrigger) -> SubmitOutcome {
        if !trigger.requests_submission() {
            return SubmitOutcome::Ignored;
        }

        match content::assemble(&self.draft, &self.attachment) {
            Ok(message) => {
                if self.settings.clear_on_send {
                    self.draft.clear();
                }
                self.clear_attachment();
                SubmitOutcome::Delivered(message)
            }
            Err(rejection) => {
                tracing::debug!("refused submission: {:?}", rejection);
                SubmitOutcome::Refused(rejection)
            }
        }
    }

    fn apply(&mut self, transition: AttachmentTransition) -> AttachmentTransitionResult {
        let next = self.attachment.apply(transition)?;
        self.attachment = next.clone();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentPart;
    use crate::error::ComposerError;
    use crate::inline;

    fn composer_with(settings: ComposerSettings) -> Composer {
        Composer::new(Arc::new(settings))
    }

    fn default_composer() -> Composer {
        composer_with(ComposerSettings::default())
    }

    fn stored(file_id: &str, filename: &str) -> StoredFile {
        StoredFile {
            file_id: file_id.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn disallowed_extension_resets_the_slot_and_reports_the_allow_list() {
        let mut composer = default_composer();
        assert!(composer.begin_selection("notes.pdf").expect("pdf is allowed"));

        let error = composer
            .begin_selection("binary.exe")
            .expect_err("exe is not allowed");
        match error {
            ComposerError::DisallowedExtension {
                file_name, allowed, ..
            } => {
                assert_eq!(file_name, "binary.exe");
                assert!(allowed.contains(".pdf"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*composer.attachment(), AttachmentState::Empty);
    }

    #[test]
    fn file_without_extension_is_rejected() {
        let mut composer = default_composer();
        let error = composer
            .begin_selection("README")
            .expect_err("a name without an extension never matches the allow-list");
        assert!(matches!(error, ComposerError::DisallowedExtension { .. }));
    }

    #[test]
    fn oyd_mode_suppresses_attachments() {
        let mut composer = composer_with(ComposerSettings {
            oyd_enabled: true,
            ..ComposerSettings::default()
        });
        assert!(!composer.attachments_enabled());
        let error = composer
            .begin_selection("notes.pdf")
            .expect_err("attachments are suppressed");
        assert!(matches!(error, ComposerError::AttachmentsSuppressed { .. }));
    }

    #[test]
    fn selection_during_transfer_is_dropped_not_errored() {
        let mut composer = default_composer();
        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        assert!(composer.controls_locked());

        let accepted = composer
            .begin_selection("b.txt")
            .expect("an in-flight drop is not an error");
        assert!(!accepted);
        assert_eq!(composer.attachment().uploading_file(), Some("a.pdf"));
    }

    #[test]
    fn send_stays_disabled_for_blank_drafts_and_in_flight_transfers() {
        let mut composer = default_composer();
        assert!(!composer.send_enabled());
        composer.set_draft("   ");
        assert!(!composer.send_enabled());
        composer.set_draft("hello");
        assert!(composer.send_enabled());

        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        assert!(!composer.send_enabled());
    }

    #[test]
    fn successful_transfer_settles_with_the_canonical_name() {
        let mut composer = default_composer();
        assert!(composer.begin_selection("My File.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        let state = composer
            .transfer_succeeded("My File.pdf", stored("f1", "my-file.pdf"))
            .expect("matching completion must settle the slot");
        assert_eq!(
            state,
            AttachmentState::Ready {
                reference_id: "f1".to_string(),
                file_name: "my-file.pdf".to_string(),
            }
        );
        assert!(!composer.controls_locked());
    }

    #[test]
    fn stale_completion_after_clear_is_rejected() {
        let mut composer = default_composer();
        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        composer.clear_attachment();

        let rejection = composer
            .transfer_succeeded("a.pdf", stored("f1", "a.pdf"))
            .expect_err("a completion after clear is stale");
        assert_eq!(rejection, AttachmentTransitionRejection::NoTransferInFlight);
        assert_eq!(*composer.attachment(), AttachmentState::Empty);
    }

    #[test]
    fn transfer_failure_keeps_the_detail_verbatim() {
        let mut composer = default_composer();
        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        let state = composer
            .transfer_failed("status 503: upstream unavailable")
            .expect("an in-flight transfer can fail");
        assert_eq!(
            state,
            AttachmentState::Failed {
                detail: "status 503: upstream unavailable".to_string()
            }
        );
    }

    #[test]
    fn inline_attachment_settles_a_pending_selection() {
        let mut composer = default_composer();
        assert!(composer.begin_selection("photo.png").expect("png is allowed"));
        let inline = inline::encode_inline_bytes("photo.png", b"pixels");
        let state = composer
            .attach_inline(inline)
            .expect("inline encode of the pending selection must settle the slot");
        assert!(state.has_file_part());
    }

    #[test]
    fn delivered_submission_clears_draft_and_slot() {
        let mut composer = default_composer();
        composer.set_draft("hello");
        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        composer
            .transfer_succeeded("a.pdf", stored("f1", "a.pdf"))
            .expect("matching completion must settle the slot");

        let outcome = composer.take_submission(SubmitTrigger::SendControl);
        let content = outcome.delivered().expect("submission must deliver");
        assert_eq!(
            *content,
            MessageContent::Parts(vec![
                ContentPart::Text("hello".to_string()),
                ContentPart::FileReference {
                    id: "f1".to_string(),
                    name: "a.pdf".to_string(),
                },
            ])
        );
        assert_eq!(composer.draft(), "");
        assert_eq!(*composer.attachment(), AttachmentState::Empty);
    }

    #[test]
    fn preserve_draft_mode_keeps_the_text_but_never_the_attachment() {
        let mut composer = composer_with(ComposerSettings {
            clear_on_send: false,
            ..ComposerSettings::default()
        });
        composer.set_draft("hello");
        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        composer
            .transfer_succeeded("a.pdf", stored("f1", "a.pdf"))
            .expect("matching completion must settle the slot");

        let outcome = composer.take_submission(SubmitTrigger::SendControl);
        assert!(outcome.delivered().is_some());
        assert_eq!(composer.draft(), "hello");
        assert_eq!(*composer.attachment(), AttachmentState::Empty);
    }

    #[test]
    fn refused_submission_leaves_the_composer_untouched() {
        let mut composer = default_composer();
        composer.set_draft("   ");
        let outcome = composer.take_submission(SubmitTrigger::SendControl);
        assert_eq!(outcome, SubmitOutcome::Refused(SubmitRejection::EmptyDraft));
        assert_eq!(composer.draft(), "   ");

        composer.set_draft("hello");
        assert!(composer.begin_selection("a.pdf").expect("pdf is allowed"));
        composer.transfer_started().expect("selection is pending");
        let outcome = composer.take_submission(SubmitTrigger::SendControl);
        assert_eq!(
            outcome,
            SubmitOutcome::Refused(SubmitRejection::TransferInFlight)
        );
        assert_eq!(composer.draft(), "hello");
        assert!(composer.attachment().transfer_in_flight());
    }

    #[test]
    fn enter_key_matrix_gates_submission() {
        let mut composer = default_composer();
        composer.set_draft("hello");

        let shifted = composer.take_submission(SubmitTrigger::EnterKey {
            shift: true,
            ime_composing: false,
        });
        assert_eq!(shifted, SubmitOutcome::Ignored);

        let composing = composer.take_submission(SubmitTrigger::EnterKey {
            shift: false,
            ime_composing: true,
        });
        assert_eq!(composing, SubmitOutcome::Ignored);
        assert_eq!(composer.draft(), "hello");

        let plain = composer.take_submission(SubmitTrigger::EnterKey {
            shift: false,
            ime_composing: false,
        });
        assert_eq!(
            plain,
            SubmitOutcome::Delivered(MessageContent::Text("hello".to_string()))
        );
        assert_eq!(composer.draft(), "");
    }
}
