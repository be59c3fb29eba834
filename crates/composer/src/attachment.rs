use crate::validate::MimeClass;

/// Attachment lifecycle state for the single slot of a pending message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttachmentState {
    #[default]
    Empty,
    Validating {
        file_name: String,
    },
    Uploading {
        file_name: String,
    },
    Ready {
        reference_id: String,
        file_name: String,
    },
    InlineReady {
        encoded_data: String,
        file_name: String,
        mime_class: MimeClass,
    },
    Failed {
        detail: String,
    },
}

/// State transition input for the attachment lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentTransition {
    Select {
        file_name: String,
    },
    BeginTransfer {
        file_name: String,
    },
    ConfirmStored {
        local_file: String,
        reference_id: String,
        file_name: String,
    },
    ConfirmInline {
        encoded_data: String,
        file_name: String,
        mime_class: MimeClass,
    },
    Fail {
        detail: String,
    },
    Clear,
}

/// Rejection reason for illegal attachment transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentTransitionRejection {
    TransferInFlight {
        active_file: String,
        attempted_file: String,
    },
    NoSelectionPending,
    NoTransferInFlight,
    FileMismatch {
        active_file: String,
        reported_file: String,
    },
}

/// Result type for attachment transition application.
pub type AttachmentTransitionResult = Result<AttachmentState, AttachmentTransitionRejection>;

impl AttachmentState {
    /// Returns the locally selected file name while a transfer is in flight.
    pub fn uploading_file(&self) -> Option<&str> {
        match self {
            Self::Uploading { file_name } => Some(file_name),
            Self::Empty
            | Self::Validating { .. }
            | Self::Ready { .. }
            | Self::InlineReady { .. }
            | Self::Failed { .. } => None,
        }
    }

    /// Returns true while the transfer collaborator holds the slot.
    pub fn transfer_in_flight(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }

    /// Returns true when the slot holds a submit-ready file part.
    pub fn has_file_part(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::InlineReady { .. })
    }

    /// Applies one transition deterministically.
    ///
    /// A new selection displaces any settled state directly; completion events
    /// must match the file the in-flight transfer was started for, so a stale
    /// confirmation can never repopulate a cleared slot.
    pub fn apply(&self, transition: AttachmentTransition) -> AttachmentTransitionResult {
        match transition {
            AttachmentTransition::Select { file_name } => self.apply_select(file_name),
            AttachmentTransition::BeginTransfer { file_name } => {
                self.apply_begin_transfer(file_name)
            }
            AttachmentTransition::ConfirmStored {
                local_file,
                reference_id,
                file_name,
            } => self.apply_confirm_stored(local_file, reference_id, file_name),
            AttachmentTransition::ConfirmInline {
                encoded_data,
                file_name,
                mime_class,
            } => self.apply_confirm_inline(encoded_data, file_name, mime_class),
            AttachmentTransition::Fail { detail } => self.apply_fail(detail),
            AttachmentTransition::Clear => Ok(Self::Empty),
        }
    }

    fn apply_select(&self, file_name: String) -> AttachmentTransitionResult {
        match self {
            Self::Uploading { file_name: active } => {
                Err(AttachmentTransitionRejection::TransferInFlight {
                    active_file: active.clone(),
                    attempted_file: file_name,
                })
            }
            Self::Empty
            | Self::Validating { .. }
            | Self::Ready { .. }
            | Self::InlineReady { .. }
            | Self::Failed { .. } => Ok(Self::Validating { file_name }),
        }
    }

    fn apply_begin_transfer(&self, file_name: String) -> AttachmentTransitionResult {
        match self {
            Self::Validating { file_name: pending } if *pending == file_name => {
                Ok(Self::Uploading { file_name })
            }
            Self::Validating { file_name: pending } => {
                Err(AttachmentTransitionRejection::FileMismatch {
                    active_file: pending.clone(),
                    reported_file: file_name,
                })
            }
            Self::Uploading { file_name: active } => {
                Err(AttachmentTransitionRejection::TransferInFlight {
                    active_file: active.clone(),
                    attempted_file: file_name,
                })
            }
            Self::Empty | Self::Ready { .. } | Self::InlineReady { .. } | Self::Failed { .. } => {
                Err(AttachmentTransitionRejection::NoSelectionPending)
            }
        }
    }

    fn apply_confirm_stored(
        &self,
        local_file: String,
        reference_id: String,
        file_name: String,
    ) -> AttachmentTransitionResult {
        match self {
            Self::Uploading { file_name: active } if *active == local_file => Ok(Self::Ready {
                reference_id,
                file_name,
            }),
            Self::Uploading { file_name: active } => {
                Err(AttachmentTransitionRejection::FileMismatch {
                    active_file: active.clone(),
                    reported_file: local_file,
                })
            }
            Self::Empty
            | Self::Validating { .. }
            | Self::Ready { .. }
            | Self::InlineReady { .. }
            | Self::Failed { .. } => Err(AttachmentTransitionRejection::NoTransferInFlight),
        }
    }

    fn apply_confirm_inline(
        &self,
        encoded_data: String,
        file_name: String,
        mime_class: MimeClass,
    ) -> AttachmentTransitionResult {
        match self {
            Self::Validating { file_name: pending } if *pending == file_name => {
                Ok(Self::InlineReady {
                    encoded_data,
                    file_name,
                    mime_class,
                })
            }
            Self::Validating { file_name: pending } => {
                Err(AttachmentTransitionRejection::FileMismatch {
                    active_file: pending.clone(),
                    reported_file: file_name,
                })
            }
            Self::Empty
            | Self::Uploading { .. }
            | Self::Ready { .. }
            | Self::InlineReady { .. }
            | Self::Failed { .. } => Err(AttachmentTransitionRejection::NoSelectionPending),
        }
    }

    fn apply_fail(&self, detail: String) -> AttachmentTransitionResult {
        match self {
            Self::Validating { .. } | Self::Uploading { .. } => Ok(Self::Failed { detail }),
            Self::Empty | Self::Ready { .. } | Self::InlineReady { .. } | Self::Failed { .. } => {
                Err(AttachmentTransitionRejection::NoTransferInFlight)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_state() -> AttachmentState {
        AttachmentState::Ready {
            reference_id: "f1".to_string(),
            file_name: "a.pdf".to_string(),
        }
    }

    #[test]
    fn selection_displaces_any_settled_state() {
        for state in [
            AttachmentState::Empty,
            ready_state(),
            AttachmentState::Failed {
                detail: "old failure".to_string(),
            },
        ] {
            let next = state
                .apply(AttachmentTransition::Select {
                    file_name: "b.txt".to_string(),
                })
                .expect("selection from a settled state must be accepted");
            assert_eq!(
                next,
                AttachmentState::Validating {
                    file_name: "b.txt".to_string()
                }
            );
        }
    }

    #[test]
    fn selection_during_transfer_is_rejected() {
        let uploading = AttachmentState::Uploading {
            file_name: "a.pdf".to_string(),
        };
        let rejection = uploading
            .apply(AttachmentTransition::Select {
                file_name: "b.txt".to_string(),
            })
            .expect_err("a second selection must not displace an in-flight transfer");
        assert_eq!(
            rejection,
            AttachmentTransitionRejection::TransferInFlight {
                active_file: "a.pdf".to_string(),
                attempted_file: "b.txt".to_string(),
            }
        );
    }

    #[test]
    fn transfer_begins_only_from_a_matching_selection() {
        let validating = AttachmentState::Validating {
            file_name: "a.pdf".to_string(),
        };
        let uploading = validating
            .apply(AttachmentTransition::BeginTransfer {
                file_name: "a.pdf".to_string(),
            })
            .expect("matching selection must begin the transfer");
        assert!(uploading.transfer_in_flight());
        assert_eq!(uploading.uploading_file(), Some("a.pdf"));

        let mismatch = validating
            .apply(AttachmentTransition::BeginTransfer {
                file_name: "other.pdf".to_string(),
            })
            .expect_err("a different file must not start the transfer");
        assert!(matches!(
            mismatch,
            AttachmentTransitionRejection::FileMismatch { .. }
        ));

        let from_empty = AttachmentState::Empty
            .apply(AttachmentTransition::BeginTransfer {
                file_name: "a.pdf".to_string(),
            })
            .expect_err("a transfer cannot begin without a pending selection");
        assert_eq!(from_empty, AttachmentTransitionRejection::NoSelectionPending);
    }

    #[test]
    fn stored_confirmation_carries_the_canonical_name() {
        let uploading = AttachmentState::Uploading {
            file_name: "draft name.pdf".to_string(),
        };
        let ready = uploading
            .apply(AttachmentTransition::ConfirmStored {
                local_file: "draft name.pdf".to_string(),
                reference_id: "f1".to_string(),
                file_name: "draft-name.pdf".to_string(),
            })
            .expect("matching confirmation must settle the slot");
        assert_eq!(
            ready,
            AttachmentState::Ready {
                reference_id: "f1".to_string(),
                file_name: "draft-name.pdf".to_string(),
            }
        );
    }

    #[test]
    fn stale_confirmation_cannot_repopulate_a_cleared_slot() {
        let cleared = AttachmentState::Uploading {
            file_name: "a.pdf".to_string(),
        }
        .apply(AttachmentTransition::Clear)
        .expect("clear is always accepted");
        assert_eq!(cleared, AttachmentState::Empty);

        let rejection = cleared
            .apply(AttachmentTransition::ConfirmStored {
                local_file: "a.pdf".to_string(),
                reference_id: "f1".to_string(),
                file_name: "a.pdf".to_string(),
            })
            .expect_err("a confirmation after clear is stale");
        assert_eq!(rejection, AttachmentTransitionRejection::NoTransferInFlight);
    }

    #[test]
    fn confirmation_for_a_different_file_is_rejected() {
        let uploading = AttachmentState::Uploading {
            file_name: "a.pdf".to_string(),
        };
        let rejection = uploading
            .apply(AttachmentTransition::ConfirmStored {
                local_file: "b.pdf".to_string(),
                reference_id: "f2".to_string(),
                file_name: "b.pdf".to_string(),
            })
            .expect_err("a confirmation for another file is stale");
        assert_eq!(
            rejection,
            AttachmentTransitionRejection::FileMismatch {
                active_file: "a.pdf".to_string(),
                reported_file: "b.pdf".to_string(),
            }
        );
    }

    #[test]
    fn inline_confirmation_settles_a_pending_selection() {
        let validating = AttachmentState::Validating {
            file_name: "photo.png".to_string(),
        };
        let inline_ready = validating
            .apply(AttachmentTransition::ConfirmInline {
                encoded_data: "data:image/png;base64,AAAA".to_string(),
                file_name: "photo.png".to_string(),
                mime_class: MimeClass::Image,
            })
            .expect("inline encode of the pending selection must settle the slot");
        assert!(inline_ready.has_file_part());

        let from_empty = AttachmentState::Empty
            .apply(AttachmentTransition::ConfirmInline {
                encoded_data: "data:image/png;base64,AAAA".to_string(),
                file_name: "photo.png".to_string(),
                mime_class: MimeClass::Image,
            })
            .expect_err("inline encode without a selection is stale");
        assert_eq!(from_empty, AttachmentTransitionRejection::NoSelectionPending);
    }

    #[test]
    fn failure_settles_pending_or_in_flight_slots_only() {
        let failed = AttachmentState::Uploading {
            file_name: "a.pdf".to_string(),
        }
        .apply(AttachmentTransition::Fail {
            detail: "status 503".to_string(),
        })
        .expect("an in-flight transfer can fail");
        assert_eq!(
            failed,
            AttachmentState::Failed {
                detail: "status 503".to_string()
            }
        );

        let rejection = AttachmentState::Empty
            .apply(AttachmentTransition::Fail {
                detail: "late failure".to_string(),
            })
            .expect_err("a failure without a pending slot is stale");
        assert_eq!(rejection, AttachmentTransitionRejection::NoTransferInFlight);
    }

    #[test]
    fn clear_returns_every_state_to_empty() {
        for state in [
            AttachmentState::Empty,
            AttachmentState::Validating {
                file_name: "a.pdf".to_string(),
            },
            AttachmentState::Uploading {
                file_name: "a.pdf".to_string(),
            },
            ready_state(),
            AttachmentState::Failed {
                detail: "old".to_string(),
            },
        ] {
            let next = state
                .apply(AttachmentTransition::Clear)
                .expect("clear is always accepted");
            assert_eq!(next, AttachmentState::Empty);
        }
    }
}
