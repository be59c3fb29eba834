use serde::{Deserialize, Serialize};

use crate::attachment::AttachmentState;

/// One typed part of a multimodal message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    Text(String),
    FileReference { id: String, name: String },
    InlineImage { data: String },
    InlineFile { data: String, name: String },
}

/// Wire-format message content handed to the send collaborator.
///
/// Text-only drafts serialize as a bare string; attachment-bearing drafts as
/// an ordered part sequence with the text part first. Constructed fresh on
/// every submit and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Reason a submission attempt was refused before any collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    EmptyDraft,
    TransferInFlight,
}

/// Result type for content assembly.
pub type AssembleResult = Result<MessageContent, SubmitRejection>;

/// Combines the draft and the attachment slot into the outgoing payload.
///
/// An empty/whitespace draft or an in-flight transfer refuses the submission;
/// this is the single gate in front of the send collaborator. A selection
/// that failed or never finished validating contributes no file part.
pub fn assemble(draft: &str, attachment: &AttachmentState) -> AssembleResult {
    if draft.trim().is_empty() {
        return Err(SubmitRejection::EmptyDraft);
    }

    match attachment {
        AttachmentState::Uploading { .. } => Err(SubmitRejection::TransferInFlight),
        AttachmentState::Ready {
            reference_id,
            file_name,
        } => Ok(MessageContent::Parts(vec![
            ContentPart::Text(draft.to_string()),
            ContentPart::FileReference {
                id: reference_id.clone(),
                name: file_name.clone(),
            },
        ])),
        AttachmentState::InlineReady {
            encoded_data,
            file_name,
            mime_class,
        } => {
            let file_part = if mime_class.is_image() {
                ContentPart::InlineImage {
                    data: encoded_data.clone(),
                }
            } else {
                ContentPart::InlineFile {
                    data: encoded_data.clone(),
                    name: file_name.clone(),
                }
            };
            Ok(MessageContent::Parts(vec![
                ContentPart::Text(draft.to_string()),
                file_part,
            ]))
        }
        AttachmentState::Empty
        | AttachmentState::Validating { .. }
        | AttachmentState::Failed { .. } => Ok(MessageContent::Text(draft.to_string())),
    }
}
