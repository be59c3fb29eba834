pub mod attachment;
pub mod composer;
pub mod config;
pub mod content;
pub mod error;
pub mod inline;
pub mod session;
pub mod validate;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use attachment::{
    AttachmentState, AttachmentTransition, AttachmentTransitionRejection,
    AttachmentTransitionResult,
};
pub use composer::{Composer, SubmitOutcome, SubmitTrigger};
pub use config::{ComposerSettings, SettingsError, SettingsStore};
pub use content::{AssembleResult, ContentPart, MessageContent, SubmitRejection};
pub use error::{ComposerError, ComposerResult};
pub use inline::InlineAttachment;
pub use session::ComposerSession;
pub use validate::{AllowedExtensions, MimeClass};

/// Opaque conversation identifier; the composer never inspects its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A picked file's name and bytes, as handed over by the platform picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Stored-file reference returned by the file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_id: String,
    pub filename: String,
}

/// Human-readable transfer failure reported by the file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub detail: String,
}

impl TransferFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// Remote storage collaborator that exchanges file bytes for a reference.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store_file(&self, upload: FileUpload) -> Result<StoredFile, TransferFailure>;
}

/// Delivery collaborator that receives assembled message content.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, content: MessageContent, conversation_id: Option<&ConversationId>);
}

/// Host-side input surface the session locks and resets around transfers.
pub trait InputControl: Send + Sync {
    fn set_locked(&self, locked: bool);
    fn clear_file_selection(&self);
}
