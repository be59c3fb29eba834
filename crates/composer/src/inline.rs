use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use snafu::ResultExt;

use crate::error::{ComposerResult, EncodingSnafu};
use crate::validate::{self, MimeClass};

/// A file encoded as a data URI, ready to travel inside the message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAttachment {
    pub encoded_data: String,
    pub file_name: String,
    pub mime_class: MimeClass,
}

/// Reads the source to the end and encodes it as an inline attachment.
pub fn encode_inline(file_name: &str, source: &mut dyn Read) -> ComposerResult<InlineAttachment> {
    let mut bytes = Vec::new();
    source
        .read_to_end(&mut bytes)
        .inspect_err(|error| {
            tracing::warn!("failed to read '{}' for inline encoding: {}", file_name, error);
        })
        .with_context(|_| EncodingSnafu {
            stage: "read-inline-source",
            file_name: file_name.to_string(),
        })?;
    Ok(encode_inline_bytes(file_name, &bytes))
}

/// Encodes raw bytes as `data:<mime>;base64,<payload>` keyed by the file name's extension.
pub fn encode_inline_bytes(file_name: &str, bytes: &[u8]) -> InlineAttachment {
    let extension = validate::file_extension(file_name);
    let mime_type = validate::mime_type_for(extension.as_deref());
    let payload = STANDARD.encode(bytes);
    InlineAttachment {
        encoded_data: format!("data:{};base64,{}", mime_type, payload),
        file_name: file_name.to_string(),
        mime_class: MimeClass::from_file_name(file_name),
    }
}
