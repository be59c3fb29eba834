use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ComposerError {
    #[snafu(display("file type of '{file_name}' is not allowed; allowed types: {allowed}"))]
    DisallowedExtension {
        stage: &'static str,
        file_name: String,
        allowed: String,
    },
    #[snafu(display("file upload failed: {detail}"))]
    Transfer {
        stage: &'static str,
        detail: String,
    },
    #[snafu(display("failed to read '{file_name}' for inline encoding: {source}"))]
    Encoding {
        stage: &'static str,
        file_name: String,
        source: std::io::Error,
    },
    #[snafu(display("file attachments are disabled for this workspace"))]
    AttachmentsSuppressed { stage: &'static str },
}

pub type ComposerResult<T> = Result<T, ComposerError>;
