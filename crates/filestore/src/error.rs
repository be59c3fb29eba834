use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("failed to send store request to '{endpoint}': {source}"))]
    SendRequest {
        stage: &'static str,
        endpoint: String,
        source: reqwest::Error,
    },
    #[snafu(display("file store returned status {status}: {body}"))]
    StoreStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to read store response body: {source}"))]
    ReadBody {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("failed to parse store response: {details}"))]
    ParseBody {
        stage: &'static str,
        details: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
