use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use snafu::{OptionExt, ResultExt, Snafu};

use quill_composer::{
    AttachmentState, AttachmentTransitionRejection, Composer, ComposerError, ComposerSession,
    ComposerSettings, ContentPart, ConversationId, FileStore, FileUpload, InlineAttachment,
    InputControl, MessageContent, MessageSink, SettingsError, SettingsStore, StoredFile,
    SubmitOutcome, SubmitRejection, SubmitTrigger, TransferFailure, inline,
};

#[derive(Debug, Clone)]
struct RunnerArgs {
    scenario: Scenario,
    config_path: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    ValidationReject,
    ValidationAccept,
    SubmitEmptyGate,
    SubmitUploadingGate,
    AssembleReference,
    AssembleInlineImage,
    AssembleInlineFile,
    ClearOnSend,
    PreserveDraft,
    EnterKeyMatrix,
    TransferFailureReset,
    StaleCompletionGuard,
    OydSuppression,
    SettingsRoundtrip,
    All,
}

impl Scenario {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "validation_reject" => Some(Self::ValidationReject),
            "validation_accept" => Some(Self::ValidationAccept),
            "submit_empty_gate" => Some(Self::SubmitEmptyGate),
            "submit_uploading_gate" => Some(Self::SubmitUploadingGate),
            "assemble_reference" => Some(Self::AssembleReference),
            "assemble_inline_image" => Some(Self::AssembleInlineImage),
            "assemble_inline_file" => Some(Self::AssembleInlineFile),
            "clear_on_send" => Some(Self::ClearOnSend),
            "preserve_draft" => Some(Self::PreserveDraft),
            "enter_key_matrix" => Some(Self::EnterKeyMatrix),
            "transfer_failure_reset" => Some(Self::TransferFailureReset),
            "stale_completion_guard" => Some(Self::StaleCompletionGuard),
            "oyd_suppression" => Some(Self::OydSuppression),
            "settings_roundtrip" => Some(Self::SettingsRoundtrip),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ValidationReject => "validation_reject",
            Self::ValidationAccept => "validation_accept",
            Self::SubmitEmptyGate => "submit_empty_gate",
            Self::SubmitUploadingGate => "submit_uploading_gate",
            Self::AssembleReference => "assemble_reference",
            Self::AssembleInlineImage => "assemble_inline_image",
            Self::AssembleInlineFile => "assemble_inline_file",
            Self::ClearOnSend => "clear_on_send",
            Self::PreserveDraft => "preserve_draft",
            Self::EnterKeyMatrix => "enter_key_matrix",
            Self::TransferFailureReset => "transfer_failure_reset",
            Self::StaleCompletionGuard => "stale_completion_guard",
            Self::OydSuppression => "oyd_suppression",
            Self::SettingsRoundtrip => "settings_roundtrip",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Snafu)]
enum RunnerError {
    #[snafu(display("missing required --scenario argument"))]
    MissingScenario { stage: &'static str },
    #[snafu(display("missing value for argument '{arg}'"))]
    MissingArgumentValue {
        stage: &'static str,
        arg: &'static str,
    },
    #[snafu(display("unknown scenario '{raw}'"))]
    UnknownScenario { stage: &'static str, raw: String },
    #[snafu(display("unknown argument '{raw}'"))]
    UnknownArgument { stage: &'static str, raw: String },
    #[snafu(display("composer validation failed: {source}"))]
    ComposerValidation {
        stage: &'static str,
        source: ComposerError,
    },
    #[snafu(display("settings operation failed: {source}"))]
    SettingsFailure {
        stage: &'static str,
        source: SettingsError,
    },
    #[snafu(display("content serialization failed: {source}"))]
    ContentSerialization {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("missing required --config argument for scenario '{scenario}'"))]
    MissingConfigPath {
        stage: &'static str,
        scenario: &'static str,
    },
    #[snafu(display("scenario '{scenario}' failed: {reason}"))]
    ScenarioFailed {
        stage: &'static str,
        scenario: &'static str,
        reason: String,
    },
}

type RunnerResult<T> = Result<T, RunnerError>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(error) = run().await {
        println!("runner_ok=false");
        eprintln!("runner_error={error}");
        std::process::exit(1);
    }
}

async fn run() -> RunnerResult<()> {
    let args = parse_args(env::args().skip(1))?;
    println!("scenario={}", args.scenario.name());
    if let Some(config_path) = args.config_path.as_deref() {
        println!("config_path={config_path}");
    }

    match args.scenario {
        Scenario::ValidationReject => run_validation_reject(),
        Scenario::ValidationAccept => run_validation_accept(),
        Scenario::SubmitEmptyGate => run_submit_empty_gate(),
        Scenario::SubmitUploadingGate => run_submit_uploading_gate(),
        Scenario::AssembleReference => run_assemble_reference(),
        Scenario::AssembleInlineImage => run_assemble_inline_image(),
        Scenario::AssembleInlineFile => run_assemble_inline_file(),
        Scenario::ClearOnSend => run_clear_on_send(),
        Scenario::PreserveDraft => run_preserve_draft(),
        Scenario::EnterKeyMatrix => run_enter_key_matrix(),
        Scenario::TransferFailureReset => run_transfer_failure_reset().await,
        Scenario::StaleCompletionGuard => run_stale_completion_guard(),
        Scenario::OydSuppression => run_oyd_suppression(),
        Scenario::SettingsRoundtrip => {
            run_settings_roundtrip(require_config_path(&args, "settings_roundtrip")?)
        }
        Scenario::All => run_all(args.config_path.as_deref()).await,
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> RunnerResult<RunnerArgs> {
    let mut scenario = None;
    let mut config_path = None;
    let mut pending = args.into_iter();

    // The parser is intentionally strict to keep scenario execution deterministic in CI.
    while let Some(argument) = pending.next() {
        match argument.as_str() {
            "--scenario" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-scenario-value",
                    arg: "--scenario",
                })?;

                let parsed = Scenario::parse(&value).context(UnknownScenarioSnafu {
                    stage: "parse-args-scenario",
                    raw: value,
                })?;
                scenario = Some(parsed);
            }
            "--config" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-config-value",
                    arg: "--config",
                })?;
                config_path = Some(value);
            }
            _ => {
                return UnknownArgumentSnafu {
                    stage: "parse-args",
                    raw: argument,
                }
                .fail();
            }
        }
    }

    Ok(RunnerArgs {
        scenario: scenario.context(MissingScenarioSnafu {
            stage: "parse-args-scenario-required",
        })?,
        config_path,
    })
}

async fn run_all(config_path: Option<&str>) -> RunnerResult<()> {
    run_validation_reject()?;
    run_validation_accept()?;
    run_submit_empty_gate()?;
    run_submit_uploading_gate()?;
    run_assemble_reference()?;
    run_assemble_inline_image()?;
    run_assemble_inline_file()?;
    run_clear_on_send()?;
    run_preserve_draft()?;
    run_enter_key_matrix()?;
    run_transfer_failure_reset().await?;
    run_stale_completion_guard()?;
    run_oyd_suppression()?;

    if let Some(path) = config_path {
        run_settings_roundtrip(path)?;
    }

    println!("all_passed=true");
    Ok(())
}

fn default_composer() -> Composer {
    Composer::new(Arc::new(ComposerSettings::default()))
}

fn composer_with(settings: ComposerSettings) -> Composer {
    Composer::new(Arc::new(settings))
}

fn run_validation_reject() -> RunnerResult<()> {
    let mut composer = default_composer();
    let rejected = matches!(
        composer.begin_selection("payload.exe"),
        Err(ComposerError::DisallowedExtension { .. })
    );
    let no_extension_rejected = matches!(
        composer.begin_selection("README"),
        Err(ComposerError::DisallowedExtension { .. })
    );
    let slot_reset = *composer.attachment() == AttachmentState::Empty;

    println!("validation_rejected={rejected}");
    println!("no_extension_rejected={no_extension_rejected}");
    println!("slot_reset={slot_reset}");

    if !(rejected && no_extension_rejected && slot_reset) {
        return ScenarioFailedSnafu {
            stage: "scenario-validation-reject-assert",
            scenario: "validation_reject",
            reason: "disallowed selections were not rejected with an empty slot".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_validation_accept() -> RunnerResult<()> {
    let mut composer = default_composer();
    let accepted = composer
        .begin_selection("report.pdf")
        .context(ComposerValidationSnafu {
            stage: "scenario-validation-accept-select",
        })?;
    let pending = matches!(
        composer.attachment(),
        AttachmentState::Validating { file_name } if file_name == "report.pdf"
    );

    println!("selection_accepted={accepted}");
    println!("selection_pending={pending}");

    if !(accepted && pending) {
        return ScenarioFailedSnafu {
            stage: "scenario-validation-accept-assert",
            scenario: "validation_accept",
            reason: "allowed selection did not move the slot to validating".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_submit_empty_gate() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("   \n\t");
    let refused = composer.take_submission(SubmitTrigger::SendControl)
        == SubmitOutcome::Refused(SubmitRejection::EmptyDraft);
    let draft_untouched = composer.draft() == "   \n\t";

    println!("empty_draft_refused={refused}");
    println!("draft_untouched={draft_untouched}");

    if !(refused && draft_untouched) {
        return ScenarioFailedSnafu {
            stage: "scenario-submit-empty-gate-assert",
            scenario: "submit_empty_gate",
            reason: "blank draft was not refused without side effects".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_submit_uploading_gate() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("hello");
    begin_allowed_selection(&mut composer, "a.pdf", "scenario-submit-uploading-gate-select")?;
    start_pending_transfer(&mut composer, "submit_uploading_gate")?;

    let refused = composer.take_submission(SubmitTrigger::SendControl)
        == SubmitOutcome::Refused(SubmitRejection::TransferInFlight);
    let still_uploading = composer.attachment().transfer_in_flight();
    let send_disabled = !composer.send_enabled();

    println!("uploading_refused={refused}");
    println!("still_uploading={still_uploading}");
    println!("send_disabled={send_disabled}");

    if !(refused && still_uploading && send_disabled) {
        return ScenarioFailedSnafu {
            stage: "scenario-submit-uploading-gate-assert",
            scenario: "submit_uploading_gate",
            reason: "in-flight transfer did not gate the submission".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_assemble_reference() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("see attached");
    begin_allowed_selection(&mut composer, "report.pdf", "scenario-assemble-reference-select")?;
    start_pending_transfer(&mut composer, "assemble_reference")?;
    settle_stored(&mut composer, "report.pdf", "f1", "report.pdf", "assemble_reference")?;

    let outcome = composer.take_submission(SubmitTrigger::SendControl);
    let content = delivered_content(outcome, "assemble_reference")?;
    let content_json = serde_json::to_string(&content).context(ContentSerializationSnafu {
        stage: "scenario-assemble-reference-serialize",
    })?;

    let parts_ok = matches!(
        &content,
        MessageContent::Parts(parts)
            if parts.len() == 2
                && parts[0] == ContentPart::Text("see attached".to_string())
                && parts[1]
                    == ContentPart::FileReference {
                        id: "f1".to_string(),
                        name: "report.pdf".to_string(),
                    }
    );

    println!("content_json={content_json}");
    println!("reference_parts_ok={parts_ok}");

    if !parts_ok {
        return ScenarioFailedSnafu {
            stage: "scenario-assemble-reference-assert",
            scenario: "assemble_reference",
            reason: "delivered content is not text followed by the file reference".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_assemble_inline_image() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("look at this");
    begin_allowed_selection(&mut composer, "photo.png", "scenario-assemble-inline-image-select")?;
    let inline = inline::encode_inline_bytes("photo.png", b"pixels");
    settle_inline(&mut composer, inline, "assemble_inline_image")?;

    let outcome = composer.take_submission(SubmitTrigger::SendControl);
    let content = delivered_content(outcome, "assemble_inline_image")?;
    let content_json = serde_json::to_string(&content).context(ContentSerializationSnafu {
        stage: "scenario-assemble-inline-image-serialize",
    })?;

    let image_part_ok = matches!(
        &content,
        MessageContent::Parts(parts)
            if parts.len() == 2
                && matches!(
                    &parts[1],
                    ContentPart::InlineImage { data } if data.starts_with("data:image/png;base64,")
                )
    );

    println!("content_json={content_json}");
    println!("inline_image_ok={image_part_ok}");

    if !image_part_ok {
        return ScenarioFailedSnafu {
            stage: "scenario-assemble-inline-image-assert",
            scenario: "assemble_inline_image",
            reason: "delivered content is missing the inline image data URI".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_assemble_inline_file() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("read this");
    begin_allowed_selection(&mut composer, "doc.pdf", "scenario-assemble-inline-file-select")?;
    let inline = inline::encode_inline_bytes("doc.pdf", b"contents");
    settle_inline(&mut composer, inline, "assemble_inline_file")?;

    let outcome = composer.take_submission(SubmitTrigger::SendControl);
    let content = delivered_content(outcome, "assemble_inline_file")?;
    let content_json = serde_json::to_string(&content).context(ContentSerializationSnafu {
        stage: "scenario-assemble-inline-file-serialize",
    })?;

    let file_part_ok = matches!(
        &content,
        MessageContent::Parts(parts)
            if parts.len() == 2
                && matches!(
                    &parts[1],
                    ContentPart::InlineFile { data, name }
                        if data.starts_with("data:application/pdf;base64,") && name == "doc.pdf"
                )
    );

    println!("content_json={content_json}");
    println!("inline_file_ok={file_part_ok}");

    if !file_part_ok {
        return ScenarioFailedSnafu {
            stage: "scenario-assemble-inline-file-assert",
            scenario: "assemble_inline_file",
            reason: "delivered content is missing the named inline file".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_clear_on_send() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("hello");
    begin_allowed_selection(&mut composer, "a.pdf", "scenario-clear-on-send-select")?;
    start_pending_transfer(&mut composer, "clear_on_send")?;
    settle_stored(&mut composer, "a.pdf", "f1", "a.pdf", "clear_on_send")?;

    let delivered = composer
        .take_submission(SubmitTrigger::SendControl)
        .delivered()
        .is_some();
    let draft_cleared = composer.draft().is_empty();
    let slot_cleared = *composer.attachment() == AttachmentState::Empty;

    println!("delivered={delivered}");
    println!("draft_cleared={draft_cleared}");
    println!("slot_cleared={slot_cleared}");

    if !(delivered && draft_cleared && slot_cleared) {
        return ScenarioFailedSnafu {
            stage: "scenario-clear-on-send-assert",
            scenario: "clear_on_send",
            reason: "delivery did not clear the draft and attachment slot".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_preserve_draft() -> RunnerResult<()> {
    let mut composer = composer_with(ComposerSettings {
        clear_on_send: false,
        ..ComposerSettings::default()
    });
    composer.set_draft("hello");
    begin_allowed_selection(&mut composer, "a.pdf", "scenario-preserve-draft-select")?;
    start_pending_transfer(&mut composer, "preserve_draft")?;
    settle_stored(&mut composer, "a.pdf", "f1", "a.pdf", "preserve_draft")?;

    let delivered = composer
        .take_submission(SubmitTrigger::SendControl)
        .delivered()
        .is_some();
    let draft_preserved = composer.draft() == "hello";
    let slot_cleared = *composer.attachment() == AttachmentState::Empty;

    println!("delivered={delivered}");
    println!("draft_preserved={draft_preserved}");
    println!("slot_cleared={slot_cleared}");

    if !(delivered && draft_preserved && slot_cleared) {
        return ScenarioFailedSnafu {
            stage: "scenario-preserve-draft-assert",
            scenario: "preserve_draft",
            reason: "preserve-draft delivery kept the slot or dropped the text".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_enter_key_matrix() -> RunnerResult<()> {
    let mut composer = default_composer();
    composer.set_draft("hello");

    let shift_ignored = composer.take_submission(SubmitTrigger::EnterKey {
        shift: true,
        ime_composing: false,
    }) == SubmitOutcome::Ignored;
    let ime_ignored = composer.take_submission(SubmitTrigger::EnterKey {
        shift: false,
        ime_composing: true,
    }) == SubmitOutcome::Ignored;
    let plain_delivered = composer
        .take_submission(SubmitTrigger::EnterKey {
            shift: false,
            ime_composing: false,
        })
        .delivered()
        .is_some();

    println!("shift_ignored={shift_ignored}");
    println!("ime_ignored={ime_ignored}");
    println!("plain_delivered={plain_delivered}");

    if !(shift_ignored && ime_ignored && plain_delivered) {
        return ScenarioFailedSnafu {
            stage: "scenario-enter-key-matrix-assert",
            scenario: "enter_key_matrix",
            reason: "enter key matrix did not gate submissions as expected".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

struct FailingStore {
    detail: &'static str,
}

#[async_trait]
impl FileStore for FailingStore {
    async fn store_file(&self, _upload: FileUpload) -> Result<StoredFile, TransferFailure> {
        Err(TransferFailure::new(self.detail))
    }
}

struct DiscardingSink;

#[async_trait]
impl MessageSink for DiscardingSink {
    async fn deliver(&self, _content: MessageContent, _conversation_id: Option<&ConversationId>) {}
}

struct NoopControl;

impl InputControl for NoopControl {
    fn set_locked(&self, _locked: bool) {}
    fn clear_file_selection(&self) {}
}

async fn run_transfer_failure_reset() -> RunnerResult<()> {
    let mut session = ComposerSession::new(
        Arc::new(ComposerSettings::default()),
        Arc::new(FailingStore {
            detail: "status 503: upstream unavailable",
        }),
        Arc::new(DiscardingSink),
        Box::new(NoopControl),
    );

    let attach_result = session
        .attach_file(FileUpload::new("a.pdf", b"bytes".to_vec()))
        .await;
    let failure_surfaced = matches!(
        &attach_result,
        Err(ComposerError::Transfer { detail, .. })
            if detail == "status 503: upstream unavailable"
    );
    let slot_reset = *session.composer().attachment() == AttachmentState::Empty;

    session.set_draft("hello anyway");
    let text_only_delivered = session
        .submit()
        .await
        .delivered()
        .map(|content| *content == MessageContent::Text("hello anyway".to_string()))
        .unwrap_or(false);

    println!("failure_surfaced={failure_surfaced}");
    println!("slot_reset={slot_reset}");
    println!("text_only_delivered={text_only_delivered}");

    if !(failure_surfaced && slot_reset && text_only_delivered) {
        return ScenarioFailedSnafu {
            stage: "scenario-transfer-failure-reset-assert",
            scenario: "transfer_failure_reset",
            reason: "store failure did not reset the slot with the raw detail".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_stale_completion_guard() -> RunnerResult<()> {
    let mut composer = default_composer();
    begin_allowed_selection(&mut composer, "a.pdf", "scenario-stale-completion-guard-select")?;
    start_pending_transfer(&mut composer, "stale_completion_guard")?;
    composer.clear_attachment();

    let stale_rejected = composer.transfer_succeeded(
        "a.pdf",
        StoredFile {
            file_id: "f1".to_string(),
            filename: "a.pdf".to_string(),
        },
    ) == Err(AttachmentTransitionRejection::NoTransferInFlight);
    let slot_still_empty = *composer.attachment() == AttachmentState::Empty;

    println!("stale_rejected={stale_rejected}");
    println!("slot_still_empty={slot_still_empty}");

    if !(stale_rejected && slot_still_empty) {
        return ScenarioFailedSnafu {
            stage: "scenario-stale-completion-guard-assert",
            scenario: "stale_completion_guard",
            reason: "a stale completion repopulated the cleared slot".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_oyd_suppression() -> RunnerResult<()> {
    let mut composer = composer_with(ComposerSettings {
        oyd_enabled: true,
        ..ComposerSettings::default()
    });

    let suppressed = matches!(
        composer.begin_selection("a.pdf"),
        Err(ComposerError::AttachmentsSuppressed { .. })
    );
    let attachments_disabled = !composer.attachments_enabled();

    composer.set_draft("plain text only");
    let text_delivered = composer
        .take_submission(SubmitTrigger::SendControl)
        .delivered()
        .map(|content| *content == MessageContent::Text("plain text only".to_string()))
        .unwrap_or(false);

    println!("suppressed={suppressed}");
    println!("attachments_disabled={attachments_disabled}");
    println!("text_delivered={text_delivered}");

    if !(suppressed && attachments_disabled && text_delivered) {
        return ScenarioFailedSnafu {
            stage: "scenario-oyd-suppression-assert",
            scenario: "oyd_suppression",
            reason: "oyd mode did not suppress attachments while keeping text delivery".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_settings_roundtrip(config_path: &str) -> RunnerResult<()> {
    let path = std::path::PathBuf::from(config_path);

    let store = SettingsStore::new(path.clone());
    store
        .update(ComposerSettings {
            oyd_enabled: false,
            allowed_file_extensions: " .pdf,.PNG ".to_string(),
            clear_on_send: false,
            store_endpoint: "http://files.internal/v1/files".to_string(),
        })
        .context(SettingsFailureSnafu {
            stage: "scenario-settings-roundtrip-update",
        })?;

    let reloaded = SettingsStore::new(path);
    let settings = reloaded.settings();
    let normalized = settings.allowed_file_extensions == ".pdf,.PNG";
    let case_insensitive = settings.allowed_extensions().permits("photo.png");
    let roundtrip_ok = !settings.clear_on_send
        && settings.store_endpoint == "http://files.internal/v1/files"
        && normalized
        && case_insensitive;

    println!("settings_roundtrip={roundtrip_ok}");

    if !roundtrip_ok {
        return ScenarioFailedSnafu {
            stage: "scenario-settings-roundtrip-assert",
            scenario: "settings_roundtrip",
            reason: "persisted settings did not reload with the written values".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn begin_allowed_selection(
    composer: &mut Composer,
    file_name: &str,
    stage: &'static str,
) -> RunnerResult<()> {
    let accepted = composer
        .begin_selection(file_name)
        .context(ComposerValidationSnafu { stage })?;
    if !accepted {
        return ScenarioFailedSnafu {
            stage,
            scenario: "selection",
            reason: format!("selection of '{file_name}' was unexpectedly dropped"),
        }
        .fail();
    }
    Ok(())
}

fn start_pending_transfer(composer: &mut Composer, scenario: &'static str) -> RunnerResult<()> {
    if let Err(rejection) = composer.transfer_started() {
        return ScenarioFailedSnafu {
            stage: "start-pending-transfer",
            scenario,
            reason: format!("transfer could not begin: {rejection:?}"),
        }
        .fail();
    }
    Ok(())
}

fn settle_stored(
    composer: &mut Composer,
    local_file: &str,
    file_id: &str,
    filename: &str,
    scenario: &'static str,
) -> RunnerResult<()> {
    if let Err(rejection) = composer.transfer_succeeded(
        local_file,
        StoredFile {
            file_id: file_id.to_string(),
            filename: filename.to_string(),
        },
    ) {
        return ScenarioFailedSnafu {
            stage: "settle-stored",
            scenario,
            reason: format!("completion was rejected: {rejection:?}"),
        }
        .fail();
    }
    Ok(())
}

fn settle_inline(
    composer: &mut Composer,
    inline: InlineAttachment,
    scenario: &'static str,
) -> RunnerResult<()> {
    if let Err(rejection) = composer.attach_inline(inline) {
        return ScenarioFailedSnafu {
            stage: "settle-inline",
            scenario,
            reason: format!("inline encode was rejected: {rejection:?}"),
        }
        .fail();
    }
    Ok(())
}

fn delivered_content(outcome: SubmitOutcome, scenario: &'static str) -> RunnerResult<MessageContent> {
    match outcome {
        SubmitOutcome::Delivered(content) => Ok(content),
        other => ScenarioFailedSnafu {
            stage: "delivered-content",
            scenario,
            reason: format!("expected a delivery, got {other:?}"),
        }
        .fail(),
    }
}

fn require_config_path<'a>(args: &'a RunnerArgs, scenario: &'static str) -> RunnerResult<&'a str> {
    args.config_path.as_deref().context(MissingConfigPathSnafu {
        stage: "require-config-path",
        scenario,
    })
}
