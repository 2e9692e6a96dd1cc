//! Command-line interface for `sign-webhook`.
//!
//! Everything the binary does lives here so it can be driven with in-memory
//! readers and writers. `main.rs` only installs logging and wires up the
//! process streams.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use billing_webhook_auth::{Canonicalizer, KeyOrder, SignatureError, Signer, TextEscaping};

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::prompt::acquire_secret;
use crate::request::TestRequest;
use crate::sample::PayloadSource;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sign-webhook",
    version,
    about = "Sign a billing webhook payload and print a curl command to test an endpoint"
)]
pub struct Cli {
    /// Webhook signing secret. Prompted for when omitted.
    secret: Option<String>,

    #[arg(long, help = "Read the payload from a JSON file instead of the built-in sample")]
    payload: Option<PathBuf>,

    #[arg(long, conflicts_with = "payload", help = "Use this JSON text as the payload")]
    body: Option<String>,

    #[arg(long, help = "Endpoint URL (default: $WEBHOOK_ENDPOINT_URL or local function)")]
    url: Option<String>,

    #[arg(long, help = "Signature header name (default: x-signature)")]
    header: Option<String>,

    #[arg(long, help = "Sort object keys before signing")]
    sorted_keys: bool,

    #[arg(long, help = "Write non-ASCII text as raw UTF-8 instead of \\uXXXX escapes")]
    raw_utf8: bool,

    #[arg(long, help = "POST the signed request instead of only printing it")]
    send: bool,

    #[arg(long, help = "Output machine-readable JSON")]
    json: bool,
}

impl Cli {
    fn apply_overrides(&mut self, config: &mut HarnessConfig) {
        if let Some(url) = self.url.take() {
            config.endpoint_url = url;
        }
        if let Some(header) = self.header.take() {
            config.signature_header = header;
        }
        if self.sorted_keys {
            config.key_order = KeyOrder::Sorted;
        }
        if self.raw_utf8 {
            config.text_escaping = TextEscaping::Utf8;
        }
    }
}

/// Run the harness and turn the outcome into a process exit status.
///
/// # Arguments
///
/// * `cli` - Parsed arguments
/// * `config` - Base configuration; command-line flags override it
/// * `input` - Where the secret is read from when it is not an argument
/// * `out` - Receives the signature and curl command (stdout)
/// * `err` - Receives the secret prompt and any error message (stderr)
///
/// # Returns
///
/// `0` on success, `1` after writing `error: ...` to `err`.
pub async fn execute<R, W, E>(
    cli: Cli,
    config: HarnessConfig,
    input: R,
    out: W,
    mut err: E,
) -> u8
where
    R: BufRead,
    W: Write,
    E: Write,
{
    match run(cli, config, input, &mut err, out).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = %e, "sign-webhook failed");
            // Nothing useful to do if stderr itself is gone.
            let _ = writeln!(err, "error: {e}");
            1
        }
    }
}

/// Sign the selected payload and print (or send) the test request.
///
/// # Arguments
///
/// * `cli` - Parsed arguments
/// * `config` - Base configuration; command-line flags override it
/// * `input` - Where the secret is read from when it is not an argument
/// * `prompt` - Where the secret prompt is written
/// * `out` - Receives the signature and curl command, or the JSON summary
///
/// Nothing is written to `out` unless signing succeeds.
pub async fn run<R, P, W>(
    mut cli: Cli,
    mut config: HarnessConfig,
    input: R,
    prompt: P,
    mut out: W,
) -> Result<(), HarnessError>
where
    R: BufRead,
    P: Write,
    W: Write,
{
    cli.apply_overrides(&mut config);

    let secret = acquire_secret(cli.secret.take(), input, prompt)?;

    let source = match (cli.payload.take(), cli.body.take()) {
        (Some(path), _) => PayloadSource::File(path),
        (None, Some(text)) => PayloadSource::Inline(text),
        (None, None) => PayloadSource::Sample,
    };
    let payload = source.load()?;

    let canonicalizer =
        Canonicalizer::new(config.key_order).with_escaping(config.text_escaping);
    let signed = Signer::new(secret)
        .with_canonicalizer(canonicalizer)
        .sign_payload(&payload)?;

    tracing::debug!(
        key_order = %config.key_order,
        escaping = %config.text_escaping,
        body_len = signed.body.len(),
        "Signed webhook payload"
    );

    let request = TestRequest::new(&config.endpoint_url, &config.signature_header, signed);

    let outcome = if cli.send {
        Some(
            request
                .send(Duration::from_secs(config.request_timeout_seconds))
                .await?,
        )
    } else {
        None
    };

    if cli.json {
        let summary = serde_json::json!({
            "request": request,
            "response": outcome,
        });
        serde_json::to_writer_pretty(&mut out, &summary).map_err(SignatureError::from)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "\nGenerated {}: {}",
        request.signature_header, request.signature
    )?;
    writeln!(out, "\nCURL command to test webhook:")?;
    writeln!(out, "\n{}\n", request.to_curl())?;

    if let Some(outcome) = outcome {
        writeln!(out, "Response status: {}", outcome.status)?;
        writeln!(out, "Response body: {}", outcome.body)?;
    }

    Ok(())
}
