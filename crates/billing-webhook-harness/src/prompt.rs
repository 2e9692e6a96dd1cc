//! Secret acquisition for the harness.

use std::io::{BufRead, Write};

use billing_webhook_auth::WebhookSecret;

use crate::error::HarnessError;

/// Prompt shown when no secret was passed on the command line.
pub const SECRET_PROMPT: &str = "Enter your LemonSqueezy webhook secret: ";

/// Take the secret from `arg`, or prompt for it on `output` and read one line
/// from `input`.
///
/// An empty answer is an error; the secret is never defaulted.
pub fn acquire_secret<R, W>(
    arg: Option<String>,
    mut input: R,
    mut output: W,
) -> Result<WebhookSecret, HarnessError>
where
    R: BufRead,
    W: Write,
{
    if let Some(secret) = arg {
        return Ok(WebhookSecret::new(secret)?);
    }

    output.write_all(SECRET_PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(HarnessError::MissingSecret);
    }

    let secret = line.trim_end_matches(&['\r', '\n'][..]);
    Ok(WebhookSecret::new(secret)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_webhook_auth::SignatureError;
    use std::io::Cursor;

    #[test]
    fn argument_wins_without_prompting() {
        let mut output = Vec::new();
        let secret = acquire_secret(Some("whsec_arg".into()), Cursor::new(""), &mut output);
        assert!(secret.is_ok());
        assert!(output.is_empty());
    }

    #[test]
    fn prompts_and_strips_line_ending() {
        let mut output = Vec::new();
        let secret = acquire_secret(None, Cursor::new("whsec_test\r\n"), &mut output);
        assert!(secret.is_ok());
        assert_eq!(String::from_utf8(output).unwrap(), SECRET_PROMPT);
    }

    #[test]
    fn empty_answer_is_invalid() {
        let err = acquire_secret(None, Cursor::new("\n"), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Signature(SignatureError::InvalidSecret)
        ));
    }

    #[test]
    fn closed_stdin_is_missing_secret() {
        let err = acquire_secret(None, Cursor::new(""), Vec::new()).unwrap_err();
        assert!(matches!(err, HarnessError::MissingSecret));
    }

    #[test]
    fn empty_argument_is_invalid() {
        let err = acquire_secret(Some(String::new()), Cursor::new("ignored\n"), Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Signature(SignatureError::InvalidSecret)
        ));
    }
}
