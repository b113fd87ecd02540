//! Client for the remote unused-CSS simplification service.
//!
//! The service takes a form POST with the input HTML, the merged CSS, and a
//! fixed `type` field, and answers JSON with either an `error` string or the
//! simplified `outputCss`.

use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Endpoint of the public uncss service.
pub const DEFAULT_ENDPOINT: &str = "https://uncss-online.com/uncss";

/// A simplification round trip failed.
#[derive(Debug, Error)]
pub enum UncssError {
    /// The service answered with its `error` field set.
    #[error("simplification service error: {0}")]
    Service(String),
    /// The request ran past the configured timeout.
    #[error("simplification request timed out")]
    Timeout,
    /// The transport failed or the response was not the expected JSON.
    #[error("simplification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response carried neither an error nor any output CSS.
    #[error("simplification response carried no output css")]
    MissingOutput,
}

#[derive(Debug, Deserialize)]
struct UncssResponse {
    error: Option<String>,
    #[serde(rename = "outputCss")]
    output_css: Option<String>,
}

/// HTTP client for the simplification endpoint.
pub struct UncssClient {
    endpoint: String,
    client: reqwest::Client,
}

impl UncssClient {
    /// Create a client for `endpoint` with an explicit request timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        UncssClient {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// Post `input_html` and the merged `input_css` and return the
    /// simplified CSS.
    ///
    /// # Errors
    ///
    /// [`UncssError::Service`] when the service reports an error,
    /// [`UncssError::Timeout`] when the request times out, and
    /// [`UncssError::Transport`] for any other transport failure.
    pub async fn simplify(&self, input_html: &str, input_css: &str) -> Result<String, UncssError> {
        debug!(
            "posting {} bytes of html and {} bytes of css to {}",
            input_html.len(),
            input_css.len(),
            self.endpoint
        );
        let form = reqwest::multipart::Form::new()
            .text("inputHtml", input_html.to_string())
            .text("inputCss", input_css.to_string())
            .text("type", "fetch");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        let body: UncssResponse = response.json().await.map_err(classify)?;
        if let Some(message) = body.error {
            return Err(UncssError::Service(message));
        }
        let output = body.output_css.ok_or(UncssError::MissingOutput)?;
        Ok(normalize_newlines(&output))
    }
}

fn classify(error: reqwest::Error) -> UncssError {
    if error.is_timeout() {
        UncssError::Timeout
    } else {
        UncssError::Transport(error)
    }
}

/// The service escapes newlines as literal `\r\n` character sequences; turn
/// them back into real newlines before the response is split.
fn normalize_newlines(output: &str) -> String {
    output.replace("\\r\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_with_output_css_deserializes() {
        let body: UncssResponse =
            serde_json::from_str(r#"{"outputCss": "a{color:red}"}"#).unwrap();
        assert_eq!(body.output_css.as_deref(), Some("a{color:red}"));
        assert!(body.error.is_none());
    }

    #[test]
    fn response_with_error_field_deserializes() {
        let body: UncssResponse =
            serde_json::from_str(r#"{"error": "Invalid CSS!"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("Invalid CSS!"));
    }

    #[test]
    fn literal_escapes_become_real_newlines() {
        assert_eq!(
            normalize_newlines("a{color:red}\\r\\nb{color:blue}"),
            "a{color:red}\nb{color:blue}"
        );
    }
}
