//! Placeholder substitution for sensitive data

use serde::{Deserialize, Serialize};

use crate::storage::{SerializedBody, SerializedInteraction};

/// A sensitive string and the placeholder stored in its place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Text written to the cassette
    pub placeholder: String,
    /// Text it stands for at runtime
    pub replace: String,
}

impl Placeholder {
    /// Create a placeholder
    pub fn new(placeholder: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            replace: replace.into(),
        }
    }
}

/// Replace sensitive strings with their placeholders before writing
pub(crate) fn mask(interaction: &mut SerializedInteraction, placeholders: &[Placeholder]) {
    for placeholder in placeholders {
        substitute(interaction, &placeholder.replace, &placeholder.placeholder);
    }
}

/// Restore sensitive strings after reading
pub(crate) fn unmask(interaction: &mut SerializedInteraction, placeholders: &[Placeholder]) {
    for placeholder in placeholders.iter().rev() {
        substitute(interaction, &placeholder.placeholder, &placeholder.replace);
    }
}

/// Substitute in URLs, header values and text bodies. Base64 bodies are
/// left alone.
fn substitute(interaction: &mut SerializedInteraction, from: &str, to: &str) {
    if from.is_empty() {
        return;
    }

    let request = &mut interaction.request;
    replace_in(&mut request.url, from, to);
    for value in request.headers.values_mut() {
        replace_in(value, from, to);
    }
    if let Some(body) = request.body.as_mut() {
        replace_in_body(body, from, to);
    }

    let response = &mut interaction.response;
    replace_in(&mut response.url, from, to);
    for value in response.headers.values_mut() {
        replace_in(value, from, to);
    }
    if let Some(body) = response.body.as_mut() {
        replace_in_body(body, from, to);
    }
}

fn replace_in_body(body: &mut SerializedBody, from: &str, to: &str) {
    if let Some(text) = body.string.as_mut() {
        replace_in(text, from, to);
    }
}

fn replace_in(target: &mut String, from: &str, to: &str) {
    if target.contains(from) {
        *target = target.replace(from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Response};
    use crate::storage::{serialize_request, serialize_response};
    use chrono::Utc;

    fn interaction() -> SerializedInteraction {
        let request = Request::get("http://example.com/?api_key=s3cr3t")
            .with_header("Authorization", "Bearer s3cr3t");
        let response = Response::new(200)
            .with_body("token: s3cr3t")
            .with_url("http://example.com/?api_key=s3cr3t");

        SerializedInteraction {
            request: serialize_request(&request, false),
            response: serialize_response(&response, false),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_mask_and_unmask() {
        let placeholders = vec![Placeholder::new("<KEY>", "s3cr3t")];
        let original = interaction();

        let mut masked = original.clone();
        mask(&mut masked, &placeholders);
        assert_eq!(masked.request.url, "http://example.com/?api_key=<KEY>");
        assert_eq!(masked.request.headers.get("authorization"), Some("Bearer <KEY>"));
        assert_eq!(
            masked.response.body.as_ref().and_then(|b| b.string.as_deref()),
            Some("token: <KEY>")
        );

        unmask(&mut masked, &placeholders);
        assert_eq!(masked, original);
    }
}
