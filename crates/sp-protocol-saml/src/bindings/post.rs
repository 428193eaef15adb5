//! HTTP-POST binding implementation.

use base64::Engine;

use super::{PostedMessage, SamlMessageType, RELAY_STATE_PARAM};
use crate::error::{SamlError, SamlResult};

/// HTTP-POST binding encoder/decoder.
pub struct HttpPostBinding;

impl HttpPostBinding {
    /// Wraps an AuthnRequest in an HTML form that auto-submits to
    /// `destination`.
    #[must_use]
    pub fn encode_request(xml: &str, destination: &str, relay_state: Option<&str>) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(xml);

        let relay_state_input = relay_state
            .map(|rs| {
                format!(
                    r#"<input type="hidden" name="{RELAY_STATE_PARAM}" value="{}"/>"#,
                    html_escape(rs)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>SAML POST Binding</title>
</head>
<body onload="document.forms[0].submit()">
    <noscript>
        <p>JavaScript is disabled. Click the button below to continue.</p>
    </noscript>
    <form method="post" action="{}">
        <input type="hidden" name="{}" value="{}"/>
        {}
        <noscript>
            <input type="submit" value="Continue"/>
        </noscript>
    </form>
</body>
</html>"#,
            html_escape(destination),
            SamlMessageType::Request.form_param(),
            encoded,
            relay_state_input
        )
    }

    /// Decodes a posted `SAMLResponse` value.
    ///
    /// Line breaks and other ASCII whitespace inside the base64 value are
    /// ignored, since IdPs commonly wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Base64Decode`] for invalid base64 and
    /// [`SamlError::InvalidResponse`] when the document is not UTF-8.
    pub fn decode_response(
        saml_response: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<PostedMessage> {
        let compact: String = saml_response
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let decoded = base64::engine::general_purpose::STANDARD.decode(compact)?;

        let xml = String::from_utf8(decoded)
            .map_err(|e| SamlError::InvalidResponse(format!("invalid UTF-8 in message: {e}")))?;

        Ok(PostedMessage {
            xml,
            message_type: SamlMessageType::Response,
            relay_state: relay_state.map(String::from),
        })
    }
}

/// Escapes HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
