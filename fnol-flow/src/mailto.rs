//! `mailto:` link construction and the oversize negotiation: browsers cap
//! the practical URL length, so a body that pushes the link past the limit
//! is replaced by a clipboard placeholder after the handler is notified.

use async_trait::async_trait;
use chrono::Utc;

use crate::report;

/// Longest `mailto:` URL handed to the mail client.
pub const MAX_MAILTO_LEN: usize = 2000;

/// Body stand-in used when the full text did not fit in the URL.
pub const CLIPBOARD_PLACEHOLDER: &str = "<<Paste clipboard here>>";

/// Seam for the front-end's "email too large" dialog: notified with the
/// clipped body (so it can be staged on the clipboard) before the URL is
/// truncated. Truncation proceeds regardless of how the handler reacts.
#[async_trait]
pub trait OversizeHandler: Send + Sync {
    async fn notify(&self, clipped_body: &str);
}

/// Handler for headless flows: acknowledges without doing anything.
pub struct SilentOversizeHandler;

#[async_trait]
impl OversizeHandler for SilentOversizeHandler {
    async fn notify(&self, _clipped_body: &str) {}
}

/// The constructed link plus the clipped body the confirmation page shows.
#[derive(Debug, Clone)]
pub struct EmailLink {
    pub url: String,
    pub body: String,
    pub truncated: bool,
}

/// `{MM-DD-YYYY}_FNOL Portal Request - Reference: {key}`
pub fn subject(reference: &str) -> String {
    format!(
        "{}_FNOL Portal Request - Reference: {}",
        report::format_date_us(Utc::now().date_naive()),
        reference
    )
}

/// Build the `mailto:` URL for the given body, negotiating size: when the
/// full URL would exceed [`MAX_MAILTO_LEN`] the handler is notified and the
/// encoded body collapses to the header line plus [`CLIPBOARD_PLACEHOLDER`].
pub async fn construct_email_link(
    mailbox: &str,
    reference: &str,
    body: &str,
    handler: &dyn OversizeHandler,
) -> EmailLink {
    let encoded_subject = urlencoding::encode(&subject(reference)).into_owned();
    let base = format!("mailto:{mailbox}?subject={encoded_subject}&body=");
    let encoded_body = urlencoding::encode(body).into_owned();
    let clipped = report::clip_header(body).to_string();

    if base.len() + encoded_body.len() > MAX_MAILTO_LEN {
        handler.notify(&clipped).await;
        let header = body.split('\n').next().unwrap_or_default();
        let placeholder_body = format!("{header}\n{CLIPBOARD_PLACEHOLDER}\n");
        let url = format!("{base}{}", urlencoding::encode(&placeholder_body));
        return EmailLink {
            url,
            body: clipped,
            truncated: true,
        };
    }

    EmailLink {
        url: format!("{base}{encoded_body}"),
        body: clipped,
        truncated: false,
    }
}
