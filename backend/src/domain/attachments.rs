//! Decoding and naming of uploaded booking attachments.
//!
//! Clients embed files in the JSON body as base64, optionally behind a
//! `data:<mime>;base64,` header. Each file is stored under a generated
//! collision-free name that keeps the original extension, when that extension
//! is plain ASCII alphanumerics, and is served from
//! `<public base URL>/uploads/<generated name>`. Anything else would need
//! escaping in the link, so such extensions are dropped.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::Error;
use super::validation::{field_str, lookup};

/// Path segment under the public base URL where attachments are served.
pub const UPLOADS_PATH: &str = "uploads";

/// Drop a leading `data:<mime>;base64,` header, if present.
///
/// # Examples
/// ```
/// use booking_backend::domain::strip_data_uri;
///
/// assert_eq!(strip_data_uri("data:image/png;base64,aGk="), "aGk=");
/// assert_eq!(strip_data_uri("aGk="), "aGk=");
/// ```
#[must_use]
pub fn strip_data_uri(payload: &str) -> &str {
    let trimmed = payload.trim_start();
    let Some(rest) = trimmed
        .get(..5)
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .and_then(|_| trimmed.get(5..))
    else {
        return payload;
    };
    match rest.split_once(',') {
        Some((header, body)) if header.to_ascii_lowercase().ends_with(";base64") => body,
        _ => payload,
    }
}

/// Decode a payload, tolerating a data URI header and embedded whitespace.
///
/// # Errors
///
/// Returns the decoder error when the payload is not valid base64.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact)
}

/// Extension of a file name, without the dot; empty when there is none.
#[must_use]
pub fn extension_of(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

const MAX_EXTENSION_LEN: usize = 16;

/// Extension safe to embed in a stored name and its URL; empty otherwise.
///
/// # Examples
/// ```
/// use booking_backend::domain::storable_extension;
///
/// assert_eq!(storable_extension("board.PNG"), "PNG");
/// assert_eq!(storable_extension("note.txt#v2"), "");
/// ```
#[must_use]
pub fn storable_extension(name: &str) -> &str {
    let ext = extension_of(name);
    if ext.len() <= MAX_EXTENSION_LEN && ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        ext
    } else {
        ""
    }
}

/// A decoded upload ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUpload {
    /// Name the client supplied.
    pub original_name: String,
    /// Storable extension of the original name; may be empty.
    pub extension: String,
    /// Generated storage name.
    pub stored_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl DecodedUpload {
    /// Decode one upload entry and assign it a fresh storage name.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Error`] when the payload does not decode.
    pub fn new(original_name: &str, payload: &str) -> Result<Self, Error> {
        let bytes = decode_payload(payload).map_err(|_| {
            Error::validation(format!(
                "The file {original_name} must be a valid base64 payload."
            ))
        })?;
        let extension = storable_extension(original_name).to_owned();
        Ok(Self {
            original_name: original_name.to_owned(),
            stored_name: generated_name(&extension),
            extension,
            bytes,
        })
    }

    /// Decode every entry of a validated body's `file_uploads` array.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Error`] for the first entry that does not
    /// decode.
    pub fn all_from(body: &Value) -> Result<Vec<Self>, Error> {
        let Some(entries) = lookup(body, "file_uploads").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .map(|entry| Self::new(field_str(entry, "name")?, field_str(entry, "base64")?))
            .collect()
    }
}

fn generated_name(extension: &str) -> String {
    let stem = Uuid::new_v4().simple().to_string();
    if extension.is_empty() {
        stem
    } else {
        format!("{stem}.{extension}")
    }
}

/// Builds public URLs for stored attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUrls {
    base: String,
}

impl AttachmentUrls {
    /// Serve attachments below `base`.
    #[must_use]
    pub fn new(base: &Url) -> Self {
        Self {
            base: base.as_str().trim_end_matches('/').to_owned(),
        }
    }

    /// Public URL for `stored_name`.
    ///
    /// # Examples
    /// ```
    /// use booking_backend::domain::AttachmentUrls;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://surf.example/").expect("valid url");
    /// let urls = AttachmentUrls::new(&base);
    /// assert_eq!(urls.url_for("a.png"), "https://surf.example/uploads/a.png");
    /// ```
    #[must_use]
    pub fn url_for(&self, stored_name: &str) -> String {
        format!("{}/{UPLOADS_PATH}/{stored_name}", self.base)
    }
}
