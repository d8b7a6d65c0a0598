//! Declared media types of uploads.

use std::fmt;

/// The only container this pipeline ingests.
pub const ACCEPTED_MEDIA_TYPE: &str = "video/mp4";

/// Extension used when a media type has no usable subtype.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// A declared media type stripped of parameters (`video/mp4; codecs=..` -> `video/mp4`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType(String);

impl MediaType {
    /// Parse a declared `Content-Type` and check it against [`ACCEPTED_MEDIA_TYPE`].
    ///
    /// The error string is meant to be shown to the uploader.
    pub fn parse_upload(declared: &str) -> Result<Self, String> {
        let declared = declared.trim();
        if declared.is_empty() {
            return Err("missing Content-Type".to_string());
        }

        let parsed: mime::Mime = declared
            .parse()
            .map_err(|e| format!("invalid Content-Type {declared:?}: {e}"))?;

        let essence = parsed.essence_str().to_ascii_lowercase();
        if essence != ACCEPTED_MEDIA_TYPE {
            return Err(format!("unsupported file type {essence}"));
        }

        Ok(Self(essence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extension(&self) -> String {
        extension_for(&self.0)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `type/subtype` -> `.subtype`; anything without exactly one `/` maps to `.bin`.
pub fn extension_for(media_type: &str) -> String {
    let parts: Vec<&str> = media_type.split('/').collect();
    match parts.as_slice() {
        [_, subtype] => format!(".{subtype}"),
        _ => FALLBACK_EXTENSION.to_string(),
    }
}
