//! Storage keys: `<aspect>/<token><ext>`.

use super::av::aspect::AspectClass;
use super::media_type::extension_for;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;

/// Random bytes per identifier (256 bits).
pub const IDENTIFIER_BYTES: usize = 32;

/// Length of the base64 (no padding) encoding of [`IDENTIFIER_BYTES`].
const IDENTIFIER_LEN: usize = 43;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub aspect: AspectClass,
    pub identifier: String,
    pub extension: String,
}

impl ObjectKey {
    /// Full key path as stored in the object store.
    pub fn path(&self) -> String {
        format!("{}/{}{}", self.aspect, self.identifier, self.extension)
    }

    /// Parse a stored key back, accepting only keys this crate could have derived.
    pub fn parse(key: &str) -> Option<Self> {
        let (prefix, file_name) = key.split_once('/')?;
        let aspect = prefix.parse::<AspectClass>().ok()?;

        let (identifier, extension) = match file_name.find('.') {
            Some(dot) => file_name.split_at(dot),
            None => return None,
        };
        if identifier.len() != IDENTIFIER_LEN
            || !identifier
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return None;
        }
        if extension.len() < 2 || extension[1..].contains(['.', '/']) {
            return None;
        }

        Some(Self {
            aspect,
            identifier: identifier.to_string(),
            extension: extension.to_string(),
        })
    }

    /// Key at the end of a published reference, whatever base URL it was published under.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let (rest, file_name) = reference.rsplit_once('/')?;
        let prefix = rest.rsplit('/').next()?;
        Self::parse(&format!("{prefix}/{file_name}"))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.aspect, self.identifier, self.extension)
    }
}

/// Derive a fresh key from the OS random source.
pub fn derive_key(media_type: &str, aspect: AspectClass) -> ObjectKey {
    derive_key_with(&mut OsRng, media_type, aspect)
}

/// Derive a key with an explicit cryptographic random source.
pub fn derive_key_with<R>(rng: &mut R, media_type: &str, aspect: AspectClass) -> ObjectKey
where
    R: RngCore + CryptoRng,
{
    let mut bytes = [0u8; IDENTIFIER_BYTES];
    rng.fill_bytes(&mut bytes);

    ObjectKey {
        aspect,
        identifier: URL_SAFE_NO_PAD.encode(bytes),
        extension: extension_for(media_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_key_layout() {
        let key = derive_key("video/mp4", AspectClass::Landscape);
        let path = key.path();

        assert!(path.starts_with("landscape/"));
        assert!(path.ends_with(".mp4"));
        assert_eq!(key.identifier.len(), IDENTIFIER_LEN);
        assert_eq!(path, key.to_string());
    }

    #[test]
    fn test_identifier_is_url_safe() {
        let key = derive_key("video/mp4", AspectClass::Portrait);
        assert!(key
            .identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_malformed_media_type_falls_back_to_bin() {
        let key = derive_key("mp4", AspectClass::Other);
        assert_eq!(key.extension, ".bin");
        assert!(key.path().starts_with("other/"));
        assert!(key.path().ends_with(".bin"));
    }

    #[test]
    fn test_same_seed_same_key() {
        let a = derive_key_with(&mut StdRng::seed_from_u64(7), "video/mp4", AspectClass::Other);
        let b = derive_key_with(&mut StdRng::seed_from_u64(7), "video/mp4", AspectClass::Other);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_collisions_over_10k_keys() {
        let identifiers: HashSet<String> = (0..10_000)
            .map(|_| derive_key("video/mp4", AspectClass::Landscape).identifier)
            .collect();
        assert_eq!(identifiers.len(), 10_000);
    }

    #[test]
    fn test_parse_round_trip() {
        let key = derive_key("video/mp4", AspectClass::Portrait);
        assert_eq!(ObjectKey::parse(&key.path()), Some(key));
    }

    #[test]
    fn test_key_from_reference_ignores_base_url() {
        let key = derive_key("video/mp4", AspectClass::Landscape);
        for base in [
            "https://d111111abcdef8.cloudfront.net",
            "https://videos.s3.us-east-1.amazonaws.com",
            "http://localhost:8091/assets",
        ] {
            let reference = format!("{base}/{}", key.path());
            assert_eq!(ObjectKey::from_reference(&reference), Some(key.clone()));
        }
        assert_eq!(ObjectKey::from_reference(&key.path()), Some(key.clone()));
        assert!(ObjectKey::from_reference("https://cdn.example.com/thumbnails/a.jpg").is_none());
        assert!(ObjectKey::from_reference("not a url").is_none());
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        assert!(ObjectKey::parse("thumbnails/abc.jpg").is_none());
        assert!(ObjectKey::parse("landscape/short.mp4").is_none());
        assert!(ObjectKey::parse("landscape").is_none());
        let key = derive_key("video/mp4", AspectClass::Landscape);
        assert!(ObjectKey::parse(&format!("{}/{}", key.aspect, key.identifier)).is_none());
        assert!(ObjectKey::parse(&format!("nested/{}", key.path())).is_none());
    }
}
