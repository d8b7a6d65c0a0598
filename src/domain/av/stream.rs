use super::aspect::AspectClass;
use crate::error::MediaError;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecType {
    Video,
    Audio,
    #[serde(other)]
    Other,
}

/// Geometry of the primary video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamProperties {
    width: u32,
    height: u32,
    codec_type: CodecType,
}

impl StreamProperties {
    /// Zero dimensions are rejected so a ratio is always defined.
    pub fn new(width: u32, height: u32, codec_type: CodecType) -> Result<Self, MediaError> {
        if height == 0 {
            return Err(MediaError::Probe("video stream reports height 0".into()));
        }
        if width == 0 {
            return Err(MediaError::Probe("video stream reports width 0".into()));
        }
        Ok(Self {
            width,
            height,
            codec_type,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn codec_type(&self) -> CodecType {
        self.codec_type
    }

    pub fn aspect_class(&self) -> AspectClass {
        AspectClass::classify(self.width, self.height)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<CodecType>,
    width: Option<u64>,
    height: Option<u64>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// The first stream with `codec_type == "video"` wins, in the order ffprobe reports them.
pub fn from_probe_json(stdout: &[u8]) -> Result<StreamProperties, MediaError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| MediaError::Probe(format!("malformed ffprobe output: {e}")))?;

    let stream = output
        .streams
        .iter()
        .find(|stream| stream.codec_type == Some(CodecType::Video))
        .ok_or(MediaError::NoVideoStream)?;

    let width = dimension(stream.width, "width")?;
    let height = dimension(stream.height, "height")?;

    StreamProperties::new(width, height, CodecType::Video)
}

fn dimension(value: Option<u64>, name: &str) -> Result<u32, MediaError> {
    let value = value.ok_or_else(|| MediaError::Probe(format!("video stream has no {name}")))?;
    u32::try_from(value).map_err(|_| MediaError::Probe(format!("video {name} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn probe(value: serde_json::Value) -> Result<StreamProperties, MediaError> {
        from_probe_json(value.to_string().as_bytes())
    }

    #[test]
    fn test_first_video_stream_wins() {
        let props = probe(json!({
            "streams": [
                { "index": 0, "codec_type": "audio", "codec_name": "aac" },
                { "index": 1, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080 },
                { "index": 2, "codec_type": "video", "codec_name": "mjpeg", "width": 320, "height": 320 }
            ]
        }))
        .unwrap();

        assert_eq!(props.width(), 1920);
        assert_eq!(props.height(), 1080);
        assert_eq!(props.codec_type(), CodecType::Video);
        assert_eq!(props.aspect_class(), AspectClass::Landscape);
    }

    #[test]
    fn test_no_video_stream() {
        let err = probe(json!({
            "streams": [
                { "codec_type": "audio", "codec_name": "aac" },
                { "codec_type": "subtitle", "codec_name": "mov_text" }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, MediaError::NoVideoStream));

        let err = probe(json!({ "streams": [] })).unwrap_err();
        assert!(matches!(err, MediaError::NoVideoStream));
    }

    #[test]
    fn test_zero_height_is_probe_failure() {
        let err = probe(json!({
            "streams": [{ "codec_type": "video", "width": 1920, "height": 0 }]
        }))
        .unwrap_err();
        assert!(matches!(err, MediaError::Probe(_)));
    }

    #[test]
    fn test_missing_dimensions_are_probe_failures() {
        let err = probe(json!({
            "streams": [{ "codec_type": "video", "width": 1920 }]
        }))
        .unwrap_err();
        assert!(matches!(err, MediaError::Probe(_)));
    }

    #[test]
    fn test_malformed_output() {
        assert!(matches!(
            from_probe_json(b"not json").unwrap_err(),
            MediaError::Probe(_)
        ));
        assert!(matches!(
            from_probe_json(b"{}").unwrap_err(),
            MediaError::Probe(_)
        ));
        assert!(matches!(
            from_probe_json(b"").unwrap_err(),
            MediaError::Probe(_)
        ));
    }

    #[test]
    fn test_unknown_codec_types_are_skipped() {
        let props = probe(json!({
            "streams": [
                { "codec_type": "data" },
                { "codec_type": "attachment" },
                { "codec_type": "video", "width": 1080, "height": 1920 }
            ]
        }))
        .unwrap();
        assert_eq!(props.aspect_class(), AspectClass::Portrait);
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(StreamProperties::new(0, 1080, CodecType::Video).is_err());
        assert!(StreamProperties::new(1920, 0, CodecType::Video).is_err());
        assert!(StreamProperties::new(1, 1, CodecType::Video).is_ok());
    }
}
