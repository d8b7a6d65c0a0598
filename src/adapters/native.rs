//! In-process `MediaToolkit` on libav through `ffmpeg-next`.
//!
//! libav calls block, so both operations run on the blocking pool. The
//! configured probe and remux limits bound how long a caller waits, but a
//! blocking call that overruns keeps its thread until libav returns.

use crate::config::ToolConfig;
use crate::domain::av::remux::processing_path;
use crate::domain::av::stream::{CodecType, StreamProperties};
use crate::error::MediaError;
use crate::ports::media::MediaToolkit;
use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct NativeToolkit {
    probe_timeout: Duration,
    remux_timeout: Duration,
}

impl NativeToolkit {
    /// Initialise libav, taking the time limits from `config`.
    pub fn new(config: &ToolConfig) -> Result<Self, MediaError> {
        ffmpeg::init().map_err(|e| MediaError::Probe(format!("libav init failed: {e}")))?;
        Ok(Self {
            probe_timeout: config.probe_timeout,
            remux_timeout: config.remux_timeout,
        })
    }
}

fn probe_blocking(path: &Path) -> Result<StreamProperties, MediaError> {
    let probe_err = |e: ffmpeg::Error| MediaError::Probe(e.to_string());

    let ictx = ffmpeg::format::input(&path).map_err(probe_err)?;
    let stream = ictx
        .streams()
        .find(|stream| stream.parameters().medium() == ffmpeg::media::Type::Video)
        .ok_or(MediaError::NoVideoStream)?;

    let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
        .map_err(probe_err)?
        .decoder()
        .video()
        .map_err(probe_err)?;

    StreamProperties::new(decoder.width(), decoder.height(), CodecType::Video)
}

fn remux_blocking(input: &Path, output: &Path) -> Result<(), MediaError> {
    let remux_err = |e: ffmpeg::Error| MediaError::Remux(e.to_string());

    let mut ictx = ffmpeg::format::input(&input).map_err(remux_err)?;
    let mut octx = ffmpeg::format::output_as(&output, "mp4").map_err(remux_err)?;

    let mut stream_mapping: Vec<Option<usize>> = vec![None; ictx.nb_streams() as usize];
    let mut time_bases = vec![ffmpeg::Rational(0, 1); ictx.nb_streams() as usize];
    let mut next_index = 0;
    for (index, stream) in ictx.streams().enumerate() {
        let medium = stream.parameters().medium();
        if !matches!(
            medium,
            ffmpeg::media::Type::Audio | ffmpeg::media::Type::Video | ffmpeg::media::Type::Subtitle
        ) {
            continue;
        }
        stream_mapping[index] = Some(next_index);
        time_bases[index] = stream.time_base();
        next_index += 1;

        let mut out_stream = octx
            .add_stream(ffmpeg::encoder::find(ffmpeg::codec::Id::None))
            .map_err(remux_err)?;
        out_stream.set_parameters(stream.parameters());
        // let the muxer choose a tag valid for mp4
        // SAFETY: the parameters belong to a stream owned by `octx`, which outlives
        // this block, and `codec_tag` is a plain integer field.
        unsafe {
            (*out_stream.parameters().as_mut_ptr()).codec_tag = 0;
        }
    }

    octx.set_metadata(ictx.metadata().to_owned());
    let mut options = ffmpeg::Dictionary::new();
    options.set("movflags", "faststart");
    octx.write_header_with(options).map_err(remux_err)?;

    for (stream, mut packet) in ictx.packets() {
        let index = stream.index();
        let Some(out_index) = stream_mapping[index] else {
            continue;
        };
        let out_time_base = octx
            .stream(out_index)
            .ok_or_else(|| MediaError::Remux(format!("output stream {out_index} missing")))?
            .time_base();
        packet.rescale_ts(time_bases[index], out_time_base);
        packet.set_position(-1);
        packet.set_stream(out_index);
        packet.write_interleaved(&mut octx).map_err(remux_err)?;
    }

    octx.write_trailer().map_err(remux_err)
}

#[async_trait]
impl MediaToolkit for NativeToolkit {
    async fn probe(&self, path: &Path) -> Result<StreamProperties, MediaError> {
        let path = path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || probe_blocking(&path));
        tokio::time::timeout(self.probe_timeout, task)
            .await
            .map_err(|_| MediaError::Probe(format!("timed out after {:?}", self.probe_timeout)))?
            .map_err(|e| MediaError::Probe(format!("probe task failed: {e}")))?
    }

    async fn remux(&self, path: &Path) -> Result<PathBuf, MediaError> {
        let input = path.to_path_buf();
        let output = processing_path(path);
        let target = output.clone();
        let task = tokio::task::spawn_blocking(move || remux_blocking(&input, &target));
        tokio::time::timeout(self.remux_timeout, task)
            .await
            .map_err(|_| MediaError::Remux(format!("timed out after {:?}", self.remux_timeout)))?
            .map_err(|e| MediaError::Remux(format!("remux task failed: {e}")))??;
        Ok(output)
    }
}
