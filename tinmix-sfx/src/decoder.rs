use symphonia::core::{
    audio::{AudioBufferRef, Signal}, codecs::{CODEC_TYPE_NULL, DecoderOptions}, conv::FromSample, errors::Error, formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint
};

use std::io::Cursor;

use crate::error::{SfxError, SfxResult};

/// 解码结果：交错排列的 f32 样本
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

/// 宏：把任意样本格式的缓冲按帧交错写入 Vec
macro_rules! fill_interleaved {
    ($audio_buf:expr, $out_data:expr) => {{
        let frames = $audio_buf.frames();
        let chan_count = $audio_buf.spec().channels.count();

        for i in 0..frames {
            for c in 0..chan_count {
                $out_data.push(f32::from_sample($audio_buf.chan(c)[i]));
            }
        }
        chan_count
    }};
}

pub(crate) fn decode(data: Vec<u8>) -> SfxResult<DecodedAudio> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let probed = symphonia::default::get_probe()
        .format(&Hint::new(), mss, &FormatOptions::default(), &MetadataOptions::default())?;

    let mut format = probed.format;

    let track = format.tracks().iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .ok_or_else(|| SfxError::InvalidInput("no audio track found".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(48000);
    let track_id = track.id;
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(ref err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                // 正常读取完毕
                break;
            }
            Err(err) => {
                return Err(err.into());
            }
        };

        if packet.track_id() != track_id { continue; }

        // 坏包跳过
        let Ok(decoded) = decoder.decode(&packet) else { continue };

        let chan_count = match decoded {
            AudioBufferRef::F32(buf) => {
                let frames = buf.frames();
                let chan_count = buf.spec().channels.count();
                for i in 0..frames {
                    for c in 0..chan_count {
                        samples.push(buf.chan(c)[i]);
                    }
                }
                chan_count
            }
            AudioBufferRef::U8(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::U16(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::U24(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::U32(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::S8(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::S16(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::S24(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::S32(buf) => fill_interleaved!(buf, samples),
            AudioBufferRef::F64(buf) => fill_interleaved!(buf, samples),
        };

        if channels == 0 {
            channels = chan_count;
        } else if channels != chan_count {
            return Err(SfxError::InvalidInput(format!(
                "channel count changed mid-stream ({channels} -> {chan_count})"
            )));
        }
    }

    if channels == 0 || samples.is_empty() {
        return Err(SfxError::InvalidInput("audio stream contains no samples".into()));
    }

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}
