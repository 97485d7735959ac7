use std::time::Duration;

use tinmix_tools::signal::nearest_upper_power_of_two;

use crate::error::{SfxError, SfxResult};

/// 样本量化格式。目前只有 `F32` 能真正输出，其余在构造时被拒绝。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitDepth {
    F32,
    I32,
    I24,
    I16,
    I8,
    U8,
}

impl BitDepth {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            BitDepth::F32 | BitDepth::I32 => 4,
            BitDepth::I24 => 3,
            BitDepth::I16 => 2,
            BitDepth::I8 | BitDepth::U8 => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleRate {
    Hz8000,
    Hz11025,
    Hz16000,
    Hz22050,
    Hz32000,
    Hz44100,
    Hz48000,
    Hz88200,
    Hz96000,
    Hz192000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 10] = [
        SampleRate::Hz8000,
        SampleRate::Hz11025,
        SampleRate::Hz16000,
        SampleRate::Hz22050,
        SampleRate::Hz32000,
        SampleRate::Hz44100,
        SampleRate::Hz48000,
        SampleRate::Hz88200,
        SampleRate::Hz96000,
        SampleRate::Hz192000,
    ];

    pub fn as_hz(self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8_000,
            SampleRate::Hz11025 => 11_025,
            SampleRate::Hz16000 => 16_000,
            SampleRate::Hz22050 => 22_050,
            SampleRate::Hz32000 => 32_000,
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
            SampleRate::Hz88200 => 88_200,
            SampleRate::Hz96000 => 96_000,
            SampleRate::Hz192000 => 192_000,
        }
    }

    pub fn from_hz(hz: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.as_hz() == hz)
    }
}

/// 扬声器布局。`Stereo` 指真正的双声道源，不在支持范围内。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeakerSetup {
    Mono,
    /// 单声道混音复制到左右两个声道
    DualMono,
    Stereo,
}

/// 通过校验、引擎实际能输出的布局
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputLayout {
    Mono,
    DualMono,
}

impl OutputLayout {
    pub fn channel_count(self) -> usize {
        match self {
            OutputLayout::Mono => 1,
            OutputLayout::DualMono => 2,
        }
    }
}

impl TryFrom<SpeakerSetup> for OutputLayout {
    type Error = SfxError;

    fn try_from(setup: SpeakerSetup) -> SfxResult<Self> {
        match setup {
            SpeakerSetup::Mono => Ok(OutputLayout::Mono),
            SpeakerSetup::DualMono => Ok(OutputLayout::DualMono),
            SpeakerSetup::Stereo => Err(SfxError::UnsupportedConfiguration(
                "speaker setup Stereo is not supported (use Mono or DualMono)".into(),
            )),
        }
    }
}

/// 引擎构造参数，构造后不可变
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    bit_depth: BitDepth,
    sample_rate: SampleRate,
    speaker_setup: SpeakerSetup,
    desired_latency: Duration,
    frames_per_buffer: Option<usize>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::F32,
            sample_rate: SampleRate::Hz48000,
            speaker_setup: SpeakerSetup::DualMono,
            desired_latency: Duration::from_millis(10),
            frames_per_buffer: None,
        }
    }
}

impl EngineSettings {
    pub fn new() -> Self {
        Self::default()
    }

    // setter
    pub fn with_bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: SampleRate) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_speaker_setup(mut self, speaker_setup: SpeakerSetup) -> Self {
        self.speaker_setup = speaker_setup;
        self
    }

    pub fn with_desired_latency(mut self, desired_latency: Duration) -> Self {
        self.desired_latency = desired_latency;
        self
    }

    /// 直接指定块大小（帧），跳过由延迟推导的 2 的幂取整
    pub fn with_frames_per_buffer(mut self, frames: usize) -> Self {
        self.frames_per_buffer = Some(frames);
        self
    }

    // getter
    pub fn get_bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn get_sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    pub fn get_speaker_setup(&self) -> SpeakerSetup {
        self.speaker_setup
    }

    pub fn get_desired_latency(&self) -> Duration {
        self.desired_latency
    }

    pub fn validate(&self) -> SfxResult<OutputFormat> {
        OutputFormat::from_settings(self)
    }
}

/// 单个块最多的帧数（cpal 的 `FrameCount` 是 u32）
pub const MAX_FRAMES_PER_BUFFER: usize = u32::MAX as usize;

/// 期望延迟对应的帧数向上取整到 2 的幂
pub fn frames_for_latency(latency: Duration, sample_rate: SampleRate) -> SfxResult<usize> {
    let frames = latency.as_nanos() * sample_rate.as_hz() as u128 / 1_000_000_000;
    let frames = u64::try_from(frames)
        .ok()
        .filter(|&frames| frames <= MAX_FRAMES_PER_BUFFER as u64)
        .ok_or_else(|| {
            SfxError::UnsupportedConfiguration(format!("desired latency {latency:?} is too long"))
        })?;
    usize::try_from(nearest_upper_power_of_two(frames)).map_err(|_| {
        SfxError::UnsupportedConfiguration(format!("desired latency {latency:?} is too long"))
    })
}

/// 校验后的输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormat {
    pub bit_depth: BitDepth,
    pub sample_rate: SampleRate,
    pub layout: OutputLayout,
    pub frames_per_buffer: usize,
}

impl OutputFormat {
    pub fn from_settings(settings: &EngineSettings) -> SfxResult<Self> {
        if settings.bit_depth != BitDepth::F32 {
            return Err(SfxError::UnsupportedConfiguration(format!(
                "bit depth {:?} is not supported (only F32)",
                settings.bit_depth
            )));
        }

        let layout = OutputLayout::try_from(settings.speaker_setup)?;

        let frames_per_buffer = match settings.frames_per_buffer {
            Some(0) => {
                return Err(SfxError::UnsupportedConfiguration(
                    "frames per buffer must be at least 1".into(),
                ))
            }
            Some(frames) => frames,
            None => frames_for_latency(settings.desired_latency, settings.sample_rate)?,
        };

        // 块的字节数也必须放得进 usize，block_len 等之后不再检查溢出
        let bytes_per_frame = settings.bit_depth.bytes_per_sample() * layout.channel_count();
        if frames_per_buffer > MAX_FRAMES_PER_BUFFER
            || frames_per_buffer.checked_mul(bytes_per_frame).is_none()
        {
            return Err(SfxError::UnsupportedConfiguration(format!(
                "{frames_per_buffer} frames per buffer is too large (at most {MAX_FRAMES_PER_BUFFER})"
            )));
        }

        Ok(Self {
            bit_depth: settings.bit_depth,
            sample_rate: settings.sample_rate,
            layout,
            frames_per_buffer,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.bit_depth.bytes_per_sample() * self.channel_count()
    }

    /// 一个块的样本数（所有声道）
    pub fn block_len(&self) -> usize {
        self.frames_per_buffer * self.channel_count()
    }

    pub fn buffer_size_in_bytes(&self) -> usize {
        self.frames_per_buffer * self.bytes_per_frame()
    }

    /// 一个块对应的播放时长
    pub fn block_duration(&self) -> Duration {
        let nanos = self.frames_per_buffer as u128 * 1_000_000_000 / self.sample_rate.as_hz() as u128;
        Duration::from_nanos(nanos as u64)
    }
}
