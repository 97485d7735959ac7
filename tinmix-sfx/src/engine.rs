use std::time::Duration;

use log::{debug, info, warn};

use crate::clip::SfxHandle;
use crate::decoder;
use crate::error::SfxResult;
use crate::mixer::Mixer;
use crate::registry::SoundRegistry;
use crate::scheduler::{self, OutputConsumer, OutputProducer};
use crate::settings::{BitDepth, EngineSettings, OutputFormat, SampleRate};

/// 混音核心：音效仓库 + 混音器 + 交接通道的生产者一端。
///
/// 所有方法都在控制线程上调用；消费者一端交给硬件回调。
pub struct SfxEngine {
    format: OutputFormat,
    registry: SoundRegistry,
    mixer: Mixer,
    producer: OutputProducer,
}

impl SfxEngine {
    pub fn new(settings: &EngineSettings) -> SfxResult<(Self, OutputConsumer)> {
        let format = settings.validate()?;
        let (producer, consumer) = scheduler::handoff(&format);

        info!(
            "Sfx engine: {:?} {} Hz {:?}, {} frames per buffer",
            format.bit_depth,
            format.sample_rate.as_hz(),
            format.layout,
            format.frames_per_buffer
        );

        let engine = Self {
            format,
            registry: SoundRegistry::new(),
            mixer: Mixer::new(format.frames_per_buffer),
            producer,
        };
        Ok((engine, consumer))
    }

    /// 丢弃旧的交接通道，返回新的消费者（设备丢失后重建流时使用）
    pub fn rebuild_output(&mut self) -> OutputConsumer {
        let (producer, consumer) = scheduler::handoff(&self.format);
        self.producer = producer;
        debug!("Output handoff rebuilt");
        consumer
    }

    /// 生产者一步：消费者取走上一块后才混下一块。返回是否发布了新块。
    pub fn update(&mut self) -> bool {
        if !self.producer.is_dirty() {
            return false;
        }

        let mono = self.mixer.mix(&mut self.registry);
        let published = self.producer.publish(mono);
        self.registry.prune_finished();
        published
    }

    pub fn is_dirty(&self) -> bool {
        self.producer.is_dirty()
    }

    // sounds
    pub fn make_sound(&mut self, samples: &[f32], channels: usize, interleaved: bool) -> SfxResult<SfxHandle> {
        let handle = self.registry.register(samples, channels, interleaved)?;
        debug!("Registered sound {} ({} frames)", handle, samples.len() / channels);
        Ok(handle)
    }

    /// 解码任意支持的音频文件并注册（只保留第一个声道）
    pub fn load_sound(&mut self, bytes: Vec<u8>) -> SfxResult<SfxHandle> {
        let decoded = decoder::decode(bytes)?;
        if decoded.sample_rate != self.format.sample_rate.as_hz() {
            warn!(
                "Sound sample rate {} Hz differs from engine rate {} Hz; it will play at the wrong pitch",
                decoded.sample_rate,
                self.format.sample_rate.as_hz()
            );
        }
        self.make_sound(&decoded.samples, decoded.channels, true)
    }

    pub fn play(&mut self, sound: SfxHandle) -> SfxResult<()> {
        self.registry.play(sound)
    }

    pub fn play_one_shot(&mut self, sound: SfxHandle) -> SfxResult<()> {
        self.registry.play_one_shot(sound)
    }

    pub fn stop(&mut self, sound: SfxHandle) -> SfxResult<()> {
        self.registry.stop(sound)
    }

    pub fn stop_all(&mut self) {
        self.registry.stop_all()
    }

    pub fn pause(&mut self, sound: SfxHandle) -> SfxResult<()> {
        self.registry.pause(sound)
    }

    pub fn unpause(&mut self, sound: SfxHandle) -> SfxResult<()> {
        self.registry.unpause(sound)
    }

    pub fn set_looping(&mut self, sound: SfxHandle, looping: bool) -> SfxResult<()> {
        self.registry.set_looping(sound, looping)
    }

    pub fn go_to_frame(&mut self, sound: SfxHandle, frame: usize) -> SfxResult<()> {
        self.registry.go_to_frame(sound, frame)
    }

    pub fn is_playing(&self, sound: SfxHandle) -> SfxResult<bool> {
        self.registry.is_playing(sound)
    }

    pub fn is_paused(&self, sound: SfxHandle) -> SfxResult<bool> {
        self.registry.is_paused(sound)
    }

    pub fn is_looped(&self, sound: SfxHandle) -> SfxResult<bool> {
        self.registry.is_looped(sound)
    }

    /// 当前游标，`None` 表示已停止 / 播完
    pub fn get_position(&self, sound: SfxHandle) -> SfxResult<Option<usize>> {
        self.registry.position(sound)
    }

    pub fn registry(&self) -> &SoundRegistry {
        &self.registry
    }

    // format
    pub fn get_format(&self) -> OutputFormat {
        self.format
    }

    pub fn get_bit_depth(&self) -> BitDepth {
        self.format.bit_depth
    }

    pub fn get_sample_rate(&self) -> SampleRate {
        self.format.sample_rate
    }

    pub fn get_channel_count(&self) -> usize {
        self.format.channel_count()
    }

    pub fn get_bytes_per_frame(&self) -> usize {
        self.format.bytes_per_frame()
    }

    pub fn get_frames_per_buffer(&self) -> usize {
        self.format.frames_per_buffer
    }

    pub fn get_buffer_size_in_bytes(&self) -> usize {
        self.format.buffer_size_in_bytes()
    }

    /// 一个块的时长；设备实际延迟见 `SfxManager::get_buffer_latency`
    pub fn get_buffer_latency(&self) -> Duration {
        self.format.block_duration()
    }
}
