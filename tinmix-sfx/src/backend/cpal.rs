// 标准库导入
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

// 第三方 crate 导入
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, warn};

// 当前 crate 内部模块导入
use crate::backend::{AudioBackend, StreamParams};
use crate::error::{SfxError, SfxResult};
use crate::scheduler::{CallbackStatus, OutputConsumer};

const NO_LATENCY: u64 = u64::MAX;

pub struct Player {
    stream: Option<cpal::Stream>,
    device_lost: Arc<AtomicBool>,
    // 回调测得的输出延迟（微秒），NO_LATENCY 表示尚未测得
    latency_us: Arc<AtomicU64>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            stream: None,
            device_lost: Arc::new(AtomicBool::new(false)),
            latency_us: Arc::new(AtomicU64::new(NO_LATENCY)),
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// 设备是否支持以固定块大小输出 f32
fn supports_fixed_buffer(device: &cpal::Device, params: &StreamParams) -> SfxResult<bool> {
    let configs = device
        .supported_output_configs()
        .map_err(|e| SfxError::HardwareIo(format!("Failed to query output configs: {e}")))?;

    let mut format_supported = false;
    let mut fixed_supported = false;
    for range in configs {
        if range.channels() != params.channels
            || range.sample_format() != cpal::SampleFormat::F32
            || range.min_sample_rate() > params.sample_rate
            || range.max_sample_rate() < params.sample_rate
        {
            continue;
        }
        format_supported = true;
        if let cpal::SupportedBufferSize::Range { min, max } = range.buffer_size() {
            fixed_supported |= (*min..=*max).contains(&params.frames_per_buffer);
        }
    }

    if !format_supported {
        return Err(SfxError::HardwareIo(format!(
            "Default output device cannot play f32 with {} channels at {} Hz",
            params.channels, params.sample_rate
        )));
    }
    Ok(fixed_supported)
}

impl AudioBackend for Player {
    fn open(&mut self, params: StreamParams, mut consumer: OutputConsumer) -> SfxResult<()> {
        if self.stream.is_some() {
            self.close()?;
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SfxError::HardwareIo("No Device".into()))?;

        let buffer_size = if supports_fixed_buffer(&device, &params)? {
            cpal::BufferSize::Fixed(params.frames_per_buffer)
        } else {
            warn!(
                "Device does not accept {} frames per buffer; using its default size",
                params.frames_per_buffer
            );
            cpal::BufferSize::Default
        };

        let config = cpal::StreamConfig {
            channels: params.channels,
            sample_rate: params.sample_rate,
            buffer_size,
        };

        self.device_lost.store(false, Ordering::Release);
        self.latency_us.store(NO_LATENCY, Ordering::Relaxed);
        let device_lost_trigger = self.device_lost.clone();
        let orphaned_trigger = self.device_lost.clone();
        let latency = self.latency_us.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], info: &cpal::OutputCallbackInfo| {
                    // 生产者已销毁：输出静音，并让控制线程把这条流当作失效处理
                    if matches!(consumer.render(data), CallbackStatus::Stop) {
                        orphaned_trigger.store(true, Ordering::Release);
                    }

                    let ts = info.timestamp();
                    if let Some(d) = ts.playback.duration_since(&ts.callback) {
                        latency.store(d.as_micros() as u64, Ordering::Relaxed);
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    device_lost_trigger.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|e| SfxError::HardwareIo(format!("Failed to build audio stream: {e}")))?;

        debug!("Audio stream opened: {:?}", params);
        self.stream = Some(stream);
        Ok(())
    }

    fn start(&mut self) -> SfxResult<()> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| SfxError::HardwareIo("Stream is not open".into()))?;
        stream
            .play()
            .map_err(|e| SfxError::HardwareIo(format!("Failed to start audio stream: {e}")))?;
        debug!("Audio stream started");
        Ok(())
    }

    fn stop(&mut self) -> SfxResult<()> {
        let Some(stream) = self.stream.as_ref() else { return Ok(()) };
        stream
            .pause()
            .map_err(|e| SfxError::HardwareIo(format!("Failed to stop audio stream: {e}")))?;
        debug!("Audio stream stopped");
        Ok(())
    }

    fn close(&mut self) -> SfxResult<()> {
        if self.stream.take().is_some() {
            debug!("Audio stream closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    fn output_latency(&self) -> Option<Duration> {
        match self.latency_us.load(Ordering::Relaxed) {
            NO_LATENCY => None,
            us => Some(Duration::from_micros(us)),
        }
    }
}
