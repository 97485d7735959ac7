use std::ops::{Deref, DerefMut};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::backend::{AudioBackend, StreamParams};
use crate::engine::SfxEngine;
use crate::error::SfxResult;
use crate::settings::EngineSettings;

/// 引擎 + 硬件输出端。销毁时停止并关闭流。
pub struct SfxManager {
    engine: SfxEngine,
    backend: Box<dyn AudioBackend>,
}

impl SfxManager {
    /// 打开默认输出设备。设备打不开时构造失败。
    pub fn new(settings: &EngineSettings) -> SfxResult<Self> {
        Self::with_backend(settings, Box::new(crate::backend::cpal::Player::new()))
    }

    pub fn with_backend(settings: &EngineSettings, mut backend: Box<dyn AudioBackend>) -> SfxResult<Self> {
        let (engine, consumer) = SfxEngine::new(settings)?;
        let params = StreamParams::try_from(&engine.get_format())?;

        backend.open(params, consumer)?;
        backend.start()?;
        info!("Audio output running ({} ch @ {} Hz)", params.channels, params.sample_rate);

        Ok(Self { engine, backend })
    }

    /// 检查流是否失效，失效则重建交接通道并重新打开。
    /// 设备一直不可用时每次调用都会重试。
    pub fn maintain_stream(&mut self) {
        let lost = self.backend.is_device_lost();
        if !lost && self.backend.is_open() {
            return;
        }

        if lost {
            warn!("Audio stream lost, rebuilding");
            if let Err(e) = self.backend.close() {
                warn!("Error closing lost stream: {}", e);
            }
        }

        let consumer = self.engine.rebuild_output();
        let backend = &mut self.backend;
        let reopened = StreamParams::try_from(&self.engine.get_format())
            .and_then(|params| backend.open(params, consumer))
            .and_then(|_| backend.start());
        match reopened {
            Ok(()) => info!("Audio stream rebuilt"),
            Err(e) if lost => error!("Failed to rebuild audio stream: {}", e),
            Err(e) => debug!("Audio stream still unavailable: {}", e),
        }
    }

    /// 设备报告的输出延迟；尚未测得时退回一个块的时长
    pub fn get_buffer_latency(&self) -> Duration {
        self.backend
            .output_latency()
            .unwrap_or_else(|| self.engine.get_buffer_latency())
    }

    pub fn engine(&self) -> &SfxEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SfxEngine {
        &mut self.engine
    }
}

impl Deref for SfxManager {
    type Target = SfxEngine;

    fn deref(&self) -> &SfxEngine {
        &self.engine
    }
}

impl DerefMut for SfxManager {
    fn deref_mut(&mut self) -> &mut SfxEngine {
        &mut self.engine
    }
}

impl Drop for SfxManager {
    fn drop(&mut self) {
        if let Err(e) = self.backend.stop() {
            error!("Error stopping stream to playback device: {}", e);
        }
        if let Err(e) = self.backend.close() {
            error!("Error closing stream to playback device: {}", e);
        }
    }
}
