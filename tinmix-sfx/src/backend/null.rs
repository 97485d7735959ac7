//! 不接硬件的输出端：消费者挂在一个共享槽里，由调用方手动驱动“硬件时钟”。
//! 用于无头运行和测试。

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use crate::backend::{AudioBackend, StreamParams};
use crate::error::{SfxError, SfxResult};
use crate::scheduler::{CallbackStatus, OutputConsumer};

#[derive(Default)]
struct Shared {
    consumer: Mutex<Option<OutputConsumer>>,
    running: AtomicBool,
    device_lost: AtomicBool,
    opened: AtomicUsize,
}

pub struct Player {
    shared: Arc<Shared>,
    params: Option<StreamParams>,
}

/// 测试侧的把手：模拟硬件回调、制造设备丢失
#[derive(Clone)]
pub struct NullTap {
    shared: Arc<Shared>,
}

impl Player {
    pub fn new() -> (Self, NullTap) {
        let shared = Arc::new(Shared::default());
        let tap = NullTap { shared: shared.clone() };
        (Self { shared, params: None }, tap)
    }
}

impl AudioBackend for Player {
    fn open(&mut self, params: StreamParams, consumer: OutputConsumer) -> SfxResult<()> {
        let mut slot = self
            .shared
            .consumer
            .lock()
            .map_err(|_| SfxError::HardwareIo("null stream poisoned".into()))?;
        *slot = Some(consumer);
        self.params = Some(params);
        self.shared.device_lost.store(false, Ordering::Release);
        self.shared.opened.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn start(&mut self) -> SfxResult<()> {
        if self.params.is_none() {
            return Err(SfxError::HardwareIo("Stream is not open".into()));
        }
        self.shared.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&mut self) -> SfxResult<()> {
        self.shared.running.store(false, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) -> SfxResult<()> {
        self.shared.running.store(false, Ordering::Release);
        if let Ok(mut slot) = self.shared.consumer.lock() {
            *slot = None;
        }
        self.params = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.params.is_some()
    }

    fn is_device_lost(&self) -> bool {
        self.shared.device_lost.load(Ordering::Acquire)
    }

    fn output_latency(&self) -> Option<Duration> {
        None
    }
}

impl NullTap {
    /// 模拟一次硬件回调。流未运行时输出静音并返回 `None`。
    pub fn pull(&self, dest: &mut [f32]) -> Option<CallbackStatus> {
        if !self.shared.running.load(Ordering::Acquire) {
            dest.fill(0.0);
            return None;
        }
        let mut slot = self.shared.consumer.lock().ok()?;
        let consumer = slot.as_mut()?;
        let status = consumer.render(dest);
        if matches!(status, CallbackStatus::Stop) {
            self.shared.running.store(false, Ordering::Release);
            self.shared.device_lost.store(true, Ordering::Release);
        }
        Some(status)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// 流被打开过几次（包括重建）
    pub fn open_count(&self) -> usize {
        self.shared.opened.load(Ordering::Relaxed)
    }

    /// 模拟流错误 / 设备拔出
    pub fn fail(&self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.device_lost.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SfxEngine;
    use crate::settings::{EngineSettings, SpeakerSetup};

    #[test]
    fn orphaned_stream_reports_itself_lost() {
        let settings = EngineSettings::new()
            .with_speaker_setup(SpeakerSetup::Mono)
            .with_frames_per_buffer(2);
        let (engine, consumer) = SfxEngine::new(&settings).unwrap();
        let params = StreamParams::try_from(&engine.get_format()).unwrap();

        let (mut player, tap) = Player::new();
        player.open(params, consumer).unwrap();
        player.start().unwrap();

        let mut out = [9.0; 2];
        assert_eq!(tap.pull(&mut out), Some(CallbackStatus::Continue));
        assert!(!player.is_device_lost());

        drop(engine);
        assert_eq!(tap.pull(&mut out), Some(CallbackStatus::Stop));
        assert_eq!(out, [0.0; 2]);
        assert!(player.is_device_lost());
        assert!(!tap.is_running());
    }
}
