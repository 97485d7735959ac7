use anyhow::Context;
use log::*;
use tinmix_sfx::{EngineSettings, SfxManager};

use crate::{mix_loop::MixLoop, tools::*};

/// 应用主结构：打开音频输出，按节奏驱动生产者一步和用户逻辑。
pub struct App {
    max_level: LevelFilter,
    settings: EngineSettings,
    /// 每秒 tick 数，0 表示按块时长自动推导
    tick_rate: u32,
    session: Box<dyn MixLoop>,
}

impl App {
    pub fn new(session: impl MixLoop + 'static) -> Self {
        Self {
            max_level: LevelFilter::Info,
            settings: EngineSettings::default(),
            tick_rate: 0,
            session: Box::new(session),
        }
    }

    pub fn set_logger_max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    #[allow(dead_code)]
    pub fn set_engine_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    #[allow(dead_code)]
    pub fn set_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        platform_specific::init_logger(self.max_level);

        let mut sfx_manager = SfxManager::new(&self.settings).context("Failed to open audio output")?;
        info!(
            "Output: {} ch, {} frames per buffer ({} bytes), latency {:?}",
            sfx_manager.get_channel_count(),
            sfx_manager.get_frames_per_buffer(),
            sfx_manager.get_buffer_size_in_bytes(),
            sfx_manager.get_buffer_latency(),
        );

        self.session.start(&mut sfx_manager)?;

        let limit = tick_interval(self.tick_rate, sfx_manager.engine());
        let mut time_manager = TimeManager::new();

        loop {
            time_manager.update();
            if time_manager.get_ticks() % 1000 == 0 {
                time_manager.log_time_data();
            }

            sfx_manager.update();
            sfx_manager.maintain_stream();

            if !self.session.update(&time_manager, &mut sfx_manager)? {
                break;
            }

            tick_limiter(&mut time_manager, limit);
        }

        info!("Finished after {:.2}s (avg {} ticks/s)", time_manager.get_time(), time_manager.get_tick_rate());
        Ok(())
    }
}
