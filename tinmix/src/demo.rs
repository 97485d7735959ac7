use std::f32::consts::TAU;

use anyhow::Context;
use log::info;
use tinmix_sfx::{SfxHandle, SfxManager};

use crate::mix_loop::MixLoop;
use crate::tools::TimeManager;

const DEMO_SECONDS: f32 = 6.0;

/// 正弦波（单声道）
pub fn tone(frequency: f32, amplitude: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let frames = (seconds * sample_rate as f32).round() as usize;
    (0..frames)
        .map(|i| amplitude * (TAU * frequency * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// 有文件参数时播放一次该文件；否则循环一个底音，每秒叠一声短音，
/// 中途暂停 / 恢复一次
pub struct Demo {
    path: Option<String>,
    file: Option<SfxHandle>,
    drone: Option<SfxHandle>,
    blip: Option<SfxHandle>,
    last_second: u32,
}

impl Demo {
    pub fn new(path: Option<String>) -> Self {
        Self {
            path,
            file: None,
            drone: None,
            blip: None,
            last_second: 0,
        }
    }
}

impl MixLoop for Demo {
    fn start(&mut self, sfx_manager: &mut SfxManager) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            info!("Loading {}", path);
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path}"))?;
            let handle = sfx_manager.load_sound(bytes).with_context(|| format!("Failed to load {path}"))?;
            sfx_manager.play_one_shot(handle)?;
            self.file = Some(handle);
            return Ok(());
        }

        let rate = sfx_manager.get_sample_rate().as_hz();
        let drone = sfx_manager.make_sound(&tone(220.0, 0.3, 1.0, rate), 1, true)?;
        let blip = sfx_manager.make_sound(&tone(880.0, 0.4, 0.08, rate), 1, true)?;

        sfx_manager.set_looping(drone, true)?;
        sfx_manager.play(drone)?;

        self.drone = Some(drone);
        self.blip = Some(blip);
        Ok(())
    }

    fn update(&mut self, time_manager: &TimeManager, sfx_manager: &mut SfxManager) -> anyhow::Result<bool> {
        if let Some(file) = self.file {
            return Ok(sfx_manager.is_playing(file)?);
        }

        let (Some(drone), Some(blip)) = (self.drone, self.blip) else {
            return Ok(false);
        };

        let second = time_manager.get_time() as u32;
        if second != self.last_second {
            self.last_second = second;
            sfx_manager.play_one_shot(blip)?;

            match second {
                2 => {
                    sfx_manager.pause(drone)?;
                    info!("Drone paused");
                }
                3 => {
                    sfx_manager.unpause(drone)?;
                    info!("Drone resumed");
                }
                _ => {}
            }
        }

        if time_manager.get_time() >= DEMO_SECONDS {
            sfx_manager.stop_all();
            return Ok(false);
        }
        Ok(true)
    }
}
