use std::collections::BTreeSet;

use tinmix_tools::{id_vec::IdVec, signal};

use crate::clip::SfxHandle;
use crate::error::{SfxError, SfxResult};
use crate::sound::Sound;

/// 只增不减的音效仓库 + 活动集合。
///
/// 活动集合里的句柄每个 tick 都会被读出并推进；
/// 暂停 = 移出活动集合但保留游标。
pub struct SoundRegistry {
    sounds: IdVec<Sound, SfxHandle>,
    // 有序集合：混音按句柄顺序合并，结果可复现
    active: BTreeSet<SfxHandle>,
}

impl Default for SoundRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self {
            sounds: IdVec::with_capacity(128),
            active: BTreeSet::new(),
        }
    }

    /// 注册一段样本。多声道只保留第一个声道。
    pub fn register(&mut self, samples: &[f32], channels: usize, interleaved: bool) -> SfxResult<SfxHandle> {
        if channels == 0 {
            return Err(SfxError::InvalidInput("channel count must be at least 1".into()));
        }
        if samples.len() % channels != 0 {
            return Err(SfxError::InvalidInput(format!(
                "{} samples do not form whole frames of {} channels",
                samples.len(),
                channels
            )));
        }
        if samples.is_empty() {
            return Err(SfxError::InvalidInput("sound has no samples".into()));
        }
        if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SfxError::InvalidInput(format!("sample {i} is not finite")));
        }

        let frames = samples.len() / channels;
        let mono: Box<[f32]> = if channels > 1 && interleaved {
            let mut planar = signal::uninterleave(samples, channels);
            planar.truncate(frames);
            planar.into_boxed_slice()
        } else {
            samples[..frames].into()
        };

        Ok(self.sounds.push(Sound::new(mono)))
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn get(&self, handle: SfxHandle) -> SfxResult<&Sound> {
        self.sounds.get(handle).ok_or(SfxError::InvalidHandle(handle))
    }

    fn get_mut(&mut self, handle: SfxHandle) -> SfxResult<&mut Sound> {
        self.sounds.get_mut(handle).ok_or(SfxError::InvalidHandle(handle))
    }

    pub fn play(&mut self, handle: SfxHandle) -> SfxResult<()> {
        self.get_mut(handle)?.play();
        self.active.insert(handle);
        Ok(())
    }

    pub fn play_one_shot(&mut self, handle: SfxHandle) -> SfxResult<()> {
        let sound = self.get_mut(handle)?;
        sound.set_looping(false);
        sound.play();
        self.active.insert(handle);
        Ok(())
    }

    pub fn stop(&mut self, handle: SfxHandle) -> SfxResult<()> {
        self.get_mut(handle)?.stop();
        self.active.remove(&handle);
        Ok(())
    }

    pub fn stop_all(&mut self) {
        for sound in self.sounds.values_mut() {
            sound.stop();
        }
        self.active.clear();
    }

    /// 冻结播放位置
    pub fn pause(&mut self, handle: SfxHandle) -> SfxResult<()> {
        self.get(handle)?;
        self.active.remove(&handle);
        Ok(())
    }

    /// 从冻结的位置继续。已经结束的音效不会重新进入活动集合。
    pub fn unpause(&mut self, handle: SfxHandle) -> SfxResult<()> {
        if self.get(handle)?.is_playing() {
            self.active.insert(handle);
        }
        Ok(())
    }

    pub fn set_looping(&mut self, handle: SfxHandle, looping: bool) -> SfxResult<()> {
        self.get_mut(handle)?.set_looping(looping);
        Ok(())
    }

    pub fn go_to_frame(&mut self, handle: SfxHandle, frame: usize) -> SfxResult<()> {
        self.get_mut(handle)?.go_to_frame(frame)
    }

    pub fn position(&self, handle: SfxHandle) -> SfxResult<Option<usize>> {
        Ok(self.get(handle)?.position())
    }

    pub fn is_playing(&self, handle: SfxHandle) -> SfxResult<bool> {
        Ok(self.get(handle)?.is_playing())
    }

    pub fn is_paused(&self, handle: SfxHandle) -> SfxResult<bool> {
        Ok(self.get(handle)?.is_playing() && !self.active.contains(&handle))
    }

    pub fn is_looped(&self, handle: SfxHandle) -> SfxResult<bool> {
        Ok(self.get(handle)?.is_looping())
    }

    pub fn is_active(&self, handle: SfxHandle) -> bool {
        self.active.contains(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut IdVec<Sound, SfxHandle>, &BTreeSet<SfxHandle>) {
        (&mut self.sounds, &self.active)
    }

    /// 把本 tick 自然结束的音效移出活动集合
    pub(crate) fn prune_finished(&mut self) {
        let sounds = &self.sounds;
        self.active
            .retain(|&handle| sounds.get(handle).is_some_and(Sound::is_playing));
    }
}
