use crate::registry::SoundRegistry;

/// 逐样本累加并钳位到 [-1, 1]。
///
/// 每合并一次就钳位一次，所以多路合并的结果与顺序有关：
/// 混音器总是按句柄从小到大合并。
pub fn combine(accumulator: &mut [f32], contribution: &[f32]) {
    debug_assert_eq!(accumulator.len(), contribution.len());
    for (acc, &sample) in accumulator.iter_mut().zip(contribution) {
        *acc = (*acc + sample).clamp(-1.0, 1.0);
    }
}

/// 每个 tick 的单声道混音，暂存区在构造时一次性分配
pub(crate) struct Mixer {
    sum: Box<[f32]>,
    work: Box<[f32]>,
}

impl Mixer {
    pub(crate) fn new(frames: usize) -> Self {
        Self {
            sum: vec![0.0; frames].into_boxed_slice(),
            work: vec![0.0; frames].into_boxed_slice(),
        }
    }

    /// 对活动集合中的每个音效：读出一块、推进游标、合并进总和
    pub(crate) fn mix(&mut self, registry: &mut SoundRegistry) -> &[f32] {
        self.sum.fill(0.0);
        let frames = self.sum.len();
        let (sounds, active) = registry.parts_mut();

        for &handle in active.iter() {
            let Some(sound) = sounds.get_mut(handle) else { continue };

            sound.service(&mut self.work);
            sound.advance_by(frames);
            combine(&mut self.sum, &self.work);
        }

        &self.sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_sounds_saturate() {
        let mut acc = [0.0; 4];
        combine(&mut acc, &[0.6; 4]);
        combine(&mut acc, &[0.6; 4]);
        assert_eq!(acc, [1.0; 4]);
    }

    #[test]
    fn opposite_sounds_cancel() {
        let mut acc = [0.0; 4];
        combine(&mut acc, &[0.6; 4]);
        combine(&mut acc, &[-0.6; 4]);
        assert_eq!(acc, [0.0; 4]);
    }

    #[test]
    fn clamps_after_each_combination() {
        // 0.8 + 0.8 -> 1.0（钳位）, 再 -0.8 -> 0.2；一次性求和再钳位会得到 0.8
        let mut acc = [0.0];
        combine(&mut acc, &[0.8]);
        combine(&mut acc, &[0.8]);
        combine(&mut acc, &[-0.8]);
        assert!((acc[0] - 0.2).abs() < 1e-6);

        let mut acc = [0.0];
        combine(&mut acc, &[-0.8]);
        combine(&mut acc, &[0.8]);
        combine(&mut acc, &[0.8]);
        assert!((acc[0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn negative_side_is_clamped() {
        let mut acc = [-0.7, 0.1];
        combine(&mut acc, &[-0.7, -0.2]);
        assert_eq!(acc[0], -1.0);
        assert!((acc[1] + 0.1).abs() < 1e-6);
    }

    #[test]
    fn mix_services_then_advances_active_sounds() {
        let mut registry = SoundRegistry::new();
        let a = registry.register(&[0.1, 0.2, 0.3, 0.4], 1, true).unwrap();
        let b = registry.register(&[0.5; 8], 1, true).unwrap();
        let idle = registry.register(&[0.9; 8], 1, true).unwrap();
        registry.play(a).unwrap();
        registry.play(b).unwrap();

        let mut mixer = Mixer::new(2);
        let out = mixer.mix(&mut registry).to_vec();
        assert!((out[0] - 0.6).abs() < 1e-6);
        assert!((out[1] - 0.7).abs() < 1e-6);

        assert_eq!(registry.position(a).unwrap(), Some(2));
        assert_eq!(registry.position(b).unwrap(), Some(2));
        assert_eq!(registry.position(idle).unwrap(), None);
    }

    #[test]
    fn mix_combines_in_handle_order_not_play_order() {
        let mut registry = SoundRegistry::new();
        let a = registry.register(&[0.8], 1, true).unwrap();
        let b = registry.register(&[0.8], 1, true).unwrap();
        let c = registry.register(&[-0.8], 1, true).unwrap();
        registry.play(c).unwrap();
        registry.play(b).unwrap();
        registry.play(a).unwrap();

        // 按句柄 a, b, c：0.8 + 0.8 -> 1.0，再 -0.8 -> 0.2；按播放顺序会是 0.8
        let mut mixer = Mixer::new(1);
        let out = mixer.mix(&mut registry);
        assert!((out[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn mix_with_nothing_active_is_silent() {
        let mut registry = SoundRegistry::new();
        registry.register(&[0.5; 4], 1, true).unwrap();
        let mut mixer = Mixer::new(4);
        assert_eq!(mixer.mix(&mut registry), &[0.0; 4]);
    }
}
