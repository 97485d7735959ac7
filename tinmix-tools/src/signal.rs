//! 无状态的信号小工具：声道交错 / 解交错，以及 2 的幂取整。
//!
//! 交错布局：`L R L R ...`；平面布局：`L L ... R R ...`。
//! 不足一整帧的尾部样本会被丢弃。

/// 平面 -> 交错，写入 `out`（长度需与 `planar` 相同）
pub fn interleave_into(planar: &[f32], channels: usize, out: &mut [f32]) {
    debug_assert_eq!(planar.len(), out.len());
    if channels <= 1 {
        let n = planar.len().min(out.len());
        out[..n].copy_from_slice(&planar[..n]);
        return;
    }

    let frames = planar.len().min(out.len()) / channels;
    for c in 0..channels {
        let src = &planar[c * frames..(c + 1) * frames];
        for (f, &sample) in src.iter().enumerate() {
            out[f * channels + c] = sample;
        }
    }
}

/// 交错 -> 平面，写入 `out`（长度需与 `interleaved` 相同）
pub fn uninterleave_into(interleaved: &[f32], channels: usize, out: &mut [f32]) {
    debug_assert_eq!(interleaved.len(), out.len());
    if channels <= 1 {
        let n = interleaved.len().min(out.len());
        out[..n].copy_from_slice(&interleaved[..n]);
        return;
    }

    let frames = interleaved.len().min(out.len()) / channels;
    for (f, frame) in interleaved.chunks_exact(channels).take(frames).enumerate() {
        for (c, &sample) in frame.iter().enumerate() {
            out[c * frames + f] = sample;
        }
    }
}

pub fn interleave(planar: &[f32], channels: usize) -> Vec<f32> {
    let len = whole_frames(planar.len(), channels);
    let mut out = vec![0.0; len];
    interleave_into(&planar[..len], channels, &mut out);
    out
}

pub fn uninterleave(interleaved: &[f32], channels: usize) -> Vec<f32> {
    let len = whole_frames(interleaved.len(), channels);
    let mut out = vec![0.0; len];
    uninterleave_into(&interleaved[..len], channels, &mut out);
    out
}

/// 大于等于 `n` 的最小 2 的幂；`0` 取 `1`
pub fn nearest_upper_power_of_two(n: u64) -> u64 {
    n.max(1).next_power_of_two()
}

#[inline]
fn whole_frames(len: usize, channels: usize) -> usize {
    if channels <= 1 { len } else { len - len % channels }
}
