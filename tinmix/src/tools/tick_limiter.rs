// https://github.com/aevyrie/bevy_framepace/blob/main/src/lib.rs
// MIT License

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::time::{Duration, Instant};

use tinmix_sfx::SfxEngine;

use crate::tools::TimeManager;

/// 控制线程的 tick 间隔：显式频率优先，否则每个块 tick 两次，
/// 保证下一次硬件回调之前 dirty 已被清掉
pub fn tick_interval(tick_rate: u32, engine: &SfxEngine) -> Duration {
    if tick_rate > 0 {
        Duration::from_secs_f64(1.0 / tick_rate as f64)
    } else {
        engine.get_buffer_latency() / 2
    }
}

pub fn tick_limiter(timer: &mut TimeManager, limit: Duration) {
    let tick_time = timer.sleep_end.elapsed();
    let oversleep = timer.sleep_timer.oversleep;

    let sleep_time = limit.saturating_sub(tick_time + oversleep);
    spin_sleep::sleep(sleep_time);

    let tick_time_total = timer.sleep_end.elapsed();
    timer.sleep_end = Instant::now();

    timer.sleep_timer.ticktime = tick_time;
    timer.sleep_timer.oversleep = tick_time_total.saturating_sub(limit);
}
