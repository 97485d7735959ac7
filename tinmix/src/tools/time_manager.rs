use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct TimeManager {
    start_time: Instant,
    current_time: Duration,
    delta_time: Duration,
    tick_rate: f32,
    tick_times: [f32; 20],  // tick 时间环形缓冲区
    tick_index: usize,
    ticks: u64,
    last_update: Instant,

    pub(crate) sleep_end: Instant,
    pub(crate) sleep_timer: SleepTimer,
}

#[derive(Default, Clone)]
pub(crate) struct SleepTimer {
    pub oversleep: Duration,
    pub ticktime: Duration,
}

impl TimeManager {
    pub(crate) fn new() -> Self {
        let start_time = Instant::now();
        Self {
            start_time,
            current_time: Duration::ZERO,
            delta_time: Duration::ZERO,
            tick_rate: 0.0,
            tick_times: [0.0; 20],
            tick_index: 0,
            ticks: 0,
            last_update: start_time,
            sleep_end: Instant::now(),
            sleep_timer: SleepTimer::default(),
        }
    }

    pub(crate) fn update(&mut self) {
        let now = Instant::now();

        self.delta_time = now.duration_since(self.last_update);
        self.last_update = now;
        self.current_time = now.duration_since(self.start_time);
        self.ticks += 1;

        let delta_secs = self.delta_time.as_secs_f32();
        self.tick_times[self.tick_index] = delta_secs;
        self.tick_index = (self.tick_index + 1) % self.tick_times.len();

        // 最近 N 个 tick 的平均频率
        let total_time: f32 = self.tick_times.iter().sum();
        self.tick_rate = if total_time > 0.0 {
            self.tick_times.len() as f32 / total_time
        } else {
            0.0
        };
    }

    // 当前时间 (秒)
    pub fn get_time(&self) -> f32 {
        self.current_time.as_secs_f32()
    }

    pub fn get_ticks(&self) -> u64 {
        self.ticks
    }

    // 平均 tick 频率
    pub fn get_tick_rate(&self) -> u32 {
        self.tick_rate.round() as u32
    }

    pub fn log_time_data(&self) {
        log::debug!(
            "Ticks: {}(avg/s) | DeltaTime: {:.6} | Time: {:.3}s | Work: {:?} | Oversleep: {:?}",
            self.tick_rate.round() as u32,
            self.delta_time.as_secs_f32(),
            self.current_time.as_secs_f32(),
            self.sleep_timer.ticktime,
            self.sleep_timer.oversleep,
        );
    }
}
