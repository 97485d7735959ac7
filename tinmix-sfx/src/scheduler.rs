//! 控制线程（生产者）与音频回调（消费者）之间的块交接。
//!
//! 交接通道是一个容量恰好为一个块的 SPSC 环形缓冲：
//! - 环里有空位 = dirty，生产者可以计算下一块；
//! - 环里有一整块 = 消费者下次回调时取走。
//!
//! 实时线程不拿锁；消费者自己保留上一块，生产者来不及时重复播放旧块。

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use ringbuf::{
    HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use tinmix_tools::signal;

use crate::settings::{OutputFormat, OutputLayout};

/// 回调的返回状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackStatus {
    Continue,
    /// 引擎已销毁，硬件层应当停止拉取
    Stop,
}

pub(crate) struct OutputProducer {
    producer: ringbuf::HeapProd<f32>,
    layout: OutputLayout,
    planar: Box<[f32]>,
    block: Box<[f32]>,
    alive: Arc<AtomicBool>,
}

pub struct OutputConsumer {
    consumer: ringbuf::HeapCons<f32>,
    front: Box<[f32]>,
    read_pos: usize,
    channels: usize,
    alive: Arc<AtomicBool>,
}

/// 按输出格式建立一对生产者 / 消费者
pub(crate) fn handoff(format: &OutputFormat) -> (OutputProducer, OutputConsumer) {
    let block_len = format.block_len();
    let rb = HeapRb::<f32>::new(block_len);
    let (prod, cons) = rb.split();
    let alive = Arc::new(AtomicBool::new(true));

    let producer = OutputProducer {
        producer: prod,
        layout: format.layout,
        planar: vec![0.0; block_len].into_boxed_slice(),
        block: vec![0.0; block_len].into_boxed_slice(),
        alive: alive.clone(),
    };

    let consumer = OutputConsumer {
        consumer: cons,
        front: vec![0.0; block_len].into_boxed_slice(),
        // 起始视为已读完，第一次回调就去取新块
        read_pos: block_len,
        channels: format.channel_count(),
        alive,
    };

    (producer, consumer)
}

impl OutputProducer {
    /// 消费者已经取走上一块，可以计算新块
    pub(crate) fn is_dirty(&self) -> bool {
        self.producer.vacant_len() >= self.block.len()
    }

    /// 按布局展开单声道混音并发布；非 dirty 时返回 false
    pub(crate) fn publish(&mut self, mono: &[f32]) -> bool {
        if !self.is_dirty() {
            return false;
        }

        let frames = self.block.len() / self.layout.channel_count();
        if mono.len() != frames {
            // 不应发生；宁可输出静音也不把错误抛进实时链路
            log::warn!("Mix block has {} frames, expected {}; publishing silence", mono.len(), frames);
            self.block.fill(0.0);
        } else {
            match self.layout {
                OutputLayout::Mono => {
                    self.block.copy_from_slice(mono);
                }
                OutputLayout::DualMono => {
                    self.planar[..frames].copy_from_slice(mono);
                    self.planar[frames..].copy_from_slice(mono);
                    signal::interleave_into(&self.planar, 2, &mut self.block);
                }
            }
        }

        let pushed = self.producer.push_slice(&self.block);
        debug_assert_eq!(pushed, self.block.len());
        true
    }

    #[cfg(test)]
    pub(crate) fn block(&self) -> &[f32] {
        &self.block
    }
}

impl Drop for OutputProducer {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl OutputConsumer {
    pub fn block_len(&self) -> usize {
        self.front.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// 消费者一步：把当前块拷进硬件缓冲。
    ///
    /// `dest` 正好一块时每次回调取一块；长度不一致时按块连续拼接。
    /// 没有新块可取时重放上一块。
    pub fn render(&mut self, dest: &mut [f32]) -> CallbackStatus {
        if !self.alive.load(Ordering::Acquire) {
            dest.fill(0.0);
            return CallbackStatus::Stop;
        }

        let mut written = 0;
        while written < dest.len() {
            if self.read_pos >= self.front.len() {
                self.fetch();
            }

            let n = (self.front.len() - self.read_pos).min(dest.len() - written);
            dest[written..written + n].copy_from_slice(&self.front[self.read_pos..self.read_pos + n]);
            written += n;
            self.read_pos += n;
        }

        CallbackStatus::Continue
    }

    fn fetch(&mut self) {
        if self.consumer.occupied_len() >= self.front.len() {
            self.consumer.pop_slice(&mut self.front);
        }
        self.read_pos = 0;
    }
}
