pub mod cpal;
pub mod null;

use std::time::Duration;

use crate::error::{SfxError, SfxResult};
use crate::scheduler::OutputConsumer;
use crate::settings::OutputFormat;

/// 打开输出流所需的参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamParams {
    pub channels: u16,
    pub sample_rate: u32,
    pub frames_per_buffer: u32,
}

impl TryFrom<&OutputFormat> for StreamParams {
    type Error = SfxError;

    fn try_from(format: &OutputFormat) -> SfxResult<Self> {
        // 块大小必须原样交给设备，截断会让回调和混音块对不上
        let frames_per_buffer = u32::try_from(format.frames_per_buffer).map_err(|_| {
            SfxError::UnsupportedConfiguration(format!(
                "{} frames per buffer exceeds the device frame count",
                format.frames_per_buffer
            ))
        })?;
        let channels = u16::try_from(format.channel_count()).map_err(|_| {
            SfxError::UnsupportedConfiguration(format!("{} channels", format.channel_count()))
        })?;

        Ok(Self {
            channels,
            sample_rate: format.sample_rate.as_hz(),
            frames_per_buffer,
        })
    }
}

/// 硬件输出端。回调里只调用 `OutputConsumer::render`。
pub trait AudioBackend {
    // 打开流，消费者移交给回调
    fn open(&mut self, params: StreamParams, consumer: OutputConsumer) -> SfxResult<()>;

    fn start(&mut self) -> SfxResult<()>;

    fn stop(&mut self) -> SfxResult<()>;

    // 关闭并释放流（连同消费者）
    fn close(&mut self) -> SfxResult<()>;

    fn is_open(&self) -> bool;

    // 流报告过错误，需要重建
    fn is_device_lost(&self) -> bool;

    // 设备报告的输出延迟
    fn output_latency(&self) -> Option<Duration>;
}
