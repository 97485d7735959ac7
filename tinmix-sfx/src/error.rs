//! 音效引擎的错误类型

use thiserror::Error;

use crate::clip::SfxHandle;

#[derive(Error, Debug)]
pub enum SfxError {
    /// 句柄超出注册表范围
    #[error("Invalid sound handle: {0}")]
    InvalidHandle(SfxHandle),

    /// 声道数为 0、样本数据畸形等
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 跳转位置超出音效长度
    #[error("Frame {frame} is out of range for a sound of {len} frames")]
    OutOfRange { frame: usize, len: usize },

    /// 位深或声道布局不在支持列表中
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// 底层音频设备 / 流的打开、启动、停止、关闭失败
    #[error("Audio hardware error: {0}")]
    HardwareIo(String),

    #[error("Failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
}

pub type SfxResult<T> = Result<T, SfxError>;
