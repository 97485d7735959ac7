use crate::error::{SfxError, SfxResult};

/// 已解码的单声道音效 + 播放游标。
///
/// 样本数据在注册后不可变；游标为 `None` 表示 END_OF_DATA（不在推进）。
/// 不变量：游标要么是 `None`，要么严格小于 `data.len()`。
pub struct Sound {
    data: Box<[f32]>,
    cursor: Option<usize>,
    looping: bool,
}

impl Sound {
    /// `data` 不能为空，由注册表保证
    pub(crate) fn new(data: Box<[f32]>) -> Self {
        debug_assert!(!data.is_empty());
        Self {
            data,
            cursor: None,
            looping: false,
        }
    }

    pub fn frames_count(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// 当前游标，`None` 为 END_OF_DATA
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// 回到开头，不改变循环标志
    pub fn play(&mut self) {
        self.cursor = Some(0);
    }

    pub fn stop(&mut self) {
        self.cursor = None;
    }

    pub fn go_to_frame(&mut self, frame: usize) -> SfxResult<()> {
        if frame >= self.data.len() {
            return Err(SfxError::OutOfRange { frame, len: self.data.len() });
        }
        self.cursor = Some(frame);
        Ok(())
    }

    /// 推进游标。循环音效回绕到开头；非循环音效走到（或越过）末尾即结束。
    pub fn advance_by(&mut self, frames: usize) {
        let Some(begin) = self.cursor else { return };
        let max = self.data.len();
        let next = begin + frames;
        self.cursor = if self.looping {
            Some(next % max)
        } else if next < max {
            Some(next)
        } else {
            None
        };
    }

    /// 从游标处读出 `out.len()` 个样本，不推进游标。
    ///
    /// 循环音效在末尾回绕（块比音效还长时会重复多次）；
    /// 非循环音效剩余不足时尾部补零；END_OF_DATA 输出静音。
    pub fn service(&self, out: &mut [f32]) {
        let Some(begin) = self.cursor else {
            out.fill(0.0);
            return;
        };
        let max = self.data.len();

        if self.looping {
            let mut pos = begin;
            let mut written = 0;
            while written < out.len() {
                let n = (max - pos).min(out.len() - written);
                out[written..written + n].copy_from_slice(&self.data[pos..pos + n]);
                written += n;
                pos = 0;
            }
        } else {
            let n = (max - begin).min(out.len());
            out[..n].copy_from_slice(&self.data[begin..begin + n]);
            out[n..].fill(0.0);
        }
    }
}
