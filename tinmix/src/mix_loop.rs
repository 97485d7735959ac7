use tinmix_sfx::SfxManager;

use crate::tools::TimeManager;

/// 控制线程上的用户逻辑，每个 tick 在生产者一步之后调用
pub trait MixLoop {
    fn start(&mut self, sfx_manager: &mut SfxManager) -> anyhow::Result<()>;

    /// 返回 false 结束主循环
    fn update(&mut self, time_manager: &TimeManager, sfx_manager: &mut SfxManager) -> anyhow::Result<bool>;
}
