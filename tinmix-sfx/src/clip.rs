use std::fmt;

use tinmix_tools::id_vec::IdKey;

/// 音效句柄：注册表中的下标，永不复用
#[derive(Default, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
pub struct SfxHandle(pub u64);

impl IdKey for SfxHandle {
    fn from_index(index: usize) -> Self { SfxHandle(index as u64) }
    fn index(&self) -> usize { self.0 as usize }
}

impl fmt::Display for SfxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
