use std::marker::PhantomData;

pub trait IdKey: Sized + Copy {
    fn from_index(index: usize) -> Self;
    fn index(&self) -> usize;
}

/// 只增不减的句柄容器：句柄即下标，永不复用，也不支持删除。
#[derive(Clone)]
pub struct IdVec<V, H: IdKey> {
    data: Vec<V>,
    _phantom: PhantomData<H>,
}

impl<V, H: IdKey> Default for IdVec<V, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, H: IdKey> IdVec<V, H> {
    pub fn new() -> Self {
        IdVec {
            data: Vec::new(),
            _phantom: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        IdVec {
            data: Vec::with_capacity(capacity),
            _phantom: PhantomData,
        }
    }

    /// 追加新值，返回的句柄等于它的下标
    pub fn push(&mut self, value: V) -> H {
        let id = self.data.len();
        self.data.push(value);
        H::from_index(id)
    }

    pub fn contains(&self, handle: H) -> bool {
        handle.index() < self.data.len()
    }

    pub fn get(&self, handle: H) -> Option<&V> {
        self.data.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut V> {
        self.data.get_mut(handle.index())
    }

    pub fn keys(&self) -> impl Iterator<Item = H> + '_ {
        (0..self.data.len()).map(H::from_index)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.data.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.data.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &V)> {
        self.data.iter().enumerate().map(|(id, v)| (H::from_index(id), v))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 下一个即将分配的句柄（调试用）
    pub fn peek_next(&self) -> H {
        H::from_index(self.data.len())
    }
}
