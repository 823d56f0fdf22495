mod pool;

pub use pool::{ObjectPool, Pooled, Resettable, ScratchPool};
