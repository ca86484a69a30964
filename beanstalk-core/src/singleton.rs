//! 单例缓存
//!
//! 只保存完整初始化的单例。创建失败不会留下任何条目。

use std::collections::HashMap;

use parking_lot::{ReentrantMutex, RwLock};

use crate::bean::Bean;
use crate::error::ContainerResult;

/// 单例实例存储
#[derive(Default)]
pub struct SingletonRegistry {
    /// 单例 Bean 缓存
    singletons: RwLock<HashMap<String, Bean>>,

    /// 串行化 "查缓存，否则创建并插入"
    ///
    /// 可重入：同一线程在装配嵌套单例时会再次进入
    creation_lock: ReentrantMutex<()>,
}

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Bean> {
        self.singletons.read().get(name).cloned()
    }

    /// 返回缓存的单例，不存在时调用 `create` 创建并缓存
    ///
    /// 并发首次访问时只有一个线程执行 `create`，其余线程等待后读取缓存
    pub fn get_or_create<F>(&self, name: &str, create: F) -> ContainerResult<Bean>
    where
        F: FnOnce() -> ContainerResult<Bean>,
    {
        if let Some(bean) = self.get(name) {
            tracing::trace!("Returning cached instance of singleton bean '{}'", name);
            return Ok(bean);
        }

        let _lock = self.creation_lock.lock();

        // 等待期间可能已被其他线程创建
        if let Some(bean) = self.get(name) {
            tracing::trace!("Singleton bean '{}' was created concurrently", name);
            return Ok(bean);
        }

        let bean = create()?;
        self.singletons
            .write()
            .insert(name.to_string(), bean.clone());

        tracing::debug!("Singleton bean '{}' created and cached", name);
        Ok(bean)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.singletons.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.singletons.read().is_empty()
    }
}

impl std::fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("singletons", &self.len())
            .finish()
    }
}
