//! 事务代理
//!
//! Rust 没有运行时动态代理，这里用编译期包装类型代替：
//! `TransactionalProxy<dyn Contract>` 通过 `#[intercepted]` 生成的实现
//! 满足与目标相同的 trait，每次调用都经过 [`TransactionalProxy::invoke`]。

use std::fmt;
use std::sync::Arc;

use crate::{JoinPoint, TransactionManager};

/// 事务代理
///
/// 持有真实实例，在每次转发调用前执行 `begin`，调用后执行 `commit`
pub struct TransactionalProxy<T: ?Sized> {
    /// 被代理的真实实例
    target: Arc<T>,

    /// 事务管理器
    manager: Arc<dyn TransactionManager>,

    /// 目标 Bean 名称（用于连接点）
    bean_name: String,
}

impl<T: ?Sized> TransactionalProxy<T> {
    /// 创建新的代理
    pub fn new(
        target: Arc<T>,
        manager: Arc<dyn TransactionManager>,
        bean_name: impl Into<String>,
    ) -> Self {
        Self {
            target,
            manager,
            bean_name: bean_name.into(),
        }
    }

    /// 转发一次调用
    ///
    /// 顺序固定为：begin -> 目标方法 -> commit，每个动作恰好执行一次。
    /// 返回值可以借用目标实例
    pub fn invoke<'a, R, F>(&'a self, method: &'static str, call: F) -> R
    where
        F: FnOnce(&'a T) -> R,
    {
        let join_point = JoinPoint::new(&self.bean_name, method);

        self.manager.begin(&join_point);
        let result = call(&*self.target);
        self.manager.commit(&join_point);

        result
    }

    /// 获取被代理的真实实例
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// 获取目标 Bean 名称
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }
}

impl<T: ?Sized> fmt::Debug for TransactionalProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionalProxy")
            .field("bean_name", &self.bean_name)
            .field("manager", &self.manager.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    trait Counter: Send + Sync {
        fn add(&self, value: u32) -> u32;
    }

    struct SimpleCounter {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Counter for SimpleCounter {
        fn add(&self, value: u32) -> u32 {
            self.log.lock().push(format!("add({})", value));
            value + 1
        }
    }

    impl<T: ?Sized + Counter> Counter for TransactionalProxy<T> {
        fn add(&self, value: u32) -> u32 {
            self.invoke("add", move |target| target.add(value))
        }
    }

    struct RecordingManager {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl TransactionManager for RecordingManager {
        fn begin(&self, join_point: &JoinPoint<'_>) {
            self.log.lock().push(format!("begin {}", join_point));
        }

        fn commit(&self, join_point: &JoinPoint<'_>) {
            self.log.lock().push(format!("commit {}", join_point));
        }
    }

    #[test]
    fn test_invoke_wraps_call_with_begin_and_commit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let target: Arc<dyn Counter> = Arc::new(SimpleCounter { log: Arc::clone(&log) });
        let manager = Arc::new(RecordingManager { log: Arc::clone(&log) });

        let proxy: Arc<dyn Counter> = Arc::new(TransactionalProxy::new(target, manager, "counter"));

        assert_eq!(proxy.add(1), 2);
        assert_eq!(proxy.add(5), 6);

        assert_eq!(
            *log.lock(),
            vec![
                "begin counter::add",
                "add(1)",
                "commit counter::add",
                "begin counter::add",
                "add(5)",
                "commit counter::add",
            ]
        );
    }

    #[test]
    fn test_target_is_shared_not_copied() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let target: Arc<dyn Counter> = Arc::new(SimpleCounter { log: Arc::clone(&log) });
        let proxy = TransactionalProxy::new(
            Arc::clone(&target),
            Arc::new(crate::LoggingTransactionManager::new()),
            "counter",
        );

        assert!(Arc::ptr_eq(proxy.target(), &target));
        assert_eq!(proxy.bean_name(), "counter");
    }
}
