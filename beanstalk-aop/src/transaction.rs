//! 事务通知定义
//!
//! 代理在每次转发调用前后执行的固定动作

use crate::JoinPoint;

/// 事务管理器 Trait
///
/// `begin` 在目标方法执行前调用，`commit` 在目标方法返回后调用
pub trait TransactionManager: Send + Sync {
    /// 开启事务
    fn begin(&self, join_point: &JoinPoint<'_>);

    /// 提交事务
    fn commit(&self, join_point: &JoinPoint<'_>);

    /// 获取管理器名称（用于日志和调试）
    fn name(&self) -> &str {
        "TransactionManager"
    }
}

/// 默认事务管理器：只输出日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransactionManager;

impl LoggingTransactionManager {
    pub fn new() -> Self {
        Self
    }
}

impl TransactionManager for LoggingTransactionManager {
    fn begin(&self, join_point: &JoinPoint<'_>) {
        tracing::info!(target: "beanstalk::tx", "Transaction begin: {}", join_point);
    }

    fn commit(&self, join_point: &JoinPoint<'_>) {
        tracing::info!(
            target: "beanstalk::tx",
            "Transaction commit: {} ({:?})",
            join_point,
            join_point.timestamp().elapsed()
        );
    }

    fn name(&self) -> &str {
        "LoggingTransactionManager"
    }
}
