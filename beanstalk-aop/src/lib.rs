//! Beanstalk AOP - 事务拦截支持
//!
//! 提供容器在创建 Bean 的最后一步使用的拦截机制：
//! - 连接点（JoinPoint）描述一次被转发的调用
//! - 事务管理器（TransactionManager）定义 begin / commit 动作
//! - 事务代理（TransactionalProxy）在每次调用前后执行这两个动作
//!
//! 代理实现与目标相同的 trait，由 `beanstalk_macros::intercepted` 在编译期生成转发代码。

pub mod joinpoint;
pub mod proxy;
pub mod transaction;

// 重新导出核心类型
pub use joinpoint::JoinPoint;
pub use proxy::TransactionalProxy;
pub use transaction::{LoggingTransactionManager, TransactionManager};

/// 预导入模块
pub mod prelude {
    pub use crate::joinpoint::JoinPoint;
    pub use crate::proxy::TransactionalProxy;
    pub use crate::transaction::{LoggingTransactionManager, TransactionManager};
}
