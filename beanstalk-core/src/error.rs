//! 容器错误类型
//!
//! 容器内部使用 [`ContainerError`] 报告失败，用户编写的钩子和构造函数返回
//! `anyhow::Result`，失败时被包装为对应变体的 `source`。

use thiserror::Error;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 请求的名称没有对应的 Bean 定义
    #[error("No bean named '{0}' is registered")]
    BeanNotFound(String),

    /// 无法构造 Bean 实例
    #[error("Failed to instantiate bean '{bean}': {source}")]
    InstantiationFailed {
        bean: String,
        #[source]
        source: anyhow::Error,
    },

    /// 初始化钩子（@PostConstruct / afterPropertiesSet）执行失败
    #[error("Initialization hook '{hook}' of bean '{bean}' failed: {source}")]
    InitializationFailed {
        bean: String,
        hook: String,
        #[source]
        source: anyhow::Error,
    },

    /// 依赖槽指向的名称没有注册
    #[error("Bean '{bean}' depends on '{slot}', which is not a registered bean")]
    DependencyResolution { bean: String, slot: String },

    /// 循环依赖
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    /// 类型不匹配
    #[error("Bean '{bean}' has type '{found}', expected '{expected}'")]
    TypeMismatch {
        bean: String,
        expected: String,
        found: String,
    },

    /// 禁止覆盖时重复注册
    #[error("Bean '{0}' is already registered and overriding is disabled")]
    BeanAlreadyExists(String),

    /// 无法识别的作用域
    #[error("Invalid scope '{0}', expected 'singleton' or 'prototype'")]
    InvalidScope(String),

    /// ApplicationContext 已被释放
    #[error("Application context is no longer available")]
    ContextUnavailable,

    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 日志初始化失败
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}

/// 容器结果类型
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

impl ContainerError {
    /// 错误是否由缺失的 Bean 名称引起
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::BeanNotFound(_))
    }
}
