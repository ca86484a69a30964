// beanstalk-core: 类似 Spring 的轻量级 IoC 容器
//
// 提供按名称装配的依赖注入功能，支持：
// - 单例和原型作用域、延迟初始化
// - 按依赖槽名称注入（Autowired）
// - 生命周期回调（Aware / post_construct / InitializingBean）
// - 事务代理拦截
// - 组件自动发现（通过宏）

pub mod app;
pub mod bean;
pub mod bean_factory;
pub mod component;
pub mod config;
pub mod constants;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod registry;
pub mod scope;
pub mod singleton;
pub mod utils;

// Helper trait for post_construct hooks
// Allows both () and anyhow::Result<()> return types
pub trait IntoResult {
    fn into_result(self) -> anyhow::Result<()>;
}

impl IntoResult for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl IntoResult for anyhow::Result<()> {
    fn into_result(self) -> anyhow::Result<()> {
        self
    }
}

// 重新导出常用类型
pub use app::BeanstalkApplication;
pub use bean::{Autowired, Bean, BeanDefinition};
pub use bean_factory::{
    AutowireCapableBeanFactory, BeanFactory, BeanFactoryExt, ListableBeanFactory,
};
pub use component::{
    Component, ComponentRegistration, ComponentScanner, InventoryScanner, StaticComponentScanner,
};
pub use config::{
    ConfigRoot, ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource,
    PropertySource,
};
pub use constants::*;
pub use context::{ApplicationContext, ApplicationContextBuilder};
pub use descriptor::{TypeDescriptor, TypeDescriptorBuilder};
pub use error::{ContainerError, ContainerResult};
pub use lifecycle::{ApplicationContextAware, BeanNameAware, InitializingBean};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use registry::BeanDefinitionRegistry;
pub use scope::Scope;
pub use singleton::SingletonRegistry;

// 导出 AOP 与 inventory，供宏使用
pub use beanstalk_aop as aop;
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::aop::{LoggingTransactionManager, TransactionManager, TransactionalProxy};
    pub use crate::app::BeanstalkApplication;
    pub use crate::bean::{Autowired, Bean};
    pub use crate::bean_factory::{BeanFactory, BeanFactoryExt, ListableBeanFactory};
    pub use crate::component::Component;
    pub use crate::config::{ConfigRoot, Environment, MapPropertySource, PropertySource};
    pub use crate::context::ApplicationContext;
    pub use crate::descriptor::TypeDescriptor;
    pub use crate::error::{ContainerError, ContainerResult};
    pub use crate::lifecycle::{ApplicationContextAware, BeanNameAware, InitializingBean};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Scope;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
