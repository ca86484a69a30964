//! 生命周期回调接口
//!
//! 对应 Spring 的 Aware 接口与 InitializingBean。一个类型可以实现其中任意子集，
//! 并通过 [`TypeDescriptorBuilder`](crate::TypeDescriptorBuilder) 声明，容器在创建流程中按固定顺序调用：
//!
//! 1. [`BeanNameAware::set_bean_name`]
//! 2. [`ApplicationContextAware::set_application_context`]
//! 3. 所有 `post_construct` 钩子
//! 4. [`InitializingBean::after_properties_set`]

use std::sync::Arc;

use crate::ApplicationContext;

/// 感知自身 Bean 名称
pub trait BeanNameAware {
    fn set_bean_name(&mut self, name: &str);
}

/// 感知所属容器
///
/// 实现方应当只保存 `Arc::downgrade(context)`，保存强引用会使容器与 Bean 互相持有
pub trait ApplicationContextAware {
    fn set_application_context(&mut self, context: &Arc<ApplicationContext>);
}

/// 依赖注入完成后的初始化回调
pub trait InitializingBean {
    /// 返回错误会中止该 Bean 的创建
    fn after_properties_set(&mut self) -> anyhow::Result<()>;
}
