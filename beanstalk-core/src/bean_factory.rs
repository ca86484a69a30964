//! Bean Factory - 核心容器接口与创建流程
//!
//! 参考 Spring 的 BeanFactory 架构设计

use std::sync::Arc;

use beanstalk_aop::TransactionManager;

use crate::bean::{Bean, BeanDefinition};
use crate::context::ApplicationContext;
use crate::descriptor::Publication;
use crate::error::{ContainerError, ContainerResult};
use crate::utils::dependency::CreationTracker;

/// BeanFactory - 最基础的容器接口
///
/// 提供基本的 Bean 访问功能，类似 Spring 的 BeanFactory
///
/// 注意：此 trait 不包含泛型方法，因此可以作为 trait object 使用
pub trait BeanFactory: Send + Sync {
    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<Bean>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;

    /// 指定 Bean 是否为单例
    fn is_singleton(&self, name: &str) -> ContainerResult<bool>;

    /// 指定 Bean 是否为原型
    fn is_prototype(&self, name: &str) -> ContainerResult<bool>;
}

/// BeanFactoryExt - BeanFactory 的扩展 trait
///
/// 提供泛型方法，不能作为 trait object 使用
pub trait BeanFactoryExt: BeanFactory {
    /// 通过名称获取 Bean，并取回其发布契约 `C`
    fn get_bean_as<C>(&self, name: &str) -> ContainerResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let bean = self.get_bean(name)?;
        bean.downcast::<C>()
            .ok_or_else(|| ContainerError::TypeMismatch {
                bean: name.to_string(),
                expected: std::any::type_name::<C>().to_string(),
                found: bean.type_name().to_string(),
            })
    }
}

impl<F: BeanFactory + ?Sized> BeanFactoryExt for F {}

/// ListableBeanFactory - 可列举的 Bean 工厂
///
/// 扩展 BeanFactory，提供列举所有 Bean 定义的能力
pub trait ListableBeanFactory: BeanFactory {
    /// 按注册顺序获取所有 Bean 的名称
    fn bean_names(&self) -> Vec<String>;

    /// 获取 Bean 定义的数量
    fn bean_definition_count(&self) -> usize;

    /// 获取单个 Bean 定义
    fn bean_definition(&self, name: &str) -> ContainerResult<&BeanDefinition>;
}

/// 执行完整的 Bean 创建流程
///
/// 工厂本身不缓存任何实例，缓存由 [`ApplicationContext`] 负责
pub struct AutowireCapableBeanFactory {
    /// 事务拦截使用的管理器
    transaction_manager: Arc<dyn TransactionManager>,

    /// 循环依赖检测
    creation_tracker: CreationTracker,
}

impl AutowireCapableBeanFactory {
    pub fn new(transaction_manager: Arc<dyn TransactionManager>) -> Self {
        Self {
            transaction_manager,
            creation_tracker: CreationTracker::new(),
        }
    }

    pub fn transaction_manager(&self) -> &Arc<dyn TransactionManager> {
        &self.transaction_manager
    }

    /// 创建 Bean 实例
    ///
    /// # 生命周期顺序
    /// 1. 实例化
    /// 2. 依赖注入（按槽名通过容器解析，递归创建）
    /// 3. BeanNameAware、ApplicationContextAware
    /// 4. post_construct 钩子
    /// 5. InitializingBean.after_properties_set
    /// 6. 需要时包装为事务代理
    ///
    /// 任一步失败都会中止整个创建，依赖创建产生的错误原样向上传递
    pub fn create_bean(
        &self,
        context: &ApplicationContext,
        definition: &BeanDefinition,
    ) -> ContainerResult<Bean> {
        let name = definition.name();
        let descriptor = definition.descriptor();

        // 标记为正在创建，guard 离开作用域时自动清理
        let _guard = self.creation_tracker.enter(name)?;

        tracing::debug!(
            "Creating instance of bean '{}' ({})",
            name,
            descriptor.full_type_name()
        );

        // 1. 实例化
        let mut instance = descriptor
            .instantiate()
            .map_err(|source| ContainerError::InstantiationFailed {
                bean: name.to_string(),
                source,
            })?;

        // 2. 依赖注入
        for slot in &descriptor.dependencies {
            if !context.contains_bean(&slot.name) {
                tracing::debug!(
                    "Bean '{}' depends on unregistered bean '{}'",
                    name,
                    slot.name
                );
                return Err(ContainerError::DependencyResolution {
                    bean: name.to_string(),
                    slot: slot.name.clone(),
                });
            }

            let dependency = context.get_bean(&slot.name)?;
            (slot.inject)(name, instance.as_mut(), dependency)?;
            tracing::trace!("  ├─ Injected '{}' into '{}'", slot.name, name);
        }

        // 3. Aware 回调
        if let Some(hook) = &descriptor.bean_name_aware {
            hook(name, instance.as_mut())?;
        }
        if let Some(hook) = &descriptor.context_aware {
            let context = context.self_arc().ok_or(ContainerError::ContextUnavailable)?;
            hook(name, instance.as_mut(), &context)?;
        }

        // 4. post_construct
        for hook in &descriptor.post_construct {
            tracing::trace!("  ├─ Invoking post_construct '{}' on '{}'", hook.name, name);
            (hook.run)(name, instance.as_mut())?;
        }

        // 5. InitializingBean
        if let Some(hook) = &descriptor.initializing {
            hook(name, instance.as_mut())?;
        }

        // 6. 发布
        let bean = match &descriptor.publication {
            Publication::Plain(publish) => publish(instance),
            Publication::Intercepted(publish) => {
                tracing::debug!(
                    "Wrapping bean '{}' in transactional proxy ({})",
                    name,
                    self.transaction_manager.name()
                );
                publish(instance, Arc::clone(&self.transaction_manager), name)
            }
        };

        bean.ok_or_else(|| ContainerError::TypeMismatch {
            bean: name.to_string(),
            expected: descriptor.full_type_name().to_string(),
            found: "unknown".to_string(),
        })
    }
}

impl std::fmt::Debug for AutowireCapableBeanFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutowireCapableBeanFactory")
            .field("transaction_manager", &self.transaction_manager.name())
            .finish()
    }
}
