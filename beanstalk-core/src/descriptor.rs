//! 类型描述
//!
//! `TypeDescriptor` 取代运行时反射：组件在声明时列出名称、作用域、依赖槽、
//! 生命周期钩子与发布方式，容器只通过这些类型擦除的闭包操作实例。
//! 通常由 `#[derive(Component)]` 生成，也可以手写：
//!
//! ```
//! use std::sync::Arc;
//! use beanstalk_core::{Autowired, Scope, TypeDescriptor};
//!
//! #[derive(Default)]
//! struct Repository;
//!
//! #[derive(Default)]
//! struct Service {
//!     repository: Autowired<Repository>,
//! }
//!
//! let descriptor = TypeDescriptor::builder::<Service>()
//!     .scope(Scope::Prototype)
//!     .default_constructible()
//!     .dependency("repository", |s: &mut Service, r: Arc<Repository>| s.repository.inject(r))
//!     .build();
//!
//! assert_eq!(descriptor.type_name(), "Service");
//! assert_eq!(descriptor.dependency_names().collect::<Vec<_>>(), vec!["repository"]);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use beanstalk_aop::TransactionManager;

use crate::bean::Bean;
use crate::error::{ContainerError, ContainerResult};
use crate::lifecycle::{ApplicationContextAware, BeanNameAware, InitializingBean};
use crate::utils::naming::simple_type_name;
use crate::{ApplicationContext, IntoResult, Scope};

/// 创建流程中的裸实例
pub(crate) type RawInstance = Box<dyn Any + Send + Sync>;

type Instantiator = Box<dyn Fn() -> anyhow::Result<RawInstance> + Send + Sync>;
type Injector =
    Box<dyn Fn(&str, &mut (dyn Any + Send + Sync), Bean) -> ContainerResult<()> + Send + Sync>;
type Hook = Box<dyn Fn(&str, &mut (dyn Any + Send + Sync)) -> ContainerResult<()> + Send + Sync>;
type ContextHook = Box<
    dyn Fn(&str, &mut (dyn Any + Send + Sync), &Arc<ApplicationContext>) -> ContainerResult<()>
        + Send
        + Sync,
>;
type PlainPublisher = Box<dyn Fn(RawInstance) -> Option<Bean> + Send + Sync>;
type InterceptedPublisher =
    Box<dyn Fn(RawInstance, Arc<dyn TransactionManager>, &str) -> Option<Bean> + Send + Sync>;

/// 依赖槽：槽名即目标 Bean 名称
pub(crate) struct DependencySlot {
    pub(crate) name: String,
    pub(crate) inject: Injector,
}

/// 命名的 post_construct 钩子
pub(crate) struct NamedHook {
    pub(crate) name: String,
    pub(crate) run: Hook,
}

/// 实例的发布方式
pub(crate) enum Publication {
    /// 直接发布（可能转换为契约类型）
    Plain(PlainPublisher),
    /// 包装为事务代理后发布
    Intercepted(InterceptedPublisher),
}

/// 组件类型的元数据
pub struct TypeDescriptor {
    type_name: &'static str,
    full_type_name: &'static str,
    module_path: String,
    name: Option<String>,
    scope: Option<Scope>,
    lazy: bool,
    instantiator: Option<Instantiator>,
    pub(crate) dependencies: Vec<DependencySlot>,
    pub(crate) bean_name_aware: Option<Hook>,
    pub(crate) context_aware: Option<ContextHook>,
    pub(crate) post_construct: Vec<NamedHook>,
    pub(crate) initializing: Option<Hook>,
    pub(crate) publication: Publication,
}

impl TypeDescriptor {
    /// 为类型 `T` 创建描述构建器
    pub fn builder<T>() -> TypeDescriptorBuilder<T>
    where
        T: Send + Sync + 'static,
    {
        TypeDescriptorBuilder::new()
    }

    /// 简单类型名（不含路径与泛型参数）
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 完整类型名
    pub fn full_type_name(&self) -> &'static str {
        self.full_type_name
    }

    /// 类型所在模块路径
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// 显式指定的 Bean 名称，可能为空
    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 声明的作用域，未声明时为 `None`
    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 是否需要事务拦截
    pub fn requires_interception(&self) -> bool {
        matches!(self.publication, Publication::Intercepted(_))
    }

    /// 依赖槽名称（声明顺序）
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.dependencies.iter().map(|slot| slot.name.as_str())
    }

    /// post_construct 钩子名称（声明顺序）
    pub fn post_construct_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.post_construct.iter().map(|hook| hook.name.as_str())
    }

    pub(crate) fn instantiate(&self) -> anyhow::Result<RawInstance> {
        match &self.instantiator {
            Some(instantiator) => instantiator(),
            None => Err(anyhow::anyhow!(
                "type '{}' declares no constructor",
                self.full_type_name
            )),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("module_path", &self.module_path)
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("requires_interception", &self.requires_interception())
            .field("dependencies", &self.dependency_names().collect::<Vec<_>>())
            .field("post_construct", &self.post_construct_names().collect::<Vec<_>>())
            .finish()
    }
}

fn downcast_instance<'a, T: 'static>(
    bean: &str,
    instance: &'a mut (dyn Any + Send + Sync),
) -> ContainerResult<&'a mut T> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(|| ContainerError::TypeMismatch {
            bean: bean.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: "unknown".to_string(),
        })
}

fn into_arc<T: Send + Sync + 'static>(instance: RawInstance) -> Option<Arc<T>> {
    instance.downcast::<T>().ok().map(|boxed| Arc::new(*boxed))
}

/// `TypeDescriptor` 构建器
pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypeDescriptorBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn new() -> Self {
        let full_type_name = std::any::type_name::<T>();
        let base = full_type_name.split('<').next().unwrap_or(full_type_name);
        let module_path = base
            .rsplit_once("::")
            .map(|(module, _)| module.to_string())
            .unwrap_or_default();

        Self {
            descriptor: TypeDescriptor {
                type_name: simple_type_name(full_type_name),
                full_type_name,
                module_path,
                name: None,
                scope: None,
                lazy: false,
                instantiator: None,
                dependencies: Vec::new(),
                bean_name_aware: None,
                context_aware: None,
                post_construct: Vec::new(),
                initializing: None,
                publication: Publication::Plain(Box::new(|instance| {
                    into_arc::<T>(instance).map(Bean::new)
                })),
            },
            _marker: PhantomData,
        }
    }

    /// 显式 Bean 名称，空字符串等同于未指定
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.descriptor.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// 覆盖模块路径（宏传入 `module_path!()`）
    pub fn module_path(mut self, module_path: impl Into<String>) -> Self {
        self.descriptor.module_path = module_path.into();
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.descriptor.scope = Some(scope);
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.descriptor.lazy = lazy;
        self
    }

    /// 使用 `T::default()` 构造
    pub fn default_constructible(self) -> Self
    where
        T: Default,
    {
        self.instantiate_with(|| Ok(T::default()))
    }

    /// 使用自定义构造函数
    pub fn instantiate_with<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.descriptor.instantiator = Some(Box::new(move || {
            constructor().map(|instance| Box::new(instance) as RawInstance)
        }));
        self
    }

    /// 声明依赖槽
    ///
    /// `slot` 是目标 Bean 的名称；`inject` 把解析到的依赖写入实例
    pub fn dependency<C, F>(mut self, slot: impl Into<String>, inject: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<C>) + Send + Sync + 'static,
    {
        let slot = slot.into();
        let slot_name = slot.clone();

        self.descriptor.dependencies.push(DependencySlot {
            name: slot,
            inject: Box::new(
                move |bean: &str, instance: &mut (dyn Any + Send + Sync), dependency: Bean| {
                    let target = downcast_instance::<T>(bean, instance)?;
                    let resolved =
                        dependency
                            .downcast::<C>()
                            .ok_or_else(|| ContainerError::TypeMismatch {
                                bean: slot_name.clone(),
                                expected: std::any::type_name::<C>().to_string(),
                                found: dependency.type_name().to_string(),
                            })?;
                    inject(target, resolved);
                    Ok(())
                },
            ),
        });
        self
    }

    pub fn bean_name_aware(mut self) -> Self
    where
        T: BeanNameAware,
    {
        self.descriptor.bean_name_aware = Some(Box::new(
            |bean: &str, instance: &mut (dyn Any + Send + Sync)| {
                downcast_instance::<T>(bean, instance)?.set_bean_name(bean);
                Ok(())
            },
        ));
        self
    }

    pub fn application_context_aware(mut self) -> Self
    where
        T: ApplicationContextAware,
    {
        self.descriptor.context_aware = Some(Box::new(
            |bean: &str,
             instance: &mut (dyn Any + Send + Sync),
             context: &Arc<ApplicationContext>| {
                downcast_instance::<T>(bean, instance)?.set_application_context(context);
                Ok(())
            },
        ));
        self
    }

    pub fn initializing_bean(mut self) -> Self
    where
        T: InitializingBean,
    {
        self.descriptor.initializing = Some(Box::new(
            |bean: &str, instance: &mut (dyn Any + Send + Sync)| {
                downcast_instance::<T>(bean, instance)?
                    .after_properties_set()
                    .map_err(|source| ContainerError::InitializationFailed {
                        bean: bean.to_string(),
                        hook: "after_properties_set".to_string(),
                        source,
                    })
            },
        ));
        self
    }

    /// 添加 post_construct 钩子，按添加顺序执行；同名钩子只保留第一个
    pub fn post_construct<F, R>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + Send + Sync + 'static,
        R: IntoResult,
    {
        let name = name.into();
        if self.descriptor.post_construct.iter().any(|h| h.name == name) {
            return self;
        }

        let hook_name = name.clone();
        self.descriptor.post_construct.push(NamedHook {
            name,
            run: Box::new(move |bean: &str, instance: &mut (dyn Any + Send + Sync)| {
                hook(downcast_instance::<T>(bean, instance)?)
                    .into_result()
                    .map_err(|source| ContainerError::InitializationFailed {
                        bean: bean.to_string(),
                        hook: hook_name.clone(),
                        source,
                    })
            }),
        });
        self
    }

    /// 以契约类型 `C` 发布（通常是 `dyn Trait`）
    pub fn expose<C, F>(mut self, as_contract: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        self.descriptor.publication = Publication::Plain(Box::new(move |instance| {
            into_arc::<T>(instance).map(|arc| Bean::new(as_contract(arc)))
        }));
        self
    }

    /// 以契约类型 `C` 发布，并要求事务拦截
    ///
    /// `proxy` 负责把真实实例包装为实现同一契约的代理，
    /// 一般为 `TransactionalProxy<C>`
    pub fn transactional<C, F, P>(mut self, as_contract: F, proxy: P) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
        P: Fn(Arc<C>, Arc<dyn TransactionManager>, &str) -> Arc<C> + Send + Sync + 'static,
    {
        self.descriptor.publication =
            Publication::Intercepted(Box::new(
                move |instance: RawInstance, manager: Arc<dyn TransactionManager>, bean: &str| {
                    into_arc::<T>(instance)
                        .map(|arc| Bean::new(proxy(as_contract(arc), manager, bean)))
                },
            ));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plain;

    #[test]
    fn test_builder_defaults() {
        let descriptor = TypeDescriptor::builder::<Plain>().build();

        assert_eq!(descriptor.type_name(), "Plain");
        assert!(descriptor.module_path().ends_with("descriptor::tests"));
        assert_eq!(descriptor.explicit_name(), None);
        assert_eq!(descriptor.scope(), None);
        assert!(!descriptor.is_lazy());
        assert!(!descriptor.requires_interception());
        assert!(descriptor.instantiate().is_err());
    }

    #[test]
    fn test_empty_name_is_no_override() {
        let descriptor = TypeDescriptor::builder::<Plain>().name("").build();
        assert_eq!(descriptor.explicit_name(), None);

        let descriptor = TypeDescriptor::builder::<Plain>().name("plainBean").build();
        assert_eq!(descriptor.explicit_name(), Some("plainBean"));
    }

    #[test]
    fn test_duplicate_post_construct_kept_once() {
        let descriptor = TypeDescriptor::builder::<Plain>()
            .post_construct("init", |_: &mut Plain| ())
            .post_construct("warm_up", |_: &mut Plain| -> anyhow::Result<()> { Ok(()) })
            .post_construct("init", |_: &mut Plain| ())
            .build();

        assert_eq!(
            descriptor.post_construct_names().collect::<Vec<_>>(),
            vec!["init", "warm_up"]
        );
    }

    #[test]
    fn test_instantiate_and_publish() {
        let descriptor = TypeDescriptor::builder::<Plain>()
            .default_constructible()
            .build();

        let raw = descriptor.instantiate().unwrap();
        let bean = match &descriptor.publication {
            Publication::Plain(publish) => publish(raw).unwrap(),
            Publication::Intercepted(_) => panic!("unexpected interception"),
        };
        assert!(bean.downcast::<Plain>().is_some());
    }
}
