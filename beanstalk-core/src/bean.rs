use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::Scope;

/// 容器返回的类型擦除 Bean 句柄
///
/// 内部保存发布契约 `C` 的 `Arc<C>`，`C` 可以是具体类型也可以是 `dyn Trait`。
/// 克隆只增加引用计数，同一单例的所有句柄满足 [`Bean::ptr_eq`]。
#[derive(Clone)]
pub struct Bean {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Bean {
    /// 包装一个已发布的实例
    pub fn new<C>(instance: Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(instance),
            type_name: std::any::type_name::<C>(),
        }
    }

    /// 以发布契约取回实例，类型不符时返回 `None`
    pub fn downcast<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<Arc<C>>().cloned()
    }

    /// 是否以 `C` 发布
    pub fn is<C>(&self) -> bool
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.inner.is::<Arc<C>>()
    }

    /// 两个句柄是否指向同一个实例
    pub fn ptr_eq(&self, other: &Bean) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 发布契约的类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 依赖槽字段类型
///
/// 创建时为空，由容器在依赖注入阶段按槽名填充。
///
/// ```ignore
/// #[derive(Component, Default)]
/// struct OrderService {
///     #[autowired]
///     user_service: Autowired<UserService>,
/// }
/// ```
pub struct Autowired<C: ?Sized>(Option<Arc<C>>);

impl<C: ?Sized> Autowired<C> {
    /// 填充依赖
    pub fn inject(&mut self, dependency: Arc<C>) {
        self.0 = Some(dependency);
    }

    pub fn get(&self) -> Option<&Arc<C>> {
        self.0.as_ref()
    }

    pub fn is_injected(&self) -> bool {
        self.0.is_some()
    }
}

impl<C: ?Sized> Default for Autowired<C> {
    fn default() -> Self {
        Self(None)
    }
}

impl<C: ?Sized> Clone for Autowired<C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// # Panics
///
/// 在依赖注入完成之前解引用会 panic
impl<C: ?Sized> Deref for Autowired<C> {
    type Target = C;

    fn deref(&self) -> &C {
        match &self.0 {
            Some(dependency) => dependency,
            None => panic!(
                "Autowired<{}> accessed before injection",
                std::any::type_name::<C>()
            ),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Autowired<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type_name", &std::any::type_name::<C>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

/// Bean 定义 - 描述如何创建和管理 Bean
///
/// 注册后不可变，由 [`BeanDefinitionRegistry`](crate::BeanDefinitionRegistry) 独占持有
#[derive(Clone)]
pub struct BeanDefinition {
    /// Bean 的名称
    name: String,

    /// Bean 的作用域
    scope: Scope,

    /// 是否延迟初始化（仅对单例有效）
    lazy: bool,

    /// 类型描述
    descriptor: Arc<TypeDescriptor>,
}

impl BeanDefinition {
    pub(crate) fn new(name: String, descriptor: TypeDescriptor) -> Self {
        Self {
            name,
            scope: descriptor.scope().unwrap_or_default(),
            lazy: descriptor.is_lazy(),
            descriptor: Arc::new(descriptor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// 依赖槽名称（声明顺序）
    pub fn dependencies(&self) -> Vec<String> {
        self.descriptor
            .dependency_names()
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("type_name", &self.descriptor.type_name())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}
