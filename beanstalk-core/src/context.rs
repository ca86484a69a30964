//! 应用上下文
//!
//! 持有定义注册表、单例缓存与 Bean 工厂，按作用域分派 `get_bean` 请求

use std::sync::{Arc, Weak};
use std::time::Instant;

use beanstalk_aop::{LoggingTransactionManager, TransactionManager};

use crate::bean::{Bean, BeanDefinition};
use crate::bean_factory::{AutowireCapableBeanFactory, BeanFactory, ListableBeanFactory};
use crate::component::{Component, ComponentScanner, InventoryScanner};
use crate::config::ConfigRoot;
use crate::descriptor::TypeDescriptor;
use crate::error::{ContainerError, ContainerResult};
use crate::registry::BeanDefinitionRegistry;
use crate::singleton::SingletonRegistry;
use crate::utils::dependency::validate_dependency_graph;
use crate::Scope;

/// 应用上下文 - IoC 容器
///
/// 定义注册表在构建完成后不再变化；单例缓存只通过创建流程写入，随上下文一起释放
pub struct ApplicationContext {
    /// 指向自身的弱引用，供 ApplicationContextAware 使用
    self_ref: Weak<ApplicationContext>,

    /// 容器配置
    config: ConfigRoot,

    /// Bean 定义注册表
    registry: BeanDefinitionRegistry,

    /// 单例缓存
    singletons: SingletonRegistry,

    /// Bean 创建流程
    bean_factory: AutowireCapableBeanFactory,
}

impl ApplicationContext {
    /// 扫描 `config.scan_root` 下静态注册的组件并创建容器
    pub fn new(config: ConfigRoot) -> ContainerResult<Arc<Self>> {
        Self::builder(config).scan_with(&InventoryScanner).build()
    }

    /// 创建构建器
    pub fn builder(config: ConfigRoot) -> ApplicationContextBuilder {
        ApplicationContextBuilder::new(config)
    }

    /// 获取指向自身的强引用
    ///
    /// 容器正在被释放时返回 `None`
    pub fn self_arc(&self) -> Option<Arc<ApplicationContext>> {
        self.self_ref.upgrade()
    }

    pub fn config(&self) -> &ConfigRoot {
        &self.config
    }

    pub fn registry(&self) -> &BeanDefinitionRegistry {
        &self.registry
    }

    pub fn transaction_manager(&self) -> &Arc<dyn TransactionManager> {
        self.bean_factory.transaction_manager()
    }

    /// 预实例化所有非延迟单例
    ///
    /// 按注册顺序进行；被依赖的单例会在装配时提前创建
    pub fn preinstantiate_singletons(&self) -> ContainerResult<()> {
        let eager: Vec<&BeanDefinition> = self
            .registry
            .definitions()
            .filter(|def| def.scope() == Scope::Singleton && !def.is_lazy())
            .collect();

        tracing::debug!("Pre-instantiating {} singleton bean(s)", eager.len());

        for definition in eager {
            self.get_singleton(definition)?;
        }

        Ok(())
    }

    /// 验证依赖关系
    ///
    /// 检测：
    /// - 缺失的依赖（依赖槽指向未注册的名称）
    /// - 循环依赖（A -> B -> C -> A）
    pub fn validate_dependencies(&self) -> ContainerResult<()> {
        let graph = self.registry.dependency_graph();

        validate_dependency_graph(&graph).map_err(|e| {
            tracing::error!("Dependency validation failed: {}", e);
            ContainerError::from(e)
        })?;

        tracing::info!("Dependency validation passed for {} bean(s)", graph.len());
        Ok(())
    }

    /// 已缓存的单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// 指定单例是否已创建
    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.contains(name)
    }

    fn get_singleton(&self, definition: &BeanDefinition) -> ContainerResult<Bean> {
        self.singletons.get_or_create(definition.name(), || {
            tracing::debug!(
                "Creating shared instance of singleton bean '{}'",
                definition.name()
            );
            self.bean_factory.create_bean(self, definition)
        })
    }
}

impl BeanFactory for ApplicationContext {
    fn get_bean(&self, name: &str) -> ContainerResult<Bean> {
        tracing::trace!("Requesting bean: '{}'", name);

        let definition = self.registry.resolve(name).map_err(|e| {
            tracing::debug!("Bean '{}' not found in container", name);
            e
        })?;

        match definition.scope() {
            Scope::Singleton => self.get_singleton(definition),
            Scope::Prototype => {
                tracing::debug!("Creating new instance of prototype bean '{}'", name);
                self.bean_factory.create_bean(self, definition)
            }
        }
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    fn is_singleton(&self, name: &str) -> ContainerResult<bool> {
        Ok(self.registry.resolve(name)?.scope().is_singleton())
    }

    fn is_prototype(&self, name: &str) -> ContainerResult<bool> {
        Ok(self.registry.resolve(name)?.scope().is_prototype())
    }
}

impl ListableBeanFactory for ApplicationContext {
    fn bean_names(&self) -> Vec<String> {
        self.registry.bean_names().to_vec()
    }

    fn bean_definition_count(&self) -> usize {
        self.registry.len()
    }

    fn bean_definition(&self, name: &str) -> ContainerResult<&BeanDefinition> {
        self.registry.resolve(name)
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("config", &self.config)
            .field("bean_names", &self.registry.bean_names())
            .field("singletons", &self.singletons.len())
            .finish()
    }
}

/// 应用上下文构建器
///
/// 收集类型描述，`build()` 时依次：注册定义、（可选）校验依赖图、预实例化单例
pub struct ApplicationContextBuilder {
    config: ConfigRoot,
    descriptors: Vec<TypeDescriptor>,
    transaction_manager: Option<Arc<dyn TransactionManager>>,
}

impl ApplicationContextBuilder {
    pub fn new(config: ConfigRoot) -> Self {
        Self {
            config,
            descriptors: Vec::new(),
            transaction_manager: None,
        }
    }

    /// 注册一个类型描述
    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// 注册一个组件类型
    pub fn component<T: Component>(self) -> Self {
        self.register(T::descriptor())
    }

    /// 追加扫描器在扫描根下发现的组件
    pub fn scan_with(mut self, scanner: &dyn ComponentScanner) -> Self {
        let found = scanner.scan(&self.config.scan_root);
        self.descriptors.extend(found);
        self
    }

    /// 设置事务管理器（默认：LoggingTransactionManager）
    pub fn transaction_manager(mut self, manager: Arc<dyn TransactionManager>) -> Self {
        self.transaction_manager = Some(manager);
        self
    }

    /// 构建上下文
    pub fn build(self) -> ContainerResult<Arc<ApplicationContext>> {
        let started = Instant::now();

        let mut registry =
            BeanDefinitionRegistry::new(self.config.allow_bean_definition_overriding);
        for descriptor in self.descriptors {
            registry.register(descriptor)?;
        }

        tracing::info!(
            "Registered {} bean definition(s) from scan root '{}'",
            registry.len(),
            self.config.scan_root
        );

        let transaction_manager = self
            .transaction_manager
            .unwrap_or_else(|| Arc::new(LoggingTransactionManager::new()));
        let config = self.config;

        let context = Arc::new_cyclic(|self_ref| ApplicationContext {
            self_ref: self_ref.clone(),
            config,
            registry,
            singletons: SingletonRegistry::new(),
            bean_factory: AutowireCapableBeanFactory::new(transaction_manager),
        });

        if context.config.validate_dependencies {
            context.validate_dependencies()?;
        }

        context.preinstantiate_singletons()?;

        tracing::info!(
            "ApplicationContext ready: {} bean definition(s), {} singleton(s) created in {:?}",
            context.bean_definition_count(),
            context.singleton_count(),
            started.elapsed()
        );

        Ok(context)
    }
}
