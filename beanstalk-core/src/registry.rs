//! Bean 定义注册表
//!
//! 启动时由发现到的类型描述一次性构建，容器构建完成后只读

use std::collections::HashMap;

use crate::bean::BeanDefinition;
use crate::descriptor::TypeDescriptor;
use crate::error::{ContainerError, ContainerResult};
use crate::utils::naming::decapitalize;

/// 名称到 Bean 定义的映射，保留注册顺序
#[derive(Debug)]
pub struct BeanDefinitionRegistry {
    /// Bean 定义存储
    definitions: HashMap<String, BeanDefinition>,

    /// 注册顺序
    order: Vec<String>,

    /// 是否允许同名覆盖
    allow_overriding: bool,
}

impl BeanDefinitionRegistry {
    pub fn new(allow_overriding: bool) -> Self {
        Self {
            definitions: HashMap::new(),
            order: Vec::new(),
            allow_overriding,
        }
    }

    /// 计算 Bean 名称：显式名称优先，否则为首字母小写的类型名
    pub fn bean_name_for(descriptor: &TypeDescriptor) -> String {
        match descriptor.explicit_name() {
            Some(name) => name.to_string(),
            None => decapitalize(descriptor.type_name()),
        }
    }

    /// 注册一个类型描述，返回计算出的 Bean 名称
    ///
    /// 同名时后注册者覆盖先注册者，但保留原先的位置；
    /// 禁止覆盖时返回 [`ContainerError::BeanAlreadyExists`]
    pub fn register(&mut self, descriptor: TypeDescriptor) -> ContainerResult<String> {
        let name = Self::bean_name_for(&descriptor);
        let definition = BeanDefinition::new(name.clone(), descriptor);

        tracing::trace!(
            "Registering bean definition: name='{}', type='{}', scope={}, lazy={}",
            name,
            definition.descriptor().full_type_name(),
            definition.scope(),
            definition.is_lazy()
        );

        if let Some(existing) = self.definitions.get(&name) {
            if !self.allow_overriding {
                tracing::warn!("Bean '{}' already exists, registration failed", name);
                return Err(ContainerError::BeanAlreadyExists(name));
            }
            tracing::warn!(
                "Overriding bean definition '{}': '{}' replaced by '{}'",
                name,
                existing.descriptor().full_type_name(),
                definition.descriptor().full_type_name()
            );
        } else {
            self.order.push(name.clone());
        }

        self.definitions.insert(name.clone(), definition);
        Ok(name)
    }

    /// 查找 Bean 定义
    pub fn resolve(&self, name: &str) -> ContainerResult<&BeanDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| ContainerError::BeanNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按注册顺序返回所有 Bean 名称
    pub fn bean_names(&self) -> &[String] {
        &self.order
    }

    /// 按注册顺序遍历所有 Bean 定义
    pub fn definitions(&self) -> impl Iterator<Item = &BeanDefinition> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.definitions.get(name))
    }

    /// 依赖图：每个 Bean 及其依赖槽名称
    pub fn dependency_graph(&self) -> Vec<(String, Vec<String>)> {
        self.definitions()
            .map(|definition| (definition.name().to_string(), definition.dependencies()))
            .collect()
    }
}
