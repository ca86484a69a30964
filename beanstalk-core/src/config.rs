use std::collections::HashMap;

use parking_lot::RwLock;

use crate::constants::{
    CONTAINER_ALLOW_OVERRIDING_KEY, CONTAINER_SCAN_ROOT_KEY, CONTAINER_VALIDATE_DEPENDENCIES_KEY,
};
use crate::error::{ContainerError, ContainerResult};

/// 配置值类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
}

impl ConfigValue {
    /// 转换为布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

/// 配置源 trait
pub trait PropertySource: Send + Sync {
    /// 获取配置源名称
    fn name(&self) -> &str;

    /// 获取配置值
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// 配置源优先级（数字越大优先级越高）
    fn priority(&self) -> i32 {
        0
    }
}

/// Environment - 配置管理器
///
/// 类似 Spring Boot 的 Environment，按优先级依次查询各配置源
pub struct Environment {
    /// 配置源列表（按优先级排序）
    sources: RwLock<Vec<Box<dyn PropertySource>>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources = self.sources.read();
        f.debug_struct("Environment")
            .field(
                "sources",
                &sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Environment {
    /// 创建新的环境
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// 添加配置源
    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        tracing::debug!(
            "Adding property source '{}' (priority {})",
            source.name(),
            source.priority()
        );
        sources.push(source);
        // 按优先级降序排序（稳定排序，同优先级保持添加顺序）
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// 获取配置值
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        for source in sources.iter() {
            if let Some(value) = source.get(key) {
                tracing::trace!("Config '{}' found in source '{}'", key, source.name());
                return Some(value);
            }
        }
        tracing::trace!("Config '{}' not found in any source", key);
        None
    }

    /// 获取字符串配置
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| match v {
            ConfigValue::String(s) => s,
            ConfigValue::Bool(b) => b.to_string(),
        })
    }

    /// 获取布尔值配置，值存在但无法解析时报错
    pub fn require_bool(&self, key: &str) -> ContainerResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value.as_bool().map(Some).ok_or_else(|| {
                ContainerError::Configuration(format!(
                    "'{}' expects a boolean, got {:?}",
                    key, value
                ))
            }),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Property Sources ==========

/// 环境变量配置源
pub struct EnvironmentPropertySource {
    prefix: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    /// 创建环境变量配置源
    ///
    /// # 参数
    /// * `prefix` - 环境变量前缀，例如 "BEANSTALK_"
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 100, // 环境变量优先级较高
        }
    }

    /// 将配置键转换为环境变量名
    /// 例如: container.scan-root -> BEANSTALK_CONTAINER_SCAN_ROOT
    fn key_to_env(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.prefix,
            key.replace(['.', '-'], "_").to_uppercase()
        )
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        std::env::var(self.key_to_env(key))
            .ok()
            .map(ConfigValue::String)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置源（用于测试或运行时配置）
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

// ========== Container configuration ==========

/// 容器配置根
///
/// 携带发现步骤使用的扫描根，以及注册与启动行为开关
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRoot {
    /// 扫描根（模块路径前缀，可用 `.` 分隔），空字符串表示全部
    pub scan_root: String,

    /// 同名 Bean 是否允许后注册者覆盖（默认：true）
    pub allow_bean_definition_overriding: bool,

    /// 启动时是否静态校验依赖图（默认：false）
    pub validate_dependencies: bool,
}

impl Default for ConfigRoot {
    fn default() -> Self {
        Self {
            scan_root: String::new(),
            allow_bean_definition_overriding: true,
            validate_dependencies: false,
        }
    }
}

impl ConfigRoot {
    pub fn new(scan_root: impl Into<String>) -> Self {
        Self {
            scan_root: scan_root.into(),
            ..Self::default()
        }
    }

    pub fn with_bean_definition_overriding(mut self, allow: bool) -> Self {
        self.allow_bean_definition_overriding = allow;
        self
    }

    pub fn with_dependency_validation(mut self, validate: bool) -> Self {
        self.validate_dependencies = validate;
        self
    }

    /// 从 Environment 读取容器配置，缺失的键使用默认值
    pub fn from_environment(environment: &Environment) -> ContainerResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            scan_root: environment
                .get_string(CONTAINER_SCAN_ROOT_KEY)
                .unwrap_or(defaults.scan_root),
            allow_bean_definition_overriding: environment
                .require_bool(CONTAINER_ALLOW_OVERRIDING_KEY)?
                .unwrap_or(defaults.allow_bean_definition_overriding),
            validate_dependencies: environment
                .require_bool(CONTAINER_VALIDATE_DEPENDENCIES_KEY)?
                .unwrap_or(defaults.validate_dependencies),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_conversions() {
        assert_eq!(ConfigValue::from("yes").as_bool(), Some(true));
        assert_eq!(ConfigValue::from(" FALSE ").as_bool(), Some(false));
        assert_eq!(ConfigValue::from("maybe").as_bool(), None);
        assert_eq!(ConfigValue::Bool(true).as_bool(), Some(true));
    }

    #[test]
    fn test_environment_priority() {
        let env = Environment::new();
        env.add_property_source(Box::new(
            MapPropertySource::new("low")
                .with_property("app.name", "low")
                .with_property("app.only-low", true)
                .with_priority(1),
        ));
        env.add_property_source(Box::new(
            MapPropertySource::new("high")
                .with_property("app.name", "high")
                .with_priority(10),
        ));

        assert_eq!(env.get_string("app.name").as_deref(), Some("high"));
        assert_eq!(env.require_bool("app.only-low").unwrap(), Some(true));
        assert_eq!(env.get_string("missing"), None);
    }

    #[test]
    fn test_environment_variable_key_mapping() {
        let source = EnvironmentPropertySource::new("BEANSTALK_");
        assert_eq!(
            source.key_to_env("container.scan-root"),
            "BEANSTALK_CONTAINER_SCAN_ROOT"
        );
        assert_eq!(source.key_to_env("logging.level"), "BEANSTALK_LOGGING_LEVEL");
    }

    #[test]
    fn test_environment_variable_resolves_dashed_key() {
        std::env::set_var("BEANSTALK_CONFIG_TEST_CONTAINER_SCAN_ROOT", "app::service");

        let env = Environment::new();
        env.add_property_source(Box::new(EnvironmentPropertySource::new(
            "BEANSTALK_CONFIG_TEST_",
        )));

        assert_eq!(
            env.get_string(CONTAINER_SCAN_ROOT_KEY).as_deref(),
            Some("app::service")
        );
        assert_eq!(
            ConfigRoot::from_environment(&env).unwrap().scan_root,
            "app::service"
        );
    }

    #[test]
    fn test_config_root_from_environment() {
        let env = Environment::new();
        assert_eq!(ConfigRoot::from_environment(&env).unwrap(), ConfigRoot::default());

        env.add_property_source(Box::new(
            MapPropertySource::new("test")
                .with_property(CONTAINER_SCAN_ROOT_KEY, "app.service")
                .with_property(CONTAINER_ALLOW_OVERRIDING_KEY, "false")
                .with_property(CONTAINER_VALIDATE_DEPENDENCIES_KEY, true),
        ));

        let config = ConfigRoot::from_environment(&env).unwrap();
        assert_eq!(config.scan_root, "app.service");
        assert!(!config.allow_bean_definition_overriding);
        assert!(config.validate_dependencies);
    }

    #[test]
    fn test_config_root_rejects_bad_boolean() {
        let env = Environment::new();
        env.add_property_source(Box::new(
            MapPropertySource::new("test")
                .with_property(CONTAINER_VALIDATE_DEPENDENCIES_KEY, "maybe"),
        ));

        assert!(matches!(
            ConfigRoot::from_environment(&env),
            Err(ContainerError::Configuration(_))
        ));
    }
}
