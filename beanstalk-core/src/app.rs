use std::sync::Arc;
use std::time::Instant;

use beanstalk_aop::TransactionManager;

use crate::component::InventoryScanner;
use crate::config::{ConfigRoot, Environment, EnvironmentPropertySource, PropertySource};
use crate::constants::{CONTAINER_SCAN_ROOT_KEY, DEFAULT_ENV_PREFIX};
use crate::context::ApplicationContext;
use crate::error::{ContainerError, ContainerResult};
use crate::logging::LoggingConfig;

/// Beanstalk 应用程序
///
/// 组装 Environment、日志与容器的便捷启动方式
pub struct BeanstalkApplication {
    /// 应用名称
    name: String,

    /// 扫描根（代码设置，优先于配置）
    scan_root: Option<String>,

    /// 环境变量前缀
    env_prefix: String,

    /// 额外的配置源
    property_sources: Vec<Box<dyn PropertySource>>,

    /// 是否显示 banner
    show_banner: bool,

    /// 日志配置
    logging_config: Option<LoggingConfig>,

    /// 事务管理器
    transaction_manager: Option<Arc<dyn TransactionManager>>,
}

impl BeanstalkApplication {
    /// 创建新的应用
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scan_root: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            property_sources: Vec::new(),
            show_banner: true,
            logging_config: None,
            transaction_manager: None,
        }
    }

    /// 设置扫描根
    pub fn scan_root(mut self, scan_root: impl Into<String>) -> Self {
        self.scan_root = Some(scan_root.into());
        self
    }

    /// 设置环境变量前缀
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 添加配置源
    pub fn property_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.property_sources.push(Box::new(source));
        self
    }

    /// 设置是否显示 banner
    pub fn banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// 设置日志配置
    ///
    /// 如果不设置，将从 Environment 读取
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 设置事务管理器
    pub fn transaction_manager(mut self, manager: Arc<dyn TransactionManager>) -> Self {
        self.transaction_manager = Some(manager);
        self
    }

    /// 运行应用
    pub fn run(self) -> ContainerResult<Arc<ApplicationContext>> {
        // 记录启动开始时间
        let start_time = Instant::now();

        // 组装 Environment：环境变量优先级最高
        let environment = Environment::new();
        environment.add_property_source(Box::new(EnvironmentPropertySource::new(&self.env_prefix)));
        for source in self.property_sources {
            environment.add_property_source(source);
        }

        // 初始化日志系统；测试或宿主程序可能已经安装了订阅者
        let logging_config = self
            .logging_config
            .unwrap_or_else(|| LoggingConfig::from_environment(&environment));
        if let Err(e) = logging_config.init() {
            tracing::warn!("{}, keeping the existing subscriber", e);
        }

        if self.show_banner {
            print_banner();
        }

        tracing::info!("Starting {} application", self.name);
        tracing::debug!("Environment variable prefix: {}", self.env_prefix);

        let mut config = ConfigRoot::from_environment(&environment)?;
        if let Some(scan_root) = self.scan_root {
            config.scan_root = scan_root;
        }
        if config.scan_root.contains(char::is_whitespace) {
            return Err(ContainerError::Configuration(format!(
                "'{}' must not contain whitespace: '{}'",
                CONTAINER_SCAN_ROOT_KEY, config.scan_root
            )));
        }

        let mut builder = ApplicationContext::builder(config).scan_with(&InventoryScanner);
        if let Some(manager) = self.transaction_manager {
            builder = builder.transaction_manager(manager);
        }
        let context = builder.build()?;

        tracing::info!(
            "Started {} in {}ms",
            self.name,
            start_time.elapsed().as_millis()
        );

        Ok(context)
    }
}

impl Default for BeanstalkApplication {
    fn default() -> Self {
        Self::new("BeanstalkApplication")
    }
}

/// 打印 banner
fn print_banner() {
    println!();
    println!(r"  _                               _        _ _    ");
    println!(r" | |__   ___  __ _ _ __  ___  ___| |_ __ _| | | __");
    println!(r" | '_ \ / _ \/ _` | '_ \/ __|/ __| __/ _` | | |/ /");
    println!(r" | |_) |  __/ (_| | | | \__ \\__ \ || (_| | |   < ");
    println!(r" |_.__/ \___|\__,_|_| |_|___/|___/\__\__,_|_|_|\_\");
    println!();
    println!("  :: Beanstalk ::        (v{})", env!("CARGO_PKG_VERSION"));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean_factory::ListableBeanFactory;
    use crate::config::MapPropertySource;

    #[test]
    fn test_run_with_scan_root_from_property_source() {
        let context = BeanstalkApplication::new("test")
            .banner(false)
            .env_prefix("BEANSTALK_APP_TEST_")
            .property_source(
                MapPropertySource::new("test")
                    .with_property(CONTAINER_SCAN_ROOT_KEY, "no_such_module"),
            )
            .run()
            .unwrap();

        assert_eq!(context.config().scan_root, "no_such_module");
        assert_eq!(context.bean_definition_count(), 0);
    }

    #[test]
    fn test_code_scan_root_overrides_configuration() {
        let context = BeanstalkApplication::new("test")
            .banner(false)
            .env_prefix("BEANSTALK_APP_TEST_")
            .scan_root("also_missing")
            .property_source(
                MapPropertySource::new("test")
                    .with_property(CONTAINER_SCAN_ROOT_KEY, "no_such_module"),
            )
            .run()
            .unwrap();

        assert_eq!(context.config().scan_root, "also_missing");
    }

    #[test]
    fn test_rejects_whitespace_in_scan_root() {
        let result = BeanstalkApplication::new("test")
            .banner(false)
            .env_prefix("BEANSTALK_APP_TEST_")
            .scan_root("app service")
            .run();

        assert!(matches!(result, Err(ContainerError::Configuration(_))));
    }
}
