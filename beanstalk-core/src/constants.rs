/// 配置键常量定义
///
/// 容器与日志读取的配置键集中在这里，环境变量名由前缀加上键名转换得到，
/// 例如 `container.scan-root` 对应 `BEANSTALK_CONTAINER_SCAN_ROOT`

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "BEANSTALK_";

/// 扫描根
pub const CONTAINER_SCAN_ROOT_KEY: &str = "container.scan-root";

/// 是否允许同名 Bean 覆盖
pub const CONTAINER_ALLOW_OVERRIDING_KEY: &str = "container.allow-bean-definition-overriding";

/// 启动时是否校验依赖图
pub const CONTAINER_VALIDATE_DEPENDENCIES_KEY: &str = "container.validate-dependencies";

/// 日志级别
pub const LOGGING_LEVEL_KEY: &str = "logging.level";

/// 日志格式
pub const LOGGING_FORMAT_KEY: &str = "logging.format";

/// 自定义日志过滤器
pub const LOGGING_FILTER_KEY: &str = "logging.filter";
