//! 组件发现
//!
//! 容器只消费一组有序的 [`TypeDescriptor`]，不关心它们是如何找到的。
//! 默认的 [`InventoryScanner`] 读取 `#[derive(Component)]` 在编译期提交的注册项，
//! 并按扫描根（模块路径前缀）过滤。

use crate::descriptor::TypeDescriptor;

/// Component trait - 可以被容器发现的组件
///
/// 通过 #[derive(Component)] 宏自动实现
///
/// # 示例
///
/// ```ignore
/// use beanstalk_core::prelude::*;
/// use beanstalk_macros::Component;
///
/// #[derive(Component, Default)]
/// #[scope("prototype")]
/// struct UserService {
///     #[autowired]
///     order_service: Autowired<OrderService>,
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// 组件的类型描述
    fn descriptor() -> TypeDescriptor;
}

/// 静态注册项 - 用于 inventory 收集
pub struct ComponentRegistration {
    /// 简单类型名
    pub type_name: &'static str,

    /// 声明所在模块（`module_path!()`）
    pub module_path: &'static str,

    /// 描述构造函数
    pub descriptor: fn() -> TypeDescriptor,
}

inventory::collect!(ComponentRegistration);

/// 发现协作者
pub trait ComponentScanner {
    /// 返回扫描根下的所有组件描述，顺序即注册顺序
    fn scan(&self, scan_root: &str) -> Vec<TypeDescriptor>;
}

/// 判断模块路径是否位于扫描根之下
///
/// 空扫描根匹配所有模块；`app.service` 与 `app::service` 等价
pub fn matches_scan_root(module_path: &str, scan_root: &str) -> bool {
    let root = normalize_scan_root(scan_root);
    if root.is_empty() {
        return true;
    }

    module_path == root
        || module_path
            .strip_prefix(root.as_str())
            .map(|rest| rest.starts_with("::"))
            .unwrap_or(false)
}

/// 将点分隔的扫描根转换为 Rust 模块路径
pub fn normalize_scan_root(scan_root: &str) -> String {
    scan_root
        .trim()
        .replace('.', "::")
        .trim_matches(':')
        .to_string()
}

/// 读取编译期静态注册的组件
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryScanner;

impl InventoryScanner {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentScanner for InventoryScanner {
    fn scan(&self, scan_root: &str) -> Vec<TypeDescriptor> {
        let mut registrations: Vec<&ComponentRegistration> =
            inventory::iter::<ComponentRegistration>
                .into_iter()
                .filter(|r| matches_scan_root(r.module_path, scan_root))
                .collect();

        // inventory 的顺序取决于链接顺序，这里排序以保证结果稳定
        registrations.sort_by(|a, b| {
            (a.module_path, a.type_name).cmp(&(b.module_path, b.type_name))
        });

        tracing::debug!(
            "Component scan under '{}' found {} component(s)",
            scan_root,
            registrations.len()
        );

        registrations
            .into_iter()
            .map(|registration| {
                tracing::trace!(
                    "  ├─ {}::{}",
                    registration.module_path,
                    registration.type_name
                );
                (registration.descriptor)()
            })
            .collect()
    }
}

/// 预先枚举的组件列表
///
/// 描述按模块路径过滤，保持给定顺序
#[derive(Debug, Default, Clone)]
pub struct StaticComponentScanner {
    descriptors: Vec<fn() -> TypeDescriptor>,
}

impl StaticComponentScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: fn() -> TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn with_component<T: Component>(self) -> Self {
        self.with(T::descriptor)
    }
}

impl ComponentScanner for StaticComponentScanner {
    fn scan(&self, scan_root: &str) -> Vec<TypeDescriptor> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor())
            .filter(|descriptor| matches_scan_root(descriptor.module_path(), scan_root))
            .collect()
    }
}
