mod attribute_helpers;
mod component_impl;
mod intercepted_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Component派生宏
///
/// 生成 `beanstalk_core::Component` 实现，并通过 inventory 静态注册，
/// 使 `InventoryScanner` 能在扫描根下发现该组件。类型需要实现 `Default`。
///
/// 用法：
/// ```ignore
/// #[derive(Component, Default)]
/// #[component("userService")]       // 可选：指定bean名称（简写形式）
/// // 或
/// #[component(name = "userService")] // 可选：指定bean名称（完整形式）
/// #[scope("prototype")]             // 可选：作用域 (singleton/prototype)，空字符串等同 singleton
/// #[lazy]                           // 可选：延迟初始化
/// #[bean_name_aware]                // 可选：实现了 BeanNameAware
/// #[application_context_aware]      // 可选：实现了 ApplicationContextAware
/// #[post_construct]                 // 可选：初始化回调（默认调用 post_construct 方法）
/// #[post_construct("warm_up")]      // 可选：自定义方法名，可重复
/// #[initializing_bean]              // 可选：实现了 InitializingBean
/// #[contract(dyn UserService)]      // 可选：以 trait 对象发布
/// struct UserServiceImpl {
///     #[autowired]                  // 槽名 orderService
///     order_service: Autowired<dyn OrderService>,
///
///     #[autowired("legacyRepository")]
///     repository: Autowired<Repository>,
/// }
/// ```
///
/// `#[transactional(dyn OrderService)]` 与 `#[contract]` 相同，但发布的是
/// 事务代理；契约 trait 需要标注 `#[intercepted]`。
#[proc_macro_derive(
    Component,
    attributes(
        component,
        scope,
        lazy,
        autowired,
        contract,
        transactional,
        bean_name_aware,
        application_context_aware,
        initializing_bean,
        post_construct
    )
)]
#[proc_macro_error]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component_impl::derive_component_impl(input)
}

/// 为契约 trait 生成事务代理转发实现
///
/// ```ignore
/// #[intercepted]
/// pub trait OrderService: Send + Sync {
///     fn place_order(&self, item: &str) -> u64;
/// }
/// ```
///
/// 展开后 `TransactionalProxy<T>` 对任意 `T: OrderService` 实现 `OrderService`，
/// 每个方法都在 begin/commit 之间调用目标实例。只支持 `&self` 方法。
#[proc_macro_attribute]
#[proc_macro_error]
pub fn intercepted(attr: TokenStream, item: TokenStream) -> TokenStream {
    intercepted_impl::intercepted_impl(attr, item)
}
