use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use beanstalk_core::prelude::*;
use beanstalk_macros::{intercepted, Component};

// ==================== 订单服务（事务代理） ====================

/// 订单服务契约
#[intercepted]
pub trait OrderService: Send + Sync {
    fn place_order(&self, user: &str, item: &str) -> u64;

    fn order_count(&self) -> usize;
}

/// 订单服务实现 - 以 `dyn OrderService` 发布，所有调用都经过事务代理
#[derive(Component, Default)]
#[component("orderService")]
#[transactional(dyn OrderService)]
#[post_construct("warm_up")]
pub struct OrderServiceImpl {
    next_id: AtomicU64,
    placed: AtomicUsize,
}

impl OrderServiceImpl {
    fn warm_up(&mut self) {
        let first_id = 1000;
        *self.next_id.get_mut() = first_id;
        tracing::info!("OrderService warmed up, first order id {}", first_id);
    }
}

impl OrderService for OrderServiceImpl {
    fn place_order(&self, user: &str, item: &str) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.placed.fetch_add(1, Ordering::SeqCst);
        println!("   📦 order #{} placed: {} x {}", id, user, item);
        id
    }

    fn order_count(&self) -> usize {
        self.placed.load(Ordering::SeqCst)
    }
}

// ==================== 用户服务（原型） ====================

/// 用户服务 - 每次获取都是新实例，共享同一个订单服务
#[derive(Component, Default)]
#[scope("prototype")]
#[bean_name_aware]
#[initializing_bean]
pub struct UserService {
    #[autowired]
    order_service: Autowired<dyn OrderService>,

    bean_name: String,
    session: u64,
}

impl UserService {
    pub fn checkout(&self, user: &str, item: &str) -> u64 {
        self.order_service.place_order(user, item)
    }

    pub fn order_service(&self) -> Option<&Arc<dyn OrderService>> {
        self.order_service.get()
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

impl BeanNameAware for UserService {
    fn set_bean_name(&mut self, name: &str) {
        self.bean_name = name.to_string();
    }
}

impl InitializingBean for UserService {
    fn after_properties_set(&mut self) -> anyhow::Result<()> {
        static SESSIONS: AtomicU64 = AtomicU64::new(1);

        if !self.order_service.is_injected() {
            return Err(anyhow!("{} was created without an order service", self.bean_name));
        }
        self.session = SESSIONS.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("{} session {} ready", self.bean_name, self.session);
        Ok(())
    }
}

// ==================== 审计（延迟单例） ====================

/// 审计服务 - 首次请求时才创建，持有容器的弱引用
#[derive(Component, Default)]
#[lazy]
#[application_context_aware]
pub struct AuditLog {
    context: Weak<ApplicationContext>,
}

impl AuditLog {
    pub fn report(&self) -> Vec<String> {
        match self.context.upgrade() {
            Some(context) => context
                .bean_names()
                .into_iter()
                .map(|name| {
                    let scope = if context.is_prototype(&name).unwrap_or(false) {
                        "prototype"
                    } else {
                        "singleton"
                    };
                    format!("{} ({})", name, scope)
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

impl ApplicationContextAware for AuditLog {
    fn set_application_context(&mut self, context: &Arc<ApplicationContext>) {
        self.context = Arc::downgrade(context);
    }
}
