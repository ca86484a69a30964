mod service;

use std::sync::Arc;

use beanstalk_core::prelude::*;

use service::{AuditLog, OrderService, UserService};

fn main() -> anyhow::Result<()> {
    let context = BeanstalkApplication::new("app-demo")
        .scan_root("app_demo::service")
        .logging(LoggingConfig::default().level(LogLevel::Info))
        .run()?;

    // ==================== 原型：每次获取都是新实例 ====================

    println!("\n🧪 Prototype beans");
    let alice = context.get_bean_as::<UserService>("userService")?;
    let bob = context.get_bean_as::<UserService>("userService")?;
    println!(
        "   two lookups, same instance? {} (sessions {} / {})",
        Arc::ptr_eq(&alice, &bob),
        alice.session(),
        bob.session()
    );

    // ==================== 单例：共享同一个订单服务 ====================

    println!("\n🧪 Shared singleton dependency");
    let order_service = context.get_bean_as::<dyn OrderService>("orderService")?;
    let shared = match (alice.order_service(), bob.order_service()) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b) && Arc::ptr_eq(a, &order_service),
        _ => false,
    };
    println!("   both users wired to the container's orderService? {}", shared);

    // ==================== 事务代理 ====================

    println!("\n🧪 Transactional calls (see beanstalk::tx log lines)");
    alice.checkout("alice", "keyboard");
    bob.checkout("bob", "monitor");
    println!("   orders placed: {}", order_service.order_count());

    // ==================== 延迟单例 ====================

    println!("\n🧪 Lazy singleton");
    println!(
        "   auditLog created before first request? {}",
        context.contains_singleton("auditLog")
    );
    let audit = context.get_bean_as::<AuditLog>("auditLog")?;
    for line in audit.report() {
        println!("   - {}", line);
    }

    // ==================== 未注册的名称 ====================

    match context.get_bean("paymentService") {
        Err(e) if e.is_not_found() => println!("\n✅ {}", e),
        Err(e) => return Err(e.into()),
        Ok(_) => println!("\n❌ paymentService should not exist"),
    }

    Ok(())
}
