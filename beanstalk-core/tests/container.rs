//! 通过手写 TypeDescriptor 驱动容器的集成测试

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use beanstalk_core::aop::{JoinPoint, TransactionManager, TransactionalProxy};
use beanstalk_core::prelude::*;
use beanstalk_core::StaticComponentScanner;
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

// ==================== 测试组件 ====================

#[derive(Default)]
struct Repository;

fn repository() -> TypeDescriptor {
    TypeDescriptor::builder::<Repository>()
        .default_constructible()
        .build()
}

#[derive(Default)]
struct UserService {
    repository: Autowired<Repository>,
}

fn user_service(scope: Scope) -> TypeDescriptor {
    TypeDescriptor::builder::<UserService>()
        .scope(scope)
        .default_constructible()
        .dependency("repository", |s: &mut UserService, r: Arc<Repository>| {
            s.repository.inject(r)
        })
        .build()
}

fn context_with(descriptors: Vec<TypeDescriptor>) -> ContainerResult<Arc<ApplicationContext>> {
    descriptors
        .into_iter()
        .fold(ApplicationContext::builder(ConfigRoot::default()), |builder, d| builder.register(d))
        .build()
}

// ==================== 作用域与标识 ====================

#[test]
fn test_singleton_identity_is_stable() {
    let context = context_with(vec![repository()]).unwrap();

    let first = context.get_bean("repository").unwrap();
    let second = context.get_bean("repository").unwrap();

    assert!(first.ptr_eq(&second));
    assert!(Arc::ptr_eq(
        &first.downcast::<Repository>().unwrap(),
        &second.downcast::<Repository>().unwrap()
    ));
}

#[test]
fn test_prototype_instances_are_distinct_but_share_singleton_dependency() {
    let context = context_with(vec![user_service(Scope::Prototype), repository()]).unwrap();

    let first = context.get_bean_as::<UserService>("userService").unwrap();
    let second = context.get_bean_as::<UserService>("userService").unwrap();
    let repository = context.get_bean_as::<Repository>("repository").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.repository.get().unwrap(), &repository));
    assert!(Arc::ptr_eq(second.repository.get().unwrap(), &repository));

    // 原型从不进入单例缓存
    assert!(!context.contains_singleton("userService"));
    assert_eq!(context.singleton_count(), 1);
}

#[test]
fn test_scope_defaults_to_singleton() {
    let context = context_with(vec![repository()]).unwrap();

    assert!(context.is_singleton("repository").unwrap());
    assert!(!context.is_prototype("repository").unwrap());
    assert!(context.contains_singleton("repository"));
}

#[test]
fn test_unknown_name_is_not_found_without_side_effects() {
    let context = context_with(vec![repository()]).unwrap();
    let before = context.singleton_count();

    let err = context.get_bean("paymentService").unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, ContainerError::BeanNotFound(ref name) if name == "paymentService"));
    assert_eq!(context.singleton_count(), before);
    assert!(!context.contains_bean("paymentService"));
}

#[test]
fn test_get_bean_as_wrong_type_is_type_mismatch() {
    let context = context_with(vec![repository()]).unwrap();

    let result = context.get_bean_as::<UserService>("repository");

    assert!(matches!(
        result,
        Err(ContainerError::TypeMismatch { bean, .. }) if bean == "repository"
    ));
}

// ==================== 装配 ====================

#[test]
fn test_dependency_on_unregistered_name_fails_resolution() {
    let context = context_with(vec![user_service(Scope::Prototype)]).unwrap();

    let result = context.get_bean("userService");

    assert!(matches!(
        result,
        Err(ContainerError::DependencyResolution { bean, slot })
            if bean == "userService" && slot == "repository"
    ));
}

#[test]
fn test_eager_singleton_with_missing_dependency_fails_build() {
    let result = context_with(vec![user_service(Scope::Singleton)]);

    assert!(matches!(result, Err(ContainerError::DependencyResolution { .. })));
}

#[test]
fn test_circular_singletons_are_reported_with_chain() {
    #[derive(Default)]
    struct Alpha {
        beta: Autowired<Beta>,
    }

    #[derive(Default)]
    struct Beta {
        alpha: Autowired<Alpha>,
    }

    let alpha = TypeDescriptor::builder::<Alpha>()
        .default_constructible()
        .dependency("beta", |a: &mut Alpha, b: Arc<Beta>| a.beta.inject(b))
        .build();
    let beta = TypeDescriptor::builder::<Beta>()
        .default_constructible()
        .dependency("alpha", |b: &mut Beta, a: Arc<Alpha>| b.alpha.inject(a))
        .build();

    let result = context_with(vec![alpha, beta]);

    assert!(matches!(
        result,
        Err(ContainerError::CircularDependency(chain)) if chain == "alpha -> beta -> alpha"
    ));
}

#[test]
fn test_static_validation_finds_prototype_self_cycle() {
    #[derive(Default)]
    struct Node {
        next: Autowired<Node>,
    }

    let node = TypeDescriptor::builder::<Node>()
        .scope(Scope::Prototype)
        .default_constructible()
        .dependency("node", |n: &mut Node, next: Arc<Node>| n.next.inject(next))
        .build();

    let result = ApplicationContext::builder(ConfigRoot::default().with_dependency_validation(true))
        .register(node)
        .build();

    assert!(matches!(
        result,
        Err(ContainerError::CircularDependency(chain)) if chain == "node -> node"
    ));
}

// ==================== 生命周期 ====================

#[derive(Default)]
struct Tracked {
    log: Log,
    repository: Autowired<Repository>,
    name: String,
}

impl BeanNameAware for Tracked {
    fn set_bean_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.log.lock().push(format!("set_bean_name({})", name));
    }
}

impl ApplicationContextAware for Tracked {
    fn set_application_context(&mut self, _context: &Arc<ApplicationContext>) {
        self.log.lock().push("set_application_context".to_string());
    }
}

impl InitializingBean for Tracked {
    fn after_properties_set(&mut self) -> anyhow::Result<()> {
        self.log.lock().push("after_properties_set".to_string());
        Ok(())
    }
}

#[test]
fn test_lifecycle_stages_run_in_order() {
    let log = new_log();
    let ctor_log = Arc::clone(&log);

    let tracked = TypeDescriptor::builder::<Tracked>()
        .scope(Scope::Prototype)
        .instantiate_with(move || {
            ctor_log.lock().push("instantiate".to_string());
            Ok(Tracked {
                log: Arc::clone(&ctor_log),
                ..Tracked::default()
            })
        })
        .dependency("repository", |t: &mut Tracked, r: Arc<Repository>| {
            t.log.lock().push("inject(repository)".to_string());
            t.repository.inject(r)
        })
        .bean_name_aware()
        .application_context_aware()
        .post_construct("first", |t: &mut Tracked| t.log.lock().push("first".to_string()))
        .post_construct("second", |t: &mut Tracked| -> anyhow::Result<()> {
            t.log.lock().push("second".to_string());
            Ok(())
        })
        .initializing_bean()
        .build();

    let context = context_with(vec![tracked, repository()]).unwrap();
    let bean = context.get_bean_as::<Tracked>("tracked").unwrap();

    assert_eq!(bean.name, "tracked");
    assert_eq!(
        *log.lock(),
        vec![
            "instantiate",
            "inject(repository)",
            "set_bean_name(tracked)",
            "set_application_context",
            "first",
            "second",
            "after_properties_set",
        ]
    );
}

#[test]
fn test_context_aware_bean_receives_owning_context() {
    #[derive(Default)]
    struct Holder {
        context: std::sync::Weak<ApplicationContext>,
    }

    impl ApplicationContextAware for Holder {
        fn set_application_context(&mut self, context: &Arc<ApplicationContext>) {
            self.context = Arc::downgrade(context);
        }
    }

    let holder = TypeDescriptor::builder::<Holder>()
        .default_constructible()
        .application_context_aware()
        .build();

    let context = context_with(vec![holder]).unwrap();
    let bean = context.get_bean_as::<Holder>("holder").unwrap();

    assert!(Arc::ptr_eq(&bean.context.upgrade().unwrap(), &context));
}

#[test]
fn test_failed_hook_aborts_creation() {
    #[derive(Default)]
    struct Broken;

    let broken = TypeDescriptor::builder::<Broken>()
        .scope(Scope::Prototype)
        .default_constructible()
        .post_construct("verify", |_: &mut Broken| -> anyhow::Result<()> {
            Err(anyhow!("connection refused"))
        })
        .build();

    let context = context_with(vec![broken]).unwrap();
    let err = context.get_bean("broken").unwrap_err();

    match err {
        ContainerError::InitializationFailed { bean, hook, source } => {
            assert_eq!(bean, "broken");
            assert_eq!(hook, "verify");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[derive(Default)]
struct Leaf;

impl InitializingBean for Leaf {
    fn after_properties_set(&mut self) -> anyhow::Result<()> {
        Err(anyhow!("leaf is misconfigured"))
    }
}

#[derive(Default)]
struct Root {
    leaf: Autowired<Leaf>,
}

fn leaf() -> TypeDescriptor {
    TypeDescriptor::builder::<Leaf>()
        .lazy(true)
        .default_constructible()
        .initializing_bean()
        .build()
}

#[test]
fn test_initializing_bean_failure_is_initialization_error() {
    let context = context_with(vec![leaf()]).unwrap();

    match context.get_bean("leaf").unwrap_err() {
        ContainerError::InitializationFailed { bean, hook, source } => {
            assert_eq!(bean, "leaf");
            assert_eq!(hook, "after_properties_set");
            assert_eq!(source.to_string(), "leaf is misconfigured");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!context.contains_singleton("leaf"));
}

#[test]
fn test_dependency_creation_error_reaches_dependent_unchanged() {
    let root = TypeDescriptor::builder::<Root>()
        .lazy(true)
        .default_constructible()
        .dependency("leaf", |r: &mut Root, l: Arc<Leaf>| r.leaf.inject(l))
        .build();

    let context = context_with(vec![root, leaf()]).unwrap();

    match context.get_bean("root").unwrap_err() {
        ContainerError::InitializationFailed { bean, hook, .. } => {
            assert_eq!(bean, "leaf");
            assert_eq!(hook, "after_properties_set");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!context.contains_singleton("root"));
    assert!(!context.contains_singleton("leaf"));
    assert_eq!(context.singleton_count(), 0);
}

#[test]
fn test_failed_singleton_is_not_cached() {
    #[derive(Default)]
    struct Flaky;

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let flaky = TypeDescriptor::builder::<Flaky>()
        .lazy(true)
        .instantiate_with(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow!("not ready yet"))
            } else {
                Ok(Flaky)
            }
        })
        .build();

    let context = context_with(vec![flaky]).unwrap();

    let first = context.get_bean("flaky");
    assert!(matches!(
        first,
        Err(ContainerError::InstantiationFailed { ref bean, .. }) if bean == "flaky"
    ));
    assert!(!context.contains_singleton("flaky"));

    let second = context.get_bean("flaky").unwrap();
    let third = context.get_bean("flaky").unwrap();
    assert!(second.ptr_eq(&third));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_descriptor_without_constructor_fails_instantiation() {
    struct NoCtor;

    let descriptor = TypeDescriptor::builder::<NoCtor>().lazy(true).build();
    let context = context_with(vec![descriptor]).unwrap();

    assert!(matches!(
        context.get_bean("noCtor"),
        Err(ContainerError::InstantiationFailed { .. })
    ));
}

// ==================== 延迟与并发 ====================

#[test]
fn test_lazy_singleton_created_on_first_request() {
    #[derive(Default)]
    struct Report;

    let report = TypeDescriptor::builder::<Report>()
        .lazy(true)
        .default_constructible()
        .build();

    let context = context_with(vec![report, repository()]).unwrap();

    assert!(context.contains_singleton("repository"));
    assert!(!context.contains_singleton("report"));

    context.get_bean("report").unwrap();
    assert!(context.contains_singleton("report"));
}

#[test]
fn test_concurrent_first_access_creates_one_instance() {
    #[derive(Default)]
    struct Expensive;

    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);

    let expensive = TypeDescriptor::builder::<Expensive>()
        .lazy(true)
        .instantiate_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(10));
            Ok(Expensive)
        })
        .build();

    let context = context_with(vec![expensive]).unwrap();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context.get_bean("expensive").unwrap()
            })
        })
        .collect();

    let beans: Vec<Bean> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(beans.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
}

// ==================== 事务拦截 ====================

trait Greeter: Send + Sync {
    fn greet(&self, who: &str) -> String;
}

impl<T: ?Sized + Greeter> Greeter for TransactionalProxy<T> {
    fn greet(&self, who: &str) -> String {
        self.invoke("greet", move |target| target.greet(who))
    }
}

#[derive(Default)]
struct English {
    log: Log,
}

impl Greeter for English {
    fn greet(&self, who: &str) -> String {
        self.log.lock().push(format!("greet({})", who));
        format!("Hello, {}", who)
    }
}

struct RecordingManager {
    log: Log,
}

impl TransactionManager for RecordingManager {
    fn begin(&self, join_point: &JoinPoint<'_>) {
        self.log.lock().push(format!("begin {}", join_point));
    }

    fn commit(&self, join_point: &JoinPoint<'_>) {
        self.log.lock().push(format!("commit {}", join_point));
    }
}

fn english(log: &Log) -> TypeDescriptor {
    let log = Arc::clone(log);
    TypeDescriptor::builder::<English>()
        .instantiate_with(move || Ok(English { log: Arc::clone(&log) }))
        .transactional(
            |bean: Arc<English>| -> Arc<dyn Greeter> { bean },
            |target: Arc<dyn Greeter>,
             manager: Arc<dyn TransactionManager>,
             name: &str|
             -> Arc<dyn Greeter> { Arc::new(TransactionalProxy::new(target, manager, name)) },
        )
        .build()
}

#[test]
fn test_transactional_bean_wraps_each_call() {
    let log = new_log();

    let context = ApplicationContext::builder(ConfigRoot::default())
        .register(english(&log))
        .transaction_manager(Arc::new(RecordingManager { log: Arc::clone(&log) }))
        .build()
        .unwrap();

    let greeter = context.get_bean_as::<dyn Greeter>("english").unwrap();
    assert_eq!(greeter.greet("Ada"), "Hello, Ada");

    assert_eq!(
        *log.lock(),
        vec!["begin english::greet", "greet(Ada)", "commit english::greet"]
    );

    // 代理只包装一层，并随单例一起缓存
    let again = context.get_bean_as::<dyn Greeter>("english").unwrap();
    assert!(Arc::ptr_eq(&greeter, &again));
    assert!(context.bean_definition("english").unwrap().descriptor().requires_interception());
}

#[test]
fn test_plain_contract_is_not_intercepted() {
    let log = new_log();
    let plain_log = Arc::clone(&log);

    let plain = TypeDescriptor::builder::<English>()
        .instantiate_with(move || Ok(English { log: Arc::clone(&plain_log) }))
        .expose(|bean: Arc<English>| -> Arc<dyn Greeter> { bean })
        .build();

    let context = ApplicationContext::builder(ConfigRoot::default())
        .register(plain)
        .transaction_manager(Arc::new(RecordingManager { log: Arc::clone(&log) }))
        .build()
        .unwrap();

    let greeter = context.get_bean_as::<dyn Greeter>("english").unwrap();
    greeter.greet("Grace");

    assert_eq!(*log.lock(), vec!["greet(Grace)"]);
}

// ==================== 注册 ====================

#[test]
fn test_duplicate_name_last_registration_wins() {
    #[derive(Default)]
    struct Primary;
    #[derive(Default)]
    struct Fallback;

    let primary = TypeDescriptor::builder::<Primary>()
        .name("store")
        .default_constructible()
        .build();
    let fallback = TypeDescriptor::builder::<Fallback>()
        .name("store")
        .default_constructible()
        .build();

    let context = context_with(vec![primary, repository(), fallback]).unwrap();

    assert_eq!(context.bean_names(), vec!["store", "repository"]);
    assert!(context.get_bean("store").unwrap().is::<Fallback>());
}

#[test]
fn test_duplicate_name_rejected_when_overriding_disabled() {
    let config = ConfigRoot::default().with_bean_definition_overriding(false);
    let result = ApplicationContext::builder(config)
        .register(repository())
        .register(repository())
        .build();

    assert!(matches!(result, Err(ContainerError::BeanAlreadyExists(name)) if name == "repository"));
}

#[test]
fn test_static_scanner_respects_scan_root() {
    fn app_repository() -> TypeDescriptor {
        TypeDescriptor::builder::<Repository>()
            .module_path("app::repository")
            .default_constructible()
            .build()
    }

    fn other_service() -> TypeDescriptor {
        TypeDescriptor::builder::<UserService>()
            .module_path("other::service")
            .default_constructible()
            .build()
    }

    let scanner = StaticComponentScanner::new()
        .with(other_service)
        .with(app_repository);

    let context = ApplicationContext::builder(ConfigRoot::new("app"))
        .scan_with(&scanner)
        .build()
        .unwrap();

    assert_eq!(context.bean_names(), vec!["repository"]);
}
