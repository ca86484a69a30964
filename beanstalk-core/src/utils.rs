//! Utility functions for the container
//!
//! Bean naming helpers and dependency tracking used by the registry and
//! the bean factory.

/// Naming convention utilities for bean names
pub mod naming {
    /// Derives the default bean name from a simple type name.
    ///
    /// Follows the JavaBeans rule: the first character is lower-cased, unless
    /// the first two characters are both upper case, in which case the name
    /// is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use beanstalk_core::utils::naming::decapitalize;
    ///
    /// assert_eq!(decapitalize("UserService"), "userService");
    /// assert_eq!(decapitalize("URLParser"), "URLParser");
    /// assert_eq!(decapitalize("A"), "a");
    /// assert_eq!(decapitalize(""), "");
    /// ```
    pub fn decapitalize(s: &str) -> String {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => String::new(),
            (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
                s.to_string()
            }
            (Some(first), _) => {
                let mut result = String::with_capacity(s.len());
                result.extend(first.to_lowercase());
                result.push_str(&s[first.len_utf8()..]);
                result
            }
        }
    }

    /// Returns the last path segment of a type name with generic arguments removed.
    ///
    /// ```
    /// use beanstalk_core::utils::naming::simple_type_name;
    ///
    /// assert_eq!(simple_type_name("app::service::UserService"), "UserService");
    /// assert_eq!(simple_type_name("app::Repo<alloc::string::String>"), "Repo");
    /// ```
    pub fn simple_type_name(full: &str) -> &str {
        let base = match full.find('<') {
            Some(idx) => &full[..idx],
            None => full,
        };
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Dependency resolution utilities
pub mod dependency {
    use std::collections::{HashMap, HashSet};
    use std::thread::{self, ThreadId};

    use parking_lot::Mutex;

    use crate::error::{ContainerError, ContainerResult};

    /// Tracks beans currently being created to detect circular dependencies.
    ///
    /// Each thread has its own creation stack, so two threads creating the
    /// same prototype at the same time never see each other as a cycle.
    #[derive(Debug, Default)]
    pub struct CreationTracker {
        creating: Mutex<HashMap<ThreadId, Vec<String>>>,
    }

    impl CreationTracker {
        /// Creates a new empty creation tracker.
        pub fn new() -> Self {
            Self::default()
        }

        /// Marks a bean as being created on the current thread.
        ///
        /// The returned guard removes the mark when dropped, including on
        /// early return through `?`.
        ///
        /// # Errors
        ///
        /// Returns [`ContainerError::CircularDependency`] with the full chain
        /// (`a -> b -> a`) if the bean is already being created on this thread.
        pub fn enter(&self, name: &str) -> ContainerResult<CreationGuard<'_>> {
            let thread = thread::current().id();
            let mut creating = self.creating.lock();
            let stack = creating.entry(thread).or_default();

            if let Some(start) = stack.iter().position(|n| n == name) {
                let mut cycle = stack[start..].to_vec();
                cycle.push(name.to_string());
                return Err(ContainerError::CircularDependency(cycle.join(" -> ")));
            }

            stack.push(name.to_string());
            Ok(CreationGuard {
                tracker: self,
                thread,
            })
        }

        fn exit(&self, thread: ThreadId) {
            let mut creating = self.creating.lock();
            if let Some(stack) = creating.get_mut(&thread) {
                stack.pop();
                if stack.is_empty() {
                    creating.remove(&thread);
                }
            }
        }
    }

    /// RAII guard returned by [`CreationTracker::enter`]
    #[derive(Debug)]
    pub struct CreationGuard<'a> {
        tracker: &'a CreationTracker,
        thread: ThreadId,
    }

    impl Drop for CreationGuard<'_> {
        fn drop(&mut self) {
            self.tracker.exit(self.thread);
        }
    }

    /// Dependency graph analysis result
    #[derive(Debug, PartialEq, Eq)]
    pub enum DependencyValidationError {
        /// Circular dependency detected
        CircularDependency {
            /// The dependency chain forming the cycle
            cycle: Vec<String>,
        },
        /// Missing dependency detected
        MissingDependency {
            /// The bean that requires the dependency
            bean: String,
            /// The missing dependency
            missing: String,
        },
    }

    impl std::fmt::Display for DependencyValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::CircularDependency { cycle } => {
                    write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
                }
                Self::MissingDependency { bean, missing } => {
                    write!(f, "Bean '{}' depends on '{}' which is not registered", bean, missing)
                }
            }
        }
    }

    impl From<DependencyValidationError> for ContainerError {
        fn from(err: DependencyValidationError) -> Self {
            match err {
                DependencyValidationError::CircularDependency { cycle } => {
                    ContainerError::CircularDependency(cycle.join(" -> "))
                }
                DependencyValidationError::MissingDependency { bean, missing } => {
                    ContainerError::DependencyResolution { bean, slot: missing }
                }
            }
        }
    }

    /// Validates a dependency graph for circular dependencies and missing beans.
    ///
    /// `dependencies` lists each bean with the names of its dependency slots,
    /// in registration order. The first problem found in that order is reported.
    pub fn validate_dependency_graph(
        dependencies: &[(String, Vec<String>)],
    ) -> Result<(), DependencyValidationError> {
        let graph: HashMap<&str, &[String]> = dependencies
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.as_slice()))
            .collect();

        // Check for missing dependencies
        for (bean_name, deps) in dependencies {
            for dep in deps {
                if !graph.contains_key(dep.as_str()) {
                    return Err(DependencyValidationError::MissingDependency {
                        bean: bean_name.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        // Check for circular dependencies using DFS
        let mut visited = HashSet::new();
        let mut rec_stack = Vec::new();

        for (bean_name, _) in dependencies {
            if !visited.contains(bean_name.as_str()) {
                if let Some(cycle) =
                    detect_cycle_dfs(bean_name.as_str(), &graph, &mut visited, &mut rec_stack)
                {
                    return Err(DependencyValidationError::CircularDependency { cycle });
                }
            }
        }

        Ok(())
    }

    /// DFS-based cycle detection
    ///
    /// Returns Some(cycle) if a cycle is detected, None otherwise
    fn detect_cycle_dfs<'g>(
        node: &'g str,
        graph: &HashMap<&'g str, &'g [String]>,
        visited: &mut HashSet<&'g str>,
        rec_stack: &mut Vec<&'g str>,
    ) -> Option<Vec<String>> {
        visited.insert(node);
        rec_stack.push(node);

        if let Some(&deps) = graph.get(node) {
            for dep in deps {
                if let Some(start) = rec_stack.iter().position(|n| *n == dep.as_str()) {
                    let mut cycle: Vec<String> =
                        rec_stack[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                if !visited.contains(dep.as_str()) {
                    if let Some(cycle) = detect_cycle_dfs(dep.as_str(), graph, visited, rec_stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        rec_stack.pop();
        None
    }
}
