//! 连接点（JoinPoint）定义
//!
//! 连接点表示代理转发的一次方法调用

use std::fmt;
use std::time::Instant;

/// 连接点信息
///
/// 包含被拦截调用的上下文信息
#[derive(Debug, Clone)]
pub struct JoinPoint<'a> {
    /// 目标 Bean 名称
    target: &'a str,

    /// 方法名称
    method: &'static str,

    /// 调用时间戳
    timestamp: Instant,
}

impl<'a> JoinPoint<'a> {
    /// 创建新的连接点
    pub fn new(target: &'a str, method: &'static str) -> Self {
        Self {
            target,
            method,
            timestamp: Instant::now(),
        }
    }

    /// 获取完整的方法签名
    pub fn signature(&self) -> String {
        format!("{}::{}", self.target, self.method)
    }

    /// 获取目标 Bean 名称
    pub fn target(&self) -> &'a str {
        self.target
    }

    /// 获取方法名称
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// 获取调用时间戳
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }
}

impl fmt::Display for JoinPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.target, self.method)
    }
}
