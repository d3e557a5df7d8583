//! 数据库管理控制台公共模块
//!
//! 提供控制台服务共享的基础设施：
//! - 配置加载
//! - 统一错误类型
//! - 数据模型（表、行、状态视图）
//! - 响应包装与中间件
//! - 标识符与语句构建工具

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
