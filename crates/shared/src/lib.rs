//! 共享库
//!
//! 包含各服务共用的领域枚举、配置加载、错误处理和可观测性初始化代码。

pub mod config;
pub mod error;
pub mod events;
pub mod observability;
