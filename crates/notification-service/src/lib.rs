//! 通知分发服务
//!
//! 包裹生命周期事件（预订确认、清关、派送等）触发后，按触发器配置
//! 选择渠道（SMS、邮件、推送、WhatsApp），结合用户偏好和语言渲染模板，
//! 并发调用各渠道服务商。单个渠道失败不影响其它渠道的投递。

pub mod api;
pub mod dispatcher;
pub mod error;
pub mod providers;
pub mod scheduler;
pub mod templates;
pub mod triggers;
pub mod types;

pub use dispatcher::{BatchRecipient, DispatchSettings, NotificationDispatcher};
pub use error::{NotificationError, Result};
