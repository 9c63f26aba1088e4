//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::events::{Language, NotificationChannel};
use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许的跨域来源，逗号分隔，"*" 表示全部
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: "http://localhost:3000".to_string(),
        }
    }
}

/// 单个外部服务商的接入配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEndpointConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    /// 传输层超时，本服务不额外设置超时
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl ProviderEndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// 服务商配置
///
/// SMS 与 WhatsApp 共用同一服务商（Twilio），因此只有三组端点。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub sms: ProviderEndpointConfig,
    pub email: ProviderEndpointConfig,
    pub push: ProviderEndpointConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            sms: ProviderEndpointConfig::new("http://localhost:4010/twilio/messages"),
            email: ProviderEndpointConfig::new("http://localhost:4010/sendgrid/mail"),
            push: ProviderEndpointConfig::new("http://localhost:4010/firebase/send"),
        }
    }
}

/// 任务队列配置
///
/// url 为空时不启用定时通知
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub url: Option<String>,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// 通知分发配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// 用户偏好未指定语言时使用
    pub default_language: Language,
    /// 渠道可用性开关，对事务性触发器同样生效
    pub enabled_channels: Vec<NotificationChannel>,
    /// 为 true 时事务性触发器忽略用户的渠道级退订
    pub transactional_overrides_channel_opt_out: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_language: Language::En,
            enabled_channels: NotificationChannel::ALL.to_vec(),
            transactional_overrides_channel_opt_out: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub scheduler: SchedulerConfig,
    pub notification: NotificationConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（PARCEL_ 前缀，`__` 分隔层级，如 PARCEL_PROVIDERS__SMS__API_KEY -> providers.sms.api_key）
    pub fn load(service_name: &str) -> Result<Self> {
        let env = std::env::var("PARCEL_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置，便于测试时注入临时目录
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{env}.toml"))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{service_name}.toml"))).required(false),
            )
            .add_source(
                Environment::with_prefix("PARCEL")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("notification.enabled_channels")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability.service_name = config.service_name.clone();

        Ok(config)
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
