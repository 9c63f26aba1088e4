//! 模板渲染
//!
//! 支持 `{{fieldName}}` 语法。渲染是纯函数且同步执行，不做任何转义；
//! 需要 HTML 转义的渠道由对应的服务商适配器负责。

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::types::NotificationTemplateData;

/// 匹配 {{fieldName}}，字段名支持字母、数字、下划线
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("占位符正则必须合法"));

/// 渲染模板
///
/// 将模板中的 `{{fieldName}}` 替换为数据中的对应值。
/// 未找到的字段保留原样并记录警告日志。
pub fn render_template(template: &str, data: &NotificationTemplateData) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let field = &caps[1];
            match data.field(field) {
                Some(value) => value,
                None => {
                    warn!(field = field, "模板字段未提供，保留原样");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// 提取模板中的所有字段名（按出现顺序，可能重复）
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// 模板中引用但数据未提供的字段
pub fn missing_variables(template: &str, data: &NotificationTemplateData) -> Vec<String> {
    let mut missing = Vec::new();
    for field in extract_variables(template) {
        if data.field(&field).is_none() && !missing.contains(&field) {
            missing.push(field);
        }
    }
    missing
}

/// 渲染结果是否仍残留占位符
pub fn has_placeholders(rendered: &str) -> bool {
    PLACEHOLDER.is_match(rendered)
}
