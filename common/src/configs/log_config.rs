use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub components: Option<HashMap<String, String>>, // 其他组件的日志级别
    pub format: Option<String>,                      // 日志输出格式: plain或json
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            components: None,
            format: None,
        }
    }
}

impl LogConfig {
    // 过滤器字符串: 全局级别 + 组件级别
    pub fn filter_directives(&self) -> String {
        let mut filter_parts = vec![self.level.clone()];

        if let Some(components) = &self.components {
            let mut components: Vec<_> = components.iter().collect();
            components.sort();
            for (component, level) in components {
                filter_parts.push(format!("{}={}", component, level));
            }
        }

        filter_parts.join(",")
    }
}
