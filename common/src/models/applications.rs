// Eureka `/eureka/apps` 返回的 XML 文档模型
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::{Error, Result};

/// 文档根元素名称
pub const ROOT_ELEMENT: &str = "applications";

/// 注册中心文档根节点
///
/// 每次抓取解析一次，只读，抓取结束即丢弃。
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Applications {
    #[serde(rename = "application", default)]
    pub applications: Vec<Application>,
}

/// 注册的应用
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "instance", default)]
    pub instances: Vec<Instance>,
}

/// 应用的一个运行实例，字段保持注册中心的原始文本
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Instance {
    #[serde(rename = "ipAddr", default)]
    pub ip_address: String,
    #[serde(rename = "app", default)]
    pub app_name: String,
    /// 原始状态，例如 UP / DOWN / STARTING / OUT_OF_SERVICE
    #[serde(default)]
    pub status: String,
    #[serde(rename = "overriddenstatus", default)]
    pub overridden_status: String,
    #[serde(default)]
    pub port: PortInfo,
    #[serde(rename = "securePort", default)]
    pub secure_port: PortInfo,
    #[serde(rename = "countryId", default)]
    pub country_id: String,
}

/// 端口信息: `<port enabled="true">8080</port>`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PortInfo {
    #[serde(rename = "@enabled", default)]
    pub enabled: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

impl Applications {
    /// 解析注册中心返回的 XML 文档
    ///
    /// 根元素必须是 `applications`，否则返回 `Error::Decode`。
    /// 未知元素（leaseInfo、metadata 等）会被忽略。
    pub fn from_xml(bytes: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| Error::Decode(format!("文档不是合法的UTF-8: {}", e)))?;

        let root = root_element_name(content)?;
        if root != ROOT_ELEMENT {
            return Err(Error::Decode(format!(
                "根元素应为 <{}>，实际为 <{}>",
                ROOT_ELEMENT, root
            )));
        }

        Ok(quick_xml::de::from_str(content)?)
    }

    /// 按文档顺序遍历所有应用下的所有实例
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.applications
            .iter()
            .flat_map(|application| application.instances.iter())
    }

    pub fn instance_count(&self) -> usize {
        self.applications.iter().map(|a| a.instances.len()).sum()
    }
}

// 读取第一个元素的名称，跳过声明、注释和空白
fn root_element_name(content: &str) -> Result<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
            Event::Eof => return Err(Error::Decode("文档为空".to_string())),
            _ => return Err(Error::Decode("文档缺少根元素".to_string())),
        }
    }
}
