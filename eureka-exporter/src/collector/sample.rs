use prometheus::proto::{Gauge, LabelPair, Metric};

use common::models::Instance;

/// registry_center 标签的固定取值
pub const REGISTRY_CENTER: &str = "eureka";

/// 标签名称及顺序，所有样本一致
pub const LABEL_NAMES: [&str; 7] = [
    "registry_center",
    "address",
    "application",
    "port",
    "portenable",
    "secureport",
    "secureportenable",
];

/// 实例状态到指标值的固定映射
pub const STATUS_VALUES: [(&str, f64); 2] = [("DOWN", 0.0), ("UP", 1.0)];

/// 未识别状态的取值，告警规则依赖这个值
pub const UNKNOWN_STATUS_VALUE: f64 = 2.0;

/// 将注册中心的原始状态映射为指标值，区分大小写
pub fn status_value(status: &str) -> f64 {
    STATUS_VALUES
        .iter()
        .find(|(token, _)| *token == status)
        .map(|(_, value)| *value)
        .unwrap_or(UNKNOWN_STATUS_VALUE)
}

/// 一个实例对应的一条指标样本
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub value: f64,
    pub labels: [String; 7],
}

impl MetricSample {
    // 标签值原样使用，端口和 enabled 不做数值转换
    pub fn from_instance(instance: &Instance) -> Self {
        Self {
            value: status_value(&instance.status),
            labels: [
                REGISTRY_CENTER.to_string(),
                instance.ip_address.clone(),
                instance.app_name.clone(),
                instance.port.value.clone(),
                instance.port.enabled.clone(),
                instance.secure_port.value.clone(),
                instance.secure_port.enabled.clone(),
            ],
        }
    }

    pub fn into_metric(self) -> Metric {
        let label_pairs: Vec<LabelPair> = LABEL_NAMES
            .iter()
            .zip(self.labels)
            .map(|(name, value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.to_string());
                pair.set_value(value);
                pair
            })
            .collect();

        let mut gauge = Gauge::default();
        gauge.set_value(self.value);

        let mut metric = Metric::default();
        metric.set_label(label_pairs.into());
        metric.set_gauge(gauge);
        metric
    }
}
