//! 注册中心指标采集器
//!
//! 每次 Prometheus 抓取时同步请求注册中心，解析 XML 文档，
//! 每个实例生成一条 `registry_service_status` 样本。
//! 同一时刻最多只有一次采集在执行，不缓存任何结果。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use prometheus::core::{Collector, Desc};
use prometheus::proto::{MetricFamily, MetricType};
use tracing::{debug, error};

use common::config::AppConfig;
use common::models::Applications;
use common::registry_center::RegistryFetcher;
use common::{Error, Result};

mod sample;

pub use sample::{
    status_value, MetricSample, LABEL_NAMES, REGISTRY_CENTER, STATUS_VALUES, UNKNOWN_STATUS_VALUE,
};

pub const METRIC_NAME: &str = "registry_service_status";
pub const METRIC_HELP: &str = "check eureka service registry status";

/// 注册中心实例状态指标
pub struct RegistryMetrics {
    metrics: BTreeMap<&'static str, Desc>,
    config: Arc<AppConfig>,
    fetcher: Arc<dyn RegistryFetcher>,
    // 串行化采集，避免并发请求注册中心
    mutex: Mutex<()>,
}

/// 创建指标描述符
fn new_global_metric(metric_name: &str, doc_string: &str, labels: &[&str]) -> Result<Desc> {
    let desc = Desc::new(
        metric_name.to_string(),
        doc_string.to_string(),
        labels.iter().map(|label| label.to_string()).collect(),
        HashMap::new(),
    )?;
    Ok(desc)
}

impl RegistryMetrics {
    pub fn new(config: Arc<AppConfig>, fetcher: Arc<dyn RegistryFetcher>) -> Result<Self> {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            METRIC_NAME,
            new_global_metric(METRIC_NAME, METRIC_HELP, &LABEL_NAMES)?,
        );

        Ok(Self {
            metrics,
            config,
            fetcher,
            mutex: Mutex::new(()),
        })
    }

    /// 请求并解析注册中心，返回本次的全部样本
    pub fn scrape(&self) -> Result<Vec<MetricSample>> {
        let request = self.config.fetch_request();
        let response = self.fetcher.fetch(&request)?;
        let applications = Applications::from_xml(&response.body)?;

        debug!(
            "注册中心返回 {} 个应用, {} 个实例",
            applications.applications.len(),
            applications.instance_count()
        );

        Ok(applications
            .instances()
            .map(MetricSample::from_instance)
            .collect())
    }

    fn gauge_family(&self, samples: Vec<MetricSample>) -> Result<MetricFamily> {
        let desc = self
            .metrics
            .get(METRIC_NAME)
            .ok_or_else(|| Error::Internal(format!("缺少指标描述符: {}", METRIC_NAME)))?;

        let metrics: Vec<_> = samples.into_iter().map(MetricSample::into_metric).collect();

        let mut family = MetricFamily::default();
        family.set_name(desc.fq_name.clone());
        family.set_help(desc.help.clone());
        family.set_field_type(MetricType::GAUGE);
        family.set_metric(metrics.into());
        Ok(family)
    }
}

impl Collector for RegistryMetrics {
    fn desc(&self) -> Vec<&Desc> {
        self.metrics.values().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let _guard = self.mutex.lock(); // 加锁，返回时释放

        let samples = match self.scrape() {
            Ok(samples) => samples,
            Err(e) => {
                error!("采集注册中心状态失败, url: {}, error: {}", self.config.url, e);
                return Vec::new();
            }
        };

        if samples.is_empty() {
            debug!("注册中心没有实例");
            return Vec::new();
        }

        match self.gauge_family(samples) {
            Ok(family) => vec![family],
            Err(e) => {
                error!("构建指标失败: {}", e);
                Vec::new()
            }
        }
    }
}
