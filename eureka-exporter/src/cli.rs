use clap::Parser;

use common::config::DEFAULT_CONFIG_PATH;

/// Eureka 注册中心实例状态 exporter
#[derive(Parser, Debug)]
#[command(name = "eureka-exporter", version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径
    #[arg(long = "conf", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub conf: String,
}

impl Cli {
    /// 解析命令行参数，兼容单横线的 `-conf <path>` 写法
    pub fn parse_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse_from(normalize_args(args))
    }
}

/// 将 `-conf`、`-conf=<path>` 改写为 `--conf`、`--conf=<path>`
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index > 0 && (arg == "-conf" || arg.starts_with("-conf=")) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}
