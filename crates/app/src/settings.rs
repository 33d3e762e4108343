use chatter_core::config::AppConfig;
use config::{Config, Environment, File};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_CONFIG_FILE: &str = "chatter";
const ENV_PREFIX: &str = "CHATTER";

/// # Summary
/// 分层加载应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 作为最底层。
/// 2. 叠加配置文件：显式指定时必须存在，否则尝试可选的 `chatter.*`。
/// 3. 叠加 `CHATTER__SECTION__KEY` 形式的环境变量。
///
/// # Arguments
/// * `path`: 命令行指定的配置文件。
///
/// # Returns
/// 合并后的配置。
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. 过滤级别取自 `RUST_LOG`，默认 `info`。
/// 2. 始终输出到终端。
/// 3. 指定了日志目录时，另以按天滚动的文件输出一份 (无 ANSI 颜色)。
///
/// # Returns
/// 文件输出的后台写线程守卫，需在进程退出前保持存活。
pub fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "chatter.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[collector]\nsubreddit = \"stocks\"\npage_size = 100\n\n[merge]\nsymbol = \"AMC\""
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.collector.subreddit, "stocks");
        assert_eq!(config.collector.page_size, 100);
        assert_eq!(config.collector.request_delay_ms, 3_000);
        assert_eq!(config.merge.symbol, "AMC");
        assert_eq!(config.merge.price_column, "close");
        assert!(config.sentiment.enabled);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        assert!(load_config(Some(Path::new("/nonexistent/chatter.toml"))).is_err());
    }
}
