mod cli;
mod pipeline;
mod settings;

use anyhow::Context;
use chatter_feed::pushshift::PushshiftSource;
use chatter_pipeline::sentiment::LexiconScorer;
use chatter_store::merged::CsvMergedStore;
use chatter_store::post::CsvPostStore;
use chatter_store::price::CsvPriceStore;
use clap::Parser;
use cli::{Cli, Command};
use pipeline::Pipeline;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 Pipeline。
///
/// # Logic
/// 1. 解析命令行并加载分层配置。
/// 2. 初始化全局日志与 TLS 加密后端。
/// 3. 实例化基础设施层（数据源、表格存储、情感打分器）。
/// 4. Ctrl-C 触发取消令牌，正在进行的抓取在下一个等待点退出。
/// 5. 分派子命令。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. 配置
    let config = settings::load_config(cli.config.as_deref()).context("loading configuration")?;

    // 2. 日志与 TLS
    let _log_guard = settings::init_tracing(cli.log_dir.as_deref());
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A TLS crypto provider was already installed");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "chatter starting...");

    let data_dir = std::path::absolute(&config.storage.data_dir)
        .with_context(|| format!("resolving data dir {}", config.storage.data_dir))?;
    chatter_store::config::set_root_dir(data_dir.clone());
    info!(data_dir = %data_dir.display(), "Storage root configured");

    // 3. 基础设施层
    let source = Arc::new(PushshiftSource::from_config(&config.collector)?);
    let prices = Arc::new(CsvPriceStore::from_config(&config.merge));

    let cancel = CancellationToken::new();
    let pipeline = Pipeline {
        config,
        source,
        posts: Arc::new(CsvPostStore::new()),
        prices,
        merged: Arc::new(CsvMergedStore::new()),
        scorer: Arc::new(LexiconScorer::new()),
        cancel: cancel.clone(),
    };

    // 4. 退出信号
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received. Cancelling...");
            cancel.cancel();
        }
    });

    // 5. 分派
    let outputs = match &cli.command {
        Command::Collect(args) => vec![pipeline.run_collect(args).await?],
        Command::Dedup(args) => vec![pipeline.run_dedup(args)?],
        Command::Merge(args) => vec![pipeline.run_merge(args)?],
        Command::Run(args) => pipeline.run_all(args).await?,
    };

    for path in &outputs {
        info!(path = %path.display(), "Wrote table");
    }
    Ok(())
}
