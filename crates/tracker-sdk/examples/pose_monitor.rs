//! 位姿监视器
//!
//! 启动一个位姿会话，并周期性打印当前位姿（消费端坐标系）和接收统计。
//!
//! # 使用说明
//!
//! ```bash
//! cargo run --example pose_monitor -- --port 8080
//! cargo run --example pose_monitor -- --config tracker.toml
//! ```

use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracker_sdk::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "pose_monitor", about = "Receive IMU samples over UDP and print the current pose")]
struct Args {
    /// TOML 配置文件（命令行参数优先）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 监听端口
    #[arg(long)]
    port: Option<u16>,

    /// 绑定地址
    #[arg(long)]
    bind: Option<IpAddr>,

    /// 重新归一化姿态四元数
    #[arg(long)]
    normalize: bool,

    /// 打印间隔（毫秒）
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracker_sdk::logging::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => TrackerConfig::default(),
    };
    if let Some(port) = args.port {
        config.network.port = port;
    }
    if let Some(bind) = args.bind {
        config.network.bind_address = bind;
    }
    if args.normalize {
        config.pose.orientation_policy = OrientationPolicy::Normalize;
    }
    config.validate()?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    let mut session = SessionBuilder::from_config(config.session_config()).build();
    session.start(config.network.port)?;
    println!(
        "🎯 Listening on {} (Ctrl-C to stop)",
        session.local_addr().map(|a| a.to_string()).unwrap_or_default()
    );

    while running.load(Ordering::SeqCst) && session.is_running() {
        std::thread::sleep(Duration::from_millis(args.interval_ms));

        let pose = session.current_pose();
        let metrics = session.metrics();
        let q = pose.orientation;
        println!(
            "{} w={:+.4} x={:+.4} y={:+.4} z={:+.4} | samples={} rejected={}",
            if session.is_streaming() { "🟢" } else { "⚪" },
            q.w,
            q.x,
            q.y,
            q.z,
            metrics.samples_applied,
            metrics.datagrams_rejected,
        );
    }

    session.stop();
    println!("🛑 Stopped");
    Ok(())
}
