//! 传感器模拟器
//!
//! 以固定频率发送绕传感器 Z 轴（竖直轴）匀速旋转的姿态数据，
//! 用于在没有真实 IMU 的情况下测试追踪器。
//!
//! # 使用说明
//!
//! ```bash
//! cargo run --example sensor_emulator -- --target 127.0.0.1:8080 --rate 100
//! ```

use anyhow::Context;
use clap::Parser;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracker_sdk::protocol::{Quaternion, WireSample};

#[derive(Parser, Debug)]
#[command(name = "sensor_emulator", about = "Send a rotating IMU orientation stream over UDP")]
struct Args {
    /// 追踪器地址
    #[arg(long, default_value = "127.0.0.1:8080")]
    target: SocketAddr,

    /// 发送频率（Hz）
    #[arg(long, default_value_t = 100)]
    rate: u32,

    /// 旋转角速度（度/秒）
    #[arg(long, default_value_t = 45.0)]
    degrees_per_second: f32,

    /// 发送的样本数（不指定则一直发送）
    #[arg(long)]
    count: Option<u64>,

    /// 每 N 个样本插入一个 10 字节的残包（0 表示不插入）
    #[arg(long, default_value_t = 0)]
    garbage_every: u64,
}

/// 绕 Z 轴旋转 `angle_rad` 的四元数
fn yaw(angle_rad: f32) -> Quaternion {
    let half = angle_rad * 0.5;
    Quaternion::new(half.cos(), 0.0, 0.0, half.sin())
}

fn main() -> anyhow::Result<()> {
    tracker_sdk::logging::init();
    let args = Args::parse();
    anyhow::ensure!(args.rate > 0, "--rate must be > 0");

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;

    let socket = UdpSocket::bind("0.0.0.0:0").context("failed to bind sender socket")?;
    let period = Duration::from_secs_f64(1.0 / f64::from(args.rate));
    let started = Instant::now();

    println!("📡 Sending to {} at {} Hz (Ctrl-C to stop)", args.target, args.rate);

    let mut sent = 0u64;
    while running.load(Ordering::SeqCst) && args.count.is_none_or(|count| sent < count) {
        if args.garbage_every > 0 && sent > 0 && sent % args.garbage_every == 0 {
            socket.send_to(&[0u8; 10], args.target)?;
        }

        let angle = started.elapsed().as_secs_f32() * args.degrees_per_second.to_radians();
        let sample = WireSample::from_parts(yaw(angle), [0.0, 0.0, 9.81]);
        socket.send_to(&sample.encode(), args.target)?;
        sent += 1;

        std::thread::sleep(period);
    }

    println!("✅ Sent {} samples in {:.2}s", sent, started.elapsed().as_secs_f64());
    Ok(())
}
