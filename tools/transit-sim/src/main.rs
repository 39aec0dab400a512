//! # transit-sim
//!
//! 无窗口过渡模拟器：按配置创建 GameSession，以固定输入推进若干帧，
//! 输出每次过渡的结果。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p transit-sim -- run --config session.json --frames 600 --move 1,0
//! cargo run -p transit-sim -- run --config session.json --json
//! cargo run -p transit-sim -- check session.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{Level, debug};
use transit_host::{GameSession, HostConfig};
use transit_runtime::{AudioCue, TransitionEvent, TransitionReport, Vec2};

#[derive(Parser)]
#[command(name = "transit-sim")]
#[command(about = "无窗口过渡模拟器 - 按配置驱动 GameSession 并输出过渡报告")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出阶段级调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行模拟
    Run {
        /// 配置文件（缺省使用默认配置）
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 模拟帧数
        #[arg(long, default_value_t = 600)]
        frames: u32,

        /// 每帧时长（秒）
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// 恒定移动方向，格式 `x,y`
        #[arg(long = "move", value_parser = parse_vec2, default_value = "1,0")]
        movement: Vec2,

        /// 以 JSON 输出报告
        #[arg(long)]
        json: bool,
    },

    /// 校验配置文件
    Check {
        /// 配置文件路径
        config: PathBuf,
    },
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("需要 `x,y` 格式: {s}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("x 无效: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("y 无效: {e}"))?;
    let v = Vec2::new(x, y);
    if !v.is_finite() {
        return Err(format!("坐标必须是有限数: {s}"));
    }
    Ok(v)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Err(e) = real_main(cli) {
        eprintln!("transit-sim error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            config,
            frames,
            dt,
            movement,
            json,
        } => {
            if !dt.is_finite() || dt <= 0.0 {
                anyhow::bail!("--dt 必须是正数: {dt}");
            }
            let mut config = match config {
                Some(path) => read_config(&path)?,
                None => HostConfig::default(),
            };
            if cli.verbose {
                config.transition.trace_phases = true;
            }
            simulate(&config, frames, dt, movement, json)
        }
        Commands::Check { config } => {
            let config = read_config(&config)?;
            config.validate().context("配置校验失败")?;
            println!(
                "OK: {} 个世界, {} 个触发区域, 初始世界 {}",
                config.worlds.len(),
                config.zones.len(),
                config.start_world
            );
            Ok(())
        }
    }
}

fn read_config(path: &Path) -> anyhow::Result<HostConfig> {
    HostConfig::read(path).with_context(|| format!("无法读取配置 {}", path.display()))
}

fn simulate(
    config: &HostConfig,
    frames: u32,
    dt: f32,
    movement: Vec2,
    as_json: bool,
) -> anyhow::Result<()> {
    let mut session = GameSession::new(config).context("无法创建会话")?;
    let mut rows = Vec::new();
    // 上一次报告之后播放的音效
    let mut cues = Vec::new();

    for _ in 0..frames {
        let report = session.update(movement, dt);

        for event in session.events() {
            if let TransitionEvent::LoadProgress {
                world_id, progress, ..
            } = event
            {
                debug!(world = %world_id, progress, "加载中");
            }
        }
        cues.extend(session.audio().drain());

        if let Some(report) = report {
            let row = Row::capture(&session, &report, std::mem::take(&mut cues));
            if !as_json {
                println!("{row}");
            }
            rows.push(row);
        }
    }

    if as_json {
        let reports = rows.iter().map(Row::to_json).collect::<Vec<_>>();
        let summary = json!({
            "frames": session.frame(),
            "final_world": session.current_world().as_str(),
            "final_position": session.actor().position(),
            "transitions": reports,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} 帧, {} 次过渡, 最终位于 {} {}",
            session.frame(),
            rows.len(),
            session.current_world(),
            session.actor().position()
        );
    }
    Ok(())
}

/// 一次过渡结束时的快照
struct Row {
    frame: u64,
    report: TransitionReport,
    world: String,
    position: Vec2,
    cues: Vec<AudioCue>,
}

impl Row {
    fn capture(session: &GameSession, report: &TransitionReport, cues: Vec<AudioCue>) -> Self {
        Self {
            frame: session.frame(),
            report: report.clone(),
            world: session.current_world().to_string(),
            position: session.actor().position(),
            cues,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "frame": self.frame,
            "id": self.report.id.value(),
            "outcome": self.report.outcome,
            "error": self.report.error.as_ref().map(|e| e.to_string()),
            "elapsed": self.report.elapsed,
            "world": self.world,
            "position": self.position,
            "cues": self.cues,
        })
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[frame {:>5}] {} {} ({:.2}s) -> {} {}",
            self.frame, self.report.id, self.report.outcome, self.report.elapsed, self.world, self.position
        )?;
        if let Some(error) = &self.report.error {
            write!(f, ": {error}")?;
        }
        if !self.cues.is_empty() {
            let names = self.cues.iter().map(AudioCue::as_str).collect::<Vec<_>>();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}
