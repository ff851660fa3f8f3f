// 该文件是 Guanshan （关山） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Guanshan 项目作者

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use guanshan::detector::{DetectorConfig, YoloDetector};
use guanshan::display::CaptureOrientation;
use guanshan::model::OrtEngine;
use guanshan::output::OutputWrapper;
use guanshan::task::{ContinuousTask, Task};

/// Guanshan 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// ONNX 模型文件路径
  #[arg(long, value_name = "MODEL")]
  model: PathBuf,

  /// 输入图像文件，可指定多次，按顺序处理
  #[arg(long, value_name = "IMAGE", required = true)]
  input: Vec<PathBuf>,

  /// 输出路径（.json 写检测记录，图像扩展名保存标注图）
  #[arg(long, value_name = "OUTPUT")]
  output: PathBuf,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  nms_threshold: f32,

  /// 最大处理帧数（0 表示不限制）
  #[arg(long, default_value = "0", value_name = "COUNT")]
  max_frames: usize,

  /// 显示表面宽度（与 --display-height 一起提供时输出显示坐标）
  #[arg(long, value_name = "PIXELS")]
  display_width: Option<f32>,

  /// 显示表面高度
  #[arg(long, value_name = "PIXELS")]
  display_height: Option<f32>,

  /// 采集链路未做 90° 旋转时指定（默认按竖屏旋转处理）
  #[arg(long)]
  upright: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model.display());
  info!("输入帧数: {}", args.input.len());
  info!("输出路径: {}", args.output.display());
  info!("置信度阈值: {}", args.confidence);
  info!("NMS 阈值: {}", args.nms_threshold);

  info!("正在加载模型...");
  let engine = OrtEngine::from_model_file(&args.model)?;

  let config = DetectorConfig {
    confidence_threshold: args.confidence,
    iou_threshold: args.nms_threshold,
    ..DetectorConfig::default()
  };
  let detector = YoloDetector::with_config(engine, config);

  let orientation = if args.upright {
    CaptureOrientation::Upright
  } else {
    CaptureOrientation::Rotated90
  };
  let display = match (args.display_width, args.display_height) {
    (Some(width), Some(height)) => Some((width, height, orientation)),
    _ => None,
  };
  let output = OutputWrapper::for_path(&args.output, display)?;

  // 读取失败的输入只告警并跳过，帧循环保持存活
  let frames = args.input.into_iter().filter_map(|path| {
    match image::ImageReader::open(&path).map_err(image::ImageError::from) {
      Ok(reader) => match reader.decode() {
        Ok(image) => Some(image.into_rgb8()),
        Err(err) => {
          warn!("无法解码输入图像 {}: {}", path.display(), err);
          None
        }
      },
      Err(err) => {
        warn!("无法打开输入图像 {}: {}", path.display(), err);
        None
      }
    }
  });

  let max_frames = if args.max_frames > 0 {
    Some(args.max_frames)
  } else {
    None
  };
  ContinuousTask::default()
    .with_frame_number(max_frames)
    .run_task(frames, detector, output)?;

  Ok(())
}
