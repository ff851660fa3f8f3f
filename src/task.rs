// 该文件是 Guanshan （关山） 项目的一部分。
// src/task.rs - 帧任务驱动
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

use std::time::Instant;

use image::RgbImage;
use tracing::{info, warn};

use crate::detector::YoloDetector;
use crate::model::InferenceEngine;
use crate::output::Render;

/// 帧任务：决定“取帧 → 检测 → 渲染”的驱动方式。
/// 每帧处理总是运行到完成或失败后才考虑下一帧。
pub trait Task<I, D, O>: Sized {
  type Error;
  fn run_task(self, input: I, detector: D, output: O) -> Result<(), Self::Error>;
}

/// 只处理一帧，任何错误直接上抛
pub struct OneShotTask;

impl<E, RE, I, O> Task<I, YoloDetector<E>, O> for OneShotTask
where
  E: InferenceEngine,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = RgbImage>,
  O: Render<Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    mut detector: YoloDetector<E>,
    mut output: O,
  ) -> Result<(), Self::Error> {
    info!("开始单帧任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;

    let now = Instant::now();
    let detections = detector.detect_image(&frame)?;
    info!(
      "检测完成，耗时: {:.2?}，检出 {} 个目标",
      now.elapsed(),
      detections.len()
    );

    output.render_result(&frame, &detections)?;
    Ok(())
  }
}

/// 连续处理输入的每一帧。
/// 单帧检测失败只记录日志并继续下一帧，渲染失败才终止任务。
#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<E, RE, I, O> Task<I, YoloDetector<E>, O> for ContinuousTask
where
  E: InferenceEngine,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = RgbImage>,
  O: Render<Error = RE>,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    mut detector: YoloDetector<E>,
    mut output: O,
  ) -> Result<(), Self::Error> {
    info!("开始任务...");
    let mut frame_index = 0usize;
    let mut total_detections = 0usize;

    for frame in input {
      frame_index += 1;
      let now = Instant::now();

      match detector.detect_image(&frame) {
        Ok(detections) => {
          total_detections += detections.len();
          info!(
            "第 {} 帧: 检出 {} 个目标，耗时 {:.2?}",
            frame_index,
            detections.len(),
            now.elapsed()
          );
          for det in &detections {
            info!(
              "  - {}: {:.1}% at ({:.0}, {:.0}, {:.0}x{:.0})",
              det.label,
              det.confidence * 100.0,
              det.x,
              det.y,
              det.width,
              det.height
            );
          }
          output.render_result(&frame, &detections)?;
        }
        Err(err) => {
          warn!("第 {} 帧检测失败，跳过: {}", frame_index, err);
        }
      }

      if self.frame_number.map(|n| frame_index >= n).unwrap_or(false) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
    }

    info!(
      "任务完成: 共处理 {} 帧，累计检出 {} 个目标",
      frame_index, total_detections
    );
    Ok(())
  }
}
