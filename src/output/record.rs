// 该文件是 Guanshan （关山） 项目的一部分。
// src/output/record.rs - 检测结果 JSON 记录输出
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

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::RgbImage;
use serde::Serialize;
use thiserror::Error;

use super::Render;
use crate::detection::{Detection, DetectionResult};
use crate::display::{CaptureOrientation, ScreenRect, map_to_display};

#[derive(Error, Debug)]
pub enum JsonRecordError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct DetectionRecord {
  #[serde(flatten)]
  result: DetectionResult,
  /// 提供显示尺寸时附带的显示坐标
  #[serde(skip_serializing_if = "Option::is_none")]
  screen: Option<ScreenRect>,
}

#[derive(Serialize)]
struct FrameRecord {
  frame: usize,
  detections: Vec<DetectionRecord>,
}

/// 每帧写一行 JSON 的记录输出。
/// 可选地按给定的显示尺寸与采集方向附带显示坐标。
pub struct JsonRecordOutput {
  writer: BufWriter<File>,
  display: Option<(f32, f32, CaptureOrientation)>,
  frame_index: usize,
}

impl JsonRecordOutput {
  pub fn create(
    path: &Path,
    display: Option<(f32, f32, CaptureOrientation)>,
  ) -> Result<Self, JsonRecordError> {
    let writer = BufWriter::new(File::create(path)?);
    Ok(Self {
      writer,
      display,
      frame_index: 0,
    })
  }
}

impl Render for JsonRecordOutput {
  type Error = JsonRecordError;

  fn render_result(
    &mut self,
    frame: &RgbImage,
    detections: &[Detection],
  ) -> Result<(), Self::Error> {
    let (width, height) = frame.dimensions();

    let detections = detections
      .iter()
      .map(|detection| {
        let result = DetectionResult::new(detection, width, height);
        let screen = self
          .display
          .map(|(dw, dh, orientation)| map_to_display(&result, dw, dh, orientation));
        DetectionRecord { result, screen }
      })
      .collect();

    let record = FrameRecord {
      frame: self.frame_index,
      detections,
    };
    serde_json::to_writer(&mut self.writer, &record)?;
    self.writer.write_all(b"\n")?;
    self.writer.flush()?;

    self.frame_index += 1;
    Ok(())
  }
}
