// 该文件是 Guanshan （关山） 项目的一部分。
// src/detection.rs - 检测结果数据模型
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

use serde::Serialize;

/// 单个检测框，左上角原点的像素坐标。
/// 解码阶段位于模型输入坐标系，解码完成后位于原图坐标系。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
  /// 边界框左上角 x 坐标
  pub x: f32,
  /// 边界框左上角 y 坐标
  pub y: f32,
  /// 边界框宽度
  pub width: f32,
  /// 边界框高度
  pub height: f32,
  /// 置信度 (0-1)
  pub confidence: f32,
  /// 类别编号
  pub class_id: usize,
  /// 类别名称
  pub label: &'static str,
}

impl Detection {
  pub fn x_max(&self) -> f32 {
    self.x + self.width
  }

  pub fn y_max(&self) -> f32 {
    self.y + self.height
  }

  pub fn area(&self) -> f32 {
    self.width * self.height
  }
}

/// 发送给展示层的检测结果。
/// 附带实际送入检测器的图像尺寸，展示层据此换算显示坐标。
/// 每帧生成一次，生成后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
  pub confidence: f32,
  pub class_id: usize,
  pub label: &'static str,
  /// 送检图像宽度（像素）
  pub source_image_width: u32,
  /// 送检图像高度（像素）
  pub source_image_height: u32,
}

impl DetectionResult {
  pub fn new(detection: &Detection, source_image_width: u32, source_image_height: u32) -> Self {
    Self {
      x: detection.x,
      y: detection.y,
      width: detection.width,
      height: detection.height,
      confidence: detection.confidence,
      class_id: detection.class_id,
      label: detection.label,
      source_image_width,
      source_image_height,
    }
  }
}
