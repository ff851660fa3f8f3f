// 该文件是 Guanshan （关山） 项目的一部分。
// src/display.rs - 显示坐标换算
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

use crate::detection::DetectionResult;

/// 采集方向约定。
///
/// 竖屏设备的采集链路在送检前把图像旋转了 90°，检测结果的宽高
/// 相对显示方向因此是交换的。旋转约定只在这一个参数里表达，
/// 采集链路变更时只需改动传入的方向值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureOrientation {
  /// 采集图像与显示方向一致
  Upright,
  /// 竖屏采集，送检图像相对显示方向旋转了 90°
  #[default]
  Rotated90,
}

/// 显示坐标系下的矩形
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

/// 把原图坐标系的检测结果换算到显示表面。
///
/// Rotated90 时两轴缩放系数取自交换后的源尺寸：
/// scale_x = 显示宽 / 源高，scale_y = 显示高 / 源宽。
pub fn map_to_display(
  result: &DetectionResult,
  display_width: f32,
  display_height: f32,
  orientation: CaptureOrientation,
) -> ScreenRect {
  let (scale_x, scale_y) = match orientation {
    CaptureOrientation::Upright => (
      display_width / result.source_image_width as f32,
      display_height / result.source_image_height as f32,
    ),
    CaptureOrientation::Rotated90 => (
      display_width / result.source_image_height as f32,
      display_height / result.source_image_width as f32,
    ),
  };

  ScreenRect {
    x: result.x * scale_x,
    y: result.y * scale_y,
    width: result.width * scale_x,
    height: result.height * scale_y,
  }
}
