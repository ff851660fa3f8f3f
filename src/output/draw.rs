// 该文件是 Guanshan （关山） 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detection::Detection;

/// 边框颜色，红色
const BOX_COLOR: [u8; 3] = [255, 0, 0];
/// 边框线宽（像素）
const BOX_THICKNESS: i32 = 2;

/// 在图像上绘制所有检测框，bbox 为原图像素坐标
pub fn draw_detections_on_image(image: &mut RgbImage, detections: &[Detection]) {
  for detection in detections {
    draw_bbox(image, detection);
  }
}

fn draw_bbox(image: &mut RgbImage, detection: &Detection) {
  let (w, h) = (image.width() as i32, image.height() as i32);

  let x_min = (detection.x.floor() as i32).clamp(0, w - 1);
  let y_min = (detection.y.floor() as i32).clamp(0, h - 1);
  let x_max = (detection.x_max().ceil() as i32).clamp(0, w - 1);
  let y_max = (detection.y_max().ceil() as i32).clamp(0, h - 1);

  if x_min >= x_max || y_min >= y_max {
    return;
  }

  // 逐像素内缩绘制，得到加粗边框
  for thickness in 0..BOX_THICKNESS {
    let x = x_min + thickness;
    let y = y_min + thickness;
    let width = x_max - x_min - 2 * thickness;
    let height = y_max - y_min - 2 * thickness;
    if width <= 0 || height <= 0 {
      break;
    }
    let rect = Rect::at(x, y).of_size(width as u32, height as u32);
    draw_hollow_rect_mut(image, rect, Rgb(BOX_COLOR));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn boxes_are_drawn_in_red() {
    let mut image = RgbImage::from_pixel(32, 32, Rgb([0, 0, 0]));
    let detection = Detection {
      x: 4.0,
      y: 4.0,
      width: 16.0,
      height: 16.0,
      confidence: 0.9,
      class_id: 0,
      label: "person",
    };

    draw_detections_on_image(&mut image, &[detection]);

    assert_eq!(image.get_pixel(4, 4), &Rgb([255, 0, 0]));
    // 框内部不受影响
    assert_eq!(image.get_pixel(12, 12), &Rgb([0, 0, 0]));
  }

  #[test]
  fn out_of_bounds_boxes_are_clamped() {
    let mut image = RgbImage::from_pixel(16, 16, Rgb([0, 0, 0]));
    let detection = Detection {
      x: -10.0,
      y: -10.0,
      width: 100.0,
      height: 100.0,
      confidence: 0.9,
      class_id: 0,
      label: "person",
    };

    // 不越界访问即可
    draw_detections_on_image(&mut image, &[detection]);
    assert_eq!(image.get_pixel(0, 0), &Rgb([255, 0, 0]));
  }
}
