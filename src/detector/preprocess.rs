// 该文件是 Guanshan （关山） 项目的一部分。
// src/detector/preprocess.rs - 图像预处理（letterbox 与归一化）
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

use image::RgbImage;
use image::imageops::{self, FilterType};

const RGB_CHANNELS: usize = 3;

/// letterbox 变换记录。
/// scale 与 pad 即精确还原原图坐标所需的全部参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
  /// 统一缩放系数 min(N/W, N/H)
  pub scale: f32,
  /// 水平方向左侧填充（像素）
  pub pad_x: u32,
  /// 垂直方向顶部填充（像素）
  pub pad_y: u32,
}

/// 模型输入张量，通道平面排布：先整面 R，再整面 G，最后整面 B。
/// 长度恒为 3*N*N，元素取值范围 [0,1]。
#[derive(Debug, Clone)]
pub struct InputTensor {
  size: u32,
  data: Box<[f32]>,
}

impl InputTensor {
  /// 方形边长 N
  pub fn size(&self) -> u32 {
    self.size
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }
}

/// 把任意分辨率的图像 letterbox 到 N×N 并归一化为模型输入张量。
///
/// 步骤：按 min(N/W, N/H) 等比缩放，粘贴到黑色 N×N 画布中央，
/// 逐像素把 [0,255] 的 RGB 分量归一化到 [0,1] 写入通道平面缓冲。
pub fn preprocess(image: &RgbImage, target_size: u32) -> (InputTensor, Letterbox) {
  let (width, height) = image.dimensions();
  let scale = (target_size as f32 / width as f32).min(target_size as f32 / height as f32);

  let new_width = (width as f32 * scale).round() as u32;
  let new_height = (height as f32 * scale).round() as u32;
  let pad_x = (target_size - new_width) / 2;
  let pad_y = (target_size - new_height) / 2;

  // 新建画布默认全零，即黑色填充
  let mut canvas = RgbImage::new(target_size, target_size);
  let resized = imageops::resize(image, new_width, new_height, FilterType::Triangle);
  imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

  let n = target_size as usize;
  let plane = n * n;
  let mut data = vec![0.0f32; RGB_CHANNELS * plane];

  for (x, y, pixel) in canvas.enumerate_pixels() {
    let index = y as usize * n + x as usize;
    data[index] = pixel[0] as f32 / 255.0;
    data[plane + index] = pixel[1] as f32 / 255.0;
    data[2 * plane + index] = pixel[2] as f32 / 255.0;
  }

  let tensor = InputTensor {
    size: target_size,
    data: data.into_boxed_slice(),
  };
  let letterbox = Letterbox { scale, pad_x, pad_y };
  (tensor, letterbox)
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn buffer_length_and_range() {
    let image = RgbImage::from_pixel(30, 20, Rgb([255, 128, 0]));
    let (tensor, _) = preprocess(&image, 64);

    assert_eq!(tensor.len(), 3 * 64 * 64);
    assert_eq!(tensor.size(), 64);
    assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
  }

  #[test]
  fn square_input_is_identity_transform() {
    let image = RgbImage::from_pixel(64, 64, Rgb([10, 20, 30]));
    let (_, letterbox) = preprocess(&image, 64);

    assert_eq!(letterbox.scale, 1.0);
    assert_eq!(letterbox.pad_x, 0);
    assert_eq!(letterbox.pad_y, 0);
  }

  #[test]
  fn wide_image_is_padded_vertically() {
    // 1280x720 -> 640: 缩放 0.5，上下各留 140 像素黑边
    let image = RgbImage::from_pixel(1280, 720, Rgb([255, 255, 255]));
    let (tensor, letterbox) = preprocess(&image, 640);

    assert_eq!(letterbox.scale, 0.5);
    assert_eq!(letterbox.pad_x, 0);
    assert_eq!(letterbox.pad_y, 140);

    let data = tensor.as_slice();
    let plane = 640 * 640;
    // 顶部填充区域是纯黑
    assert_eq!(data[0], 0.0);
    assert_eq!(data[plane], 0.0);
    assert_eq!(data[2 * plane], 0.0);
    // 图像区域中心是白色
    let center = 320 * 640 + 320;
    assert_eq!(data[center], 1.0);
    assert_eq!(data[plane + center], 1.0);
    assert_eq!(data[2 * plane + center], 1.0);
  }

  #[test]
  fn channels_are_planar() {
    // 纯红图像：R 面全 1，G/B 面在图像区域内为 0
    let image = RgbImage::from_pixel(64, 64, Rgb([255, 0, 0]));
    let (tensor, _) = preprocess(&image, 64);

    let data = tensor.as_slice();
    let plane = 64 * 64;
    assert_eq!(data[plane / 2], 1.0);
    assert_eq!(data[plane + plane / 2], 0.0);
    assert_eq!(data[2 * plane + plane / 2], 0.0);
  }
}
