// 该文件是 Guanshan （关山） 项目的一部分。
// src/detector.rs - 检测流水线
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
use thiserror::Error;
use tracing::{debug, warn};

use crate::detection::{Detection, DetectionResult};
use crate::model::InferenceEngine;

pub mod decode;
pub mod nms;
pub mod preprocess;

pub use self::decode::{InvalidInputError, OutputLayout};
pub use self::preprocess::{InputTensor, Letterbox};

/// 检测器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
  pub layout: OutputLayout,
  /// 置信度阈值，低于或等于该值的候选被丢弃
  pub confidence_threshold: f32,
  /// NMS IoU 阈值
  pub iou_threshold: f32,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    Self {
      layout: OutputLayout::default(),
      confidence_threshold: 0.25,
      iou_threshold: 0.45,
    }
  }
}

#[derive(Error, Debug)]
pub enum DetectorError<E>
where
  E: std::error::Error + 'static,
{
  #[error("图像解码失败: {0}")]
  ImageDecode(#[from] image::ImageError),
  #[error("推理引擎错误: {0}")]
  Engine(#[source] E),
  #[error(transparent)]
  InvalidInput(#[from] InvalidInputError),
}

/// YOLO 目标检测器。
///
/// 推理引擎句柄由调用方构造并注入，在整个检测会话内复用；
/// 方法以 `&mut self` 运行，同一时刻只有一次推理在途。
/// 除引擎句柄与标签表之外，各帧之间不共享任何状态。
pub struct YoloDetector<E> {
  engine: E,
  config: DetectorConfig,
}

impl<E: InferenceEngine> YoloDetector<E> {
  pub fn new(engine: E) -> Self {
    Self::with_config(engine, DetectorConfig::default())
  }

  pub fn with_config(engine: E, config: DetectorConfig) -> Self {
    Self { engine, config }
  }

  pub fn config(&self) -> &DetectorConfig {
    &self.config
  }

  /// 归还引擎句柄，检测器随之失效
  pub fn into_engine(self) -> E {
    self.engine
  }

  /// 对一帧已解码图像运行完整流水线：预处理 → 推理 → 解码 → NMS。
  /// 返回原图坐标系下的最终检测列表，所有错误原样上抛。
  pub fn detect_image(
    &mut self,
    image: &RgbImage,
  ) -> Result<Vec<Detection>, DetectorError<E::Error>> {
    let (width, height) = image.dimensions();
    let n = self.config.layout.input_size;

    let (tensor, letterbox) = preprocess::preprocess(image, n);
    debug!(
      "预处理完成: {}x{} -> {}x{}, scale={:.3}, pad=({}, {})",
      width, height, n, n, letterbox.scale, letterbox.pad_x, letterbox.pad_y
    );

    let output = self.engine.infer(&tensor).map_err(DetectorError::Engine)?;
    debug!("推理输出 {} 个浮点数", output.len());

    let candidates = decode::decode(
      &output,
      self.config.layout,
      width,
      height,
      self.config.confidence_threshold,
    )?;
    debug!("解码得到 {} 个候选", candidates.len());

    let detections = nms::non_max_suppression(candidates, self.config.iou_threshold);
    debug!("NMS 后保留 {} 个检测", detections.len());

    Ok(detections)
  }

  /// 边界入口：接收 JPEG/PNG 编码的帧字节，返回展示层结果。
  ///
  /// 图像尺寸一律从解码后的位图重新推导。帧内任何错误都被吸收为
  /// “本帧无检测”并记录日志，调用方的帧循环保持存活；
  /// 只有引擎初始化失败才会在构造阶段上抛。
  pub fn detect_frame(&mut self, image_bytes: &[u8]) -> Vec<DetectionResult> {
    let image = match image::load_from_memory(image_bytes) {
      Ok(image) => image.into_rgb8(),
      Err(err) => {
        warn!("帧图像解码失败，本帧跳过: {}", err);
        return Vec::new();
      }
    };

    let (width, height) = image.dimensions();
    match self.detect_image(&image) {
      Ok(detections) => detections
        .iter()
        .map(|det| DetectionResult::new(det, width, height))
        .collect(),
      Err(err) => {
        warn!("本帧检测失败，返回空结果: {}", err);
        Vec::new()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;
  use std::io::Cursor;

  use image::{Rgb, RgbImage};

  use super::*;

  /// 固定输出的桩引擎
  struct FixedOutput(Vec<f32>);

  impl InferenceEngine for FixedOutput {
    type Error = Infallible;

    fn infer(&mut self, _input: &InputTensor) -> Result<Vec<f32>, Infallible> {
      Ok(self.0.clone())
    }
  }

  fn tiny_config() -> DetectorConfig {
    DetectorConfig {
      layout: OutputLayout {
        num_classes: 2,
        num_predictions: 2,
        input_size: 4,
      },
      confidence_threshold: 0.25,
      iou_threshold: 0.45,
    }
  }

  fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([100, 150, 200]));
    let mut bytes = Vec::new();
    image
      .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
      .unwrap();
    bytes
  }

  #[test]
  fn detect_image_runs_full_pipeline() {
    // 第一列：中心 (2,2)，宽高 2，类别 1 置信度 0.9
    let output = vec![
      2.0, 0.0, // xc
      2.0, 0.0, // yc
      2.0, 0.0, // w
      2.0, 0.0, // h
      0.1, 0.1, // 类别 0
      0.9, 0.1, // 类别 1
    ];
    let mut detector = YoloDetector::with_config(FixedOutput(output), tiny_config());

    let image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
    let detections = detector.detect_image(&image).unwrap();

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 1);
    assert_eq!(detections[0].confidence, 0.9);
    assert_eq!(detections[0].x, 1.0);
    assert_eq!(detections[0].y, 1.0);
  }

  #[test]
  fn detect_frame_stamps_source_dimensions() {
    let output = vec![
      2.0, 0.0, 2.0, 0.0, 2.0, 0.0, 2.0, 0.0, 0.8, 0.1, 0.1, 0.1,
    ];
    let mut detector = YoloDetector::with_config(FixedOutput(output), tiny_config());

    let results = detector.detect_frame(&png_bytes(8, 6));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_image_width, 8);
    assert_eq!(results[0].source_image_height, 6);
  }

  #[test]
  fn malformed_engine_output_degrades_to_empty_frame() {
    let mut detector = YoloDetector::with_config(FixedOutput(vec![0.0; 5]), tiny_config());

    let results = detector.detect_frame(&png_bytes(4, 4));
    assert!(results.is_empty());
  }

  #[test]
  fn undecodable_bytes_degrade_to_empty_frame() {
    let mut detector = YoloDetector::with_config(FixedOutput(vec![0.0; 12]), tiny_config());

    let results = detector.detect_frame(b"not an image");
    assert!(results.is_empty());
  }

  #[test]
  fn malformed_engine_output_is_invalid_input_error() {
    let mut detector = YoloDetector::with_config(FixedOutput(vec![0.0; 5]), tiny_config());

    let image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
    let err = detector.detect_image(&image).unwrap_err();
    assert!(matches!(
      err,
      DetectorError::InvalidInput(InvalidInputError {
        expected: 12,
        actual: 5
      })
    ));
  }
}
