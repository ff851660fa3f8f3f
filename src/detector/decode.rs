// 该文件是 Guanshan （关山） 项目的一部分。
// src/detector/decode.rs - 模型输出解码
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

use thiserror::Error;

use crate::detection::Detection;
use crate::labels;

/// 原始输出张量的布局：(4 + 类别数) × 预测数，按通道行排列。
/// 前四行是框中心 x、中心 y、宽、高（模型输入像素单位），
/// 其余每行是一个类别在所有预测列上的置信度。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLayout {
  pub num_classes: usize,
  pub num_predictions: usize,
  /// 模型输入方形边长 N
  pub input_size: u32,
}

impl Default for OutputLayout {
  fn default() -> Self {
    Self {
      num_classes: labels::NUM_CLASSES,
      num_predictions: 8400,
      input_size: 640,
    }
  }
}

impl OutputLayout {
  pub fn expected_len(&self) -> usize {
    (4 + self.num_classes) * self.num_predictions
  }
}

/// 输出张量长度与布局不符
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("输出张量长度无效: 期望 {expected}, 实际 {actual}")]
pub struct InvalidInputError {
  pub expected: usize,
  pub actual: usize,
}

/// 把推理引擎的原始输出解析为原图坐标系下的候选检测。
///
/// 每个预测列取类别置信度的最大值（严格大于，同分取先出现的类别），
/// 超过阈值的列转换为左上角矩形并按 原图尺寸/N 逐轴缩放。
/// 候选顺序与预测列下标一致，不做排序。
pub fn decode(
  output: &[f32],
  layout: OutputLayout,
  original_width: u32,
  original_height: u32,
  confidence_threshold: f32,
) -> Result<Vec<Detection>, InvalidInputError> {
  let expected = layout.expected_len();
  if output.len() != expected {
    return Err(InvalidInputError {
      expected,
      actual: output.len(),
    });
  }

  let np = layout.num_predictions;
  // 逐轴缩放回原图，不叠加 letterbox 填充的逆变换
  let scale_x = original_width as f32 / layout.input_size as f32;
  let scale_y = original_height as f32 / layout.input_size as f32;

  let mut detections = Vec::new();
  for i in 0..np {
    let xc = output[i];
    let yc = output[np + i];
    let w = output[2 * np + i];
    let h = output[3 * np + i];

    let mut max_score = 0.0f32;
    let mut class_id = 0usize;
    for c in 0..layout.num_classes {
      let score = output[(4 + c) * np + i];
      if score > max_score {
        max_score = score;
        class_id = c;
      }
    }

    if max_score <= confidence_threshold {
      continue;
    }

    detections.push(Detection {
      x: (xc - w / 2.0) * scale_x,
      y: (yc - h / 2.0) * scale_y,
      width: w * scale_x,
      height: h * scale_y,
      confidence: max_score,
      class_id,
      label: labels::label_of(class_id),
    });
  }

  Ok(detections)
}

#[cfg(test)]
mod tests {
  use super::*;

  const LAYOUT: OutputLayout = OutputLayout {
    num_classes: 2,
    num_predictions: 3,
    input_size: 100,
  };

  /// 按 (4+类别数)×预测数 的行排列构造输出缓冲
  fn buffer(rows: &[[f32; 3]]) -> Vec<f32> {
    rows.iter().flatten().copied().collect()
  }

  #[test]
  fn wrong_length_is_rejected() {
    let err = decode(&[0.0; 17], LAYOUT, 100, 100, 0.25).unwrap_err();
    assert_eq!(
      err,
      InvalidInputError {
        expected: 18,
        actual: 17
      }
    );
  }

  #[test]
  fn below_threshold_candidates_are_dropped() {
    let output = buffer(&[
      [50.0, 50.0, 50.0], // xc
      [50.0, 50.0, 50.0], // yc
      [20.0, 20.0, 20.0], // w
      [20.0, 20.0, 20.0], // h
      [0.10, 0.90, 0.25], // 类别 0
      [0.05, 0.10, 0.10], // 类别 1
    ]);

    let detections = decode(&output, LAYOUT, 100, 100, 0.25).unwrap();
    // 只有第二列超过阈值；第三列正好等于阈值，同样被丢弃
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 0);
    assert_eq!(detections[0].confidence, 0.90);
  }

  #[test]
  fn all_scores_below_threshold_yield_empty() {
    let output = buffer(&[
      [50.0, 50.0, 50.0],
      [50.0, 50.0, 50.0],
      [20.0, 20.0, 20.0],
      [20.0, 20.0, 20.0],
      [0.10, 0.10, 0.10],
      [0.10, 0.10, 0.10],
    ]);

    let detections = decode(&output, LAYOUT, 100, 100, 0.25).unwrap();
    assert!(detections.is_empty());
  }

  #[test]
  fn argmax_ties_take_first_class() {
    let output = buffer(&[
      [50.0, 0.0, 0.0],
      [50.0, 0.0, 0.0],
      [20.0, 0.0, 0.0],
      [20.0, 0.0, 0.0],
      [0.80, 0.0, 0.0],
      [0.80, 0.0, 0.0],
    ]);

    let detections = decode(&output, LAYOUT, 100, 100, 0.25).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 0);
  }

  #[test]
  fn boxes_are_rescaled_per_axis() {
    // 原图 200x50，N=100：x 轴放大 2 倍，y 轴缩小一半
    let output = buffer(&[
      [50.0, 0.0, 0.0],
      [40.0, 0.0, 0.0],
      [20.0, 0.0, 0.0],
      [10.0, 0.0, 0.0],
      [0.90, 0.0, 0.0],
      [0.10, 0.0, 0.0],
    ]);

    let detections = decode(&output, LAYOUT, 200, 50, 0.25).unwrap();
    assert_eq!(detections.len(), 1);
    let det = &detections[0];
    assert_eq!(det.x, (50.0 - 10.0) * 2.0);
    assert_eq!(det.y, (40.0 - 5.0) * 0.5);
    assert_eq!(det.width, 40.0);
    assert_eq!(det.height, 5.0);
    assert_eq!(det.label, "person");
  }

  #[test]
  fn decoding_is_deterministic_and_index_ordered() {
    let output = buffer(&[
      [10.0, 50.0, 90.0],
      [10.0, 50.0, 90.0],
      [10.0, 10.0, 10.0],
      [10.0, 10.0, 10.0],
      [0.30, 0.90, 0.50],
      [0.10, 0.10, 0.10],
    ]);

    let first = decode(&output, LAYOUT, 100, 100, 0.25).unwrap();
    let second = decode(&output, LAYOUT, 100, 100, 0.25).unwrap();
    assert_eq!(first, second);
    // 候选顺序与预测列一致，而不是按置信度
    let confidences: Vec<f32> = first.iter().map(|d| d.confidence).collect();
    assert_eq!(confidences, vec![0.30, 0.90, 0.50]);
  }
}
