// 该文件是 Guanshan （关山） 项目的一部分。
// src/detector/nms.rs - 非极大值抑制
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

use std::cmp::Ordering;

use crate::detection::Detection;

/// 计算两个检测框的交并比，并集为零时返回 0
pub fn iou(a: &Detection, b: &Detection) -> f32 {
  let x1 = a.x.max(b.x);
  let y1 = a.y.max(b.y);
  let x2 = a.x_max().min(b.x_max());
  let y2 = a.y_max().min(b.y_max());

  let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
  let union = a.area() + b.area() - intersection;

  if union > 0.0 { intersection / union } else { 0.0 }
}

/// 贪心非极大值抑制。
///
/// 先按置信度稳定降序排序（同分保持原有顺序），再用抑制标记数组
/// 逐个筛选：保留的框会抑制其后所有同类别且 IoU 超过阈值的框，
/// 不同类别之间互不抑制。
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
  detections.sort_by(|a, b| {
    b.confidence
      .partial_cmp(&a.confidence)
      .unwrap_or(Ordering::Equal)
  });

  let mut suppressed = vec![false; detections.len()];
  for i in 0..detections.len() {
    if suppressed[i] {
      continue;
    }
    for j in (i + 1)..detections.len() {
      if suppressed[j] || detections[j].class_id != detections[i].class_id {
        continue;
      }
      if iou(&detections[i], &detections[j]) > iou_threshold {
        suppressed[j] = true;
      }
    }
  }

  let mut index = 0;
  detections.retain(|_| {
    let keep = !suppressed[index];
    index += 1;
    keep
  });
  detections
}
