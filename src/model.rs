// 该文件是 Guanshan （关山） 项目的一部分。
// src/model.rs - 推理引擎抽象
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

use crate::detector::preprocess::InputTensor;

/// 推理引擎抽象：输入预处理张量，返回原始输出张量。
///
/// 引擎句柄是长生命周期资源，由调用方显式构造、注入并持有；
/// `&mut self` 使推理调用天然串行，没有超时，也不可中途取消。
pub trait InferenceEngine {
  type Error: std::error::Error + Send + Sync + 'static;

  fn infer(&mut self, input: &InputTensor) -> Result<Vec<f32>, Self::Error>;
}

#[cfg(feature = "ort_engine")]
mod ort;
#[cfg(feature = "ort_engine")]
pub use self::ort::{OrtEngine, OrtEngineError};
