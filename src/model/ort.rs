// 该文件是 Guanshan （关山） 项目的一部分。
// src/model/ort.rs - ONNX Runtime 推理引擎
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

use std::path::Path;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::InferenceEngine;
use crate::detector::preprocess::InputTensor;

#[derive(Error, Debug)]
pub enum OrtEngineError {
  #[error("模型会话初始化失败: {0}")]
  Init(#[source] ort::Error),
  #[error("推理执行失败: {0}")]
  Run(#[source] ort::Error),
  #[error("输入张量形状错误: {0}")]
  InputShape(#[from] ndarray::ShapeError),
}

/// ONNX Runtime 推理引擎。
///
/// 会话在构造时从模型文件一次性加载，初始化失败直接上抛；
/// 之后同一个会话在所有帧之间复用。
pub struct OrtEngine {
  session: Session,
  input_name: String,
  output_name: String,
}

impl OrtEngine {
  pub fn from_model_file(model_path: &Path) -> Result<Self, OrtEngineError> {
    info!("加载 ONNX 模型: {}", model_path.display());

    let session = Session::builder()
      .map_err(OrtEngineError::Init)?
      .commit_from_file(model_path)
      .map_err(OrtEngineError::Init)?;

    let input_name = session
      .inputs()
      .first()
      .map(|input| input.name().to_string())
      .unwrap_or_else(|| "images".to_string());
    let output_name = session
      .outputs()
      .first()
      .map(|output| output.name().to_string())
      .unwrap_or_else(|| "output0".to_string());

    debug!("模型输入: {}, 输出: {}", input_name, output_name);
    info!("模型加载完成");

    Ok(Self {
      session,
      input_name,
      output_name,
    })
  }
}

impl InferenceEngine for OrtEngine {
  type Error = OrtEngineError;

  fn infer(&mut self, input: &InputTensor) -> Result<Vec<f32>, OrtEngineError> {
    let n = input.size() as usize;
    let array = Array4::from_shape_vec((1, 3, n, n), input.as_slice().to_vec())?;
    let value = Value::from_array(array).map_err(OrtEngineError::Run)?;

    debug!("执行模型推理");
    let outputs = self
      .session
      .run(ort::inputs![self.input_name.as_str() => value])
      .map_err(OrtEngineError::Run)?;

    let (_, data) = outputs[self.output_name.as_str()]
      .try_extract_tensor::<f32>()
      .map_err(OrtEngineError::Run)?;
    Ok(data.to_vec())
  }
}
