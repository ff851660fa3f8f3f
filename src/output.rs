// 该文件是 Guanshan （关山） 项目的一部分。
// src/output.rs - 输出定义
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

use image::RgbImage;
use thiserror::Error;

use crate::detection::Detection;
use crate::display::CaptureOrientation;

/// 渲染接口：把一帧图像与其检测结果写到某个输出端
pub trait Render {
  type Error;

  fn render_result(
    &mut self,
    frame: &RgbImage,
    detections: &[Detection],
  ) -> Result<(), Self::Error>;
}

#[cfg(feature = "save_image_file")]
pub mod draw;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

mod record;
pub use self::record::{JsonRecordError, JsonRecordOutput};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "save_image_file")]
  #[error("保存标注图像错误: {0}")]
  SaveImageFile(#[from] SaveImageFileError),
  #[error("JSON 记录输出错误: {0}")]
  JsonRecord(#[from] JsonRecordError),
  #[error("不支持的输出路径: {0}")]
  UnsupportedPath(String),
}

/// 按输出路径扩展名选择输出端：
/// .json 写检测记录，图像扩展名保存标注图。
pub enum OutputWrapper {
  #[cfg(feature = "save_image_file")]
  SaveImageFile(SaveImageFileOutput),
  JsonRecord(JsonRecordOutput),
}

impl OutputWrapper {
  pub fn for_path(
    path: &Path,
    display: Option<(f32, f32, CaptureOrientation)>,
  ) -> Result<Self, OutputError> {
    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_ascii_lowercase)
      .unwrap_or_default();

    match extension.as_str() {
      "json" => Ok(OutputWrapper::JsonRecord(JsonRecordOutput::create(
        path, display,
      )?)),
      #[cfg(feature = "save_image_file")]
      "jpg" | "jpeg" | "png" | "bmp" => Ok(OutputWrapper::SaveImageFile(SaveImageFileOutput::new(
        path,
      ))),
      _ => Err(OutputError::UnsupportedPath(path.display().to_string())),
    }
  }
}

impl Render for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &mut self,
    frame: &RgbImage,
    detections: &[Detection],
  ) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFile(output) => output
        .render_result(frame, detections)
        .map_err(OutputError::from),
      OutputWrapper::JsonRecord(output) => output
        .render_result(frame, detections)
        .map_err(OutputError::from),
    }
  }
}
