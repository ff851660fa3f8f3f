// 该文件是 Guanshan （关山） 项目的一部分。
// src/output/save_image_file.rs - 标注图像文件输出
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use super::Render;
use super::draw::draw_detections_on_image;
use crate::detection::Detection;

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("图像保存失败: {0}")]
  Save(#[from] image::ImageError),
}

/// 把每帧画上检测框后保存为图像文件。
/// 多帧时在文件名后追加帧号。
pub struct SaveImageFileOutput {
  path: PathBuf,
  frame_index: usize,
}

impl SaveImageFileOutput {
  pub fn new(path: &Path) -> Self {
    Self {
      path: path.to_path_buf(),
      frame_index: 0,
    }
  }

  fn frame_path(&self) -> PathBuf {
    if self.frame_index == 0 {
      return self.path.clone();
    }

    let stem = self
      .path
      .file_stem()
      .and_then(|stem| stem.to_str())
      .unwrap_or("frame");
    let extension = self
      .path
      .extension()
      .and_then(|ext| ext.to_str())
      .unwrap_or("png");
    self
      .path
      .with_file_name(format!("{}_{}.{}", stem, self.frame_index, extension))
  }
}

impl Render for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(
    &mut self,
    frame: &RgbImage,
    detections: &[Detection],
  ) -> Result<(), Self::Error> {
    let mut annotated = frame.clone();
    draw_detections_on_image(&mut annotated, detections);

    let path = self.frame_path();
    annotated.save(&path)?;
    info!("已保存标注图像: {}", path.display());

    self.frame_index += 1;
    Ok(())
  }
}
