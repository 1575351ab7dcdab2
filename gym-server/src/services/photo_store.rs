//! 照片存储
//!
//! 自助签到/签退的照片凭证落在本地照片目录，统一转成 JPG，
//! 文件名取压缩后内容的 SHA-256 (同一张照片只存一份)。
//! 返回的 URL 是稳定的不透明字符串，直接写进考勤记录。

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Maximum photo size (5MB)
const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// JPEG quality for evidence photos
const JPEG_QUALITY: u8 = 85;

#[derive(Clone, Debug)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 校验 + 压缩 + 落盘，返回 `/photos/{hash}.jpg`
    pub fn store(&self, data: &[u8]) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::validation("Empty photo provided"));
        }
        if data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::validation(format!(
                "Photo too large. Maximum size is {}MB",
                MAX_PHOTO_SIZE / 1024 / 1024
            )));
        }

        let img = image::load_from_memory(data)
            .map_err(|e| AppError::validation(format!("Invalid image: {}", e)))?;

        let mut compressed = Vec::new();
        {
            let mut cursor = Cursor::new(&mut compressed);
            let rgb = img.to_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
            rgb.write_with_encoder(encoder)
                .map_err(|e| AppError::internal(format!("Failed to compress photo: {}", e)))?;
        }

        let mut hasher = Sha256::new();
        hasher.update(&compressed);
        let hash = hex::encode(hasher.finalize());
        let filename = format!("{}.jpg", hash);
        let path = self.dir.join(&filename);

        if path.exists() {
            tracing::debug!(file = %filename, "Duplicate photo, reusing stored file");
        } else {
            fs::create_dir_all(&self.dir)
                .map_err(|e| AppError::internal(format!("Failed to create photo dir: {}", e)))?;
            // 临时文件 + rename，避免半写文件被当成有效照片读走
            let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
            fs::write(&tmp, &compressed)
                .map_err(|e| AppError::internal(format!("Failed to save photo: {}", e)))?;
            fs::rename(&tmp, &path)
                .map_err(|e| AppError::internal(format!("Failed to finalize photo: {}", e)))?;
        }

        Ok(format!("/photos/{}", filename))
    }

    /// 读取一张已存照片 (文件名已经过 handler 的路径检查)
    pub async fn read(&self, filename: &str) -> Option<Vec<u8>> {
        tokio::fs::read(self.dir.join(filename)).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([120, 30, 200]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn store_returns_stable_url_for_same_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().to_path_buf());
        let data = sample_png();

        let first = store.store(&data).unwrap();
        let second = store.store(&data).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("/photos/"));
        assert!(first.ends_with(".jpg"));

        // 同内容只落一个文件
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn store_rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().to_path_buf());
        assert!(store.store(b"definitely not an image").is_err());
        assert!(store.store(b"").is_err());
    }
}
