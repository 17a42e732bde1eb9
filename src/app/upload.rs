use std::path::PathBuf;
use std::fs;
use tokio::io;
use log::info;
use uuid::Uuid;
use crate::utils::text_utils::sanitize_file_name;

// Stores uploaded images in a directory on disk. The
// directory is created if missing, and we crash on start
// when it's not writable rather than on the first upload.
pub struct UploadService {
  upload_dir: PathBuf,
  max_size: usize
}

impl UploadService {

  pub fn open(
    path: &str,
    max_size: usize
  ) -> Result<Self, io::Error> {
    let upload_dir = PathBuf::from(path);
    if !upload_dir.exists() {
      info!("Creating upload directory {:?}", upload_dir);
      fs::create_dir_all(&upload_dir)?;
    }
    let read_only = upload_dir.metadata()?.permissions().readonly();
    let is_dir = upload_dir.is_dir();
    match (read_only, is_dir) {
      (false, true) => Ok(Self {
        upload_dir,
        max_size
      }),
      _ => Err(
        io::Error::new(
          io::ErrorKind::PermissionDenied,
          "Upload directory is not writable"
        )
      )
    }
  }

  pub fn max_size(&self) -> usize {
    self.max_size
  }

  // Name the file will be stored under. The random prefix
  // keeps two uploads of "banner.jpg" apart.
  pub fn stored_name(original_name: &str) -> String {
    format!(
      "{}-{}",
      Uuid::new_v4().to_simple(),
      sanitize_file_name(original_name)
    )
  }

  // Returns the name the file was saved under.
  pub async fn save(
    &self,
    original_name: &str,
    data: &[u8]
  ) -> Result<String, io::Error> {
    let name = Self::stored_name(original_name);
    tokio::fs::write(self.upload_dir.join(&name), data).await?;
    info!("Saved upload {} ({} bytes)", name, data.len());
    Ok(name)
  }

  // Only names we could have generated are looked up, which
  // also keeps "../" out.
  pub async fn read(
    &self,
    name: &str
  ) -> Option<Vec<u8>> {
    if name.is_empty() || sanitize_file_name(name) != name {
      return None;
    }
    tokio::fs::read(self.upload_dir.join(name)).await.ok()
  }

}

pub fn content_type_for(name: &str) -> &'static str {
  let ext = name.rsplit('.').next()
    .unwrap_or("")
    .to_lowercase();
  match ext.as_str() {
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "svg" => "image/svg+xml",
    "avif" => "image/avif",
    _ => "application/octet-stream"
  }
}

// SVG can carry scripts, it's only served as a download.
// So is anything that isn't an image.
pub fn served_inline(content_type: &str) -> bool {
  content_type.starts_with("image/") && content_type != "image/svg+xml"
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("azul360-{}-{}", name, Uuid::new_v4().to_simple()))
  }

  #[test]
  fn stored_name_keeps_sanitized_original() {
    let name = UploadService::stored_name("minha foto.png");
    assert!(name.ends_with("-minha_foto.png"));
    // 32 hex chars, the dash, then the name:
    assert_eq!(32 + 1 + "minha_foto.png".len(), name.len());
  }

  #[test]
  fn open_creates_missing_directory() {
    let dir = temp_dir("open");
    let service = UploadService::open(dir.to_str().unwrap(), 10).unwrap();
    assert!(dir.is_dir());
    assert_eq!(10, service.max_size());
    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn open_refuses_a_file() {
    let dir = temp_dir("file");
    fs::write(&dir, b"not a directory").unwrap();
    assert!(UploadService::open(dir.to_str().unwrap(), 10).is_err());
    fs::remove_file(&dir).unwrap();
  }

  #[tokio::test]
  async fn saved_file_can_be_read_back() {
    let dir = temp_dir("save");
    let service = UploadService::open(dir.to_str().unwrap(), 1024).unwrap();
    let name = service.save("banner.jpg", b"jpeg bytes").await.unwrap();
    assert_eq!(Some(b"jpeg bytes".to_vec()), service.read(&name).await);
    assert_eq!(None, service.read("../banner.jpg").await);
    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn content_types_from_extension() {
    assert_eq!("image/jpeg", content_type_for("x-FOTO.JPG"));
    assert_eq!("image/png", content_type_for("a.png"));
    assert_eq!("application/octet-stream", content_type_for("noext"));
  }

  #[test]
  fn only_raster_images_are_inline() {
    assert!(served_inline(content_type_for("a.webp")));
    assert!(!served_inline(content_type_for("logo.svg")));
    assert!(!served_inline(content_type_for("noext")));
  }
}
