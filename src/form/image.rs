//! Image attachments for multipart forms.

use std::path::Path;

use crate::api::MultipartForm;

/// Largest accepted upload
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// A local image read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
  pub file_name: String,
  pub mime: &'static str,
  pub bytes: Vec<u8>,
}

/// Mime type for an image file extension
pub fn image_mime(path: &Path) -> Option<&'static str> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  Some(match ext.as_str() {
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "svg" => "image/svg+xml",
    "avif" => "image/avif",
    _ => return None,
  })
}

impl ImageUpload {
  /// Read and check an image file. The error is the message to show.
  pub fn load(path: &Path) -> Result<Self, String> {
    let mime = image_mime(path).ok_or_else(|| "Please upload an image file".to_string())?;

    let meta =
      std::fs::metadata(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    if !meta.is_file() {
      return Err(format!("{} is not a file", path.display()));
    }
    if meta.len() > MAX_IMAGE_BYTES {
      return Err("Image size must be less than 5MB".to_string());
    }

    let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "image".to_string());

    Ok(Self {
      file_name,
      mime,
      bytes,
    })
  }
}

/// Image picker state: the typed path and what loading it produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageField {
  path: String,
  loaded: Option<Result<ImageUpload, String>>,
}

impl ImageField {
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Point at a new file and load it. An empty path clears the field.
  pub fn set_path(&mut self, path: &str) {
    let path = path.trim();
    if path == self.path && self.loaded.is_some() {
      return;
    }
    self.path = path.to_string();
    self.loaded = if path.is_empty() {
      None
    } else {
      Some(ImageUpload::load(Path::new(&expand_home(path))))
    };
  }

  pub fn upload(&self) -> Option<&ImageUpload> {
    self.loaded.as_ref().and_then(|r| r.as_ref().ok())
  }

  /// Validation message; `required` demands a file
  pub fn error(&self, required: bool) -> Option<String> {
    match &self.loaded {
      Some(Err(e)) => Some(e.clone()),
      Some(Ok(_)) => None,
      None if required => Some("Image is required".to_string()),
      None => None,
    }
  }

  /// Append the file part when an image was chosen
  pub fn attach(&self, form: MultipartForm, part: &str) -> MultipartForm {
    match self.upload() {
      Some(image) => form.file(part, &image.file_name, image.mime, image.bytes.clone()),
      None => form,
    }
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }
}

fn expand_home(path: &str) -> String {
  match path.strip_prefix("~/") {
    Some(rest) => dirs::home_dir()
      .map(|home| home.join(rest).to_string_lossy().into_owned())
      .unwrap_or_else(|| path.to_string()),
    None => path.to_string(),
  }
}
