//! Image selection. Only files with an image MIME type are accepted.

use std::path::{Path, PathBuf};

pub const SAMPLE_IMAGE_NAME: &str = "sample-microscopy.jpg";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("'{0}' is not an image file")]
    NotAnImage(String),
    #[error("image file '{0}' does not exist")]
    Missing(PathBuf),
}

/// MIME type implied by a file name's extension, if it is an image type.
pub fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// An accepted image: its display name and a reference the views can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub name: String,
    pub url: String,
    pub mime_type: &'static str,
}

impl ImageSource {
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type =
            image_mime_type(&name).ok_or_else(|| UploadError::NotAnImage(name.clone()))?;
        if !path.is_file() {
            return Err(UploadError::Missing(path.to_path_buf()));
        }
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Ok(Self {
            name,
            url: format!("file://{}", absolute.display()),
            mime_type,
        })
    }

    /// Filesystem path behind a `file://` url; `None` for the sample and remote urls.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.url.strip_prefix("file://").map(PathBuf::from)
    }

    /// The bundled sample image used when no file is chosen.
    pub fn sample() -> Self {
        Self {
            name: SAMPLE_IMAGE_NAME.to_string(),
            url: format!("assets/{SAMPLE_IMAGE_NAME}"),
            mime_type: "image/jpeg",
        }
    }
}
