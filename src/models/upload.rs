use image::ImageFormat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ClientError, ClientResult};

/// Body of the `uploadImageUrl` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest<'a> {
    pub upload_type: &'static str,
    pub size: usize,
    pub content_type: &'a str,
}

impl<'a> UploadRequest<'a> {
    pub fn new(size: usize, content_type: &'a str) -> Self {
        Self {
            upload_type: "imageUrl",
            size,
            content_type,
        }
    }
}

/// Pre-signed, single-use upload slot issued by LightX.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTarget {
    /// PUT target for the raw bytes
    #[serde(rename = "uploadImage")]
    pub upload_url: String,

    /// URL the uploaded image is readable at once the PUT succeeds
    #[serde(rename = "imageUrl")]
    pub public_url: String,

    #[serde(rename = "size", default)]
    pub max_bytes: u64,
}

/// Image MIME types accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
pub enum ContentType {
    #[default]
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    #[strum(serialize = "image/png")]
    Png,
    #[strum(serialize = "image/webp")]
    Webp,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Jpeg => "image/jpeg",
            ContentType::Png => "image/png",
            ContentType::Webp => "image/webp",
        }
    }

    /// Detect the content type from the image's magic bytes.
    pub fn sniff(bytes: &[u8]) -> ClientResult<Self> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Jpeg) => Ok(ContentType::Jpeg),
            Ok(ImageFormat::Png) => Ok(ContentType::Png),
            Ok(ImageFormat::WebP) => Ok(ContentType::Webp),
            Ok(other) => Err(ClientError::invalid_input(format!(
                "unsupported image format {other:?}"
            ))),
            Err(_) => Err(ClientError::invalid_input("unrecognized image data")),
        }
    }
}
