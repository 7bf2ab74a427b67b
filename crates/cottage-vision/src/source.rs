//! Where an inspection image came from.

use base64::Engine;
use cottage_protocol::{CottageResult, InspectionError};

/// The two ways a client can submit a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Multipart upload (`file` field).
    UploadedFile { file_name: String, bytes: Vec<u8> },
    /// Camera capture sent as a `data:image/...;base64,` URL (`image_data` field).
    DataUrl(String),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::UploadedFile { .. } => "upload",
            ImageSource::DataUrl(_) => "capture",
        }
    }

    /// Client-side name of an uploaded file.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ImageSource::UploadedFile { file_name, .. } => Some(file_name),
            ImageSource::DataUrl(_) => None,
        }
    }

    /// Validate the source and return the raw encoded image bytes.
    pub fn into_bytes(self) -> CottageResult<Vec<u8>> {
        match self {
            ImageSource::UploadedFile { bytes, .. } if bytes.is_empty() => {
                Err(InspectionError::NoImage)
            }
            ImageSource::UploadedFile { bytes, .. } => Ok(bytes),
            ImageSource::DataUrl(data_url) if data_url.trim().is_empty() => {
                Err(InspectionError::NoImage)
            }
            ImageSource::DataUrl(data_url) => decode_data_url(&data_url),
        }
    }
}

/// Decode the base64 payload of a data URL. A bare base64 string (no
/// `data:...,` prefix) is accepted as well.
pub fn decode_data_url(data_url: &str) -> CottageResult<Vec<u8>> {
    let payload = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|error| InspectionError::InvalidDataUrl(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_url_payload() {
        let bytes = decode_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(bytes[0], 0xFF);
    }

    #[test]
    fn decodes_bare_base64() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"cottage");
        assert_eq!(decode_data_url(&raw).unwrap(), b"cottage");
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_data_url("data:image/png;base64,not-valid!!!").unwrap_err();
        assert!(matches!(err, InspectionError::InvalidDataUrl(_)));
    }

    #[test]
    fn empty_sources_mean_no_image() {
        let upload = ImageSource::UploadedFile {
            file_name: "wall.jpg".to_owned(),
            bytes: Vec::new(),
        };
        assert!(matches!(upload.into_bytes(), Err(InspectionError::NoImage)));
        assert!(matches!(
            ImageSource::DataUrl("  ".to_owned()).into_bytes(),
            Err(InspectionError::NoImage)
        ));
    }

    #[test]
    fn upload_passes_bytes_through() {
        let upload = ImageSource::UploadedFile {
            file_name: "wall.jpg".to_owned(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(upload.kind(), "upload");
        assert_eq!(upload.file_name(), Some("wall.jpg"));
        assert_eq!(ImageSource::DataUrl("data:,".to_owned()).file_name(), None);
        assert_eq!(upload.into_bytes().unwrap(), vec![1, 2, 3]);
    }
}
