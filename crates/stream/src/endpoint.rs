use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use anonymizer_core::service::AnonymizerService;
use anonymizer_core::shared::frame::Frame;
use anonymizer_core::shared::settings::AnonymizationSettings;
use anonymizer_core::video::image_codec::encode_jpeg;

use crate::error::StreamError;

/// Anonymized frame as it comes back from the endpoint.
#[derive(Clone, Debug)]
pub struct FrameReply {
    pub image: Vec<u8>,
    pub face_count: usize,
}

/// Where captured frames are sent for anonymization.
///
/// `submit` is called from per-tick worker threads; implementations must be
/// safe to share. Any failure maps to `StreamError::Network` so the caller
/// can log it and keep ticking.
pub trait FrameEndpoint: Send + Sync {
    fn submit(
        &self,
        frame: &Frame,
        settings: &AnonymizationSettings,
    ) -> Result<FrameReply, StreamError>;
}

#[derive(Deserialize)]
struct WireReply {
    image: String,
    face_count: usize,
}

/// Remote endpoint: multipart POST of a JPEG-encoded frame, JSON reply with
/// the anonymized image as a base64 data URL.
pub struct HttpEndpoint {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
        }
    }
}

impl FrameEndpoint for HttpEndpoint {
    fn submit(
        &self,
        frame: &Frame,
        settings: &AnonymizationSettings,
    ) -> Result<FrameReply, StreamError> {
        let jpeg = encode_jpeg(frame).map_err(|e| StreamError::Network(e.to_string()))?;

        let part = reqwest::blocking::multipart::Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| StreamError::Network(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("method", settings.method.to_string())
            .text("intensity", settings.intensity().to_string());

        let reply: WireReply = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| StreamError::Network(e.to_string()))?;

        Ok(FrameReply {
            image: decode_data_url(&reply.image)?,
            face_count: reply.face_count,
        })
    }
}

/// In-process endpoint: hands frames straight to the core service, skipping
/// the wire. Useful for demos and tests without a server.
pub struct LocalEndpoint {
    service: AnonymizerService,
}

impl LocalEndpoint {
    pub fn new(service: AnonymizerService) -> Self {
        Self { service }
    }
}

impl FrameEndpoint for LocalEndpoint {
    fn submit(
        &self,
        frame: &Frame,
        settings: &AnonymizationSettings,
    ) -> Result<FrameReply, StreamError> {
        let jpeg = encode_jpeg(frame).map_err(|e| StreamError::Network(e.to_string()))?;
        let response = self
            .service
            .process_frame(&jpeg, settings)
            .map_err(|e| StreamError::Network(e.to_string()))?;
        Ok(FrameReply {
            image: response.image,
            face_count: response.face_count,
        })
    }
}

fn decode_data_url(value: &str) -> Result<Vec<u8>, StreamError> {
    let payload = value
        .split_once("base64,")
        .map(|(_, payload)| payload)
        .ok_or_else(|| StreamError::Network("reply image is not a base64 data URL".into()))?;
    BASE64
        .decode(payload)
        .map_err(|e| StreamError::Network(format!("reply image payload is not base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anonymizer_core::artifact::store::ArtifactStore;
    use anonymizer_core::detection::face_detector::FaceDetector;
    use anonymizer_core::shared::error::AnonymizeError;
    use anonymizer_core::shared::region::FaceRegion;
    use anonymizer_core::shared::settings::Method;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StubDetector;

    impl FaceDetector for StubDetector {
        fn detect(&self, _frame: &Frame) -> Result<Vec<FaceRegion>, AnonymizeError> {
            Ok(vec![FaceRegion::new(1, 1, 4, 4, 0.9)])
        }
    }

    #[test]
    fn test_decode_data_url_roundtrip() {
        let url = format!("data:image/jpeg;base64,{}", BASE64.encode(b"jpegbytes"));
        assert_eq!(decode_data_url(&url).unwrap(), b"jpegbytes");
    }

    #[test]
    fn test_decode_data_url_rejects_plain_text() {
        assert!(matches!(
            decode_data_url("not a data url").unwrap_err(),
            StreamError::Network(_)
        ));
    }

    #[test]
    fn test_decode_data_url_rejects_bad_payload() {
        assert!(matches!(
            decode_data_url("data:image/jpeg;base64,@@@").unwrap_err(),
            StreamError::Network(_)
        ));
    }

    #[test]
    fn test_local_endpoint_returns_face_count() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("artifacts")).unwrap();
        let endpoint = LocalEndpoint::new(AnonymizerService::new(Arc::new(StubDetector), store));

        let frame = Frame::new(vec![128u8; 8 * 8 * 3], 8, 8, 3, 0);
        let settings = AnonymizationSettings::new(Method::Pixelate, 40, 10);

        let reply = endpoint.submit(&frame, &settings).unwrap();
        assert_eq!(reply.face_count, 1);
        assert!(!reply.image.is_empty());
    }
}
