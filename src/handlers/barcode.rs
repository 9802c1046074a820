//! Barcode image handler.
//!
//! # Responsibilities
//! - Turn route captures and query parameters into an [`ImageRequest`]
//! - Answer conditional requests from the cache token alone
//! - Encode, scale and rasterize the symbol on a cache miss
//!
//! # Design Decisions
//! - Malformed numbers degrade to zero/defaults instead of failing
//! - Encoding failures are client errors (400) carrying the encoder message
//! - Scaling failures fall back to the unscaled symbol
//! - Unknown symbology or format values fail closed with 400

use std::sync::Arc;

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use thiserror::Error;

use super::etag::CacheToken;
use super::params::parse_int_or_default;
use crate::config::CacheConfig;
use crate::http::response;
use crate::raster::{ImageRaster, OutputFormat, RasterEncoder, RasterError};
use crate::routing::{Params, RouteHandler};
use crate::symbology::{
    BarModel, BuiltinEncoder, EncodeError, EncodeOptions, SymbolEncoder, Symbology,
};

/// Route pattern served by [`BarcodeHandler`].
pub const BARCODE_PATTERN: &str =
    r"/barcode/(code39|code128|ean|pdf417)/([0-9]+)x([0-9]+)/([^/]+)\.(gif|jpg|png)";

/// Query parameter selecting the PDF417 security level.
pub const SECURITY_LEVEL_PARAM: &str = "securityLevel";

/// Errors raised while building an [`ImageRequest`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("missing route parameter {0}")]
    MissingParam(usize),

    #[error(transparent)]
    Symbology(#[from] EncodeError),

    #[error(transparent)]
    Format(#[from] RasterError),

    #[error("payload text is not valid UTF-8")]
    InvalidText,
}

/// A validated barcode image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub symbology: Symbology,
    pub width: u32,
    pub height: u32,
    pub text: String,
    pub format: OutputFormat,
    pub options: EncodeOptions,
}

impl ImageRequest {
    /// Build from positional captures
    /// (symbology, width, height, text, format) and the raw query string.
    pub fn from_params(params: &Params, query: Option<&str>) -> Result<Self, RequestError> {
        let param = |index: usize| params.get(index).ok_or(RequestError::MissingParam(index));

        let symbology: Symbology = param(0)?.parse()?;
        let width = parse_int_or_default::<u32>(param(1)?);
        let height = parse_int_or_default::<u32>(param(2)?);
        let text = percent_decode_str(param(3)?)
            .decode_utf8()
            .map_err(|_| RequestError::InvalidText)?
            .into_owned();
        let format: OutputFormat = param(4)?.parse()?;

        let security_level = match symbology {
            Symbology::Pdf417 => query
                .and_then(|q| query_value(q, SECURITY_LEVEL_PARAM))
                .filter(|value| !value.is_empty())
                .map(|value| parse_int_or_default::<i64>(&value))
                .unwrap_or_default(),
            Symbology::Code39 | Symbology::Code128 | Symbology::Ean => 0,
        };

        Ok(Self {
            symbology,
            width,
            height,
            text,
            format,
            options: EncodeOptions { security_level },
        })
    }
}

/// First value of `key` in a URL query string.
fn query_value(query: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Scale `model`, keeping it unscaled when the requested size cannot be honored.
pub fn scale_or_unscaled(model: BarModel, width: u32, height: u32) -> BarModel {
    match model.scale(width, height) {
        Ok(scaled) => scaled,
        Err(e) => {
            tracing::debug!(error = %e, width, height, "Serving unscaled symbol");
            model
        }
    }
}

/// Serves barcode images with ETag-based conditional responses.
pub struct BarcodeHandler {
    encoder: Arc<dyn SymbolEncoder>,
    raster: Arc<dyn RasterEncoder>,
    cache_control: HeaderValue,
}

impl BarcodeHandler {
    pub fn new(cache: &CacheConfig) -> Self {
        Self::with_encoders(cache, BuiltinEncoder, ImageRaster)
    }

    pub fn with_encoders(
        cache: &CacheConfig,
        encoder: impl SymbolEncoder + 'static,
        raster: impl RasterEncoder + 'static,
    ) -> Self {
        let cache_control = HeaderValue::from_str(&format!("max-age={}", cache.max_age_secs))
            .unwrap_or_else(|_| HeaderValue::from_static("max-age=2592000"));
        Self {
            encoder: Arc::new(encoder),
            raster: Arc::new(raster),
            cache_control,
        }
    }

    /// Produce the response for an already validated request.
    pub fn render(&self, request: &ImageRequest, if_none_match: Option<&HeaderValue>) -> Response {
        let token = CacheToken::for_request(request);

        if if_none_match.is_some_and(|value| token.matches(value)) {
            tracing::debug!(etag = %token, "Cache hit");
            return response::not_modified();
        }

        let model = match self
            .encoder
            .encode(request.symbology, &request.text, &request.options)
        {
            Ok(model) => model,
            Err(e) => {
                tracing::info!(
                    symbology = %request.symbology,
                    error = %e,
                    "Rejected barcode content"
                );
                return response::bad_request(e);
            }
        };

        let model = scale_or_unscaled(model, request.width, request.height);

        let bytes = match self.raster.encode(&model, request.format) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(format = %request.format, error = %e, "Raster encoding failed");
                return response::internal_error();
            }
        };

        let Some(etag) = token.to_header_value() else {
            tracing::error!(etag = %token, "Cache token is not a valid header value");
            return response::internal_error();
        };

        (
            StatusCode::OK,
            [
                (ETAG, etag),
                (CACHE_CONTROL, self.cache_control.clone()),
                (
                    CONTENT_TYPE,
                    HeaderValue::from_static(request.format.content_type()),
                ),
            ],
            bytes,
        )
            .into_response()
    }
}

impl RouteHandler for BarcodeHandler {
    fn handle(&self, request: &Parts, params: &Params) -> Response {
        match ImageRequest::from_params(params, request.uri.query()) {
            Ok(image_request) => self.render(&image_request, request.headers.get(IF_NONE_MATCH)),
            Err(e) => {
                tracing::info!(path = %request.uri.path(), error = %e, "Invalid barcode request");
                response::bad_request(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::PathPattern;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn params(path: &str) -> Params {
        PathPattern::new(BARCODE_PATTERN)
            .unwrap()
            .captures(path)
            .unwrap()
    }

    fn parts(uri: &str, if_none_match: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = if_none_match {
            builder = builder.header(IF_NONE_MATCH, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[derive(Clone, Default)]
    struct CountingEncoder {
        calls: Arc<AtomicUsize>,
    }

    impl SymbolEncoder for CountingEncoder {
        fn encode(
            &self,
            symbology: Symbology,
            text: &str,
            options: &EncodeOptions,
        ) -> Result<BarModel, EncodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BuiltinEncoder.encode(symbology, text, options)
        }
    }

    struct FailingRaster;

    impl RasterEncoder for FailingRaster {
        fn encode(&self, _: &BarModel, _: OutputFormat) -> Result<Vec<u8>, RasterError> {
            Err(RasterError::UnknownFormat("broken".into()))
        }
    }

    #[test]
    fn test_request_from_params() {
        let request =
            ImageRequest::from_params(&params("/barcode/code128/300x100/HELLO.png"), None).unwrap();
        assert_eq!(
            request,
            ImageRequest {
                symbology: Symbology::Code128,
                width: 300,
                height: 100,
                text: "HELLO".into(),
                format: OutputFormat::Png,
                options: EncodeOptions::default(),
            }
        );
    }

    #[test]
    fn test_text_is_percent_decoded() {
        let request =
            ImageRequest::from_params(&params("/barcode/code128/1x1/A%20B%7C.gif"), None).unwrap();
        assert_eq!(request.text, "A B|");
    }

    #[test]
    fn test_oversized_dimension_degrades_to_zero() {
        let request = ImageRequest::from_params(
            &params("/barcode/code39/99999999999x50/ABC.png"),
            None,
        )
        .unwrap();
        assert_eq!(request.width, 0);
        assert_eq!(request.height, 50);
    }

    #[test]
    fn test_security_level_only_for_pdf417() {
        let pdf = ImageRequest::from_params(
            &params("/barcode/pdf417/200x100/DATA.gif"),
            Some("securityLevel=3"),
        )
        .unwrap();
        assert_eq!(pdf.options.security_level, 3);

        let code = ImageRequest::from_params(
            &params("/barcode/code39/200x100/DATA.gif"),
            Some("securityLevel=3"),
        )
        .unwrap();
        assert_eq!(code.options.security_level, 0);
    }

    #[test]
    fn test_malformed_security_level_defaults_to_zero() {
        for query in [
            "securityLevel=high",
            "securityLevel=",
            "securityLevel=%203",
            "other=1",
        ] {
            let request = ImageRequest::from_params(
                &params("/barcode/pdf417/200x100/DATA.gif"),
                Some(query),
            )
            .unwrap();
            assert_eq!(request.options.security_level, 0, "{}", query);
        }
    }

    #[test]
    fn test_unknown_values_fail_closed() {
        let bad_symbology = Params::new(
            ["qr", "1", "1", "X", "png"].iter().map(|s| s.to_string()).collect(),
        );
        assert!(matches!(
            ImageRequest::from_params(&bad_symbology, None),
            Err(RequestError::Symbology(_))
        ));

        let bad_format = Params::new(
            ["code39", "1", "1", "X", "bmp"].iter().map(|s| s.to_string()).collect(),
        );
        assert!(matches!(
            ImageRequest::from_params(&bad_format, None),
            Err(RequestError::Format(_))
        ));

        let handler = BarcodeHandler::new(&CacheConfig::default());
        let response = handler.handle(&parts("/whatever", None), &bad_format);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_success_sets_caching_headers() {
        let handler = BarcodeHandler::new(&CacheConfig::default());
        let path = "/barcode/code128/300x100/HELLO.png";
        let response = handler.handle(&parts(path, None), &params(path));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=2592000");
        assert_eq!(
            response.headers()[ETAG],
            "\"code128|300|100|0|5:HELLO|png\""
        );
        assert!(body_bytes(response).await.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_matching_etag_skips_encoding() {
        let encoder = CountingEncoder::default();
        let calls = encoder.calls.clone();
        let handler = BarcodeHandler::with_encoders(&CacheConfig::default(), encoder, ImageRaster);
        let path = "/barcode/code128/300x100/HELLO.png";

        let first = handler.handle(&parts(path, None), &params(path));
        let etag = first.headers()[ETAG].to_str().unwrap().to_string();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let cached = handler.handle(&parts(path, Some(&etag)), &params(path));
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
        assert!(cached.headers().is_empty());
        assert!(body_bytes(cached).await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stale = handler.handle(&parts(path, Some("\"something-else\"")), &params(path));
        assert_eq!(stale.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_requests_are_byte_identical() {
        let handler = BarcodeHandler::new(&CacheConfig::default());
        let path = "/barcode/ean/190x80/400638133393.jpg";

        let first = handler.handle(&parts(path, None), &params(path));
        let second = handler.handle(&parts(path, None), &params(path));
        assert_eq!(first.headers()[ETAG], second.headers()[ETAG]);
        assert_eq!(body_bytes(first).await, body_bytes(second).await);
    }

    #[tokio::test]
    async fn test_rejected_text_is_bad_request() {
        let handler = BarcodeHandler::new(&CacheConfig::default());
        let path = "/barcode/code39/100x50/invalid$$text.png";
        let response = handler.handle(&parts(path, None), &params(path));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.contains("invalid code39 character 'i'"), "{}", body);
    }

    #[test]
    fn test_raster_failure_is_server_error() {
        let handler =
            BarcodeHandler::with_encoders(&CacheConfig::default(), BuiltinEncoder, FailingRaster);
        let path = "/barcode/code39/100x50/ABC.gif";
        let response = handler.handle(&parts(path, None), &params(path));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_scale_failure_falls_back_to_unscaled() {
        let model = BuiltinEncoder
            .encode(Symbology::Code39, "ABC", &EncodeOptions::default())
            .unwrap();
        let width = model.width();

        let unscaled = scale_or_unscaled(model.clone(), 0, 0);
        assert_eq!(unscaled, model);

        let scaled = scale_or_unscaled(model, width * 2, 40);
        assert_eq!((scaled.width(), scaled.height()), (width * 2, 40));
    }
}
