//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};
use tauri::http::{header::CONTENT_TYPE, HeaderValue, Response as HttpResponse, StatusCode};
use tracing::{debug, warn};

use super::shared_state::{Frame, SharedFrameBuffer, SharedPerfStats};
use crate::config::compression::JPEG_QUALITY;
use crate::error::{BridgeError, BridgeResult};

type Response = HttpResponse<Vec<u8>>;

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame
/// - `frame.raw`: Raw RGBA frame
/// - `stats`: Performance statistics as JSON
pub fn handle_frame_protocol(
    uri_path: &str,
    buffer: &SharedFrameBuffer,
    perf_stats: &SharedPerfStats,
) -> Response {
    let resource = uri_path.trim_start_matches('/');
    debug!(resource, "frame protocol request");

    let result = match resource {
        "frame" | "frame.jpg" => buffer.latest().and_then(|frame| jpeg_response(&frame)),
        "frame.raw" => buffer.latest().and_then(raw_response),
        "stats" => stats_response(perf_stats),
        _ => return plain(StatusCode::NOT_FOUND, "Not Found"),
    };

    match result {
        Ok(response) => response,
        Err(BridgeError::FrameNotReady) => {
            plain(StatusCode::SERVICE_UNAVAILABLE, "Frame not ready")
        }
        Err(err) => {
            warn!(resource, error = %err, "frame protocol failure");
            plain(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Encode a frame as JPEG (alpha dropped)
pub fn encode_jpeg(frame: &Frame) -> BridgeResult<Vec<u8>> {
    let img: ImageBuffer<Rgba<u8>, &[u8]> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.rgba.as_slice()).ok_or(
            BridgeError::FrameSize {
                expected: frame.width as usize * frame.height as usize * 4,
                actual: frame.rgba.len(),
            },
        )?;
    let rgb: Vec<u8> = img.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY).write_image(
        &rgb,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(jpeg_data)
}

fn jpeg_response(frame: &Frame) -> BridgeResult<Response> {
    let jpeg_data = encode_jpeg(frame)?;
    frame_response(frame.width, frame.height, "image/jpeg", jpeg_data)
}

fn raw_response(frame: Frame) -> BridgeResult<Response> {
    frame_response(
        frame.width,
        frame.height,
        "application/octet-stream",
        frame.rgba,
    )
}

fn frame_response(
    width: u32,
    height: u32,
    content_type: &str,
    body: Vec<u8>,
) -> BridgeResult<Response> {
    Ok(HttpResponse::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header("X-Frame-Width", width.to_string())
        .header("X-Frame-Height", height.to_string())
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Expose-Headers",
            "X-Frame-Width, X-Frame-Height",
        )
        .body(body)?)
}

fn stats_response(perf_stats: &SharedPerfStats) -> BridgeResult<Response> {
    let json = perf_stats.with(|stats| serde_json::to_vec(stats).unwrap_or_default())?;
    Ok(HttpResponse::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(json)?)
}

fn plain(status: StatusCode, message: &str) -> Response {
    let mut response = HttpResponse::new(message.as_bytes().to_vec());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey_frame(width: u32, height: u32) -> Frame {
        Frame::new(width, height, vec![128; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn unknown_resource_is_404() {
        let response = handle_frame_protocol(
            "/nope",
            &SharedFrameBuffer::default(),
            &SharedPerfStats::default(),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_frame_is_503() {
        let response = handle_frame_protocol(
            "/frame.jpg",
            &SharedFrameBuffer::default(),
            &SharedPerfStats::default(),
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn jpeg_frame_carries_size_headers() {
        let buffer = SharedFrameBuffer::default();
        buffer.publish(grey_frame(32, 16)).unwrap();

        let response = handle_frame_protocol("/frame", &buffer, &SharedPerfStats::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "image/jpeg");
        assert_eq!(response.headers()["X-Frame-Width"], "32");
        assert_eq!(response.headers()["X-Frame-Height"], "16");
        // JPEG SOI marker
        assert_eq!(&response.body()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn raw_frame_is_passed_through() {
        let buffer = SharedFrameBuffer::default();
        buffer.publish(grey_frame(4, 4)).unwrap();

        let response = handle_frame_protocol("/frame.raw", &buffer, &SharedPerfStats::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().len(), 64);
    }

    #[test]
    fn stats_are_json() {
        let stats = SharedPerfStats::default();
        stats.with(|s| s.frame_count = 7).unwrap();

        let response = handle_frame_protocol("stats", &SharedFrameBuffer::default(), &stats);
        let value: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(value["frame_count"], 7);
    }
}
