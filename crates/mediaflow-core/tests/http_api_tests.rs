//! `HttpMediaApi` against a one-shot local HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::RefCell;
use std::time::Duration;

use mediaflow_core::{
    ClientConfig, ConversionController, ConversionFile, ConversionFormat, DeliveryBackend,
    DownloadController, Error, HttpMediaApi, MediaApi, NativeSubmission, ObjectUrl, Result,
    SubmissionHandle, Timer, map_theme,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Accept one connection, answer it with `status` and `body`, and hand back
/// the raw request.
async fn serve_once(
    status: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> (ClientConfig, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
        body.len()
    )
    .into_bytes();
    for (name, value) in headers {
        response.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    response.extend_from_slice(b"\r\n");
    response.extend_from_slice(body);

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(&response).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (ClientConfig::with_api_base(base), handle)
}

async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 16 * 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);

        let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= head_end + 4 + body_len {
            break;
        }
    }
    request
}

#[derive(Default)]
struct RecordingDelivery {
    saved: RefCell<Vec<String>>,
}

impl DeliveryBackend for RecordingDelivery {
    fn submit_native(&self, _submission: &NativeSubmission) -> Result<SubmissionHandle> {
        Ok(SubmissionHandle(0))
    }

    fn discard_submission(&self, _handle: SubmissionHandle) {}

    fn save_blob(&self, _bytes: &[u8], _content_type: &str, filename: &str) -> Result<ObjectUrl> {
        self.saved.borrow_mut().push(filename.to_string());
        Ok(ObjectUrl("blob:test".to_string()))
    }

    fn release_object_url(&self, _url: ObjectUrl) {}
}

struct InstantTimer;

impl Timer for InstantTimer {
    async fn sleep(&self, _duration: Duration) {}
}

#[tokio::test]
async fn test_fetch_info_end_to_end() {
    let body = br#"{"title":"T","platform":"Youtube","resolutions":[{"label":"1080p","format_id":"137","filesize":52428800}]}"#;
    let (config, server) =
        serve_once("200 OK", &[("Content-Type", "application/json")], body).await;
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let mut controller = DownloadController::new(config);
    controller.set_url("https://x.test/v");

    let theme = controller.fetch_info(&api).await.unwrap();

    let request = String::from_utf8(server.await.unwrap()).unwrap();
    assert!(
        request.starts_with("GET /api/info?url=https%3A%2F%2Fx.test%2Fv "),
        "{request}"
    );
    assert_eq!(theme, Some(map_theme("Youtube")));
    let info = controller.info().unwrap();
    assert_eq!(info.display_title(), "T");
    assert_eq!(controller.options().len(), 1);
    assert_eq!(
        controller.selected_option().unwrap().display_label(),
        "1080p (~50.0 MB)"
    );
}

#[tokio::test]
async fn test_fetch_info_failure_uses_server_message() {
    let (config, server) = serve_once(
        "400 Bad Request",
        &[("Content-Type", "application/json")],
        br#"{"error":"Unsupported URL"}"#,
    )
    .await;
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let mut controller = DownloadController::new(config);
    controller.set_url("https://x.test/v");

    let result = controller.fetch_info(&api).await;
    server.await.unwrap();

    assert!(matches!(
        result,
        Err(Error::Request {
            status: Some(400),
            ..
        })
    ));
    assert_eq!(controller.url_error(), Some("Unsupported URL"));
    assert!(controller.info().is_none());
    assert!(!controller.is_fetching());
}

#[tokio::test]
async fn test_fetch_info_failure_without_body_uses_generic_message() {
    let (config, server) = serve_once("502 Bad Gateway", &[], b"<html>bad gateway</html>").await;
    let api = HttpMediaApi::new(config).unwrap();

    let err = api.fetch_info("https://x.test/v").await.unwrap_err();
    server.await.unwrap();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.user_message(), "Failed to fetch video info.");
}

#[tokio::test]
async fn test_fetch_info_unreachable_service_uses_generic_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let config = ClientConfig::with_api_base(base);
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let mut controller = DownloadController::new(config);
    controller.set_url("https://x.test/v");

    let result = controller.fetch_info(&api).await;

    assert!(matches!(result, Err(Error::Network(_))));
    assert_eq!(controller.url_error(), Some("Failed to fetch video info."));
    assert!(!controller.is_fetching());
}

#[tokio::test]
async fn test_fetch_info_html_success_body_uses_generic_message() {
    let (config, server) =
        serve_once("200 OK", &[("Content-Type", "text/html")], b"<html>ok</html>").await;
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let mut controller = DownloadController::new(config);
    controller.set_url("https://x.test/v");

    let result = controller.fetch_info(&api).await;
    server.await.unwrap();

    assert!(result.is_err());
    assert_eq!(controller.url_error(), Some("Failed to fetch video info."));
    assert!(controller.info().is_none());
    assert!(!controller.is_fetching());
}

#[tokio::test]
async fn test_conversion_rejected_by_server() {
    let (config, server) = serve_once(
        "415 Unsupported Media Type",
        &[("Content-Type", "application/json")],
        br#"{"error":"unsupported codec"}"#,
    )
    .await;
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let delivery = RecordingDelivery::default();
    let mut controller = ConversionController::new(config);
    controller
        .select_file(ConversionFile::new("big.mov", vec![0_u8; 10 * 1024 * 1024]))
        .unwrap();
    controller.select_format(ConversionFormat::Mp3);

    let result = controller
        .submit_conversion(&api, &delivery, &InstantTimer)
        .await;
    let request = server.await.unwrap();

    assert!(result.is_err());
    let head = String::from_utf8_lossy(&request[..256]).to_string();
    assert!(head.starts_with("POST /api/v2/convert "), "{head}");
    let status = controller.status().unwrap();
    assert!(status.text.contains("unsupported codec"));
    assert!(delivery.saved.borrow().is_empty());
    assert!(controller.can_convert());
}

#[tokio::test]
async fn test_conversion_server_error_without_json() {
    let (config, server) = serve_once("500 Internal Server Error", &[], b"boom").await;
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let mut controller = ConversionController::new(config);
    controller
        .select_file(ConversionFile::new("a.wav", vec![1, 2, 3]))
        .unwrap();
    controller.select_format(ConversionFormat::Aac);

    let _ = controller
        .submit_conversion(&api, &RecordingDelivery::default(), &InstantTimer)
        .await;
    server.await.unwrap();

    assert_eq!(controller.status().unwrap().text, "❌ Server error 500");
}

#[tokio::test]
async fn test_conversion_success_saves_under_header_name() {
    let (config, server) = serve_once(
        "200 OK",
        &[
            ("Content-Type", "audio/mpeg"),
            (
                "Content-Disposition",
                "attachment; filename*=UTF-8''clip%20(1).mp3",
            ),
        ],
        b"ID3\x04",
    )
    .await;
    let api = HttpMediaApi::new(config.clone()).unwrap();
    let delivery = RecordingDelivery::default();
    let mut controller = ConversionController::new(config);
    controller
        .select_file(ConversionFile::new("clip.wav", vec![9; 512]).with_mime_type("audio/wav"))
        .unwrap();
    controller.select_format(ConversionFormat::Mp3);

    let filename = controller
        .submit_conversion(&api, &delivery, &InstantTimer)
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert_eq!(filename, "clip (1).mp3");
    assert_eq!(*delivery.saved.borrow(), vec!["clip (1).mp3".to_string()]);
    let body = String::from_utf8_lossy(&request);
    assert!(body.contains("name=\"target_format\""));
    assert!(body.contains("filename=\"clip.wav\""));
    assert!(body.to_lowercase().contains("content-type: audio/wav"), "{body}");
    assert_eq!(
        controller.status().unwrap().text,
        "✅ Done! Saved as clip (1).mp3"
    );
}
