//! ApiClient tests against a one-shot loopback HTTP responder

use extraction_wizard::api::{ApiClient, ExtractionApi, FieldType};
use extraction_wizard::config::ClientConfig;
use extraction_wizard::schema::SchemaDraft;
use extraction_wizard::upload::PdfUpload;
use extraction_wizard::Error;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Answer exactly one request with `status` and `body`; the handle yields
/// the raw request text.
async fn serve_once(status: u16, content_type: &str, body: Vec<u8>) -> (ApiClient, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let content_type = content_type.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            reason(status),
            content_type,
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    let config = ClientConfig::with_base_url(&format!("http://{}/api", addr)).unwrap();
    (ApiClient::new(config).unwrap(), handle)
}

async fn serve_json(status: u16, body: serde_json::Value) -> (ApiClient, JoinHandle<String>) {
    serve_once(status, "application/json", body.to_string().into_bytes()).await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        _ => "Internal Server Error",
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
    if head.contains("transfer-encoding: chunked") {
        return buf.ends_with(b"0\r\n\r\n");
    }
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    buf.len() >= end + 4 + length
}

#[tokio::test]
async fn test_list_schemas() {
    let (client, server) = serve_json(
        200,
        serde_json::json!({
            "schemas": [{
                "id": "q1",
                "name": "Quotation",
                "fields": [{"name": "total", "type": "currency", "required": true}],
                "created_at": "2026-02-01T09:30:00.123456"
            }]
        }),
    )
    .await;

    let schemas = client.list_schemas().await.unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].fields[0].field_type, FieldType::Currency);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/schemas HTTP/1.1"));
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let (client, server) = serve_json(
        200,
        serde_json::json!({
            "message": "File uploaded successfully",
            "session_id": "sess-9",
            "file": {"original_name": "quote.pdf", "stored_name": "sess-9_quote.pdf", "size": 9}
        }),
    )
    .await;

    let file = PdfUpload::new("quote.pdf", "application/pdf", b"%PDF-1.7\n".to_vec());
    let response = client.upload_file(&file).await.unwrap();
    assert_eq!(response.session_id, "sess-9");
    assert_eq!(response.file.size_bytes, 9);
    assert!(!response.file.id.is_empty());

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/upload HTTP/1.1"));
    assert!(request.contains("name=\"file\"; filename=\"quote.pdf\""));
    assert!(request.contains("%PDF-1.7"));
}

#[tokio::test]
async fn test_process_posts_session_and_schema() {
    let (client, server) = serve_json(
        200,
        serde_json::json!({
            "result_id": "r-7",
            "results": [
                {"filename": "quote.pdf", "status": "success", "data": {"total": "12.00"}},
                {"filename": "bad.pdf", "status": "error", "error": "Unreadable"}
            ]
        }),
    )
    .await;

    let response = client.process_documents("sess-9", "q1").await.unwrap();
    assert_eq!(response.result_id, "r-7");
    assert_eq!(response.results[1].error_message(), Some("Unreadable"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/process HTTP/1.1"));
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"session_id": "sess-9", "schema_id": "q1"})
    );
}

#[tokio::test]
async fn test_create_schema_strips_client_ids() {
    let (client, server) = serve_json(
        201,
        serde_json::json!({
            "message": "Schema created successfully",
            "schema": {"id": "new-1", "name": "Invoice", "fields": []}
        }),
    )
    .await;

    let mut draft = SchemaDraft::new("Invoice");
    draft.use_default_fields();
    let payload = draft.to_payload().unwrap();
    let created = client.create_schema(&payload).await.unwrap();
    assert_eq!(created.id, "new-1");

    let request = server.await.unwrap();
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["fields"].as_array().unwrap().len(), 7);
    assert_eq!(body["fields"][0]["type"], "text");
    assert!(body["fields"][0].get("id").is_none());
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let (client, server) = serve_json(404, serde_json::json!({"error": "Schema not found"})).await;

    let err = client.delete_schema("missing id").await.unwrap_err();
    assert!(matches!(err, Error::Request { .. }));
    assert_eq!(err.client_message(), "Schema not found");

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /api/schemas/missing%20id HTTP/1.1"));
}

#[tokio::test]
async fn test_non_json_error_falls_back() {
    let (client, _server) = serve_once(500, "text/html", b"<h1>oops</h1>".to_vec()).await;
    let err = client.process_documents("s", "q").await.unwrap_err();
    assert_eq!(err.client_message(), "Server error occurred");
}

#[tokio::test]
async fn test_connection_refused_is_no_response() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::with_base_url(&format!("http://{}/api", addr)).unwrap();
    let client = ApiClient::new(config).unwrap();

    let err = client.list_schemas().await.unwrap_err();
    assert_eq!(
        err.client_message(),
        "No response from server. Please check your connection."
    );

    let err = client.health().await.unwrap_err();
    assert_eq!(err.client_message(), "Backend service is not available");
}

#[tokio::test]
async fn test_export_streams_blob() {
    let blob = b"PK\x03\x04spreadsheet".to_vec();
    let (client, server) = serve_once(
        200,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        blob.clone(),
    )
    .await;

    assert_eq!(client.export_results("r-7").await.unwrap(), blob);
    assert!(server.await.unwrap().starts_with("GET /api/export/r-7 HTTP/1.1"));
}

#[tokio::test]
async fn test_export_failure_is_export_error() {
    let (client, _server) = serve_json(404, serde_json::json!({"error": "Results not found"})).await;

    let err = client.export_results("r-404").await.unwrap_err();
    assert!(matches!(err, Error::Export { .. }));
    assert_eq!(err.client_message(), "Failed to export results");
}

#[tokio::test]
async fn test_reset_session() {
    let (client, server) = serve_json(200, serde_json::json!({"message": "Session reset"})).await;

    client.reset_session("sess-9").await.unwrap();
    assert!(server.await.unwrap().starts_with("DELETE /api/reset/sess-9 HTTP/1.1"));
}
