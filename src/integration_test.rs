#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use data_model::{
        generate_share_code, ShareRecordBuilder, SHARE_CODE_ALPHABET, SHARE_CODE_LEN,
        SHARE_LIFETIME_MS,
    };
    use serde_json::{json, Value};
    use share_store::ShareStore;
    use tower::ServiceExt;
    use zip::ZipArchive;

    use crate::{testing::TestApp, utils::get_epoch_time_in_ms};

    const BOUNDARY: &str = "retroshare-test-boundary";

    fn multipart_body(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn upload(app: &TestApp, files: &[(&str, &[u8])]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/uploads")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap();
        send(app, request).await
    }

    async fn resolve(app: &TestApp, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/resolve")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    fn read_download(url: &str) -> Vec<u8> {
        let path = url.strip_prefix("file://").expect("expected file:// url");
        std::fs::read(path).unwrap()
    }

    #[tokio::test]
    async fn test_single_small_file_round_trip() {
        let app = TestApp::new().unwrap();

        let (status, body) = upload(&app, &[("a.txt", b"hello world")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "File uploaded successfully!");
        assert_eq!(body["isCompressed"], false);
        assert_eq!(body["filesCount"], 1);
        assert_eq!(body["fileNames"], json!(["a.txt"]));
        assert_eq!(body["archiveName"], "a.txt");

        let code = body["shareCode"].as_str().unwrap().to_string();
        assert_eq!(code.len(), SHARE_CODE_LEN);
        assert!(code.chars().all(|c| SHARE_CODE_ALPHABET.contains(&c)));

        let (status, body) = resolve(&app, json!({ "shareCode": code })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Share code resolved successfully.");
        assert_eq!(body["fileName"], "a.txt");
        assert_eq!(body["filesCount"], 1);
        assert_eq!(body["totalSize"], 11);
        let uploaded_at = body["uploadedAt"].as_u64().unwrap();
        assert_eq!(
            body["expiresAt"].as_u64().unwrap(),
            uploaded_at + SHARE_LIFETIME_MS
        );

        let downloaded = read_download(body["downloadUrl"].as_str().unwrap());
        assert_eq!(downloaded, b"hello world");
    }

    #[tokio::test]
    async fn test_multi_file_upload_produces_archive() {
        let app = TestApp::new().unwrap();

        let (status, body) =
            upload(&app, &[("a.txt", b"first"), ("b.txt", b"second")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Files compressed and uploaded successfully!");
        assert_eq!(body["isCompressed"], true);
        assert_eq!(body["filesCount"], 2);
        assert_eq!(body["archiveName"], "a_and_1_more_files.zip");
        assert_eq!(body["fileNames"], json!(["a.txt", "b.txt"]));

        let code = body["shareCode"].as_str().unwrap().to_string();
        let (status, body) = resolve(&app, json!({ "shareCode": code })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fileName"], "a_and_1_more_files.zip");

        let downloaded = read_download(body["downloadUrl"].as_str().unwrap());
        let mut archive = ZipArchive::new(Cursor::new(downloaded)).unwrap();
        assert_eq!(archive.len(), 2);
        for (name, data) in [("a.txt", b"first".to_vec()), ("b.txt", b"second".to_vec())] {
            let mut entry = archive.by_name(name).unwrap();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            assert_eq!(contents, data);
        }
    }

    #[tokio::test]
    async fn test_single_file_over_threshold_is_compressed() {
        let app = TestApp::with_single_file_limit(4).unwrap();

        let (status, body) = upload(&app, &[("big.bin", b"0123456789")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isCompressed"], true);
        assert_eq!(body["filesCount"], 1);
        assert_eq!(body["archiveName"], "big.zip");
    }

    #[tokio::test]
    async fn test_upload_with_no_files_is_rejected() {
        let app = TestApp::new().unwrap();

        let (status, body) = upload(&app, &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No files uploaded.");
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_is_not_found() {
        let app = TestApp::new().unwrap();

        let (status, body) = resolve(&app, json!({ "shareCode": "ZZZZ99" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Share code not found or expired.");
    }

    #[tokio::test]
    async fn test_resolve_expired_share_is_gone_not_missing() {
        let app = TestApp::new().unwrap();

        // Created 25h ago with a 24h lifetime; the record still exists in
        // the store, only the explicit expiry check rejects it.
        let uploaded_at = get_epoch_time_in_ms() - SHARE_LIFETIME_MS - 60 * 60 * 1000;
        let record = ShareRecordBuilder::default()
            .share_code(generate_share_code())
            .s3_key(format!("{}-stale.txt", uploaded_at))
            .original_archive_name("stale.txt".to_string())
            .uploaded_at(uploaded_at)
            .file_names(vec!["stale.txt".to_string()])
            .total_size_bytes(5)
            .build()
            .unwrap();
        app.share_store.put(&record).await.unwrap();

        let (status, body) = resolve(&app, json!({ "shareCode": record.share_code })).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["message"], "This share has expired.");
    }

    #[tokio::test]
    async fn test_resolve_requires_a_code() {
        let app = TestApp::new().unwrap();

        let (status, body) = resolve(&app, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No share code provided.");

        let request = Request::builder()
            .method("GET")
            .uri("/resolve")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resolve_via_query_parameter() {
        let app = TestApp::new().unwrap();

        let (_, body) = upload(&app, &[("a.txt", b"query me")]).await;
        let code = body["shareCode"].as_str().unwrap().to_string();

        let request = Request::builder()
            .method("GET")
            .uri(format!("/resolve?code={}", code))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fileName"], "a.txt");

        let downloaded = read_download(body["downloadUrl"].as_str().unwrap());
        assert_eq!(downloaded, b"query me");
    }
}
