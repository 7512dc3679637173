//! Upload tests against a mock ShareFile server.

use bytes::Bytes;
use futures::stream;
use integrations_sharefile::errors::{ConfigurationError, UploadError};
use integrations_sharefile::{
    ShareFileClient, ShareFileError, SourceMetadata, UploadMethod, UploadOptions, UploadOutcome,
};
use md5::{Digest, Md5};
use std::io;
use wiremock::matchers::{
    body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

fn client_for(server: &MockServer, chunk_size: usize) -> ShareFileClient {
    ShareFileClient::builder()
        .oauth_token("test-token")
        .base_url(format!("{}/sf/v3", server.uri()))
        .upload_chunk_size(chunk_size)
        .build()
        .unwrap()
}

fn session_response(server: &MockServer) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "Method": "Streamed",
        "ChunkUri": format!("{}/chunk?uploadid=u1", server.uri()),
        "ProgressData": "pd",
        "IsResume": false
    }))
}

#[tokio::test]
async fn streamed_upload_sends_sequential_chunks_with_hashes() {
    let server = MockServer::start().await;
    let content = b"aaaaaaaabbbbbbbbcccc"; // 20 bytes, chunk size 8

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("fileName", "data.bin"))
        .and(query_param("fileSize", "20"))
        .and(query_param("method", "streamed"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("uploadid", "u1"))
        .and(query_param("index", "0"))
        .and(query_param("byteOffset", "0"))
        .and(query_param("hash", md5_hex(b"aaaaaaaa")))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "1"))
        .and(query_param("byteOffset", "8"))
        .and(query_param("hash", md5_hex(b"bbbbbbbb")))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "2"))
        .and(query_param("byteOffset", "16"))
        .and(query_param("hash", md5_hex(b"cccc")))
        .and(query_param("filehash", md5_hex(content)))
        .and(query_param("finish", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"value":[{"id":"fi123"}]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(content),
            "fox1",
            UploadOptions::new()
                .file_name("data.bin")
                .method(UploadMethod::Streamed),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UploadOutcome::Completed(r#"{"value":[{"id":"fi123"}]}"#.to_string())
    );
}

#[tokio::test]
async fn streamed_upload_ends_with_full_chunk_on_exact_multiple() {
    let server = MockServer::start().await;
    let content = b"aaaaaaaabbbbbbbb"; // exactly two chunks of 8

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "0"))
        .and(query_param("hash", md5_hex(b"aaaaaaaa")))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(1)
        .mount(&server)
        .await;

    // The final chunk is full size; there must be no trailing empty chunk.
    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "1"))
        .and(query_param("byteOffset", "8"))
        .and(query_param("hash", md5_hex(b"bbbbbbbb")))
        .and(query_param("filehash", md5_hex(content)))
        .and(query_param("finish", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(content),
            "fox1",
            UploadOptions::new()
                .file_name("data.bin")
                .method(UploadMethod::Streamed),
        )
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::Completed("done".to_string()));
}

#[tokio::test]
async fn streamed_upload_of_empty_source_sends_one_final_chunk() {
    let server = MockServer::start().await;
    let empty_md5 = "d41d8cd98f00b204e9800998ecf8427e";

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .and(query_param("fileSize", "0"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "0"))
        .and(query_param("byteOffset", "0"))
        .and(query_param("hash", empty_md5))
        .and(query_param("filehash", empty_md5))
        .and(query_param("finish", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::new(),
            "fox1",
            UploadOptions::new()
                .file_name("empty.bin")
                .method(UploadMethod::Streamed),
        )
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::Completed("done".to_string()));
}

#[tokio::test]
async fn rejected_chunk_stops_the_transfer() {
    let server = MockServer::start().await;
    let content = b"aaaaaaaabbbbbbbbcccc";

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("upload failed"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(query_param("index", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(content),
            "fox1",
            UploadOptions::new()
                .file_name("data.bin")
                .method(UploadMethod::Streamed),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UploadOutcome::ChunkRejected {
            index: 0,
            response: "upload failed".to_string(),
        }
    );
}

#[tokio::test]
async fn standard_upload_sends_single_multipart_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .and(query_param("method", "standard"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .and(header_regex("content-type", "multipart/form-data; boundary=.+"))
        .and(body_string_contains("name=\"File1\""))
        .and(body_string_contains("filename=\"report.txt\""))
        .and(body_string_contains("quarterly numbers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(b"quarterly numbers"),
            "fox1",
            UploadOptions::new().file_name("report.txt"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::Completed("OK".to_string()));
}

#[tokio::test]
async fn standard_upload_maps_missing_session_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such session"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(b"data"),
            "fox1",
            UploadOptions::new().file_name("report.txt"),
        )
        .await;

    match result {
        Err(ShareFileError::Upload(UploadError::ServerRejected { status, body })) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "no such session");
        }
        other => panic!("expected ServerRejected, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn threaded_method_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let result = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(b"data"),
            "fox1",
            UploadOptions::new()
                .file_name("data.bin")
                .method(UploadMethod::Threaded),
        )
        .await;

    assert!(matches!(
        result,
        Err(ShareFileError::Upload(UploadError::UnsupportedMethod(_)))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_option_key_fails_before_any_request() {
    let mut map = serde_json::Map::new();
    map.insert("fileName".to_string(), "a.txt".into());
    map.insert("overwrite".to_string(), true.into());

    let result = UploadOptions::from_map(map);
    assert!(matches!(
        result,
        Err(ShareFileError::Configuration(
            ConfigurationError::UnknownOption(_)
        ))
    ));
}

#[tokio::test]
async fn zero_length_read_mid_stream_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .respond_with(session_response(&server))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chunk"))
        .respond_with(ResponseTemplate::new(200).set_body_string("true"))
        .expect(0)
        .mount(&server)
        .await;

    let parts: Vec<Result<Bytes, io::Error>> =
        vec![Ok(Bytes::from_static(b"aaaaaaaa")), Ok(Bytes::new())];

    let result = client_for(&server, 8)
        .items()
        .upload(
            stream::iter(parts),
            "fox1",
            UploadOptions::new()
                .file_name("data.bin")
                .method(UploadMethod::Streamed),
            SourceMetadata::new(8),
        )
        .await;

    assert!(matches!(
        result,
        Err(ShareFileError::Upload(UploadError::StreamRead(_)))
    ));
}

#[tokio::test]
async fn missing_chunk_uri_in_session_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Method": "Streamed",
            "IsResume": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(b"data"),
            "fox1",
            UploadOptions::new().file_name("data.bin"),
        )
        .await;

    assert!(matches!(result, Err(ShareFileError::Session(_))));
}

#[tokio::test]
async fn session_refusal_is_a_session_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sf/v3/Items(fox1)/Upload"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "NotFound",
            "message": { "lang": "en-US", "value": "Parent folder not found" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server, 8)
        .items()
        .upload_bytes(
            Bytes::from_static(b"data"),
            "fox1",
            UploadOptions::new().file_name("data.bin"),
        )
        .await;

    match result {
        Err(ShareFileError::Session(e)) => {
            assert!(e.to_string().contains("Parent folder not found"));
        }
        other => panic!("expected session error, got {:?}", other.map(|_| ())),
    }
}
