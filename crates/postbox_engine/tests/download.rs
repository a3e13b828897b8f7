use std::fs;
use std::sync::{Arc, Once};

use postbox_engine::{
    content_disposition_filename, original_filename, DownloadError, DownloadRequest, Downloader,
    FetchMetadata, FetchSettings, HttpDownloader, ReqwestFetcher,
};
use postbox_core::{filename_for, Entry, RawEntry};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn metadata(final_url: &str, disposition: Option<&str>) -> FetchMetadata {
    FetchMetadata {
        original_url: final_url.to_string(),
        final_url: final_url.to_string(),
        redirect_count: 0,
        content_type: Some("application/pdf".to_string()),
        content_disposition: disposition.map(str::to_string),
        byte_len: 0,
    }
}

fn downloader(dir: &TempDir) -> HttpDownloader {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default().for_documents()));
    HttpDownloader::new(fetcher, dir.path().to_path_buf())
}

#[test]
fn disposition_prefers_extended_filename() {
    assert_eq!(
        content_disposition_filename(
            "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''Kontoauszug%20Januar.pdf"
        ),
        Some("Kontoauszug Januar.pdf".to_string())
    );
    assert_eq!(
        content_disposition_filename("attachment; filename=\"Abrechnung.pdf\""),
        Some("Abrechnung.pdf".to_string())
    );
    assert_eq!(
        content_disposition_filename("inline; filename=plain.pdf"),
        Some("plain.pdf".to_string())
    );
    assert_eq!(content_disposition_filename("attachment"), None);
}

#[test]
fn original_name_falls_back_to_url_then_index() {
    assert_eq!(
        original_filename(
            &metadata("https://bank.example/dl/x", Some("attachment; filename=\"../a:b.pdf\"")),
            1
        ),
        "a_b.pdf"
    );
    assert_eq!(
        original_filename(&metadata("https://bank.example/files/Depot%20Info.pdf", None), 2),
        "Depot Info.pdf"
    );
    assert_eq!(
        original_filename(&metadata("https://bank.example/download", None), 3),
        "postbox_download_3.pdf"
    );
}

#[test]
fn long_server_name_is_shortened_keeping_extension() {
    let header = format!("attachment; filename*=UTF-8''{}.pdf", "%C3%BC".repeat(200));
    let name = original_filename(&metadata("https://bank.example/dl/x", Some(header.as_str())), 1);

    assert!(name.len() <= 250, "{} bytes", name.len());
    assert!(name.ends_with(".pdf"));
    assert!(name.trim_end_matches(".pdf").chars().all(|c| c == 'ü'));
}

#[tokio::test]
async fn multibyte_template_name_can_be_written() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/euro"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let raw = RawEntry {
        subject: "€".repeat(300),
        date_text: "15.01.2024".to_string(),
        ..RawEntry::default()
    };
    let entry = Entry::from_raw(&raw, 1, "YYYYMMDD");
    let temp = TempDir::new().unwrap();
    let downloader = downloader(&temp);
    let request = DownloadRequest {
        index: 1,
        url: format!("{}/dl/euro", server.uri()),
        file_name: Some(filename_for("{subject_complete}", &entry)),
    };

    let first = downloader.download(&request).await.expect("first write");
    let second = downloader.download(&request).await.expect("uniquified write");
    assert!(first.is_file());
    assert!(second.is_file());
}

#[tokio::test]
async fn renamed_download_uses_requested_name() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1".to_vec(), "application/pdf")
                .insert_header("Content-Disposition", "attachment; filename=\"server.pdf\""),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let request = DownloadRequest {
        index: 1,
        url: format!("{}/dl/1", server.uri()),
        file_name: Some("20240115_Abrechnung_Kauf.pdf".to_string()),
    };

    let saved = downloader(&temp).download(&request).await.expect("download ok");
    assert_eq!(saved, temp.path().join("20240115_Abrechnung_Kauf.pdf"));
    assert_eq!(fs::read(&saved).unwrap(), b"%PDF-1");
}

#[tokio::test]
async fn original_download_keeps_server_name_and_uniquifies() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-2".to_vec(), "application/pdf")
                .insert_header("Content-Disposition", "attachment; filename=\"server.pdf\""),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let downloader = downloader(&temp);
    let request = DownloadRequest {
        index: 2,
        url: format!("{}/dl/2", server.uri()),
        file_name: None,
    };

    let first = downloader.download(&request).await.expect("first");
    let second = downloader.download(&request).await.expect("second");
    assert_eq!(first, temp.path().join("server.pdf"));
    assert_eq!(second, temp.path().join("server (1).pdf"));
}

#[tokio::test]
async fn failed_fetch_writes_nothing() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let request = DownloadRequest {
        index: 1,
        url: format!("{}/dl/gone", server.uri()),
        file_name: Some("doc.pdf".to_string()),
    };

    let err = downloader(&temp).download(&request).await.expect_err("410");
    assert!(matches!(err, DownloadError::Fetch(_)));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}
