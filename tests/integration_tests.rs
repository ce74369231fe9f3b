use httpmock::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use webex_recordings::app::{download_command, list_command};
use webex_recordings::config::toml_config::FileConfig;
use webex_recordings::config::{ConnectionArgs, DownloadArgs, ListArgs};
use webex_recordings::core::report::OutputFormat;
use webex_recordings::WtError;

const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<serv:message xmlns:serv="http://www.webex.com/schemas/2002/06/service" xmlns:ep="http://www.webex.com/schemas/2002/06/service/ep">
  <serv:header>
    <serv:response>
      <serv:result>SUCCESS</serv:result>
      <serv:gsbStatus>PRIMARY</serv:gsbStatus>
    </serv:response>
  </serv:header>
  <serv:body>
    <serv:bodyContent>
      <ep:matchingRecords>
        <serv:total>2</serv:total>
        <serv:returned>2</serv:returned>
        <serv:startFrom>1</serv:startFrom>
      </ep:matchingRecords>
      <ep:recording>
        <ep:recordingID>11111111</ep:recordingID>
        <ep:hostWebExID>bjones</ep:hostWebExID>
        <ep:name>Budget review</ep:name>
        <ep:createTime>03/02/2021 14:00:00</ep:createTime>
        <ep:size>42.125</ep:size>
        <ep:recordingType>0</ep:recordingType>
        <ep:duration>1800</ep:duration>
        <ep:format>ARF</ep:format>
      </ep:recording>
      <ep:recording>
        <ep:recordingID>22222222</ep:recordingID>
        <ep:hostWebExID>bjones</ep:hostWebExID>
        <ep:name>Retro</ep:name>
        <ep:createTime>03/04/2021 09:30:00</ep:createTime>
        <ep:size>3.5</ep:size>
        <ep:duration>600</ep:duration>
        <ep:format>MP4</ep:format>
      </ep:recording>
    </serv:bodyContent>
  </serv:body>
</serv:message>"#;

const NO_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<serv:message xmlns:serv="http://www.webex.com/schemas/2002/06/service">
  <serv:header>
    <serv:response>
      <serv:result>FAILURE</serv:result>
      <serv:reason>Sorry, no record found</serv:reason>
      <serv:gsbStatus>PRIMARY</serv:gsbStatus>
      <serv:exceptionID>000015</serv:exceptionID>
    </serv:response>
  </serv:header>
  <serv:body><serv:bodyContent/></serv:body>
</serv:message>"#;

const TICKET: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <ns1:getMeetingTicketResponse xmlns:ns1="NBRXmlService">
      <getMeetingTicketReturn>TK-98765</getMeetingTicketReturn>
    </ns1:getMeetingTicketResponse>
  </soapenv:Body>
</soapenv:Envelope>"#;

const BOUNDARY: &str = "MIMEBoundaryurn_uuid_0123456789";

fn file_config(server: &MockServer) -> FileConfig {
    FileConfig::from_toml_str(&format!(
        r#"
[site]
tenant = "acme"
site_id = "123456"
nbr_domain = "nsj1"

[endpoints]
xml_service = "{}"
nbr_services = "{}"
"#,
        server.url("/WBXService/XMLService"),
        server.url("/nbr/services/")
    ))
    .unwrap()
}

fn connection() -> ConnectionArgs {
    ConnectionArgs {
        username: Some("bjones".to_string()),
        password: Some("s3cret&pw".to_string()),
        tenant: None,
        site_id: None,
    }
}

const REPLY_ENVELOPE: &[u8] = br#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><ns1:downloadNBRStorageFileResponse xmlns:ns1="NBRStorageService"/></soapenv:Body></soapenv:Envelope>"#;

/// Builds a multipart body; `closed == false` leaves the last part without
/// its closing delimiter.
fn multipart_body(parts: &[(&str, &[u8])], closed: bool) -> Vec<u8> {
    let mut body = Vec::new();
    for (i, (content_type, content)) in parts.iter().enumerate() {
        if i > 0 {
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(content);
    }
    if closed {
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    }
    body
}

fn multipart_reply(file_info: &str, data: &[u8]) -> Vec<u8> {
    multipart_body(
        &[
            ("text/xml; charset=UTF-8", REPLY_ENVELOPE),
            ("text/plain", file_info.as_bytes()),
            ("application/octet-stream", data),
        ],
        true,
    )
}

fn multipart_content_type() -> String {
    format!("multipart/related; type=\"text/xml\"; boundary=\"{}\"", BOUNDARY)
}

fn download_args(output_dir: &std::path::Path) -> DownloadArgs {
    DownloadArgs {
        connection: connection(),
        recid: "5551212".to_string(),
        domain: None,
        output_dir: output_dir.to_path_buf(),
    }
}

#[tokio::test]
async fn test_list_for_user_in_date_range_as_csv() {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/WBXService/XMLService")
            .header("SOAPAction", "''")
            .body_contains("<webExID>bjones</webExID><password>s3cret&amp;pw</password><siteID>123456</siteID>")
            .body_contains("<createTimeStart>03/01/2021 00:00:00</createTimeStart><createTimeEnd>03/10/2021 23:59:59</createTimeEnd>")
            .body_contains("<hostWebExID>bjones</hostWebExID>");
        then.status(200)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(LISTING);
    });

    let args = ListArgs {
        connection: connection(),
        from: chrono::NaiveDate::from_ymd_opt(2021, 3, 1),
        to: chrono::NaiveDate::from_ymd_opt(2021, 3, 10),
        userid: Some("bjones".to_string()),
        csv: true,
        ..Default::default()
    };

    let mut out = Vec::new();
    let count = list_command(&args, Some(&file_config(&server)), &mut out)
        .await
        .unwrap();

    list_mock.assert();
    assert_eq!(count, 2);

    let output = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("RecordingID,HostWebExID,RecordingName"));
    assert_eq!(
        lines[1],
        "11111111,bjones,Budget review,03/02/2021 14:00:00,42.125,,,0,1800,ARF,,,,"
    );
    assert!(lines[2].starts_with("22222222,bjones,Retro,"));
}

#[tokio::test]
async fn test_list_year_with_no_records_prints_empty_table() {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(POST).path("/WBXService/XMLService");
        then.status(200)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(NO_RECORDS);
    });

    let args = ListArgs {
        connection: connection(),
        year: Some(2020),
        format: Some(OutputFormat::Table),
        ..Default::default()
    };

    let mut out = Vec::new();
    let count = assert_ok!(list_command(&args, Some(&file_config(&server)), &mut out).await);

    list_mock.assert_hits(14);
    assert_eq!(count, 0);
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
}

#[tokio::test]
async fn test_list_reports_authentication_failure() {
    let server = MockServer::start();

    let failure = NO_RECORDS
        .replace("000015", "030002")
        .replace("Sorry, no record found", "Authentication Server can't authenticate user");
    let list_mock = server.mock(|when, then| {
        when.method(POST).path("/WBXService/XMLService");
        then.status(200).body(failure);
    });

    let args = ListArgs {
        connection: connection(),
        year: Some(2021),
        ..Default::default()
    };

    let err = assert_err!(list_command(&args, Some(&file_config(&server)), Vec::new()).await);

    // The first failing window aborts the listing
    list_mock.assert_hits(1);
    assert_eq!(
        err.to_string(),
        "FAILURE: Authentication Server can't authenticate user"
    );
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_list_reports_http_status_for_non_xml_error_page() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/WBXService/XMLService");
        then.status(503)
            .header("Content-Type", "text/html")
            .body("<html><body>Service Unavailable</body></html>");
    });

    let args = ListArgs {
        connection: connection(),
        year: Some(2021),
        ..Default::default()
    };

    let err = list_command(&args, Some(&file_config(&server)), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WtError::HttpStatusError { status: 503, .. }));
}

#[tokio::test]
async fn test_download_streams_recording_to_output_dir() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    let ticket_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/nbr/services/nbrXmlService")
            .query_param("method", "getMeetingTicket")
            .query_param("siteId", "123456")
            .query_param("username", "bjones")
            .query_param("password", "s3cret&pw")
            .query_param("service", "MC");
        then.status(200)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(TICKET);
    });

    let recording: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let download_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/nbr/services/")
            .body_contains(r#"<siteId xsi:type="xsd:long">123456</siteId>"#)
            .body_contains(r#"<recordId xsi:type="xsd:long">5551212</recordId>"#)
            .body_contains(r#"<ticket xsi:type="xsd:string">TK-98765</ticket>"#);
        then.status(200)
            .header(
                "Content-Type",
                format!(
                    "multipart/related; type=\"text/xml\"; boundary=\"{}\"",
                    BOUNDARY
                ),
            )
            .body(multipart_reply("Budget review.arf\n4096\n", &recording));
    });

    let args = DownloadArgs {
        connection: connection(),
        recid: "5551212".to_string(),
        domain: None,
        output_dir: temp_dir.path().join("recordings"),
    };

    let file = download_command(&args, Some(&file_config(&server)))
        .await
        .unwrap();

    ticket_mock.assert();
    download_mock.assert();

    assert_eq!(file.info.name, "Budget review.arf");
    assert_eq!(file.info.declared_size, Some(4096));
    assert_eq!(file.bytes_written, 4096);
    assert_eq!(
        file.path,
        temp_dir.path().join("recordings").join("Budget review.arf")
    );
    assert_eq!(std::fs::read(&file.path).unwrap(), recording);
}

#[tokio::test]
async fn test_download_keeps_file_inside_output_dir() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET);
    });
    server.mock(|when, then| {
        when.method(POST).path("/nbr/services/");
        then.status(200)
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(multipart_reply("../../escape.arf", b"abc"));
    });

    let args = DownloadArgs {
        connection: connection(),
        recid: "1".to_string(),
        domain: None,
        output_dir: temp_dir.path().to_path_buf(),
    };

    let file = download_command(&args, Some(&file_config(&server)))
        .await
        .unwrap();

    assert_eq!(file.path, temp_dir.path().join("escape.arf"));
    assert_eq!(file.info.declared_size, None);
    assert_eq!(std::fs::read(&file.path).unwrap(), b"abc");
}

#[tokio::test]
async fn test_download_stops_on_ticket_error_code() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET.replace("TK-98765", "AS0012"));
    });
    let download_mock = server.mock(|when, then| {
        when.method(POST).path("/nbr/services/");
        then.status(200);
    });

    let args = DownloadArgs {
        connection: connection(),
        recid: "5551212".to_string(),
        domain: None,
        output_dir: temp_dir.path().to_path_buf(),
    };

    let err = download_command(&args, Some(&file_config(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, WtError::TicketRejected { ref code } if code == "AS0012"));
    assert!(!err.to_string().contains("s3cret"));
    download_mock.assert_hits(0);
}

#[tokio::test]
async fn test_download_reports_soap_fault() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET);
    });
    server.mock(|when, then| {
        when.method(POST).path("/nbr/services/");
        then.status(500)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><soapenv:Fault><faultcode>soapenv:Server</faultcode><faultstring>Record not found</faultstring></soapenv:Fault></soapenv:Body></soapenv:Envelope>"#,
            );
    });

    let args = DownloadArgs {
        connection: connection(),
        recid: "404".to_string(),
        domain: None,
        output_dir: temp_dir.path().to_path_buf(),
    };

    let err = download_command(&args, Some(&file_config(&server)))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "FaultCode: soapenv:Server FaultString: Record not found"
    );
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_rejects_invalid_recording_id_before_any_request() {
    let server = MockServer::start();
    let ticket_mock = server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET);
    });

    let args = DownloadArgs {
        connection: connection(),
        recid: "12; DROP".to_string(),
        domain: None,
        output_dir: PathBuf::from("."),
    };

    let err = download_command(&args, Some(&file_config(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, WtError::InvalidConfigValueError { .. }));
    ticket_mock.assert_hits(0);
}

#[tokio::test]
async fn test_download_rejects_reply_with_missing_data_part() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET);
    });
    server.mock(|when, then| {
        when.method(POST).path("/nbr/services/");
        then.status(200)
            .header("Content-Type", multipart_content_type())
            .body(multipart_body(
                &[
                    ("text/xml; charset=UTF-8", REPLY_ENVELOPE),
                    ("text/plain", &b"weekly.arf\n11\n"[..]),
                ],
                true,
            ));
    });

    let err = download_command(&download_args(temp_dir.path()), Some(&file_config(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, WtError::ResponseFormatError { .. }));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_rejects_plain_reply_without_fault() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET);
    });
    server.mock(|when, then| {
        when.method(POST).path("/nbr/services/");
        then.status(200)
            .header("Content-Type", "text/plain")
            .body("OK");
    });

    let err = download_command(&download_args(temp_dir.path()), Some(&file_config(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, WtError::ResponseFormatError { .. }));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_removes_partial_file_when_data_is_cut_short() {
    let server = MockServer::start();
    let temp_dir = TempDir::new().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/nbr/services/nbrXmlService");
        then.status(200).body(TICKET);
    });
    server.mock(|when, then| {
        when.method(POST).path("/nbr/services/");
        then.status(200)
            .header("Content-Type", multipart_content_type())
            .body(multipart_body(
                &[
                    ("text/xml; charset=UTF-8", REPLY_ENVELOPE),
                    ("text/plain", &b"weekly.arf\n11\n"[..]),
                    ("application/octet-stream", &b"RECOR"[..]),
                ],
                false,
            ));
    });

    let err = download_command(&download_args(temp_dir.path()), Some(&file_config(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, WtError::MultipartError(_)));
    assert!(!temp_dir.path().join("weekly.arf").exists());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_ticket_transport_failure_does_not_leak_password() {
    let temp_dir = TempDir::new().unwrap();
    // 沒有服務在監聽的位址
    let file = FileConfig::from_toml_str(
        r#"
[site]
tenant = "acme"
site_id = "123456"
nbr_domain = "nsj1"

[endpoints]
xml_service = "http://127.0.0.1:1/WBXService/XMLService"
nbr_services = "http://127.0.0.1:1/nbr/services/"
"#,
    )
    .unwrap();

    let err = download_command(&download_args(temp_dir.path()), Some(&file))
        .await
        .unwrap_err();

    assert!(matches!(err, WtError::HttpError(_)));
    for text in [
        err.to_string(),
        format!("{:?}", err),
        err.user_friendly_message(),
    ] {
        assert!(!text.contains("password="), "leaked query in {}", text);
        assert!(!text.contains("s3cret"), "leaked password in {}", text);
    }
}
