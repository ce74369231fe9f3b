use crate::adapters::soap::{
    self, download_body, list_recordings_body, SOAP_ACTION, TEXT_XML_CONTENT_TYPE,
    XML_CONTENT_TYPE,
};
use crate::adapters::xml::{
    check_listing, parse_fault, parse_file_info, parse_listing, parse_ticket_envelope,
    ticket_from_envelope,
};
use crate::domain::model::{DownloadedFile, ListRequest, ListingPage};
use crate::domain::ports::{RecordingService, Storage};
use crate::utils::error::{Result, WtError};
use async_trait::async_trait;
use multer::{Field, Multipart};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// 票證服務固定使用 MC
const TICKET_SERVICE: &str = "MC";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub xml_service: Url,
    pub nbr_services: Option<Url>,
}

fn parse_endpoint(field: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| WtError::InvalidConfigValueError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

impl Endpoints {
    /// Hosted URLs for `tenant`, plus the storage services of `nbr_domain`.
    pub fn for_site(tenant: &str, nbr_domain: Option<&str>) -> Result<Self> {
        let xml_service = parse_endpoint(
            "tenant",
            &format!("https://{}.webex.com/WBXService/XMLService", tenant),
        )?;
        let nbr_services = nbr_domain
            .map(|domain| {
                parse_endpoint("domain", &format!("https://{}.webex.com/nbr/services/", domain))
            })
            .transpose()?;
        Ok(Self {
            xml_service,
            nbr_services,
        })
    }

    pub fn new(xml_service: Url, nbr_services: Option<Url>) -> Self {
        Self {
            xml_service,
            nbr_services: nbr_services.map(with_trailing_slash),
        }
    }
}

// Url::join 只有在基底以 / 結尾時才會保留最後一段路徑
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Option<Duration>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: None,
        }
    }
}

/// HTTP client for the XML service and the NBR storage services of one site.
pub struct WebexClient {
    client: Client,
    endpoints: Endpoints,
    credentials: Credentials,
    site_id: String,
}

impl WebexClient {
    pub fn new(
        endpoints: Endpoints,
        credentials: Credentials,
        site_id: impl Into<String>,
        options: HttpOptions,
    ) -> Result<Self> {
        let mut builder = Client::builder().connect_timeout(options.connect_timeout);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoints,
            credentials,
            site_id: site_id.into(),
        })
    }

    fn nbr_services(&self) -> Result<&Url> {
        self.endpoints
            .nbr_services
            .as_ref()
            .ok_or_else(|| WtError::MissingConfigError {
                field: "domain".to_string(),
            })
    }

    /// The ticket call carries the password in its query string, so this URL
    /// must never reach a log line or an error message.
    fn ticket_url(&self) -> Result<Url> {
        let mut url = self.ticket_endpoint()?;
        url.query_pairs_mut()
            .append_pair("method", "getMeetingTicket")
            .append_pair("siteId", &self.site_id)
            .append_pair("username", &self.credentials.username)
            .append_pair("password", &self.credentials.password)
            .append_pair("service", TICKET_SERVICE);
        Ok(url)
    }

    fn ticket_endpoint(&self) -> Result<Url> {
        self.nbr_services()?
            .join("nbrXmlService")
            .map_err(|e| WtError::ConfigError {
                message: format!("cannot build ticket URL: {}", e),
            })
    }

    async fn copy_field(field: &mut Field<'static>, file: &mut File) -> Result<u64> {
        let mut written = 0u64;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

fn missing_part(what: &str) -> WtError {
    WtError::ResponseFormatError {
        message: format!("download reply ended before the {} part", what),
    }
}

fn status_error(status: StatusCode, endpoint: &Url) -> WtError {
    WtError::HttpStatusError {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
    }
}

#[async_trait]
impl RecordingService for WebexClient {
    async fn list_recordings(&self, request: &ListRequest) -> Result<ListingPage> {
        let body = list_recordings_body(&self.credentials, &self.site_id, request);

        let response = self
            .client
            .post(self.endpoints.xml_service.clone())
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .header("SOAPAction", SOAP_ACTION)
            .header(ACCEPT, soap::ACCEPT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("XML service responded with {}", status);
        let text = response.text().await?;

        match parse_listing(&text) {
            Ok(page) => check_listing(page),
            Err(_) if !status.is_success() => {
                Err(status_error(status, &self.endpoints.xml_service))
            }
            Err(e) => Err(e),
        }
    }

    async fn meeting_ticket(&self) -> Result<String> {
        let url = self.ticket_url()?;

        let response = self
            .client
            .get(url)
            .header(CONTENT_TYPE, TEXT_XML_CONTENT_TYPE)
            .header("SOAPAction", SOAP_ACTION)
            .header(ACCEPT, soap::ACCEPT)
            .send()
            .await
            .map_err(|e| WtError::HttpError(e.without_url()))?;

        let status = response.status();
        tracing::debug!("Ticket service responded with {}", status);
        let text = response
            .text()
            .await
            .map_err(|e| WtError::HttpError(e.without_url()))?;

        match parse_ticket_envelope(&text) {
            Ok(envelope) => ticket_from_envelope(envelope),
            Err(_) if !status.is_success() => Err(status_error(status, &self.ticket_endpoint()?)),
            Err(e) => Err(e),
        }
    }

    async fn download_recording<St: Storage>(
        &self,
        recording_id: &str,
        ticket: &str,
        storage: &St,
    ) -> Result<DownloadedFile> {
        let endpoint = self.nbr_services()?.clone();
        let body = download_body(&self.site_id, recording_id, ticket);

        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .header("SOAPAction", SOAP_ACTION)
            .header(ACCEPT, soap::ACCEPT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        tracing::debug!(
            "Storage service responded with {} ({})",
            status,
            content_type
        );

        let boundary = content_type
            .parse::<mime::Mime>()
            .ok()
            .filter(|m| m.type_() == mime::MULTIPART)
            .and_then(|m| m.get_param(mime::BOUNDARY).map(|b| b.as_str().to_string()));

        let Some(boundary) = boundary else {
            // 非 multipart 通常是 SOAP fault
            let text = response.text().await?;
            if let Ok(Some(fault)) = parse_fault(&text) {
                return Err(WtError::SoapFault {
                    code: fault.code,
                    message: fault.message,
                });
            }
            if !status.is_success() {
                return Err(status_error(status, &endpoint));
            }
            return Err(WtError::ResponseFormatError {
                message: format!("expected a multipart reply, got {:?}", content_type),
            });
        };

        let mut multipart = Multipart::new(response.bytes_stream(), boundary);

        // 三個部分依序為：SOAP 回應、檔案資訊、錄影檔本體
        let envelope = multipart
            .next_field()
            .await?
            .ok_or_else(|| missing_part("SOAP envelope"))?;
        let envelope_xml = envelope.text().await?;
        if let Ok(Some(fault)) = parse_fault(&envelope_xml) {
            return Err(WtError::SoapFault {
                code: fault.code,
                message: fault.message,
            });
        }

        let info_field = multipart
            .next_field()
            .await?
            .ok_or_else(|| missing_part("file information"))?;
        let info = parse_file_info(&info_field.text().await?)?;
        tracing::info!("⬇️ Downloading {}", info.name);

        let mut data = multipart
            .next_field()
            .await?
            .ok_or_else(|| missing_part("recording data"))?;

        let (path, mut file) = storage.create_file(&info.name).await?;
        let bytes_written = match Self::copy_field(&mut data, &mut file).await {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(
                        "Could not remove partial download {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                return Err(e);
            }
        };

        Ok(DownloadedFile {
            path,
            info,
            bytes_written,
        })
    }
}
