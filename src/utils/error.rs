use thiserror::Error;

#[derive(Error, Debug)]
pub enum WtError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Multipart parsing error: {0}")]
    MultipartError(#[from] multer::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),

    #[error("{result}: {reason}")]
    ServiceError {
        result: String,
        reason: String,
        exception_id: String,
    },

    #[error("FaultCode: {code} FaultString: {message}")]
    SoapFault { code: String, message: String },

    #[error("Ticket request rejected: {code}")]
    TicketRejected { code: String },

    #[error("Unexpected HTTP status {status} from {endpoint}")]
    HttpStatusError { status: u16, endpoint: String },

    #[error("Malformed response: {message}")]
    ResponseFormatError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Vendor,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WtError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WtError::ConfigError { .. }
            | WtError::MissingConfigError { .. }
            | WtError::InvalidConfigValueError { .. }
            | WtError::ConfigValidationError { .. }
            | WtError::PromptError(_) => ErrorCategory::Configuration,
            WtError::HttpError(_) | WtError::HttpStatusError { .. } => ErrorCategory::Network,
            WtError::ServiceError { .. }
            | WtError::SoapFault { .. }
            | WtError::TicketRejected { .. } => ErrorCategory::Vendor,
            WtError::XmlError(_)
            | WtError::MultipartError(_)
            | WtError::ResponseFormatError { .. } => ErrorCategory::Data,
            // 報表輸出失敗與 IO 失敗同一類
            WtError::IoError(_) | WtError::CsvError(_) | WtError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    /// 嚴重程度決定 CLI 的退出碼
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Vendor => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            WtError::MissingConfigError { field } => format!(
                "Pass --{} on the command line or set it in the config file",
                field.replace('_', "-")
            ),
            WtError::InvalidConfigValueError { field, .. }
            | WtError::ConfigValidationError { field, .. } => {
                format!("Check the value given for {}", field)
            }
            WtError::ConfigError { .. } => "Check the config file syntax".to_string(),
            WtError::PromptError(_) => {
                "Pass --username and --password when running without a terminal".to_string()
            }
            WtError::HttpError(_) => {
                "Check network connectivity and the tenant / domain names".to_string()
            }
            WtError::HttpStatusError { .. } => {
                "Verify the service URL; the tenant or NBR domain may be wrong".to_string()
            }
            WtError::ServiceError { .. } => {
                "Verify the admin credentials and site ID for this tenant".to_string()
            }
            WtError::SoapFault { .. } | WtError::TicketRejected { .. } => {
                "Verify the credentials, site ID and NBR domain; the recording ID may not exist"
                    .to_string()
            }
            WtError::XmlError(_)
            | WtError::MultipartError(_)
            | WtError::ResponseFormatError { .. } => {
                "The service returned an unexpected response; rerun with --verbose".to_string()
            }
            WtError::CsvError(_) | WtError::SerializationError(_) => {
                "Check that the output stream is still open and writable".to_string()
            }
            WtError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Network => format!("Could not reach the service: {}", self),
            ErrorCategory::Vendor => format!("The service rejected the request: {}", self),
            ErrorCategory::Data => format!("Could not read the service response: {}", self),
            ErrorCategory::System => format!("Local system error: {}", self),
        }
    }
}

impl From<toml::de::Error> for WtError {
    fn from(e: toml::de::Error) -> Self {
        WtError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, WtError>;
