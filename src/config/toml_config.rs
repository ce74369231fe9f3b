use crate::utils::error::{Result, WtError};
use crate::utils::validation::{
    validate_host_label, validate_numeric_id, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub site: SiteSection,
    pub credentials: CredentialsSection,
    pub endpoints: EndpointsSection,
    pub http: HttpSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub tenant: Option<String>,
    pub site_id: Option<String>,
    pub nbr_domain: Option<String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsSection {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsSection")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// 覆寫預設的 *.webex.com 位址（測試或代理用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsSection {
    pub xml_service: Option<String>,
    pub nbr_services: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub connect_timeout_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"))
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| WtError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${WT_PASSWORD})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(tenant) = &self.site.tenant {
            validate_host_label("site.tenant", tenant)?;
        }
        if let Some(site_id) = &self.site.site_id {
            validate_numeric_id("site.site_id", site_id)?;
        }
        if let Some(domain) = &self.site.nbr_domain {
            validate_host_label("site.nbr_domain", domain)?;
        }
        if let Some(url) = &self.endpoints.xml_service {
            validate_url("endpoints.xml_service", url)?;
        }
        if let Some(url) = &self.endpoints.nbr_services {
            validate_url("endpoints.nbr_services", url)?;
        }
        if let Some(seconds) = self.http.connect_timeout_seconds {
            validate_range("http.connect_timeout_seconds", seconds, 1, 3600)?;
        }
        if let Some(seconds) = self.http.timeout_seconds {
            validate_range("http.timeout_seconds", seconds, 1, 86_400)?;
        }
        Ok(())
    }
}
