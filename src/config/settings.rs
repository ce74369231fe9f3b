use crate::adapters::{Credentials, Endpoints, HttpOptions};
use crate::config::toml_config::FileConfig;
use crate::config::ConnectionArgs;
use crate::utils::error::{Result, WtError};
use crate::utils::validation::{
    validate_host_label, validate_numeric_id, validate_required_field, Validate,
};
use dialoguer::{Input, Password};
use std::time::Duration;
use url::Url;

/// Connection settings after merging command-line flags over the config file.
#[derive(Clone)]
pub struct SiteSettings {
    pub tenant: String,
    pub site_id: String,
    pub nbr_domain: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub xml_service_override: Option<String>,
    pub nbr_services_override: Option<String>,
    pub http: HttpOptions,
}

impl std::fmt::Debug for SiteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteSettings")
            .field("tenant", &self.tenant)
            .field("site_id", &self.site_id)
            .field("nbr_domain", &self.nbr_domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("xml_service_override", &self.xml_service_override)
            .field("nbr_services_override", &self.nbr_services_override)
            .field("http", &self.http)
            .finish()
    }
}

fn pick(flag: &Option<String>, file: Option<&Option<String>>) -> Option<String> {
    flag.clone()
        .or_else(|| file.and_then(|value| value.clone()))
        .filter(|value| !value.trim().is_empty())
}

fn parse_override(field: &str, raw: &Option<String>) -> Result<Option<Url>> {
    raw.as_deref()
        .map(|value| {
            Url::parse(value).map_err(|e| WtError::InvalidConfigValueError {
                field: field.to_string(),
                value: value.to_string(),
                reason: format!("Invalid URL format: {}", e),
            })
        })
        .transpose()
}

impl SiteSettings {
    pub fn resolve(
        connection: &ConnectionArgs,
        nbr_domain: Option<&str>,
        file: Option<&FileConfig>,
    ) -> Result<Self> {
        let tenant = pick(&connection.tenant, file.map(|f| &f.site.tenant));
        let site_id = pick(&connection.site_id, file.map(|f| &f.site.site_id));
        let nbr_domain = pick(
            &nbr_domain.map(str::to_string),
            file.map(|f| &f.site.nbr_domain),
        );

        let mut http = HttpOptions::default();
        if let Some(seconds) = file.and_then(|f| f.http.connect_timeout_seconds) {
            http.connect_timeout = Duration::from_secs(seconds);
        }
        if let Some(seconds) = file.and_then(|f| f.http.timeout_seconds) {
            http.timeout = Some(Duration::from_secs(seconds));
        }

        let settings = Self {
            tenant: validate_required_field("tenant", &tenant)?.clone(),
            site_id: validate_required_field("site", &site_id)?.clone(),
            nbr_domain,
            username: pick(&connection.username, file.map(|f| &f.credentials.username)),
            // 密碼可能含空白，只排除空字串；空字串會改為互動輸入
            password: connection
                .password
                .clone()
                .or_else(|| file.and_then(|f| f.credentials.password.clone()))
                .filter(|password| !password.is_empty()),
            xml_service_override: file.and_then(|f| f.endpoints.xml_service.clone()),
            nbr_services_override: file.and_then(|f| f.endpoints.nbr_services.clone()),
            http,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Downloads go through the storage data centre and need its domain.
    pub fn require_nbr_domain(&self) -> Result<&str> {
        if self.nbr_services_override.is_some() {
            return Ok(self.nbr_domain.as_deref().unwrap_or_default());
        }
        validate_required_field("domain", &self.nbr_domain).map(String::as_str)
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        let hosted = Endpoints::for_site(&self.tenant, self.nbr_domain.as_deref())?;
        let xml_service = parse_override("endpoints.xml_service", &self.xml_service_override)?
            .unwrap_or(hosted.xml_service);
        let nbr_services = parse_override("endpoints.nbr_services", &self.nbr_services_override)?
            .or(hosted.nbr_services);
        Ok(Endpoints::new(xml_service, nbr_services))
    }

    /// Returns the configured credentials, asking on the terminal for
    /// whatever is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let username = match &self.username {
            Some(username) => username.clone(),
            None => Input::<String>::new()
                .with_prompt("Enter Username")
                .interact_text()?
                .trim()
                .to_string(),
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => Password::new().with_prompt("Enter Password").interact()?,
        };
        Ok(Credentials { username, password })
    }
}

impl Validate for SiteSettings {
    fn validate(&self) -> Result<()> {
        validate_host_label("tenant", &self.tenant)?;
        validate_numeric_id("site", &self.site_id)?;
        if let Some(domain) = &self.nbr_domain {
            validate_host_label("domain", domain)?;
        }
        Ok(())
    }
}
