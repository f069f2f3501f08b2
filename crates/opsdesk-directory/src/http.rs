use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct HttpDirectoryConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub location_id: Option<String>,
    pub api_version: Option<String>,
    pub page_size: Option<u32>,
    pub user_agent: Option<String>,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
}

#[cfg(feature = "http-directory")]
mod imp {
    use super::HttpDirectoryConfig;
    use crate::envelope::parse_page;
    use crate::source::DirectoryClient;
    use crate::{DirectoryError, Result};
    use opsdesk_core::domain::RawContact;
    use reqwest::blocking::Client;
    use reqwest::header::ACCEPT;
    use url::Url;

    #[derive(Debug, Clone)]
    pub struct HttpDirectoryClient {
        client: Client,
        base_url: Url,
        token: Option<String>,
        location_id: Option<String>,
        api_version: Option<String>,
        page_size: Option<u32>,
    }

    impl HttpDirectoryClient {
        pub fn new(config: HttpDirectoryConfig) -> Result<Self> {
            let base_url = Url::parse(&config.base_url)?;
            if !matches!(base_url.scheme(), "http" | "https") {
                return Err(DirectoryError::Config(
                    "directory url must use http or https".to_string(),
                ));
            }
            let client = Client::builder()
                .user_agent(config.user_agent.as_deref().unwrap_or("opsdesk"))
                .timeout(config.timeout)
                .build()?;

            Ok(Self {
                client,
                base_url,
                token: config.token,
                location_id: config.location_id,
                api_version: config.api_version,
                page_size: config.page_size,
            })
        }

        pub fn page_url(&self, page: u32) -> Url {
            let mut url = self.base_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("page", &page.to_string());
                if let Some(location_id) = &self.location_id {
                    query.append_pair("locationId", location_id);
                }
                if let Some(page_size) = self.page_size {
                    query.append_pair("limit", &page_size.to_string());
                }
            }
            url
        }
    }

    impl DirectoryClient for HttpDirectoryClient {
        fn source_name(&self) -> &'static str {
            "crm-directory"
        }

        fn fetch_page(&self, page: u32) -> Result<Vec<RawContact>> {
            let mut request = self
                .client
                .get(self.page_url(page))
                .header(ACCEPT, "application/json");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if let Some(version) = &self.api_version {
                request = request.header("Version", version);
            }

            let response = request.send()?;
            let status = response.status();
            if !status.is_success() {
                return Err(DirectoryError::Status {
                    page,
                    status: status.as_u16(),
                });
            }
            let body = response.text()?;
            parse_page(&body)
        }
    }

}

#[cfg(not(feature = "http-directory"))]
mod imp {
    use super::HttpDirectoryConfig;
    use crate::source::DirectoryClient;
    use crate::{DirectoryError, Result};
    use opsdesk_core::domain::RawContact;

    #[derive(Debug, Clone)]
    pub struct HttpDirectoryClient {
        #[allow(dead_code)]
        config: HttpDirectoryConfig,
    }

    impl HttpDirectoryClient {
        pub fn new(config: HttpDirectoryConfig) -> Result<Self> {
            Ok(Self { config })
        }
    }

    impl DirectoryClient for HttpDirectoryClient {
        fn source_name(&self) -> &'static str {
            "crm-directory"
        }

        fn fetch_page(&self, _page: u32) -> Result<Vec<RawContact>> {
            Err(DirectoryError::Unavailable(
                "directory lookups require the http-directory feature".to_string(),
            ))
        }
    }

}

pub use imp::HttpDirectoryClient;
