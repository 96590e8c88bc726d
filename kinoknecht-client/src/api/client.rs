use async_trait::async_trait;
use kinoknecht_model::{
    Category, CatalogMatch, Endpoint, EpisodeId, HttpMethod, ShowId, ShowMatch,
    VideoFileId,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::{CatalogApi, CreateRequest, add_to_show_fields};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// HTTP client for the kinoknecht server endpoints
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ClientError::ClientBuild)?;

        debug!("Creating API client with base URL: {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint paths are appended to the script root verbatim.
    pub fn build_url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.path()
        )
    }

    /// Request builder with the endpoint's verb and full URL.
    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        let url = self.build_url(endpoint);
        match endpoint.method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let request = self.request(endpoint).query(query);
        let body = self.execute(endpoint, request).await?;
        serde_json::from_str(&body)
            .map_err(|source| ClientError::Decode { endpoint, source })
    }

    async fn post_form(
        &self,
        endpoint: Endpoint,
        fields: &[(&'static str, String)],
    ) -> Result<String> {
        let request = self.request(endpoint).form(fields);
        let body = self.execute(endpoint, request).await?;
        parse_id_body(endpoint, &body)
    }

    async fn execute(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Http { endpoint, source })?;
        read_body(endpoint, response).await
    }
}

async fn read_body(endpoint: Endpoint, response: Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ClientError::Http { endpoint, source })?;

    if !status.is_success() {
        warn!("{} failed with status {}", endpoint, status);
        return Err(ClientError::Status {
            endpoint,
            status,
            body,
        });
    }
    Ok(body)
}

/// Mutating endpoints answer with a bare id, sometimes JSON encoded.
pub(crate) fn parse_id_body(endpoint: Endpoint, body: &str) -> Result<String> {
    let trimmed = body.trim();
    let id = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed)
            .map_err(|source| ClientError::Decode { endpoint, source })?
    } else {
        trimmed.to_string()
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::EmptyResponse { endpoint });
    }
    Ok(id.to_string())
}

#[async_trait]
impl CatalogApi for ApiClient {
    async fn get_clean_name(&self, vfid: &VideoFileId) -> Result<String> {
        self.get_json(Endpoint::GetCleanName, &[("vfid", vfid.as_str())])
            .await
    }

    async fn query_imdb(&self, searchstr: &str) -> Result<Vec<CatalogMatch>> {
        self.get_json(Endpoint::QueryImdb, &[("searchstr", searchstr)])
            .await
    }

    async fn query(
        &self,
        category: Category,
        searchstr: &str,
    ) -> Result<Vec<ShowMatch>> {
        self.get_json(
            Endpoint::Query,
            &[("type", category.as_str()), ("searchstr", searchstr)],
        )
        .await
    }

    async fn create(&self, request: &CreateRequest) -> Result<String> {
        self.post_form(Endpoint::Create, &request.form_fields()).await
    }

    async fn add_to_show(
        &self,
        episodes: &[EpisodeId],
        show: &ShowId,
    ) -> Result<String> {
        self.post_form(Endpoint::AddToShow, &add_to_show_fields(episodes, show))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_keeps_script_root() {
        let config = ClientConfig::with_base_url("media.lan/kino/").unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.build_url(Endpoint::AddToShow),
            "http://media.lan/kino/_add_to_show"
        );

        let config = ClientConfig::with_base_url("http://localhost:6600").unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.build_url(Endpoint::Create),
            "http://localhost:6600/_create"
        );
    }

    #[test]
    fn id_bodies_accept_plain_and_quoted() {
        assert_eq!(parse_id_body(Endpoint::Create, " 12\n").unwrap(), "12");
        assert_eq!(parse_id_body(Endpoint::Create, "\"7\"").unwrap(), "7");
        assert!(matches!(
            parse_id_body(Endpoint::AddToShow, "  "),
            Err(ClientError::EmptyResponse { .. })
        ));
    }
}
