//! API capabilities and their HTTP implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use nimbus_sdk::{ClientConfig, EdgeApi, HttpClient};
//!
//! # async fn example() -> Result<(), nimbus_sdk::ApiError> {
//! let client = HttpClient::new(ClientConfig::new("token"))?;
//! let list = client.list_instances("project", "eu01").await?;
//! println!("{list:?}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateInstancePayload, Instance, InstanceList, Kubeconfig, PlanList, Project, Token,
    UpdateInstancePayload,
};
use crate::paths;

/// Default edge-cloud API endpoint.
pub const DEFAULT_EDGE_ENDPOINT: &str = "https://edge.api.nimbus.cloud";

/// Default resource-manager API endpoint.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://resource-manager.api.nimbus.cloud";

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Capabilities
// ============================================================================

/// The edge-cloud API.
///
/// Instances can be addressed by id or by display name; every single-instance
/// operation exists in both forms. Calls that return a body yield `None` when
/// the server answered successfully without one.
#[allow(async_fn_in_trait)]
pub trait EdgeApi {
    /// Create an instance.
    async fn create_instance(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> ApiResult<Option<Instance>>;

    /// Get an instance by id.
    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> ApiResult<Option<Instance>>;

    /// Get an instance by display name.
    async fn get_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
    ) -> ApiResult<Option<Instance>>;

    /// List the instances of a project in a region.
    async fn list_instances(&self, project_id: &str, region: &str)
    -> ApiResult<Option<InstanceList>>;

    /// Update an instance by id.
    async fn update_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        payload: &UpdateInstancePayload,
    ) -> ApiResult<()>;

    /// Update an instance by display name.
    async fn update_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        payload: &UpdateInstancePayload,
    ) -> ApiResult<()>;

    /// Delete an instance by id.
    async fn delete_instance(&self, project_id: &str, region: &str, instance_id: &str)
    -> ApiResult<()>;

    /// Delete an instance by display name.
    async fn delete_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
    ) -> ApiResult<()>;

    /// List the plans available to a project.
    async fn list_plans(&self, project_id: &str) -> ApiResult<Option<PlanList>>;

    /// Issue a kubeconfig for an instance addressed by id.
    async fn get_kubeconfig(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Kubeconfig>>;

    /// Issue a kubeconfig for an instance addressed by display name.
    async fn get_kubeconfig_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Kubeconfig>>;

    /// Issue a token for an instance addressed by id.
    async fn get_token(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Token>>;

    /// Issue a token for an instance addressed by display name.
    async fn get_token_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Token>>;
}

/// The resource-manager API, used to label projects in prompts and messages.
#[allow(async_fn_in_trait)]
pub trait ProjectApi {
    /// Get a project.
    async fn get_project(&self, project_id: &str) -> ApiResult<Option<Project>>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Settings for [`HttpClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the edge-cloud API.
    pub edge_endpoint: String,
    /// Base URL of the resource-manager API.
    pub resource_manager_endpoint: String,
    /// Bearer token sent with every request.
    pub access_token: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl ClientConfig {
    /// Settings with the default endpoints.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            edge_endpoint: DEFAULT_EDGE_ENDPOINT.to_string(),
            resource_manager_endpoint: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
            access_token: access_token.into(),
            user_agent: concat!("nimbus-sdk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("edge_endpoint", &self.edge_endpoint)
            .field("resource_manager_endpoint", &self.resource_manager_endpoint)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// `reqwest`-backed client for both APIs.
pub struct HttpClient {
    http: reqwest::Client,
    edge_endpoint: Url,
    resource_manager_endpoint: Url,
    access_token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("edge_endpoint", &self.edge_endpoint.as_str())
            .field(
                "resource_manager_endpoint",
                &self.resource_manager_endpoint.as_str(),
            )
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is not a valid base URL or the TLS
    /// backend cannot be initialized.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            edge_endpoint: parse_base(&config.edge_endpoint)?,
            resource_manager_endpoint: parse_base(&config.resource_manager_endpoint)?,
            access_token: config.access_token,
        })
    }

    fn url(base: &Url, segments: &[String]) -> ApiResult<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidEndpoint(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    fn edge(&self, method: Method, segments: &[String]) -> ApiResult<RequestBuilder> {
        let url = Self::url(&self.edge_endpoint, segments)?;
        Ok(self.request(method, url))
    }

    /// Send a request and decode its body, `None` for an empty body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<Option<T>> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        trace!(len = bytes.len(), "Received response body");
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Send a request whose body is irrelevant.
    async fn execute(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await?;
        Ok(())
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let request = builder.build()?;
        let method = request.method().to_string();
        let path = request.url().path().to_string();
        debug!(method = %method, url = %request.url(), "Sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        debug!(status = status.as_u16(), method = %method, path = %path, "Request failed");
        Err(ApiError::Status {
            method,
            path,
            status: status.as_u16(),
            message,
            body,
        })
    }

    fn with_body<P: Serialize>(request: RequestBuilder, payload: &P) -> RequestBuilder {
        request.json(payload)
    }

    fn credential_path(mut segments: Vec<String>, kind: &str) -> Vec<String> {
        segments.push(kind.to_string());
        segments
    }
}

fn parse_base(endpoint: &str) -> ApiResult<Url> {
    let url = Url::parse(endpoint).map_err(|_| ApiError::InvalidEndpoint(endpoint.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url)
}

/// Pull a human-readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

impl EdgeApi for HttpClient {
    async fn create_instance(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> ApiResult<Option<Instance>> {
        let request = self.edge(Method::POST, &paths::instances(project_id, region))?;
        self.fetch(Self::with_body(request, payload)).await
    }

    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> ApiResult<Option<Instance>> {
        let request = self.edge(Method::GET, &paths::instance(project_id, region, instance_id))?;
        self.fetch(request).await
    }

    async fn get_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
    ) -> ApiResult<Option<Instance>> {
        let path = paths::instance_by_name(project_id, region, display_name);
        self.fetch(self.edge(Method::GET, &path)?).await
    }

    async fn list_instances(
        &self,
        project_id: &str,
        region: &str,
    ) -> ApiResult<Option<InstanceList>> {
        let request = self.edge(Method::GET, &paths::instances(project_id, region))?;
        self.fetch(request).await
    }

    async fn update_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        payload: &UpdateInstancePayload,
    ) -> ApiResult<()> {
        let request = self.edge(Method::PUT, &paths::instance(project_id, region, instance_id))?;
        self.execute(Self::with_body(request, payload)).await
    }

    async fn update_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        payload: &UpdateInstancePayload,
    ) -> ApiResult<()> {
        let path = paths::instance_by_name(project_id, region, display_name);
        let request = self.edge(Method::PUT, &path)?;
        self.execute(Self::with_body(request, payload)).await
    }

    async fn delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> ApiResult<()> {
        let path = paths::instance(project_id, region, instance_id);
        self.execute(self.edge(Method::DELETE, &path)?).await
    }

    async fn delete_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
    ) -> ApiResult<()> {
        let path = paths::instance_by_name(project_id, region, display_name);
        self.execute(self.edge(Method::DELETE, &path)?).await
    }

    async fn list_plans(&self, project_id: &str) -> ApiResult<Option<PlanList>> {
        self.fetch(self.edge(Method::GET, &paths::plans(project_id))?)
            .await
    }

    async fn get_kubeconfig(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Kubeconfig>> {
        let path = Self::credential_path(
            paths::instance(project_id, region, instance_id),
            "kubeconfig",
        );
        let request = self.edge(Method::GET, &path)?;
        self.fetch(request.query(&[("expirationSeconds", expiration_seconds)]))
            .await
    }

    async fn get_kubeconfig_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Kubeconfig>> {
        let path = Self::credential_path(
            paths::instance_by_name(project_id, region, display_name),
            "kubeconfig",
        );
        let request = self.edge(Method::GET, &path)?;
        self.fetch(request.query(&[("expirationSeconds", expiration_seconds)]))
            .await
    }

    async fn get_token(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Token>> {
        let path = Self::credential_path(paths::instance(project_id, region, instance_id), "token");
        let request = self.edge(Method::GET, &path)?;
        self.fetch(request.query(&[("expirationSeconds", expiration_seconds)]))
            .await
    }

    async fn get_token_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Token>> {
        let path = Self::credential_path(
            paths::instance_by_name(project_id, region, display_name),
            "token",
        );
        let request = self.edge(Method::GET, &path)?;
        self.fetch(request.query(&[("expirationSeconds", expiration_seconds)]))
            .await
    }
}

impl ProjectApi for HttpClient {
    async fn get_project(&self, project_id: &str) -> ApiResult<Option<Project>> {
        let url = Self::url(&self.resource_manager_endpoint, &paths::project(project_id))?;
        self.fetch(self.request(Method::GET, url)).await
    }
}
