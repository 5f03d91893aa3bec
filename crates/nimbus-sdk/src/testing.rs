//! Scripted in-memory API for tests.
//!
//! [`FakeEdgeApi`] records every call with the HTTP method and path the real
//! client would use, and answers from scripted responses. Unscripted calls
//! fail with HTTP 501 so a test notices requests it did not expect.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::Serialize;

use crate::client::{EdgeApi, ProjectApi};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateInstancePayload, Instance, InstanceList, Kubeconfig, PlanList, Project, Token,
    UpdateInstancePayload,
};
use crate::paths;

/// A scripted answer.
#[derive(Debug, Clone)]
pub enum FakeResponse<T> {
    /// Success, with or without a body.
    Ok(Option<T>),
    /// Failure with an HTTP status and message.
    Status(u16, String),
}

impl<T: Clone> FakeResponse<T> {
    /// Success with a body.
    pub fn ok(value: T) -> Self {
        Self::Ok(Some(value))
    }

    /// Success without a body.
    pub fn empty() -> Self {
        Self::Ok(None)
    }

    /// Failure with `status`.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status(status, message.into())
    }

    fn to_result(&self) -> ApiResult<Option<T>> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Status(status, message) => Err(ApiError::http(*status, message.clone())),
        }
    }
}

/// A recorded request.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// HTTP method.
    pub method: &'static str,
    /// Path including the query string.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct Script {
    create: Option<FakeResponse<Instance>>,
    get: VecDeque<FakeResponse<Instance>>,
    list: Option<FakeResponse<InstanceList>>,
    update: Option<FakeResponse<()>>,
    delete: Option<FakeResponse<()>>,
    plans: Option<FakeResponse<PlanList>>,
    kubeconfig: Option<FakeResponse<Kubeconfig>>,
    token: Option<FakeResponse<Token>>,
    project: Option<FakeResponse<Project>>,
}

/// Scripted fake of [`EdgeApi`] and [`ProjectApi`].
#[derive(Default)]
pub struct FakeEdgeApi {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl FakeEdgeApi {
    /// A fake with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for create.
    #[must_use]
    pub fn on_create(self, response: FakeResponse<Instance>) -> Self {
        self.script.lock().create = Some(response);
        self
    }

    /// Answers for successive gets, by id or by name. The last one repeats.
    #[must_use]
    pub fn on_get(self, responses: Vec<FakeResponse<Instance>>) -> Self {
        self.script.lock().get = responses.into();
        self
    }

    /// Answer for list.
    #[must_use]
    pub fn on_list(self, response: FakeResponse<InstanceList>) -> Self {
        self.script.lock().list = Some(response);
        self
    }

    /// Answer for update, by id or by name.
    #[must_use]
    pub fn on_update(self, response: FakeResponse<()>) -> Self {
        self.script.lock().update = Some(response);
        self
    }

    /// Answer for delete, by id or by name.
    #[must_use]
    pub fn on_delete(self, response: FakeResponse<()>) -> Self {
        self.script.lock().delete = Some(response);
        self
    }

    /// Answer for list plans.
    #[must_use]
    pub fn on_plans(self, response: FakeResponse<PlanList>) -> Self {
        self.script.lock().plans = Some(response);
        self
    }

    /// Answer for kubeconfig issuance.
    #[must_use]
    pub fn on_kubeconfig(self, response: FakeResponse<Kubeconfig>) -> Self {
        self.script.lock().kubeconfig = Some(response);
        self
    }

    /// Answer for token issuance.
    #[must_use]
    pub fn on_token(self, response: FakeResponse<Token>) -> Self {
        self.script.lock().token = Some(response);
        self
    }

    /// Answer for project lookups.
    #[must_use]
    pub fn on_project(self, response: FakeResponse<Project>) -> Self {
        self.script.lock().project = Some(response);
        self
    }

    /// Every request made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record<B: Serialize>(&self, method: &'static str, path: String, body: Option<&B>) {
        let body = body.and_then(|b| serde_json::to_value(b).ok());
        self.calls.lock().push(Call { method, path, body });
    }

    fn answer<T: Clone>(
        response: Option<&FakeResponse<T>>,
        what: &str,
    ) -> ApiResult<Option<T>> {
        response.map_or_else(
            || Err(ApiError::http(501, format!("{what} not scripted"))),
            FakeResponse::to_result,
        )
    }

    fn next_get(&self) -> ApiResult<Option<Instance>> {
        let mut script = self.script.lock();
        let response = if script.get.len() > 1 {
            script.get.pop_front()
        } else {
            script.get.front().cloned()
        };
        Self::answer(response.as_ref(), "get instance")
    }
}

fn with_expiration(segments: Vec<String>, kind: &str, expiration_seconds: u64) -> String {
    format!(
        "{}/{kind}?expirationSeconds={expiration_seconds}",
        paths::display(&segments)
    )
}

impl EdgeApi for FakeEdgeApi {
    async fn create_instance(
        &self,
        project_id: &str,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> ApiResult<Option<Instance>> {
        let path = paths::display(&paths::instances(project_id, region));
        self.record("POST", path, Some(payload));
        Self::answer(self.script.lock().create.as_ref(), "create instance")
    }

    async fn get_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> ApiResult<Option<Instance>> {
        let path = paths::display(&paths::instance(project_id, region, instance_id));
        self.record::<()>("GET", path, None);
        self.next_get()
    }

    async fn get_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
    ) -> ApiResult<Option<Instance>> {
        let path = paths::display(&paths::instance_by_name(project_id, region, display_name));
        self.record::<()>("GET", path, None);
        self.next_get()
    }

    async fn list_instances(
        &self,
        project_id: &str,
        region: &str,
    ) -> ApiResult<Option<InstanceList>> {
        let path = paths::display(&paths::instances(project_id, region));
        self.record::<()>("GET", path, None);
        Self::answer(self.script.lock().list.as_ref(), "list instances")
    }

    async fn update_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        payload: &UpdateInstancePayload,
    ) -> ApiResult<()> {
        let path = paths::display(&paths::instance(project_id, region, instance_id));
        self.record("PUT", path, Some(payload));
        Self::answer(self.script.lock().update.as_ref(), "update instance").map(|_| ())
    }

    async fn update_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        payload: &UpdateInstancePayload,
    ) -> ApiResult<()> {
        let path = paths::display(&paths::instance_by_name(project_id, region, display_name));
        self.record("PUT", path, Some(payload));
        Self::answer(self.script.lock().update.as_ref(), "update instance").map(|_| ())
    }

    async fn delete_instance(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
    ) -> ApiResult<()> {
        let path = paths::display(&paths::instance(project_id, region, instance_id));
        self.record::<()>("DELETE", path, None);
        Self::answer(self.script.lock().delete.as_ref(), "delete instance").map(|_| ())
    }

    async fn delete_instance_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
    ) -> ApiResult<()> {
        let path = paths::display(&paths::instance_by_name(project_id, region, display_name));
        self.record::<()>("DELETE", path, None);
        Self::answer(self.script.lock().delete.as_ref(), "delete instance").map(|_| ())
    }

    async fn list_plans(&self, project_id: &str) -> ApiResult<Option<PlanList>> {
        self.record::<()>("GET", paths::display(&paths::plans(project_id)), None);
        Self::answer(self.script.lock().plans.as_ref(), "list plans")
    }

    async fn get_kubeconfig(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Kubeconfig>> {
        let segments = paths::instance(project_id, region, instance_id);
        let path = with_expiration(segments, "kubeconfig", expiration_seconds);
        self.record::<()>("GET", path, None);
        Self::answer(self.script.lock().kubeconfig.as_ref(), "kubeconfig")
    }

    async fn get_kubeconfig_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Kubeconfig>> {
        let segments = paths::instance_by_name(project_id, region, display_name);
        let path = with_expiration(segments, "kubeconfig", expiration_seconds);
        self.record::<()>("GET", path, None);
        Self::answer(self.script.lock().kubeconfig.as_ref(), "kubeconfig")
    }

    async fn get_token(
        &self,
        project_id: &str,
        region: &str,
        instance_id: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Token>> {
        let segments = paths::instance(project_id, region, instance_id);
        let path = with_expiration(segments, "token", expiration_seconds);
        self.record::<()>("GET", path, None);
        Self::answer(self.script.lock().token.as_ref(), "token")
    }

    async fn get_token_by_name(
        &self,
        project_id: &str,
        region: &str,
        display_name: &str,
        expiration_seconds: u64,
    ) -> ApiResult<Option<Token>> {
        let segments = paths::instance_by_name(project_id, region, display_name);
        let path = with_expiration(segments, "token", expiration_seconds);
        self.record::<()>("GET", path, None);
        Self::answer(self.script.lock().token.as_ref(), "token")
    }
}

impl ProjectApi for FakeEdgeApi {
    async fn get_project(&self, project_id: &str) -> ApiResult<Option<Project>> {
        self.record::<()>("GET", paths::display(&paths::project(project_id)), None);
        Self::answer(self.script.lock().project.as_ref(), "get project")
    }
}
