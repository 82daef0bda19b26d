//! Todoist API HTTP client
//!
//! Provides authenticated requests, cursor pagination and sync commands
//! against the Todoist API. Uses synchronous HTTP (ureq) to be
//! executor-agnostic; callers that want concurrency fan out themselves.

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::api::{
    Comment, CreateCommentRequest, CreateTaskRequest, Label, Project, Section, SyncCommand,
    SyncResponse, Task,
};
use super::{Session, TodoistError};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// A parsed JSON document
    Json(Value),
    /// The server answered 204 and sent nothing to parse
    NoContent,
}

impl ApiResponse {
    /// Deserialize the JSON body into `T`
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, TodoistError> {
        match self {
            Self::Json(value) => serde_json::from_value(value)
                .map_err(|e| TodoistError::UnexpectedFormat(e.to_string())),
            Self::NoContent => Err(TodoistError::UnexpectedFormat(
                "expected a JSON body, got 204 No Content".to_string(),
            )),
        }
    }
}

/// HTTP method for [`TodoistClient::request`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Method, query parameters and body for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub payload: Option<Payload>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: Method::Post,
            ..Self::default()
        }
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::Post,
            query: Vec::new(),
            payload: Some(Payload::Json(body)),
        }
    }

    pub fn post_form(fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            query: Vec::new(),
            payload: Some(Payload::Form(fields)),
        }
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Result of a successful connection test
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub project_count: usize,
    pub message: String,
}

/// Where `move_task` should put a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Section(String),
    Project(String),
    Parent(String),
}

impl Destination {
    fn arg(&self) -> (&'static str, &str) {
        match self {
            Self::Section(id) => ("section_id", id.as_str()),
            Self::Project(id) => ("project_id", id.as_str()),
            Self::Parent(id) => ("parent_id", id.as_str()),
        }
    }
}

/// A page of a cursor-paginated collection
struct Page<T> {
    results: Vec<T>,
    next_cursor: Option<String>,
}

/// Todoist API client
#[derive(Clone)]
pub struct TodoistClient {
    agent: ureq::Agent,
    base_url: String,
    session: Session,
}

impl TodoistClient {
    /// Todoist API base URL
    pub const BASE_URL: &'static str = "https://api.todoist.com/api/v1";

    /// Create a client for the public Todoist API
    pub fn new(session: Session) -> Self {
        Self {
            agent: new_agent(),
            base_url: Self::BASE_URL.to_string(),
            session,
        }
    }

    /// Create a client against a different base URL (self-hosted proxy, tests)
    pub fn with_base_url(session: Session, base_url: &str) -> Result<Self, TodoistError> {
        Ok(Self {
            agent: new_agent(),
            base_url: normalize_base_url(base_url)?,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Issue an authenticated request with the stored token
    ///
    /// # Errors
    /// - `NoToken` before any network I/O if no token is stored
    /// - `Api` with the status and raw body for non-2xx responses
    /// - `Network` for transport failures
    /// - `UnexpectedFormat` if a non-204 body is not JSON
    pub fn request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, TodoistError> {
        let token = self.session.get_token()?.ok_or(TodoistError::NoToken)?;
        self.send(&token, endpoint, options)
    }

    /// Fetch every page of a collection endpoint
    ///
    /// Pages are requested one at a time; each request carries the filter
    /// parameters plus the cursor returned by the previous page. A page
    /// without a `results` array aborts the whole fetch.
    pub fn fetch_paginated<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        filter: &[(&str, &str)],
    ) -> Result<Vec<T>, TodoistError> {
        let mut all_results: Vec<T> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut options = RequestOptions::get();
            for (key, value) in filter {
                options = options.query(*key, *value);
            }
            if let Some(cursor) = &cursor {
                options = options.query("cursor", cursor.as_str());
            }

            let body = match self.request(endpoint, &options)? {
                ApiResponse::Json(body) => body,
                ApiResponse::NoContent => {
                    return Err(TodoistError::UnexpectedFormat(format!(
                        "{} returned no content",
                        endpoint
                    )));
                }
            };

            let page: Page<T> = parse_page(body)?;
            pages += 1;
            all_results.extend(page.results);

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(
            "Fetched {} items from {} in {} page(s)",
            all_results.len(),
            endpoint,
            pages
        );
        Ok(all_results)
    }

    /// Check that `token` is accepted by listing projects once
    ///
    /// Accepts both the `{results: [...]}` and the legacy bare-array shape.
    pub fn test_connection(&self, token: &str) -> Result<ConnectionStatus, TodoistError> {
        if token.trim().is_empty() {
            return Err(TodoistError::NoToken);
        }

        let project_count = match self.send(token, "/projects", &RequestOptions::get())? {
            ApiResponse::Json(Value::Object(map)) => map
                .get("results")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            ApiResponse::Json(Value::Array(items)) => items.len(),
            _ => 0,
        };

        Ok(ConnectionStatus {
            project_count,
            message: format!(
                "Connected successfully! Found {} projects.",
                project_count
            ),
        })
    }

    // === Collections ===

    pub fn list_tasks(&self, filter: &[(&str, &str)]) -> Result<Vec<Task>, TodoistError> {
        self.fetch_paginated("/tasks", filter)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, TodoistError> {
        self.fetch_paginated("/projects", &[])
    }

    /// List sections, optionally restricted to one project
    pub fn list_sections(&self, project_id: Option<&str>) -> Result<Vec<Section>, TodoistError> {
        match project_id {
            Some(id) => self.fetch_paginated("/sections", &[("project_id", id)]),
            None => self.fetch_paginated("/sections", &[]),
        }
    }

    pub fn list_labels(&self) -> Result<Vec<Label>, TodoistError> {
        self.fetch_paginated("/labels", &[])
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task, TodoistError> {
        let endpoint = format!("/tasks/{}", urlencoding::encode(task_id));
        self.request(&endpoint, &RequestOptions::get())?.parse()
    }

    // === Item creation ===

    pub fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, TodoistError> {
        let body = to_json(request)?;
        let task: Task = self
            .request("/tasks", &RequestOptions::post_json(body))?
            .parse()?;
        info!("Created task {}", task.id);
        Ok(task)
    }

    pub fn create_comment(&self, request: &CreateCommentRequest) -> Result<Comment, TodoistError> {
        let body = to_json(request)?;
        let comment: Comment = self
            .request("/comments", &RequestOptions::post_json(body))?
            .parse()?;
        info!("Added comment {} to task {}", comment.id, request.task_id);
        Ok(comment)
    }

    // === Sync commands ===

    /// Send a batch of sync commands and require "ok" for each of them
    ///
    /// The HTTP status alone is not enough: the reply reports a status per
    /// command uuid, and every uuid we sent must be acknowledged.
    pub fn execute_commands(&self, commands: &[SyncCommand]) -> Result<(), TodoistError> {
        if commands.is_empty() {
            return Ok(());
        }

        let encoded = serde_json::to_string(commands)
            .map_err(|e| TodoistError::InvalidInput(format!("Invalid sync command: {}", e)))?;
        let options = RequestOptions::post_form(vec![("commands".to_string(), encoded)]);
        let response: SyncResponse = self.request("/sync", &options)?.parse()?;

        for command in commands {
            match response.sync_status.get(&command.uuid) {
                Some(Value::String(status)) if status == "ok" => {}
                Some(other) => {
                    return Err(TodoistError::CommandFailed {
                        uuid: command.uuid.clone(),
                        reason: describe_command_error(other),
                    });
                }
                None => {
                    return Err(TodoistError::CommandFailed {
                        uuid: command.uuid.clone(),
                        reason: "no status returned for command".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Move a task to another section, project or parent task
    pub fn move_task(&self, task_id: &str, destination: &Destination) -> Result<(), TodoistError> {
        if task_id.trim().is_empty() {
            return Err(TodoistError::InvalidInput(
                "Task ID is required".to_string(),
            ));
        }

        let (key, target) = destination.arg();
        let mut args = serde_json::Map::new();
        args.insert("id".to_string(), Value::String(task_id.to_string()));
        args.insert(key.to_string(), Value::String(target.to_string()));

        let command = SyncCommand::new("item_move", Value::Object(args));
        self.execute_commands(std::slice::from_ref(&command))?;
        info!("Moved task {} to {} {}", task_id, key, target);
        Ok(())
    }

    // === Transport ===

    fn send(
        &self,
        token: &str,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, TodoistError> {
        let url = self.url_with_query(endpoint, &options.query)?;
        let authorization = format!("Bearer {}", token);
        debug!("{:?} {}", options.method, url.path());

        let result = match options.method {
            Method::Get => self
                .agent
                .get(url.as_str())
                .header("Authorization", authorization.as_str())
                .header("Content-Type", JSON_CONTENT_TYPE)
                .call(),
            Method::Post => {
                let (content_type, body) = match &options.payload {
                    Some(Payload::Json(value)) => (JSON_CONTENT_TYPE, value.to_string()),
                    Some(Payload::Form(fields)) => (FORM_CONTENT_TYPE, encode_form(fields)),
                    None => (JSON_CONTENT_TYPE, String::new()),
                };
                self.agent
                    .post(url.as_str())
                    .header("Authorization", authorization.as_str())
                    .header("Content-Type", content_type)
                    .send(body.as_bytes())
            }
        };

        let mut response = result.map_err(|e| TodoistError::Network(e.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(TodoistError::Api {
                status: status.as_u16(),
                body,
            });
        }

        if status.as_u16() == 204 {
            return Ok(ApiResponse::NoContent);
        }

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TodoistError::Network(e.to_string()))?;
        serde_json::from_str(&text)
            .map(ApiResponse::Json)
            .map_err(|e| TodoistError::UnexpectedFormat(format!("invalid JSON body: {}", e)))
    }

    fn url_with_query(&self, endpoint: &str, query: &[(String, String)]) -> Result<Url, TodoistError> {
        let path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{}", endpoint)
        };

        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| TodoistError::InvalidInput(format!("Invalid endpoint {}: {}", path, e)))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

fn new_agent() -> ureq::Agent {
    // Non-2xx responses come back as responses so their bodies can be reported
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .into()
}

fn normalize_base_url(endpoint: &str) -> Result<String, TodoistError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(TodoistError::InvalidInput(
            "API base URL must not be empty".to_string(),
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, TodoistError> {
    serde_json::to_value(value).map_err(|e| TodoistError::InvalidInput(e.to_string()))
}

fn encode_form(fields: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn parse_page<T: DeserializeOwned>(body: Value) -> Result<Page<T>, TodoistError> {
    let Value::Object(mut map) = body else {
        return Err(TodoistError::UnexpectedFormat(
            "expected an object with a results array".to_string(),
        ));
    };

    let Some(Value::Array(items)) = map.remove("results") else {
        return Err(TodoistError::UnexpectedFormat(
            "response has no results array".to_string(),
        ));
    };

    let results = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| TodoistError::UnexpectedFormat(format!("invalid item: {}", e)))?;

    let next_cursor = match map.remove("next_cursor") {
        Some(Value::String(cursor)) if !cursor.is_empty() => Some(cursor),
        _ => None,
    };

    Ok(Page {
        results,
        next_cursor,
    })
}

fn describe_command_error(status: &Value) -> String {
    status
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}
