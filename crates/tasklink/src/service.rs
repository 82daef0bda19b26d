//! Request/reply facade
//!
//! Views talk to the library through typed requests and get a uniform
//! `{success, data?, error?}` reply back. Nothing thrown below this layer
//! escapes `Service::handle`.

use anyhow::{Result, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::actions::ActionHandler;
use crate::config::AppConfig;
use crate::host::{ComposeHost, MailHost};
use crate::link::LinkIndex;
use crate::message::current_message;
use crate::prefs::{ComposeSettings, ComposeState, Preferences, Prefs};
use crate::query::{load_task_view, sections_for_project};
use crate::storage::SettingsStore;
use crate::todoist::api::CreateTaskRequest;
use crate::todoist::{Destination, Session, TodoistClient, TodoistError};

/// Request names accepted on the wire
pub const REQUEST_TYPES: &[&str] = &[
    "TEST_TODOIST_CONNECTION",
    "SAVE_TODOIST_TOKEN",
    "CLEAR_TODOIST_TOKEN",
    "GET_CURRENT_MESSAGE",
    "GET_TASKS",
    "GET_ALL_TASKS",
    "GET_PROJECTS",
    "GET_SECTIONS",
    "GET_LABELS",
    "ADD_EMAIL_COMMENT",
    "CREATE_EMAIL_SUBTASK",
    "CREATE_TASK",
    "OPEN_EMAIL_FROM_LINK",
    "MOVE_TASK",
    "SAVE_COMPOSE_STATE",
    "SEND_WITH_TASK",
    "GET_TASK_VIEW",
    "GET_PREFERENCES",
    "SAVE_PREFERENCES",
    "RESET_PREFERENCES",
];

/// A request from a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    /// Check a token; falls back to the stored one
    TestTodoistConnection {
        #[serde(default)]
        token: Option<String>,
    },
    SaveTodoistToken {
        #[serde(default)]
        token: Option<String>,
    },
    ClearTodoistToken,
    GetCurrentMessage,
    #[serde(alias = "GET_ALL_TASKS")]
    GetTasks {
        #[serde(default)]
        filter: Option<BTreeMap<String, String>>,
        #[serde(default)]
        project_id: Option<String>,
    },
    GetProjects,
    GetSections {
        #[serde(default)]
        project_id: Option<String>,
    },
    GetLabels,
    AddEmailComment {
        #[serde(default)]
        task_id: String,
        #[serde(default)]
        content: String,
    },
    CreateEmailSubtask {
        #[serde(default)]
        parent_task_id: String,
        #[serde(default)]
        email_subject: String,
        #[serde(default)]
        email_body: Option<String>,
        #[serde(default)]
        header_message_id: Option<String>,
    },
    CreateTask {
        #[serde(default)]
        task_data: Option<CreateTaskRequest>,
        #[serde(default)]
        header_message_id: Option<String>,
    },
    /// Open an email by Message-ID, or the email behind a task
    OpenEmailFromLink {
        #[serde(default)]
        header_message_id: Option<String>,
        #[serde(default)]
        task_id: Option<String>,
    },
    MoveTask {
        #[serde(default)]
        task_id: String,
        #[serde(default)]
        section_id: Option<String>,
        #[serde(default)]
        project_id: Option<String>,
        #[serde(default)]
        parent_id: Option<String>,
    },
    /// Remember (or forget, without `task_id`) the task chosen in a compose tab
    SaveComposeState {
        #[serde(default)]
        tab_id: String,
        #[serde(default)]
        task_id: Option<String>,
        #[serde(default)]
        project_id: Option<String>,
        #[serde(default)]
        section_id: Option<String>,
    },
    SendWithTask {
        #[serde(default)]
        tab_id: String,
    },
    /// Load the task picker with the saved filter applied
    ///
    /// A given project or label replaces the saved one and is persisted. The
    /// search term applies to this load only.
    GetTaskView {
        #[serde(default)]
        search: Option<String>,
        #[serde(default)]
        project_id: Option<String>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        selected_task_id: Option<String>,
        #[serde(default)]
        clear_filter: bool,
    },
    GetPreferences,
    /// Replace each settings group that is present
    SavePreferences {
        #[serde(default)]
        preferences: Option<Preferences>,
        #[serde(default)]
        icon_only_mode: Option<bool>,
        #[serde(default)]
        compose_settings: Option<ComposeSettings>,
    },
    ResetPreferences,
}

/// Uniform reply shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Entry point for all view requests
pub struct Service {
    session: Session,
    client: Arc<TodoistClient>,
    prefs: Prefs,
    actions: ActionHandler,
    mail: Arc<dyn MailHost>,
}

impl Service {
    /// Wire up the client, preferences and actions over one settings store
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn SettingsStore>,
        mail: Arc<dyn MailHost>,
        compose: Arc<dyn ComposeHost>,
    ) -> Result<Self> {
        let session = Session::new(store.clone());
        let client = Arc::new(TodoistClient::with_base_url(session.clone(), &config.api_base)?);
        let prefs = Prefs::new(store.clone());
        let links = LinkIndex::new(store);
        let actions = ActionHandler::new(client.clone(), prefs.clone(), links, mail.clone(), compose);

        Ok(Self {
            session,
            client,
            prefs,
            actions,
            mail,
        })
    }

    pub fn client(&self) -> &TodoistClient {
        &self.client
    }

    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    /// Handle a request; failures become `success: false` replies
    pub fn handle(&self, request: Request) -> Reply {
        debug!("Handling {:?}", request);
        match self.dispatch(request) {
            Ok(data) => Reply::ok(data),
            Err(e) => {
                warn!("Request failed: {:#}", e);
                Reply::err(e.to_string())
            }
        }
    }

    /// Handle a request given as JSON text
    pub fn handle_json(&self, raw: &str) -> Reply {
        match parse_request(raw) {
            Ok(request) => self.handle(request),
            Err(message) => Reply::err(message),
        }
    }

    fn dispatch(&self, request: Request) -> Result<Option<Value>> {
        match request {
            Request::TestTodoistConnection { token } => {
                let token = match token.filter(|t| !t.trim().is_empty()) {
                    Some(token) => token,
                    None => self
                        .session
                        .get_token()?
                        .ok_or_else(|| anyhow!("No token found"))?,
                };
                let status = self.client.test_connection(&token)?;
                Ok(Some(serde_json::to_value(status)?))
            }

            Request::SaveTodoistToken { token } => {
                self.session.save_token(token.as_deref().unwrap_or_default())?;
                Ok(None)
            }

            Request::ClearTodoistToken => {
                self.session.clear_token()?;
                Ok(None)
            }

            Request::GetCurrentMessage => {
                let message = current_message(self.mail.as_ref())?;
                Ok(Some(serde_json::to_value(message)?))
            }

            Request::GetTasks { filter, project_id } => {
                let filter = match (filter, project_id) {
                    (Some(filter), _) => filter,
                    (None, Some(project_id)) => BTreeMap::from([("project_id".to_string(), project_id)]),
                    (None, None) => BTreeMap::new(),
                };
                let params: Vec<(&str, &str)> = filter
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                let tasks = self.client.list_tasks(&params)?;
                Ok(Some(serde_json::to_value(tasks)?))
            }

            Request::GetProjects => Ok(Some(serde_json::to_value(self.client.list_projects()?)?)),

            Request::GetSections { project_id } => {
                let project_id = project_id.filter(|p| !p.is_empty());
                let sections = self.client.list_sections(project_id.as_deref())?;
                Ok(Some(serde_json::to_value(sections)?))
            }

            Request::GetLabels => Ok(Some(serde_json::to_value(self.client.list_labels()?)?)),

            Request::AddEmailComment { task_id, content } => {
                let comment = self.actions.add_email_comment(&task_id, &content)?;
                Ok(Some(serde_json::to_value(comment)?))
            }

            Request::CreateEmailSubtask {
                parent_task_id,
                email_subject,
                email_body,
                header_message_id,
            } => {
                let subtask = self.actions.create_email_subtask(
                    &parent_task_id,
                    &email_subject,
                    email_body.as_deref(),
                    header_message_id.as_deref(),
                )?;
                Ok(Some(json!({ "subtask": subtask })))
            }

            Request::CreateTask {
                task_data,
                header_message_id,
            } => {
                let task = self
                    .actions
                    .create_task(task_data.unwrap_or_default(), header_message_id.as_deref())?;
                Ok(Some(json!({ "task": task })))
            }

            Request::OpenEmailFromLink {
                header_message_id,
                task_id,
            } => {
                let opened = match (
                    header_message_id.filter(|id| !id.is_empty()),
                    task_id.filter(|id| !id.is_empty()),
                ) {
                    (Some(id), _) => {
                        self.actions.open_email(&id)?;
                        id
                    }
                    (None, Some(task_id)) => self.actions.open_email_from_task(&task_id)?,
                    (None, None) => {
                        return Err(TodoistError::InvalidInput("No email ID provided".to_string()).into());
                    }
                };
                Ok(Some(json!({ "headerMessageId": opened })))
            }

            Request::MoveTask {
                task_id,
                section_id,
                project_id,
                parent_id,
            } => {
                let destination = match (section_id, project_id, parent_id) {
                    (Some(id), _, _) => Destination::Section(id),
                    (None, Some(id), _) => Destination::Project(id),
                    (None, None, Some(id)) => Destination::Parent(id),
                    (None, None, None) => {
                        return Err(TodoistError::InvalidInput(
                            "A destination section, project or parent is required".to_string(),
                        )
                        .into());
                    }
                };
                self.actions.move_task(&task_id, &destination)?;
                Ok(None)
            }

            Request::SaveComposeState {
                tab_id,
                task_id,
                project_id,
                section_id,
            } => {
                if tab_id.is_empty() {
                    return Err(TodoistError::InvalidInput("Tab ID is required".to_string()).into());
                }
                let state = task_id
                    .filter(|id| !id.is_empty())
                    .map(|id| ComposeState::new(id, project_id, section_id));
                self.prefs.save_compose_state(&tab_id, state)?;
                Ok(None)
            }

            Request::SendWithTask { tab_id } => {
                let subtask = self.actions.send_with_task(&tab_id)?;
                Ok(subtask.map(|s| json!({ "subtask": s })))
            }

            Request::GetTaskView {
                search,
                project_id,
                label,
                selected_task_id,
                clear_filter,
            } => self
                .task_view(search, project_id, label, selected_task_id, clear_filter)
                .map(Some),

            Request::GetPreferences => Ok(Some(json!({
                "hasToken": self.session.has_token(),
                "preferences": self.prefs.preferences()?,
                "iconOnlyMode": self.prefs.icon_only_mode()?,
                "composeSettings": self.prefs.compose_settings()?,
                "taskFilters": self.prefs.task_filters()?,
            }))),

            Request::SavePreferences {
                preferences,
                icon_only_mode,
                compose_settings,
            } => {
                if let Some(preferences) = preferences {
                    self.prefs.save_preferences(&preferences)?;
                }
                if let Some(enabled) = icon_only_mode {
                    self.prefs.set_icon_only_mode(enabled)?;
                }
                if let Some(settings) = compose_settings {
                    self.prefs.save_compose_settings(&settings)?;
                }
                Ok(None)
            }

            Request::ResetPreferences => {
                self.prefs.reset_preferences()?;
                Ok(None)
            }
        }
    }

    fn task_view(
        &self,
        search: Option<String>,
        project_id: Option<String>,
        label: Option<String>,
        selected_task_id: Option<String>,
        clear_filter: bool,
    ) -> Result<Value> {
        let mut view = load_task_view(&self.client, &self.prefs)?;

        if clear_filter {
            view.clear_filter();
            self.prefs.clear_task_filters()?;
        }
        let changed = project_id.is_some() || label.is_some();
        if let Some(project_id) = project_id {
            view.filter.project_id = project_id;
        }
        if let Some(label) = label {
            view.filter.label = label;
        }
        if changed {
            self.prefs.save_task_filters(&view.filter.saved())?;
        }
        view.filter.search = search.unwrap_or_default();

        if !view.filter.project_id.is_empty() {
            let project_id = view.filter.project_id.clone();
            let sections = self.client.list_sections(Some(project_id.as_str()))?;
            view.sections = sections_for_project(&sections, &project_id)
                .into_iter()
                .cloned()
                .collect();
        }

        if let Some(task_id) = selected_task_id.filter(|id| !id.is_empty())
            && view.select_task(&task_id).is_none()
        {
            debug!("Selected task {} is not in the list", task_id);
        }

        let today = chrono::Local::now().date_naive();
        Ok(json!({
            "tasks": view.summaries(today),
            "projects": view.projects,
            "labels": view.labels,
            "sections": view.sections,
            "filter": view.filter,
            "selectedTask": view.selected_task(),
        }))
    }
}

/// Parse a JSON request, naming unrecognized request types explicitly
fn parse_request(raw: &str) -> std::result::Result<Request, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("Invalid request: {}", e))?;

    let known = value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| REQUEST_TYPES.contains(&t));
    if !known {
        return Err("Unknown message type".to_string());
    }

    serde_json::from_value(value).map_err(|e| format!("Invalid request: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DraftFields;
    use crate::message::{MessageHeader, MessageId, MessagePart};
    use crate::storage::InMemorySettingsStore;
    use mockito::Matcher;

    struct StaticMail;

    impl MailHost for StaticMail {
        fn displayed_message(&self) -> Result<Option<MessageHeader>> {
            Ok(Some(MessageHeader {
                id: Some(MessageId::new("1")),
                header_message_id: Some("m1@example.com".to_string()),
                subject: "Invoice".to_string(),
                author: "billing@example.com".to_string(),
                date: None,
            }))
        }

        fn selected_messages(&self) -> Result<Vec<MessageHeader>> {
            Ok(Vec::new())
        }

        fn full_message(&self, _id: &MessageId) -> Result<MessagePart> {
            Ok(MessagePart::container(
                "message/rfc822",
                vec![MessagePart::leaf("text/html", "<p>Total: 40&nbsp;EUR</p>")],
            ))
        }

        fn open_message(&self, _header_message_id: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NoDrafts;

    impl ComposeHost for NoDrafts {
        fn draft(&self, tab_id: &str) -> Result<DraftFields> {
            Err(anyhow!("No compose window for tab {}", tab_id))
        }
    }

    fn service(server: &mockito::Server) -> Service {
        let config = AppConfig {
            api_base: server.url(),
            ..AppConfig::default()
        };
        Service::new(
            &config,
            Arc::new(InMemorySettingsStore::new()),
            Arc::new(StaticMail),
            Arc::new(NoDrafts),
        )
        .unwrap()
    }

    #[test]
    fn test_request_wire_names() {
        let request: Request = serde_json::from_str(
            r#"{"type":"CREATE_EMAIL_SUBTASK","parentTaskId":"t1","emailSubject":"Hi"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::CreateEmailSubtask {
                parent_task_id: "t1".to_string(),
                email_subject: "Hi".to_string(),
                email_body: None,
                header_message_id: None,
            }
        );

        let alias: Request = serde_json::from_str(r#"{"type":"GET_ALL_TASKS","projectId":"p1"}"#).unwrap();
        assert!(matches!(alias, Request::GetTasks { project_id: Some(_), .. }));
    }

    #[test]
    fn test_unknown_message_type() {
        let server = mockito::Server::new();
        let reply = service(&server).handle_json(r#"{"type":"SELF_DESTRUCT"}"#);
        assert_eq!(reply, Reply::err("Unknown message type"));
    }

    #[test]
    fn test_token_save_and_missing_token() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/projects").expect(0).create();
        let service = service(&server);

        let reply = service.handle(Request::SaveTodoistToken { token: None });
        assert_eq!(reply.error.as_deref(), Some("No token provided"));

        let reply = service.handle(Request::TestTodoistConnection { token: None });
        assert_eq!(reply.error.as_deref(), Some("No token found"));

        let reply = service.handle(Request::GetProjects);
        assert_eq!(reply.error.as_deref(), Some("No API token found"));
        mock.assert();
    }

    #[test]
    fn test_connection_with_stored_token() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/projects")
            .match_header("authorization", "Bearer stored")
            .with_status(200)
            .with_body(r#"{"results":[{"id":"p1","name":"Inbox"}]}"#)
            .create();
        let service = service(&server);

        assert!(service.handle(Request::SaveTodoistToken { token: Some("stored".into()) }).success);
        let reply = service.handle(Request::TestTodoistConnection { token: None });

        assert!(reply.success);
        let data = reply.data.unwrap();
        assert_eq!(data["projectCount"], 1);
        assert_eq!(data["message"], "Connected successfully! Found 1 projects.");
    }

    #[test]
    fn test_get_tasks_uses_project_filter() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/tasks")
            .match_query(Matcher::Exact("project_id=p1".to_string()))
            .with_status(200)
            .with_body(r#"{"results":[{"id":"t1","content":"A"}],"next_cursor":null}"#)
            .create();
        let service = service(&server);
        service.handle(Request::SaveTodoistToken { token: Some("tok".into()) });

        let reply = service.handle_json(r#"{"type":"GET_TASKS","projectId":"p1"}"#);

        assert!(reply.success);
        assert_eq!(reply.data.unwrap()[0]["id"], "t1");
        mock.assert();
    }

    #[test]
    fn test_get_current_message_extracts_body() {
        let server = mockito::Server::new();
        let reply = service(&server).handle(Request::GetCurrentMessage);

        assert!(reply.success);
        let data = reply.data.unwrap();
        assert_eq!(data["subject"], "Invoice");
        assert_eq!(data["headerMessageId"], "m1@example.com");
        assert_eq!(data["body"], "Total: 40 EUR");
    }

    #[test]
    fn test_move_task_requires_destination() {
        let server = mockito::Server::new();
        let reply = service(&server).handle(Request::MoveTask {
            task_id: "t1".to_string(),
            section_id: None,
            project_id: None,
            parent_id: None,
        });
        assert_eq!(
            reply.error.as_deref(),
            Some("A destination section, project or parent is required")
        );
    }

    #[test]
    fn test_compose_state_round_trip_through_requests() {
        let server = mockito::Server::new();
        let service = service(&server);

        let reply = service.handle(Request::SaveComposeState {
            tab_id: "9".to_string(),
            task_id: Some("t1".to_string()),
            project_id: None,
            section_id: Some(String::new()),
        });
        assert!(reply.success);
        assert_eq!(service.prefs().compose_state("9").unwrap().unwrap().section_id, None);

        // The draft cannot be read, the state is still cleared
        let reply = service.handle(Request::SendWithTask { tab_id: "9".to_string() });
        assert!(!reply.success);
        assert_eq!(service.prefs().compose_state("9").unwrap(), None);

        let reply = service.handle(Request::SendWithTask { tab_id: "9".to_string() });
        assert_eq!(reply, Reply::ok(None));
    }

    #[test]
    fn test_open_email_with_empty_ids_makes_no_call() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();
        let service = service(&server);
        service.handle(Request::SaveTodoistToken { token: Some("tok".into()) });

        let reply = service.handle_json(
            r#"{"type":"OPEN_EMAIL_FROM_LINK","headerMessageId":"","taskId":""}"#,
        );

        assert_eq!(reply.error.as_deref(), Some("No email ID provided"));
        mock.assert();
    }

    #[test]
    fn test_task_view_applies_and_persists_filter() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/tasks")
            .with_status(200)
            .with_body(
                json!({ "results": [
                    { "id": "t1", "content": "Budget review", "project_id": "p1" },
                    { "id": "t2", "content": "Budget forecast", "project_id": "p2" },
                    { "id": "t3", "content": "Lunch", "project_id": "p1" }
                ] })
                .to_string(),
            )
            .create();
        server
            .mock("GET", "/projects")
            .with_status(200)
            .with_body(r#"{"results":[{"id":"p1","name":"Work"},{"id":"p2","name":"Home"}]}"#)
            .create();
        server
            .mock("GET", "/labels")
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create();
        server
            .mock("GET", "/sections")
            .match_query(Matcher::Exact("project_id=p1".to_string()))
            .with_status(200)
            .with_body(
                json!({ "results": [
                    { "id": "s2", "project_id": "p1", "name": "Later", "section_order": 2 },
                    { "id": "s1", "project_id": "p1", "name": "Now", "section_order": 1 }
                ] })
                .to_string(),
            )
            .create();
        let service = service(&server);
        service.handle(Request::SaveTodoistToken { token: Some("tok".into()) });

        let reply = service.handle_json(
            r#"{"type":"GET_TASK_VIEW","search":"BUDGET","projectId":"p1","selectedTaskId":"t1"}"#,
        );
        assert!(reply.success, "{:?}", reply.error);
        let data = reply.data.unwrap();
        assert_eq!(data["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(data["tasks"][0]["id"], "t1");
        assert_eq!(data["tasks"][0]["projectName"], "Work");
        assert_eq!(data["sections"][0]["id"], "s1");
        assert_eq!(data["selectedTask"]["id"], "t1");

        // Project persists, search does not
        let data = service
            .handle(Request::GetTaskView {
                search: None,
                project_id: None,
                label: None,
                selected_task_id: None,
                clear_filter: false,
            })
            .data
            .unwrap();
        let ids: Vec<&str> = data["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["t1", "t3"]);
        assert_eq!(data["filter"]["projectId"], "p1");

        let data = service
            .handle_json(r#"{"type":"GET_TASK_VIEW","clearFilter":true}"#)
            .data
            .unwrap();
        assert_eq!(data["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(service.prefs().task_filters().unwrap(), None);
    }

    #[test]
    fn test_preferences_save_and_reset() {
        let server = mockito::Server::new();
        let service = service(&server);

        let reply = service.handle_json(
            r#"{"type":"SAVE_PREFERENCES","preferences":{"defaultProject":"p3","includeBody":false},"iconOnlyMode":true,"composeSettings":{"projectId":"p3","targetSectionId":"s1"}}"#,
        );
        assert!(reply.success, "{:?}", reply.error);

        let data = service.handle(Request::GetPreferences).data.unwrap();
        assert_eq!(data["preferences"]["defaultProject"], "p3");
        assert_eq!(data["preferences"]["includeBody"], false);
        assert_eq!(data["preferences"]["includeHeaders"], true);
        assert_eq!(data["iconOnlyMode"], true);
        assert_eq!(data["composeSettings"]["targetSectionId"], "s1");
        assert_eq!(data["taskFilters"], Value::Null);
        assert_eq!(data["hasToken"], false);

        assert!(service.handle(Request::ResetPreferences).success);
        let data = service.handle(Request::GetPreferences).data.unwrap();
        assert_eq!(data["preferences"]["defaultProject"], "");
        assert_eq!(data["iconOnlyMode"], false);
    }

    #[test]
    fn test_reply_serialization_omits_empty_fields() {
        let value = serde_json::to_value(Reply::ok(None)).unwrap();
        assert_eq!(value, json!({ "success": true }));
    }
}
