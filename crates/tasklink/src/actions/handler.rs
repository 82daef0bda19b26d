//! Action handler for task operations
//!
//! Coordinates between the Todoist API, local preferences and the mail client.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::host::{ComposeHost, MailHost};
use crate::link::{self, LinkIndex};
use crate::prefs::Prefs;
use crate::todoist::api::{Comment, CreateCommentRequest, CreateTaskRequest, Task};
use crate::todoist::{Destination, TodoistClient, TodoistError};

/// Description used for subtasks created from an email without a body
pub const EMPTY_BODY_PLACEHOLDER: &str = "No email content available";

/// Handler for task actions
///
/// Mutations go to Todoist first. Local state (last-used ids, the email link
/// table) is only updated after the remote call succeeded, and a failed local
/// write never fails an action whose remote effect already happened.
pub struct ActionHandler {
    client: Arc<TodoistClient>,
    prefs: Prefs,
    links: LinkIndex,
    mail: Arc<dyn MailHost>,
    compose: Arc<dyn ComposeHost>,
}

impl ActionHandler {
    /// Create a new action handler
    pub fn new(
        client: Arc<TodoistClient>,
        prefs: Prefs,
        links: LinkIndex,
        mail: Arc<dyn MailHost>,
        compose: Arc<dyn ComposeHost>,
    ) -> Self {
        Self {
            client,
            prefs,
            links,
            mail,
            compose,
        }
    }

    /// Create a task, linking it to an email when one is given
    ///
    /// The marker is only appended when the request already has a
    /// description.
    pub fn create_task(
        &self,
        mut request: CreateTaskRequest,
        header_message_id: Option<&str>,
    ) -> Result<Task> {
        let project_id = match request.project_id.as_deref() {
            Some(id) if !id.is_empty() && !request.content.is_empty() => id.to_string(),
            _ => {
                return Err(TodoistError::InvalidInput(
                    "Task content and project ID are required".to_string(),
                )
                .into());
            }
        };

        let email_id = header_message_id.filter(|id| !id.is_empty());
        if let Some(id) = email_id
            && let Some(description) = request.description.as_mut()
            && !description.is_empty()
        {
            description.push_str(&link::encode(Some(id)));
        }

        let task = self.client.create_task(&request)?;

        if let Some(id) = email_id {
            self.remember_link(&task.id, id);
        }
        if let Err(e) = self.prefs.set_last_used_project(&project_id) {
            warn!("Failed to remember last used project {}: {:#}", project_id, e);
        }

        Ok(task)
    }

    /// Create a subtask under `parent_id` for an email
    pub fn create_email_subtask(
        &self,
        parent_id: &str,
        subject: &str,
        body: Option<&str>,
        header_message_id: Option<&str>,
    ) -> Result<Task> {
        if parent_id.is_empty() || subject.is_empty() {
            return Err(TodoistError::InvalidInput(
                "Parent task ID and email subject are required".to_string(),
            )
            .into());
        }

        let body = body.filter(|b| !b.is_empty()).unwrap_or(EMPTY_BODY_PLACEHOLDER);
        let request = CreateTaskRequest {
            content: format!("* {}", subject),
            description: Some(format!("{}{}", body, link::encode(header_message_id))),
            parent_id: Some(parent_id.to_string()),
            priority: Some(1),
            ..CreateTaskRequest::default()
        };

        let subtask = self.client.create_task(&request)?;

        if let Some(id) = header_message_id.filter(|id| !id.is_empty()) {
            self.remember_link(&subtask.id, id);
        }
        if let Err(e) = self.prefs.set_last_used_task(parent_id) {
            warn!("Failed to remember last used task {}: {:#}", parent_id, e);
        }

        Ok(subtask)
    }

    /// Add a comment to a task
    pub fn add_email_comment(&self, task_id: &str, content: &str) -> Result<Comment> {
        if task_id.is_empty() || content.is_empty() {
            return Err(TodoistError::InvalidInput(
                "Task ID and content are required".to_string(),
            )
            .into());
        }

        Ok(self.client.create_comment(&CreateCommentRequest {
            task_id: task_id.to_string(),
            content: content.to_string(),
        })?)
    }

    /// Move a task to another section, project or parent
    pub fn move_task(&self, task_id: &str, destination: &Destination) -> Result<()> {
        Ok(self.client.move_task(task_id, destination)?)
    }

    /// Ask the mail client to show a message
    pub fn open_email(&self, header_message_id: &str) -> Result<()> {
        if header_message_id.trim().is_empty() {
            return Err(TodoistError::InvalidInput("No email ID provided".to_string()).into());
        }
        self.mail.open_message(header_message_id)
    }

    /// Open the email a task was created from
    ///
    /// Returns the Message-ID that was opened.
    pub fn open_email_from_task(&self, task_id: &str) -> Result<String> {
        let email_id = match self.links.lookup(task_id)? {
            Some(id) => id,
            None => {
                let task = self.client.get_task(task_id)?;
                self.links.resolve(&task)?.ok_or_else(|| {
                    TodoistError::InvalidInput("No email link found for this task".to_string())
                })?
            }
        };

        self.open_email(&email_id)?;
        Ok(email_id)
    }

    /// Apply the task chosen in a compose window as the message is sent
    ///
    /// Returns `None` when no task was chosen for the tab. The tab's compose
    /// state is cleared whether or not the flow succeeds.
    pub fn send_with_task(&self, tab_id: &str) -> Result<Option<Task>> {
        let Some(state) = self.prefs.compose_state(tab_id)? else {
            return Ok(None);
        };

        let result = self.apply_compose_state(tab_id, &state.task_id, state.section_id.as_deref());

        if let Err(e) = self.prefs.clear_compose_state(tab_id) {
            warn!("Failed to clear compose state for tab {}: {:#}", tab_id, e);
        }

        result.map(Some)
    }

    fn apply_compose_state(&self, tab_id: &str, task_id: &str, section_id: Option<&str>) -> Result<Task> {
        let draft = self.compose.draft(tab_id)?;
        let subtask =
            self.create_email_subtask(task_id, &draft.subject, draft.plain_body.as_deref(), None)?;

        if let Some(section_id) = section_id {
            self.client
                .move_task(task_id, &Destination::Section(section_id.to_string()))?;
        }

        info!("Sent message from tab {} with task {}", tab_id, task_id);
        Ok(subtask)
    }

    fn remember_link(&self, task_id: &str, header_message_id: &str) {
        if let Err(e) = self.links.record(task_id, header_message_id) {
            warn!("Failed to record email link for task {}: {:#}", task_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DraftFields;
    use crate::message::{MessageHeader, MessageId, MessagePart};
    use crate::prefs::ComposeState;
    use crate::storage::{InMemorySettingsStore, SettingsStore};
    use crate::todoist::Session;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailHost {
        opened: Mutex<Vec<String>>,
    }

    impl MailHost for RecordingMailHost {
        fn displayed_message(&self) -> Result<Option<MessageHeader>> {
            Ok(None)
        }

        fn selected_messages(&self) -> Result<Vec<MessageHeader>> {
            Ok(Vec::new())
        }

        fn full_message(&self, _id: &MessageId) -> Result<MessagePart> {
            Ok(MessagePart::default())
        }

        fn open_message(&self, header_message_id: &str) -> Result<()> {
            self.opened.lock().unwrap().push(header_message_id.to_string());
            Ok(())
        }
    }

    struct FixedDraft;

    impl ComposeHost for FixedDraft {
        fn draft(&self, _tab_id: &str) -> Result<DraftFields> {
            Ok(DraftFields {
                subject: "Re: Budget".to_string(),
                plain_body: Some("Approved.".to_string()),
            })
        }
    }

    struct Fixture {
        handler: ActionHandler,
        prefs: Prefs,
        links: LinkIndex,
        mail: Arc<RecordingMailHost>,
    }

    /// Accepts every write except to the keys listed in `failing`
    struct PartlyFailingStore {
        inner: InMemorySettingsStore,
        failing: Vec<&'static str>,
    }

    impl SettingsStore for PartlyFailingStore {
        fn get_raw(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_raw(key)
        }

        fn set_raw(&self, key: &str, value: &str) -> Result<()> {
            if self.failing.iter().any(|k| *k == key) {
                anyhow::bail!("disk full");
            }
            self.inner.set_raw(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys()
        }
    }

    fn fixture(server: &mockito::Server) -> Fixture {
        fixture_with_store(server, Arc::new(InMemorySettingsStore::new()))
    }

    fn fixture_with_store(server: &mockito::Server, store: Arc<dyn SettingsStore>) -> Fixture {
        let session = Session::new(store.clone());
        session.save_token("test-token").unwrap();
        let client = Arc::new(TodoistClient::with_base_url(session, &server.url()).unwrap());
        let prefs = Prefs::new(store.clone());
        let links = LinkIndex::new(store);
        let mail = Arc::new(RecordingMailHost::default());

        Fixture {
            handler: ActionHandler::new(
                client,
                prefs.clone(),
                links.clone(),
                mail.clone(),
                Arc::new(FixedDraft),
            ),
            prefs,
            links,
            mail,
        }
    }

    #[test]
    fn test_create_task_requires_content_and_project() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/tasks").expect(0).create();
        let f = fixture(&server);

        let err = f
            .handler
            .create_task(
                CreateTaskRequest {
                    content: "No project".to_string(),
                    ..CreateTaskRequest::default()
                },
                None,
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "Task content and project ID are required");
        mock.assert();
    }

    #[test]
    fn test_create_task_appends_link_and_records_it() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/tasks")
            .match_body(Matcher::PartialJson(json!({
                "content": "Reply to Dana",
                "description": "Numbers attached\n\n---\n📧 Email ID: report-42@example.com",
                "project_id": "p1"
            })))
            .with_status(200)
            .with_body(json!({ "id": "t1", "content": "Reply to Dana", "project_id": "p1" }).to_string())
            .create();
        let f = fixture(&server);

        let task = f
            .handler
            .create_task(
                CreateTaskRequest {
                    content: "Reply to Dana".to_string(),
                    description: Some("Numbers attached".to_string()),
                    project_id: Some("p1".to_string()),
                    ..CreateTaskRequest::default()
                },
                Some("report-42@example.com"),
            )
            .unwrap();

        assert_eq!(task.id, "t1");
        assert_eq!(f.prefs.last_used_project().unwrap().as_deref(), Some("p1"));
        assert_eq!(
            f.links.lookup("t1").unwrap().as_deref(),
            Some("report-42@example.com")
        );
        mock.assert();
    }

    #[test]
    fn test_created_task_survives_failed_local_writes() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/tasks")
            .with_status(200)
            .with_body(json!({ "id": "t3", "content": "Pay invoice", "project_id": "p1" }).to_string())
            .expect(2)
            .create();
        let store = Arc::new(PartlyFailingStore {
            inner: InMemorySettingsStore::new(),
            failing: vec![
                crate::prefs::keys::LAST_USED_PROJECT,
                crate::prefs::keys::LAST_USED_TASK,
                link::LINKS_KEY,
            ],
        });
        let f = fixture_with_store(&server, store);

        let task = f
            .handler
            .create_task(
                CreateTaskRequest {
                    content: "Pay invoice".to_string(),
                    description: Some("Due Friday".to_string()),
                    project_id: Some("p1".to_string()),
                    ..CreateTaskRequest::default()
                },
                Some("invoice@example.com"),
            )
            .unwrap();
        assert_eq!(task.id, "t3");
        assert_eq!(f.prefs.last_used_project().unwrap(), None);

        let subtask = f
            .handler
            .create_email_subtask("t1", "Invoice", None, Some("invoice@example.com"))
            .unwrap();
        assert_eq!(subtask.id, "t3");
        assert_eq!(f.prefs.last_used_task().unwrap(), None);
        mock.assert();
    }

    #[test]
    fn test_create_task_without_description_gets_no_marker() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/tasks")
            .match_body(Matcher::Regex("^[^📧]*$".to_string()))
            .with_status(200)
            .with_body(json!({ "id": "t2", "content": "Call back" }).to_string())
            .create();
        let f = fixture(&server);

        f.handler
            .create_task(
                CreateTaskRequest {
                    content: "Call back".to_string(),
                    project_id: Some("p1".to_string()),
                    ..CreateTaskRequest::default()
                },
                Some("abc@example.com"),
            )
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_create_email_subtask() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/tasks")
            .match_body(Matcher::PartialJson(json!({
                "content": "* Quarterly report",
                "description": "No email content available\n\n---\n📧 Email ID: q@example.com",
                "parent_id": "t1",
                "priority": 1
            })))
            .with_status(200)
            .with_body(json!({ "id": "t5", "content": "* Quarterly report", "parent_id": "t1" }).to_string())
            .create();
        let f = fixture(&server);

        let subtask = f
            .handler
            .create_email_subtask("t1", "Quarterly report", Some(""), Some("q@example.com"))
            .unwrap();

        assert_eq!(subtask.parent_id.as_deref(), Some("t1"));
        assert_eq!(f.prefs.last_used_task().unwrap().as_deref(), Some("t1"));
        mock.assert();
    }

    #[test]
    fn test_create_email_subtask_requires_parent_and_subject() {
        let server = mockito::Server::new();
        let f = fixture(&server);
        let err = f
            .handler
            .create_email_subtask("", "Subject", None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Parent task ID and email subject are required");
    }

    #[test]
    fn test_add_email_comment_requires_fields() {
        let server = mockito::Server::new();
        let f = fixture(&server);
        let err = f.handler.add_email_comment("t1", "").unwrap_err();
        assert_eq!(err.to_string(), "Task ID and content are required");
    }

    #[test]
    fn test_open_email_from_task_uses_description_marker() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/tasks/t7")
            .with_status(200)
            .with_body(json!({
                "id": "t7",
                "content": "Follow up",
                "description": "Notes\n\n---\n📧 Email ID: older@example.com"
            }).to_string())
            .expect(1)
            .create();
        let f = fixture(&server);

        let opened = f.handler.open_email_from_task("t7").unwrap();

        assert_eq!(opened, "older@example.com");
        assert_eq!(*f.mail.opened.lock().unwrap(), vec!["older@example.com".to_string()]);
        mock.assert();
    }

    #[test]
    fn test_open_email_from_task_prefers_link_table() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/tasks/t8").expect(0).create();
        let f = fixture(&server);
        f.links.record("t8", "linked@example.com").unwrap();

        assert_eq!(f.handler.open_email_from_task("t8").unwrap(), "linked@example.com");
        mock.assert();
    }

    #[test]
    fn test_send_with_task_without_state_is_noop() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", Matcher::Any).expect(0).create();
        let f = fixture(&server);

        assert!(f.handler.send_with_task("3").unwrap().is_none());
        mock.assert();
    }

    #[test]
    fn test_send_with_task_without_section_skips_move() {
        let mut server = mockito::Server::new();
        let create = server
            .mock("POST", "/tasks")
            .with_status(200)
            .with_body(json!({ "id": "t9", "content": "* Re: Budget", "parent_id": "t1" }).to_string())
            .expect(1)
            .create();
        let sync = server.mock("POST", "/sync").expect(0).create();
        let f = fixture(&server);
        f.prefs
            .save_compose_state("4", Some(ComposeState::new("t1", None, None)))
            .unwrap();

        let subtask = f.handler.send_with_task("4").unwrap().unwrap();

        assert_eq!(subtask.id, "t9");
        assert_eq!(f.prefs.compose_state("4").unwrap(), None);
        create.assert();
        sync.assert();
    }

    #[test]
    fn test_send_with_task_creates_subtask_moves_and_clears() {
        let mut server = mockito::Server::new();
        let create = server
            .mock("POST", "/tasks")
            .match_body(Matcher::PartialJson(json!({
                "content": "* Re: Budget",
                "description": "Approved.",
                "parent_id": "t1"
            })))
            .with_status(200)
            .with_body(json!({ "id": "t9", "content": "* Re: Budget", "parent_id": "t1" }).to_string())
            .expect(1)
            .create();
        let sync = server
            .mock("POST", "/sync")
            .match_body(Matcher::Regex("section_id".to_string()))
            .with_status(200)
            .with_body(json!({ "sync_status": {} }).to_string())
            .expect(1)
            .create();
        let f = fixture(&server);
        f.prefs
            .save_compose_state("3", Some(ComposeState::new("t1", Some("p1".into()), Some("s2".into()))))
            .unwrap();

        // The sync reply does not acknowledge the move, so the flow fails
        let result = f.handler.send_with_task("3");

        assert!(result.is_err());
        assert_eq!(f.prefs.compose_state("3").unwrap(), None);
        create.assert();
        sync.assert();
    }
}
