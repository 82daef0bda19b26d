//! Beacon - command-line front end for tasklink
//!
//! Each subcommand maps onto one service request; the JSON reply is printed
//! to stdout. Messages are read from .eml files given with `--message`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tasklink::todoist::api::CreateTaskRequest;
use tasklink::{
    AppConfig, ComposeSettings, EmlComposeHost, EmlMailHost, InMemorySettingsStore, Preferences,
    Reply, Request, Service, SettingsStore, SqliteSettingsStore,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Message file(s) standing in for the displayed/selected messages
    #[arg(long = "message", global = true)]
    messages: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a token (or the stored one) against the Todoist API
    Test {
        #[arg(long)]
        token: Option<String>,
    },
    /// Store the Todoist API token
    Login { token: String },
    /// Remove the stored token
    Logout,
    /// Show the current message with its extracted body
    Current,
    /// List tasks
    Tasks {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        label: Option<String>,
    },
    /// List projects
    Projects,
    /// List sections, optionally for one project
    Sections {
        #[arg(long)]
        project: Option<String>,
    },
    /// List labels
    Labels,
    /// Add a comment to a task
    Comment { task_id: String, content: String },
    /// Create a subtask for an email under an existing task
    Subtask {
        parent_id: String,
        subject: String,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        email_id: Option<String>,
    },
    /// Create a task, optionally linked to an email
    Create {
        content: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long = "label")]
        labels: Vec<String>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        email_id: Option<String>,
    },
    /// Open an email by Message-ID or through the task linked to it
    Open {
        #[arg(long, conflicts_with = "task")]
        email_id: Option<String>,
        #[arg(long)]
        task: Option<String>,
    },
    /// Move a task to a section, project or parent task
    Move {
        task_id: String,
        #[arg(long, group = "destination")]
        section: Option<String>,
        #[arg(long, group = "destination")]
        project: Option<String>,
        #[arg(long, group = "destination")]
        parent: Option<String>,
    },
    /// Choose (or with no --task, forget) the task for a compose tab
    Compose {
        tab: String,
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        section: Option<String>,
    },
    /// Run the pre-send flow for a compose tab using a draft .eml
    Send { tab: String, draft: PathBuf },
    /// Show the task picker with the saved filter applied
    View {
        #[arg(long)]
        search: Option<String>,
        /// Replace the saved project filter
        #[arg(long)]
        project: Option<String>,
        /// Replace the saved label filter
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        select: Option<String>,
        /// Forget the saved filter first
        #[arg(long)]
        clear: bool,
    },
    /// Show or change settings-page options
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Send a raw JSON request
    Raw { json: String },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        /// Preferences as JSON; missing fields take their defaults
        #[arg(long, value_parser = parse_preferences)]
        preferences: Option<Preferences>,
        #[arg(long)]
        icon_only: Option<bool>,
        #[arg(long)]
        compose_project: Option<String>,
        #[arg(long, requires = "compose_project")]
        compose_section: Option<String>,
    },
    Reset,
}

fn parse_preferences(raw: &str) -> std::result::Result<Preferences, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid preferences: {}", e))
}

impl Command {
    /// Translate into a service request; `Raw` has none
    fn into_request(self) -> Option<Request> {
        let request = match self {
            Command::Test { token } => Request::TestTodoistConnection { token },
            Command::Login { token } => Request::SaveTodoistToken { token: Some(token) },
            Command::Logout => Request::ClearTodoistToken,
            Command::Current => Request::GetCurrentMessage,
            Command::Tasks { project, label } => {
                let mut filter = BTreeMap::new();
                if let Some(project) = project {
                    filter.insert("project_id".to_string(), project);
                }
                if let Some(label) = label {
                    filter.insert("label".to_string(), label);
                }
                Request::GetTasks {
                    filter: Some(filter),
                    project_id: None,
                }
            }
            Command::Projects => Request::GetProjects,
            Command::Sections { project } => Request::GetSections { project_id: project },
            Command::Labels => Request::GetLabels,
            Command::Comment { task_id, content } => Request::AddEmailComment { task_id, content },
            Command::Subtask {
                parent_id,
                subject,
                body,
                email_id,
            } => Request::CreateEmailSubtask {
                parent_task_id: parent_id,
                email_subject: subject,
                email_body: body,
                header_message_id: email_id,
            },
            Command::Create {
                content,
                project,
                description,
                section,
                labels,
                priority,
                due,
                email_id,
            } => Request::CreateTask {
                task_data: Some(CreateTaskRequest {
                    content,
                    description,
                    project_id: Some(project),
                    section_id: section,
                    labels,
                    priority,
                    due_string: due,
                    ..CreateTaskRequest::default()
                }),
                header_message_id: email_id,
            },
            Command::Open { email_id, task } => Request::OpenEmailFromLink {
                header_message_id: email_id,
                task_id: task,
            },
            Command::Move {
                task_id,
                section,
                project,
                parent,
            } => Request::MoveTask {
                task_id,
                section_id: section,
                project_id: project,
                parent_id: parent,
            },
            Command::Compose {
                tab,
                task,
                project,
                section,
            } => Request::SaveComposeState {
                tab_id: tab,
                task_id: task,
                project_id: project,
                section_id: section,
            },
            Command::Send { tab, .. } => Request::SendWithTask { tab_id: tab },
            Command::View {
                search,
                project,
                label,
                select,
                clear,
            } => Request::GetTaskView {
                search,
                project_id: project,
                label,
                selected_task_id: select,
                clear_filter: clear,
            },
            Command::Settings { action } => match action {
                SettingsCommand::Show => Request::GetPreferences,
                SettingsCommand::Set {
                    preferences,
                    icon_only,
                    compose_project,
                    compose_section,
                } => Request::SavePreferences {
                    preferences,
                    icon_only_mode: icon_only,
                    compose_settings: compose_project.map(|project_id| ComposeSettings {
                        project_id,
                        target_section_id: compose_section.unwrap_or_default(),
                    }),
                },
                SettingsCommand::Reset => Request::ResetPreferences,
            },
            Command::Raw { .. } => return None,
        };
        Some(request)
    }
}

fn open_store(config: &AppConfig) -> Result<Arc<dyn SettingsStore>> {
    let Some(path) = &config.db_path else {
        warn!("No config directory available, settings will not persist");
        return Ok(Arc::new(InMemorySettingsStore::new()));
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(Arc::new(SqliteSettingsStore::new(path)?))
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let store = open_store(&config)?;

    let compose = match &cli.command {
        Command::Send { tab, draft } => EmlComposeHost::new().with_draft(tab.clone(), draft.clone()),
        _ => EmlComposeHost::new(),
    };
    let mail = EmlMailHost::new(cli.messages);
    let service = Service::new(&config, store, Arc::new(mail), Arc::new(compose))?;

    let reply = match cli.command {
        Command::Raw { json } => service.handle_json(&json),
        command => match command.into_request() {
            Some(request) => service.handle(request),
            None => Reply::err("Unknown message type"),
        },
    };

    println!("{}", serde_json::to_string_pretty(&reply)?);
    if !reply.success {
        std::process::exit(1);
    }
    Ok(())
}
