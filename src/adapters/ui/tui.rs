//! Implements InputPort. Inquire-based interactive console.
//!
//! Main menu loop until quit; Esc backs out of sub-prompts, Ctrl-C quits.

use super::{progress, render};
use crate::domain::{ChatSessionState, DomainError};
use crate::ports::{DataGateway, InputPort};
use crate::usecases::{ChatService, DashboardService};
use async_trait::async_trait;
use inquire::{Confirm, InquireError, Select, Text};
use std::sync::Arc;

const MAIN_MENU: &[&str] = &[
    "Dashboard",
    "Drift detection",
    "Anomalies",
    "Recent batches",
    "Parameter trends",
    "Complaints",
    "CAPAs",
    "Chat assistant",
    "Stream quality summary",
    "Quality report",
    "Upload CSV",
    "Upload history",
    "Quit",
];

const TREND_PARAMETERS: &[&str] = &["yield", "hardness", "weight", "compression_force"];

const STATUS_FILTERS: &[&str] = &["all", "open", "closed"];

const DATA_TYPES: &[&str] = &[
    "production",
    "quality_control",
    "complaints",
    "capa",
    "calibration",
    "suppliers",
];

/// Shown when the aggregate dashboard load fails or the database is empty.
const EMPTY_STATE_HINT: &str = "No data available. Import data to get started.";

/// Outcome of one prompt: Esc backs up, Ctrl-C leaves the program.
enum PromptFlow<T> {
    Value(T),
    Back,
    Quit,
}

fn flow<T>(result: Result<T, InquireError>) -> Result<PromptFlow<T>, DomainError> {
    match result {
        Ok(value) => Ok(PromptFlow::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(PromptFlow::Back),
        Err(InquireError::OperationInterrupted) => Ok(PromptFlow::Quit),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// Console adapter wiring the two services and the raw data gateway to
/// interactive prompts.
pub struct ConsoleUi {
    dashboard: Arc<DashboardService>,
    chat: Arc<ChatService>,
    data: Arc<dyn DataGateway>,
    drift_window_days: u32,
    anomaly_days: u32,
}

impl ConsoleUi {
    pub fn new(
        dashboard: Arc<DashboardService>,
        chat: Arc<ChatService>,
        data: Arc<dyn DataGateway>,
        drift_window_days: u32,
        anomaly_days: u32,
    ) -> Self {
        Self {
            dashboard,
            chat,
            data,
            drift_window_days,
            anomaly_days,
        }
    }

    async fn show_dashboard(&self) {
        let bar = progress::spinner("Loading dashboard...");
        let result = self.dashboard.load_overview().await;
        bar.finish_and_clear();
        match result {
            Ok(vm) => render::print_dashboard(&vm),
            Err(e) => {
                tracing::warn!(error = %e, "dashboard load failed");
                println!("{EMPTY_STATE_HINT}");
            }
        }
    }

    async fn show_drift(&self) {
        let bar = progress::spinner("Analyzing drift...");
        let result = self.dashboard.drift_report(self.drift_window_days).await;
        bar.finish_and_clear();
        match result {
            Ok(report) => render::print_drift(&report),
            Err(e) => println!("Drift detection failed: {e}"),
        }
    }

    async fn show_anomalies(&self) {
        let bar = progress::spinner("Scanning for anomalies...");
        let result = self.dashboard.anomaly_report(self.anomaly_days).await;
        bar.finish_and_clear();
        match result {
            Ok(report) => render::print_anomalies(&report),
            Err(e) => println!("Anomaly scan failed: {e}"),
        }
    }

    async fn show_batches(&self) {
        match self.data.batches(20).await {
            Ok(batches) => render::print_batches(&batches),
            Err(e) => println!("Batch load failed: {e}"),
        }
    }

    async fn show_trend(&self) -> Result<PromptFlow<()>, DomainError> {
        let parameter = match flow(
            Select::new("Parameter:", TREND_PARAMETERS.to_vec()).prompt(),
        )? {
            PromptFlow::Value(v) => v,
            PromptFlow::Back => return Ok(PromptFlow::Back),
            PromptFlow::Quit => return Ok(PromptFlow::Quit),
        };
        match self.data.trends(parameter, 90).await {
            Ok(series) => render::print_trend(&series),
            Err(e) => println!("Trend load failed: {e}"),
        }
        Ok(PromptFlow::Back)
    }

    async fn show_complaints(&self) -> Result<PromptFlow<()>, DomainError> {
        let status = match flow(
            Select::new("Status:", STATUS_FILTERS.to_vec()).prompt(),
        )? {
            PromptFlow::Value(v) => v,
            PromptFlow::Back => return Ok(PromptFlow::Back),
            PromptFlow::Quit => return Ok(PromptFlow::Quit),
        };
        let filter = (status != "all").then_some(status);
        match self.data.complaints(filter).await {
            Ok(complaints) => render::print_complaints(&complaints),
            Err(e) => println!("Complaint load failed: {e}"),
        }
        Ok(PromptFlow::Back)
    }

    async fn show_capas(&self) -> Result<PromptFlow<()>, DomainError> {
        let status = match flow(
            Select::new("Status:", STATUS_FILTERS.to_vec()).prompt(),
        )? {
            PromptFlow::Value(v) => v,
            PromptFlow::Back => return Ok(PromptFlow::Back),
            PromptFlow::Quit => return Ok(PromptFlow::Quit),
        };
        let filter = (status != "all").then_some(status);
        match self.data.capas(filter).await {
            Ok(capas) => render::print_capas(&capas),
            Err(e) => println!("CAPA load failed: {e}"),
        }
        Ok(PromptFlow::Back)
    }

    async fn show_uploads(&self) {
        match self.data.uploads().await {
            Ok(uploads) => render::print_uploads(&uploads),
            Err(e) => println!("Upload history failed: {e}"),
        }
    }

    async fn stream_summary(&self) {
        println!();
        let result = self
            .chat
            .stream_summary(|chunk| {
                print!("{chunk}");
                use std::io::Write;
                let _ = std::io::stdout().flush();
            })
            .await;
        println!();
        if let Err(e) = result {
            println!("Summary stream failed: {e}");
        }
    }

    async fn show_report(&self) {
        let bar = progress::spinner("Generating quality report...");
        let result = self.chat.fetch_report().await;
        bar.finish_and_clear();
        match result {
            Ok(report) => println!("\n{report}"),
            Err(e) => println!("Report generation failed: {e}"),
        }
    }

    /// Chat loop: conversation picker plus free-text turns. `/` commands
    /// manage conversations, Esc returns to the main menu.
    async fn chat_loop(&self) -> Result<PromptFlow<()>, DomainError> {
        self.chat.load_conversations().await;

        loop {
            let state = self.chat.state().await;
            print_chat_header(&state);
            render::print_chat_log(&state.messages);

            let input = match flow(
                Text::new("you:")
                    .with_help_message("/new /list /delete, Esc to go back")
                    .prompt(),
            )? {
                PromptFlow::Value(input) => input,
                PromptFlow::Back => return Ok(PromptFlow::Back),
                PromptFlow::Quit => return Ok(PromptFlow::Quit),
            };

            match input.trim() {
                "/new" => {
                    if let Err(e) = self.chat.create_conversation().await {
                        println!("Could not create conversation: {e}");
                    }
                }
                "/list" => match self.pick_conversation().await? {
                    PromptFlow::Value(id) => self.chat.select_conversation(id).await,
                    PromptFlow::Back => {}
                    PromptFlow::Quit => return Ok(PromptFlow::Quit),
                },
                "/delete" => match self.pick_conversation().await? {
                    PromptFlow::Value(id) => {
                        if let Err(e) = self.chat.delete_conversation(id).await {
                            println!("Could not delete conversation: {e}");
                        }
                    }
                    PromptFlow::Back => {}
                    PromptFlow::Quit => return Ok(PromptFlow::Quit),
                },
                text => {
                    let bar = progress::spinner("Thinking...");
                    self.chat.send_message(text).await;
                    bar.finish_and_clear();
                }
            }
        }
    }

    async fn pick_conversation(&self) -> Result<PromptFlow<i64>, DomainError> {
        let state = self.chat.state().await;
        if state.conversations.is_empty() {
            println!("No conversations yet. Send a message or /new to start one.");
            return Ok(PromptFlow::Back);
        }
        let options: Vec<String> = state
            .conversations
            .iter()
            .map(|c| format!("#{} {}", c.id, c.title))
            .collect();
        match flow(Select::new("Conversation:", options).prompt())? {
            PromptFlow::Value(choice) => {
                let id = state
                    .conversations
                    .iter()
                    .find(|c| format!("#{} {}", c.id, c.title) == choice)
                    .map(|c| c.id)
                    .ok_or_else(|| DomainError::Ui("selection out of sync".to_string()))?;
                Ok(PromptFlow::Value(id))
            }
            PromptFlow::Back => Ok(PromptFlow::Back),
            PromptFlow::Quit => Ok(PromptFlow::Quit),
        }
    }

    async fn upload_csv(&self) -> Result<PromptFlow<()>, DomainError> {
        let data_type = match flow(
            Select::new("Data type:", DATA_TYPES.to_vec()).prompt(),
        )? {
            PromptFlow::Value(v) => v,
            PromptFlow::Back => return Ok(PromptFlow::Back),
            PromptFlow::Quit => return Ok(PromptFlow::Quit),
        };

        let path = match flow(Text::new("CSV file path:").prompt())? {
            PromptFlow::Value(v) => v,
            PromptFlow::Back => return Ok(PromptFlow::Back),
            PromptFlow::Quit => return Ok(PromptFlow::Quit),
        };

        let path = path.trim();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("Could not read {path}: {e}");
                return Ok(PromptFlow::Back);
            }
        };
        let filename = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        let confirmed = match flow(
            Confirm::new(&format!("Upload {filename} as {data_type}?"))
                .with_default(true)
                .prompt(),
        )? {
            PromptFlow::Value(v) => v,
            PromptFlow::Back => return Ok(PromptFlow::Back),
            PromptFlow::Quit => return Ok(PromptFlow::Quit),
        };
        if !confirmed {
            return Ok(PromptFlow::Back);
        }

        let bar = progress::spinner("Uploading...");
        let result = self.data.upload(data_type, &filename, bytes).await;
        bar.finish_and_clear();
        match result {
            Ok(outcome) => {
                let rows = outcome.rows_imported.unwrap_or(0);
                println!(
                    "Imported {rows} rows{}",
                    outcome
                        .message
                        .map(|m| format!(" ({m})"))
                        .unwrap_or_default()
                );
            }
            Err(e) => println!("Upload failed: {e}"),
        }
        Ok(PromptFlow::Back)
    }
}

fn print_chat_header(state: &ChatSessionState) {
    let active = state
        .active_id
        .and_then(|id| state.conversations.iter().find(|c| c.id == id));
    match active {
        Some(conversation) => println!("\n-- {} --", conversation.title),
        None => println!("\n-- new conversation --"),
    }
}

#[async_trait]
impl InputPort for ConsoleUi {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            println!();
            let choice = match flow(Select::new("APR Console", MAIN_MENU.to_vec()).prompt())? {
                PromptFlow::Value(choice) => choice,
                PromptFlow::Back | PromptFlow::Quit => return Ok(()),
            };

            match choice {
                "Dashboard" => self.show_dashboard().await,
                "Drift detection" => self.show_drift().await,
                "Anomalies" => self.show_anomalies().await,
                "Recent batches" => self.show_batches().await,
                "Parameter trends" => {
                    if let PromptFlow::Quit = self.show_trend().await? {
                        return Ok(());
                    }
                }
                "Complaints" => {
                    if let PromptFlow::Quit = self.show_complaints().await? {
                        return Ok(());
                    }
                }
                "CAPAs" => {
                    if let PromptFlow::Quit = self.show_capas().await? {
                        return Ok(());
                    }
                }
                "Chat assistant" => {
                    if let PromptFlow::Quit = self.chat_loop().await? {
                        return Ok(());
                    }
                }
                "Stream quality summary" => self.stream_summary().await,
                "Quality report" => self.show_report().await,
                "Upload CSV" => {
                    if let PromptFlow::Quit = self.upload_csv().await? {
                        return Ok(());
                    }
                }
                "Upload history" => self.show_uploads().await,
                _ => return Ok(()),
            }
        }
    }
}
