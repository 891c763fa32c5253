//! ChatGateway over HTTP.

use super::client::ApiClient;
use super::sse;
use crate::domain::{ChatMessage, Conversation, DomainError};
use crate::ports::{ChatGateway, SummaryStream};
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
struct ChatTurnResponse {
    response: String,
}

#[derive(Deserialize)]
struct ReportResponse {
    report: String,
}

#[async_trait::async_trait]
impl ChatGateway for ApiClient {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, DomainError> {
        self.get_json("/chat/conversations", &[]).await
    }

    async fn create_conversation(&self) -> Result<Conversation, DomainError> {
        self.post_json("/chat/conversations", None).await
    }

    async fn delete_conversation(&self, id: i64) -> Result<(), DomainError> {
        self.delete(&format!("/chat/conversations/{id}")).await
    }

    async fn send_message(
        &self,
        conversation_id: i64,
        message: &str,
    ) -> Result<String, DomainError> {
        info!(conversation_id, chars = message.len(), "sending chat message");
        let body = serde_json::json!({ "message": message });
        let turn: ChatTurnResponse = self
            .post_json(&format!("/chat/{conversation_id}"), Some(&body))
            .await?;
        Ok(turn.response)
    }

    async fn history(&self, conversation_id: i64) -> Result<Vec<ChatMessage>, DomainError> {
        self.get_json(&format!("/chat/{conversation_id}/history"), &[])
            .await
    }

    async fn open_summary_stream(&self) -> Result<SummaryStream, DomainError> {
        sse::open_summary_stream(self).await
    }

    async fn report(&self) -> Result<String, DomainError> {
        let report: ReportResponse = self.get_json("/chat/report", &[]).await?;
        Ok(report.report)
    }
}
