use tokio::sync::mpsc::Sender;

use crate::notifications::{Notification, NotificationContent, Response, RetryAttempt, Success, Token};
use crate::services::llm::{ChatRequest, ChatResponse};

#[allow(async_fn_in_trait)]
pub trait NotificationHandler {
    fn get_outgoing_channel(&self) -> &Option<Sender<Notification>>;
    fn get_channel_name(&self) -> &String;

    /// Send a notification with the given content.
    ///
    /// Returns `true` if successfully delivered, `false` otherwise.
    async fn notify(&self, content: NotificationContent) -> bool {
        let Some(notification_channel) = self.get_outgoing_channel() else {
            return false;
        };

        match notification_channel
            .send(Notification::new(self.get_channel_name().clone(), content))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed sending notification");
                false
            }
        }
    }

    async fn notify_done(&self, success: Success, resp: Response) -> bool {
        self.notify(NotificationContent::Done(success, resp)).await
    }
    async fn notify_prompt_request(&self, req: ChatRequest) -> bool {
        self.notify(NotificationContent::PromptRequest(req)).await
    }
    async fn notify_prompt_success(&self, resp: ChatResponse) -> bool {
        self.notify(NotificationContent::PromptSuccessResult(resp)).await
    }
    async fn notify_prompt_error(&self, error_message: String) -> bool {
        self.notify(NotificationContent::PromptErrorResult(error_message))
            .await
    }
    async fn notify_retry(&self, attempt: RetryAttempt) -> bool {
        self.notify(NotificationContent::Retry(attempt)).await
    }
    async fn notify_token(&self, token: Token) -> bool {
        self.notify(NotificationContent::Token(token)).await
    }
}
