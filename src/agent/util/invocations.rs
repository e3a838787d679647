use futures::{pin_mut, StreamExt};
use tracing::{debug, error, info};

use crate::{
    notifications::{NotificationHandler, RetryAttempt, Token},
    services::llm::{ChatRequest, ChatResponse, InferenceClientError, Message},
    Agent, AgentError,
};

/// Send `request` until a non-empty reply comes back or the attempts run out.
pub(crate) async fn invoke_with_retries(
    agent: &Agent,
    request: ChatRequest,
) -> Result<String, AgentError> {
    let attempts = agent.max_retries.max(1);
    let mut last_error = AgentError::EmptyResponse;

    for attempt in 1..=attempts {
        info!(
            agent = %agent.name,
            model = %agent.model,
            "Sending {} message(s) to Ollama",
            request.messages.len()
        );
        for msg in &request.messages {
            debug!(agent = %agent.name, role = ?msg.role, content = %msg.content);
        }

        let outcome = match request.base.stream {
            Some(true) => call_model_streaming(agent, request.clone()).await,
            _ => call_model_nonstreaming(agent, request.clone()).await,
        };

        match outcome.and_then(non_empty_reply) {
            Ok(reply) => {
                info!(agent = %agent.name, response = %reply, "Response");
                agent.notify_done(true, Some(reply.clone())).await;
                return Ok(reply);
            }
            Err(e) => {
                error!(
                    agent = %agent.name,
                    "Ollama error: {e} (Retry {attempt}/{attempts})"
                );
                agent
                    .notify_retry(RetryAttempt {
                        attempt,
                        max_retries: attempts,
                        error: e.to_string(),
                    })
                    .await;
                last_error = e;
            }
        }
    }

    agent.notify_done(false, None).await;
    Err(AgentError::RetriesExhausted {
        agent: agent.name.clone(),
        retries: attempts,
        last_error: Box::new(last_error),
    })
}

fn non_empty_reply(response: ChatResponse) -> Result<String, AgentError> {
    let reply = response.message.content.trim();
    if reply.is_empty() {
        return Err(AgentError::EmptyResponse);
    }
    Ok(reply.to_string())
}

async fn call_model_nonstreaming(
    agent: &Agent,
    request: ChatRequest,
) -> Result<ChatResponse, AgentError> {
    agent.notify_prompt_request(request.clone()).await;

    let resp = match agent.model_client.chat(request).await {
        Ok(resp) => resp,
        Err(e) => {
            agent.notify_prompt_error(e.to_string()).await;
            return Err(e.into());
        }
    };

    agent.notify_prompt_success(resp.clone()).await;
    Ok(resp)
}

async fn call_model_streaming(
    agent: &Agent,
    request: ChatRequest,
) -> Result<ChatResponse, AgentError> {
    agent.notify_prompt_request(request.clone()).await;

    let stream = match agent.model_client.chat_stream(request).await {
        Ok(s) => s,
        Err(e) => {
            agent.notify_prompt_error(e.to_string()).await;
            return Err(e.into());
        }
    };

    pin_mut!(stream);

    let mut full_content = String::new();
    let mut done_chunk = None;

    while let Some(chunk_res) = stream.next().await {
        let chunk = match chunk_res {
            Ok(c) => c,
            Err(e) => {
                agent.notify_prompt_error(e.to_string()).await;
                return Err(e.into());
            }
        };

        if let Some(msg) = &chunk.message {
            if !msg.content.is_empty() {
                agent
                    .notify_token(Token {
                        tag: None,
                        value: msg.content.clone(),
                    })
                    .await;
                full_content.push_str(&msg.content);
            }
        }

        if chunk.done {
            done_chunk = Some(chunk);
            break;
        }
    }

    let Some(chunk) = done_chunk else {
        let err = InferenceClientError::Api("stream ended without a final `done` chunk".into());
        agent.notify_prompt_error(err.to_string()).await;
        return Err(err.into());
    };

    let response = chunk.into_response(Message::assistant(full_content));
    agent.notify_prompt_success(response.clone()).await;
    Ok(response)
}
