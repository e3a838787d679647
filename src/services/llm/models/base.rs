use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn new<T: Into<String>>(role: Role, content: T) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system<T: Into<String>>(content: T) -> Self {
        Self::new(Role::System, content)
    }
    pub fn user<T: Into<String>>(content: T) -> Self {
        Self::new(Role::User, content)
    }
    pub fn assistant<T: Into<String>>(content: T) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Fields shared by every Ollama generation request.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BaseRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<InferenceOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

/// Sampling options, sent as the nested `options` object of the request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InferenceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Ollama's name for the maximum number of generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i32>,
}

impl InferenceOptions {
    pub fn sampling(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            num_predict: Some(i32::try_from(max_tokens).unwrap_or(i32::MAX)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_are_nested_and_sparse() {
        let req = BaseRequest {
            model: "llama3.2:3b".into(),
            options: Some(InferenceOptions::sampling(0.5, 300)),
            stream: Some(false),
            keep_alive: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "llama3.2:3b",
                "options": { "temperature": 0.5, "num_predict": 300 },
                "stream": false
            })
        );
    }

    #[test]
    fn message_roles_are_lowercase() {
        let value = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(value, json!({ "role": "system", "content": "be brief" }));
    }
}
