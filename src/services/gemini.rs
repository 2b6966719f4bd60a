// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini `generateContent` REST client with function calling.

use crate::services::assistant::{
    AssistantError, ChatModel, ChatPart, ChatTurn, FunctionCall, ModelReply, Role,
    ToolDeclaration,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// [`ChatModel`] backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ChatTurn],
        tools: &[ToolDeclaration],
    ) -> Result<ModelReply, AssistantError> {
        let body = build_request(system_instruction, history, tools);
        let url = format!("{}/{}:generateContent", BASE_URL, self.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Transport(format!("Invalid Gemini response: {}", e)))?;

        extract_reply(parsed)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn build_request(
    system_instruction: &str,
    history: &[ChatTurn],
    tools: &[ToolDeclaration],
) -> GenerateContentRequest {
    let contents = history
        .iter()
        .map(|turn| Content {
            role: Some(
                match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                }
                .to_string(),
            ),
            parts: turn.parts.iter().map(to_wire_part).collect(),
        })
        .collect();

    let tools = if tools.is_empty() {
        Vec::new()
    } else {
        vec![Tool {
            function_declarations: tools
                .iter()
                .map(|t| FunctionDeclaration {
                    name: t.name.to_string(),
                    description: t.description.to_string(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    };

    GenerateContentRequest {
        contents,
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(system_instruction.to_string()),
                ..Default::default()
            }],
        },
        tools,
    }
}

fn to_wire_part(part: &ChatPart) -> Part {
    match part {
        ChatPart::Text(text) => Part {
            text: Some(text.clone()),
            ..Default::default()
        },
        ChatPart::FunctionCall(call) => Part {
            function_call: Some(WireFunctionCall {
                name: call.name.clone(),
                args: call.args.clone(),
            }),
            ..Default::default()
        },
        ChatPart::FunctionResponse { name, result } => Part {
            function_response: Some(WireFunctionResponse {
                name: name.clone(),
                response: json!({ "result": result }),
            }),
            ..Default::default()
        },
    }
}

/// Function calls win over text when a candidate carries both.
fn extract_reply(response: GenerateContentResponse) -> Result<ModelReply, AssistantError> {
    let parts = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let mut calls = Vec::new();
    let mut text = String::new();
    for part in parts {
        if let Some(call) = part.function_call {
            calls.push(FunctionCall {
                name: call.name,
                args: call.args,
            });
        } else if let Some(t) = part.text {
            text.push_str(&t);
        }
    }

    if !calls.is_empty() {
        Ok(ModelReply::FunctionCalls(calls))
    } else if !text.trim().is_empty() {
        Ok(ModelReply::Text(text))
    } else {
        Err(AssistantError::EmptyResponse)
    }
}

fn map_http_error(status: StatusCode, body: String) -> AssistantError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    AssistantError::Upstream {
        status: status.as_u16(),
        message,
    }
}
