use std::collections::HashMap;

use concierge_model::{
    AssistantTurn, ErrorKind, ModelMessage, ModelRequest, ModelTool,
    ToolCallRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Error;

const ROLE_USER: &str = "user";
const ROLE_MODEL: &str = "model";

// ----------------------------------------
// Types shared between requests and responses
// ----------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn function_call(call: FunctionCall) -> Self {
        Self {
            function_call: Some(call),
            ..Default::default()
        }
    }

    fn function_response(response: FunctionResponse) -> Self {
        Self {
            function_response: Some(response),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    generation_config: GenerationConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

// -----------
// Conversions
// -----------

pub fn create_request(req: &ModelRequest) -> GenerateContentRequest {
    // The wire format correlates a function response with its call by
    // name, not by id, so recover the name from the assistant turn that
    // issued the call.
    let mut call_names: HashMap<&str, &str> = HashMap::new();

    let mut system_instruction = None;
    let mut contents: Vec<Content> = Vec::new();
    for msg in &req.messages {
        match msg {
            ModelMessage::System(text) => {
                system_instruction = Some(Content {
                    role: None,
                    parts: vec![Part::text(text.clone())],
                });
            }
            ModelMessage::User(text) => {
                contents.push(Content {
                    role: Some(ROLE_USER.to_owned()),
                    parts: vec![Part::text(text.clone())],
                });
            }
            ModelMessage::Assistant(turn) => {
                let mut parts = Vec::new();
                if !turn.content.is_empty() {
                    parts.push(Part::text(turn.content.clone()));
                }
                for call in &turn.tool_calls {
                    call_names.insert(&call.id, &call.name);
                    parts.push(Part::function_call(FunctionCall {
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                    }));
                }
                // The API rejects a content with no parts.
                if parts.is_empty() {
                    parts.push(Part::text(""));
                }
                contents.push(Content {
                    role: Some(ROLE_MODEL.to_owned()),
                    parts,
                });
            }
            ModelMessage::ToolResult(result) => {
                let name = call_names
                    .get(result.id.as_str())
                    .copied()
                    .unwrap_or("unknown");
                let part = Part::function_response(FunctionResponse {
                    name: name.to_owned(),
                    response: json!({ "content": result.content }),
                });
                // Results of one acting phase go into a single user
                // content with one functionResponse part per call.
                match contents.last_mut() {
                    Some(content)
                        if content.role.as_deref() == Some(ROLE_USER)
                            && content
                                .parts
                                .iter()
                                .all(|p| p.function_response.is_some()) =>
                    {
                        content.parts.push(part);
                    }
                    _ => contents.push(Content {
                        role: Some(ROLE_USER.to_owned()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    let tools = if req.tools.is_empty() {
        vec![]
    } else {
        vec![ToolDeclarations {
            function_declarations: req
                .tools
                .iter()
                .map(create_declaration)
                .collect(),
        }]
    };

    GenerateContentRequest {
        system_instruction,
        contents,
        tools,
        generation_config: GenerationConfig { temperature: 0.0 },
    }
}

#[inline]
fn create_declaration(tool: &ModelTool) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: tool.parameters.clone(),
    }
}

pub fn parse_response(
    resp: GenerateContentResponse,
) -> Result<AssistantTurn, Error> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(Error::new(
            "response has no candidates",
            ErrorKind::MalformedResponse,
        ));
    };
    let Some(content) = candidate.content else {
        return Err(Error::new(
            "candidate has no content",
            ErrorKind::MalformedResponse,
        ));
    };

    let mut turn = AssistantTurn::default();
    for part in content.parts {
        if let Some(text) = part.text {
            turn.content.push_str(&text);
        }
        if let Some(call) = part.function_call {
            // The wire format carries no call ids; synthesize one per
            // call so results can be correlated back.
            let id = format!("call:{}", turn.tool_calls.len());
            turn.tool_calls.push(ToolCallRequest {
                id,
                name: call.name,
                arguments: call.args,
            });
        }
    }

    if turn.is_final() && turn.content.is_empty() {
        return Err(Error::new(
            "candidate carries neither text nor function calls",
            ErrorKind::MalformedResponse,
        ));
    }
    Ok(turn)
}
