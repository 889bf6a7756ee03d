use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tools whose invocations write file content that can be compared against a live file.
pub const CONTENT_WRITING_TOOLS: &[&str] = &["Write", "Edit"];

/// Tools whose invocations record the absolute path of a file they wrote.
pub const PATH_RECORDING_TOOLS: &[&str] = &["Write", "Edit", "NotebookEdit"];

const RECORD_TYPE_USER: &str = "user";
const RECORD_TYPE_ASSISTANT: &str = "assistant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
    System,
}

impl MessageType {
    /// Map a raw record type onto a message type.
    ///
    /// Anything other than `user` or `assistant` (case-insensitive) is reported as `System`.
    pub fn from_record_type(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case(RECORD_TYPE_USER) {
            Self::User
        } else if raw.eq_ignore_ascii_case(RECORD_TYPE_ASSISTANT) {
            Self::Assistant
        } else {
            if !raw.eq_ignore_ascii_case("system") {
                tracing::debug!(record_type = raw, "unrecognised record type reported as system");
            }
            Self::System
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One content block inside a structured message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(
        #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_blocks")]
        Vec<ContentBlock>,
    ),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Plain(String),
    Structured {
        #[serde(default)]
        role: Option<String>,
        #[serde(default)]
        content: MessageContent,
    },
    /// Any other JSON shape; carries no text.
    Unknown(Value),
}

/// A tool invocation borrowed from an assistant record.
#[derive(Debug, Clone, Copy)]
pub struct ToolInvocation<'a> {
    pub name: &'a str,
    pub input: &'a Value,
}

impl<'a> ToolInvocation<'a> {
    /// Path the invocation targets, if its input names one.
    pub fn target_path(&self) -> Option<&'a str> {
        ["file_path", "notebook_path"]
            .iter()
            .find_map(|key| self.input.get(key).and_then(Value::as_str))
            .filter(|path| !path.is_empty())
    }

    pub fn input_str(&self, key: &str) -> Option<&'a str> {
        self.input.get(key).and_then(Value::as_str)
    }

    /// Compact JSON rendering of the input, as matched by tool searches.
    pub fn serialized_input(&self) -> String {
        if self.input.is_null() {
            return "{}".to_string();
        }
        serde_json::to_string(self.input).unwrap_or_default()
    }

    pub fn is_one_of(&self, names: &[&str]) -> bool {
        names.contains(&self.name)
    }
}

/// Typed view of one session log line. Never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_lenient_string"
    )]
    pub record_type: String,
    #[serde(
        rename = "sessionId",
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_lenient_string"
    )]
    pub session_id: String,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub timestamp: String,
    #[serde(default)]
    pub message: Option<MessageBody>,
    #[serde(
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_lenient_string"
    )]
    pub cwd: String,
    #[serde(
        rename = "gitBranch",
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_lenient_string"
    )]
    pub git_branch: String,
    #[serde(
        rename = "isCompactSummary",
        default,
        deserialize_with = "crate::parsers::deserializers::deserialize_lenient_bool"
    )]
    pub is_compact_summary: Option<bool>,
    #[serde(rename = "toolUseResult", default)]
    pub tool_use_result: Option<Value>,
}

impl EventRecord {
    pub fn message_type(&self) -> MessageType {
        MessageType::from_record_type(&self.record_type)
    }

    pub fn is_user(&self) -> bool {
        self.record_type == RECORD_TYPE_USER
    }

    pub fn is_assistant(&self) -> bool {
        self.record_type == RECORD_TYPE_ASSISTANT
    }

    /// Raw type equals `message_type`, ignoring ASCII case. Unrecognised types never match.
    pub fn has_type(&self, message_type: MessageType) -> bool {
        self.record_type.eq_ignore_ascii_case(message_type.as_str())
    }

    /// User and assistant turns; everything else is bookkeeping.
    pub fn is_conversation(&self) -> bool {
        self.is_user() || self.is_assistant()
    }

    pub fn is_compact_summary(&self) -> bool {
        self.is_compact_summary.unwrap_or(false)
    }

    /// Human-readable text of the record. Text blocks are joined with a single space.
    pub fn text(&self) -> String {
        match &self.message {
            Some(MessageBody::Plain(text)) => text.clone(),
            Some(MessageBody::Structured { content: MessageContent::Text(text), .. }) => {
                text.clone()
            }
            Some(MessageBody::Structured { content: MessageContent::Blocks(blocks), .. }) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                parts.join(" ")
            }
            Some(MessageBody::Unknown(_)) | None => String::new(),
        }
    }

    fn blocks(&self) -> &[ContentBlock] {
        match &self.message {
            Some(MessageBody::Structured { content: MessageContent::Blocks(blocks), .. }) => {
                blocks
            }
            _ => &[],
        }
    }

    /// Tool invocations carried in this record's content blocks, in order.
    pub fn tool_invocations(&self) -> impl Iterator<Item = ToolInvocation<'_>> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolUse { name, input, .. } => {
                Some(ToolInvocation { name: name.as_str(), input })
            }
            _ => None,
        })
    }

    /// First invocation whose name equals `tool`, ignoring ASCII case.
    pub fn find_tool(&self, tool: &str) -> Option<ToolInvocation<'_>> {
        self.tool_invocations().find(|invocation| invocation.name.eq_ignore_ascii_case(tool))
    }

    /// `toolUseResult.filePath` from a tool-result confirmation record.
    pub fn confirmed_file_path(&self) -> Option<&str> {
        self.tool_use_result
            .as_ref()
            .and_then(|result| result.get("filePath"))
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
    }
}
