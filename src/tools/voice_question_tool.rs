use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, info};

use crate::mcp::types::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::utils::voice::{capture_question, MAX_RECORD_SECONDS};

pub static VOICE_QUESTION_TOOL_DEFINITION: Lazy<ToolDefinition> = Lazy::new(|| ToolDefinition {
    name: "voice-question".to_string(),
    description:
        "Record a short utterance from the microphone and return its transcript, for dictating \
         a question to ask-document"
            .to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "seconds": {
                "type": "integer",
                "description": "Clip length in seconds (default: server setting)",
                "minimum": 1,
                "maximum": MAX_RECORD_SECONDS
            }
        }
    }),
    annotations: Some(ToolAnnotations {
        title: Some("Voice Question".to_string()),
        read_only_hint: Some(true),
        open_world_hint: Some(false),
    }),
});

#[derive(Debug, Default, Deserialize)]
struct VoiceQuestionParams {
    seconds: Option<u64>,
}

pub struct VoiceQuestionTool {
    record_seconds: u64,
    whisper_model: Option<PathBuf>,
}

impl VoiceQuestionTool {
    pub fn new(record_seconds: u64, whisper_model: Option<PathBuf>) -> Self {
        Self {
            record_seconds,
            whisper_model,
        }
    }

    pub async fn execute(&self, arguments: Option<serde_json::Value>) -> CallToolResult {
        let params = match arguments {
            Some(args) => match serde_json::from_value::<VoiceQuestionParams>(args) {
                Ok(params) => params,
                Err(e) => return CallToolResult::error(format!("Invalid parameters: {}", e)),
            },
            None => VoiceQuestionParams::default(),
        };

        let seconds = params.seconds.unwrap_or(self.record_seconds);
        info!("Capturing a {} second voice question", seconds);

        match capture_question(seconds, self.whisper_model.as_deref()).await {
            Ok(transcript) => CallToolResult::success(transcript),
            Err(e) => {
                error!("Voice capture failed: {}", e);
                CallToolResult::error(format!("Error capturing voice question: {}", e))
            }
        }
    }
}
