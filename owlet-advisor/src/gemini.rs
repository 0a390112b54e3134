//! Gemini `generateContent` client shared by classification and advisory
//! calls.

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default model for classification and short feedback.
pub const FAST_MODEL: &str = "gemini-3-flash-preview";
/// Default model for projection and benchmark analysis.
pub const PRO_MODEL: &str = "gemini-3-pro-preview";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub fast_model: String,
    pub pro_model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            fast_model: FAST_MODEL.to_string(),
            pro_model: PRO_MODEL.to_string(),
        }
    }
}

/// One piece of user content: text, or base64 inline image data.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: String },
}

/// Run one generateContent call and return the concatenated text parts.
pub async fn generate(
    cfg: &GeminiConfig,
    model: &str,
    system: &str,
    parts: Vec<Part>,
    want_json: bool,
) -> Result<String> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct InlineData {
        mime_type: String,
        data: String,
    }

    #[derive(Serialize)]
    #[serde(untagged)]
    enum ReqPart {
        Text {
            text: String,
        },
        #[serde(rename_all = "camelCase")]
        Inline {
            inline_data: InlineData,
        },
    }

    #[derive(Serialize)]
    struct Content {
        role: String,
        parts: Vec<ReqPart>,
    }

    #[derive(Serialize)]
    struct SystemInstruction {
        parts: Vec<ReqPart>,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct GenerationConfig {
        response_mime_type: String,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Req {
        system_instruction: SystemInstruction,
        contents: Vec<Content>,
        #[serde(skip_serializing_if = "Option::is_none")]
        generation_config: Option<GenerationConfig>,
    }

    #[derive(Deserialize)]
    struct Resp {
        candidates: Option<Vec<Candidate>>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: Option<RespContent>,
    }

    #[derive(Deserialize)]
    struct RespContent {
        parts: Option<Vec<RespPart>>,
    }

    #[derive(Deserialize)]
    struct RespPart {
        text: Option<String>,
    }

    let req_parts = parts
        .into_iter()
        .map(|p| match p {
            Part::Text(text) => ReqPart::Text { text },
            Part::InlineData { mime_type, data } => ReqPart::Inline {
                inline_data: InlineData { mime_type, data },
            },
        })
        .collect();

    let body = Req {
        system_instruction: SystemInstruction {
            parts: vec![ReqPart::Text {
                text: system.to_string(),
            }],
        },
        contents: vec![Content {
            role: "user".to_string(),
            parts: req_parts,
        }],
        generation_config: want_json.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
        }),
    };

    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        cfg.base_url.trim_end_matches('/'),
        model
    );

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .query(&[("key", cfg.api_key.as_str())])
        .json(&body)
        .send()
        .await
        .context("gemini request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("gemini error: {status} {txt}");
    }

    let out: Resp = resp.json().await.context("parse gemini response")?;
    let mut s = String::new();
    for cand in out.candidates.unwrap_or_default() {
        for part in cand.content.and_then(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                s.push_str(&t);
            }
        }
    }
    Ok(s.trim().to_string())
}

/// Pull the first JSON object or array out of model text. Models wrap JSON
/// in prose or fences often enough that this has to be lenient; unparsable
/// text yields an empty object so downstream defaulting can run.
pub fn extract_json(text: &str) -> Result<Value> {
    let re = Regex::new(r"(?s)\{.*\}|\[.*\]")?;
    let candidate = re.find(text).map(|m| m.as_str()).unwrap_or(text);
    Ok(serde_json::from_str(candidate).unwrap_or_else(|_| Value::Object(Default::default())))
}

/// Numeric fields may arrive as JSON numbers or numeric strings.
pub fn loose_f64(v: &Value, key: &str) -> Option<f64> {
    match v.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty trimmed string field.
pub fn loose_str<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
