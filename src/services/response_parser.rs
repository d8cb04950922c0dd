//! Turns a model reply into an [`AnalysisResult`].
//!
//! Models are asked for bare JSON but regularly wrap it in code fences or
//! surround it with prose. Parsing therefore runs in two stages: strict
//! decoding of the outermost brace-delimited block, then a line oriented
//! keyword parser that accepts anything.

use serde::Deserialize;

use crate::domain::AnalysisResult;

const MIN_CONTINUATION_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Summary,
    Industry,
    AutomationPitch,
}

const FIELD_KEYWORDS: [(Field, &[&str]); 3] = [
    (Field::Summary, &["summary", "about", "description"]),
    (Field::Industry, &["industry", "sector", "business"]),
    (Field::AutomationPitch, &["automation", "pitch", "solution"]),
];

#[derive(Deserialize)]
struct StructuredAnalysis {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    automation_pitch: Option<String>,
}

pub fn parse_llm_response(raw: &str) -> AnalysisResult {
    let content = strip_code_fences(raw);

    match find_json_block(&content).and_then(parse_structured) {
        Some(result) => result,
        None => {
            log::info!("Using fallback text parsing");
            parse_heuristic(&content)
        }
    }
}

pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Everything from the first `{` to the last `}`.
pub fn find_json_block(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;

    match end > start {
        true => Some(&content[start..=end]),
        false => None,
    }
}

pub fn parse_structured(block: &str) -> Option<AnalysisResult> {
    match serde_json::from_str::<StructuredAnalysis>(block) {
        Ok(parsed) => {
            let clean = |value: Option<String>| value.unwrap_or_default().trim().to_string();
            Some(
                AnalysisResult {
                    summary: clean(parsed.summary),
                    industry: clean(parsed.industry),
                    automation_pitch: clean(parsed.automation_pitch),
                }
                .truncated(),
            )
        }
        Err(e) => {
            log::warn!("JSON parsing failed, trying fallback: {}", e);
            None
        }
    }
}

/// Never fails; the worst case is an all-empty result.
pub fn parse_heuristic(content: &str) -> AnalysisResult {
    let mut result = AnalysisResult::default();
    let mut current: Option<Field> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        let keyword_field = FIELD_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(field, _)| *field);

        match (keyword_field, current) {
            (Some(field), _) => {
                current = Some(field);
                if let Some((_, rest)) = line.split_once(':') {
                    *field_mut(&mut result, field) = rest.trim().to_string();
                }
            }
            (None, Some(field)) if line.chars().count() > MIN_CONTINUATION_CHARS => {
                let value = field_mut(&mut result, field);
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line);
            }
            (None, _) => {}
        }
    }

    result.truncated()
}

fn field_mut(result: &mut AnalysisResult, field: Field) -> &mut String {
    match field {
        Field::Summary => &mut result.summary,
        Field::Industry => &mut result.industry,
        Field::AutomationPitch => &mut result.automation_pitch,
    }
}
