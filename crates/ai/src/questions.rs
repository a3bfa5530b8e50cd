use serde::{Deserialize, Serialize};

use crate::result::AiError;

/// Input widget for a generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Select,
    Number,
}

/// One generated intake question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Prompt asking the provider for 5 vehicle-specific intake questions.
pub fn questions_prompt(vehicle: &str) -> String {
    format!(
        "Generate 5 specific assessment questions for a {vehicle} that will be detailed. \
         The questions should help determine the condition of the vehicle and the level of \
         detailing required. Format the output as a JSON array of objects, each with 'id', \
         'question', 'type' (either 'text', 'select', or 'number'), and 'options' (an array \
         of strings, only for 'select' type) properties. Respond with the JSON array only."
    )
}

/// Best-effort parse of a question-list response.
///
/// Tolerates markdown code fences around the JSON; anything else unparseable
/// is a typed error the caller may map to an empty list.
pub fn parse_questions(raw: &str) -> Result<Vec<AssessmentQuestion>, AiError> {
    let body = strip_fences(raw);
    if body.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    serde_json::from_str(body).map_err(|e| AiError::Parse(e.to_string()))
}

/// Drop a surrounding ```/```json fence, if present.
pub(crate) fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"[
        {"id": "q1", "question": "Any swirl marks on the paint?", "type": "select",
         "options": ["none", "light", "heavy"]},
        {"id": "q2", "question": "Approximate mileage?", "type": "number"}
    ]"#;

    #[test]
    fn parses_a_plain_json_array() {
        let questions = parse_questions(RESPONSE).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_type, QuestionType::Select);
        assert_eq!(
            questions[0].options.as_ref().unwrap(),
            &vec!["none".to_string(), "light".to_string(), "heavy".to_string()]
        );
        assert_eq!(questions[1].options, None);
    }

    #[test]
    fn parses_a_fenced_json_array() {
        let fenced = format!("```json\n{RESPONSE}\n```");
        let questions = parse_questions(&fenced).unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn prose_is_a_parse_error_not_a_panic() {
        let err = parse_questions("I'm sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[test]
    fn empty_response_is_typed() {
        assert_eq!(parse_questions("   "), Err(AiError::EmptyResponse));
    }
}
