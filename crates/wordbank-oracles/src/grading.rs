//! AI sentence grader.
//!
//! Sends the learner's sentence to the chat model behind the requested
//! alias and parses the reply into strict [`GradingFeedback`]. Parsing
//! happens here, at the boundary: fenced or chatty replies are tolerated,
//! missing fields get neutral defaults, and anything that is not a JSON
//! object (or has an out-of-range score) is a
//! [`OracleError::MalformedResponse`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use wordbank_core::error::OracleError;
use wordbank_core::model::{ErrorKind, PartOfSpeech, ProficiencyLevel};
use wordbank_core::traits::{
    extract_json_object, GradeRequest, GradingFeedback, GradingOracle, SentenceError,
};

use crate::chat::{ChatRequest, ModelRouter};

const MAX_TOKENS: u32 = 2000;

/// Grades practice sentences with a chat model.
pub struct AiGrader {
    router: ModelRouter,
}

impl AiGrader {
    pub fn new(router: ModelRouter) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }
}

#[async_trait]
impl GradingOracle for AiGrader {
    fn name(&self) -> &str {
        "ai-grader"
    }

    #[instrument(skip(self, request), fields(word = %request.word, alias = ?request.model))]
    async fn grade(&self, request: &GradeRequest) -> Result<GradingFeedback, OracleError> {
        if request.word.trim().is_empty() || request.sentence.trim().is_empty() {
            return Err(OracleError::Validation(
                "a word and a sentence are required".into(),
            ));
        }

        let route = self.router.resolve(request.model.as_deref())?;
        let chat_request = ChatRequest::new(
            route.model.clone(),
            grading_prompt(&request.word, request.part_of_speech, &request.sentence),
        )
        .with_max_tokens(MAX_TOKENS);

        let reply = route.chat.complete(&chat_request).await?;
        debug!(model = %reply.model, chars = reply.content.len(), "grading reply received");

        parse_grading_reply(&reply.content).inspect_err(|e| {
            warn!(error = %e, "unusable grading reply");
        })
    }
}

pub fn grading_prompt(word: &str, part_of_speech: PartOfSpeech, sentence: &str) -> String {
    format!(
        r#"You are an experienced English teacher grading a learner's practice sentence.

Target word: {word} ({part_of_speech})
Learner's sentence: "{sentence}"

Give detailed feedback:
1. A score from 0 to 100, weighing grammatical accuracy, natural usage and sentence complexity
2. Grammar mistakes
3. Usage advice
4. An improved version of the whole sentence
5. An encouraging overall comment
6. A proficiency assessment

Reply with JSON only, no markdown:
{{
  "score": 85,
  "isCorrect": true,
  "errors": [
    {{
      "type": "grammar" | "usage" | "word-choice" | "spelling",
      "pattern": "short name of the mistake, e.g. missing article",
      "original": "the wrong text",
      "correction": "the corrected text",
      "explanation": "explanation in Traditional Chinese"
    }}
  ],
  "suggestions": ["suggestion in Traditional Chinese"],
  "improvedVersion": "the improved sentence",
  "overallComment": "encouraging comment in Traditional Chinese",
  "proficiencyAssessment": "beginner" | "intermediate" | "advanced" | "mastered"
}}

Rules:
- If the sentence is fully correct, errors is an empty array and isCorrect is true
- Write every Chinese explanation in Traditional Chinese as used in Taiwan
- Return only the JSON object"#
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedback {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    errors: Option<Vec<RawError>>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
    #[serde(default)]
    improved_version: Option<String>,
    #[serde(default)]
    overall_comment: Option<String>,
    #[serde(default)]
    proficiency_assessment: Option<String>,
}

#[derive(Deserialize)]
struct RawError {
    #[serde(rename = "type", default)]
    kind: Option<ErrorKind>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    original: Option<String>,
    #[serde(default)]
    correction: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse a grading reply. Missing fields default to a score of 0, no errors,
/// empty text and the beginner level.
pub fn parse_grading_reply(reply: &str) -> Result<GradingFeedback, OracleError> {
    let json = extract_json_object(reply)
        .ok_or_else(|| OracleError::MalformedResponse("no JSON object in grading reply".into()))?;

    let raw: RawFeedback = serde_json::from_str(json)
        .map_err(|e| OracleError::MalformedResponse(format!("invalid grading JSON: {e}")))?;

    let score = raw.score.unwrap_or(0.0);
    if !(0.0..=100.0).contains(&score) {
        return Err(OracleError::MalformedResponse(format!(
            "score {score} is outside 0..=100"
        )));
    }

    let errors = raw
        .errors
        .unwrap_or_default()
        .into_iter()
        .map(|e| SentenceError {
            kind: e.kind.unwrap_or(ErrorKind::Other),
            pattern: e.pattern.unwrap_or_default(),
            original: e.original.unwrap_or_default(),
            correction: e.correction.unwrap_or_default(),
            explanation: e.explanation.unwrap_or_default(),
        })
        .collect();

    let proficiency_assessment = match raw.proficiency_assessment.as_deref() {
        Some("intermediate") => ProficiencyLevel::Intermediate,
        Some("advanced") => ProficiencyLevel::Advanced,
        Some("mastered") => ProficiencyLevel::Mastered,
        _ => ProficiencyLevel::Beginner,
    };

    Ok(GradingFeedback {
        score: score.round() as u8,
        is_correct: raw.is_correct.unwrap_or(false),
        errors,
        suggestions: raw.suggestions.unwrap_or_default(),
        improved_version: raw.improved_version.unwrap_or_default(),
        overall_comment: raw.overall_comment.unwrap_or_default(),
        proficiency_assessment,
    })
}
