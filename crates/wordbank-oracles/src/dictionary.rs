//! Free Dictionary API lookup (`dictionaryapi.dev`).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use wordbank_core::error::OracleError;
use wordbank_core::model::PartOfSpeech;
use wordbank_core::traits::{DictionaryEntry, LookupOracle};

use crate::chat::{build_http_client, map_send_error};

pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev";
const TIMEOUT_SECS: u64 = 15;
const MAX_EXAMPLES: usize = 3;

pub struct FreeDictionaryClient {
    base_url: String,
    client: reqwest::Client,
}

impl FreeDictionaryClient {
    pub fn new(base_url: Option<String>) -> Result<Self, OracleError> {
        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_DICTIONARY_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: build_http_client(TIMEOUT_SECS)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    example: Option<String>,
}

/// Dictionary label for a part of speech; `None` where the dictionary has
/// no matching category.
fn dictionary_label(part_of_speech: PartOfSpeech) -> Option<&'static str> {
    match part_of_speech {
        PartOfSpeech::Verb | PartOfSpeech::PhrasalVerb => Some("verb"),
        PartOfSpeech::Noun => Some("noun"),
        PartOfSpeech::Adjective => Some("adjective"),
        PartOfSpeech::Adverb => Some("adverb"),
        PartOfSpeech::Phrase | PartOfSpeech::Other => None,
    }
}

#[async_trait]
impl LookupOracle for FreeDictionaryClient {
    #[instrument(skip(self))]
    async fn lookup(
        &self,
        word: &str,
        part_of_speech: PartOfSpeech,
    ) -> Result<DictionaryEntry, OracleError> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Err(OracleError::Validation("please enter a word first".into()));
        }
        if word.contains(char::is_whitespace) {
            return Err(OracleError::UnsupportedInput(format!(
                "'{word}' is a phrase; the dictionary only has single words"
            )));
        }

        let response = self
            .client
            .get(format!("{}/api/v2/entries/en/{}", self.base_url, word))
            .send()
            .await
            .map_err(|e| map_send_error(e, TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(OracleError::NotFound(word));
        }
        if status == 429 {
            return Err(OracleError::RateLimited {
                retry_after_ms: 5000,
            });
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::ApiError { status, message });
        }

        let entries: Vec<ApiEntry> = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(format!("dictionary response: {e}")))?;

        let entry = select_entry(&entries, part_of_speech).ok_or(OracleError::NotFound(word))?;
        debug!(definition = %entry.definition, "dictionary hit");
        Ok(entry)
    }
}

/// Pick the first meaning matching the part of speech (or the first meaning
/// at all) and collect pronunciation data across every returned entry.
fn select_entry(entries: &[ApiEntry], part_of_speech: PartOfSpeech) -> Option<DictionaryEntry> {
    let meanings: Vec<&ApiMeaning> = entries
        .iter()
        .flat_map(|e| e.meanings.iter())
        .filter(|m| !m.definitions.is_empty())
        .collect();

    let meaning = dictionary_label(part_of_speech)
        .and_then(|label| {
            meanings
                .iter()
                .find(|m| m.part_of_speech.eq_ignore_ascii_case(label))
        })
        .or_else(|| meanings.first())?;

    let phonetics: Vec<&ApiPhonetic> = entries.iter().flat_map(|e| e.phonetics.iter()).collect();

    let phonetic = entries
        .iter()
        .filter_map(|e| e.phonetic.as_deref())
        .chain(phonetics.iter().filter_map(|p| p.text.as_deref()))
        .find(|t| !t.trim().is_empty())
        .unwrap_or_default()
        .to_string();

    let audio = |marker: &str| {
        phonetics
            .iter()
            .filter_map(|p| p.audio.as_deref())
            .find(|url| url.contains(marker))
            .unwrap_or_default()
            .to_string()
    };

    Some(DictionaryEntry {
        phonetic,
        definition: meaning.definitions[0].definition.clone(),
        examples: meaning
            .definitions
            .iter()
            .filter_map(|d| d.example.clone())
            .filter(|e| !e.trim().is_empty())
            .take(MAX_EXAMPLES)
            .collect(),
        audio_url_uk: audio("-uk"),
        audio_url_us: audio("-us"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn implement_body() -> serde_json::Value {
        serde_json::json!([{
            "word": "implement",
            "phonetics": [
                {"text": "/ˈɪmplɪmənt/", "audio": ""},
                {"text": "/ˈɪmplɪˌmɛnt/", "audio": "https://api.dictionaryapi.dev/media/pronunciations/en/implement-uk.mp3"},
                {"audio": "https://api.dictionaryapi.dev/media/pronunciations/en/implement-us.mp3"}
            ],
            "meanings": [
                {
                    "partOfSpeech": "noun",
                    "definitions": [{"definition": "A tool or instrument.", "example": "farm implements"}]
                },
                {
                    "partOfSpeech": "verb",
                    "definitions": [
                        {"definition": "To bring about; to put into practice.", "example": "We implemented the new policy."},
                        {"definition": "To fulfil."}
                    ]
                }
            ]
        }])
    }

    async fn server_with(word: &str, status: u16, body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v2/entries/en/{word}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn picks_the_requested_part_of_speech() {
        let server = server_with("implement", 200, implement_body()).await;
        let client = FreeDictionaryClient::new(Some(server.uri())).unwrap();

        let entry = client.lookup(" Implement ", PartOfSpeech::Verb).await.unwrap();
        assert_eq!(entry.definition, "To bring about; to put into practice.");
        assert_eq!(entry.examples, vec!["We implemented the new policy."]);
        assert_eq!(entry.phonetic, "/ˈɪmplɪmənt/");
        assert!(entry.audio_url_uk.ends_with("implement-uk.mp3"));
        assert!(entry.audio_url_us.ends_with("implement-us.mp3"));
    }

    #[tokio::test]
    async fn falls_back_to_first_meaning() {
        let server = server_with("implement", 200, implement_body()).await;
        let client = FreeDictionaryClient::new(Some(server.uri())).unwrap();

        let entry = client.lookup("implement", PartOfSpeech::Adverb).await.unwrap();
        assert_eq!(entry.definition, "A tool or instrument.");

        let entry = client.lookup("implement", PartOfSpeech::Phrase).await.unwrap();
        assert_eq!(entry.definition, "A tool or instrument.");
    }

    #[tokio::test]
    async fn missing_word_is_not_found() {
        let server = server_with(
            "qwertyx",
            404,
            serde_json::json!({"title": "No Definitions Found"}),
        )
        .await;
        let client = FreeDictionaryClient::new(Some(server.uri())).unwrap();
        assert!(matches!(
            client.lookup("qwertyx", PartOfSpeech::Noun).await,
            Err(OracleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_meanings_are_not_found() {
        let body = serde_json::json!([{"word": "ghost", "meanings": []}]);
        let server = server_with("ghost", 200, body).await;
        let client = FreeDictionaryClient::new(Some(server.uri())).unwrap();
        assert!(matches!(
            client.lookup("ghost", PartOfSpeech::Noun).await,
            Err(OracleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn phrases_and_blanks_are_rejected_without_io() {
        let client = FreeDictionaryClient::new(Some("http://127.0.0.1:9".into())).unwrap();
        assert!(matches!(
            client.lookup("take off", PartOfSpeech::PhrasalVerb).await,
            Err(OracleError::UnsupportedInput(_))
        ));
        assert!(matches!(
            client.lookup("   ", PartOfSpeech::Verb).await,
            Err(OracleError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = server_with("implement", 500, serde_json::json!({"message": "boom"})).await;
        let client = FreeDictionaryClient::new(Some(server.uri())).unwrap();
        assert!(matches!(
            client.lookup("implement", PartOfSpeech::Verb).await,
            Err(OracleError::ApiError { status: 500, .. })
        ));
    }
}
