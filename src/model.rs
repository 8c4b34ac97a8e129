use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type QuestionId = i64;

/// Selected option per question. One entry per question, upserted.
pub type AnswerMap = BTreeMap<QuestionId, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub correct_answers: BTreeMap<QuestionId, String>,
}

impl ScoreResult {
    pub fn correct_answer(&self, id: QuestionId) -> Option<&str> {
        self.correct_answers.get(&id).map(|s| s.as_str())
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.score * 100 / self.total
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One entry of the submit payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: QuestionId,
    pub selected_option: String,
}

pub fn answer_records(answers: &AnswerMap) -> Vec<AnswerRecord> {
    answers
        .iter()
        .map(|(id, option)| AnswerRecord {
            id: *id,
            selected_option: option.clone(),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Body shape the server uses for confirmations and errors.
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub msg: Option<String>,
}

/// What the results screen shows for a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub id: QuestionId,
    pub prompt: String,
    pub selected: Option<String>,
    pub correct: Option<String>,
}

impl ReviewRow {
    pub fn is_correct(&self) -> bool {
        matches!((&self.selected, &self.correct), (Some(s), Some(c)) if s == c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_reads_wire_field_names() {
        let q: Question = serde_json::from_str(
            r#"{"id": 2, "question": "Which planet is known as the Red Planet?",
                "options": ["Earth", "Mars", "Jupiter", "Saturn"]}"#,
        )
        .unwrap();
        assert_eq!(q.id, 2);
        assert_eq!(q.prompt, "Which planet is known as the Red Planet?");
        assert_eq!(q.options[1], "Mars");
    }

    #[test]
    fn score_result_parses_string_keys_as_ids() {
        let r: ScoreResult = serde_json::from_str(
            r#"{"score": 1, "total": 5, "correct_answers": {"1": "Paris", "3": "Pacific Ocean"}}"#,
        )
        .unwrap();
        assert_eq!(r.correct_answer(1), Some("Paris"));
        assert_eq!(r.correct_answer(3), Some("Pacific Ocean"));
        assert_eq!(r.correct_answer(2), None);
        assert_eq!(r.percent(), 20);
    }

    #[test]
    fn answer_records_transmit_integer_ids() {
        let mut answers = AnswerMap::new();
        answers.insert(4, "Harper Lee".to_string());
        let json = serde_json::to_string(&answer_records(&answers)).unwrap();
        assert_eq!(json, r#"[{"id":4,"selected_option":"Harper Lee"}]"#);
    }
}
