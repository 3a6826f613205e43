use std::collections::BTreeSet;

use crate::category::{join_segments, parse_segments};
use crate::errors::ClientError;
use crate::models::{QType, Question, QuestionKind, QuestionPayload};
use crate::{log_form_event, log_validation};

const MIN_ROWS: usize = 2;

fn blank_rows() -> Vec<String> {
    vec![String::new(); MIN_ROWS]
}

fn padded(mut rows: Vec<String>) -> Vec<String> {
    while rows.len() < MIN_ROWS {
        rows.push(String::new());
    }
    rows
}

/// Editable state of the admin question form.
///
/// Row indices passed to the setters refer to the rows as currently shown, blank ones included;
/// `build_payload` compacts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionForm {
    editing_id: Option<i64>,
    text: String,
    explain: String,
    segments: Vec<String>,
    qtype: QType,
    choices: Vec<String>,
    single_selection: Option<usize>,
    multi_selection: BTreeSet<usize>,
    text_answers: String,
    multi_text_answers: Vec<String>,
}

impl Default for QuestionForm {
    fn default() -> Self {
        Self {
            editing_id: None,
            text: String::new(),
            explain: String::new(),
            segments: Vec::new(),
            qtype: QType::Single,
            choices: blank_rows(),
            single_selection: None,
            multi_selection: BTreeSet::new(),
            text_answers: String::new(),
            multi_text_answers: blank_rows(),
        }
    }
}

impl QuestionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn status_text(&self) -> String {
        match self.editing_id {
            Some(id) => format!("Editing question {}", id),
            None => "New question".to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn explain(&self) -> &str {
        &self.explain
    }

    pub fn set_explain(&mut self, explain: impl Into<String>) {
        self.explain = explain.into();
    }

    // Category builder

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append one path segment; blank input is ignored
    pub fn push_segment(&mut self, segment: &str) -> bool {
        let segment = segment.trim();
        if segment.is_empty() {
            return false;
        }
        self.segments.push(segment.to_string());
        true
    }

    pub fn clear_segments(&mut self) {
        self.segments.clear();
    }

    pub fn category(&self) -> String {
        join_segments(&self.segments)
    }

    pub fn category_display(&self) -> String {
        if self.segments.is_empty() {
            "(not set, saved as unclassified)".to_string()
        } else {
            self.category()
        }
    }

    // Question type and answer rows

    pub fn qtype(&self) -> QType {
        self.qtype
    }

    /// Switch the answer shape; choice rows (and multi-text slots) start over
    pub fn set_qtype(&mut self, qtype: QType) {
        self.qtype = qtype;
        match qtype {
            QType::Single | QType::Multi => {
                self.choices = blank_rows();
                self.single_selection = None;
                self.multi_selection.clear();
            }
            QType::MultiText => self.multi_text_answers = blank_rows(),
            QType::Text => {}
        }
        log_form_event!("set_qtype", qtype = qtype, "answer rows reset");
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn add_choice_row(&mut self) {
        self.choices.push(String::new());
    }

    pub fn set_choice(&mut self, row: usize, text: impl Into<String>) -> Result<(), ClientError> {
        let slot = self
            .choices
            .get_mut(row)
            .ok_or_else(|| ClientError::validation(format!("No choice row {}", row + 1)))?;
        *slot = text.into();
        Ok(())
    }

    pub fn single_selection(&self) -> Option<usize> {
        self.single_selection
    }

    pub fn select_single(&mut self, row: usize) -> Result<(), ClientError> {
        if row >= self.choices.len() {
            return Err(ClientError::validation(format!("No choice row {}", row + 1)));
        }
        self.single_selection = Some(row);
        Ok(())
    }

    pub fn multi_selection(&self) -> &BTreeSet<usize> {
        &self.multi_selection
    }

    pub fn set_multi_correct(&mut self, row: usize, correct: bool) -> Result<(), ClientError> {
        if row >= self.choices.len() {
            return Err(ClientError::validation(format!("No choice row {}", row + 1)));
        }
        if correct {
            self.multi_selection.insert(row);
        } else {
            self.multi_selection.remove(&row);
        }
        Ok(())
    }

    pub fn text_answers(&self) -> &str {
        &self.text_answers
    }

    /// Acceptable answers for `text` questions, one per line
    pub fn set_text_answers(&mut self, answers: impl Into<String>) {
        self.text_answers = answers.into();
    }

    pub fn multi_text_answers(&self) -> &[String] {
        &self.multi_text_answers
    }

    pub fn add_multi_text_slot(&mut self) {
        self.multi_text_answers.push(String::new());
    }

    pub fn set_multi_text_answer(&mut self, slot: usize, answer: impl Into<String>) -> Result<(), ClientError> {
        let entry = self
            .multi_text_answers
            .get_mut(slot)
            .ok_or_else(|| ClientError::validation(format!("No answer slot {}", slot + 1)))?;
        *entry = answer.into();
        Ok(())
    }

    // Mode switches

    /// Back to an empty new-entry form
    pub fn reset(&mut self) {
        *self = Self::default();
        log_form_event!("reset", "form reset to new-entry mode");
    }

    /// Fill the form from an existing question and switch to edit mode
    pub fn load(&mut self, question: &Question) {
        *self = Self::default();
        self.editing_id = Some(question.id);
        self.text = question.text.clone();
        self.explain = question.explain.clone().unwrap_or_default();
        self.segments = parse_segments(&question.category);
        self.qtype = question.qtype();

        match &question.kind {
            QuestionKind::Single { choices, answer } => {
                self.choices = padded(choices.clone());
                self.single_selection = Some(answer.unwrap_or(0));
            }
            QuestionKind::Multi { choices, answers } => {
                self.choices = padded(choices.clone());
                self.multi_selection = answers.iter().copied().collect();
            }
            QuestionKind::Text { answers } => {
                self.text_answers = answers.join("\n");
            }
            QuestionKind::MultiText { answers } => {
                self.multi_text_answers = padded(answers.clone());
            }
        }
        log_form_event!("load", qtype = self.qtype, "question loaded for editing");
    }

    // Validation

    /// Validate the form and assemble the request body; nothing is sent on error
    pub fn build_payload(&self) -> Result<QuestionPayload, ClientError> {
        let result = self.try_build_payload();
        match &result {
            Ok(_) => {
                log_validation!(success, "question_form", "payload assembled");
            }
            Err(e) => {
                log_validation!(failure, "question_form", error = e);
            }
        }
        result
    }

    fn try_build_payload(&self) -> Result<QuestionPayload, ClientError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ClientError::validation("Enter the question text"));
        }

        let kind = match self.qtype {
            QType::Single | QType::Multi => self.build_choice_kind()?,
            QType::Text => {
                let answers: Vec<String> = self
                    .text_answers
                    .lines()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect();
                if answers.is_empty() {
                    return Err(ClientError::validation("Enter at least one accepted answer"));
                }
                QuestionKind::Text { answers }
            }
            QType::MultiText => {
                let answers: Vec<String> = self
                    .multi_text_answers
                    .iter()
                    .map(|a| a.trim())
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect();
                if answers.len() < 2 {
                    return Err(ClientError::validation(
                        "A multi-answer text question needs at least two answers",
                    ));
                }
                QuestionKind::MultiText { answers }
            }
        };

        Ok(QuestionPayload {
            text: text.to_string(),
            explain: self.explain.trim().to_string(),
            category: self.category(),
            kind,
        })
    }

    fn build_choice_kind(&self) -> Result<QuestionKind, ClientError> {
        // (row index, trimmed text) for every non-blank row
        let filled: Vec<(usize, String)> = self
            .choices
            .iter()
            .enumerate()
            .map(|(row, c)| (row, c.trim().to_string()))
            .filter(|(_, c)| !c.is_empty())
            .collect();

        if filled.len() < 2 {
            return Err(ClientError::validation("At least two non-empty choices are required"));
        }

        let compacted = |row: usize| filled.iter().position(|(r, _)| *r == row);
        let choices: Vec<String> = filled.iter().map(|(_, c)| c.clone()).collect();

        if self.qtype == QType::Single {
            let answer = match self.single_selection {
                None => 0,
                Some(row) => compacted(row).ok_or_else(|| {
                    ClientError::validation("The choice marked as correct is empty")
                })?,
            };
            Ok(QuestionKind::Single {
                choices,
                answer: Some(answer),
            })
        } else {
            let answers: Vec<usize> = self
                .multi_selection
                .iter()
                .filter_map(|&row| compacted(row))
                .collect();
            if answers.is_empty() {
                return Err(ClientError::validation("Mark at least one choice as correct"));
            }
            Ok(QuestionKind::Multi { choices, answers })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_form(rows: &[&str]) -> QuestionForm {
        let mut form = QuestionForm::new();
        form.set_text("Pick one");
        for _ in MIN_ROWS..rows.len() {
            form.add_choice_row();
        }
        for (i, row) in rows.iter().enumerate() {
            form.set_choice(i, *row).unwrap();
        }
        form
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let mut form = single_form(&["a", "b"]);
        form.set_text("   ");
        assert!(matches!(form.build_payload(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_single_defaults_to_first_filled_choice() {
        let form = single_form(&["", "a", "b"]);
        let payload = form.build_payload().unwrap();
        assert_eq!(
            payload.kind,
            QuestionKind::Single {
                choices: vec!["a".into(), "b".into()],
                answer: Some(0)
            }
        );
        assert_eq!(payload.category, "");
    }

    #[test]
    fn test_single_selection_is_remapped() {
        let mut form = single_form(&["a", " ", "c"]);
        form.select_single(2).unwrap();
        let payload = form.build_payload().unwrap();
        assert_eq!(
            payload.kind,
            QuestionKind::Single {
                choices: vec!["a".into(), "c".into()],
                answer: Some(1)
            }
        );
    }

    #[test]
    fn test_single_selection_on_blank_row_is_an_error() {
        let mut form = single_form(&["a", "", "c"]);
        form.select_single(1).unwrap();
        assert!(form.build_payload().is_err());
    }

    #[test]
    fn test_too_few_choices() {
        let form = single_form(&["a", "  "]);
        assert!(form.build_payload().is_err());
    }

    #[test]
    fn test_multi_selection_remap_and_empty_check() {
        let mut form = single_form(&["a", "", "c", "d"]);
        form.set_qtype(QType::Multi);
        for _ in 0..2 {
            form.add_choice_row();
        }
        for (i, row) in ["a", "", "c", "d"].iter().enumerate() {
            form.set_choice(i, *row).unwrap();
        }
        assert!(form.build_payload().is_err());

        form.set_multi_correct(1, true).unwrap();
        assert!(form.build_payload().is_err());

        form.set_multi_correct(3, true).unwrap();
        form.set_multi_correct(0, true).unwrap();
        let payload = form.build_payload().unwrap();
        assert_eq!(
            payload.kind,
            QuestionKind::Multi {
                choices: vec!["a".into(), "c".into(), "d".into()],
                answers: vec![0, 2]
            }
        );
    }

    #[test]
    fn test_text_answers_split_by_line() {
        let mut form = QuestionForm::new();
        form.set_text("Capital of France?");
        form.set_qtype(QType::Text);
        form.set_text_answers("\n  \n");
        assert!(form.build_payload().is_err());

        form.set_text_answers("Paris\r\n  paris  \n\n");
        let payload = form.build_payload().unwrap();
        assert_eq!(
            payload.kind,
            QuestionKind::Text {
                answers: vec!["Paris".into(), "paris".into()]
            }
        );
    }

    #[test]
    fn test_multi_text_needs_two_answers() {
        let mut form = QuestionForm::new();
        form.set_text("Name two halogens");
        form.set_qtype(QType::MultiText);
        form.set_multi_text_answer(0, "F").unwrap();
        assert!(form.build_payload().is_err());

        form.add_multi_text_slot();
        form.set_multi_text_answer(2, " Cl ").unwrap();
        let payload = form.build_payload().unwrap();
        assert_eq!(
            payload.kind,
            QuestionKind::MultiText {
                answers: vec!["F".into(), "Cl".into()]
            }
        );
    }

    #[test]
    fn test_category_builder() {
        let mut form = single_form(&["a", "b"]);
        assert!(!form.push_segment("   "));
        assert!(form.push_segment(" Physics "));
        assert!(form.push_segment("Midterm"));
        assert_eq!(form.category(), "Physics > Midterm");
        assert_eq!(form.build_payload().unwrap().category, "Physics > Midterm");

        form.clear_segments();
        assert_eq!(form.category(), "");
        assert_eq!(form.category_display(), "(not set, saved as unclassified)");
    }

    #[test]
    fn test_load_and_reset() {
        let question = Question {
            id: 9,
            text: "Pick".into(),
            explain: Some("Because".into()),
            category: "A > B".into(),
            owner: None,
            kind: QuestionKind::Multi {
                choices: vec!["x".into(), "y".into(), "z".into()],
                answers: vec![2],
            },
        };
        let mut form = QuestionForm::new();
        form.load(&question);
        assert_eq!(form.editing_id(), Some(9));
        assert_eq!(form.segments(), &["A".to_string(), "B".to_string()]);
        assert_eq!(form.qtype(), QType::Multi);
        assert_eq!(form.status_text(), "Editing question 9");

        let payload = form.build_payload().unwrap();
        assert_eq!(payload.kind, question.kind);
        assert_eq!(payload.explain, "Because");

        form.reset();
        assert_eq!(form, QuestionForm::new());
        assert!(!form.is_editing());
    }

    #[test]
    fn test_set_qtype_resets_choice_rows() {
        let mut form = single_form(&["a", "b", "c"]);
        form.select_single(2).unwrap();
        form.set_qtype(QType::Multi);
        assert_eq!(form.choices(), &[String::new(), String::new()]);
        assert_eq!(form.single_selection(), None);
        assert!(form.select_single(2).is_err());
    }
}
