use crate::model::{AnswerMap, Question, QuestionId};

/// Fixed length of an attempt.
pub const EXAM_DURATION_SECS: u32 = 1800;

pub type AttemptId = u64;

/// One run of the exam. The question set is fixed for its lifetime and is
/// never empty, so `current_index` always points at a question.
#[derive(Debug, Clone)]
pub struct ExamAttempt {
    pub id: AttemptId,
    questions: Vec<Question>,
    answers: AnswerMap,
    current_index: usize,
    remaining_seconds: u32,
    ticking: bool,
    submitting: bool,
    warned: bool,
}

/// Result of feeding one second into the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Running(u32),
    Warning(u32),
    Expired,
}

pub const WARNING_THRESHOLD_SECS: u32 = 120;

impl ExamAttempt {
    /// Returns `None` for an empty question set.
    pub fn new(id: AttemptId, questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            id,
            questions,
            answers: AnswerMap::new(),
            current_index: 0,
            remaining_seconds: EXAM_DURATION_SECS,
            ticking: true,
            submitting: false,
            warned: false,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index == self.last_index()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.questions.iter().any(|q| q.id == id)
    }

    /// Upserts an answer. Ids outside the question set are ignored and
    /// reported as `false`.
    pub fn select_option(&mut self, id: QuestionId, option: impl Into<String>) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.answers.insert(id, option.into());
        true
    }

    /// Selects the option at `idx` of the current question.
    pub fn select_current(&mut self, idx: usize) -> bool {
        let q = self.current_question();
        let Some(option) = q.options.get(idx).cloned() else {
            return false;
        };
        let id = q.id;
        self.select_option(id, option)
    }

    pub fn selected_for(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(|s| s.as_str())
    }

    pub fn is_selected(&self, id: QuestionId, option: &str) -> bool {
        self.selected_for(id) == Some(option)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions.len() - self.answers.len()
    }

    pub fn next(&mut self) {
        self.current_index = (self.current_index + 1).min(self.last_index());
    }

    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    pub fn go_to(&mut self, idx: usize) {
        self.current_index = idx.min(self.last_index());
    }

    pub fn first(&mut self) {
        self.current_index = 0;
    }

    pub fn last(&mut self) {
        self.current_index = self.last_index();
    }

    /// Advances the countdown by one second. At a pre-decrement value of 1
    /// or less the countdown settles at 0 and stops; the caller submits.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.ticking {
            return TickOutcome::Ignored;
        }
        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.ticking = false;
            return TickOutcome::Expired;
        }
        self.remaining_seconds -= 1;
        if !self.warned && self.remaining_seconds <= WARNING_THRESHOLD_SECS {
            self.warned = true;
            return TickOutcome::Warning(self.remaining_seconds);
        }
        TickOutcome::Running(self.remaining_seconds)
    }

    /// Claims the attempt for submission. Only the first claim succeeds
    /// until `release_submission` is called.
    pub fn begin_submission(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    pub fn release_submission(&mut self) {
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn questions(n: usize) -> Vec<Question> {
        (1..=n as i64)
            .map(|id| Question {
                id,
                prompt: format!("Question {}", id),
                options: vec!["A".into(), "B".into(), "C".into()],
            })
            .collect()
    }

    #[test]
    fn empty_question_set_is_rejected() {
        assert!(ExamAttempt::new(1, Vec::new()).is_none());
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut a = ExamAttempt::new(1, questions(3)).unwrap();
        a.previous();
        assert_eq!(a.current_index(), 0);
        a.next();
        a.next();
        a.next();
        assert_eq!(a.current_index(), 2);
        assert!(a.is_last());
        a.go_to(99);
        assert_eq!(a.current_index(), 2);
        a.first();
        assert!(a.is_first());
    }

    #[test]
    fn answers_survive_navigation() {
        let mut a = ExamAttempt::new(1, questions(2)).unwrap();
        assert!(a.select_current(0));
        a.next();
        a.select_option(2, "C");
        a.previous();
        assert_eq!(a.selected_for(a.current_question().id), Some("A"));
        a.next();
        assert!(a.is_selected(2, "C"));
    }

    #[test]
    fn reselecting_overwrites() {
        let mut a = ExamAttempt::new(1, questions(1)).unwrap();
        a.select_option(1, "A");
        a.select_option(1, "B");
        assert_eq!(a.answered_count(), 1);
        assert_eq!(a.selected_for(1), Some("B"));
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let mut a = ExamAttempt::new(1, questions(2)).unwrap();
        assert!(!a.select_option(42, "A"));
        assert!(a.answers().is_empty());
    }

    #[test]
    fn any_string_is_accepted_for_a_known_question() {
        let mut a = ExamAttempt::new(1, questions(1)).unwrap();
        assert!(a.select_option(1, "not one of the options"));
    }

    #[test]
    fn countdown_expires_once() {
        let mut a = ExamAttempt::new(1, questions(1)).unwrap();
        let mut expired = 0;
        let mut warnings = 0;
        for _ in 0..EXAM_DURATION_SECS + 5 {
            match a.tick() {
                TickOutcome::Expired => expired += 1,
                TickOutcome::Warning(_) => warnings += 1,
                _ => {}
            }
        }
        assert_eq!(expired, 1);
        assert_eq!(warnings, 1);
        assert_eq!(a.remaining_seconds(), 0);
        assert!(!a.is_ticking());
    }

    #[test]
    fn submission_claim_is_exclusive() {
        let mut a = ExamAttempt::new(1, questions(1)).unwrap();
        assert!(a.begin_submission());
        assert!(!a.begin_submission());
        a.release_submission();
        assert!(a.begin_submission());
    }

    proptest! {
        #[test]
        fn index_stays_in_bounds(n in 1usize..20, moves in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut a = ExamAttempt::new(1, questions(n)).unwrap();
            for forward in moves {
                if forward { a.next() } else { a.previous() }
                prop_assert!(a.current_index() < n);
            }
        }

        #[test]
        fn remaining_never_increases(ticks in 0usize..2000) {
            let mut a = ExamAttempt::new(1, questions(1)).unwrap();
            let mut last = a.remaining_seconds();
            for _ in 0..ticks {
                a.tick();
                prop_assert!(a.remaining_seconds() <= last);
                last = a.remaining_seconds();
            }
        }
    }
}
