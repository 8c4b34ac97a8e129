use std::collections::BTreeSet;
use std::sync::mpsc;

use chrono::{DateTime, Utc};

use crate::error::TransportError;
use crate::model::{answer_records, Credentials, QuestionId, ReviewRow, ScoreResult};
use crate::navigator::{AttemptId, ExamAttempt, TickOutcome};
use crate::persist::{token_fingerprint, TokenStore};
use crate::timer::{Countdown, TimerEvent};
use crate::transport::{Operation, Reply, Request, Response, Ticket, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: Option<String>,
}

/// Top-level state. The countdown lives inside `InProgress`, so any
/// transition out of it releases the tick thread.
#[derive(Debug)]
pub enum Phase {
    Unauthenticated,
    Idle,
    InProgress {
        attempt: ExamAttempt,
        countdown: Countdown,
    },
    Complete {
        result: ScoreResult,
        review: Vec<ReviewRow>,
        submitted_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Unauthenticated,
    Idle,
    InProgress,
    Complete,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Unauthenticated => PhaseKind::Unauthenticated,
            Phase::Idle => PhaseKind::Idle,
            Phase::InProgress { .. } => PhaseKind::InProgress,
            Phase::Complete { .. } => PhaseKind::Complete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmitTrigger {
    Manual,
    Timeout,
}

/// Owns the exam session and drives every state transition. Runs on a
/// single control thread; replies and ticks are fed in as events.
pub struct Controller {
    transport: Box<dyn Transport>,
    store: Box<dyn TokenStore>,
    ticks: Option<mpsc::Sender<TimerEvent>>,
    session: Option<Session>,
    phase: Phase,
    notice: Option<Notice>,
    pending: BTreeSet<Operation>,
    pending_username: Option<String>,
    epoch: u64,
    next_attempt: AttemptId,
    time_warning: bool,
}

impl Controller {
    /// Builds the controller and rehydrates the session from `store`.
    /// `ticks` receives countdown ticks; pass `None` to feed them by hand.
    pub fn new(
        transport: impl Transport + 'static,
        store: impl TokenStore + 'static,
        ticks: Option<mpsc::Sender<TimerEvent>>,
    ) -> Self {
        let session = match store.load() {
            Ok(Some(token)) => {
                tracing::info!(token = %token_fingerprint(&token), "restored stored session");
                Some(Session {
                    token,
                    username: None,
                })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read stored token");
                None
            }
        };
        let phase = if session.is_some() {
            Phase::Idle
        } else {
            Phase::Unauthenticated
        };

        Self {
            transport: Box::new(transport),
            store: Box::new(store),
            ticks,
            session,
            phase,
            notice: None,
            pending: BTreeSet::new(),
            pending_username: None,
            epoch: 0,
            next_attempt: 1,
            time_warning: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.username.as_deref())
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, op: Operation) -> bool {
        self.pending.contains(&op)
    }

    pub fn pending(&self) -> impl Iterator<Item = Operation> + '_ {
        self.pending.iter().copied()
    }

    pub fn attempt(&self) -> Option<&ExamAttempt> {
        match &self.phase {
            Phase::InProgress { attempt, .. } => Some(attempt),
            _ => None,
        }
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        match &self.phase {
            Phase::InProgress { countdown, .. } => Some(countdown),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        match &self.phase {
            Phase::Complete { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn review(&self) -> &[ReviewRow] {
        match &self.phase {
            Phase::Complete { review, .. } => review,
            _ => &[],
        }
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        match &self.phase {
            Phase::Complete { submitted_at, .. } => Some(*submitted_at),
            _ => None,
        }
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    /// Returns true once after the countdown crosses the warning threshold.
    pub fn take_time_warning(&mut self) -> bool {
        std::mem::take(&mut self.time_warning)
    }

    fn attempt_mut(&mut self) -> Option<&mut ExamAttempt> {
        match &mut self.phase {
            Phase::InProgress { attempt, .. } => Some(attempt),
            _ => None,
        }
    }

    fn begin(&mut self, op: Operation) -> Option<Ticket> {
        if self.pending.contains(&op) {
            tracing::debug!(?op, "already pending");
            return None;
        }
        self.notice = None;
        self.pending.insert(op);
        Some(Ticket {
            epoch: self.epoch,
            attempt: None,
            op,
        })
    }

    pub fn register(&mut self, username: &str, password: &str) {
        if self.kind() != PhaseKind::Unauthenticated {
            return;
        }
        let Some(ticket) = self.begin(Operation::Register) else {
            return;
        };
        tracing::info!(username, "registering");
        self.transport.dispatch(
            ticket,
            Request::Register(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
        );
    }

    pub fn login(&mut self, username: &str, password: &str) {
        if self.kind() != PhaseKind::Unauthenticated {
            return;
        }
        let Some(ticket) = self.begin(Operation::Login) else {
            return;
        };
        tracing::info!(username, "logging in");
        self.pending_username = Some(username.to_string());
        self.transport.dispatch(
            ticket,
            Request::Login(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
        );
    }

    /// Fetches the question set; the attempt only begins once it arrives.
    pub fn start_exam(&mut self) {
        if self.kind() != PhaseKind::Idle {
            return;
        }
        let Some(token) = self.session.as_ref().map(|s| s.token.clone()) else {
            return;
        };
        let Some(ticket) = self.begin(Operation::FetchQuestions) else {
            return;
        };
        tracing::info!("fetching questions");
        self.transport
            .dispatch(ticket, Request::FetchQuestions { token });
    }

    pub fn select_option(&mut self, id: QuestionId, option: &str) -> bool {
        self.attempt_mut()
            .map(|a| a.select_option(id, option))
            .unwrap_or(false)
    }

    pub fn select_current(&mut self, idx: usize) -> bool {
        self.attempt_mut()
            .map(|a| a.select_current(idx))
            .unwrap_or(false)
    }

    pub fn next(&mut self) {
        if let Some(a) = self.attempt_mut() {
            a.next();
        }
    }

    pub fn previous(&mut self) {
        if let Some(a) = self.attempt_mut() {
            a.previous();
        }
    }

    pub fn go_to(&mut self, idx: usize) {
        if let Some(a) = self.attempt_mut() {
            a.go_to(idx);
        }
    }

    pub fn first(&mut self) {
        if let Some(a) = self.attempt_mut() {
            a.first();
        }
    }

    pub fn last(&mut self) {
        if let Some(a) = self.attempt_mut() {
            a.last();
        }
    }

    /// Manual submission, allowed from the final question only. Returns
    /// whether a request was sent.
    pub fn submit(&mut self) -> bool {
        match self.attempt() {
            Some(a) if a.is_last() => {}
            Some(_) => {
                self.notice = Some(Notice::error("Go to the last question to submit"));
                return false;
            }
            None => return false,
        }
        self.submit_attempt(SubmitTrigger::Manual)
    }

    fn submit_attempt(&mut self, trigger: SubmitTrigger) -> bool {
        let epoch = self.epoch;
        let Some(token) = self.session.as_ref().map(|s| s.token.clone()) else {
            return false;
        };
        let Some(attempt) = self.attempt_mut() else {
            return false;
        };
        // Claimed synchronously so a tick and a key press in the same turn
        // cannot both send.
        if !attempt.begin_submission() {
            tracing::debug!(?trigger, "submission already in flight");
            return false;
        }
        let id = attempt.id;
        let answers = answer_records(attempt.answers());
        tracing::info!(
            ?trigger,
            attempt = id,
            answered = answers.len(),
            "submitting answers"
        );

        self.notice = None;
        self.pending.insert(Operation::Submit);
        self.transport.dispatch(
            Ticket {
                epoch,
                attempt: Some(id),
                op: Operation::Submit,
            },
            Request::Submit { token, answers },
        );
        true
    }

    pub fn handle_timer(&mut self, event: TimerEvent) {
        let TimerEvent::Tick(id) = event;
        let outcome = match &mut self.phase {
            Phase::InProgress { attempt, countdown } if attempt.id == id => {
                let outcome = attempt.tick();
                if outcome == TickOutcome::Expired {
                    countdown.stop();
                }
                outcome
            }
            _ => TickOutcome::Ignored,
        };

        match outcome {
            TickOutcome::Ignored | TickOutcome::Running(_) => {}
            TickOutcome::Warning(secs) => {
                tracing::info!(remaining = secs, "time is running out");
                self.time_warning = true;
            }
            TickOutcome::Expired => {
                tracing::info!(attempt = id, "time expired");
                self.submit_attempt(SubmitTrigger::Timeout);
            }
        }
    }

    pub fn handle_reply(&mut self, reply: Reply) {
        let Reply { ticket, outcome } = reply;
        if ticket.epoch != self.epoch {
            tracing::debug!(op = ?ticket.op, "dropping reply from a previous session");
            return;
        }
        self.pending.remove(&ticket.op);

        match ticket.op {
            Operation::Register => self.on_registered(outcome),
            Operation::Login => self.on_logged_in(outcome),
            Operation::FetchQuestions => self.on_questions(outcome),
            Operation::Submit => self.on_scored(ticket.attempt, outcome),
        }
    }

    fn on_registered(&mut self, outcome: Result<Response, TransportError>) {
        if self.kind() != PhaseKind::Unauthenticated {
            return;
        }
        match outcome {
            Ok(Response::Registered(msg)) => {
                tracing::info!("registration accepted");
                self.notice = Some(Notice::info(msg));
            }
            Ok(other) => self.unexpected(Operation::Register, other),
            Err(e) => self.notice = Some(Notice::error(e.to_string())),
        }
    }

    fn on_logged_in(&mut self, outcome: Result<Response, TransportError>) {
        let username = self.pending_username.take();
        if self.kind() != PhaseKind::Unauthenticated {
            return;
        }
        match outcome {
            Ok(Response::LoggedIn(token)) => {
                tracing::info!(
                    username = username.as_deref().unwrap_or(""),
                    token = %token_fingerprint(&token),
                    "logged in"
                );
                if let Err(e) = self.store.save(&token) {
                    tracing::warn!(error = %e, "token not persisted");
                }
                self.session = Some(Session { token, username });
                self.phase = Phase::Idle;
            }
            Ok(other) => self.unexpected(Operation::Login, other),
            Err(e) => self.notice = Some(Notice::error(e.to_string())),
        }
    }

    fn on_questions(&mut self, outcome: Result<Response, TransportError>) {
        if self.kind() != PhaseKind::Idle {
            return;
        }
        match outcome {
            Ok(Response::Questions(questions)) => {
                let id = self.next_attempt;
                let count = questions.len();
                let Some(attempt) = ExamAttempt::new(id, questions) else {
                    self.notice = Some(Notice::error("No questions available"));
                    return;
                };
                self.next_attempt += 1;
                self.time_warning = false;
                tracing::info!(attempt = id, questions = count, "exam started");
                self.phase = Phase::InProgress {
                    attempt,
                    countdown: Countdown::start(id, self.ticks.clone()),
                };
            }
            Ok(other) => self.unexpected(Operation::FetchQuestions, other),
            Err(e) => self.notice = Some(Notice::error(e.to_string())),
        }
    }

    fn on_scored(&mut self, attempt_id: Option<AttemptId>, outcome: Result<Response, TransportError>) {
        let Some(attempt) = self.attempt_mut() else {
            return;
        };
        if Some(attempt.id) != attempt_id {
            return;
        }
        match outcome {
            Ok(Response::Scored(result)) => {
                let review = attempt
                    .questions()
                    .iter()
                    .map(|q| ReviewRow {
                        id: q.id,
                        prompt: q.prompt.clone(),
                        selected: attempt.selected_for(q.id).map(str::to_string),
                        correct: result.correct_answer(q.id).map(str::to_string),
                    })
                    .collect();
                tracing::info!(score = result.score, total = result.total, "exam scored");
                self.phase = Phase::Complete {
                    result,
                    review,
                    submitted_at: Utc::now(),
                };
            }
            Ok(other) => {
                attempt.release_submission();
                self.unexpected(Operation::Submit, other);
            }
            Err(e) => {
                attempt.release_submission();
                self.notice = Some(Notice::error(e.to_string()));
            }
        }
    }

    fn unexpected(&mut self, op: Operation, response: Response) {
        tracing::warn!(?op, ?response, "reply does not match request");
        self.notice = Some(Notice::error(
            TransportError::Malformed(format!("unexpected reply to {:?}", op)).to_string(),
        ));
    }

    /// Leaves the results screen for a fresh attempt.
    pub fn back_to_start(&mut self) {
        if self.kind() == PhaseKind::Complete {
            self.phase = Phase::Idle;
            self.notice = None;
        }
    }

    /// Forgets everything, from any phase. Replies still in flight are
    /// dropped when they arrive.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "cannot clear stored token");
        }
        if self.session.is_some() {
            tracing::info!("logged out");
        }
        self.epoch += 1;
        self.session = None;
        self.phase = Phase::Unauthenticated;
        self.notice = None;
        self.pending.clear();
        self.pending_username = None;
        self.time_warning = false;
    }
}
