use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;

use crate::error::TransportError;
use crate::model::{AnswerRecord, Credentials, MessageBody, Question, ScoreResult, TokenResponse};
use crate::navigator::AttemptId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Register,
    Login,
    FetchQuestions,
    Submit,
}

impl Operation {
    fn fallback_error(self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::Login => "Login failed",
            Operation::FetchQuestions => "Failed to fetch questions",
            Operation::Submit => "Failed to submit answers",
        }
    }

    fn is_authorized(self) -> bool {
        matches!(self, Operation::FetchQuestions | Operation::Submit)
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Register => "Registering",
            Operation::Login => "Logging in",
            Operation::FetchQuestions => "Loading questions",
            Operation::Submit => "Submitting",
        }
    }
}

/// Identifies who a reply belongs to, so replies that outlive the state
/// that asked for them can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: u64,
    pub attempt: Option<AttemptId>,
    pub op: Operation,
}

#[derive(Debug, Clone)]
pub enum Request {
    Register(Credentials),
    Login(Credentials),
    FetchQuestions { token: String },
    Submit {
        token: String,
        answers: Vec<AnswerRecord>,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Register(_) => Operation::Register,
            Request::Login(_) => Operation::Login,
            Request::FetchQuestions { .. } => Operation::FetchQuestions,
            Request::Submit { .. } => Operation::Submit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Registered(String),
    LoggedIn(String),
    Questions(Vec<Question>),
    Scored(ScoreResult),
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub ticket: Ticket,
    pub outcome: Result<Response, TransportError>,
}

/// Issues a request and returns immediately; the reply arrives later as an
/// event on the control thread.
pub trait Transport {
    fn dispatch(&mut self, ticket: Ticket, request: Request);
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    tx: mpsc::Sender<Reply>,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tx: mpsc::Sender<Reply>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("termexam/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tx,
        })
    }
}

impl Transport for HttpTransport {
    fn dispatch(&mut self, ticket: Ticket, request: Request) {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            let outcome = execute(&client, &base_url, request);
            if let Err(ref e) = outcome {
                tracing::warn!(op = ?ticket.op, error = %e, "request failed");
            }
            // The receiver is gone only when the client is shutting down.
            let _ = tx.send(Reply { ticket, outcome });
        });
    }
}

/// Keeps every dispatched request instead of sending it. Clones share the
/// same log, so a handle can be kept after the transport is moved.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Rc<RefCell<Vec<(Ticket, Request)>>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(Ticket, Request)> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<(Ticket, Request)> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn last(&self) -> Option<(Ticket, Request)> {
        self.sent.borrow().last().cloned()
    }

    pub fn count(&self, op: Operation) -> usize {
        self.sent
            .borrow()
            .iter()
            .filter(|(ticket, _)| ticket.op == op)
            .count()
    }
}

impl Transport for RecordingTransport {
    fn dispatch(&mut self, ticket: Ticket, request: Request) {
        self.sent.borrow_mut().push((ticket, request));
    }
}

fn execute(client: &Client, base_url: &str, request: Request) -> Result<Response, TransportError> {
    let op = request.operation();
    let builder = match request {
        Request::Register(creds) => client
            .post(format!("{}/register", base_url))
            .json(&creds),
        Request::Login(creds) => client.post(format!("{}/login", base_url)).json(&creds),
        Request::FetchQuestions { token } => client
            .get(format!("{}/api/questions", base_url))
            .bearer_auth(token),
        Request::Submit { token, answers } => client
            .post(format!("{}/api/submit", base_url))
            .bearer_auth(token)
            .json(&answers),
    };
    let (status, body) = send(builder)?;
    tracing::debug!(?op, status, "response received");
    decode(op, status, &body)
}

fn send(builder: RequestBuilder) -> Result<(u16, String), TransportError> {
    let resp = builder
        .send()
        .map_err(|e| TransportError::Network(e.to_string()))?;
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .map_err(|e| TransportError::Network(e.to_string()))?;
    Ok((status, body))
}

/// Turns a raw HTTP exchange into a typed outcome for `op`.
pub fn decode(op: Operation, status: u16, body: &str) -> Result<Response, TransportError> {
    let ok = StatusCode::from_u16(status)
        .map(|s| s.is_success())
        .unwrap_or(false);
    if !ok {
        return Err(failure(op, status, body));
    }

    match op {
        Operation::Register => {
            let msg = serde_json::from_str::<MessageBody>(body)
                .ok()
                .and_then(|b| b.msg)
                .unwrap_or_else(|| "Registration successful. Please log in.".to_string());
            Ok(Response::Registered(msg))
        }
        Operation::Login => {
            let token: TokenResponse = parse(body)?;
            if token.access_token.is_empty() {
                return Err(TransportError::Malformed("empty access token".to_string()));
            }
            Ok(Response::LoggedIn(token.access_token))
        }
        Operation::FetchQuestions => Ok(Response::Questions(parse(body)?)),
        Operation::Submit => Ok(Response::Scored(parse(body)?)),
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))
}

fn failure(op: Operation, status: u16, body: &str) -> TransportError {
    let message = serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|b| b.msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| op.fallback_error().to_string());

    // flask-jwt-extended answers 401 for missing/expired tokens and 422 for
    // tokens it cannot decode.
    if op.is_authorized() && (status == 401 || status == 422) {
        TransportError::Unauthorized { message }
    } else {
        TransportError::Rejected { status, message }
    }
}
