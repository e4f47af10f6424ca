//! Recording fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;
use crate::frontend::{FormField, Frontend, LoadingKey, StatusKind};
use crate::remote::entry::{DirectoryStats, RemoteEntry};
use crate::remote::envelope::Envelope;
use crate::remote::session::SessionDescriptor;
use crate::remote::transport::{RawPayload, Reply, Request, Transport, UploadFile};

pub fn descriptor(key: &str) -> SessionDescriptor {
    SessionDescriptor {
        key: key.to_string(),
        host_ip: "10.0.0.5:22".to_string(),
        username: "bob".to_string(),
    }
}

type Responder = dyn Fn(&Request) -> Reply + Send + Sync;

/// A [`Transport`] that records every request and answers from a closure.
pub struct FakeTransport {
    requests: Mutex<Vec<Request>>,
    responder: Box<Responder>,
    delays: Mutex<HashMap<&'static str, Duration>>,
}

impl FakeTransport {
    pub fn new(responder: impl Fn(&Request) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            delays: Mutex::new(HashMap::new()),
        })
    }

    /// Answers every request with a successful envelope carrying `payload`.
    pub fn ok(payload: Value) -> Arc<Self> {
        Self::new(move |_| Reply::Structured(Envelope::success("", payload.clone())))
    }

    /// Answers every request with a failed envelope.
    pub fn fail(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |_| Reply::Structured(Envelope::transport_failure(message.clone())))
    }

    pub fn replying(reply: Reply) -> Arc<Self> {
        Self::new(move |_| reply.clone())
    }

    /// Makes requests to `endpoint` sleep before answering.
    pub fn delay(&self, endpoint: &'static str, by: Duration) {
        self.delays.lock().unwrap().insert(endpoint, by);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.requests().iter().map(|r| r.endpoint).collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: Request) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        let delay = self.delays.lock().unwrap().get(request.endpoint).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

/// One observable call made on [`FakeFrontend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Status(String, StatusKind),
    Loading(LoadingKey, bool),
    Entries(Vec<String>),
    Placeholder(String),
    PathLabel(String),
    Stats(DirectoryStats),
    Connection(Option<String>),
    Confirm(String),
    Prompt(String),
    ClearPassword,
    ClearUpload,
    Saved(String, Vec<u8>),
    Report(String, Vec<String>),
}

#[derive(Default)]
struct Answers {
    confirm: bool,
    prompt: Option<String>,
    fields: HashMap<&'static str, String>,
    upload: Option<UploadFile>,
}

/// A [`Frontend`] that records calls and replays canned answers.
#[derive(Default)]
pub struct FakeFrontend {
    calls: Mutex<Vec<Call>>,
    answers: Mutex<Answers>,
}

impl FakeFrontend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.answers.lock().unwrap().confirm = answer;
    }

    pub fn answer_prompt(&self, answer: Option<&str>) {
        self.answers.lock().unwrap().prompt = answer.map(str::to_string);
    }

    pub fn fill_form(&self, host: &str, username: &str, password: &str) {
        let mut answers = self.answers.lock().unwrap();
        answers.fields.insert("host", host.to_string());
        answers.fields.insert("username", username.to_string());
        answers.fields.insert("password", password.to_string());
    }

    pub fn select_upload(&self, file: UploadFile) {
        self.answers.lock().unwrap().upload = Some(file);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Status(msg, _) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<(String, StatusKind)> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::Status(msg, kind) => Some((msg, kind)),
            _ => None,
        })
    }

    /// Loading transitions recorded for `key`, in order.
    pub fn loading_for(&self, key: &LoadingKey) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Loading(k, on) if &k == key => Some(on),
                _ => None,
            })
            .collect()
    }

    /// Position of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Frontend for FakeFrontend {
    fn show_status(&self, message: &str, kind: StatusKind) {
        self.record(Call::Status(message.to_string(), kind));
    }

    fn set_loading(&self, key: &LoadingKey, loading: bool) {
        self.record(Call::Loading(key.clone(), loading));
    }

    fn render_entries(&self, entries: &[RemoteEntry]) {
        self.record(Call::Entries(
            entries.iter().map(|e| e.name().to_string()).collect(),
        ));
    }

    fn render_placeholder(&self, message: &str) {
        self.record(Call::Placeholder(message.to_string()));
    }

    fn update_path_label(&self, path: &str) {
        self.record(Call::PathLabel(path.to_string()));
    }

    fn update_stats(&self, stats: DirectoryStats) {
        self.record(Call::Stats(stats));
    }

    fn update_connection(&self, host: Option<&str>) {
        self.record(Call::Connection(host.map(str::to_string)));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.record(Call::Confirm(prompt.to_string()));
        self.answers.lock().unwrap().confirm
    }

    fn prompt_text(&self, label: &str) -> Option<String> {
        self.record(Call::Prompt(label.to_string()));
        self.answers.lock().unwrap().prompt.clone()
    }

    fn form_field(&self, field: FormField) -> String {
        let name = match field {
            FormField::Host => "host",
            FormField::Username => "username",
            FormField::Password => "password",
        };
        self.answers
            .lock()
            .unwrap()
            .fields
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn clear_password(&self) {
        self.answers.lock().unwrap().fields.remove("password");
        self.record(Call::ClearPassword);
    }

    fn selected_upload(&self) -> Option<UploadFile> {
        self.answers.lock().unwrap().upload.clone()
    }

    fn clear_upload_selection(&self) {
        self.answers.lock().unwrap().upload = None;
        self.record(Call::ClearUpload);
    }

    fn save_download(&self, file_name: &str, payload: RawPayload) -> CoreResult<()> {
        self.record(Call::Saved(file_name.to_string(), payload.bytes));
        Ok(())
    }

    fn render_report(&self, title: &str, lines: &[String]) {
        self.record(Call::Report(title.to_string(), lines.to_vec()));
    }
}
