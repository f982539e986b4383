//! Scripted transport for unit tests.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

type Outcome = Result<Option<HttpResponse>, TransportError>;

struct Rule {
    fragment: String,
    delay: Duration,
    outcome: Outcome,
}

/// Answers each request with the first unused rule whose fragment occurs in
/// the request URL. An empty fragment matches anything.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    rules: Mutex<Vec<Rule>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, fragment: &str, outcome: Outcome) {
        self.respond_after(fragment, Duration::ZERO, outcome);
    }

    pub(crate) fn respond_after(&self, fragment: &str, delay: Duration, outcome: Outcome) {
        self.rules.lock().unwrap().push(Rule {
            fragment: fragment.to_string(),
            delay,
            outcome,
        });
    }

    pub(crate) fn ok_json(&self, fragment: &str, body: serde_json::Value) {
        self.respond(fragment, Ok(Some(HttpResponse::new(200, body.to_string()))));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Outcome {
        self.requests.lock().unwrap().push(request.clone());
        let rule = {
            let mut rules = self.rules.lock().unwrap();
            let index = rules
                .iter()
                .position(|rule| request.url.contains(&rule.fragment));
            index.map(|i| rules.remove(i))
        };
        match rule {
            Some(rule) => {
                thread::sleep(rule.delay);
                rule.outcome
            }
            None => Err(TransportError::new(format!("no scripted response for {}", request.url))),
        }
    }
}
