//! GET-and-parse client for the places endpoints.
//!
//! # Design
//! Three steps, the middle one being the only I/O:
//! `build_request` turns a base URL and parameters into an `HttpRequest`,
//! the [`Transport`] executes it on a background thread, and `classify`
//! turns the outcome into either the parsed JSON object or a `PlacesError`.
//! The result is then handed to the [`CallbackContext`], so every
//! completion runs on the host's callback loop no matter which thread did
//! the network work. The activity guard taken before the request is released
//! on that same loop, right before the completion runs.

use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::Value;

use crate::activity::NetworkActivity;
use crate::dispatch::CallbackContext;
use crate::encode::{encode_query, QueryParams};
use crate::error::{PlacesError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};

/// A decoded response body.
pub type JsonObject = serde_json::Map<String, Value>;

#[derive(Clone)]
pub struct HttpJsonClient {
    transport: Arc<dyn Transport>,
    callbacks: CallbackContext,
    activity: Arc<NetworkActivity>,
}

impl HttpJsonClient {
    /// A client using `ureq` and the process-wide activity indicator.
    pub fn new(callbacks: CallbackContext) -> Self {
        Self::with_transport(Arc::new(UreqTransport::new()), callbacks)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, callbacks: CallbackContext) -> Self {
        Self {
            transport,
            callbacks,
            activity: NetworkActivity::global(),
        }
    }

    pub fn with_activity(mut self, activity: Arc<NetworkActivity>) -> Self {
        self.activity = activity;
        self
    }

    pub fn callbacks(&self) -> &CallbackContext {
        &self.callbacks
    }

    pub fn activity(&self) -> &Arc<NetworkActivity> {
        &self.activity
    }

    pub fn build_request(base_url: &str, params: &QueryParams) -> HttpRequest {
        HttpRequest {
            url: format!("{base_url}?{}", encode_query(params)),
            headers: Vec::new(),
        }
    }

    /// Run the request on the calling thread, bypassing the callback loop.
    pub fn execute_blocking(
        &self,
        base_url: &str,
        params: &QueryParams,
    ) -> Result<JsonObject, PlacesError> {
        let request = Self::build_request(base_url, params);
        log_request(base_url, params);
        let _guard = self.activity.begin();
        let result = classify(self.transport.execute(&request));
        log_failure(base_url, &result);
        result
    }

    /// Issue the request in the background and deliver the classified result
    /// to `completion` on the callback loop. Returns immediately.
    pub fn request<F>(&self, base_url: &str, params: QueryParams, completion: F)
    where
        F: FnOnce(Result<JsonObject, PlacesError>) + Send + 'static,
    {
        let request = Self::build_request(base_url, &params);
        log_request(base_url, &params);

        let guard = self.activity.begin();
        let transport = Arc::clone(&self.transport);
        let callbacks = self.callbacks.clone();
        let endpoint = base_url.to_string();

        // The worker takes the completion out of the slot; if the thread
        // cannot be spawned it is still here to receive the error.
        let slot = Arc::new(Mutex::new(Some(completion)));
        let worker_slot = Arc::clone(&slot);

        let spawned = thread::Builder::new()
            .name("places-http".to_string())
            .spawn(move || {
                let result = classify(transport.execute(&request));
                log_failure(&endpoint, &result);
                if let Some(completion) = take(&worker_slot) {
                    callbacks.dispatch(move || {
                        drop(guard);
                        completion(result);
                    });
                }
            });

        if let Err(err) = spawned {
            log::warn!("could not spawn request thread for {base_url}: {err}");
            if let Some(completion) = take(&slot) {
                let error = TransportError::with_source("failed to spawn request thread", err);
                self.callbacks
                    .dispatch(move || completion(Err(PlacesError::Transport(error))));
            }
        }
    }
}

/// Map a transport outcome to the parsed body or the first failure that
/// applies: transport, no response, HTTP status, body syntax, API status.
pub fn classify(
    outcome: Result<Option<HttpResponse>, TransportError>,
) -> Result<JsonObject, PlacesError> {
    let response = outcome?.ok_or(PlacesError::NoResponse)?;

    if response.status != 200 {
        return Err(PlacesError::HttpStatus(response.status));
    }

    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| PlacesError::Serialization(e.to_string()))?;
    let Value::Object(json) = value else {
        return Err(PlacesError::Serialization(
            "response body is not a JSON object".to_string(),
        ));
    };

    // A non-string status is not treated as an API error.
    if let Some(Value::String(status)) = json.get("status") {
        if status != "OK" {
            return Err(PlacesError::ApiStatus {
                status: status.clone(),
                message: json
                    .get("error_message")
                    .and_then(Value::as_str)
                    .map(String::from),
            });
        }
    }

    Ok(json)
}

fn take<F>(slot: &Mutex<Option<F>>) -> Option<F> {
    slot.lock().ok().and_then(|mut pending| pending.take())
}

fn log_request(base_url: &str, params: &QueryParams) {
    let keys: Vec<&str> = params.keys().map(String::as_str).collect();
    log::debug!("GET {base_url} [{}]", keys.join(", "));
}

fn log_failure(base_url: &str, result: &Result<JsonObject, PlacesError>) {
    if let Err(err) = result {
        log::warn!("places request to {base_url} failed: {err}");
    }
}
