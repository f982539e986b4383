//! The interface a UI layer drives.
//!
//! # Design
//! The UI forwards its events (`on_text_changed`, `on_item_selected`,
//! `on_close`) and receives every outcome as a [`SessionEvent`] through one
//! listener supplied at configuration time. Events are delivered on the
//! callback loop only, so the listener never runs concurrently with itself.

use std::sync::{Arc, Mutex};

use crate::client::HttpJsonClient;
use crate::config::{Endpoints, SearchConfiguration};
use crate::details::PlaceDetailsResolver;
use crate::dispatch::CallbackContext;
use crate::error::PlacesError;
use crate::search::PlaceSearchService;
use crate::types::{LocationBias, Place, PlaceDetails, PlaceType};

#[derive(Debug)]
pub enum SessionEvent {
    /// A search succeeded; this list replaces the previous one.
    ResultsUpdated(Vec<Place>),
    /// The search text was cleared.
    ResultsCleared,
    SearchFailed(PlacesError),
    PlaceSelected(Place),
    DetailsResolved(PlaceDetails),
    DetailsFailed { place: Place, error: PlacesError },
    Closed,
}

type Listener = Arc<Mutex<Box<dyn FnMut(SessionEvent) + Send>>>;

pub struct AutocompleteSession {
    search: PlaceSearchService,
    resolver: PlaceDetailsResolver,
    callbacks: CallbackContext,
    listener: Listener,
}

impl AutocompleteSession {
    pub fn configure<L>(
        config: SearchConfiguration,
        endpoints: &Endpoints,
        client: HttpJsonClient,
        listener: L,
    ) -> Self
    where
        L: FnMut(SessionEvent) + Send + 'static,
    {
        let callbacks = client.callbacks().clone();
        Self {
            search: PlaceSearchService::new(config, endpoints, client.clone()),
            resolver: PlaceDetailsResolver::new(endpoints, client),
            callbacks,
            listener: Arc::new(Mutex::new(Box::new(listener))),
        }
    }

    pub fn config(&self) -> &SearchConfiguration {
        self.search.config()
    }

    pub fn set_place_type(&mut self, place_type: PlaceType) {
        self.search.set_place_type(place_type);
    }

    pub fn set_location_bias(&mut self, bias: Option<LocationBias>) {
        self.search.set_location_bias(bias);
    }

    pub fn set_country(&mut self, country: Option<String>) {
        self.search.set_country(country);
    }

    /// Current selectable results.
    pub fn places(&self) -> Vec<Place> {
        self.search.places()
    }

    pub fn on_text_changed(&self, text: &str) {
        if text.is_empty() {
            self.search.clear();
            self.emit(SessionEvent::ResultsCleared);
            return;
        }

        let listener = Arc::clone(&self.listener);
        self.search.search(text, move |result| {
            let event = match result {
                Ok(places) => SessionEvent::ResultsUpdated(places),
                Err(err) => SessionEvent::SearchFailed(err),
            };
            deliver(&listener, event);
        });
    }

    pub fn on_item_selected(&self, place: Place) {
        self.emit(SessionEvent::PlaceSelected(place.clone()));

        let listener = Arc::clone(&self.listener);
        let selected = place.clone();
        self.resolver.resolve(&place, move |result| {
            let event = match result {
                Ok(details) => SessionEvent::DetailsResolved(details),
                Err(error) => SessionEvent::DetailsFailed {
                    place: selected,
                    error,
                },
            };
            deliver(&listener, event);
        });
    }

    /// Select the `index`th current result. `false` if there is none.
    pub fn select_index(&self, index: usize) -> bool {
        match self.search.places().into_iter().nth(index) {
            Some(place) => {
                self.on_item_selected(place);
                true
            }
            None => false,
        }
    }

    /// End the flow. Pending searches are dropped; a details lookup already
    /// in flight still delivers.
    pub fn on_close(&self) {
        self.search.clear();
        self.emit(SessionEvent::Closed);
    }

    pub fn reset(&self) {
        self.on_text_changed("");
    }

    fn emit(&self, event: SessionEvent) {
        let listener = Arc::clone(&self.listener);
        self.callbacks.dispatch(move || deliver(&listener, event));
    }
}

fn deliver(listener: &Listener, event: SessionEvent) {
    match listener.lock() {
        Ok(mut listener) => (*listener)(event),
        Err(_) => log::warn!("session listener panicked earlier; dropping {event:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::activity::NetworkActivity;
    use crate::dispatch::{callback_context, CallbackLoop};
    use crate::testing::ScriptedTransport;

    struct Harness {
        session: AutocompleteSession,
        transport: Arc<ScriptedTransport>,
        callbacks: CallbackLoop,
        events: Arc<Mutex<Vec<SessionEvent>>>,
    }

    impl Harness {
        fn new() -> Self {
            let (ctx, callbacks) = callback_context();
            let transport = Arc::new(ScriptedTransport::new());
            let client = HttpJsonClient::with_transport(transport.clone(), ctx)
                .with_activity(NetworkActivity::new());
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&events);
            let session = AutocompleteSession::configure(
                SearchConfiguration::new("k").with_place_type(PlaceType::Address),
                &Endpoints::with_base_url("http://places.test"),
                client,
                move |event| sink.lock().unwrap().push(event),
            );
            Self {
                session,
                transport,
                callbacks,
                events,
            }
        }

        fn wait_for(&self, n: usize) {
            let done = || self.events.lock().unwrap().len() >= n;
            assert!(self.callbacks.run_until(Duration::from_secs(5), done));
        }
    }

    #[test]
    fn typing_then_selecting_resolves_details() {
        let h = Harness::new();
        h.transport.ok_json(
            "autocomplete",
            json!({"status":"OK","predictions":[{"place_id":"p1","description":"1 Main St"}]}),
        );
        h.transport.ok_json(
            "details",
            json!({"status":"OK","result":{"name":"1 Main St","geometry":{"location":{"lat":1.0,"lng":2.0}}}}),
        );

        h.session.on_text_changed("1 Main");
        h.wait_for(1);
        assert!(h.session.select_index(0));
        h.wait_for(3);

        let events = h.events.lock().unwrap();
        assert!(matches!(&events[0], SessionEvent::ResultsUpdated(p) if p.len() == 1));
        assert!(matches!(&events[1], SessionEvent::PlaceSelected(p) if p.id == "p1"));
        assert!(matches!(
            &events[2],
            SessionEvent::DetailsResolved(d) if d.name == "1 Main St" && d.radius() == 10.0
        ));
        assert!(h.transport.requests()[1].url.contains("key=k&placeid=p1"));
    }

    #[test]
    fn clearing_text_emits_cleared_without_io() {
        let h = Harness::new();
        h.session.on_text_changed("");
        h.wait_for(1);
        assert!(matches!(h.events.lock().unwrap()[0], SessionEvent::ResultsCleared));
        assert!(h.transport.requests().is_empty());
    }

    #[test]
    fn search_failure_is_an_event() {
        let h = Harness::new();
        h.transport.ok_json("", json!({"status":"OVER_QUERY_LIMIT"}));
        h.session.on_text_changed("x");
        h.wait_for(1);
        assert!(matches!(
            &h.events.lock().unwrap()[0],
            SessionEvent::SearchFailed(PlacesError::ApiStatus { status, .. }) if status == "OVER_QUERY_LIMIT"
        ));
    }

    #[test]
    fn details_failure_is_an_event() {
        let h = Harness::new();
        h.transport.ok_json("", json!({"status":"NOT_FOUND"}));
        h.session.on_item_selected(Place::new("gone", "Gone").with_api_key("k"));
        h.wait_for(2);
        let events = h.events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::DetailsFailed { place, error: PlacesError::ApiStatus { .. } } if place.id == "gone"
        )));
    }

    #[test]
    fn select_out_of_range_is_rejected() {
        let h = Harness::new();
        assert!(!h.session.select_index(0));
    }

    #[test]
    fn close_drops_pending_search() {
        let h = Harness::new();
        h.transport.respond_after(
            "",
            Duration::from_millis(50),
            Ok(Some(crate::http::HttpResponse::new(
                200,
                json!({"status":"OK","predictions":[]}).to_string(),
            ))),
        );
        h.session.on_text_changed("x");
        h.session.on_close();
        h.callbacks.run_until(Duration::from_millis(400), || false);

        let events = h.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SessionEvent::Closed));
    }
}
