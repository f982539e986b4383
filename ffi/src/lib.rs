//! C-ABI wrapper around `places-core`.
//!
//! # Overview
//! Lets a native UI drive an autocomplete session through `extern "C"`
//! functions: forward text changes and selections, then call
//! `places_session_run_pending` from the UI thread to receive results as
//! [`FfiEvent`]s through a single callback.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The thread that calls `places_session_run_pending` is the callback
//!   context: events are only ever delivered there.
//! - A session handle is not thread-safe. All calls for one handle must come
//!   from the same thread.
//! - The caller owns the session handle and releases it with
//!   `places_session_free`. Nothing else needs freeing.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use places_core::{
    callback_context, AutocompleteSession, Endpoints, HttpJsonClient, LocationBias,
    NetworkActivity, SearchConfiguration,
};

use types::*;

/// Borrow a C string as UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Result<&'a str, FfiStatus> {
    if ptr.is_null() {
        return Err(FfiStatus::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiStatus::InvalidArg)
}

/// Null-check `session`, then run `f` with panics caught.
fn with_session<F>(name: &str, session: *mut FfiSession, f: F) -> FfiStatus
where
    F: FnOnce(&mut FfiSession) -> Result<(), FfiStatus>,
{
    if session.is_null() {
        return FfiStatus::NullArg;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let session = unsafe { &mut *session };
        match f(session) {
            Ok(()) => FfiStatus::Ok,
            Err(status) => status,
        }
    }))
    .unwrap_or_else(|_| {
        log::error!("panic in {name}");
        FfiStatus::Panic
    })
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Create a session.
///
/// `place_type` is an [`FfiPlaceType`] value. `base_url` may be null to use
/// the public endpoints, or e.g. `"http://127.0.0.1:3000"` for the mock
/// server. `callback` receives every event together with `user_data`.
///
/// Returns null if `api_key` or `callback` is null, if a string is not
/// UTF-8, if `place_type` is unknown, or if an internal panic occurs.
/// The caller must free the returned pointer with `places_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_new(
    api_key: *const c_char,
    place_type: i32,
    base_url: *const c_char,
    callback: Option<FfiEventCallback>,
    user_data: *mut c_void,
) -> *mut FfiSession {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return std::ptr::null_mut();
        };
        let Ok(api_key) = (unsafe { c_str(api_key) }) else {
            return std::ptr::null_mut();
        };
        let Some(place_type) = FfiPlaceType::from_raw(place_type) else {
            return std::ptr::null_mut();
        };
        let endpoints = if base_url.is_null() {
            Endpoints::default()
        } else {
            match unsafe { c_str(base_url) } {
                Ok(url) => Endpoints::with_base_url(url),
                Err(_) => return std::ptr::null_mut(),
            }
        };

        let (ctx, callbacks) = callback_context();
        let listener = HostListener::new(callback, user_data);
        let session = AutocompleteSession::configure(
            SearchConfiguration::new(api_key).with_place_type(place_type),
            &endpoints,
            HttpJsonClient::new(ctx),
            move |event| listener.deliver(&event),
        );
        Box::into_raw(Box::new(FfiSession { session, callbacks }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session created by `places_session_new`. Safe to call with null.
///
/// Requests still in flight finish in the background; their events are
/// dropped.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(session) });
        }));
    }
}

/// Deliver every queued event to the callback on the calling thread.
///
/// `ran`, if not null, receives the number of events delivered.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_run_pending(session: *mut FfiSession, ran: *mut u32) -> FfiStatus {
    with_session("places_session_run_pending", session, |s| {
        let count = s.callbacks.run_pending();
        if !ran.is_null() {
            unsafe { *ran = u32::try_from(count).unwrap_or(u32::MAX) };
        }
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn places_session_set_place_type(session: *mut FfiSession, place_type: i32) -> FfiStatus {
    with_session("places_session_set_place_type", session, |s| {
        let place_type = FfiPlaceType::from_raw(place_type).ok_or(FfiStatus::InvalidArg)?;
        s.session.set_place_type(place_type);
        Ok(())
    })
}

/// Weight results toward a circle. A `radius_meters` of zero or less uses
/// the unbounded default radius.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_set_location_bias(
    session: *mut FfiSession,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
) -> FfiStatus {
    with_session("places_session_set_location_bias", session, |s| {
        if !(latitude.is_finite() && longitude.is_finite() && radius_meters.is_finite()) {
            return Err(FfiStatus::InvalidArg);
        }
        let bias = if radius_meters > 0.0 {
            LocationBias::new(latitude, longitude, radius_meters)
        } else {
            LocationBias::from_coordinate(places_core::Coordinate::new(latitude, longitude))
        };
        s.session.set_location_bias(Some(bias));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn places_session_clear_location_bias(session: *mut FfiSession) -> FfiStatus {
    with_session("places_session_clear_location_bias", session, |s| {
        s.session.set_location_bias(None);
        Ok(())
    })
}

/// Restrict results to one ISO 3166-1 alpha-2 country. Null or an empty
/// string removes the restriction.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_set_country(session: *mut FfiSession, code: *const c_char) -> FfiStatus {
    with_session("places_session_set_country", session, |s| {
        let country = if code.is_null() {
            None
        } else {
            Some(unsafe { c_str(code) }?).filter(|c| !c.is_empty())
        };
        s.session.set_country(country.map(str::to_string));
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// UI events
// ---------------------------------------------------------------------------

/// The search text changed. An empty string clears the results.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_text_changed(session: *mut FfiSession, text: *const c_char) -> FfiStatus {
    with_session("places_session_text_changed", session, |s| {
        let text = unsafe { c_str(text) }?;
        s.session.on_text_changed(text);
        Ok(())
    })
}

/// Select the `index`th current result and resolve its details.
#[unsafe(no_mangle)]
pub extern "C" fn places_session_select(session: *mut FfiSession, index: usize) -> FfiStatus {
    with_session("places_session_select", session, |s| {
        if s.session.select_index(index) {
            Ok(())
        } else {
            Err(FfiStatus::OutOfRange)
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn places_session_close(session: *mut FfiSession) -> FfiStatus {
    with_session("places_session_close", session, |s| {
        s.session.on_close();
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn places_session_reset(session: *mut FfiSession) -> FfiStatus {
    with_session("places_session_reset", session, |s| {
        s.session.reset();
        Ok(())
    })
}

/// Number of requests in flight across all sessions. Non-zero means a
/// network activity indicator should be shown.
#[unsafe(no_mangle)]
pub extern "C" fn places_network_activity_count() -> usize {
    catch_unwind(|| NetworkActivity::global().in_flight()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
