//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Events are handed to C as borrowed views: every pointer inside an
//! [`FfiEvent`] points into storage owned by `HostListener::deliver`, which
//! lives exactly as long as the callback. The host copies what it needs and
//! never frees anything it receives through a callback.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

use places_core::{
    AutocompleteSession, CallbackLoop, ErrorKind, Place, PlaceDetails, PlaceType, PlacesError,
    SessionEvent,
};

/// Opaque handle to a session and the callback loop the host drains.
pub struct FfiSession {
    pub(crate) session: AutocompleteSession,
    pub(crate) callbacks: CallbackLoop,
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

/// Outcome of a call into the library (not of the search itself).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    /// A string was not UTF-8, a number was not finite, or an enum value was
    /// out of range.
    InvalidArg = 2,
    /// `places_session_select` was given an index past the current results.
    OutOfRange = 3,
    Panic = 4,
}

/// Values accepted wherever a place type is passed as an `int32_t`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPlaceType {
    All = 0,
    Geocode = 1,
    Address = 2,
    Establishment = 3,
    Regions = 4,
    Cities = 5,
}

impl FfiPlaceType {
    /// C can pass any integer, so the enum is never read directly.
    pub(crate) fn from_raw(raw: i32) -> Option<PlaceType> {
        let place_type = match raw {
            x if x == FfiPlaceType::All as i32 => PlaceType::All,
            x if x == FfiPlaceType::Geocode as i32 => PlaceType::Geocode,
            x if x == FfiPlaceType::Address as i32 => PlaceType::Address,
            x if x == FfiPlaceType::Establishment as i32 => PlaceType::Establishment,
            x if x == FfiPlaceType::Regions as i32 => PlaceType::Regions,
            x if x == FfiPlaceType::Cities as i32 => PlaceType::Cities,
            _ => return None,
        };
        Some(place_type)
    }
}

/// Why a search or a details lookup failed. `None` on success events.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    None = 0,
    EmptyQuery = 1,
    Transport = 2,
    NoResponse = 3,
    HttpStatus = 4,
    Serialization = 5,
    ApiStatus = 6,
    Mapping = 7,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::EmptyQuery => FfiErrorCode::EmptyQuery,
            ErrorKind::Transport => FfiErrorCode::Transport,
            ErrorKind::NoResponse => FfiErrorCode::NoResponse,
            ErrorKind::HttpStatus => FfiErrorCode::HttpStatus,
            ErrorKind::Serialization => FfiErrorCode::Serialization,
            ErrorKind::ApiStatus => FfiErrorCode::ApiStatus,
            ErrorKind::Mapping => FfiErrorCode::Mapping,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiEventKind {
    /// `places` holds the new result list (possibly empty).
    ResultsUpdated = 0,
    ResultsCleared = 1,
    SearchFailed = 2,
    /// `places` holds the one selected place.
    PlaceSelected = 3,
    /// `details` is set.
    DetailsResolved = 4,
    /// `places` holds the place whose details failed.
    DetailsFailed = 5,
    Closed = 6,
}

impl From<&SessionEvent> for FfiEventKind {
    fn from(event: &SessionEvent) -> Self {
        match event {
            SessionEvent::ResultsUpdated(_) => FfiEventKind::ResultsUpdated,
            SessionEvent::ResultsCleared => FfiEventKind::ResultsCleared,
            SessionEvent::SearchFailed(_) => FfiEventKind::SearchFailed,
            SessionEvent::PlaceSelected(_) => FfiEventKind::PlaceSelected,
            SessionEvent::DetailsResolved(_) => FfiEventKind::DetailsResolved,
            SessionEvent::DetailsFailed { .. } => FfiEventKind::DetailsFailed,
            SessionEvent::Closed => FfiEventKind::Closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Borrowed event payloads
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct FfiPlace {
    pub id: *const c_char,
    pub description: *const c_char,
}

#[repr(C)]
pub struct FfiPlaceDetails {
    pub name: *const c_char,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// One session event, valid only for the duration of the callback.
///
/// Unused pointers are null and `places_len` is 0 when `places` is null.
#[repr(C)]
pub struct FfiEvent {
    pub kind: FfiEventKind,
    pub error_code: FfiErrorCode,
    /// Set when `error_code` is `HttpStatus`.
    pub http_status: u16,
    /// The API `status` string when `error_code` is `ApiStatus`.
    pub api_status: *const c_char,
    /// The API's own `error_message`, when it sent one.
    pub api_message: *const c_char,
    /// Human-readable description of the failure.
    pub message: *const c_char,
    pub places: *const FfiPlace,
    pub places_len: usize,
    pub details: *const FfiPlaceDetails,
}

/// Called on the thread that runs `places_session_run_pending`.
pub type FfiEventCallback = extern "C" fn(event: *const FfiEvent, user_data: *mut c_void);

/// Owns the strings an `FfiEvent` points at.
#[derive(Default)]
struct Strings(Vec<CString>);

impl Strings {
    fn keep(&mut self, s: &str) -> *const c_char {
        // Interior NULs cannot cross as C strings; drop them.
        let c = CString::new(s.replace('\0', "")).unwrap_or_default();
        let ptr = c.as_ptr();
        self.0.push(c);
        ptr
    }

    fn place(&mut self, place: &Place) -> FfiPlace {
        FfiPlace {
            id: self.keep(&place.id),
            description: self.keep(&place.description),
        }
    }

    fn details(&mut self, details: &PlaceDetails) -> FfiPlaceDetails {
        FfiPlaceDetails {
            name: self.keep(&details.name),
            latitude: details.latitude,
            longitude: details.longitude,
            radius_meters: details.radius(),
        }
    }
}

impl FfiEvent {
    fn new(kind: FfiEventKind) -> Self {
        Self {
            kind,
            error_code: FfiErrorCode::None,
            http_status: 0,
            api_status: ptr::null(),
            api_message: ptr::null(),
            message: ptr::null(),
            places: ptr::null(),
            places_len: 0,
            details: ptr::null(),
        }
    }

    fn set_error(&mut self, err: &PlacesError, strings: &mut Strings) {
        self.error_code = err.kind().into();
        self.message = strings.keep(&err.to_string());
        match err {
            PlacesError::HttpStatus(code) => self.http_status = *code,
            PlacesError::ApiStatus { status, message } => {
                self.api_status = strings.keep(status);
                if let Some(message) = message {
                    self.api_message = strings.keep(message);
                }
            }
            _ => {}
        }
    }
}

/// The host's callback and its opaque context pointer.
pub(crate) struct HostListener {
    callback: FfiEventCallback,
    user_data: *mut c_void,
}

// The session only calls the listener from the callback loop, which the host
// drains on its own thread; `user_data` is never touched on any other thread.
unsafe impl Send for HostListener {}

impl HostListener {
    pub(crate) fn new(callback: FfiEventCallback, user_data: *mut c_void) -> Self {
        Self {
            callback,
            user_data,
        }
    }

    pub(crate) fn deliver(&self, event: &SessionEvent) {
        let mut strings = Strings::default();
        let mut ffi = FfiEvent::new(event.into());
        let mut places: Vec<FfiPlace> = Vec::new();
        let mut details: Option<FfiPlaceDetails> = None;

        match event {
            SessionEvent::ResultsUpdated(list) => {
                places = list.iter().map(|p| strings.place(p)).collect();
            }
            SessionEvent::PlaceSelected(place) => places.push(strings.place(place)),
            SessionEvent::DetailsResolved(resolved) => details = Some(strings.details(resolved)),
            SessionEvent::SearchFailed(err) => ffi.set_error(err, &mut strings),
            SessionEvent::DetailsFailed { place, error } => {
                places.push(strings.place(place));
                ffi.set_error(error, &mut strings);
            }
            SessionEvent::ResultsCleared | SessionEvent::Closed => {}
        }

        if !places.is_empty() {
            ffi.places = places.as_ptr();
            ffi.places_len = places.len();
        }
        if let Some(details) = &details {
            ffi.details = details;
        }

        (self.callback)(&ffi, self.user_data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_type_from_raw() {
        assert_eq!(FfiPlaceType::from_raw(0), Some(PlaceType::All));
        assert_eq!(FfiPlaceType::from_raw(5), Some(PlaceType::Cities));
        assert_eq!(FfiPlaceType::from_raw(6), None);
        assert_eq!(FfiPlaceType::from_raw(-1), None);
    }

    #[test]
    fn error_codes_follow_kinds() {
        let err = PlacesError::HttpStatus(502);
        assert_eq!(FfiErrorCode::from(err.kind()), FfiErrorCode::HttpStatus);
        assert_eq!(FfiErrorCode::from(ErrorKind::Mapping), FfiErrorCode::Mapping);
    }

    #[test]
    fn strings_drop_interior_nul() {
        let mut strings = Strings::default();
        let ptr = strings.keep("a\0b");
        let s = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(s.to_str().unwrap(), "ab");
    }
}
