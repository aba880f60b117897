//! C ABI for mobile bindings.
//!
//! State crosses the boundary as JSON: callers pass the current collection and
//! a command, and receive the next collection back. Every function returns an
//! [`FfiErrorCategory`] code and writes either `out_json` or `out_error`.
//! Strings written by this module must be released with [`daygo_string_free`].

use std::{
    ffi::{CStr, CString},
    os::raw::{c_char, c_int},
    ptr,
    sync::OnceLock,
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    errors::CoreError,
    itinerary::{TripBook, TripCommand},
    layering::compute_layout,
    wallet::{WalletBook, WalletCommand},
};

/// Semantic version of the Rust core (mirrors `Cargo.toml`).
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Semantic version of the FFI surface. Bumps when ABI/contract changes.
pub const FFI_VERSION: &str = "0.1.0";

/// Status codes returned by every entry point.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCategory {
    Ok = 0,
    Validation = 1,
    NotFound = 2,
    Persistence = 3,
    Currency = 4,
    Internal = 5,
}

impl From<FfiErrorCategory> for i32 {
    fn from(value: FfiErrorCategory) -> Self {
        value as i32
    }
}

pub fn classify_error(err: &CoreError) -> FfiErrorCategory {
    match err {
        CoreError::Validation(_) => FfiErrorCategory::Validation,
        CoreError::WalletNotFound(_)
        | CoreError::TripNotFound(_)
        | CoreError::DayNotFound(_)
        | CoreError::ScheduleItemNotFound(_)
        | CoreError::ChecklistItemNotFound(_) => FfiErrorCategory::NotFound,
        CoreError::Storage(_) | CoreError::Config(_) => FfiErrorCategory::Persistence,
        CoreError::RateUnavailable(_) => FfiErrorCategory::Currency,
    }
}

/// Returns the core (Rust) semantic version as a C string.
#[no_mangle]
pub extern "C" fn daygo_core_version() -> *const c_char {
    static CORE: OnceLock<CString> = OnceLock::new();
    CORE.get_or_init(|| CString::new(CORE_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Returns the FFI interface semantic version as a C string.
#[no_mangle]
pub extern "C" fn daygo_ffi_version() -> *const c_char {
    static FFI: OnceLock<CString> = OnceLock::new();
    FFI.get_or_init(|| CString::new(FFI_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Computes the calendar layout for a JSON trip array.
///
/// # Safety
/// `trips_json` must be a valid NUL-terminated string; the out pointers must be
/// null or writable.
#[no_mangle]
pub unsafe extern "C" fn daygo_compute_layout(
    trips_json: *const c_char,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    run(out_json, out_error, || {
        let trips: TripBook = parse_argument(trips_json)?;
        Ok(compute_layout(trips.trips()))
    })
}

/// Applies one trip command and returns the next trip array.
///
/// # Safety
/// Same contract as [`daygo_compute_layout`].
#[no_mangle]
pub unsafe extern "C" fn daygo_trip_apply(
    trips_json: *const c_char,
    command_json: *const c_char,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    run(out_json, out_error, || {
        let trips: TripBook = parse_argument(trips_json)?;
        let command: TripCommand = parse_argument(command_json)?;
        Ok(trips.apply(command)?)
    })
}

/// Applies one wallet command and returns the next wallet array.
///
/// # Safety
/// Same contract as [`daygo_compute_layout`].
#[no_mangle]
pub unsafe extern "C" fn daygo_wallet_apply(
    wallets_json: *const c_char,
    command_json: *const c_char,
    out_json: *mut *mut c_char,
    out_error: *mut *mut c_char,
) -> c_int {
    run(out_json, out_error, || {
        let mut wallets: WalletBook = parse_argument(wallets_json)?;
        let command: WalletCommand = parse_argument(command_json)?;
        wallets.reconcile();
        Ok(wallets.apply(command)?)
    })
}

/// Releases a string previously written by this module.
///
/// # Safety
/// `value` must be null or a pointer obtained from this module, freed once.
#[no_mangle]
pub unsafe extern "C" fn daygo_string_free(value: *mut c_char) {
    if value.is_null() {
        return;
    }
    drop(CString::from_raw(value));
}

struct Failure {
    category: FfiErrorCategory,
    message: String,
}

impl From<CoreError> for Failure {
    fn from(err: CoreError) -> Self {
        Self {
            category: classify_error(&err),
            message: err.to_string(),
        }
    }
}

unsafe fn run<T, F>(out_json: *mut *mut c_char, out_error: *mut *mut c_char, body: F) -> c_int
where
    T: Serialize,
    F: FnOnce() -> Result<T, Failure>,
{
    clear(out_json);
    clear(out_error);
    let outcome = body().and_then(|value| {
        serde_json::to_string(&value).map_err(|err| Failure {
            category: FfiErrorCategory::Internal,
            message: err.to_string(),
        })
    });
    match outcome {
        Ok(json) => {
            write_string(out_json, json);
            FfiErrorCategory::Ok.into()
        }
        Err(failure) => {
            tracing::debug!(category = ?failure.category, message = %failure.message, "ffi call failed");
            write_string(out_error, failure.message);
            failure.category.into()
        }
    }
}

unsafe fn parse_argument<T: DeserializeOwned>(value: *const c_char) -> Result<T, Failure> {
    if value.is_null() {
        return Err(Failure {
            category: FfiErrorCategory::Validation,
            message: "null string pointer received".into(),
        });
    }
    let raw = CStr::from_ptr(value).to_str().map_err(|err| Failure {
        category: FfiErrorCategory::Validation,
        message: err.to_string(),
    })?;
    serde_json::from_str(raw).map_err(|err| Failure {
        category: FfiErrorCategory::Validation,
        message: format!("invalid JSON argument: {err}"),
    })
}

unsafe fn clear(target: *mut *mut c_char) {
    if !target.is_null() {
        *target = ptr::null_mut();
    }
}

unsafe fn write_string(target: *mut *mut c_char, value: String) {
    if target.is_null() {
        return;
    }
    if let Ok(cstring) = CString::new(value) {
        *target = cstring.into_raw();
    }
}
