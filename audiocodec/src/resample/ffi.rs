//! libsoxr bindings.

use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_uint, c_ulong, c_void};

/// Opaque resampler handle.
pub enum SoxrHandle {}

/// `const char *` error; null on success.
pub type SoxrError = *const c_char;

pub const SOXR_QQ: c_ulong = 0;
pub const SOXR_LQ: c_ulong = 1;
pub const SOXR_MQ: c_ulong = 2;
pub const SOXR_HQ: c_ulong = 4;
pub const SOXR_VHQ: c_ulong = 6;

/// Mono float32 in and out.
pub const SOXR_FLOAT32_I: c_uint = 0;

#[repr(C)]
pub struct SoxrIoSpec {
    pub itype: c_uint,
    pub otype: c_uint,
    pub scale: c_double,
    pub e: *mut c_void,
    pub flags: c_ulong,
}

#[repr(C)]
pub struct SoxrQualitySpec {
    pub precision: c_double,
    pub phase_response: c_double,
    pub passband_end: c_double,
    pub stopband_begin: c_double,
    pub e: *mut c_void,
    pub flags: c_ulong,
}

unsafe extern "C" {
    pub fn soxr_io_spec(itype: c_uint, otype: c_uint) -> SoxrIoSpec;

    pub fn soxr_quality_spec(recipe: c_ulong, flags: c_ulong) -> SoxrQualitySpec;

    pub fn soxr_create(
        input_rate: c_double,
        output_rate: c_double,
        num_channels: c_uint,
        error: *mut SoxrError,
        io_spec: *const SoxrIoSpec,
        quality_spec: *const SoxrQualitySpec,
        runtime_spec: *const c_void,
    ) -> *mut SoxrHandle;

    /// Null `input` signals end of input and drains the filter.
    pub fn soxr_process(
        handle: *mut SoxrHandle,
        input: *const c_void,
        input_len: usize,
        input_done: *mut usize,
        output: *mut c_void,
        output_len: usize,
        output_done: *mut usize,
    ) -> SoxrError;

    /// Ready for fresh input, keeping the configuration.
    pub fn soxr_clear(handle: *mut SoxrHandle) -> SoxrError;

    pub fn soxr_delete(handle: *mut SoxrHandle);
}

/// Returns the message behind a non-null error.
pub fn error_string(err: SoxrError) -> Option<String> {
    if err.is_null() {
        None
    } else {
        // SAFETY: libsoxr errors are static NUL-terminated strings.
        let msg = unsafe { CStr::from_ptr(err) };
        Some(msg.to_string_lossy().into_owned())
    }
}
