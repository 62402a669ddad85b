//! libsoxr engine, built with the `soxr` feature.

use std::ptr;

use super::engine::{Engine, SoxrQuality};
use super::ffi::{self, SoxrHandle};
use crate::error::EngineError;

/// Engine backed by a native libsoxr handle.
pub struct SoxrEngine {
    handle: *mut SoxrHandle,
    capacity: usize,
    scratch: Vec<f32>,
}

// SAFETY: the handle is owned exclusively and only touched through `&mut self`.
unsafe impl Send for SoxrEngine {}

impl SoxrQuality {
    fn recipe(&self) -> std::os::raw::c_ulong {
        match self {
            SoxrQuality::Quick => ffi::SOXR_QQ,
            SoxrQuality::Low => ffi::SOXR_LQ,
            SoxrQuality::Medium => ffi::SOXR_MQ,
            SoxrQuality::High => ffi::SOXR_HQ,
            SoxrQuality::VeryHigh => ffi::SOXR_VHQ,
        }
    }
}

impl SoxrEngine {
    pub fn new(
        in_rate: u32,
        out_rate: u32,
        capacity: usize,
        quality: SoxrQuality,
    ) -> Result<Self, EngineError> {
        let handle = unsafe {
            let io_spec = ffi::soxr_io_spec(ffi::SOXR_FLOAT32_I, ffi::SOXR_FLOAT32_I);
            let quality_spec = ffi::soxr_quality_spec(quality.recipe(), 0);

            let mut error: ffi::SoxrError = ptr::null();
            let handle = ffi::soxr_create(
                in_rate as f64,
                out_rate as f64,
                1,
                &mut error,
                &io_spec,
                &quality_spec,
                ptr::null(),
            );
            if handle.is_null() {
                let msg = ffi::error_string(error).unwrap_or_else(|| "unknown error".to_string());
                return Err(EngineError::Construction(msg));
            }
            handle
        };

        let out_capacity = (capacity as u64 * out_rate as u64 / in_rate as u64) as usize + 16;
        Ok(Self {
            handle,
            capacity,
            scratch: vec![0.0; out_capacity],
        })
    }

    fn live_handle(&self) -> Result<*mut SoxrHandle, EngineError> {
        if self.handle.is_null() {
            Err(EngineError::Released)
        } else {
            Ok(self.handle)
        }
    }

    /// Runs one `soxr_process` call. `input` of `None` drains.
    fn step(
        &mut self,
        handle: *mut SoxrHandle,
        input: Option<&[f32]>,
    ) -> Result<(usize, usize), EngineError> {
        let (in_ptr, in_len) = match input {
            Some(input) => (input.as_ptr(), input.len()),
            None => (ptr::null(), 0),
        };
        let mut in_done = 0usize;
        let mut out_done = 0usize;
        let err = unsafe {
            ffi::soxr_process(
                handle,
                in_ptr.cast(),
                in_len,
                &mut in_done,
                self.scratch.as_mut_ptr().cast(),
                self.scratch.len(),
                &mut out_done,
            )
        };
        match ffi::error_string(err) {
            Some(message) => Err(EngineError::Process { code: None, message }),
            None => Ok((in_done, out_done)),
        }
    }
}

impl Engine for SoxrEngine {
    fn name(&self) -> &'static str {
        "soxr"
    }

    fn input_capacity(&self) -> usize {
        self.capacity
    }

    fn process(
        &mut self,
        input: &[f32],
        end_of_input: bool,
        output: &mut Vec<f32>,
    ) -> Result<(), EngineError> {
        let handle = self.live_handle()?;
        let mut rest = input;
        loop {
            let (used, written) = self.step(handle, Some(rest))?;
            output.extend_from_slice(&self.scratch[..written]);
            rest = &rest[used..];
            if rest.is_empty() && written < self.scratch.len() {
                break;
            }
        }

        if end_of_input {
            loop {
                let (_, written) = self.step(handle, None)?;
                output.extend_from_slice(&self.scratch[..written]);
                if written == 0 {
                    break;
                }
            }
            self.reset()?;
        }
        Ok(())
    }

    fn flush(&mut self, output: &mut [f32]) -> Result<usize, EngineError> {
        let handle = self.live_handle()?;
        let mut done = 0usize;
        let err = unsafe {
            ffi::soxr_process(
                handle,
                ptr::null(),
                0,
                ptr::null_mut(),
                output.as_mut_ptr().cast(),
                output.len(),
                &mut done,
            )
        };
        if let Some(message) = ffi::error_string(err) {
            return Err(EngineError::Process { code: None, message });
        }
        // A short drain means the filter is empty; rewind for the next stream.
        if done < output.len() {
            self.reset()?;
        }
        Ok(done)
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        let handle = self.live_handle()?;
        let err = unsafe { ffi::soxr_clear(handle) };
        match ffi::error_string(err) {
            Some(msg) => Err(EngineError::Reset(msg)),
            None => Ok(()),
        }
    }

    fn release(&mut self) -> Result<(), EngineError> {
        if !self.handle.is_null() {
            unsafe { ffi::soxr_delete(self.handle) };
            self.handle = ptr::null_mut();
        }
        Ok(())
    }
}

impl Drop for SoxrEngine {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::soxr_delete(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}
