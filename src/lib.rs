//! A Rust driver for Photron high-speed cameras, built on the vendor's PDC SDK.
//!
//! The SDK itself is closed source and ships as a shared library (`PDCLIB`). It is loaded at
//! runtime from a directory chosen by the caller, see [`ffi::PdcLibrary::load`].
//! Only one camera head per device is supported.
//!
//! ## Example
//!
//! More examples are provided in the `demos/` folder.
//!
//! ```no_run
//! use hscam_lib_rs::{cam::PdcSession, util::CamUtil};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = PdcSession::load(None)?;
//!     let mut cam = session.open_device_by_ip("192.168.0.10")?;
//!
//!     cam.record_blocking(Duration::from_millis(250)).await?;
//!
//!     let frames = cam.memory_frame_count()?;
//!     let last = cam.image_from_memory(frames - 1)?;
//!
//!     println!("Last frame: {} bytes", last.len());
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

/// Contains vendor constants and default timings.
pub mod consts;

/// Contains the camera value types and the driver configuration.
pub mod settings;

/// Contains the opaque device handle.
pub mod handle;

/// Contains the trait abstracting the vendor SDK.
pub mod sdk;

/// Contains the runtime-loaded vendor SDK.
pub mod ffi;

/// Contains the session and camera structs.
pub mod cam;

/// Contains the recording state machine.
pub mod util;

#[cfg(test)]
pub(crate) mod mock;

/// Crate-specific error enum.
/// Every function interacting with the camera returns a Result enum with this error type.
#[derive(thiserror::Error, Debug)]
pub enum CamError {
    #[error("Invalid IPv4 address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{message}{}", code_suffix(.code))]
    Device { message: String, code: Option<u32> },

    #[error("Timed out after {waited:?} waiting for {operation}")]
    Timeout {
        operation: &'static str,
        waited: Duration,
    },

    #[error("Unexpected {what} value reported by the SDK: {value:#x}")]
    UnexpectedValue { what: &'static str, value: u32 },

    #[error("Unable to load the PDC SDK")]
    Library(#[from] libloading::Error),
}

impl CamError {
    /// Vendor error code, if the error originates from a failed SDK call.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Device { code, .. } => *code,
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<u32>) -> String {
    code.map(|code| format!(" (error code {code})"))
        .unwrap_or_default()
}

pub type CamResult<T> = Result<T, CamError>;
