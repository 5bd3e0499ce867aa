//! Host platform description for the admin status report

use std::ffi::CStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Kernel name, e.g. `Linux`
    pub system: String,
    pub release: String,
}

impl HostInfo {
    #[cfg(unix)]
    pub fn detect() -> Self {
        // SAFETY: utsname is plain data and uname fills it with NUL-terminated strings
        let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
        if unsafe { libc::uname(&mut uts) } != 0 {
            return Self::fallback();
        }

        let field = |raw: &[libc::c_char]| {
            unsafe { CStr::from_ptr(raw.as_ptr()) }
                .to_string_lossy()
                .into_owned()
        };

        Self {
            system: field(&uts.sysname),
            release: field(&uts.release),
        }
    }

    #[cfg(not(unix))]
    pub fn detect() -> Self {
        Self::fallback()
    }

    fn fallback() -> Self {
        Self {
            system: std::env::consts::OS.to_string(),
            release: "unknown".to_string(),
        }
    }
}

/// Name and version of this build
pub fn runtime_version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
