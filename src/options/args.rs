//! # Exec Argument Parsing
//!
//! Parses the `args` list of a kubeconfig `exec` section against the
//! kubelogin flag set. Flag syntax follows kubelogin: `--flag value`,
//! `--flag=value`, `-l spn`, bare booleans (`--legacy`) or `--legacy=false`,
//! and Go durations for `--timeout`. The last occurrence of a flag wins.

use super::AuthOptions;
use crate::error::ArgumentParseError;
use clap::Parser;
use std::ffi::OsString;
use std::time::Duration;
use tracing::debug;

impl AuthOptions {
    /// Parse exec arguments into a fresh options set
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentParseError`] on unknown flags, missing flag values or
    /// values that fail validation (login method, environment, duration,
    /// boolean).
    pub fn from_exec_args<I, T>(args: I) -> Result<Self, ArgumentParseError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let opts = Self::try_parse_from(args).map_err(ArgumentParseError::new)?;
        debug!(
            login_method = %opts.login_method,
            server_id = %opts.server_id,
            environment = %opts.environment,
            "Parsed kubeconfig exec arguments"
        );
        Ok(opts)
    }
}

/// Parse a Go-style duration such as `60s`, `1m30s`, `1.5h` or `250ms`
pub(crate) fn parse_duration(value: &str) -> Result<Duration, String> {
    let input = value.trim();
    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut nanos = 0f64;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {value:?}"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|err| format!("invalid duration {value:?}: {err}"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration {value:?}")),
            unit => return Err(format!("unknown unit {unit:?} in duration {value:?}")),
        };
        rest = &rest[unit_len..];

        nanos += number * unit_nanos;
    }

    // Components are non-negative; sub-nanosecond precision is dropped
    Ok(Duration::from_nanos(nanos as u64))
}
