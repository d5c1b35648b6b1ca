// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CPU time accounting for a single child process.
//!
//! Uses `wait4(2)` so the resource usage belongs to exactly the reaped pid.
//! `getrusage(RUSAGE_CHILDREN)` would mix in every other child reaped by
//! the harness, which is wrong as soon as runs execute concurrently.

use std::io;
use std::process::{Child, ExitStatus};
use std::time::Duration;

/// User and system CPU time consumed by one finished child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildUsage {
    pub user_time: Duration,
    pub system_time: Duration,
}

#[cfg(unix)]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

/// Wait for `child` to exit and collect its CPU usage.
///
/// Consumes the handle: the pid is reaped here, so the standard library must
/// not wait on it again.
#[cfg(unix)]
pub fn wait_with_usage(child: Child) -> io::Result<(ExitStatus, ChildUsage)> {
    use std::os::unix::process::ExitStatusExt;

    let pid = child.id() as libc::pid_t;
    let mut status: libc::c_int = 0;
    // SAFETY: rusage is a plain C struct for which all-zero bytes is valid.
    let mut rusage: libc::rusage = unsafe { std::mem::zeroed() };

    loop {
        // SAFETY: pointers reference live stack locals for the duration of the call.
        let ret = unsafe { libc::wait4(pid, &mut status, 0, &mut rusage) };
        if ret == pid {
            break;
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            continue;
        }
        return Err(err);
    }

    drop(child);

    let usage = ChildUsage {
        user_time: timeval_to_duration(rusage.ru_utime),
        system_time: timeval_to_duration(rusage.ru_stime),
    };
    Ok((ExitStatus::from_raw(status), usage))
}

/// Wait for `child` to exit. CPU usage is not available on this platform.
#[cfg(not(unix))]
pub fn wait_with_usage(mut child: Child) -> io::Result<(ExitStatus, ChildUsage)> {
    let status = child.wait()?;
    Ok((status, ChildUsage::default()))
}
