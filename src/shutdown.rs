//! Best-effort shutdown notification.
//!
//! Registers a handler for SIGINT and SIGTERM that writes a fixed notice
//! and exits. The handler runs in signal context, so it sticks to
//! async-signal-safe calls: no allocation, no logging machinery, and no
//! cleanup of the listener or an in-flight connection.

use std::io;

const NOTICE: &[u8] = b"xformd: termination signal received, exiting\n";

/// Install the SIGINT/SIGTERM notification handler.
pub fn install() -> io::Result<()> {
    let handler = notify_and_exit as extern "C" fn(libc::c_int);

    for signal in [libc::SIGINT, libc::SIGTERM] {
        let previous = unsafe { libc::signal(signal, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }

    Ok(())
}

extern "C" fn notify_and_exit(signal: libc::c_int) {
    unsafe {
        let _ = libc::write(
            libc::STDERR_FILENO,
            NOTICE.as_ptr() as *const libc::c_void,
            NOTICE.len(),
        );
        libc::_exit(128 + signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_succeeds() {
        install().unwrap();
    }
}
