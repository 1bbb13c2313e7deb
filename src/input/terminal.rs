use std::io::{self, Read};
use std::mem::MaybeUninit;
use std::os::unix::io::{AsRawFd, RawFd};

use libc::{tcgetattr, tcsetattr, termios, ECHO, ICANON, TCSANOW, VMIN, VTIME};

/// Keeps a terminal in non-canonical, no-echo mode for as long as it lives.
/// The saved mode is put back on drop, on every exit path.
pub struct RawMode {
    fd: RawFd,
    original: termios,
}

impl RawMode {
    /// Returns `Ok(None)` when `fd` is not a terminal.
    pub fn enable(fd: RawFd) -> io::Result<Option<Self>> {
        if unsafe { libc::isatty(fd) } != 1 {
            return Ok(None);
        }

        let mut original = MaybeUninit::<termios>::uninit();
        if unsafe { tcgetattr(fd, original.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let original = unsafe { original.assume_init() };

        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        raw.c_cc[VMIN] = 1;
        raw.c_cc[VTIME] = 0;
        if unsafe { tcsetattr(fd, TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Some(RawMode { fd, original }))
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if unsafe { tcsetattr(self.fd, TCSANOW, &self.original) } != 0 {
            log::warn!(
                "failed to restore terminal mode: {}",
                io::Error::last_os_error()
            );
        }
    }
}

/// Unbuffered reader over a descriptor it does not own. Every `read` is one
/// `read(2)`, so nothing past what the caller asked for leaves the kernel.
#[derive(Debug, Clone, Copy)]
pub struct FdReader {
    fd: RawFd,
}

impl FdReader {
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }
}

impl AsRawFd for FdReader {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Read for FdReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

/// Host name of this machine, empty when it cannot be read.
pub fn hostname() -> String {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return String::new();
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
