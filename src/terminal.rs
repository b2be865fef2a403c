use libc::STDIN_FILENO;
use nix::sys::select::{select, FdSet};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg, Termios};
use nix::sys::time::{TimeVal, TimeValLike};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn record_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// The console I/O capability consumed by `Memory::read` (KBSR polling) and
/// the trap handlers. Free to construct: it holds no state of its own and
/// performs no raw-mode acquisition, so unit tests can build one without a
/// controlling terminal.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Terminal
    }

    /// True once a `SIGINT` has been delivered since `RawModeGuard::acquire`
    /// installed the handler.
    pub fn interrupted() -> bool {
        INTERRUPTED.load(Ordering::SeqCst)
    }

    /// Polls standard input for at least one readable byte within
    /// `timeout_ms` milliseconds. The only sanctioned non-blocking
    /// observation point in the VM — used by `Memory::read` on KBSR.
    pub fn key_available(&self, timeout_ms: i64) -> bool {
        let mut readfds = FdSet::new();
        readfds.insert(STDIN_FILENO);

        let mut timeout = TimeVal::milliseconds(timeout_ms);

        matches!(select(None, &mut readfds, None, None, &mut timeout), Ok(n) if n > 0)
    }

    /// Blocking read of a single raw input byte.
    pub fn read_byte(&self) -> io::Result<u8> {
        let mut buffer = [0u8; 1];
        io::stdin().read_exact(&mut buffer)?;
        Ok(buffer[0])
    }

    pub fn write_byte(&self, byte: u8) {
        let _ = io::stdout().write_all(&[byte]);
    }

    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Scoped ownership of the controlling terminal's raw mode. Disables
/// canonical buffering and local echo on `acquire`, and restores the
/// original mode when dropped — on normal return, on trap HALT unwinding
/// the call stack, or after the run loop observes a SIGINT and returns.
pub struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    /// Puts standard input into raw mode and installs the `SIGINT` handler
    /// backing `Terminal::interrupted`.
    pub fn acquire() -> nix::Result<Self> {
        let original = tcgetattr(STDIN_FILENO)?;

        let mut raw = original.clone();
        raw.local_flags &= !(LocalFlags::ICANON | LocalFlags::ECHO);
        tcsetattr(STDIN_FILENO, SetArg::TCSANOW, &raw)?;

        // SAFETY: `record_sigint` only stores to an `AtomicBool`, which is
        // async-signal-safe.
        unsafe {
            signal(Signal::SIGINT, SigHandler::Handler(record_sigint))?;
        }

        Ok(RawModeGuard { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = tcsetattr(STDIN_FILENO, SetArg::TCSANOW, &self.original);
    }
}
