mod config;
mod cpu;
mod error;
mod instruction;
mod loader;
mod memory;
mod registers;
mod sign_extend;
mod state;
mod terminal;
mod trap_vector;
mod vm;

pub use crate::config::Config;
pub use crate::error::VmError;

use crate::terminal::{RawModeGuard, Terminal};
use crate::vm::Vm;

/// Loads every image named in `config.image_paths`, in order, then runs the
/// fetch-decode-execute loop until a TRAP HALT or a delivered `SIGINT`.
///
/// Acquires raw terminal mode for the duration of the run and restores it
/// on every exit path, including early returns from a failed image load.
pub fn run(config: Config) -> Result<(), VmError> {
    let guard = RawModeGuard::acquire().map_err(|_| VmError::Interrupted)?;
    let terminal = Terminal::new();

    let mut vm = Vm::new();
    for path in &config.image_paths {
        vm.load_image(path).map_err(|source| VmError::ImageLoad {
            path: path.clone(),
            source,
        })?;
    }

    vm.run(&terminal);
    drop(guard);

    if Terminal::interrupted() {
        Err(VmError::Interrupted)
    } else {
        Ok(())
    }
}
