use crate::cpu::execute;
use crate::instruction::Instruction;
use crate::loader::load_image;
use crate::memory::Memory;
use crate::state::CpuState;
use crate::terminal::Terminal;
use std::io;
use std::path::Path;

/// Ties memory and CPU state together and drives the fetch-decode-execute
/// loop. The terminal is borrowed for the duration of each `run` call
/// rather than owned here, so the caller controls the raw-mode guard's
/// scope.
pub struct Vm {
    memory: Memory,
    state: CpuState,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            memory: Memory::new(),
            state: CpuState::new(),
        }
    }

    /// Loads an image into memory. Loading several images in sequence, a
    /// later image's words overwrite an earlier image's words at
    /// overlapping addresses.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        load_image(path, &mut self.memory)
    }

    /// Fetches the word at PC, advances PC, decodes, and executes it.
    fn step(&mut self, terminal: &Terminal) {
        let word = self.memory.read(self.state.pc, terminal);
        self.state.pc = self.state.pc.wrapping_add(1);

        let instruction = Instruction::decode(word);
        execute(&mut self.state, &mut self.memory, terminal, instruction);
    }

    /// Runs until TRAP HALT clears the running flag or the process has
    /// observed a SIGINT.
    pub fn run(&mut self, terminal: &Terminal) {
        while self.state.running && !Terminal::interrupted() {
            self.step(terminal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_program(vm: &mut Vm, origin: u16, words: &[u16]) {
        let terminal = Terminal::new();
        // Bypass the file loader for in-memory test programs: write
        // directly through the same Memory the VM will execute from.
        let mut address = origin;
        for &word in words {
            vm.memory.write(address, word);
            address = address.wrapping_add(1);
        }
        vm.state.pc = origin;
        let _ = terminal; // silence unused warning when no KBSR interaction occurs
    }

    #[test]
    fn add_immediate_positive() {
        let mut vm = Vm::new();
        load_program(&mut vm, 0x3000, &[0x1023, 0xf025]); // ADD R0,R0,#3 ; HALT

        let terminal = Terminal::new();
        vm.run(&terminal);

        assert_eq!(vm.state.registers.read(crate::instruction::Register::R0), 3);
        assert_eq!(vm.state.condition, crate::state::Flag::P);
        assert!(!vm.state.running);
    }

    #[test]
    fn add_overflow_wraps_to_negative() {
        let mut vm = Vm::new();
        vm.state.registers.write(crate::instruction::Register::R0, 0x7fff);
        load_program(&mut vm, 0x3000, &[0x1021, 0xf025]); // ADD R0,R0,#1 ; HALT

        let terminal = Terminal::new();
        vm.run(&terminal);

        assert_eq!(vm.state.registers.read(crate::instruction::Register::R0), 0x8000);
        assert_eq!(vm.state.condition, crate::state::Flag::N);
    }

    #[test]
    fn br_taken_on_zero_skips_two_words() {
        let mut vm = Vm::new();
        // AND R0,R0,#0 (zeroes COND) ; BRz #2 ; ADD R1,R1,#1 (skipped) ; ADD R1,R1,#2 ; HALT
        load_program(
            &mut vm,
            0x3000,
            &[0x5020, 0x0402, 0x1261, 0x1262, 0xf025],
        );

        let terminal = Terminal::new();
        vm.run(&terminal);

        assert_eq!(vm.state.registers.read(crate::instruction::Register::R1), 2);
    }

    #[test]
    fn jsr_then_ret_round_trips_through_r7() {
        let mut vm = Vm::new();
        // 0x3000 JSR #1 (-> 0x3002)
        // 0x3001 HALT
        // 0x3002 NOT R0,R0
        // 0x3003 JMP R7 (RET)
        load_program(
            &mut vm,
            0x3000,
            &[0b0100_1_00000000001, 0xf025, 0x903f, 0xc1c0],
        );

        let terminal = Terminal::new();
        vm.run(&terminal);

        assert_eq!(vm.state.registers.read(crate::instruction::Register::R0), !0u16);
        assert!(!vm.state.running);
    }

    #[test]
    fn ldi_indirection_loads_pointed_to_value() {
        let mut vm = Vm::new();
        // LDI R1, #2 at 0x3000 -> pointer word at 0x3003, value at 0x4000
        load_program(&mut vm, 0x3000, &[0xa202, 0xf025]);
        vm.memory.write(0x3003, 0x4000);
        vm.memory.write(0x4000, 0x1234);

        let terminal = Terminal::new();
        vm.run(&terminal);

        assert_eq!(vm.state.registers.read(crate::instruction::Register::R1), 0x1234);
        assert_eq!(vm.state.condition, crate::state::Flag::P);
    }

    #[test]
    fn pc_wraps_from_top_of_address_space() {
        let mut vm = Vm::new();
        vm.state.pc = 0xffff;
        vm.memory.write(0xffff, 0xf025); // HALT

        let terminal = Terminal::new();
        vm.step(&terminal);

        assert_eq!(vm.state.pc, 0x0000);
    }
}
