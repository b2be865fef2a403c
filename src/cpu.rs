use crate::instruction::Instruction;
use crate::instruction::Register::*;
use crate::memory::Memory;
use crate::sign_extend::SignExtend;
use crate::state::{CpuState, Flag};
use crate::terminal::Terminal;
use crate::trap_vector::TrapVector;

/// Executes one decoded instruction against `state` and `memory`, reaching
/// into `terminal` only from the trap handlers that do I/O. `state.pc` must
/// already have been advanced past the fetched word before this is called;
/// every PC-relative field in the table below is relative to that
/// incremented PC.
pub fn execute(state: &mut CpuState, memory: &mut Memory, terminal: &Terminal, instruction: Instruction) {
    match instruction {
        // BR - Conditional Branch
        //
        // Assembler Formats
        //
        //      BRn     LABEL   BRzp    LABEL
        //      BRz     LABEL   BRnp    LABEL
        //      BRp     LABEL   BRnz    LABEL
        //      BR[1]   LABEL   BRnzp   LABEL
        //
        // Encoding
        //
        //      |0 0 0 0|0|0|0|0 0 0 0 0 0 0 0 0|
        //      |BR     |n|p|z|pc_offset_9      |
        //
        // Description
        //
        // The condition codes specified by the state of bits [11:9] are tested. If any of the
        // condition codes tested is set, the program branches to the location specified by adding
        // the sign-extended PCoffset9 field to the incremented PC.
        //
        // [1]: BR with no flag bits set is interpreted as BRnzp; that is, always branch.
        Instruction::BR(condition, pc_offset) => {
            let taken = (condition.n && state.condition == Flag::N)
                || (condition.z && state.condition == Flag::Z)
                || (condition.p && state.condition == Flag::P);

            if taken {
                state.pc = state.pc.wrapping_add(pc_offset.sign_extend(9));
            }
        }

        // ADD - Addition
        //
        // Assembler Formats
        //
        //      ADD DR, SR1, SR2
        //      ADD DR, SR1, imm5
        //
        // Description
        //
        // If bit [5] is 0, the second source operand is obtained from SR2. If bit [5] is 1, the
        // second source operand is obtained by sign-extending the imm5 field to 16 bits. In both
        // cases, the second source operand is added to the contents of SR1 and the result stored
        // in DR. The condition codes are set, based on whether the result is negative, zero, or
        // positive.
        Instruction::ADD(dr, sr1, sr2) => {
            let value = state.registers.read(sr1).wrapping_add(state.registers.read(sr2));

            state.registers.write(dr, value);
            state.update_flags(dr);
        }
        Instruction::ADDIMM(dr, sr1, immediate_value) => {
            let value = state.registers.read(sr1).wrapping_add(immediate_value);

            state.registers.write(dr, value);
            state.update_flags(dr);
        }

        // LD - Load
        //
        // Description
        //
        // An address is computed by sign-extending bits [8:0] to 16 bits and adding this value to
        // the incremented PC. The contents of memory at this address are loaded into DR. The
        // condition codes are set, based on whether the value loaded is negative, zero, or
        // positive.
        Instruction::LD(dr, pc_offset) => {
            let address = state.pc.wrapping_add(pc_offset.sign_extend(9));
            let value = memory.read(address, terminal);

            state.registers.write(dr, value);
            state.update_flags(dr);
        }

        // ST - Store
        //
        // The contents of the register specified by SR are stored in the memory location whose
        // address is computed by sign-extending bits [8:0] to 16 bits and adding this value to the
        // incremented PC.
        Instruction::ST(sr, pc_offset) => {
            let address = state.pc.wrapping_add(pc_offset.sign_extend(9));

            memory.write(address, state.registers.read(sr));
        }

        // JSR / JSRR - Jump to Subroutine
        //
        // Description
        //
        // First, the incremented PC is saved in R7. Then the PC is loaded with the address of the
        // first instruction of the subroutine: sign-extended bits [10:0] added to the incremented
        // PC (JSR), or the contents of a base register (JSRR).
        Instruction::JSR(pc_offset) => {
            let return_address = state.pc;
            state.pc = state.pc.wrapping_add(pc_offset.sign_extend(11));
            state.registers.write(R7, return_address);
        }
        Instruction::JSRR(base) => {
            let return_address = state.pc;
            state.pc = state.registers.read(base);
            state.registers.write(R7, return_address);
        }

        // AND - Bit-wise Logical AND
        //
        // Description
        //
        // If bit [5] is 0, the second source operand is obtained from SR2. If bit [5] is 1, the
        // second source operand is obtained by sign-extending the imm5 field to 16 bits. In either
        // case, the second source operand and the contents of SR1 are bit-wise ANDed, and the
        // result stored in DR. The condition codes are set, based on whether the binary value
        // produced, taken as a 2's complement integer, is negative, zero, or positive.
        Instruction::AND(dr, sr1, sr2) => {
            let value = state.registers.read(sr1) & state.registers.read(sr2);

            state.registers.write(dr, value);
            state.update_flags(dr);
        }
        Instruction::ANDIMM(dr, sr1, immediate_value) => {
            let value = state.registers.read(sr1) & immediate_value;

            state.registers.write(dr, value);
            state.update_flags(dr);
        }

        // LDR - Load Base+offset
        //
        // An address is computed by sign-extending bits [5:0] to 16 bits and adding this value to
        // the contents of the register specified by bits [8:6]. The contents of memory at this
        // address are loaded into DR. The condition codes are set, based on whether the value
        // loaded is negative, zero, or positive.
        Instruction::LDR(dr, base, offset) => {
            let address = state.registers.read(base).wrapping_add(offset);
            let value = memory.read(address, terminal);

            state.registers.write(dr, value);
            state.update_flags(dr);
        }

        // STR - Store Base+offset
        //
        // The contents of the register specified by SR are stored in the memory location whose
        // address is computed by sign-extending bits [5:0] to 16 bits and adding this value to the
        // contents of the register specified by bits [8:6].
        Instruction::STR(sr, base, offset) => {
            let address = state.registers.read(base).wrapping_add(offset);

            memory.write(address, state.registers.read(sr));
        }

        // RTI - Return from Interrupt
        //
        // Real LC-3 defines this as a privileged-mode return; this VM models no supervisor/user
        // distinction and no interrupt vector table, so RTI is a no-op.
        Instruction::RTI => {}

        // NOT - Bit-Wise Complement
        //
        // The bit-wise complement of the contents of SR is stored in DR. The condition codes are
        // set, based on whether the binary value produced, taken as a 2's complement integer, is
        // negative, zero, or positive.
        Instruction::NOT(dr, sr) => {
            state.registers.write(dr, !state.registers.read(sr));
            state.update_flags(dr);
        }

        // LDI - Load Indirect
        //
        // An address is computed by sign-extending bits [8:0] to 16 bits and adding this value to
        // the incremented PC. What is stored in memory at this address is the address of the data
        // to be loaded into DR. The condition codes are set, based on whether the value loaded is
        // negative, zero, or positive.
        Instruction::LDI(dr, pc_offset) => {
            let indirect_address = state.pc.wrapping_add(pc_offset.sign_extend(9));
            let address = memory.read(indirect_address, terminal);
            let value = memory.read(address, terminal);

            state.registers.write(dr, value);
            state.update_flags(dr);
        }

        // STI - Store Indirect
        //
        // Bits [8:0] are sign-extended to 16 bits and added to the incremented PC. What is in
        // memory at this address is the address of the location to which the data in SR is stored.
        Instruction::STI(sr, pc_offset) => {
            let indirect_address = state.pc.wrapping_add(pc_offset.sign_extend(9));
            let address = memory.read(indirect_address, terminal);

            memory.write(address, state.registers.read(sr));
        }

        // JMP / RET - Jump
        //
        // The program unconditionally jumps to the location specified by the contents of the base
        // register. RET is the special case where the base register is R7, the linkage register
        // left by JSR/JSRR.
        Instruction::JMP(base) => {
            state.pc = state.registers.read(base);
        }

        // RES - Reserved, currently unused. No effect.
        Instruction::RESERVED => {}

        // LEA - Load Effective Address
        //
        // An address is computed by sign-extending bits [8:0] to 16 bits and adding this value to
        // the incremented PC. This address itself (not the memory it points to) is loaded into DR.
        Instruction::LEA(dr, pc_offset) => {
            let address = state.pc.wrapping_add(pc_offset.sign_extend(9));

            state.registers.write(dr, address);
            state.update_flags(dr);
        }

        // TRAP - System Call
        //
        // R7 is loaded with the incremented PC (the software return address), then the trap
        // vector in bits [7:0] selects one of the six service routines below. Unused vectors have
        // no effect.
        Instruction::TRAP(trap_vector) => {
            state.registers.write(R7, state.pc);

            match trap_vector {
                // GETC - read a single character from the keyboard, not echoed, into R0[7:0].
                TrapVector::GETC => {
                    let byte = terminal.read_byte().unwrap_or(0);
                    state.registers.write(R0, u16::from(byte));
                    state.update_flags(R0);
                }

                // OUT - write the character in R0[7:0] to the console.
                TrapVector::OUT => {
                    terminal.write_byte(state.registers.read(R0) as u8);
                    terminal.flush();
                }

                // PUTS - write the null-terminated string of one-character-per-word starting at
                // mem[R0] to the console.
                //
                // Walking the string through memory.read means a string that happens to cross
                // KBSR (0xFE00) polls the keyboard mid-print rather than reading a raw cell.
                TrapVector::PUTS => {
                    let mut address = state.registers.read(R0);

                    loop {
                        let word = memory.read(address, terminal);
                        if word == 0 {
                            break;
                        }

                        terminal.write_byte(word as u8);
                        address = address.wrapping_add(1);
                    }

                    terminal.flush();
                }

                // IN - prompt, then read a single character, echoed, into R0[7:0].
                TrapVector::IN => {
                    print!("Enter a character: ");
                    terminal.flush();

                    let byte = terminal.read_byte().unwrap_or(0);
                    terminal.write_byte(byte);
                    terminal.flush();

                    state.registers.write(R0, u16::from(byte));
                    state.update_flags(R0);
                }

                // PUTSP - write the null-terminated string of two-characters-per-word (low byte
                // first) starting at mem[R0] to the console.
                //
                // Same KBSR-crossing caveat as PUTS above.
                TrapVector::PUTSP => {
                    let mut address = state.registers.read(R0);

                    loop {
                        let word = memory.read(address, terminal);
                        if word == 0 {
                            break;
                        }

                        let low = (word & 0xff) as u8;
                        let high = (word >> 8) as u8;

                        terminal.write_byte(low);
                        if high != 0 {
                            terminal.write_byte(high);
                        }

                        address = address.wrapping_add(1);
                    }

                    terminal.flush();
                }

                // HALT - print "HALT" and stop the interpreter loop.
                TrapVector::HALT => {
                    println!("HALT");
                    state.running = false;
                }

                // Any vector outside the six defined above: no effect.
                TrapVector::Unknown(_) => {}
            }
        }
    }
}
