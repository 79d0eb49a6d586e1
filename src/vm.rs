//! Fetch/decode/execute loop, program counter, stack pointer, status and
//! interrupt dispatch.

use std::time::Instant;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::io_port::IoPort;
use crate::isa::{AddrMode, Interrupt, OpCode, TestCode, TAKE_NO_JUMP};
use crate::memory::Memory;
use crate::Cell;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Idle,
    Running,
    Error,
}

pub struct Vm {
    memory: Memory,
    pc: Cell,
    sp: Cell,
    status: Status,
    interrupt_pointer: Cell,
    width: Cell,
    height: Cell,
    letter_w: Cell,
    letter_h: Cell,
}

impl Vm {
    pub fn new(config: &Config) -> Vm {
        Vm {
            memory: Memory::new(config.memory),
            pc: config.program,
            sp: config.stack,
            status: Status::Idle,
            interrupt_pointer: config.interrupt,
            width: config.width,
            height: config.height,
            letter_w: config.letter_w,
            letter_h: config.letter_h,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn pc(&self) -> Cell {
        self.pc
    }

    pub fn sp(&self) -> Cell {
        self.sp
    }

    pub fn status(&self) -> Status {
        self.status
    }

    fn grid_w(&self) -> Cell {
        self.width / self.letter_w
    }

    fn grid_h(&self) -> Cell {
        self.height / self.letter_h
    }

    pub fn load_image<R: std::io::BufRead>(&mut self, reader: R) -> Result<()> {
        let values = coder_image::read(reader)?;
        for (i, value) in values.into_iter().enumerate() {
            self.memory.write(i as Cell, value)?;
        }
        self.status = Status::Running;
        Ok(())
    }

    pub fn load_image_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<()> {
        let file = std::fs::File::open(path)?;
        self.load_image(std::io::BufReader::new(file))
    }

    pub fn save_image<W: std::io::Write>(&self, writer: W) -> Result<()> {
        coder_image::write(self.memory.as_slice(), writer)?;
        Ok(())
    }

    pub fn save_image_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.save_image(std::io::BufWriter::new(file))
    }

    fn fetch_advance(&mut self) -> Result<Cell> {
        let value = self.memory.read(self.pc)?;
        self.pc += 1;
        Ok(value)
    }

    /// Reads a two-cell operand (`addr_mode`, `address_value`) and
    /// resolves it to its value, eagerly.
    fn read_operand_value(&mut self) -> Result<Cell> {
        let mode_cell = self.fetch_advance()?;
        let addr_value = self.fetch_advance()?;
        let mode = AddrMode::decode(mode_cell).ok_or(Error::BadAddrMode {
            pc: self.pc,
            mode: mode_cell,
        })?;

        match mode {
            AddrMode::Value => Ok(addr_value),
            AddrMode::Immediate => self.memory.read(addr_value),
            AddrMode::Pointer => {
                let effective = self.memory.read(addr_value)?;
                self.memory.read(effective)
            }
        }
    }

    /// Reads a two-cell operand as a write target, returning the concrete
    /// address to write to. `VALUE` is illegal here.
    fn read_operand_target(&mut self) -> Result<Cell> {
        let mode_cell = self.fetch_advance()?;
        let addr_value = self.fetch_advance()?;
        let mode = AddrMode::decode(mode_cell).ok_or(Error::BadAddrMode {
            pc: self.pc,
            mode: mode_cell,
        })?;

        match mode {
            AddrMode::Value => Err(Error::BadAddrMode {
                pc: self.pc,
                mode: mode_cell,
            }),
            AddrMode::Immediate => Ok(addr_value),
            AddrMode::Pointer => self.memory.read(addr_value),
        }
    }

    fn push(&mut self, value: Cell) -> Result<()> {
        self.memory.write(self.sp, value)?;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Cell> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        self.memory.read(self.sp)
    }

    fn dispatch_interrupt(&mut self, number: Cell, io: &mut dyn IoPort) -> Result<()> {
        let interrupt = Interrupt::decode(number).ok_or(Error::BadInterrupt {
            pc: self.pc,
            number,
        })?;
        let vec = self.memory.read(self.interrupt_pointer + number)?;

        match interrupt {
            Interrupt::Input => {
                let key = io.read_key();
                self.memory.write(vec, key)?;
            }
            Interrupt::Screen => {
                let grid_w = self.grid_w();
                let grid_h = self.grid_h();
                for y in 0..grid_h {
                    for x in 0..grid_w {
                        let cell = self.memory.read(vec + y * grid_w + x)?;
                        let ch = (cell & 0xFF) as u8 as char;
                        io.output_text(
                            &ch.to_string(),
                            x * self.letter_w,
                            y * self.letter_h,
                            (0, 0, 255),
                        );
                    }
                }
                io.color((255, 255, 255));
                io.refresh();
            }
            Interrupt::Timeout => {
                let delay = self.memory.read(vec)?;
                io.timeout(delay.max(0) as u64);
            }
        }
        Ok(())
    }

    /// Executes exactly one instruction.
    pub fn step(&mut self, io: &mut dyn IoPort) -> Result<()> {
        let result = self.step_inner(io);
        if result.is_err() {
            self.status = Status::Error;
        }
        result
    }

    fn step_inner(&mut self, io: &mut dyn IoPort) -> Result<()> {
        let opcode_cell = self.fetch_advance()?;
        let opcode = OpCode::decode(opcode_cell).ok_or(Error::BadOpcode {
            pc: self.pc,
            opcode: opcode_cell,
        })?;

        match opcode {
            OpCode::Copy => {
                let src = self.read_operand_value()?;
                let dst = self.read_operand_target()?;
                self.memory.write(dst, src)?;
            }
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::And | OpCode::Or => {
                let lhs = self.read_operand_value()?;
                let rhs = self.read_operand_value()?;
                let dst = self.read_operand_target()?;
                let result = match opcode {
                    OpCode::Add => lhs.wrapping_add(rhs),
                    OpCode::Sub => lhs.wrapping_sub(rhs),
                    OpCode::Mul => lhs.wrapping_mul(rhs),
                    OpCode::Div => {
                        if rhs == 0 {
                            // Deliberate safety behavior carried over from the
                            // reference: division by zero leaves the
                            // dividend in place instead of faulting.
                            lhs
                        } else {
                            lhs.wrapping_div(rhs)
                        }
                    }
                    OpCode::And => lhs & rhs,
                    OpCode::Or => lhs | rhs,
                    _ => unreachable!(),
                };
                self.memory.write(dst, result)?;
            }
            OpCode::Test => {
                let lhs = self.read_operand_value()?;
                let test_cell = self.fetch_advance()?;
                let test = TestCode::decode(test_cell).ok_or(Error::BadTest {
                    pc: self.pc,
                    code: test_cell,
                })?;
                let rhs = self.read_operand_value()?;
                let pass = self.fetch_advance()?;
                let fail = self.fetch_advance()?;

                let diff = rhs.wrapping_sub(lhs);
                if test.evaluate(diff) {
                    if pass != TAKE_NO_JUMP {
                        self.pc = pass;
                    }
                } else if fail != TAKE_NO_JUMP {
                    self.pc = fail;
                }
            }
            OpCode::Jump => {
                let target = self.fetch_advance()?;
                self.pc = target;
            }
            OpCode::Jsub => {
                let target = self.read_operand_value()?;
                let return_addr = self.pc;
                self.push(return_addr)?;
                self.pc = target;
            }
            OpCode::Push => {
                let value = self.read_operand_value()?;
                self.push(value)?;
            }
            OpCode::Pop => {
                let dst = self.read_operand_target()?;
                let value = self.pop()?;
                self.memory.write(dst, value)?;
            }
            OpCode::Return => {
                let target = self.pop()?;
                self.pc = target;
            }
            OpCode::Halt => {
                self.status = Status::Idle;
            }
            OpCode::Interrupt => {
                let number = self.fetch_advance()?;
                self.dispatch_interrupt(number, io)?;
            }
        }

        Ok(())
    }

    /// Repeatedly steps while `status == Running` and the elapsed
    /// wall-clock time is under `timeout_ms`. Guarantees at least one
    /// step when `timeout_ms > 0` and the VM is runnable. Does not trap
    /// a step-level error: it stops the loop and returns it to the
    /// caller, who must resume or inspect `status`.
    pub fn run(&mut self, io: &mut dyn IoPort, timeout_ms: u64) -> Result<()> {
        let start = Instant::now();

        loop {
            if self.status != Status::Running {
                return Ok(());
            }

            self.step(io)?;

            if start.elapsed().as_millis() as u64 >= timeout_ms {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_port::NullIoPort;

    fn vm_with_memory(size: usize) -> Vm {
        let config = Config {
            memory: size,
            ..Config::default()
        };
        Vm::new(&config)
    }

    #[test]
    fn halt_sets_status_idle() {
        let mut vm = vm_with_memory(4);
        vm.memory_mut().write(0, 13).unwrap(); // halt
        vm.status = Status::Running;
        let mut io = NullIoPort::default();
        vm.step(&mut io).unwrap();
        assert_eq!(vm.status(), Status::Idle);
    }

    #[test]
    fn bad_opcode_sets_status_error() {
        let mut vm = vm_with_memory(4);
        vm.memory_mut().write(0, 99).unwrap();
        vm.status = Status::Running;
        let mut io = NullIoPort::default();
        assert!(vm.step(&mut io).is_err());
        assert_eq!(vm.status(), Status::Error);
    }

    #[test]
    fn copy_writes_literal_into_immediate_cell() {
        let mut vm = vm_with_memory(10);
        // copy $5 #6
        let mut mem = vec![0; 7];
        mem[0] = 0; // copy
        mem[1] = 0; // VALUE
        mem[2] = 5; // literal 5
        mem[3] = 1; // IMMEDIATE
        mem[4] = 6; // address 6
        mem[5] = 13; // halt
        for (i, v) in mem.iter().enumerate() {
            vm.memory_mut().write(i as Cell, *v).unwrap();
        }
        vm.status = Status::Running;
        let mut io = NullIoPort::default();
        vm.run(&mut io, 10).unwrap();
        assert_eq!(vm.memory().read(6).unwrap(), 5);
        assert_eq!(vm.status(), Status::Idle);
    }

    #[test]
    fn division_by_zero_writes_dividend_and_does_not_fault() {
        let mut vm = vm_with_memory(12);
        // div $9 $0 #10
        let prog = [4, 0, 9, 0, 0, 1, 10, 13];
        for (i, v) in prog.iter().enumerate() {
            vm.memory_mut().write(i as Cell, *v).unwrap();
        }
        vm.status = Status::Running;
        let mut io = NullIoPort::default();
        vm.run(&mut io, 10).unwrap();
        assert_eq!(vm.memory().read(10).unwrap(), 9);
        assert_eq!(vm.status(), Status::Idle);
    }

    #[test]
    fn push_faults_exactly_one_past_memory_bound() {
        let mut vm = vm_with_memory(2);
        // With a 2-cell memory and sp = 0, a single push at a VALUE
        // operand should succeed (writes cell 0) but a second would
        // need cell 1, which is the opcode slot here; instead verify
        // the raw boundary directly.
        assert!(vm.push(7).is_ok());
        assert_eq!(vm.sp(), 1);
        assert!(vm.push(8).is_ok());
        assert_eq!(vm.sp(), 2);
        assert!(vm.push(9).is_err());
    }

    #[test]
    fn pop_on_empty_stack_faults() {
        let mut vm = vm_with_memory(4);
        assert!(matches!(
            vm.pop(),
            Err(Error::StackUnderflow { .. })
        ));
    }

    #[test]
    fn test_take_no_jump_falls_through() {
        let mut vm = vm_with_memory(16);
        // test $1 = $1 [take-no-jump] [take-no-jump]; copy $77 #10; halt
        let prog: Vec<Cell> = vec![
            5, 0, 1, 0, 0, 1, -1, -1, // test
            0, 0, 77, 1, 10, // copy $77 #10
            13, // halt
        ];
        for (i, v) in prog.iter().enumerate() {
            vm.memory_mut().write(i as Cell, *v).unwrap();
        }
        vm.status = Status::Running;
        let mut io = NullIoPort::default();
        vm.run(&mut io, 10).unwrap();
        assert_eq!(vm.memory().read(10).unwrap(), 77);
    }
}
