//! An implementation of the CHIP-8 virtual machine in Rust. The host owns an [`Emulator`],
//! loads a program into it, then repeatedly calls [`Emulator::cycle`] to run one instruction,
//! [`Emulator::tick`] (or [`Emulator::decrement_timers_after_cycle`]) to run the timers, and
//! feeds it key presses. Everything it draws is available through [`Emulator::graphics`] and
//! [`Emulator::snapshot`].
#[macro_use]
extern crate slog;

pub mod config;
pub mod error;
pub mod graphics;
pub mod keyboard;
pub mod logging;
pub mod op;
pub mod snapshot;
pub mod timer;


use std::convert::TryFrom;
use std::fs;
use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slog::Logger;

pub use crate::config::{Config, ShiftSource};
pub use crate::error::{Error, Result};
pub use crate::graphics::{Graphics, HEIGHT, WIDTH};
pub use crate::keyboard::{AsKeyboard, Key, Keyboard};
pub use crate::op::Op;
pub use crate::snapshot::Snapshot;
pub use crate::timer::{TimerClock, Timers};

// # Interpreter
// * 4096 (0x1000) bytes of memory
// * the font glyphs live in the first 80 bytes, programs are loaded at 0x200
// * 16 8-bit registers: V0 - VF
// * VF if used is the carry flag in addition operations, "no borrow" flag in subtraction, in draw
// operation the VF flag is set to denote pixel collision
// * the address register I is 16 bits wide
// * the stack is only used to store return addresses when subroutines are called

// # Timers
// * delay timer is used for events, it can be set and read
// * sound timer beeps when its value is nonzero

// # Input
// there is a 16 symbol hex keyboard with values 0 - F. There are 3 opcode that deal with handling input
//  - one skips an instruction if a specific key is pressed
//  - one skips an instruction if a specific key is NOT pressed
//  - waits for a key press and stores it in a register once it detects it

pub const MEMORY_SIZE: usize = 4096;
pub const STARTING_MEMORY_BYTE: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - STARTING_MEMORY_BYTE as usize;
pub const NUM_REGISTERS: usize = 16;
/// CHIP-8 can hold up to 16 return addresses
pub const STACK_DEPTH: usize = 16;

const FLAG: usize = 0xF;
const FONT_END: usize = graphics::FONT_START as usize + graphics::FONT_SET.len();

pub struct Emulator {
    memory: [u8; MEMORY_SIZE],

    stack: [u16; STACK_DEPTH],
    sp: usize, // number of return addresses on the stack

    addr: u16, // I, the address register
    pc: u16,

    // 16 8-bit registers. VF is used as a flag by several of the opcodes (see @Op)
    v: [u8; NUM_REGISTERS],

    timers: Timers,
    clock: TimerClock,

    graphics: Graphics,
    keyboard: Keyboard,

    // once set, cycle does nothing until the next load or reset
    stopped: bool,

    config: Config,
    rng: StdRng,
    logger: Logger,
}

impl Emulator {
    /// Create an emulator with the default configuration. Logging is discarded unless a
    /// logger is passed in. The emulator is stopped until a program gets loaded
    pub fn new(logger: Option<Logger>) -> Self {
        Emulator::with_config(Config::default(), logger)
    }

    pub fn with_config(config: Config, logger: Option<Logger>) -> Self {
        let logger = logger
            .unwrap_or_else(logging::discard_logger)
            .new(o!("component" => "cpu"));

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut emulator = Emulator {
            memory: [0; MEMORY_SIZE],
            stack: [0; STACK_DEPTH],
            sp: 0,
            addr: 0,
            pc: STARTING_MEMORY_BYTE,
            v: [0; NUM_REGISTERS],
            timers: Timers::default(),
            clock: TimerClock::new(Duration::from_millis(config.timer_interval_ms)),
            graphics: Graphics::new(),
            keyboard: Keyboard::new(),
            stopped: true,
            config,
            rng,
            logger,
        };
        emulator.reset();
        emulator
    }

    /// Create an emulator and load the program stored at `path`
    pub fn with_game_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut emulator = Emulator::new(None);
        emulator.load_program_file(path)?;
        Ok(emulator)
    }

    /// Put the machine back the way it was at power on: memory zeroed apart from the font,
    /// registers, stack, timers, keys and display cleared, and the program counter at 0x200.
    /// The emulator stays stopped until a program is loaded
    pub fn reset(&mut self) {
        self.memory = [0; MEMORY_SIZE];
        self.memory[graphics::FONT_START as usize..FONT_END].copy_from_slice(&graphics::FONT_SET);

        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        self.addr = 0;
        self.pc = STARTING_MEMORY_BYTE;
        self.v = [0; NUM_REGISTERS];
        self.timers = Timers::default();
        self.clock.restart();
        self.graphics.clear();
        self.keyboard = Keyboard::new();
        self.stopped = true;

        info!(self.logger, "reset");
    }

    /// Reset the machine, copy `program` to 0x200 and start running it. A program that
    /// doesn't fit leaves the machine as it was
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        self.reset();
        let start = STARTING_MEMORY_BYTE as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
        self.stopped = false;

        info!(self.logger, "loaded program"; "bytes" => program.len());
        Ok(())
    }

    /// Read the program at `path` and load it. If the file can't be read the machine is
    /// left as it was
    pub fn load_program_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let program = fs::read(path).map_err(|source| Error::ProgramLoad {
            path: path.to_path_buf(),
            source,
        })?;

        info!(self.logger, "read program file"; "path" => path.display().to_string());
        self.load_program(&program)
    }

    /// Stop executing instructions. Only a load or reset starts things up again
    pub fn stop(&mut self) {
        if !self.stopped {
            info!(self.logger, "stopped"; "pc" => format!("{:#05X}", self.pc));
        }
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// True while FX0A is blocking on a key press
    pub fn is_waiting_for_key(&self) -> bool {
        self.keyboard.is_blocking()
    }

    /// Fetch, decode and execute the instruction at the program counter. Returns the op that
    /// ran, or None if the emulator is stopped. Unknown instructions and stack faults stop
    /// the emulator and are returned as errors
    pub fn cycle(&mut self) -> Result<Option<Op>> {
        if self.stopped {
            return Ok(None);
        }

        let pc = self.pc;
        let instr = self.fetch();
        let op = match Op::try_from(instr) {
            Ok(op) => op,
            Err(opcode) => return Err(self.halt(Error::UnknownInstruction { opcode, pc })),
        };

        trace!(self.logger, "execute";
            "pc" => format!("{:#05X}", pc),
            "instr" => format!("{:#06X}", instr),
            "op" => format!("{:?}", op));

        match self.execute(op) {
            Ok(()) => Ok(Some(op)),
            Err(e) => Err(self.halt(e)),
        }
    }

    /// Read the big-endian instruction word at the program counter
    fn fetch(&self) -> u16 {
        let hi = self.read_byte(self.pc) as u16;
        let lo = self.read_byte(self.pc.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn halt(&mut self, e: Error) -> Error {
        error!(self.logger, "halting"; "error" => e.to_string());
        self.stopped = true;
        e
    }

    /// Run a single, already decoded op against the machine state. Every op either moves
    /// the program counter to the next instruction, skips one, jumps, or (FX0A only) stays
    /// put
    pub(crate) fn execute(&mut self, op: Op) -> Result<()> {
        match op {
            Op::DispClear => {
                self.graphics.clear();
                self.next();
            }
            Op::Return => {
                if self.sp == 0 {
                    return Err(Error::StackUnderflow { pc: self.pc });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
                debug!(self.logger, "return"; "to" => format!("{:#05X}", self.pc), "depth" => self.sp);
            }
            Op::Goto(addr) => self.pc = addr,
            Op::GotoSubRtn(addr) => {
                if self.sp == STACK_DEPTH {
                    return Err(Error::StackOverflow { pc: self.pc });
                }
                self.stack[self.sp] = self.pc.wrapping_add(2);
                self.sp += 1;
                self.pc = addr;
                debug!(self.logger, "call"; "to" => format!("{:#05X}", addr), "depth" => self.sp);
            }
            Op::CondVxEq(x, byte) => self.skip_if(self.v[x as usize] == byte),
            Op::CondVxNe(x, byte) => self.skip_if(self.v[x as usize] != byte),
            Op::CondVxVyEq(x, y) => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            Op::ConstSetVx(x, byte) => {
                self.v[x as usize] = byte;
                self.next();
            }
            Op::ConstAddVx(x, byte) => {
                self.v[x as usize] = self.v[x as usize].wrapping_add(byte);
                self.next();
            }
            Op::AssignVyToVx(x, y) => self.alu(x, y, |_, vy| (vy, None)),
            Op::BitOpOr(x, y) => self.alu(x, y, |vx, vy| (vx | vy, None)),
            Op::BitOpAnd(x, y) => self.alu(x, y, |vx, vy| (vx & vy, None)),
            Op::BitOpXor(x, y) => self.alu(x, y, |vx, vy| (vx ^ vy, None)),
            Op::MathVxAddVy(x, y) => self.alu(x, y, |vx, vy| {
                let (sum, carry) = vx.overflowing_add(vy);
                (sum, Some(carry as u8))
            }),
            Op::MathVxMinusVy(x, y) => {
                self.alu(x, y, |vx, vy| (vx.wrapping_sub(vy), Some((vx >= vy) as u8)))
            }
            Op::BitOpRtShift(x, y) => {
                let operand = self.shift_operand(x, y);
                self.alu(x, y, |_, _| (operand >> 1, Some(operand & 1)))
            }
            Op::MathVyMinusVx(x, y) => {
                self.alu(x, y, |vx, vy| (vy.wrapping_sub(vx), Some((vy >= vx) as u8)))
            }
            Op::BitOpLftShift(x, y) => {
                let operand = self.shift_operand(x, y);
                self.alu(x, y, |_, _| (operand << 1, Some(operand >> 7)))
            }
            Op::CondVxVyNe(x, y) => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            Op::MemSetI(addr) => {
                self.addr = addr;
                self.next();
            }
            Op::GotoPlusV0(addr) => self.pc = addr.wrapping_add(self.v[0] as u16),
            Op::Rand(x, byte) => {
                self.v[x as usize] = self.rng.gen::<u8>() & byte;
                self.next();
            }
            Op::DispDraw(x, y, height) => {
                let rows: Vec<u8> = (0..height as u16)
                    .map(|row| self.read_byte(self.addr.wrapping_add(row)))
                    .collect();
                let collision =
                    self.graphics
                        .draw_sprite(self.v[x as usize], self.v[y as usize], &rows);
                self.v[FLAG] = collision as u8;
                self.next();
            }
            Op::KeyOpEqVx(x) => {
                let key = (self.v[x as usize] & 0xF) as usize;
                self.skip_if(self.keyboard.get_key_state(key))
            }
            Op::KeyOpNeVx(x) => {
                let key = (self.v[x as usize] & 0xF) as usize;
                self.skip_if(!self.keyboard.get_key_state(key))
            }
            Op::DelayGet(x) => {
                self.v[x as usize] = self.timers.delay;
                self.next();
            }
            Op::KeyOpGet(x) => self.wait_for_key(x),
            Op::DelaySet(x) => {
                self.timers.delay = self.v[x as usize];
                self.next();
            }
            Op::SoundSet(x) => {
                self.timers.sound = self.v[x as usize];
                self.next();
            }
            Op::MemIPlusEqVx(x) => {
                let vx = self.v[x as usize] as u16;
                let overflow = self.addr as u32 + vx as u32 > 0xFFF;
                self.addr = self.addr.wrapping_add(vx);
                if self.config.index_overflow_sets_flag {
                    self.v[FLAG] = overflow as u8;
                }
                self.next();
            }
            Op::MemISetSprite(x) => {
                self.addr = graphics::font_char_addr(self.v[x as usize]);
                self.next();
            }
            Op::Bcd(x) => {
                let value = self.v[x as usize];
                self.write_byte(self.addr, value / 100);
                self.write_byte(self.addr.wrapping_add(1), value / 10 % 10);
                self.write_byte(self.addr.wrapping_add(2), value % 10);
                self.next();
            }
            Op::RegDump(x) => {
                for i in 0..=x {
                    self.write_byte(self.addr.wrapping_add(i as u16), self.v[i as usize]);
                }
                self.advance_index_after_load_store(x);
                self.next();
            }
            Op::RegLoad(x) => {
                for i in 0..=x {
                    self.v[i as usize] = self.read_byte(self.addr.wrapping_add(i as u16));
                }
                self.advance_index_after_load_store(x);
                self.next();
            }
        }

        Ok(())
    }

    fn next(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    fn skip_if(&mut self, condition: bool) {
        let step = if condition { 4 } else { 2 };
        self.pc = self.pc.wrapping_add(step);
    }

    /// Register-register ops. `f` gets VX and VY and returns the new VX and, for ops that
    /// define one, the new VF. VF is written after VX so the flag wins when X is F
    fn alu<F>(&mut self, x: u8, y: u8, f: F)
    where
        F: FnOnce(u8, u8) -> (u8, Option<u8>),
    {
        let (result, flag) = f(self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = result;
        if let Some(flag) = flag {
            self.v[FLAG] = flag;
        }
        self.next();
    }

    fn shift_operand(&self, x: u8, y: u8) -> u8 {
        match self.config.shift_source {
            ShiftSource::Vx => self.v[x as usize],
            ShiftSource::Vy => self.v[y as usize],
        }
    }

    fn advance_index_after_load_store(&mut self, x: u8) {
        if self.config.load_store_increments_index {
            self.addr = self.addr.wrapping_add(x as u16 + 1);
        }
    }

    /// FX0A. The first time through we start waiting; after that we only move on once a
    /// key goes down that wasn't down on the previous cycle
    fn wait_for_key(&mut self, x: u8) {
        if !self.keyboard.is_blocking() {
            self.keyboard.block(x);
            debug!(self.logger, "waiting for key"; "register" => x);
            return;
        }

        if let Some((register, key)) = self.keyboard.poll_key_press() {
            self.v[register as usize] = key;
            self.next();
            debug!(self.logger, "key pressed"; "register" => register, "key" => key);
        }
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEMORY_SIZE]
    }

    /// Store a byte on behalf of a running program. The font is read only
    fn write_byte(&mut self, addr: u16, value: u8) {
        let idx = addr as usize % MEMORY_SIZE;
        if idx >= graphics::FONT_START as usize && idx < FONT_END {
            warn!(self.logger, "ignoring write into the font"; "addr" => format!("{:#05X}", idx));
            return;
        }
        self.memory[idx] = value;
    }

    /// Run the timers down by one tick. Hosts call this at a fixed rate, independently
    /// of `cycle`
    pub fn tick(&mut self) {
        self.timers.tick(self.config.timer_step);
    }

    /// Apply however many timer ticks have come due on the wall clock since the last call
    pub fn decrement_timers_after_cycle(&mut self) {
        let ticks = self.clock.elapsed_ticks();
        for _ in 0..ticks {
            self.tick();
        }
        if ticks > 0 {
            debug!(self.logger, "timers ticked";
                "ticks" => ticks,
                "delay" => self.timers.delay,
                "sound" => self.timers.sound);
        }
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.timers.delay = value;
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.timers.sound = value;
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    /// True while the sound timer is running, i.e. while a host should be beeping
    pub fn is_sound_active(&self) -> bool {
        self.timers.is_sound_active()
    }

    /// Press (`down == true`) or release one of the 16 keys
    pub fn set_key_state(&mut self, code: u8, down: bool) -> Result<()> {
        if !self.keyboard.set_key_state(code as usize, down) {
            warn!(self.logger, "ignoring unknown key"; "code" => code);
            return Err(Error::InvalidKey(code));
        }
        Ok(())
    }

    /// Check for key press changes and update the emulator with which keys are up or down
    pub fn handle_key_input(&mut self, keyboard: &impl AsKeyboard) {
        self.keyboard.update_keyboard_with_keys(&keyboard.keys_down());
    }

    pub fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    /// The display as 0RGB pixels, `WIDTH` x `HEIGHT`
    pub fn get_pixels(&self) -> Vec<u32> {
        self.graphics.pixels()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy out the machine state for rendering or inspection
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            v: self.v,
            i: self.addr,
            pc: self.pc,
            stack: self.stack[..self.sp].to_vec(),
            delay_timer: self.timers.delay,
            sound_timer: self.timers.sound,
            memory: self.memory.to_vec(),
            framebuffer: self.graphics.as_slice().to_vec(),
            keys: self.keyboard.key_states(),
            waiting_for_key: self.keyboard.is_blocking(),
            stopped: self.stopped,
        }
    }
}
