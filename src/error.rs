use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while loading or running a CHIP-8 program.
///
/// `ProgramLoad`, `ProgramTooLarge`, `InvalidKey` and the configuration/logger variants are
/// reported to the caller and leave the machine untouched. `UnknownInstruction`,
/// `StackOverflow` and `StackUnderflow` are fatal to the running program: the emulator stops
/// and will not execute again until a program is loaded or it is reset.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read program {path:?}: {source}")]
    ProgramLoad { path: PathBuf, source: io::Error },

    #[error("program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("unknown instruction {opcode:#06X} at {pc:#05X}")]
    UnknownInstruction { opcode: u16, pc: u16 },

    #[error("call stack overflow at {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack at {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("key code {0:#X} is outside the 16 key keypad")]
    InvalidKey(u8),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unable to build logger: {0}")]
    Logger(#[source] io::Error),
}

impl Error {
    /// True for the faults that halt emulation
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnknownInstruction { .. } | Error::StackOverflow { .. } | Error::StackUnderflow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors() {
        assert!(Error::UnknownInstruction { opcode: 0x8FAF, pc: 0x200 }.is_fatal());
        assert!(Error::StackOverflow { pc: 0x200 }.is_fatal());
        assert!(Error::StackUnderflow { pc: 0x200 }.is_fatal());
        assert!(!Error::InvalidKey(0x10).is_fatal());
        assert!(!Error::ProgramTooLarge { size: 4000, max_size: 3584 }.is_fatal());
    }

    #[test]
    fn unknown_instruction_message() {
        let err = Error::UnknownInstruction { opcode: 0x8FAF, pc: 0x20A };
        assert_eq!(err.to_string(), "unknown instruction 0x8FAF at 0x20A");
    }
}
