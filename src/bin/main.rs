use std::env;
use std::process;

use chipotle8::logging::terminal_logger;
use chipotle8::{Config, Emulator, Result};
use sloggers::types::Severity;

const DEFAULT_CYCLES: u64 = 1000;

/// Run a program without a window: execute some number of cycles, then print whatever is
/// on the display
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let (rom, cycles) = match args.as_slice() {
        [_, rom] => (rom, DEFAULT_CYCLES),
        [_, rom, cycles] => match cycles.parse() {
            Ok(cycles) => (rom, cycles),
            Err(_) => usage(),
        },
        _ => usage(),
    };

    let logger = terminal_logger(Severity::Info)?;
    let mut emulator = Emulator::with_config(Config::default(), Some(logger));
    emulator.load_program_file(rom)?;

    for _ in 0..cycles {
        // a stopped emulator does nothing, so there's no point running out the count
        if emulator.cycle()?.is_none() {
            break;
        }
        emulator.decrement_timers_after_cycle();
    }

    print!("{}", emulator.snapshot().framebuffer_to_string());
    Ok(())
}

fn usage() -> ! {
    eprintln!("usage: chipotle8 <rom> [cycles]");
    process::exit(2)
}
