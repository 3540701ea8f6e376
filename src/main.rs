use clap::Parser;
use lc3_vm::emulator::{Emulator, ExitReason, IllegalOpcodePolicy};
use lc3_vm::terminal;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// LC-3 virtual machine
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Program images to load, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Address at which to start executing, decimal or hex with `0x` or `x` prefix.
    #[arg(long, value_parser = parse_address)]
    start: Option<u16>,

    /// Stop on illegal opcodes and unknown trap vectors instead of skipping them.
    #[arg(long)]
    strict: bool,
}

fn parse_address(s: &str) -> Result<u16, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('x'));
    let parsed = match hex {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s}: {e}"))
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let policy = if args.strict {
        IllegalOpcodePolicy::Halt
    } else {
        IllegalOpcodePolicy::Ignore
    };
    let mut emu = Emulator::new().with_illegal_opcode_policy(policy);
    for image in &args.images {
        if let Err(e) = emu.load_image(image) {
            eprintln!("Failed to load program: {e}");
            return ExitCode::from(ExitReason::ImageLoadFailed(e).exit_code());
        }
    }
    emu.reset(args.start);

    let reason = {
        let lock = terminal::set_terminal_raw();
        let mut stdout = terminal::RawModeWriter::new(io::stdout(), lock.is_active());
        emu.run_with_output(&mut stdout)
    };
    match &reason {
        ExitReason::Halted => {}
        ExitReason::Interrupted => eprintln!("Interrupted"),
        other => eprintln!("{other}"),
    }
    ExitCode::from(reason.exit_code())
}
