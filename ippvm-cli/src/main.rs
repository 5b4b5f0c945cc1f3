//! IPPcode CLI: assemble, check, disassemble and run programs.
//!
//! Exit codes:
//! - 0: Success (or the program's own `EXIT` code, 0 to 9)
//! - 10: Bad command-line usage
//! - 11 / 12: Input file / output failure
//! - 31 / 32: Unparsable source / malformed program structure
//! - 52 to 58: Runtime error classes
//! - 99: Internal error (including the step limit)

mod commands;

use ippvm_common::ErrorKind;
use std::process;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(ErrorKind::Parameter.exit_code());
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "check" => commands::check(&args[2..]),
        "assemble" => commands::assemble(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(ErrorKind::Parameter.exit_code());
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Install a stderr subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=ippvm_vm=trace` to trace every executed instruction.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn print_usage() {
    eprintln!("Usage: ippvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run [--source=FILE] [--input=FILE] [--format=text|json|xml] [--max-steps=N]");
    eprintln!("                                   Load and execute a program; the omitted");
    eprintln!("                                   one of source/input is read from stdin");
    eprintln!("  check <FILE> [--format=F]        Load and validate a program");
    eprintln!("  assemble <FILE> [-o OUT]         Convert source text to JSON records");
    eprintln!("  disassemble <FILE> [--format=F]  Print a program as canonical source text");
}
