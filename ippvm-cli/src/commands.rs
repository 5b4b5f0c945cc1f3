//! CLI command implementations.
//!
//! Every command returns `Err(exit_code)` after printing its diagnostics,
//! so `main` only has to exit with the code.

use ippvm_common::{ErrorKind, Program, RawProgram};
use ippvm_vm::io::{LineInput, StreamOutput};
use ippvm_vm::{build_labels, run_with_config, Outcome, VmConfig};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::Path;
use tracing::debug;

/// Program representation on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// IPPcode24 source text.
    Text,
    /// Raw instruction records as JSON.
    Json,
    /// The IPPcode24 XML program form.
    Xml,
}

impl Format {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Format::Text),
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    /// JSON for `*.json` files, XML for `*.xml`, text otherwise.
    fn for_path(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Format::Json,
            Some("xml") => Format::Xml,
            _ => Format::Text,
        }
    }
}

/// Print `error: <message>` and return the kind's exit code.
fn fail(message: impl Display, kind: ErrorKind) -> i32 {
    eprintln!("error: {message}");
    kind.exit_code()
}

fn usage_error(message: &str, usage: &str) -> i32 {
    eprintln!("error: {message}");
    eprintln!("Usage: {usage}");
    ErrorKind::Parameter.exit_code()
}

fn read_file(path: &str) -> Result<String, i32> {
    fs::read_to_string(path)
        .map_err(|e| fail(format_args!("cannot read '{path}': {e}"), ErrorKind::InputFile))
}

fn read_stdin() -> Result<String, i32> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| fail(format_args!("cannot read stdin: {e}"), ErrorKind::InputFile))?;
    Ok(text)
}

/// Parse raw records in the given format.
fn parse_raw(text: &str, format: Format) -> Result<RawProgram, i32> {
    match format {
        Format::Text => ippvm_assembler::assemble(text).map_err(|e| fail(&e, e.kind())),
        Format::Json => RawProgram::from_json(text).map_err(|e| fail(&e, e.kind())),
        Format::Xml => RawProgram::from_xml(text).map_err(|e| fail(&e, e.kind())),
    }
}

/// Parse, verify and bind a program.
fn load(text: &str, format: Format) -> Result<Program, i32> {
    let raw = parse_raw(text, format)?;
    debug!(records = raw.len(), ?format, "parsed program records");

    if let Err(errors) = ippvm_verifier::verify(&raw) {
        for e in &errors {
            eprintln!("error: {e}");
        }
        return Err(errors[0].kind().exit_code());
    }

    Program::from_raw(&raw).map_err(|e| fail(&e, e.kind()))
}

/// Options shared by the single-file commands.
struct FileArgs<'a> {
    path: &'a str,
    format: Format,
    output: Option<&'a str>,
}

fn parse_file_args<'a>(args: &'a [String], usage: &str, allow_output: bool) -> Result<FileArgs<'a>, i32> {
    let mut path = None;
    let mut format = None;
    let mut output = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if let Some(name) = arg.strip_prefix("--format=") {
            format = Some(
                Format::parse(name)
                    .ok_or_else(|| usage_error(&format!("unknown format '{name}'"), usage))?,
            );
        } else if arg == "-o" && allow_output {
            let target = iter
                .next()
                .ok_or_else(|| usage_error("-o requires a file name", usage))?;
            output = Some(target.as_str());
        } else if arg.starts_with('-') {
            return Err(usage_error(&format!("unknown option '{arg}'"), usage));
        } else if path.is_none() {
            path = Some(arg.as_str());
        } else {
            return Err(usage_error(&format!("unexpected argument '{arg}'"), usage));
        }
    }

    let path = path.ok_or_else(|| usage_error("an input file is required", usage))?;
    Ok(FileArgs {
        path,
        format: format.unwrap_or_else(|| Format::for_path(path)),
        output,
    })
}

// ---- run ----

struct RunOptions {
    source: Option<String>,
    input: Option<String>,
    format: Option<Format>,
    max_steps: Option<u64>,
}

const RUN_USAGE: &str =
    "ippvm run [--source=FILE] [--input=FILE] [--format=text|json|xml] [--max-steps=N]";

impl RunOptions {
    fn parse(args: &[String]) -> Result<Self, i32> {
        let mut options = RunOptions {
            source: None,
            input: None,
            format: None,
            max_steps: None,
        };

        for arg in args {
            if let Some(path) = arg.strip_prefix("--source=") {
                options.source = Some(path.to_string());
            } else if let Some(path) = arg.strip_prefix("--input=") {
                options.input = Some(path.to_string());
            } else if let Some(name) = arg.strip_prefix("--format=") {
                options.format = Some(
                    Format::parse(name)
                        .ok_or_else(|| usage_error(&format!("unknown format '{name}'"), RUN_USAGE))?,
                );
            } else if let Some(n) = arg.strip_prefix("--max-steps=") {
                options.max_steps = Some(n.parse().map_err(|_| {
                    usage_error(&format!("invalid step limit '{n}'"), RUN_USAGE)
                })?);
            } else {
                return Err(usage_error(&format!("unknown option '{arg}'"), RUN_USAGE));
            }
        }

        if options.source.is_none() && options.input.is_none() {
            return Err(usage_error(
                "at least one of --source and --input is required",
                RUN_USAGE,
            ));
        }
        Ok(options)
    }
}

/// Load and execute a program.
///
/// Exits with the program's EXIT code, or the error kind's code on failure.
pub fn run(args: &[String]) -> Result<(), i32> {
    let options = RunOptions::parse(args)?;

    let (text, format) = match &options.source {
        Some(path) => (
            read_file(path)?,
            options.format.unwrap_or_else(|| Format::for_path(path)),
        ),
        None => (read_stdin()?, options.format.unwrap_or(Format::Text)),
    };
    let program = load(&text, format)?;

    let config = match options.max_steps {
        Some(limit) => VmConfig::new().with_max_steps(limit),
        None => VmConfig::new(),
    };

    let stdout = io::stdout();
    let mut output = StreamOutput::new(BufWriter::new(stdout.lock()), io::stderr());

    let result = match &options.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                fail(format_args!("cannot open '{path}': {e}"), ErrorKind::InputFile)
            })?;
            let mut input = LineInput::new(BufReader::new(file));
            run_with_config(&program, &mut input, &mut output, config)
        }
        None => {
            let stdin = io::stdin();
            let mut input = LineInput::new(stdin.lock());
            run_with_config(&program, &mut input, &mut output, config)
        }
    };

    // Output written before a failure is still delivered.
    output
        .flush()
        .map_err(|e| fail(format_args!("cannot write output: {e}"), ErrorKind::OutputFile))?;

    match result {
        Ok(Outcome::Completed) | Ok(Outcome::Exited(0)) => Ok(()),
        Ok(outcome) => Err(outcome.exit_code()),
        Err(e) => Err(fail(&e, e.kind())),
    }
}

// ---- check / assemble / disassemble ----

/// Load and validate a program without executing it.
pub fn check(args: &[String]) -> Result<(), i32> {
    let file = parse_file_args(args, "ippvm check <FILE> [--format=text|json|xml]", false)?;
    let text = read_file(file.path)?;
    let program = load(&text, file.format)?;

    build_labels(&program).map_err(|e| fail(&e, e.kind()))?;

    println!("OK: {} ({} instructions)", file.path, program.len());
    Ok(())
}

/// Convert IPPcode24 source text into JSON records.
pub fn assemble(args: &[String]) -> Result<(), i32> {
    let file = parse_file_args(args, "ippvm assemble <FILE> [-o OUT]", true)?;
    let text = read_file(file.path)?;
    let raw = parse_raw(&text, Format::Text)?;
    let json = raw
        .to_json()
        .map_err(|e| fail(format_args!("cannot encode records: {e}"), ErrorKind::Internal))?;

    match file.output {
        Some(target) => {
            fs::write(target, format!("{json}\n")).map_err(|e| {
                fail(format_args!("cannot write '{target}': {e}"), ErrorKind::OutputFile)
            })?;
            eprintln!("assembled {} instructions -> {target}", raw.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Print a program as canonical source text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    let file = parse_file_args(
        args,
        "ippvm disassemble <FILE> [--format=text|json|xml]",
        false,
    )?;
    let text = read_file(file.path)?;
    let program = load(&text, file.format)?;
    print!("{}", ippvm_assembler::disassemble(&program));
    Ok(())
}
