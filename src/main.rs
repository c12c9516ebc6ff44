use std::io::{self, Write};
use std::process;

use anyhow::{Context as _, Result};
use clap::Parser;
use yansi::Paint;

use takeskip::interpreter::{self, Context, Remnant};
use takeskip::{BitBuffer, Command, InputFormat, parse_command};

#[derive(Parser)]
#[command(name = "takeskip")]
#[command(
    about = "Take-skip is a compact language for slicing, reversing, inverting and rearranging bit sequences."
)]
struct Cli {
    /// Command string to execute, e.g. "s4t4b8t4"
    command: String,

    /// Optional files to process; each line is a row of bits
    files: Vec<String>,

    /// What to do with unconsumed bits: remove, keep or pad
    #[arg(short = 'r', long = "remnant", default_value = "remove")]
    remnant: Remnant,

    /// Input format: text or csv
    #[arg(short = 'f', long = "format", default_value = "text")]
    format: InputFormat,

    /// Output as JSON
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Print the parsed command list instead of executing it
    #[arg(short = 'e', long = "explain")]
    explain: bool,

    /// Print each executed command and the cursor movement to stderr
    #[arg(long = "trace")]
    trace: bool,

    /// Disable coloured diagnostics
    #[arg(long = "no-color")]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        yansi::disable();
    }

    let commands = match parse_command(&cli.command) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e.caret(&cli.command));
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &commands) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli, commands: &[Command]) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if cli.explain {
        if cli.json {
            serde_json::to_writer_pretty(&mut handle, commands)?;
            writeln!(handle)?;
        } else {
            for command in commands {
                writeln!(handle, "{:?}", command)?;
            }
        }
        return Ok(());
    }

    let input = if cli.files.is_empty() {
        BitBuffer::from_stdin(cli.format)
    } else {
        BitBuffer::from_files(&cli.files[..], cli.format)
    }
    .context("error reading input")?;

    let output = if cli.trace {
        execute_traced(commands, &input, cli.remnant)?
    } else {
        interpreter::execute(commands, &input, cli.remnant)?
    };

    if cli.json {
        serde_json::to_writer_pretty(&mut handle, &output)?;
    } else {
        write!(handle, "{}", output)?;
    }
    writeln!(handle)?;
    Ok(())
}

/// Execute step by step, reporting each command on stderr.
fn execute_traced(commands: &[Command], input: &BitBuffer, remnant: Remnant) -> Result<BitBuffer> {
    let mut ctx = Context::new(input);
    for (i, command) in commands.iter().enumerate() {
        let step = ctx.execute(command).map_err(|e| e.with_command(i))?;
        eprintln!(
            "{} {:<12} cursor {} -> {}, emitted {}",
            format!("[{}]", i).dim(),
            command.to_string(),
            step.cursor_before,
            step.cursor_after,
            step.emitted
        );
    }
    eprintln!("{} remnant {}", "[end]".dim(), remnant);
    Ok(ctx.finish(remnant)?)
}
