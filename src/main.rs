use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, error, info};
use rust_rowstore::command::HELP;
use rust_rowstore::{Executed, Input, MetaCommand, Table};

/// In-memory paged row store with a tiny SQL-like prompt.
#[derive(Parser, Debug)]
#[command(name = "rust-rowstore", version)]
struct Cli {
    /// Text printed before each command
    #[arg(long, default_value = "db > ")]
    prompt: String,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,
}

struct InputBuffer {
    buffer: String,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Reads one line; `false` once input is exhausted.
    fn read_input(&mut self, reader: &mut impl BufRead) -> io::Result<bool> {
        self.buffer.clear();
        if reader.read_line(&mut self.buffer)? == 0 {
            return Ok(false);
        }
        self.buffer = self.buffer.trim().to_string();
        Ok(true)
    }
}

fn print_prompt(out: &mut impl Write, prompt: &str) -> io::Result<()> {
    write!(out, "{prompt}")?;
    out.flush()
}

fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt(&mut out, &cli.prompt).context("writing prompt")?;
        if !input_buffer.read_input(&mut input).context("reading input")? {
            debug!("end of input");
            break;
        }
        if input_buffer.buffer.is_empty() {
            continue;
        }

        let statement = match Input::parse(&input_buffer.buffer) {
            Ok(Input::Meta(MetaCommand::Exit)) => break,
            Ok(Input::Meta(MetaCommand::Help)) => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Ok(Input::Statement(statement)) => statement,
            Err(err) => {
                writeln!(out, "{err}")?;
                continue;
            }
        };

        match statement.execute(&mut table) {
            Ok(Executed::Inserted { .. }) => writeln!(out, "Executed.")?,
            Ok(Executed::Selected(rows)) => {
                let mut count = 0;
                for row in rows {
                    writeln!(out, "{row}")?;
                    count += 1;
                }
                writeln!(out, "{count} rows returned")?;
            }
            Err(err) => writeln!(out, "{err}")?,
        }
    }

    info!("session closed with {} rows", table.len());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.debug);

    if let Err(e) = run(&cli) {
        error!("{e:?}");
        std::process::exit(1);
    }
}
