//! `coder compile <program>` assembles `<program>.asm` into
//! `<program>.prgm`; `coder run <program>` loads `<program>.prgm` and
//! drives it in a window until it halts or is closed.

mod window_port;

use std::fmt;
use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};

use coder_vm::{Config, Status, Vm};
use window_port::WindowPort;

const CONFIG_FILE: &str = "Config.txt";
const TICK_MS: u64 = 20;

#[derive(Parser, Debug)]
#[command(name = "coder", author, version, about = "Compile and run Coder assembly programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assembles PROGRAM.asm into PROGRAM.prgm
    Compile { program: String },
    /// Loads PROGRAM.prgm and runs it in a window
    Run { program: String },
}

#[derive(Debug)]
enum Error {
    Coder(coder_vm::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Coder(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl From<coder_vm::Error> for Error {
    fn from(err: coder_vm::Error) -> Error {
        Error::Coder(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

fn load_config() -> Config {
    if Path::new(CONFIG_FILE).exists() {
        match Config::from_file(CONFIG_FILE) {
            Ok(config) => return config,
            Err(err) => {
                eprintln!("warning: ignoring {}: {}", CONFIG_FILE, err);
            }
        }
    }
    Config::default()
}

fn compile(program: &str) -> Result<(), Error> {
    let config = load_config();
    let source = fs::read_to_string(format!("{}.asm", program))?;

    let mut vm = Vm::new(&config);
    let source_name = format!("{}.asm", program);
    coder_asm::assemble(&source_name, &source, &config, vm.memory_mut())?;
    vm.save_image_file(format!("{}.prgm", program))?;

    Ok(())
}

fn run(program: &str) -> Result<(), Error> {
    let config = load_config();
    let mut vm = Vm::new(&config);
    vm.load_image_file(format!("{}.prgm", program))?;

    let mut port = WindowPort::new(&config);

    while port.is_open() && vm.status() == Status::Running {
        port.pump();
        vm.run(&mut port, TICK_MS)?;
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Compile { program } => compile(program),
        Command::Run { program } => run(program),
    };

    if let Err(err) = result {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
