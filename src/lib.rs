//! Core of the Coder toy computing stack: the instruction-set
//! architecture, the bounds-checked memory model, the VM execution loop
//! and its interrupt mechanism, and the `Config`/`Error` types shared by
//! the assembler (`coder-asm`), the image format (`coder-image`) and the
//! CLI (`coder-cli`).
//!
//! The ISA enumerations in [`isa`] are the single source of truth for the
//! numeric encoding: the assembler emits exactly the integers the VM in
//! [`vm`] decodes.

extern crate num;
#[macro_use]
extern crate num_derive;

pub mod config;
pub mod error;
pub mod io_port;
pub mod isa;
pub mod memory;
pub mod vm;


pub use config::Config;
pub use error::Error;
pub use io_port::{IoPort, NullIoPort};
pub use memory::Memory;
pub use vm::{Status, Vm};

/// A single Memory cell. Signed, wraps on arithmetic overflow.
pub type Cell = i32;
