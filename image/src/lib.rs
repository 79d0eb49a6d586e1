//! Serializes and deserializes a Memory image as a whitespace-separated
//! decimal text stream.
//!
//! Deliberately standalone, the way the teacher's `vexfile` crate knows
//! nothing about `vcpu::Memory` and instead reads/writes plain `Vec<u8>`:
//! this crate reads/writes plain `Vec<i32>`, and `coder-vm` is the one
//! that knows how to pour that into a `Memory`. Errors are plain
//! `std::io::Error`, converted into the workspace's shared `Error` type
//! by whoever calls in.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reads whitespace-separated integers in order, one cell each.
pub fn read<R: Read>(mut reader: R) -> io::Result<Vec<i32>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    text.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("not an integer: \"{}\"", token),
                )
            })
        })
        .collect()
}

/// Writes exactly `cells.len()` integers, newline-separated.
pub fn write<W: Write>(cells: &[i32], mut writer: W) -> io::Result<()> {
    for cell in cells {
        writeln!(writer, "{}", cell)?;
    }
    Ok(())
}

pub trait ReadImageExt: Read + Sized {
    fn read_image(self) -> io::Result<Vec<i32>> {
        read(self)
    }
}

impl<R: Read + Sized> ReadImageExt for R {}

pub trait WriteImageExt: Write + Sized {
    fn write_image(self, cells: &[i32]) -> io::Result<()> {
        write(cells, self)
    }
}

impl<W: Write + Sized> WriteImageExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<i32>> {
    BufReader::new(File::open(path)?).read_image()
}

pub fn write_file<P: AsRef<Path>>(path: P, cells: &[i32]) -> io::Result<()> {
    BufWriter::new(File::create(path)?).write_image(cells)
}

#[cfg(test)]
mod test;
