//! `Config.txt` loader: lines of `key=value`, unrecognized lines are
//! comments, but a line that *does* parse as `key=value` with an unknown
//! key is an error — the strictness the spec asks for to catch typos.

use std::io::{self, BufRead};

use crate::error::{Error, Result};
use crate::Cell;

/// Default memory size when no `Config.txt` is supplied (spec.md §3).
pub const DEFAULT_MEMORY: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub width: Cell,
    pub height: Cell,
    pub letter_w: Cell,
    pub letter_h: Cell,
    pub memory: usize,
    pub program: Cell,
    pub stack: Cell,
    pub interrupt: Cell,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            width: 640,
            height: 480,
            letter_w: 8,
            letter_h: 16,
            memory: DEFAULT_MEMORY,
            program: 0,
            stack: 0,
            interrupt: 0,
        }
    }
}

impl Config {
    pub fn grid_w(&self) -> Cell {
        self.width / self.letter_w
    }

    pub fn grid_h(&self) -> Cell {
        self.height / self.letter_h
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Config> {
        let mut config = Config::default();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            let mut parts = line.splitn(2, '=');
            let key = match parts.next() {
                Some(key) => key.trim(),
                None => continue,
            };
            let value = match parts.next() {
                Some(value) => value.trim(),
                // No '=' on the line at all: treat the whole line as a comment.
                None => continue,
            };

            let parsed: Cell = match value.parse() {
                Ok(v) => v,
                Err(_) => return Err(Error::ConfigError(key.to_string())),
            };

            match key {
                "width" => config.width = parsed,
                "height" => config.height = parsed,
                "letter-w" => config.letter_w = parsed,
                "letter-h" => config.letter_h = parsed,
                "memory" => config.memory = parsed as usize,
                "program" => config.program = parsed,
                "stack" => config.stack = parsed,
                "interrupt" => config.interrupt = parsed,
                _ => return Err(Error::ConfigError(key.to_string())),
            }
        }

        Ok(config)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Config> {
        let file = std::fs::File::open(path)?;
        Config::from_reader(io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn defaults_without_any_lines() {
        let config = Config::from_reader(Cursor::new("")).unwrap();
        assert_eq!(config.memory, DEFAULT_MEMORY);
    }

    #[test]
    fn parses_every_known_key() {
        let text = "\
width=320
height=240
letter-w=8
letter-h=16
memory=512
program=10
stack=100
interrupt=190
";
        let config = Config::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(
            config,
            Config {
                width: 320,
                height: 240,
                letter_w: 8,
                letter_h: 16,
                memory: 512,
                program: 10,
                stack: 100,
                interrupt: 190,
            }
        );
    }

    #[test]
    fn non_key_value_lines_are_comments() {
        let text = "# a comment\n; also a comment\nmemory=64\n";
        let config = Config::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(config.memory, 64);
    }

    #[test]
    fn unknown_key_value_line_is_an_error() {
        let text = "memroy=64\n";
        let err = Config::from_reader(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, Error::ConfigError(ref k) if k == "memroy"));
    }

    #[test]
    fn grid_dimensions_are_derived() {
        let config = Config {
            width: 640,
            height: 480,
            letter_w: 8,
            letter_h: 16,
            ..Config::default()
        };
        assert_eq!(config.grid_w(), 80);
        assert_eq!(config.grid_h(), 30);
    }
}
