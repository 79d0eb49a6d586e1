//! The symbol table and its built-in pre-population.
//!
//! Keys are decorated by convention rather than by type: `[name]` is a
//! user label, defined constant, or object/map entry; `{name}` is a
//! built-in; `(c)` is a character literal. The table itself is just a
//! `HashMap<String, Cell>` — the decoration lives in how callers build
//! the key, not in the map.

use std::collections::HashMap;

use coder_vm::isa::{Interrupt, TAKE_NO_JUMP};
use coder_vm::{Cell, Config};

pub type SymbolTable = HashMap<String, Cell>;

const BACKSPACE: Cell = 8;
const TAB: Cell = 9;
const ENTER: Cell = 13;
const DELETE: Cell = 127;
const SPACE: Cell = 32;

/// Builds the symbol table every compile starts from: interrupt names,
/// display geometry, the no-jump sentinel, and one entry per character
/// literal.
pub fn builtins(config: &Config) -> SymbolTable {
    let mut symtab = SymbolTable::new();

    symtab.insert("{screen}".to_string(), Interrupt::Screen as Cell);
    symtab.insert("{input}".to_string(), Interrupt::Input as Cell);
    symtab.insert("{timeout}".to_string(), Interrupt::Timeout as Cell);

    symtab.insert("{memory}".to_string(), config.memory as Cell);
    symtab.insert("{width}".to_string(), config.width);
    symtab.insert("{height}".to_string(), config.height);
    symtab.insert("{letter-w}".to_string(), config.letter_w);
    symtab.insert("{letter-h}".to_string(), config.letter_h);
    symtab.insert("{grid-w}".to_string(), config.grid_w());
    symtab.insert("{grid-h}".to_string(), config.grid_h());

    symtab.insert("{take-no-jump}".to_string(), TAKE_NO_JUMP);
    // The worked examples write this one with the user-label decoration
    // instead of the built-in one; alias both so either spelling resolves.
    symtab.insert("[take-no-jump]".to_string(), TAKE_NO_JUMP);

    symtab.insert("(space)".to_string(), SPACE);
    symtab.insert("(backspace)".to_string(), BACKSPACE);
    symtab.insert("(delete)".to_string(), DELETE);
    symtab.insert("(enter)".to_string(), ENTER);
    symtab.insert("(tab)".to_string(), TAB);

    for c in b'!'..=b'~' {
        symtab.insert(format!("({})", c as char), Cell::from(c));
    }

    symtab
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_names_resolve_to_their_numbers() {
        let symtab = builtins(&Config::default());
        assert_eq!(symtab["{screen}"], 0);
        assert_eq!(symtab["{input}"], 1);
        assert_eq!(symtab["{timeout}"], 2);
    }

    #[test]
    fn geometry_constants_are_derived_from_config() {
        let config = Config {
            width: 320,
            height: 240,
            letter_w: 8,
            letter_h: 16,
            ..Config::default()
        };
        let symtab = builtins(&config);
        assert_eq!(symtab["{grid-w}"], 40);
        assert_eq!(symtab["{grid-h}"], 15);
    }

    #[test]
    fn every_printable_ascii_character_has_a_literal() {
        let symtab = builtins(&Config::default());
        assert_eq!(symtab["(!)"], b'!' as Cell);
        assert_eq!(symtab["(~)"], b'~' as Cell);
        assert_eq!(symtab["(A)"], b'A' as Cell);
    }

    #[test]
    fn named_control_characters_are_present() {
        let symtab = builtins(&Config::default());
        assert_eq!(symtab["(space)"], 32);
        assert_eq!(symtab["(tab)"], 9);
        assert_eq!(symtab["(enter)"], 13);
        assert_eq!(symtab["(backspace)"], 8);
        assert_eq!(symtab["(delete)"], 127);
    }

    #[test]
    fn take_no_jump_resolves_under_both_decorations() {
        let symtab = builtins(&Config::default());
        assert_eq!(symtab["{take-no-jump}"], TAKE_NO_JUMP);
        assert_eq!(symtab["[take-no-jump]"], TAKE_NO_JUMP);
    }
}
