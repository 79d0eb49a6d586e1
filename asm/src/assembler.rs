//! The single-pass compile driver: tokenize, pre-populate built-ins,
//! dispatch directives and instructions against the token FIFO, then
//! resolve placeholders against the final symbol table.
//!
//! Forward references are handled without a second lexical pass: any
//! value that doesn't parse as an integer is emitted as a zero
//! placeholder and recorded by cell index, to be overwritten once every
//! token has been consumed and every symbol (including ones defined
//! later in the source) is known.

use std::collections::VecDeque;

use coder_vm::error::{Error, Result, SourceLocation};
use coder_vm::isa::{AddrMode, OpCode, TestCode};
use coder_vm::{Cell, Config, Memory};

use crate::symbols::{builtins, SymbolTable};
use crate::token::{tokenize, Token};

/// Compiles `source_text` into `memory`, starting at cell 0. On success
/// every cell the source declared has been written and the placeholder
/// list is empty; on failure `memory` may be partially written.
pub fn assemble(source_name: &str, source_text: &str, config: &Config, memory: &mut Memory) -> Result<()> {
    let mut assembler = Assembler {
        tokens: tokenize(source_name, source_text),
        symtab: builtins(config),
        placeholders: Vec::new(),
        pointer: 0,
        memory,
        last_location: None,
    };
    assembler.run()
}

struct Assembler<'m> {
    tokens: VecDeque<Token>,
    symtab: SymbolTable,
    placeholders: Vec<(Cell, String)>,
    pointer: Cell,
    memory: &'m mut Memory,
    last_location: Option<SourceLocation>,
}

impl<'m> Assembler<'m> {
    fn run(&mut self) -> Result<()> {
        while let Some(token) = self.tokens.pop_front() {
            self.last_location = Some(location_of(&token));
            self.dispatch(token)?;
        }
        self.resolve()
    }

    fn dispatch(&mut self, token: Token) -> Result<()> {
        match token.text.as_str() {
            "define" => self.parse_define(),
            "label" => self.parse_label(),
            "number" => self.parse_number(),
            "list" => self.parse_list(),
            "objects" => self.parse_objects(),
            "object" => self.parse_object(),
            "map" => self.parse_map(),
            "string" => self.parse_string(),
            _ => self.parse_instruction(&token),
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        match self.tokens.pop_front() {
            Some(token) => {
                self.last_location = Some(location_of(&token));
                Ok(token)
            }
            None => Err(Error::SyntaxError {
                location: self.last_location.clone().unwrap_or_else(|| SourceLocation {
                    source: "<input>".to_string(),
                    line: 0,
                    text: String::new(),
                }),
                message: "unexpected end of input".to_string(),
            }),
        }
    }

    fn syntax_error(&self, token: &Token, message: String) -> Error {
        Error::SyntaxError {
            location: location_of(token),
            message,
        }
    }

    fn emit_cell(&mut self, value: Cell) -> Result<()> {
        self.memory.write(self.pointer, value)?;
        self.pointer += 1;
        Ok(())
    }

    fn emit_placeholder(&mut self, name: String) -> Result<()> {
        self.placeholders.push((self.pointer, name));
        self.memory.write(self.pointer, 0)?;
        self.pointer += 1;
        Ok(())
    }

    fn reserve(&mut self, n: Cell) -> Result<()> {
        if n < 0 || (self.pointer + n) as usize > self.memory.size() {
            return Err(Error::BadAddress {
                addr: self.pointer + n,
            });
        }
        self.pointer += n;
        Ok(())
    }

    /// Parses `text` as a signed integer, falling back to a placeholder
    /// referencing `text` as a symbol name. An empty `text` is always a
    /// hard error: there is no symbol named "".
    fn parse_value_text(&mut self, token: &Token, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(self.syntax_error(token, "empty value".to_string()));
        }
        match text.parse::<Cell>() {
            Ok(value) => self.emit_cell(value),
            Err(_) => self.emit_placeholder(text.to_string()),
        }
    }

    fn parse_int_literal(&self, token: &Token) -> Result<Cell> {
        token
            .text
            .parse::<Cell>()
            .map_err(|_| self.syntax_error(token, format!("expected an integer, found \"{}\"", token.text)))
    }

    /// `Parse_Address`: the next token's first character selects the
    /// address mode; the remaining text is value-parsed.
    fn parse_operand(&mut self) -> Result<()> {
        let token = self.next_token()?;
        let mut chars = token.text.chars();
        let prefix = chars.next().ok_or_else(|| self.syntax_error(&token, "empty operand".to_string()))?;
        let rest: String = chars.collect();

        let mode = match prefix {
            '$' => AddrMode::Value,
            '#' => AddrMode::Immediate,
            '@' => AddrMode::Pointer,
            _ => {
                return Err(self.syntax_error(
                    &token,
                    format!("expected an operand prefix $, # or @, found \"{}\"", token.text),
                ))
            }
        };

        self.emit_cell(mode as Cell)?;
        self.parse_value_text(&token, &rest)
    }

    /// A single-cell value with the same placeholder rules as an
    /// operand, but with no address-mode prefix: used for `jump`
    /// targets, `test` pass/fail targets, and interrupt numbers.
    fn parse_raw_target(&mut self) -> Result<()> {
        let token = self.next_token()?;
        self.parse_value_text(&token, &token.text)
    }

    fn parse_test_code(&mut self) -> Result<()> {
        let token = self.next_token()?;
        let code = match token.text.as_str() {
            "=" => TestCode::Eq,
            "not" => TestCode::Ne,
            ">" => TestCode::Gt,
            "<" => TestCode::Lt,
            ">or=" => TestCode::Ge,
            "<or=" => TestCode::Le,
            other => return Err(self.syntax_error(&token, format!("unknown test code \"{}\"", other))),
        };
        self.emit_cell(code as Cell)
    }

    fn parse_define(&mut self) -> Result<()> {
        let name = self.next_token()?;
        let keyword = self.next_token()?;
        if keyword.text != "as" {
            return Err(self.syntax_error(&keyword, format!("expected keyword \"as\", found \"{}\"", keyword.text)));
        }
        let value_token = self.next_token()?;
        let value = self.parse_int_literal(&value_token)?;
        self.symtab.insert(format!("[{}]", name.text), value);
        Ok(())
    }

    fn parse_label(&mut self) -> Result<()> {
        let name = self.next_token()?;
        self.symtab.insert(format!("[{}]", name.text), self.pointer);
        Ok(())
    }

    fn parse_number(&mut self) -> Result<()> {
        let token = self.next_token()?;
        self.parse_value_text(&token, &token.text)
    }

    fn parse_list(&mut self) -> Result<()> {
        let n_token = self.next_token()?;
        let n = self.parse_int_literal(&n_token)?;
        self.reserve(n)
    }

    fn parse_objects(&mut self) -> Result<()> {
        let dims_token = self.next_token()?;
        let parts: Vec<&str> = dims_token.text.split('x').collect();
        if parts.len() != 3 {
            return Err(self.syntax_error(
                &dims_token,
                format!("expected AxBxC, found \"{}\"", dims_token.text),
            ));
        }
        let mut dims = [0 as Cell; 3];
        for (i, part) in parts.iter().enumerate() {
            dims[i] = part
                .parse()
                .map_err(|_| self.syntax_error(&dims_token, format!("expected an integer component, found \"{}\"", part)))?;
        }
        self.reserve(dims[0] * dims[1] * dims[2])
    }

    fn parse_object(&mut self) -> Result<()> {
        let name = self.next_token()?;
        let mut index: Cell = 0;
        loop {
            let token = self.next_token()?;
            if token.text == "end" {
                return Ok(());
            }
            self.symtab
                .insert(format!("[{}->{}]", name.text, token.text), index);
            index += 1;
        }
    }

    fn parse_map(&mut self) -> Result<()> {
        let mut index: Cell = 0;
        loop {
            let token = self.next_token()?;
            if token.text == "end" {
                return Ok(());
            }
            self.symtab.insert(format!("[{}]", token.text), index);
            index += 1;
        }
    }

    /// The opening token must begin with `"`. If it also ends with `"`
    /// the enclosed text is the whole string; otherwise every following
    /// token up to and including the one ending in `"` contributes its
    /// text (plus a separating space) to the string.
    fn parse_string(&mut self) -> Result<()> {
        let first = self.next_token()?;
        if !first.text.starts_with('"') {
            return Err(self.syntax_error(&first, "string literal must start with a quote".to_string()));
        }

        let text = if first.text.len() >= 2 && first.text.ends_with('"') {
            first.text[1..first.text.len() - 1].to_string()
        } else {
            let mut text = first.text[1..].to_string();
            text.push(' ');
            loop {
                let token = self.next_token()?;
                if token.text.ends_with('"') {
                    text.push_str(&token.text[..token.text.len() - 1]);
                    break;
                }
                text.push_str(&token.text);
                text.push(' ');
            }
            text
        };

        self.emit_cell(text.chars().count() as Cell)?;
        for ch in text.chars() {
            self.emit_cell(ch as Cell)?;
        }
        Ok(())
    }

    fn parse_instruction(&mut self, token: &Token) -> Result<()> {
        let opcode = match token.text.as_str() {
            "copy" => OpCode::Copy,
            "add" => OpCode::Add,
            "sub" => OpCode::Sub,
            "mul" => OpCode::Mul,
            "div" => OpCode::Div,
            "test" => OpCode::Test,
            "jump" => OpCode::Jump,
            "jsub" => OpCode::Jsub,
            "push" => OpCode::Push,
            "pop" => OpCode::Pop,
            "return" => OpCode::Return,
            "and" => OpCode::And,
            "or" => OpCode::Or,
            "halt" => OpCode::Halt,
            "interrupt" => OpCode::Interrupt,
            other => return Err(self.syntax_error(token, format!("unknown keyword \"{}\"", other))),
        };

        self.emit_cell(opcode as Cell)?;

        match opcode {
            OpCode::Copy => {
                self.parse_operand()?; // src
                self.parse_operand()?; // dst
            }
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::And | OpCode::Or => {
                self.parse_operand()?; // lhs
                self.parse_operand()?; // rhs
                self.parse_operand()?; // dst
            }
            OpCode::Test => {
                self.parse_operand()?; // lhs
                self.parse_test_code()?;
                self.parse_operand()?; // rhs
                self.parse_raw_target()?; // pass
                self.parse_raw_target()?; // fail
            }
            OpCode::Jump => self.parse_raw_target()?,
            OpCode::Jsub => self.parse_operand()?,
            OpCode::Push => self.parse_operand()?,
            OpCode::Pop => self.parse_operand()?,
            OpCode::Return | OpCode::Halt => {}
            OpCode::Interrupt => self.parse_raw_target()?,
        }

        Ok(())
    }

    fn resolve(&mut self) -> Result<()> {
        for (cell, name) in std::mem::take(&mut self.placeholders) {
            match self.symtab.get(&name) {
                Some(value) => self.memory.write(cell, *value)?,
                None => return Err(Error::UnresolvedSymbol(name)),
            }
        }
        Ok(())
    }
}

fn location_of(token: &Token) -> SourceLocation {
    SourceLocation {
        source: token.source.clone(),
        line: token.line,
        text: token.text.clone(),
    }
}
