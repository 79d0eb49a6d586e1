//! Line-based tokenizer.
//!
//! A line is a code line iff its first character is `:`; every other
//! line is a comment and is dropped whole. A code line is stripped of
//! its leading `:` and split on whitespace; each resulting word becomes
//! one [`Token`], carrying its source name and 1-based line number for
//! diagnostics. Tokens are produced in file order; the parser consumes
//! them front-first, so a `VecDeque` is the natural FIFO.

use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub source: String,
    pub line: usize,
}

pub fn tokenize(source_name: &str, text: &str) -> VecDeque<Token> {
    let mut tokens = VecDeque::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let body = match line.strip_prefix(':') {
            Some(body) => body,
            None => continue,
        };

        for word in body.split_whitespace() {
            tokens.push_back(Token {
                text: word.to_string(),
                source: source_name.to_string(),
                line: line_no,
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_code_lines_are_dropped() {
        let tokens = tokenize("t.asm", "this is a comment\n:copy $1 #2\nso is this\n");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["copy", "$1", "#2"]);
    }

    #[test]
    fn consecutive_spaces_do_not_produce_blank_tokens() {
        let tokens = tokenize("t.asm", ":copy   $1    #2\n");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn a_bare_colon_line_produces_no_tokens() {
        let tokens = tokenize("t.asm", ":\n:halt\n");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["halt"]);
    }

    #[test]
    fn tokens_carry_their_one_based_line_number() {
        let tokens = tokenize("t.asm", "comment\n:halt\n");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[0].source, "t.asm");
    }
}
