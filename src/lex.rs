use std::fmt::Display;

use miette::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Whitespace,
    Text,
    Number,
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Eof => write!(f, "EOF  null"),
            TokenKind::Whitespace => write!(f, "WS  null"),
            TokenKind::Text => write!(f, "TEXT {lit} null"),
            TokenKind::Number => match lit.parse::<f64>() {
                Ok(n) => write!(f, "NUMBER {lit} {n}"),
                Err(_) => write!(f, "NUMBER {lit} null"),
            },
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Plus => write!(f, "PLUS {lit} null"),
            TokenKind::Minus => write!(f, "MINUS {lit} null"),
            TokenKind::Star => write!(f, "STAR {lit} null"),
            TokenKind::Slash => write!(f, "SLASH {lit} null"),
        }
    }
}

/// Pull-based scanner over an expression string.
///
/// Each call to [`Lexer::next_token`] reads exactly one token. The scanner
/// never fails: anything it does not recognise comes back as
/// [`TokenKind::Text`] and the parser decides what to do with it.
pub struct Lexer<'de> {
    whole: &'de str,
    byte: usize,
    last: Option<char>,
    finished: bool,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            byte: 0,
            last: None,
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> Token<'de> {
        let start = self.byte;
        let Some(c) = self.read() else {
            return Token {
                kind: TokenKind::Eof,
                literal: "",
                offset: start,
            };
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            c if is_whitespace(c) => {
                self.skip_whitespace();
                return Token {
                    kind: TokenKind::Whitespace,
                    literal: "",
                    offset: start,
                };
            }
            _ => return self.scan_text(start),
        };

        Token {
            kind,
            literal: &self.whole[start..self.byte],
            offset: start,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.read() {
            if !is_whitespace(c) {
                self.unread();
                break;
            }
        }
    }

    // The first character of the run has already been consumed.
    fn scan_text(&mut self, start: usize) -> Token<'de> {
        while let Some(c) = self.read() {
            if is_whitespace(c) || is_special(c) {
                self.unread();
                break;
            }
        }

        let literal = &self.whole[start..self.byte];
        let kind = if is_number(literal) {
            TokenKind::Number
        } else {
            TokenKind::Text
        };
        Token {
            kind,
            literal,
            offset: start,
        }
    }

    fn read(&mut self) -> Option<char> {
        let c = self.whole[self.byte..].chars().next();
        if let Some(c) = c {
            self.byte += c.len_utf8();
        }
        self.last = c;
        c
    }

    /// Steps back over the character returned by the last `read`. Only one
    /// level of pushback is kept.
    fn unread(&mut self) {
        if let Some(c) = self.last.take() {
            self.byte -= c.len_utf8();
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Token<'de>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn is_special(c: char) -> bool {
    matches!(c, '(' | ')' | '+' | '-' | '*' | '/')
}

// digits with at most one decimal point
fn is_number(literal: &str) -> bool {
    let mut dotted = false;
    for c in literal.chars() {
        match c {
            '0'..='9' => {}
            '.' if !dotted => dotted = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|token| token.kind).collect()
    }

    #[test]
    fn structural_characters() {
        use TokenKind::*;
        assert_eq!(
            kinds("()+-*/"),
            vec![LeftParen, RightParen, Plus, Minus, Star, Slash, Eof]
        );
    }

    #[test]
    fn whitespace_runs_collapse() {
        let mut lexer = Lexer::new(" \t\n 3");
        let ws = lexer.next_token();
        assert_eq!(ws.kind, TokenKind::Whitespace);
        assert_eq!(ws.literal, "");

        let number = lexer.next_token();
        assert_eq!(number.kind, TokenKind::Number);
        assert_eq!(number.literal, "3");
        assert_eq!(number.offset, 4);
    }

    #[test]
    fn text_runs_stop_at_operators() {
        let tokens: Vec<_> = Lexer::new("12.5*abc)").collect();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, "12.5");
        assert_eq!(tokens[1].kind, TokenKind::Star);
        assert_eq!(tokens[2].kind, TokenKind::Text);
        assert_eq!(tokens[2].literal, "abc");
        assert_eq!(tokens[2].offset, 5);
        assert_eq!(tokens[3].kind, TokenKind::RightParen);
    }

    #[test]
    fn number_classification() {
        assert!(is_number("42"));
        assert!(is_number("4.2"));
        assert!(is_number(".5"));
        assert!(is_number("."));
        assert!(!is_number("1.2.3"));
        assert!(!is_number("1e5"));
        assert!(!is_number("x1"));
    }

    #[test]
    fn mixed_text_is_not_a_number() {
        let token = Lexer::new("3x").next_token();
        assert_eq!(token.kind, TokenKind::Text);
        assert_eq!(token.literal, "3x");
    }

    #[test]
    fn multibyte_text() {
        let tokens: Vec<_> = Lexer::new("π+1").collect();
        assert_eq!(tokens[0].literal, "π");
        assert_eq!(tokens[1].offset, "π".len());
        assert_eq!(tokens[2].literal, "1");
    }

    #[test]
    fn eof_repeats_but_iterator_stops() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);

        assert_eq!(kinds("1"), vec![TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn display() {
        let tokens: Vec<String> = Lexer::new("(2.5 x").map(|t| t.to_string()).collect();
        assert_eq!(
            tokens,
            vec![
                "LEFT_PAREN ( null",
                "NUMBER 2.5 2.5",
                "WS  null",
                "TEXT x null",
                "EOF  null",
            ]
        );
    }
}
