//! Lexer (tokenizer) for simple-lang source code
//!
//! Produces one [`Token`] per [`Lexer::scan`] call: the start offset, the
//! token kind and the literal text. Once the input is exhausted every further
//! call returns [`TokenKind::Eof`].
//!
//! String and char literal text keeps its surrounding quotes; callers that
//! need the raw content strip the first and last byte.
//!
//! While scanning, the lexer records every line start into the shared
//! [`SourceFile`]. Lexical problems do not stop scanning: they are queued as
//! [`LexDiag`]s and picked up by the parser with [`Lexer::take_diags`].

use super::position::SourceFile;
use crate::diagnostics::ErrorKind;
use std::fmt;
use std::sync::Arc;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,

    // Literals
    Ident,
    IntLit,
    CharLit,
    StrLit,

    // Keywords
    Const,
    Int,
    Char,
    Void,
    Main,
    If,
    Else,
    Switch,
    Case,
    Default,
    While,
    For,
    Scanf,
    Printf,
    Return,

    // Operators and delimiters
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=
    EqEq,      // ==
    NotEq,     // !=
    Colon,     // :
    Assign,    // =
    Semicolon, // ;
    Comma,     // ,
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    Eof,
}

/// Lowest binary precedence; anything at this level does not bind.
pub const LOWEST_PRECEDENCE: u8 = 0;

impl TokenKind {
    /// Map an identifier spelling to its keyword, if it is one.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "const" => TokenKind::Const,
            "int" => TokenKind::Int,
            "char" => TokenKind::Char,
            "void" => TokenKind::Void,
            "main" => TokenKind::Main,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "scanf" => TokenKind::Scanf,
            "printf" => TokenKind::Printf,
            "return" => TokenKind::Return,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Ident | TokenKind::IntLit | TokenKind::CharLit | TokenKind::StrLit
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::EqEq
                | TokenKind::NotEq
        )
    }

    /// Binary operator precedence: relational 1, additive 2, multiplicative 3.
    pub fn precedence(self) -> u8 {
        match self {
            k if k.is_relational() => 1,
            TokenKind::Plus | TokenKind::Minus => 2,
            TokenKind::Star | TokenKind::Slash => 3,
            _ => LOWEST_PRECEDENCE,
        }
    }

    /// Upper-case token code used by the token dump.
    pub fn code(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Ident => "IDENFR",
            TokenKind::IntLit => "INTCON",
            TokenKind::CharLit => "CHARCON",
            TokenKind::StrLit => "STRCON",
            TokenKind::Const => "CONSTTK",
            TokenKind::Int => "INTTK",
            TokenKind::Char => "CHARTK",
            TokenKind::Void => "VOIDTK",
            TokenKind::Main => "MAINTK",
            TokenKind::If => "IFTK",
            TokenKind::Else => "ELSETK",
            TokenKind::Switch => "SWITCHTK",
            TokenKind::Case => "CASETK",
            TokenKind::Default => "DEFAULTTK",
            TokenKind::While => "WHILETK",
            TokenKind::For => "FORTK",
            TokenKind::Scanf => "SCANFTK",
            TokenKind::Printf => "PRINTFTK",
            TokenKind::Return => "RETURNTK",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINU",
            TokenKind::Star => "MULT",
            TokenKind::Slash => "DIV",
            TokenKind::Lt => "LSS",
            TokenKind::Le => "LEQ",
            TokenKind::Gt => "GRE",
            TokenKind::Ge => "GEQ",
            TokenKind::EqEq => "EQL",
            TokenKind::NotEq => "NEQ",
            TokenKind::Colon => "COLON",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Semicolon => "SEMICN",
            TokenKind::Comma => "COMMA",
            TokenKind::LParen => "LPARENT",
            TokenKind::RParen => "RPARENT",
            TokenKind::LBracket => "LBRACK",
            TokenKind::RBracket => "RBRACK",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Eof => "END_OF_FILE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Illegal => "illegal token",
            TokenKind::Ident => "identifier",
            TokenKind::IntLit => "int literal",
            TokenKind::CharLit => "char literal",
            TokenKind::StrLit => "string literal",
            TokenKind::Const => "'const'",
            TokenKind::Int => "'int'",
            TokenKind::Char => "'char'",
            TokenKind::Void => "'void'",
            TokenKind::Main => "'main'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::Scanf => "'scanf'",
            TokenKind::Printf => "'printf'",
            TokenKind::Return => "'return'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Colon => "':'",
            TokenKind::Assign => "'='",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// One scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub kind: TokenKind,
    pub lit: String,
}

/// A lexical problem, positioned by byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiag {
    pub offset: usize,
    pub kind: ErrorKind,
    pub message: String,
}

/// Lexer for simple-lang source code
pub struct Lexer<'src> {
    src: &'src [u8],
    file: Arc<SourceFile>,
    /// Current character, `None` at end of input.
    ch: Option<u8>,
    /// Offset of `ch`.
    offset: usize,
    /// Offset just past `ch`.
    read_offset: usize,
    diags: Vec<LexDiag>,
}

impl<'src> Lexer<'src> {
    pub fn new(file: Arc<SourceFile>, src: &'src str) -> Self {
        let mut lexer = Self {
            src: src.as_bytes(),
            file,
            ch: None,
            offset: 0,
            read_offset: 0,
            diags: Vec::new(),
        };
        lexer.next_char();
        lexer
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let offset = self.offset;
        let Some(ch) = self.ch else {
            return Token {
                offset,
                kind: TokenKind::Eof,
                lit: String::new(),
            };
        };

        if is_letter(ch) {
            let lit = self.scan_identifier();
            let kind = TokenKind::keyword(&lit).unwrap_or(TokenKind::Ident);
            return Token { offset, kind, lit };
        }

        if ch.is_ascii_digit() {
            let lit = self.scan_number();
            return Token {
                offset,
                kind: TokenKind::IntLit,
                lit,
            };
        }

        // Always make progress.
        self.next_char();
        let kind = match ch {
            b'"' => {
                let lit = self.scan_string(offset);
                return Token {
                    offset,
                    kind: TokenKind::StrLit,
                    lit,
                };
            }
            b'\'' => {
                let lit = self.scan_char(offset);
                return Token {
                    offset,
                    kind: TokenKind::CharLit,
                    lit,
                };
            }
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'<' => self.switch_eq(TokenKind::Lt, TokenKind::Le),
            b'>' => self.switch_eq(TokenKind::Gt, TokenKind::Ge),
            b'=' => self.switch_eq(TokenKind::Assign, TokenKind::EqEq),
            b'!' => {
                if self.ch == Some(b'=') {
                    self.next_char();
                    TokenKind::NotEq
                } else {
                    self.error(offset, ErrorKind::IllegalCharacter, "unexpected '!', expected '!='");
                    TokenKind::Illegal
                }
            }
            0 => {
                self.error(offset, ErrorKind::IllegalCharacter, "illegal character NUL");
                TokenKind::Illegal
            }
            other => {
                self.error(
                    offset,
                    ErrorKind::IllegalCharacter,
                    format!("illegal character {:?}", other as char),
                );
                TokenKind::Illegal
            }
        };

        Token {
            offset,
            kind,
            lit: self.text(offset, self.offset),
        }
    }

    /// Drain the lexical diagnostics queued so far.
    pub fn take_diags(&mut self) -> Vec<LexDiag> {
        std::mem::take(&mut self.diags)
    }

    fn switch_eq(&mut self, single: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.ch == Some(b'=') {
            self.next_char();
            with_eq
        } else {
            single
        }
    }

    /// Read the next character into `ch`, recording line starts.
    fn next_char(&mut self) {
        let crossed_newline = self.ch == Some(b'\n');

        if self.read_offset >= self.src.len() {
            self.offset = self.src.len();
            if crossed_newline {
                self.file.add_line(self.offset);
            }
            self.ch = None;
            return;
        }

        self.offset = self.read_offset;
        if crossed_newline {
            self.file.add_line(self.offset);
        }
        self.ch = Some(self.src[self.read_offset]);
        self.read_offset += 1;
    }

    fn peek_char(&self) -> Option<u8> {
        self.src.get(self.read_offset).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.ch {
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.next_char(),
                Some(b'/') if self.peek_char() == Some(b'/') => {
                    while !matches!(self.ch, None | Some(b'\n')) {
                        self.next_char();
                    }
                }
                Some(b'/') if self.peek_char() == Some(b'*') => {
                    let start = self.offset;
                    self.next_char();
                    self.next_char();
                    loop {
                        match self.ch {
                            None => {
                                self.error(
                                    start,
                                    ErrorKind::UnterminatedLiteral,
                                    "block comment not terminated",
                                );
                                break;
                            }
                            Some(b'*') if self.peek_char() == Some(b'/') => {
                                self.next_char();
                                self.next_char();
                                break;
                            }
                            Some(_) => self.next_char(),
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_identifier(&mut self) -> String {
        let start = self.offset;
        while matches!(self.ch, Some(c) if is_letter(c) || c.is_ascii_digit()) {
            self.next_char();
        }
        self.text(start, self.offset)
    }

    fn scan_number(&mut self) -> String {
        let start = self.offset;
        while matches!(self.ch, Some(c) if c.is_ascii_digit()) {
            self.next_char();
        }
        self.text(start, self.offset)
    }

    /// Opening '"' already consumed.
    fn scan_string(&mut self, start: usize) -> String {
        loop {
            match self.ch {
                None | Some(b'\n') => {
                    self.error(start, ErrorKind::UnterminatedLiteral, "string literal not terminated");
                    break;
                }
                Some(b'"') => {
                    self.next_char();
                    break;
                }
                Some(b'\\') => {
                    self.next_char();
                    self.scan_escape(b'"');
                }
                Some(_) => self.next_char(),
            }
        }
        self.text(start, self.offset)
    }

    /// Opening '\'' already consumed.
    fn scan_char(&mut self, start: usize) -> String {
        let mut count = 0;
        loop {
            match self.ch {
                None | Some(b'\n') => {
                    self.error(start, ErrorKind::UnterminatedLiteral, "char literal not terminated");
                    break;
                }
                Some(b'\'') => {
                    self.next_char();
                    break;
                }
                Some(b'\\') => {
                    self.next_char();
                    self.scan_escape(b'\'');
                    count += 1;
                }
                Some(_) => {
                    self.next_char();
                    count += 1;
                }
            }
        }

        // An empty literal is left for the checker to report.
        if count > 1 {
            self.error(
                start,
                ErrorKind::MultiCharLiteral,
                "char literal must hold exactly one character",
            );
        }
        self.text(start, self.offset)
    }

    /// Backslash already consumed; validate the escaped character.
    fn scan_escape(&mut self, quote: u8) {
        let offset = self.offset;
        match self.ch {
            Some(c) if c == quote || matches!(c, b'n' | b't' | b'r' | b'\\' | b'0' | b'\'' | b'"') => {
                self.next_char();
            }
            Some(b'\n') | None => {
                self.error(offset, ErrorKind::MalformedEscape, "escape sequence not terminated");
            }
            Some(c) => {
                self.error(
                    offset,
                    ErrorKind::MalformedEscape,
                    format!("unknown escape sequence \\{}", c as char),
                );
                self.next_char();
            }
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.src[start..end]).into_owned()
    }

    fn error(&mut self, offset: usize, kind: ErrorKind, message: impl Into<String>) {
        self.diags.push(LexDiag {
            offset,
            kind,
            message: message.into(),
        });
    }
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Vec<Token>, Vec<LexDiag>, Arc<SourceFile>) {
        let file = Arc::new(SourceFile::new("t.c", src.len()));
        let mut lexer = Lexer::new(Arc::clone(&file), src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.scan();
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        let diags = lexer.take_diags();
        (tokens, diags, file)
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("int main() { return 0; }"),
            vec![
                TokenKind::Int,
                TokenKind::Main,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::IntLit,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("< <= > >= == != = + - * /"),
            vec![
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets_and_literal_text() {
        let (tokens, diags, _) = lex("char c = 'x';\nprintf(\"hi %d\\n\", c);");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(tokens[3].kind, TokenKind::CharLit);
        assert_eq!(tokens[3].lit, "'x'");
        assert_eq!(tokens[3].offset, 9);
        let string = tokens.iter().find(|t| t.kind == TokenKind::StrLit).unwrap();
        assert_eq!(string.lit, "\"hi %d\\n\"");
    }

    #[test]
    fn test_identifiers_longer_than_keywords() {
        let (tokens, _, _) = lex("integer mainly _if");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Ident));
        assert_eq!(tokens[1].lit, "mainly");
    }

    #[test]
    fn test_eof_is_sticky() {
        let file = Arc::new(SourceFile::new("t.c", 1));
        let mut lexer = Lexer::new(file, "x");
        assert_eq!(lexer.scan().kind, TokenKind::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.scan().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_line_starts_are_recorded() {
        let (tokens, _, file) = lex("int a;\n  int b;\n");
        let b = tokens.iter().find(|t| t.lit == "b").unwrap();
        let pos = file.position_for(b.offset);
        assert_eq!((pos.line, pos.column), (2, 7));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("int x; // note\n/* block\n */ x"),
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexical_errors() {
        let (tokens, diags, _) = lex("a ! b # \"open\n'ab' '\\q'");
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[3].kind, TokenKind::Illegal);
        let found: Vec<_> = diags.iter().map(|d| d.kind).collect();
        assert_eq!(
            found,
            vec![
                ErrorKind::IllegalCharacter,
                ErrorKind::IllegalCharacter,
                ErrorKind::UnterminatedLiteral,
                ErrorKind::MultiCharLiteral,
                ErrorKind::MalformedEscape,
            ]
        );
    }

    #[test]
    fn test_precedence_table() {
        assert_eq!(TokenKind::EqEq.precedence(), 1);
        assert_eq!(TokenKind::Minus.precedence(), 2);
        assert_eq!(TokenKind::Slash.precedence(), 3);
        assert_eq!(TokenKind::Comma.precedence(), LOWEST_PRECEDENCE);
    }
}
