// Imports-only reader for Go source files.
//
// Understands the package clause followed by any number of import
// declarations (single or grouped, named, dot and blank imports, interpreted
// and raw string paths) with comments and optional semicolons in between.
// Scanning stops at the first declaration that is not an import.

use super::{ImportExtractor, SourceHeader};
use crate::error::{AppError, Result};
use std::fmt;

pub const GO_EXTENSION: &str = ".go";

#[derive(Debug, Clone, Copy, Default)]
pub struct GoExtractor;

impl ImportExtractor for GoExtractor {
    fn dialect(&self) -> &'static str {
        "go"
    }

    fn parse_header(&self, path: &str, content: &str) -> Result<SourceHeader> {
        HeaderParser {
            lexer: Lexer::new(path, content),
        }
        .parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Punct(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{}'", name),
            Token::Str(value) => write!(f, "string {:?}", value),
            Token::Punct(c) => write!(f, "'{}'", c),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

struct Lexeme {
    token: Token,
    line: usize,
    // A line break separates this token from the previous one.
    newline_before: bool,
}

struct Lexer<'a> {
    path: &'a str,
    src: &'a str,
    pos: usize,
    line: usize,
    last_end_line: usize,
}

impl<'a> Lexer<'a> {
    fn new(path: &'a str, src: &'a str) -> Self {
        Self {
            path,
            src,
            pos: 0,
            line: 1,
            last_end_line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, message: impl Into<String>) -> AppError {
        AppError::Parse {
            path: self.path.to_string(),
            line,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start_line = self.line;
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(self.error(start_line, "comment not terminated"));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_lexeme(&mut self) -> Result<Lexeme> {
        self.skip_trivia()?;
        let line = self.line;
        let newline_before = line > self.last_end_line;
        let token = match self.peek() {
            None => Token::Eof,
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                while self.peek().is_some_and(is_ident_continue) {
                    self.bump();
                }
                Token::Ident(self.src[start..self.pos].to_string())
            }
            Some('"') => Token::Str(self.interpreted_string(line)?),
            Some('`') => Token::Str(self.raw_string(line)?),
            Some(c) => {
                self.bump();
                Token::Punct(c)
            }
        };
        self.last_end_line = self.line;
        Ok(Lexeme {
            token,
            line,
            newline_before,
        })
    }

    fn interpreted_string(&mut self, line: usize) -> Result<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(line, "string literal not terminated")),
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => value.push(other),
                    None => return Err(self.error(line, "string literal not terminated")),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn raw_string(&mut self, line: usize) -> Result<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(line, "raw string literal not terminated")),
                Some('`') => return Ok(value),
                Some('\r') => {}
                Some(c) => value.push(c),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

struct HeaderParser<'a> {
    lexer: Lexer<'a>,
}

impl HeaderParser<'_> {
    fn parse(mut self) -> Result<SourceHeader> {
        let lexeme = self.lexer.next_lexeme()?;
        if lexeme.token != Token::Ident("package".to_string()) {
            return Err(self.lexer.error(
                lexeme.line,
                format!("expected 'package', found {}", lexeme.token),
            ));
        }

        let lexeme = self.lexer.next_lexeme()?;
        let package_name = match lexeme.token {
            Token::Ident(name) if !is_keyword(&name) => name,
            other => {
                return Err(self
                    .lexer
                    .error(lexeme.line, format!("expected package name, found {}", other)));
            }
        };

        let mut imports = Vec::new();
        let mut next = self.end_of_decl("package clause")?;
        loop {
            match next.token {
                Token::Punct(';') => next = self.lexer.next_lexeme()?,
                Token::Ident(keyword) if keyword == "import" => {
                    self.import_decl(&mut imports)?;
                    next = self.end_of_decl("import declaration")?;
                }
                _ => break,
            }
        }

        Ok(SourceHeader {
            package_name: Some(package_name),
            imports,
        })
    }

    // A declaration ends at ';', a line break or EOF. Returns the token that
    // follows it.
    fn end_of_decl(&mut self, what: &str) -> Result<Lexeme> {
        let lexeme = self.lexer.next_lexeme()?;
        match lexeme.token {
            Token::Punct(';') => self.lexer.next_lexeme(),
            Token::Eof => Ok(lexeme),
            _ if lexeme.newline_before => Ok(lexeme),
            other => Err(self.lexer.error(
                lexeme.line,
                format!("expected ';' after {}, found {}", what, other),
            )),
        }
    }

    fn import_decl(&mut self, imports: &mut Vec<String>) -> Result<()> {
        let lexeme = self.lexer.next_lexeme()?;
        if lexeme.token != Token::Punct('(') {
            imports.push(self.import_spec(lexeme.token, lexeme.line)?);
            return Ok(());
        }

        let mut next = self.lexer.next_lexeme()?;
        loop {
            match next.token {
                Token::Punct(')') => return Ok(()),
                Token::Punct(';') => next = self.lexer.next_lexeme()?,
                Token::Eof => {
                    return Err(self.lexer.error(next.line, "expected ')', found EOF"));
                }
                other => {
                    imports.push(self.import_spec(other, next.line)?);
                    let after = self.lexer.next_lexeme()?;
                    match after.token {
                        Token::Punct(')') => return Ok(()),
                        Token::Punct(';') => next = self.lexer.next_lexeme()?,
                        _ if after.newline_before => next = after,
                        Token::Eof => {
                            return Err(self.lexer.error(after.line, "expected ')', found EOF"));
                        }
                        other => {
                            return Err(self.lexer.error(
                                after.line,
                                format!("expected ';' or ')' after import, found {}", other),
                            ));
                        }
                    }
                }
            }
        }
    }

    fn import_spec(&mut self, first: Token, line: usize) -> Result<String> {
        let (path_token, path_line) = match first {
            Token::Ident(_) | Token::Punct('.') => {
                let lexeme = self.lexer.next_lexeme()?;
                if lexeme.newline_before {
                    return Err(self
                        .lexer
                        .error(lexeme.line, "expected import path, found newline"));
                }
                (lexeme.token, lexeme.line)
            }
            other => (other, line),
        };
        match path_token {
            Token::Str(path) if path.is_empty() => {
                Err(self.lexer.error(path_line, "invalid import path (empty string)"))
            }
            Token::Str(path) => Ok(path),
            other => Err(self
                .lexer
                .error(path_line, format!("expected import path, found {}", other))),
        }
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<SourceHeader> {
        GoExtractor.parse_header("test.go", content)
    }

    #[test]
    fn package_without_imports() {
        let header = parse("// Package a does things.\npackage a\n\nfunc A() {}\n").unwrap();
        assert_eq!(header.package_name.as_deref(), Some("a"));
        assert!(header.imports.is_empty());
    }

    #[test]
    fn single_and_grouped_imports() {
        let header = parse(
            r#"package main

import "fmt"
import (
	"os"

	str "strings"
	. "example.com/app/pkg/dot"
	_ "example.com/app/pkg/blank"
)

func main() { fmt.Println(os.Args) }
"#,
        )
        .unwrap();
        assert_eq!(
            header.imports,
            vec![
                "fmt",
                "os",
                "strings",
                "example.com/app/pkg/dot",
                "example.com/app/pkg/blank"
            ]
        );
    }

    #[test]
    fn comments_semicolons_and_raw_strings() {
        let header = parse(
            "/* build\n tags */ package x; import `example.com/app/raw`; /* c */ import (\"a\"; \"b\")\nvar _ = 1\n",
        )
        .unwrap();
        assert_eq!(header.package_name.as_deref(), Some("x"));
        assert_eq!(header.imports, vec!["example.com/app/raw", "a", "b"]);
    }

    #[test]
    fn stops_at_first_non_import_declaration() {
        let header = parse(
            "package x\nimport \"a\"\nconst s = `unterminated raw string inside body is never read\n",
        )
        .unwrap();
        assert_eq!(header.imports, vec!["a"]);
    }

    #[test]
    fn missing_package_clause_fails() {
        let err = parse("import \"fmt\"\n").unwrap_err();
        match err {
            AppError::Parse { path, line, message } => {
                assert_eq!(path, "test.go");
                assert_eq!(line, 1);
                assert!(message.contains("expected 'package'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_file_fails() {
        assert!(matches!(parse(""), Err(AppError::Parse { .. })));
    }

    #[test]
    fn keyword_package_name_fails() {
        assert!(matches!(parse("package func\n"), Err(AppError::Parse { .. })));
    }

    #[test]
    fn unterminated_import_group_fails() {
        let err = parse("package x\n\nimport (\n\t\"fmt\"\n").unwrap_err();
        match err {
            AppError::Parse { line, message, .. } => {
                assert_eq!(line, 5);
                assert!(message.contains("expected ')'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_and_comment_fail() {
        assert!(matches!(
            parse("package x\nimport \"fmt\n\"\n"),
            Err(AppError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse("package x\n/* never closed\nimport \"fmt\"\n"),
            Err(AppError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn missing_and_empty_import_paths_fail() {
        assert!(matches!(
            parse("package x\nimport fmt\n"),
            Err(AppError::Parse { .. })
        ));
        assert!(matches!(
            parse("package x\nimport \"\"\n"),
            Err(AppError::Parse { .. })
        ));
    }

    #[test]
    fn declarations_need_a_separator() {
        let err = parse("package x import \"a\"\n").unwrap_err();
        match err {
            AppError::Parse { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("after package clause"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            parse("package x\nimport \"a\" import \"b\"\n"),
            Err(AppError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse("package x\nimport (\"a\" \"b\")\n"),
            Err(AppError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse("package x\nimport str\n\"strings\"\n"),
            Err(AppError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn separators_may_be_newlines_semicolons_or_eof() {
        let header = parse("package x\nimport (\"a\"; \"b\")\nimport \"c\"").unwrap();
        assert_eq!(header.imports, vec!["a", "b", "c"]);
        let header = parse("package x /* inline */ ; import (\n\"a\"\n\"b\"\n)\n").unwrap();
        assert_eq!(header.imports, vec!["a", "b"]);
        assert!(parse("package x").is_ok());
    }
}
