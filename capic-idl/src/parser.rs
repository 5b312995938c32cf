//! Franca IDL parser.
//!
//! Parses the scalar subset of Franca IDL that the stub generator supports:
//! a package declaration, interfaces, and methods with `in`/`out` argument
//! blocks. Constructs the generator has no use for (versions, attributes,
//! broadcasts, type definitions, type collections, contracts, imports) are
//! recognized and skipped.

use crate::error::ParseError;
use crate::model::{Argument, Interface, Method, Model, PredefinedType, TypeRef};

/// Source line numbers of the model elements, parallel to the model vectors.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    interfaces: Vec<InterfaceLines>,
}

#[derive(Debug, Clone, Default)]
struct InterfaceLines {
    line: usize,
    methods: Vec<MethodLines>,
}

#[derive(Debug, Clone, Default)]
struct MethodLines {
    line: usize,
    in_args: Vec<usize>,
    out_args: Vec<usize>,
}

/// Direction of a method argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgDirection {
    /// `in` block.
    In,
    /// `out` block.
    Out,
}

impl SourceMap {
    /// Line of the interface at `iface`, or 0 if unknown.
    #[must_use]
    pub fn interface_line(&self, iface: usize) -> usize {
        self.interfaces.get(iface).map_or(0, |i| i.line)
    }

    /// Line of method `method` of interface `iface`, or 0 if unknown.
    #[must_use]
    pub fn method_line(&self, iface: usize, method: usize) -> usize {
        self.method(iface, method).map_or(0, |m| m.line)
    }

    /// Line of an argument, or 0 if unknown.
    #[must_use]
    pub fn arg_line(&self, iface: usize, method: usize, dir: ArgDirection, arg: usize) -> usize {
        self.method(iface, method)
            .and_then(|m| match dir {
                ArgDirection::In => m.in_args.get(arg),
                ArgDirection::Out => m.out_args.get(arg),
            })
            .copied()
            .unwrap_or(0)
    }

    fn method(&self, iface: usize, method: usize) -> Option<&MethodLines> {
        self.interfaces.get(iface)?.methods.get(method)
    }
}

/// Parses Franca IDL source into a model.
///
/// # Arguments
/// * `source` - Franca IDL text
///
/// # Returns
/// The model together with the source lines of its elements.
///
/// # Errors
/// Returns `ParseError` on the first syntax error.
pub fn parse_fidl(source: &str) -> Result<(Model, SourceMap), ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        last_line: source.lines().count().max(1),
    };
    parser.parse_model()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Word(String),
    Str(String),
    Sym(char),
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word(w) => f.write_str(w),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Sym(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

const SYMBOLS: &[char] = &['{', '}', '[', ']', '=', ':', ',', '(', ')', '<', '>', '-', '+'];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '*'
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let start_line = line;
                i = skip_until(&chars, i + 2, &['*', '/'], &mut line).ok_or(
                    ParseError::Unterminated {
                        line: start_line,
                        what: "block comment",
                    },
                )?;
            }
            '<' if chars.get(i + 1) == Some(&'*') && chars.get(i + 2) == Some(&'*') => {
                let start_line = line;
                i = skip_until(&chars, i + 3, &['*', '*', '>'], &mut line).ok_or(
                    ParseError::Unterminated {
                        line: start_line,
                        what: "annotation block",
                    },
                )?;
            }
            '"' => {
                let start_line = line;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some('"') => break,
                        Some('\n') => {
                            return Err(ParseError::Unterminated {
                                line: start_line,
                                what: "string literal",
                            });
                        }
                        Some(&ch) => text.push(ch),
                        None => {
                            return Err(ParseError::Unterminated {
                                line: start_line,
                                what: "string literal",
                            });
                        }
                    }
                    i += 1;
                }
                i += 1;
                tokens.push(Token {
                    tok: Tok::Str(text),
                    line: start_line,
                });
            }
            c if is_word_char(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token {
                    tok: Tok::Word(chars[start..i].iter().collect()),
                    line,
                });
            }
            c if SYMBOLS.contains(&c) => {
                tokens.push(Token {
                    tok: Tok::Sym(c),
                    line,
                });
                i += 1;
            }
            ch => return Err(ParseError::InvalidCharacter { line, ch }),
        }
    }

    Ok(tokens)
}

/// Advances past the terminator, counting newlines. Returns `None` at EOF.
fn skip_until(chars: &[char], mut i: usize, terminator: &[char], line: &mut usize) -> Option<usize> {
    while i < chars.len() {
        if chars[i..].starts_with(terminator) {
            return Some(i + terminator.len());
        }
        if chars[i] == '\n' {
            *line += 1;
        }
        i += 1;
    }
    None
}

/// Keywords that may start a member of an interface body.
const INTERFACE_MEMBERS: &[&str] = &[
    "version",
    "method",
    "attribute",
    "broadcast",
    "contract",
    "array",
    "enumeration",
    "struct",
    "union",
    "map",
    "typedef",
];

/// Keywords that may start a top-level declaration.
const TOP_LEVEL: &[&str] = &["package", "import", "interface", "typeCollection"];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    last_line: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Token {
                tok: Tok::Word(w), ..
            }) => Some(w),
            _ => None,
        }
    }

    fn is_sym(&self, c: char) -> bool {
        matches!(self.peek(), Some(Token { tok: Tok::Sym(s), .. }) if *s == c)
    }

    fn next(&mut self, expected: &str) -> Result<Token, ParseError> {
        let token = self.tokens.get(self.pos).cloned().ok_or_else(|| {
            ParseError::UnexpectedEof {
                line: self.last_line,
                expected: expected.to_string(),
            }
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_word(&mut self, expected: &str) -> Result<(String, usize), ParseError> {
        let token = self.next(expected)?;
        match token.tok {
            Tok::Word(w) => Ok((w, token.line)),
            other => Err(ParseError::unexpected(token.line, expected, other.to_string())),
        }
    }

    fn expect_sym(&mut self, c: char) -> Result<usize, ParseError> {
        let expected = format!("'{c}'");
        let token = self.next(&expected)?;
        match token.tok {
            Tok::Sym(s) if s == c => Ok(token.line),
            other => Err(ParseError::unexpected(token.line, expected, other.to_string())),
        }
    }

    /// Skips a balanced `{ ... }` block; the opening brace is next.
    fn skip_block(&mut self) -> Result<(), ParseError> {
        self.expect_sym('{')?;
        let mut depth = 1;
        while depth > 0 {
            let token = self.next("'}'")?;
            match token.tok {
                Tok::Sym('{') => depth += 1,
                Tok::Sym('}') => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Skips a declaration: everything up to and including its block, or up
    /// to the next member keyword or closing brace if it has none.
    fn skip_declaration(&mut self, stop_words: &[&str]) -> Result<(), ParseError> {
        loop {
            if self.is_sym('{') {
                return self.skip_block();
            }
            if self.is_sym('}') || self.peek().is_none() {
                return Ok(());
            }
            if let Some(w) = self.peek_word()
                && stop_words.contains(&w)
            {
                return Ok(());
            }
            self.pos += 1;
        }
    }

    fn parse_model(&mut self) -> Result<(Model, SourceMap), ParseError> {
        let mut model = Model::default();
        let mut lines = SourceMap::default();

        if self.peek_word() == Some("package") {
            self.pos += 1;
            let (package, _) = self.expect_word("package name")?;
            model.package = Some(package);
        }

        while let Some(token) = self.peek().cloned() {
            match &token.tok {
                Tok::Word(w) if w == "import" => {
                    self.pos += 1;
                    self.skip_declaration(TOP_LEVEL)?;
                }
                Tok::Word(w) if w == "typeCollection" => {
                    self.pos += 1;
                    self.skip_declaration(TOP_LEVEL)?;
                }
                Tok::Word(w) if w == "interface" => {
                    self.pos += 1;
                    let (api, api_lines) = self.parse_interface(token.line)?;
                    model.interfaces.push(api);
                    lines.interfaces.push(api_lines);
                }
                other => {
                    return Err(ParseError::unexpected(
                        token.line,
                        "'interface', 'typeCollection' or 'import'",
                        other.to_string(),
                    ));
                }
            }
        }

        Ok((model, lines))
    }

    fn parse_interface(&mut self, line: usize) -> Result<(Interface, InterfaceLines), ParseError> {
        let (name, _) = self.expect_word("interface name")?;
        let mut api = Interface::new(name);
        let mut api_lines = InterfaceLines {
            line,
            methods: Vec::new(),
        };

        // Inheritance and management clauses carry no generated code.
        while !self.is_sym('{') {
            let (word, line) = self.expect_word("'{'")?;
            if word != "extends" && word != "manages" {
                return Err(ParseError::unexpected(line, "'{'", word));
            }
            self.expect_word("interface name")?;
            while self.is_sym(',') {
                self.pos += 1;
                self.expect_word("interface name")?;
            }
        }
        self.expect_sym('{')?;

        loop {
            if self.is_sym('}') {
                self.pos += 1;
                break;
            }
            let (word, line) = self.expect_word("interface member or '}'")?;
            match word.as_str() {
                "method" => {
                    let (method, method_lines) = self.parse_method(line)?;
                    api.methods.push(method);
                    api_lines.methods.push(method_lines);
                }
                "version" | "contract" => self.skip_block()?,
                w if INTERFACE_MEMBERS.contains(&w) => self.skip_declaration(INTERFACE_MEMBERS)?,
                _ => {
                    return Err(ParseError::unexpected(line, "interface member or '}'", word));
                }
            }
        }

        Ok((api, api_lines))
    }

    fn parse_method(&mut self, line: usize) -> Result<(Method, MethodLines), ParseError> {
        let (name, _) = self.expect_word("method name")?;
        let mut method = Method::new(name);
        let mut method_lines = MethodLines {
            line,
            ..MethodLines::default()
        };

        // Overloaded methods carry a selector: `method name:selector`.
        if self.is_sym(':') {
            self.pos += 1;
            self.expect_word("method selector")?;
        }
        if self.peek_word() == Some("fireAndForget") {
            self.pos += 1;
            method.fire_and_forget = true;
        }

        self.expect_sym('{')?;
        loop {
            if self.is_sym('}') {
                self.pos += 1;
                break;
            }
            let (word, line) = self.expect_word("'in', 'out', 'error' or '}'")?;
            match word.as_str() {
                "in" => {
                    let (args, arg_lines) = self.parse_arguments()?;
                    method.in_args.extend(args);
                    method_lines.in_args.extend(arg_lines);
                }
                "out" => {
                    let (args, arg_lines) = self.parse_arguments()?;
                    method.out_args.extend(args);
                    method_lines.out_args.extend(arg_lines);
                }
                "error" => {
                    if self.is_sym('{') {
                        self.skip_block()?;
                    } else {
                        self.expect_word("error enumeration")?;
                    }
                }
                _ => {
                    return Err(ParseError::unexpected(
                        line,
                        "'in', 'out', 'error' or '}'",
                        word,
                    ));
                }
            }
        }

        Ok((method, method_lines))
    }

    fn parse_arguments(&mut self) -> Result<(Vec<Argument>, Vec<usize>), ParseError> {
        let mut args = Vec::new();
        let mut lines = Vec::new();

        self.expect_sym('{')?;
        loop {
            if self.is_sym('}') {
                self.pos += 1;
                break;
            }
            let (type_name, line) = self.expect_word("argument type or '}'")?;
            let mut type_ref = match PredefinedType::from_idl_name(&type_name) {
                Some(p) => TypeRef::Predefined(p),
                None => TypeRef::Derived(type_name),
            };
            // Inline arrays are user-defined types as far as mapping goes.
            if self.is_sym('[') {
                self.pos += 1;
                self.expect_sym(']')?;
                type_ref = TypeRef::Derived(format!("{type_ref}[]"));
            }
            let (name, _) = self.expect_word("argument name")?;
            args.push(Argument::new(type_ref, name));
            lines.push(line);
        }

        Ok((args, lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALCULATOR: &str = r#"package org.genivi.capic.simple

<** @description: Simple calculator **>
interface Calculator {
    version { major 1 minor 0 }

    method split {
        in {
            Double value
        }
        out {
            Int32 whole
            Int32 fraction
        }
    }
}
"#;

    #[test]
    fn test_parse_simple_interface() {
        let (model, lines) = parse_fidl(CALCULATOR).expect("Failed to parse");
        assert_eq!(model.package.as_deref(), Some("org.genivi.capic.simple"));
        assert_eq!(model.interfaces.len(), 1);

        let api = &model.interfaces[0];
        assert_eq!(api.name, "Calculator");
        assert_eq!(api.methods.len(), 1);

        let split = &api.methods[0];
        assert_eq!(split.name, "split");
        assert!(!split.fire_and_forget);
        assert_eq!(
            split.in_args,
            vec![Argument::new(PredefinedType::Double, "value")]
        );
        assert_eq!(split.out_args[1].name, "fraction");

        assert_eq!(lines.interface_line(0), 4);
        assert_eq!(lines.method_line(0, 0), 7);
        assert_eq!(lines.arg_line(0, 0, ArgDirection::Out, 1), 13);
        assert_eq!(lines.method_line(3, 3), 0);
    }

    #[test]
    fn test_parse_fire_and_forget_and_skipped_members() {
        let source = r#"
package game
import org.example.* from "common.fidl"

typeCollection Shared {
    enumeration Color { RED GREEN }
}

interface Ball extends Toy {
    attribute UInt32 size readonly
    broadcast bounced { out { UInt8 height } }
    struct Point { Int32 x Int32 y }
    array Points of Point
    method grab {
        out { Boolean success }
    }
    // drop it on the floor
    method drop fireAndForget {
    }
    method paint {
        in { Color color }
        error { FAILED }
    }
}
"#;
        let (model, _) = parse_fidl(source).expect("Failed to parse");
        let ball = model.get_interface("Ball").expect("interface");
        let names: Vec<_> = ball.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["grab", "drop", "paint"]);

        assert!(ball.methods[1].fire_and_forget);
        assert!(ball.methods[1].in_args.is_empty());
        assert_eq!(
            ball.methods[2].in_args[0].type_ref,
            TypeRef::Derived("Color".to_string())
        );
    }

    #[test]
    fn test_parse_array_argument() {
        let source = "interface A { method m { in { UInt8[] data } } }";
        let (model, _) = parse_fidl(source).expect("Failed to parse");
        assert_eq!(
            model.interfaces[0].methods[0].in_args[0].type_ref,
            TypeRef::Derived("UInt8[]".to_string())
        );
    }

    #[test]
    fn test_parse_empty_interface() {
        let (model, _) = parse_fidl("interface Empty {}").expect("Failed to parse");
        assert!(model.package.is_none());
        assert!(model.interfaces[0].methods.is_empty());
    }

    #[test]
    fn test_parse_missing_brace() {
        let err = parse_fidl("interface Broken {\n    method m {\n").expect_err("should fail");
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_parse_unknown_member() {
        let err = parse_fidl("interface A {\n  property x\n}").expect_err("should fail");
        assert_eq!(err.line(), 2);
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.line, 2);
        assert!(diagnostic.message.contains("property"));
    }

    #[test]
    fn test_parse_unterminated_comment() {
        let err = parse_fidl("/* never closed\ninterface A {}").expect_err("should fail");
        assert!(matches!(
            err,
            ParseError::Unterminated {
                line: 1,
                what: "block comment"
            }
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        let err = parse_fidl("interface A {\n method m; }").expect_err("should fail");
        assert!(matches!(
            err,
            ParseError::InvalidCharacter { line: 2, ch: ';' }
        ));
    }
}
