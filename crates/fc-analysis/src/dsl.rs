//! Schema DSL parser
//!
//! Parses annotation strings such as `{id: Int64, tags: List[Utf8?]?}`
//! into [`FrameType`] values. The grammar is:
//!
//! ```text
//! frame    := '{' [ field (',' field)* ] '}'
//! field    := name ':' typeExpr
//! typeExpr := baseType [ '?' ]
//! baseType := scalarName
//!           | 'List' '[' typeExpr ']'
//!           | 'Struct' '{' field (',' field)* '}'
//!           | scalarName '(' arg (',' arg)* ')'
//! ```
//!
//! Names and arguments are bare words or double-quoted strings. Errors
//! carry the byte offset of the offending token.

use crate::error::{InferResult, TypeError};
use crate::frame::{Column, FrameType};
use crate::types::{
    is_word_char, DataType, FloatBitWidth, IntBitWidth, StructField, TypeKind, MAX_DECIMAL_PRECISION,
};
use std::collections::HashSet;

/// Parse a frame schema string
pub fn parse_schema(text: &str) -> InferResult<FrameType> {
    let mut parser = Parser::new(text)?;
    let fields = parser.field_list(TokenKind::LBrace, TokenKind::RBrace)?;
    parser.expect_end()?;
    let columns = fields
        .into_iter()
        .map(|(name, data_type)| Column::new(name, data_type))
        .collect();
    FrameType::new(columns)
}

/// Parse a single type expression such as `Decimal(10, 2)?`
pub fn parse_type(text: &str) -> InferResult<DataType> {
    let mut parser = Parser::new(text)?;
    let data_type = parser.type_expr()?;
    parser.expect_end()?;
    Ok(data_type)
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Question,
    Word(String),
    Quoted(String),
    End,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
    /// Source text of the token, used in error messages
    text: String,
}

fn malformed(offset: usize, fragment: &str, message: impl Into<String>) -> TypeError {
    TypeError::MalformedSchema {
        offset,
        fragment: fragment.to_string(),
        message: message.into(),
    }
}

fn tokenize(text: &str) -> InferResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let punct = match c {
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ':' => Some(TokenKind::Colon),
            ',' => Some(TokenKind::Comma),
            '?' => Some(TokenKind::Question),
            _ => None,
        };
        if let Some(kind) = punct {
            chars.next();
            tokens.push(Token {
                kind,
                offset,
                text: c.to_string(),
            });
            continue;
        }

        if c == '"' {
            chars.next();
            let mut value = String::new();
            let mut end = None;
            while let Some((i, ch)) = chars.next() {
                match ch {
                    '"' => {
                        end = Some(i + 1);
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, escaped)) => value.push(escaped),
                        None => break,
                    },
                    _ => value.push(ch),
                }
            }
            let end = end.ok_or_else(|| malformed(offset, &text[offset..], "unterminated string"))?;
            tokens.push(Token {
                kind: TokenKind::Quoted(value),
                offset,
                text: text[offset..end].to_string(),
            });
            continue;
        }

        if is_word_char(c) {
            let mut end = offset;
            while let Some(&(i, ch)) = chars.peek() {
                if !is_word_char(ch) {
                    break;
                }
                end = i + ch.len_utf8();
                chars.next();
            }
            let word = &text[offset..end];
            tokens.push(Token {
                kind: TokenKind::Word(word.to_string()),
                offset,
                text: word.to_string(),
            });
            continue;
        }

        return Err(malformed(offset, &c.to_string(), "unexpected character"));
    }

    tokens.push(Token {
        kind: TokenKind::End,
        offset: text.len(),
        text: "end of input".to_string(),
    });
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> InferResult<Self> {
        Ok(Self {
            tokens: tokenize(text)?,
            pos: 0,
        })
    }

    fn peek(&self) -> &Token {
        // tokenize always ends with an End token and `advance` never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    fn error_here(&self, message: impl Into<String>) -> TypeError {
        let token = self.peek();
        malformed(token.offset, &token.text, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> InferResult<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("expected {}", what)))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_end(&self) -> InferResult<()> {
        if self.peek().kind == TokenKind::End {
            Ok(())
        } else {
            Err(self.error_here("unexpected trailing input"))
        }
    }

    /// `open [ field (',' field)* ] close`, rejecting duplicate names
    fn field_list(
        &mut self,
        open: TokenKind,
        close: TokenKind,
    ) -> InferResult<Vec<(String, DataType)>> {
        self.expect(open, "'{'")?;
        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        if self.eat(close.clone()) {
            return Ok(fields);
        }
        loop {
            let name_token = self.peek().clone();
            let name = self.name()?;
            if !seen.insert(name.clone()) {
                return Err(malformed(
                    name_token.offset,
                    &name_token.text,
                    format!("duplicate field '{}'", name),
                ));
            }
            self.expect(TokenKind::Colon, "':'")?;
            let data_type = self.type_expr()?;
            fields.push((name, data_type));

            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(close, "',' or '}'")?;
            return Ok(fields);
        }
    }

    fn name(&mut self) -> InferResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Word(word) => {
                self.advance();
                Ok(word)
            }
            TokenKind::Quoted(value) => {
                self.advance();
                Ok(value)
            }
            _ => Err(self.error_here("expected a field name")),
        }
    }

    fn type_expr(&mut self) -> InferResult<DataType> {
        let kind = self.base_type()?;
        if self.eat(TokenKind::Question) {
            if self.peek().kind == TokenKind::Question {
                return Err(self.error_here("nullable marker '?' repeated"));
            }
            Ok(DataType::nullable(kind))
        } else {
            Ok(DataType::new(kind))
        }
    }

    fn base_type(&mut self) -> InferResult<TypeKind> {
        let token = self.advance();
        let name = match &token.kind {
            TokenKind::Word(word) => word.clone(),
            _ => {
                return Err(malformed(token.offset, &token.text, "expected a type name"));
            }
        };

        match name.as_str() {
            "List" => {
                self.expect(TokenKind::LBracket, "'[' after List")?;
                let element = self.type_expr()?;
                self.expect(TokenKind::RBracket, "']'")?;
                return Ok(TypeKind::List(Box::new(element)));
            }
            "Struct" => {
                let fields = self.field_list(TokenKind::LBrace, TokenKind::RBrace)?;
                return Ok(TypeKind::Struct(
                    fields
                        .into_iter()
                        .map(|(name, data_type)| StructField::new(name, data_type))
                        .collect(),
                ));
            }
            _ => {}
        }

        let args = if self.peek().kind == TokenKind::LParen {
            Some(self.args()?)
        } else {
            None
        };
        scalar_kind(&token, &name, args)
    }

    /// `'(' arg (',' arg)* ')'`
    fn args(&mut self) -> InferResult<Vec<Token>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Word(_) | TokenKind::Quoted(_) => args.push(self.advance()),
                _ => return Err(self.error_here("expected an argument")),
            }
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen, "',' or ')'")?;
            return Ok(args);
        }
    }
}

fn arg_value(token: &Token) -> String {
    match &token.kind {
        TokenKind::Word(value) | TokenKind::Quoted(value) => value.clone(),
        _ => token.text.clone(),
    }
}

fn arity_error(token: &Token, name: &str, expected: &str) -> TypeError {
    malformed(
        token.offset,
        &token.text,
        format!("{} takes {}", name, expected),
    )
}

fn scalar_kind(token: &Token, name: &str, args: Option<Vec<Token>>) -> InferResult<TypeKind> {
    let simple = match name {
        "Int8" => Some(TypeKind::Int(IntBitWidth::I8)),
        "Int16" => Some(TypeKind::Int(IntBitWidth::I16)),
        "Int32" => Some(TypeKind::Int(IntBitWidth::I32)),
        "Int64" => Some(TypeKind::Int(IntBitWidth::I64)),
        "UInt8" => Some(TypeKind::UInt(IntBitWidth::I8)),
        "UInt16" => Some(TypeKind::UInt(IntBitWidth::I16)),
        "UInt32" => Some(TypeKind::UInt(IntBitWidth::I32)),
        "UInt64" => Some(TypeKind::UInt(IntBitWidth::I64)),
        "Float32" => Some(TypeKind::Float(FloatBitWidth::F32)),
        "Float64" => Some(TypeKind::Float(FloatBitWidth::F64)),
        "Utf8" => Some(TypeKind::Utf8),
        "Boolean" => Some(TypeKind::Boolean),
        "Date" => Some(TypeKind::Date),
        "Duration" => Some(TypeKind::Duration),
        "Categorical" => Some(TypeKind::Categorical),
        _ => None,
    };
    if let Some(kind) = simple {
        return match args {
            None => Ok(kind),
            Some(_) => Err(arity_error(token, name, "no arguments")),
        };
    }

    match name {
        "Datetime" => match args.as_deref() {
            None => Ok(TypeKind::Datetime { time_zone: None }),
            Some([tz]) => Ok(TypeKind::Datetime {
                time_zone: Some(arg_value(tz)),
            }),
            Some(_) => Err(arity_error(token, name, "at most one argument")),
        },
        "Decimal" => match args.as_deref() {
            Some([precision, scale]) => {
                let precision_value = decimal_arg(precision)?;
                let scale_value = decimal_arg(scale)?;
                if precision_value == 0 || precision_value > MAX_DECIMAL_PRECISION {
                    return Err(malformed(
                        precision.offset,
                        &precision.text,
                        format!("precision must be between 1 and {}", MAX_DECIMAL_PRECISION),
                    ));
                }
                if scale_value > precision_value {
                    return Err(malformed(
                        scale.offset,
                        &scale.text,
                        "scale cannot exceed precision",
                    ));
                }
                Ok(TypeKind::Decimal {
                    precision: precision_value,
                    scale: scale_value,
                })
            }
            _ => Err(arity_error(token, name, "exactly two arguments (precision, scale)")),
        },
        "Enum" => Ok(TypeKind::Enum {
            categories: args
                .unwrap_or_default()
                .iter()
                .map(arg_value)
                .collect(),
        }),
        _ => Err(malformed(
            token.offset,
            &token.text,
            format!("unknown type '{}'", name),
        )),
    }
}

fn decimal_arg(token: &Token) -> InferResult<u8> {
    match &token.kind {
        TokenKind::Word(word) => word
            .parse::<u8>()
            .map_err(|_| malformed(token.offset, &token.text, "expected an integer")),
        _ => Err(malformed(token.offset, &token.text, "expected an integer")),
    }
}

#[cfg(test)]
#[path = "dsl_test.rs"]
mod tests;
