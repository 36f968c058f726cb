//! Parser for the CQL subset the in-process engine understands.

use tetra_types::Value;

use crate::CqlError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Unquoted identifier or keyword, lowercased.
    Word(String),
    /// Double-quoted identifier, case preserved.
    Quoted(String),
    Marker,
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(char),
}

fn tokenize(cql: &str) -> Result<Vec<Token>, CqlError> {
    let mut tokens = Vec::new();
    let mut chars = cql.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '?' => {
                chars.next();
                tokens.push(Token::Marker);
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(q) if q == c => {
                            if chars.peek() == Some(&c) {
                                chars.next();
                                text.push(c);
                            } else {
                                break;
                            }
                        }
                        Some(other) => text.push(other),
                        None => return Err(CqlError::syntax("unterminated quote")),
                    }
                }
                tokens.push(if c == '"' {
                    Token::Quoted(text)
                } else {
                    Token::Str(text)
                });
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let token = if text.contains('.') {
                    text.parse().map(Token::Float).ok()
                } else {
                    text.parse().map(Token::Int).ok()
                };
                tokens.push(token.ok_or_else(|| CqlError::syntax(format!("bad number {text}")))?);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        word.push(d.to_ascii_lowercase());
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            '*' | ',' | '(' | ')' | '=' | '.' | ';' => {
                chars.next();
                tokens.push(Token::Symbol(c));
            }
            other => return Err(CqlError::syntax(format!("unexpected character {other:?}"))),
        }
    }
    Ok(tokens)
}

/// A value position in a statement: a bind marker or a literal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Marker,
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TableRef {
    pub keyspace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    Select {
        table: TableRef,
        /// `None` for `*`.
        columns: Option<Vec<String>>,
        filters: Vec<(String, Operand)>,
        limit: Option<usize>,
        allow_filtering: bool,
    },
    Insert {
        table: TableRef,
        columns: Vec<String>,
        values: Vec<Operand>,
    },
    Delete {
        table: TableRef,
        filters: Vec<(String, Operand)>,
    },
}

impl Statement {
    /// Number of `?` markers, in binding order.
    pub(crate) fn markers(&self) -> usize {
        let count = |ops: &mut dyn Iterator<Item = &Operand>| {
            ops.filter(|o| **o == Operand::Marker).count()
        };
        match self {
            Statement::Select { filters, .. } | Statement::Delete { filters, .. } => {
                count(&mut filters.iter().map(|(_, o)| o))
            }
            Statement::Insert { values, .. } => count(&mut values.iter()),
        }
    }
}

pub(crate) fn parse(cql: &str) -> Result<Statement, CqlError> {
    let mut parser = Parser {
        tokens: tokenize(cql)?,
        pos: 0,
    };
    let statement = match parser.word()?.as_str() {
        "select" => parser.select()?,
        "insert" => parser.insert()?,
        "delete" => parser.delete()?,
        other => return Err(CqlError::syntax(format!("unsupported statement {other}"))),
    };
    parser.eat_symbol(';');
    if let Some(token) = parser.peek() {
        return Err(CqlError::syntax(format!("unexpected trailing {token:?}")));
    }
    Ok(statement)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, CqlError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| CqlError::syntax("unexpected end of statement"))?;
        self.pos += 1;
        Ok(token)
    }

    fn word(&mut self) -> Result<String, CqlError> {
        match self.next()? {
            Token::Word(w) => Ok(w),
            other => Err(CqlError::syntax(format!("expected keyword, found {other:?}"))),
        }
    }

    fn keyword(&mut self, expected: &str) -> Result<(), CqlError> {
        let word = self.word()?;
        if word == expected {
            Ok(())
        } else {
            Err(CqlError::syntax(format!(
                "expected {}, found {}",
                expected.to_uppercase(),
                word.to_uppercase()
            )))
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == keyword)
    }

    fn symbol(&mut self, expected: char) -> Result<(), CqlError> {
        match self.next()? {
            Token::Symbol(c) if c == expected => Ok(()),
            other => Err(CqlError::syntax(format!("expected {expected:?}, found {other:?}"))),
        }
    }

    fn eat_symbol(&mut self, expected: char) -> bool {
        if self.peek() == Some(&Token::Symbol(expected)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Result<String, CqlError> {
        match self.next()? {
            Token::Word(w) | Token::Quoted(w) => Ok(w),
            other => Err(CqlError::syntax(format!("expected identifier, found {other:?}"))),
        }
    }

    fn table(&mut self) -> Result<TableRef, CqlError> {
        let first = self.identifier()?;
        if self.eat_symbol('.') {
            Ok(TableRef {
                keyspace: Some(first),
                name: self.identifier()?,
            })
        } else {
            Ok(TableRef {
                keyspace: None,
                name: first,
            })
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<String>, CqlError> {
        let mut names = vec![self.identifier()?];
        while self.eat_symbol(',') {
            names.push(self.identifier()?);
        }
        Ok(names)
    }

    fn operand(&mut self) -> Result<Operand, CqlError> {
        match self.next()? {
            Token::Marker => Ok(Operand::Marker),
            Token::Int(n) => Ok(Operand::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Operand::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Operand::Literal(Value::Text(s))),
            Token::Word(w) if w == "null" => Ok(Operand::Literal(Value::Null)),
            Token::Word(w) if w == "true" => Ok(Operand::Literal(Value::Bool(true))),
            Token::Word(w) if w == "false" => Ok(Operand::Literal(Value::Bool(false))),
            other => Err(CqlError::syntax(format!("expected value, found {other:?}"))),
        }
    }

    fn filters(&mut self) -> Result<Vec<(String, Operand)>, CqlError> {
        let mut filters = Vec::new();
        if !self.at_keyword("where") {
            return Ok(filters);
        }
        self.pos += 1;
        loop {
            let column = self.identifier()?;
            self.symbol('=')?;
            filters.push((column, self.operand()?));
            if !self.at_keyword("and") {
                return Ok(filters);
            }
            self.pos += 1;
        }
    }

    fn select(&mut self) -> Result<Statement, CqlError> {
        let columns = if self.eat_symbol('*') {
            None
        } else {
            Some(self.identifier_list()?)
        };
        self.keyword("from")?;
        let table = self.table()?;
        let filters = self.filters()?;
        let mut limit = None;
        if self.at_keyword("limit") {
            self.pos += 1;
            match self.next()? {
                Token::Int(n) if n > 0 => limit = usize::try_from(n).ok(),
                other => return Err(CqlError::syntax(format!("bad LIMIT {other:?}"))),
            }
        }
        let mut allow_filtering = false;
        if self.at_keyword("allow") {
            self.pos += 1;
            self.keyword("filtering")?;
            allow_filtering = true;
        }
        Ok(Statement::Select {
            table,
            columns,
            filters,
            limit,
            allow_filtering,
        })
    }

    fn insert(&mut self) -> Result<Statement, CqlError> {
        self.keyword("into")?;
        let table = self.table()?;
        self.symbol('(')?;
        let columns = self.identifier_list()?;
        self.symbol(')')?;
        self.keyword("values")?;
        self.symbol('(')?;
        let mut values = vec![self.operand()?];
        while self.eat_symbol(',') {
            values.push(self.operand()?);
        }
        self.symbol(')')?;
        if columns.len() != values.len() {
            return Err(CqlError::invalid(format!(
                "{} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(Statement::Insert {
            table,
            columns,
            values,
        })
    }

    fn delete(&mut self) -> Result<Statement, CqlError> {
        self.keyword("from")?;
        let table = self.table()?;
        let filters = self.filters()?;
        Ok(Statement::Delete { table, filters })
    }
}
