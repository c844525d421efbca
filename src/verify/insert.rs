//! Statement splitting and INSERT parsing for generated seed documents.
//!
//! Only the subset of MySQL the seed renderer emits is understood: quoted
//! strings escape `'` by doubling it, and values are NULL, TRUE/FALSE,
//! numbers or single-quoted literals.

/// A literal inside a VALUES tuple
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Int(i64),
    /// Decimal or otherwise non-integer numeric text
    Number(String),
    Text(String),
    Bool(bool),
}

impl Literal {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// A top-level statement in a seed document
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Use(String),
    Truncate(String),
    CreateTable(String),
    Insert(InsertStatement),
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Literal>>,
}

impl InsertStatement {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Split a document into statements, dropping `--` comment lines.
///
/// Semicolons inside quoted literals do not terminate a statement.
pub fn split_statements(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    let mut in_string = false;
    let mut line_start = true;

    while pos < bytes.len() {
        let b = bytes[pos];
        if in_string {
            if b == b'\'' {
                if bytes.get(pos + 1) == Some(&b'\'') {
                    pos += 2;
                    continue;
                }
                in_string = false;
            }
            pos += 1;
            continue;
        }

        if line_start && text[pos..].trim_start_matches([' ', '\t']).starts_with("--") {
            let end = text[pos..].find('\n').map_or(bytes.len(), |n| pos + n + 1);
            if text[start..pos].trim().is_empty() {
                start = end;
            }
            pos = end;
            continue;
        }

        match b {
            b'\'' => in_string = true,
            b';' => {
                let stmt = text[start..pos].trim();
                if !stmt.is_empty() {
                    statements.push(stmt);
                }
                start = pos + 1;
            }
            _ => {}
        }
        line_start = b == b'\n';
        pos += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        statements.push(tail);
    }
    statements
}

/// Classify one statement produced by [`split_statements`].
pub fn parse_statement(stmt: &str) -> anyhow::Result<Statement> {
    let upper = stmt.to_ascii_uppercase();
    if upper.starts_with("INSERT INTO") {
        return InsertParser::new(stmt).parse().map(Statement::Insert);
    }
    if let Some(rest) = strip_keyword(stmt, &upper, "TRUNCATE TABLE") {
        return Ok(Statement::Truncate(unquote_ident(rest)));
    }
    if let Some(rest) = strip_keyword(stmt, &upper, "CREATE TABLE IF NOT EXISTS")
        .or_else(|| strip_keyword(stmt, &upper, "CREATE TABLE"))
    {
        let name = rest.split(['(', ' ', '\n']).next().unwrap_or_default();
        return Ok(Statement::CreateTable(unquote_ident(name)));
    }
    if let Some(rest) = strip_keyword(stmt, &upper, "USE") {
        return Ok(Statement::Use(unquote_ident(rest)));
    }
    Ok(Statement::Other(stmt.to_string()))
}

fn strip_keyword<'a>(stmt: &'a str, upper: &str, keyword: &str) -> Option<&'a str> {
    let rest = upper.strip_prefix(keyword)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(stmt[keyword.len()..].trim())
}

fn unquote_ident(s: &str) -> String {
    s.trim().trim_matches('`').trim_matches('"').to_string()
}

/// Byte-level parser for `INSERT INTO t (cols) VALUES (...), (...)`
struct InsertParser<'a> {
    stmt: &'a [u8],
    pos: usize,
}

impl<'a> InsertParser<'a> {
    fn new(stmt: &'a str) -> Self {
        Self {
            stmt: stmt.as_bytes(),
            pos: 0,
        }
    }

    fn parse(&mut self) -> anyhow::Result<InsertStatement> {
        let text = String::from_utf8_lossy(self.stmt);
        let upper = text.to_ascii_uppercase();
        let values_pos = upper
            .find("VALUES")
            .ok_or_else(|| anyhow::anyhow!("INSERT statement missing VALUES keyword"))?;

        let head = &text["INSERT INTO".len()..values_pos];
        let (table, columns) = match head.find('(') {
            Some(open) => {
                let close = head[open..]
                    .rfind(')')
                    .map(|n| open + n)
                    .ok_or_else(|| anyhow::anyhow!("Unterminated column list"))?;
                let columns = head[open + 1..close]
                    .split(',')
                    .map(unquote_ident)
                    .filter(|c| !c.is_empty())
                    .collect();
                (unquote_ident(&head[..open]), columns)
            }
            None => (unquote_ident(head), Vec::new()),
        };
        if table.is_empty() {
            anyhow::bail!("INSERT statement missing table name");
        }

        self.pos = values_pos + "VALUES".len();
        let mut rows = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(b';') => break,
                Some(b'(') => rows.push(self.parse_row()?),
                Some(b',') => self.pos += 1,
                Some(other) => {
                    anyhow::bail!(
                        "Unexpected '{}' in VALUES list of {}",
                        other as char,
                        table
                    )
                }
            }
        }

        Ok(InsertStatement {
            table,
            columns,
            rows,
        })
    }

    fn peek(&self) -> Option<u8> {
        self.stmt.get(self.pos).copied()
    }

    /// Parse a single row "(val1, val2, ...)"
    fn parse_row(&mut self) -> anyhow::Result<Vec<Literal>> {
        self.pos += 1; // Skip '('
        let mut values = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => anyhow::bail!("Unterminated row in VALUES list"),
                Some(b')') => {
                    self.pos += 1;
                    return Ok(values);
                }
                Some(b',') => self.pos += 1,
                Some(_) => values.push(self.parse_value()?),
            }
        }
    }

    fn parse_value(&mut self) -> anyhow::Result<Literal> {
        if self.peek() == Some(b'\'') {
            return self.parse_string_value();
        }

        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b',' || b == b')' || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        let word = String::from_utf8_lossy(&self.stmt[start..self.pos]);

        if word.eq_ignore_ascii_case("NULL") {
            return Ok(Literal::Null);
        }
        if word.eq_ignore_ascii_case("TRUE") {
            return Ok(Literal::Bool(true));
        }
        if word.eq_ignore_ascii_case("FALSE") {
            return Ok(Literal::Bool(false));
        }
        if let Ok(n) = word.parse::<i64>() {
            return Ok(Literal::Int(n));
        }
        if word.parse::<f64>().is_ok() {
            return Ok(Literal::Number(word.into_owned()));
        }
        anyhow::bail!("Unrecognized value: {}", word)
    }

    /// Parse a string literal 'value' with '' as the only escape
    fn parse_string_value(&mut self) -> anyhow::Result<Literal> {
        self.pos += 1; // Skip opening quote
        let mut value = Vec::new();

        while let Some(b) = self.peek() {
            if b == b'\'' {
                if self.stmt.get(self.pos + 1) == Some(&b'\'') {
                    value.push(b'\'');
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return Ok(Literal::Text(String::from_utf8_lossy(&value).into_owned()));
            }
            value.push(b);
            self.pos += 1;
        }

        anyhow::bail!("Unterminated string literal")
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }
}
