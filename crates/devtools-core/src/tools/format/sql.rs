//! `format:sql`: clause-per-line SQL layout
//!
//! The query is tokenized first, which also validates quoting and bracket
//! balance. Keyword case is kept as written.

use crate::types::{ToolOptions, ToolResult};
use crate::tools::error::{HandlerResult, ToolError};

use super::printer::Printer;

/// How clause keywords and their bodies are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    /// Keyword on its own line, body indented below it
    Standard,
    /// Keyword padded to a fixed column, body beside it
    TabularLeft,
    /// Keyword right-aligned to a fixed column, body beside it
    TabularRight,
}

impl IndentStyle {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(IndentStyle::Standard),
            "tabularLeft" => Some(IndentStyle::TabularLeft),
            "tabularRight" => Some(IndentStyle::TabularRight),
            _ => None,
        }
    }

    fn is_tabular(self) -> bool {
        self != IndentStyle::Standard
    }
}

const TABULAR_COLUMN: usize = 10;

/// Keywords that open a clause
const CLAUSES: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP BY", "ORDER BY", "HAVING", "LIMIT", "OFFSET",
    "INSERT INTO", "INSERT", "VALUES", "UPDATE", "SET", "DELETE FROM", "DELETE", "WITH",
    "RETURNING", "WINDOW", "CREATE TABLE", "ALTER TABLE", "DROP TABLE",
];

const SET_OPERATORS: &[&str] = &["UNION ALL", "UNION", "INTERSECT", "EXCEPT"];

/// Keywords that continue a clause on a new line
const LINE_BREAKS: &[&str] = &[
    "AND", "OR", "XOR", "JOIN", "INNER JOIN", "LEFT JOIN", "LEFT OUTER JOIN", "RIGHT JOIN",
    "RIGHT OUTER JOIN", "FULL JOIN", "FULL OUTER JOIN", "CROSS JOIN", "NATURAL JOIN",
];

const RESERVED: &[&str] = &[
    "AS", "ON", "IN", "NOT", "EXISTS", "BETWEEN", "LIKE", "IS", "NULL", "CASE", "WHEN", "THEN",
    "ELSE", "END", "USING", "ALL", "ANY", "SOME", "INTO", "OVER", "DISTINCT", "BY",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Literal,
    Operator,
    Open,
    Close,
    Comma,
    Semicolon,
    Dot,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Clause,
    SetOperator,
    LineBreak,
    Reserved,
    Plain,
}

#[derive(Debug, Clone)]
struct Token {
    kind: Kind,
    text: String,
    /// Whitespace preceded the token in the input
    spaced: bool,
    /// Char offset in the input, for error positions
    offset: usize,
}

fn position(chars: &[char], offset: usize) -> (usize, usize) {
    let before = &chars[..offset.min(chars.len())];
    let line = before.iter().filter(|c| **c == '\n').count() + 1;
    let column = before.iter().rev().take_while(|c| **c != '\n').count() + 1;
    (line, column)
}

fn parse_error(chars: &[char], offset: usize, what: &str) -> ToolError {
    let (line, column) = position(chars, offset);
    ToolError::invalid(format!("Parse error: {} at line {} column {}", what, line, column))
}

const OPERATORS: &[&str] = &[
    "->>", "->", "<>", "<=", ">=", "!=", "||", "::", "<<", ">>", "==", ":=",
];

fn is_operator_char(c: char) -> bool {
    "+-*/%=<>!|&^~#?:@".contains(c)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Read a quoted run ending at an undoubled `close`; returns the end offset
fn quoted(chars: &[char], start: usize, close: char) -> Option<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == close {
            if chars.get(i + 1) == Some(&close) {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn tokenize(chars: &[char]) -> Result<Vec<Token>, ToolError> {
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut spaced = false;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            spaced = true;
            i += 1;
            continue;
        }

        let kind = if c == '-' && next == Some('-') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            Kind::LineComment
        } else if c == '/' && next == Some('*') {
            let end = (i + 2..chars.len().saturating_sub(1))
                .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                .ok_or_else(|| parse_error(chars, start, "Unterminated comment"))?;
            i = end + 2;
            Kind::BlockComment
        } else if matches!(c, '\'' | '"' | '`') {
            i = quoted(chars, i, c).ok_or_else(|| parse_error(chars, start, "Unterminated string"))?;
            Kind::Literal
        } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                i += 1;
            }
            Kind::Literal
        } else if (c == '$' || c == '@' || c == ':')
            && next.is_some_and(|n| n.is_alphanumeric() || n == '_')
            && !(c == ':' && i > 0 && chars[i - 1] == ':')
        {
            i += 1;
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            Kind::Literal
        } else if is_word_char(c) {
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            Kind::Word
        } else {
            i += 1;
            match c {
                '(' | '[' => Kind::Open,
                ')' | ']' => Kind::Close,
                ',' => Kind::Comma,
                ';' => Kind::Semicolon,
                '.' => Kind::Dot,
                _ if is_operator_char(c) => {
                    let rest: String = chars[start..chars.len().min(start + 3)].iter().collect();
                    if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
                        i = start + op.chars().count();
                    }
                    Kind::Operator
                }
                _ => return Err(parse_error(chars, start, &format!("Unexpected \"{}\"", c))),
            }
        };

        tokens.push(Token {
            kind,
            text: chars[start..i].iter().collect(),
            spaced,
            offset: start,
        });
        spaced = false;
    }

    Ok(tokens)
}

/// A token after keyword phrases have been merged
struct Item {
    token: Token,
    role: Role,
    upper: String,
}

fn phrase_len(tokens: &[Token], phrase: &str) -> Option<usize> {
    let words: Vec<&str> = phrase.split(' ').collect();
    if tokens.len() < words.len() {
        return None;
    }
    let matched = tokens
        .iter()
        .zip(&words)
        .all(|(token, word)| token.kind == Kind::Word && token.text.eq_ignore_ascii_case(word));
    matched.then_some(words.len())
}

fn classify(tokens: Vec<Token>) -> Vec<Item> {
    let groups: [(&[&str], Role); 4] = [
        (CLAUSES, Role::Clause),
        (SET_OPERATORS, Role::SetOperator),
        (LINE_BREAKS, Role::LineBreak),
        (RESERVED, Role::Reserved),
    ];

    let mut items = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let best = groups
            .iter()
            .flat_map(|(phrases, role)| phrases.iter().map(move |p| (*p, *role)))
            .filter_map(|(phrase, role)| phrase_len(&tokens[i..], phrase).map(|n| (n, role)))
            .max_by_key(|(n, _)| *n);

        let (len, role) = best.unwrap_or((1, Role::Plain));
        let mut token = tokens[i].clone();
        if len > 1 {
            token.text = tokens[i..i + len]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
        }
        let upper = token.text.to_uppercase();
        items.push(Item { token, role, upper });
        i += len;
    }
    items
}

struct Paren {
    block: bool,
    open: char,
    offset: usize,
}

/// The token written last, for spacing decisions
#[derive(Clone, Copy)]
struct Previous {
    kind: Kind,
    role: Role,
    cast: bool,
}

struct Layout<'a> {
    chars: &'a [char],
    style: IndentStyle,
    printer: Printer,
    stack: Vec<Paren>,
    in_between: bool,
    in_clause: bool,
    previous: Option<Previous>,
}

impl<'a> Layout<'a> {
    fn new(chars: &'a [char], style: IndentStyle, tab_width: usize) -> Self {
        let unit = if style.is_tabular() { TABULAR_COLUMN } else { tab_width };
        Self {
            chars,
            style,
            printer: Printer::spaces(unit),
            stack: Vec::new(),
            in_between: false,
            in_clause: false,
            previous: None,
        }
    }

    fn clause_level(&self) -> usize {
        self.stack.iter().filter(|p| p.block).count() * 2
    }

    fn in_inline_parens(&self) -> bool {
        self.stack.last().is_some_and(|p| !p.block)
    }

    fn keyword_cell(&self, keyword: &str) -> String {
        let width = TABULAR_COLUMN - 1;
        if keyword.chars().count() > width {
            return format!("{} ", keyword);
        }
        match self.style {
            IndentStyle::TabularRight => format!("{:>width$} ", keyword),
            _ => format!("{:<width$} ", keyword),
        }
    }

    fn space_before(&self, token: &Token) -> bool {
        let Some(previous) = self.previous else {
            return false;
        };
        if matches!(previous.kind, Kind::Open | Kind::Dot) || previous.cast || token.text == "::" {
            return false;
        }
        match token.kind {
            Kind::Comma | Kind::Semicolon | Kind::Close | Kind::Dot => false,
            Kind::Open => match previous.kind {
                Kind::Word if previous.role == Role::Plain => token.spaced,
                Kind::Close | Kind::Literal => token.spaced,
                _ => true,
            },
            _ => true,
        }
    }

    fn emit(&mut self, item: &Item) {
        let space = self.space_before(&item.token);
        self.printer.write(&item.token.text, space);
    }

    /// Keyword starting a line at `level`; tabular styles keep the body beside it
    fn keyword_line(&mut self, item: &Item, level: usize, body_below: bool) {
        self.printer.newline(level);
        if self.style.is_tabular() {
            let cell = self.keyword_cell(&item.token.text);
            self.printer.write_open(&cell, false);
        } else {
            self.printer.write(&item.token.text, false);
            if body_below {
                self.printer.newline(level + 1);
            }
        }
    }

    fn open(&mut self, item: &Item, next: Option<&Item>) {
        let block = next.is_some_and(|n| n.upper == "SELECT" || n.upper == "WITH");
        self.emit(item);
        self.stack.push(Paren {
            block,
            open: item.token.text.chars().next().unwrap_or('('),
            offset: item.token.offset,
        });
        if block {
            self.printer.newline(self.clause_level());
        }
    }

    fn close(&mut self, item: &Item) -> Result<(), ToolError> {
        let expected = if item.token.text == "]" { '[' } else { '(' };
        let paren = match self.stack.pop() {
            Some(paren) if paren.open == expected => paren,
            _ => {
                return Err(parse_error(
                    self.chars,
                    item.token.offset,
                    &format!("Unexpected \"{}\"", item.token.text),
                ))
            }
        };
        if paren.block {
            self.printer.newline(self.clause_level() + 1);
            self.printer.write(&item.token.text, false);
        } else {
            self.emit(item);
        }
        Ok(())
    }

    fn item(&mut self, item: &Item, next: Option<&Item>) -> Result<(), ToolError> {
        let base = self.clause_level();
        let inline = self.in_inline_parens();

        match (item.token.kind, item.role) {
            (_, Role::Clause) if !inline => {
                self.in_clause = true;
                self.keyword_line(item, base, true);
            }
            (_, Role::SetOperator) if !inline => {
                self.printer.newline(base);
                self.printer.write(&item.token.text, false);
                self.printer.newline(base);
            }
            (_, Role::LineBreak) if !inline && !(self.in_between && item.upper == "AND") => {
                if self.style.is_tabular() {
                    self.keyword_line(item, base, false);
                } else {
                    self.printer.newline(base + 1);
                    self.printer.write(&item.token.text, false);
                }
            }
            (Kind::Comma, _) => {
                self.emit(item);
                if !inline {
                    self.printer.newline(base + 1);
                }
            }
            (Kind::Open, _) => self.open(item, next),
            (Kind::Close, _) => self.close(item)?,
            (Kind::LineComment, _) => {
                self.emit(item);
                self.printer.newline(base + usize::from(self.in_clause));
            }
            _ => self.emit(item),
        }

        if item.upper == "BETWEEN" {
            self.in_between = true;
        } else if item.upper == "AND" {
            self.in_between = false;
        }
        self.previous = Some(Previous {
            kind: item.token.kind,
            role: item.role,
            cast: item.token.text == "::",
        });
        Ok(())
    }

    fn statement(mut self, items: &[Item]) -> Result<String, ToolError> {
        for (i, item) in items.iter().enumerate() {
            let next = items[i + 1..].iter().find(|n| {
                !matches!(n.token.kind, Kind::LineComment | Kind::BlockComment)
            });
            self.item(item, next)?;
        }
        if let Some(paren) = self.stack.last() {
            return Err(parse_error(
                self.chars,
                paren.offset,
                &format!("Unclosed \"{}\"", paren.open),
            ));
        }
        Ok(self.printer.finish())
    }
}

/// Format SQL text; statements are separated by `lines_between + 1` newlines
pub fn format_sql(
    sql: &str,
    style: IndentStyle,
    tab_width: usize,
    lines_between: usize,
) -> Result<String, ToolError> {
    let chars: Vec<char> = sql.chars().collect();
    let items = classify(tokenize(&chars)?);

    let mut statements = Vec::new();
    for chunk in items.split_inclusive(|item| item.token.kind == Kind::Semicolon) {
        let formatted = Layout::new(&chars, style, tab_width).statement(chunk)?;
        if !formatted.is_empty() && formatted != ";" {
            statements.push(formatted);
        }
    }

    Ok(statements.join(&"\n".repeat(lines_between + 1)))
}

/// `format:sql`
pub fn format(input: &str, options: &ToolOptions) -> HandlerResult {
    if input.is_empty() {
        return Ok(ToolResult::success(""));
    }

    let dialect = options.str_or("language", "sql");
    let style_name = options.str_or("indentStyle", "standard");
    let style = IndentStyle::parse(style_name)
        .ok_or_else(|| ToolError::unsupported("indent style", style_name))?;
    let tab_width = options.count_in("tabWidth", 2, 1, 8);
    let lines_between = options.count_in("linesBetweenQueries", 2, 1, 5);

    let output = format_sql(input, style, tab_width, lines_between)?;

    Ok(ToolResult::success(output)
        .with_metadata("language", dialect)
        .with_metadata("tabWidth", tab_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn standard(sql: &str) -> String {
        format_sql(sql, IndentStyle::Standard, 2, 1).unwrap()
    }

    #[test]
    fn test_clause_layout() {
        assert_eq!(
            standard("SELECT*FROM users WHERE id=1 AND name='test'"),
            "SELECT\n  *\nFROM\n  users\nWHERE\n  id = 1\n  AND name = 'test'"
        );
    }

    #[test]
    fn test_select_list_and_multiword_keywords() {
        assert_eq!(
            standard("select id,name from users order by name limit 10"),
            "select\n  id,\n  name\nfrom\n  users\norder by\n  name\nlimit\n  10"
        );
    }

    #[test]
    fn test_function_calls_stay_inline() {
        assert_eq!(
            standard("SELECT count(*) FROM t WHERE x IN (1,2) AND y BETWEEN 1 AND 5"),
            "SELECT\n  count(*)\nFROM\n  t\nWHERE\n  x IN (1, 2)\n  AND y BETWEEN 1 AND 5"
        );
        assert_eq!(standard("SELECT a::text FROM t"), "SELECT\n  a::text\nFROM\n  t");
    }

    #[test]
    fn test_subquery_block() {
        assert_eq!(
            standard("SELECT * FROM (SELECT id FROM t) AS x"),
            "SELECT\n  *\nFROM\n  (\n    SELECT\n      id\n    FROM\n      t\n  ) AS x"
        );
    }

    #[test]
    fn test_joins_and_set_operators() {
        assert_eq!(
            standard("SELECT a.id FROM a LEFT JOIN b ON a.id = b.id UNION ALL SELECT 1"),
            "SELECT\n  a.id\nFROM\n  a\n  LEFT JOIN b ON a.id = b.id\nUNION ALL\nSELECT\n  1"
        );
    }

    #[test]
    fn test_tabular_styles() {
        assert_eq!(
            format_sql("SELECT id, name FROM users WHERE a = 1 AND b = 2", IndentStyle::TabularLeft, 2, 1)
                .unwrap(),
            "SELECT    id,\n          name\nFROM      users\nWHERE     a = 1\nAND       b = 2"
        );
        assert_eq!(
            format_sql("SELECT id FROM users", IndentStyle::TabularRight, 2, 1).unwrap(),
            "   SELECT id\n     FROM users"
        );
    }

    #[test]
    fn test_statements_separated() {
        assert_eq!(
            format_sql("SELECT 1; SELECT 2;", IndentStyle::Standard, 2, 2).unwrap(),
            "SELECT\n  1;\n\n\nSELECT\n  2;"
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            standard("SELECT a, -- first\nb FROM t"),
            "SELECT\n  a,\n  -- first\n  b\nFROM\n  t"
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = format_sql("INVALID SQL QUERY {{{", IndentStyle::Standard, 2, 1).unwrap_err();
        assert_eq!(err.to_string(), "Parse error: Unexpected \"{\" at line 1 column 19");

        assert!(format_sql("SELECT 'open", IndentStyle::Standard, 2, 1).is_err());
        assert!(format_sql("SELECT (1", IndentStyle::Standard, 2, 1).is_err());
        assert!(format_sql("SELECT 1)", IndentStyle::Standard, 2, 1).is_err());
        assert!(format_sql("SELECT (1]", IndentStyle::Standard, 2, 1).is_err());
    }

    #[test]
    fn test_handler() {
        let empty = format("", &ToolOptions::new()).unwrap();
        assert!(empty.success);
        assert_eq!(empty.output_str(), "");

        let result = format(
            "SELECT * FROM users",
            &ToolOptions::new().with("language", "postgresql").with("tabWidth", 4),
        )
        .unwrap();
        assert_eq!(result.output_str(), "SELECT\n    *\nFROM\n    users");
        assert_eq!(result.meta("language"), Some(&json!("postgresql")));
        assert_eq!(result.meta("tabWidth"), Some(&json!(4)));

        let bad_style = format("SELECT 1", &ToolOptions::new().with("indentStyle", "diagonal"));
        assert!(bad_style.is_err());
    }
}
