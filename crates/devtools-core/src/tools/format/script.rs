//! Brace-style beautifier for JavaScript, TypeScript and JSON
//!
//! Tolerant by construction: unknown characters pass through as operators and
//! unbalanced brackets only affect indentation.

use super::printer::Printer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Literal,
    LineComment,
    BlockComment,
    Open,
    Close,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    Operator,
}

#[derive(Debug, Clone)]
struct Token {
    kind: Kind,
    text: String,
    newlines_before: usize,
}

const OPERATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", ">>>", "...", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "?:", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

/// Keywords followed by a space before `(`
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "typeof", "await", "yield", "in",
    "of", "do", "else", "case", "delete", "void", "throw",
];

/// Keywords after which `/` starts a regular expression
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await",
];

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '#'
}

/// Index just past a quoted run; unterminated runs extend to the end
fn skip_quoted(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index just past a regex literal, or `None` when the line ends first
fn skip_regex(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < chars.len() {
        match chars[i] {
            '\n' => return None,
            '\\' => i += 1,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn regex_allowed(previous: Option<&Token>) -> bool {
    match previous {
        None => true,
        Some(token) => match token.kind {
            Kind::Word => EXPRESSION_KEYWORDS.contains(&token.text.as_str()),
            Kind::Literal | Kind::Close => false,
            _ => true,
        },
    }
}

fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;
    let mut newlines = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let start = i;

        if c.is_whitespace() {
            if c == '\n' {
                newlines += 1;
            }
            i += 1;
            continue;
        }

        let kind = if c == '/' && next == Some('/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            Kind::LineComment
        } else if c == '/' && next == Some('*') {
            i = (i + 2..chars.len().saturating_sub(1))
                .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                .map_or(chars.len(), |j| j + 2);
            Kind::BlockComment
        } else if matches!(c, '\'' | '"' | '`') {
            i = skip_quoted(&chars, i);
            Kind::Literal
        } else if let Some(end) = (c == '/' && regex_allowed(tokens.last()))
            .then(|| skip_regex(&chars, i))
            .flatten()
        {
            i = end;
            Kind::Literal
        } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            i += 1;
            while i < chars.len() {
                let d = chars[i];
                let exponent_sign = matches!(d, '+' | '-')
                    && matches!(chars[i - 1], 'e' | 'E')
                    && !chars[start..i].iter().any(|c| matches!(c, 'x' | 'X'));
                if d.is_alphanumeric() || d == '.' || d == '_' || exponent_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            Kind::Literal
        } else if is_ident_char(c) {
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            Kind::Word
        } else {
            let rest: String = chars[i..chars.len().min(i + 4)].iter().collect();
            let operator = OPERATORS.iter().find(|op| rest.starts_with(**op));
            i += operator.map_or(1, |op| op.chars().count());
            match (operator.copied(), c) {
                (Some("?."), _) => Kind::Dot,
                // optional member or parameter in TypeScript
                (Some("?:"), _) => Kind::Colon,
                (Some(_), _) => Kind::Operator,
                (None, '{' | '(' | '[') => Kind::Open,
                (None, '}' | ')' | ']') => Kind::Close,
                (None, ';') => Kind::Semicolon,
                (None, ',') => Kind::Comma,
                (None, '.') => Kind::Dot,
                (None, ':') => Kind::Colon,
                (None, '?') => Kind::Question,
                (None, _) => Kind::Operator,
            }
        };

        tokens.push(Token {
            kind,
            text: chars[start..i].iter().collect(),
            newlines_before: newlines,
        });
        newlines = 0;
    }

    tokens
}

struct Frame {
    open: char,
    case_body: bool,
}

struct Beautifier {
    printer: Printer,
    print_width: usize,
    frames: Vec<Frame>,
    ternaries: usize,
    case_label: bool,
    previous: Option<Token>,
}

impl Beautifier {
    fn level(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.open == '{')
            .map(|f| 1 + usize::from(f.case_body))
            .sum()
    }

    fn innermost(&self) -> Option<char> {
        self.frames.last().map(|f| f.open)
    }

    fn previous_kind(&self) -> Option<Kind> {
        self.previous.as_ref().map(|t| t.kind)
    }

    fn previous_is(&self, text: &str) -> bool {
        self.previous.as_ref().is_some_and(|t| t.text == text)
    }

    /// Operand position: a following `+`/`-` is a sign
    fn expects_operand(&self) -> bool {
        match &self.previous {
            None => true,
            Some(token) => match token.kind {
                Kind::Word => EXPRESSION_KEYWORDS.contains(&token.text.as_str()),
                Kind::Literal | Kind::Close => false,
                Kind::Operator => !matches!(token.text.as_str(), "++" | "--"),
                _ => true,
            },
        }
    }

    fn open_needs_space(&self, token: &Token) -> bool {
        match &self.previous {
            None => false,
            Some(prev) => match prev.kind {
                Kind::Open | Kind::Dot => false,
                Kind::Word if token.text != "{" => CONTROL_KEYWORDS.contains(&prev.text.as_str()),
                Kind::Close | Kind::Literal if token.text != "{" => false,
                _ => true,
            },
        }
    }

    fn start_statement_line(&mut self, token: &Token) {
        if token.newlines_before >= 2 && !self.previous_is("{") && self.previous.is_some() {
            self.printer.blank_line();
            self.printer.newline(self.level());
        } else if token.newlines_before > 0
            && self.printer.has_content()
            && matches!(self.previous_kind(), Some(Kind::Word | Kind::Literal | Kind::Close))
            && matches!(token.kind, Kind::Word | Kind::Literal)
        {
            self.printer.newline(self.level());
        }
    }

    /// Soft wrap after a comma or operator; a zero width disables wrapping
    fn wrap_if_needed(&mut self, token: &Token) {
        if self.print_width == 0 {
            return;
        }
        let breakable = matches!(self.previous_kind(), Some(Kind::Comma | Kind::Operator));
        let too_wide = self.printer.width() + token.text.chars().count() + 1 > self.print_width;
        let attaches = matches!(
            token.kind,
            Kind::Close | Kind::Comma | Kind::Semicolon | Kind::Dot | Kind::Colon
        );
        if breakable && too_wide && !attaches && self.printer.has_content() {
            self.printer.newline(self.level() + 1);
        }
    }

    fn token(&mut self, token: &Token, next: Option<&Token>) {
        self.start_statement_line(token);
        self.wrap_if_needed(token);

        match token.kind {
            Kind::Open if token.text == "{" => {
                let space = self.open_needs_space(token);
                self.printer.write(&token.text, space);
                self.frames.push(Frame { open: '{', case_body: false });
                self.printer.newline(self.level());
            }
            Kind::Open => {
                let space = self.open_needs_space(token);
                self.printer.write_open(&token.text, space);
                self.frames.push(Frame {
                    open: token.text.chars().next().unwrap_or('('),
                    case_body: false,
                });
            }
            Kind::Close if token.text == "}" => {
                if self.innermost() == Some('{') {
                    self.frames.pop();
                }
                if self.previous_is("{") {
                    self.printer.rejoin();
                } else {
                    self.printer.newline(self.level());
                }
                self.printer.write(&token.text, false);
                let stays = next.is_some_and(|n| {
                    matches!(n.kind, Kind::Close | Kind::Comma | Kind::Semicolon | Kind::Dot)
                        || (n.kind == Kind::Open && n.text == "(")
                        || matches!(n.text.as_str(), "else" | "catch" | "finally" | "while")
                });
                if !stays {
                    self.printer.newline(self.level());
                }
            }
            Kind::Close => {
                let open = if token.text == "]" { '[' } else { '(' };
                if self.innermost() == Some(open) {
                    self.frames.pop();
                }
                self.printer.write(&token.text, false);
            }
            Kind::Semicolon => {
                self.printer.write(&token.text, false);
                if self.innermost() != Some('(') {
                    self.ternaries = 0;
                    self.printer.newline(self.level());
                }
            }
            Kind::Comma => {
                self.printer.write(&token.text, false);
                if self.innermost() == Some('{') {
                    self.printer.newline(self.level());
                }
            }
            Kind::Dot => self.printer.write_open(&token.text, false),
            Kind::Question => {
                self.ternaries += 1;
                self.printer.write(&token.text, true);
            }
            Kind::Colon if self.ternaries > 0 && token.text == ":" => {
                self.ternaries -= 1;
                self.printer.write(&token.text, true);
            }
            Kind::Colon if self.case_label && token.text == ":" => {
                self.case_label = false;
                self.printer.write(&token.text, false);
                if let Some(frame) = self.frames.last_mut() {
                    frame.case_body = true;
                }
                self.printer.newline(self.level());
            }
            Kind::Colon => self.printer.write(&token.text, false),
            Kind::Operator => self.operator(token),
            Kind::Word if token.text == "case"
                || (token.text == "default" && next.is_some_and(|n| n.kind == Kind::Colon)) =>
            {
                if let Some(frame) = self.frames.last_mut().filter(|f| f.case_body) {
                    frame.case_body = false;
                }
                self.printer.newline(self.level());
                self.printer.write(&token.text, false);
                self.case_label = true;
            }
            Kind::LineComment => {
                if token.newlines_before == 0 && self.previous.is_some() {
                    self.printer.rejoin();
                }
                self.printer.write(&token.text, true);
                self.printer.newline(self.level());
            }
            Kind::BlockComment => {
                self.printer.write(&token.text, true);
                if token.text.contains('\n') {
                    self.printer.newline(self.level());
                }
            }
            Kind::Word | Kind::Literal => {
                let space = !matches!(self.previous_kind(), Some(Kind::Open | Kind::Dot));
                self.printer.write(&token.text, space);
            }
        }

        self.previous = Some(token.clone());
    }

    fn operator(&mut self, token: &Token) {
        let text = token.text.as_str();
        let after_operand = matches!(self.previous_kind(), Some(Kind::Word | Kind::Literal | Kind::Close))
            && !self.expects_operand();

        match text {
            "!" | "~" | "..." | "@" => {
                let space = !matches!(self.previous_kind(), Some(Kind::Open | Kind::Dot));
                self.printer.write_open(text, space);
            }
            "++" | "--" if after_operand => self.printer.write(text, false),
            "++" | "--" => {
                let space = !matches!(self.previous_kind(), Some(Kind::Open));
                self.printer.write_open(text, space);
            }
            "+" | "-" if self.expects_operand() => {
                let space = !matches!(self.previous_kind(), Some(Kind::Open));
                self.printer.write_open(text, space);
            }
            _ => self.printer.write(text, true),
        }
    }
}

/// Reformat script source with the given indent width and soft line limit
pub fn beautify(source: &str, indent: usize, print_width: usize) -> String {
    let tokens = tokenize(source);
    let mut beautifier = Beautifier {
        printer: Printer::spaces(indent),
        print_width,
        frames: Vec::new(),
        ternaries: 0,
        case_label: false,
        previous: None,
    };

    for (i, token) in tokens.iter().enumerate() {
        beautifier.token(token, tokens.get(i + 1));
    }
    beautifier.printer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js(source: &str) -> String {
        beautify(source, 2, 80)
    }

    #[test]
    fn test_statements() {
        assert_eq!(js("const x=1;const y=2;"), "const x = 1;\nconst y = 2;");
        assert_eq!(js("let a = b+-c;i++;"), "let a = b + -c;\ni++;");
    }

    #[test]
    fn test_objects_and_json() {
        assert_eq!(
            beautify("const x={a:1,b:2};", 4, 80),
            "const x = {\n    a: 1,\n    b: 2\n};"
        );
        let json = js(r#"{"key":"value","list":[1,2],"empty":{}}"#);
        assert_eq!(json, "{\n  \"key\": \"value\",\n  \"list\": [1, 2],\n  \"empty\": {}\n}");
    }

    #[test]
    fn test_control_flow() {
        assert_eq!(
            js("if(a){b()}else{c(x?1:2)}"),
            "if (a) {\n  b()\n} else {\n  c(x ? 1 : 2)\n}"
        );
        assert_eq!(
            js("for(let i=0;i<n;i++){sum+=i}"),
            "for (let i = 0; i < n; i++) {\n  sum += i\n}"
        );
    }

    #[test]
    fn test_switch_cases() {
        assert_eq!(
            js("switch(x){case 1:foo();break;default:bar()}"),
            "switch (x) {\n  case 1:\n    foo();\n    break;\n  default:\n    bar()\n}"
        );
    }

    #[test]
    fn test_functions_and_chains() {
        assert_eq!(
            js("const f=(a,b)=>{return a.b?.c(/x+/g)}"),
            "const f = (a, b) => {\n  return a.b?.c(/x+/g)\n}"
        );
        assert_eq!(js("items.map(function(i){return i*2})"), "items.map(function(i) {\n  return i * 2\n})");
    }

    #[test]
    fn test_typescript_optional_members() {
        assert_eq!(
            js("interface X { a: number; b?: string }"),
            "interface X {\n  a: number;\n  b?: string\n}"
        );
        assert_eq!(js("const v=a??b;"), "const v = a ?? b;");
        assert_eq!(js("const v=ok?x:y;"), "const v = ok ? x : y;");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(
            js("a();// note\nb();\n\n\nc();"),
            "a(); // note\nb();\n\nc();"
        );
        assert_eq!(js("let a = 1\nlet b = 2"), "let a = 1\nlet b = 2");
    }

    #[test]
    fn test_tolerates_garbage() {
        assert_eq!(js("invalid javascript {{{"), "invalid javascript {\n  {\n    {");
        assert_eq!(js("}}) 'unterminated"), "}\n}) 'unterminated");
    }

    #[test]
    fn test_wraps_long_argument_lists() {
        let out = beautify("call(alpha, beta, gamma)", 2, 16);
        assert_eq!(out, "call(alpha, beta,\n  gamma)");
    }
}
