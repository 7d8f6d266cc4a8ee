//! Parameter expressions: object literals whose leaves are literals or
//! dotted paths into the enclosing scope.

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamsExpr {
    Literal(Value),
    Object(Vec<(String, ParamsExpr)>),
    Array(Vec<ParamsExpr>),
    /// `app.user.id`
    Path(Vec<String>),
}

impl ParamsExpr {
    /// Parse an expression. Errors carry a human readable reason.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut parser = Parser::new(source);
        let expr = parser.value()?;
        parser.skip_ws();
        if let Some(ch) = parser.peek() {
            return Err(format!("unexpected `{ch}` at {}", parser.pos));
        }
        Ok(expr)
    }

    /// True when the expression reads nothing from the scope.
    pub fn is_constant(&self) -> bool {
        match self {
            ParamsExpr::Literal(_) => true,
            ParamsExpr::Object(entries) => entries.iter().all(|(_, v)| v.is_constant()),
            ParamsExpr::Array(items) => items.iter().all(ParamsExpr::is_constant),
            ParamsExpr::Path(_) => false,
        }
    }

    /// Evaluate against `scope`. Missing paths evaluate to `null`.
    pub fn evaluate(&self, scope: &Value) -> Value {
        match self {
            ParamsExpr::Literal(value) => value.clone(),
            ParamsExpr::Object(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, expr)| (key.clone(), expr.evaluate(scope)))
                    .collect();
                Value::Object(map)
            }
            ParamsExpr::Array(items) => {
                Value::Array(items.iter().map(|item| item.evaluate(scope)).collect())
            }
            ParamsExpr::Path(segments) => lookup(scope, segments).cloned().unwrap_or(Value::Null),
        }
    }
}

fn lookup<'a>(scope: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = scope;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), String> {
        self.skip_ws();
        match self.bump() {
            Some(ch) if ch == wanted => Ok(()),
            Some(ch) => Err(format!("expected `{wanted}` but found `{ch}` at {}", self.pos - 1)),
            None => Err(format!("expected `{wanted}` but input ended")),
        }
    }

    fn value(&mut self) -> Result<ParamsExpr, String> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                Ok(ParamsExpr::Literal(Value::String(self.string(quote)?)))
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '.' => self.number(),
            Some(ch) if is_ident_start(ch) => self.identifier_or_path(),
            Some(ch) => Err(format!("unexpected `{ch}` at {}", self.pos)),
            None => Err("empty expression".to_string()),
        }
    }

    fn object(&mut self) -> Result<ParamsExpr, String> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(ParamsExpr::Object(entries));
            }
            let key = self.key()?;
            self.expect(':')?;
            let value = self.value()?;
            entries.push((key, value));
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(ParamsExpr::Object(entries)),
                Some(ch) => return Err(format!("expected `,` or `}}` but found `{ch}`")),
                None => return Err("unterminated object".to_string()),
            }
        }
    }

    fn array(&mut self) -> Result<ParamsExpr, String> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(ParamsExpr::Array(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(ParamsExpr::Array(items)),
                Some(ch) => return Err(format!("expected `,` or `]` but found `{ch}`")),
                None => return Err("unterminated array".to_string()),
            }
        }
    }

    fn key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(quote)
            }
            Some(ch) if is_ident_start(ch) || ch.is_ascii_digit() => Ok(self.identifier()),
            Some(ch) => Err(format!("invalid object key start `{ch}`")),
            None => Err("unterminated object".to_string()),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(other) => out.push(other),
                    None => return Err("unterminated string".to_string()),
                },
                Some(ch) => out.push(ch),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn number(&mut self) -> Result<ParamsExpr, String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Ok(int) = text.parse::<i64>() {
            return Ok(ParamsExpr::Literal(Value::Number(int.into())));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(|n| ParamsExpr::Literal(Value::Number(n)))
            .ok_or_else(|| format!("invalid number `{text}`"))
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn identifier_or_path(&mut self) -> Result<ParamsExpr, String> {
        let first = self.identifier();
        match first.as_str() {
            "true" => return Ok(ParamsExpr::Literal(Value::Bool(true))),
            "false" => return Ok(ParamsExpr::Literal(Value::Bool(false))),
            "null" | "undefined" => return Ok(ParamsExpr::Literal(Value::Null)),
            _ => {}
        }
        let mut segments = vec![first];
        while self.peek() == Some('.') {
            self.pos += 1;
            let segment = self.identifier();
            if segment.is_empty() {
                return Err(format!("dangling `.` at {}", self.pos - 1));
            }
            segments.push(segment);
        }
        Ok(ParamsExpr::Path(segments))
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
