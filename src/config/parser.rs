//! `galaxy.config.ts` 解析器：
//! - 词法：字符串（' " `）、数字、标识符、标点、行/块注释
//! - 语法：对象字面量子集（对象、数组、字符串、数字、布尔），其它表达式保留原文
//! - 定位 `galaxyConfig` 声明并解析其初始化对象

use std::fmt::Write as _;

use crate::error::{GalaxyError, GalaxyResult};

/// 解析得到的值
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Str(String),
    /// 不含插值的模板字符串，写回时保持反引号原文
    Template { text: String, source: String },
    Num(String),
    Bool(bool),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
    /// 无法结构化的表达式，原样保留源码
    Raw(String),
    /// 展开（`...x`）、计算属性名（`[k]: v`）、简写属性：整条属性原文存于键中
    Verbatim,
}

impl Value {
    #[cfg(test)]
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Template { text: s, .. } => Some(s),
            _ => None,
        }
    }

    /// 序列化回 TypeScript 源码；`indent` 为当前层级缩进空格数
    pub(crate) fn to_source(&self, indent: usize) -> String {
        let mut out = String::new();
        write_value(&mut out, self, indent);
        out
    }
}

/// 单条对象属性的源码（不含缩进与结尾逗号）
pub(crate) fn property_source(key: &str, value: &Value, indent: usize) -> String {
    match value {
        Value::Verbatim => key.to_string(),
        _ => format!("{}: {}", key_source(key), value.to_source(indent)),
    }
}

fn write_value(out: &mut String, value: &Value, indent: usize) {
    let pad = " ".repeat(indent + 2);
    match value {
        Value::Str(s) => out.push_str(&quote(s)),
        Value::Template { source, .. } => out.push_str(source),
        Value::Num(n) | Value::Raw(n) => out.push_str(n),
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::Verbatim => {}
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                out.push_str(&pad);
                write_value(out, item, indent + 2);
                out.push_str(",\n");
            }
            out.push_str(&" ".repeat(indent));
            out.push(']');
        }
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Object(fields) => {
            out.push_str("{\n");
            for (key, v) in fields {
                let _ = writeln!(out, "{}{},", pad, property_source(key, v, indent + 2));
            }
            out.push_str(&" ".repeat(indent));
            out.push('}');
        }
    }
}

/// 以单引号输出字符串字面量
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// 属性名：合法标识符直接输出，否则加引号
pub(crate) fn key_source(key: &str) -> String {
    let is_ident = key
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if is_ident && !key.is_empty() {
        key.to_string()
    } else {
        quote(key)
    }
}

/// 字符串类 token 携带解码后的内容；含插值或无法无损解码的转义时为 None
#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Str(Option<String>),
    Template(Option<String>),
    Num(String),
    Ident(String),
    Punct(char),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    start: usize,
    end: usize,
}

/// 单个转义序列的解码结果
enum Escape {
    Char(char),
    /// 行接续，不产生字符
    Nothing,
    /// 八进制等无法无损表示的转义
    Opaque,
}

fn hex_value(chars: &[(usize, char)], from: usize, len: usize) -> Option<u32> {
    let digits: String = chars.get(from..from + len)?.iter().map(|&(_, c)| c).collect();
    if digits.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(&digits, 16).ok()
    } else {
        None
    }
}

/// 解码 `\` 之后的转义，返回结果与下一个字符下标
fn decode_escape(chars: &[(usize, char)], i: usize) -> Option<(Escape, usize)> {
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let decoded = match at(i)? {
        'n' => (Escape::Char('\n'), i + 1),
        'r' => (Escape::Char('\r'), i + 1),
        't' => (Escape::Char('\t'), i + 1),
        'b' => (Escape::Char('\u{8}'), i + 1),
        'f' => (Escape::Char('\u{c}'), i + 1),
        'v' => (Escape::Char('\u{b}'), i + 1),
        '0' if !at(i + 1).is_some_and(|c| c.is_ascii_digit()) => (Escape::Char('\0'), i + 1),
        '1'..='9' | '0' => (Escape::Opaque, i + 1),
        '\n' | '\u{2028}' | '\u{2029}' => (Escape::Nothing, i + 1),
        '\r' if at(i + 1) == Some('\n') => (Escape::Nothing, i + 2),
        '\r' => (Escape::Nothing, i + 1),
        'x' => match hex_value(chars, i + 1, 2).and_then(char::from_u32) {
            Some(c) => (Escape::Char(c), i + 3),
            None => (Escape::Opaque, i + 1),
        },
        'u' if at(i + 1) == Some('{') => {
            let close = (i + 2..chars.len()).find(|&j| at(j) == Some('}'));
            match close.and_then(|j| hex_value(chars, i + 2, j - i - 2).map(|v| (v, j))) {
                Some((v, j)) if j > i + 2 => match char::from_u32(v) {
                    Some(c) => (Escape::Char(c), j + 1),
                    None => (Escape::Opaque, i + 1),
                },
                _ => (Escape::Opaque, i + 1),
            }
        }
        'u' => match hex_value(chars, i + 1, 4) {
            Some(high @ 0xD800..=0xDBFF) => {
                let low = (at(i + 5) == Some('\\') && at(i + 6) == Some('u'))
                    .then(|| hex_value(chars, i + 7, 4))
                    .flatten()
                    .filter(|low| (0xDC00..=0xDFFF).contains(low));
                match low.and_then(|low| char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))) {
                    Some(c) => (Escape::Char(c), i + 11),
                    None => (Escape::Opaque, i + 5),
                }
            }
            Some(v) => match char::from_u32(v) {
                Some(c) => (Escape::Char(c), i + 5),
                None => (Escape::Opaque, i + 5),
            },
            None => (Escape::Opaque, i + 1),
        },
        other => (Escape::Char(other), i + 1),
    };
    Some(decoded)
}

/// 扫描一个字符串字面量，`open` 指向起始引号；返回解码内容与结束后的下标
fn lex_string(src: &str, chars: &[(usize, char)], open: usize) -> GalaxyResult<(Option<String>, usize)> {
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let quote_char = chars[open].1;
    let start = chars[open].0;
    let unterminated = || syntax_error(src, start, "unterminated string");
    let mut cooked = Some(String::new());
    let mut i = open + 1;
    loop {
        let c = at(i).ok_or_else(unterminated)?;
        match c {
            c if c == quote_char => return Ok((cooked, i + 1)),
            '\\' => {
                let (escape, next) = decode_escape(chars, i + 1).ok_or_else(unterminated)?;
                match escape {
                    Escape::Char(ch) => {
                        if let Some(s) = cooked.as_mut() {
                            s.push(ch);
                        }
                    }
                    Escape::Nothing => {}
                    Escape::Opaque => cooked = None,
                }
                i = next;
            }
            '$' if quote_char == '`' && at(i + 1) == Some('{') => {
                cooked = None;
                i = skip_interpolation(src, chars, i + 2)?;
            }
            '\n' if quote_char != '`' => return Err(unterminated()),
            c => {
                if let Some(s) = cooked.as_mut() {
                    s.push(c);
                }
                i += 1;
            }
        }
    }
}

/// 跳过 `${ ... }` 内的表达式（可嵌套花括号与字符串），返回 `}` 之后的下标
fn skip_interpolation(src: &str, chars: &[(usize, char)], mut i: usize) -> GalaxyResult<usize> {
    let mut depth = 1usize;
    while let Some(&(_, c)) = chars.get(i) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            '\'' | '"' | '`' => {
                i = lex_string(src, chars, i)?.1;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    Err(syntax_error(src, src.len(), "unterminated template"))
}

/// 词法分析
fn tokenize(src: &str) -> GalaxyResult<Vec<Token>> {
    let bytes: Vec<(usize, char)> = src.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let at = |i: usize| bytes.get(i).map(|&(_, c)| c);
    let offset = |i: usize| bytes.get(i).map(|&(o, _)| o).unwrap_or(src.len());

    while let Some(c) = at(i) {
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        // 注释
        if c == '/' && at(i + 1) == Some('/') {
            while let Some(c) = at(i) {
                if c == '\n' {
                    break;
                }
                i += 1;
            }
            continue;
        }
        if c == '/' && at(i + 1) == Some('*') {
            let begin = i;
            i += 2;
            loop {
                match at(i) {
                    Some('*') if at(i + 1) == Some('/') => {
                        i += 2;
                        break;
                    }
                    Some(_) => i += 1,
                    None => return Err(syntax_error(src, offset(begin), "unterminated comment")),
                }
            }
            continue;
        }
        let start = offset(i);
        if c == '\'' || c == '"' || c == '`' {
            let (cooked, next) = lex_string(src, &bytes, i)?;
            i = next;
            let tok = if c == '`' { Tok::Template(cooked) } else { Tok::Str(cooked) };
            tokens.push(Token { tok, start, end: offset(i) });
            continue;
        }
        if c.is_ascii_digit() || (c == '-' && at(i + 1).is_some_and(|n| n.is_ascii_digit())) {
            let begin = i;
            i += 1;
            while at(i).is_some_and(|n| n.is_ascii_alphanumeric() || n == '.' || n == '_') {
                i += 1;
            }
            let text = src[offset(begin)..offset(i)].to_string();
            tokens.push(Token { tok: Tok::Num(text), start, end: offset(i) });
            continue;
        }
        if c.is_alphabetic() || c == '_' || c == '$' {
            let begin = i;
            while at(i).is_some_and(|n| n.is_alphanumeric() || n == '_' || n == '$') {
                i += 1;
            }
            let text = src[offset(begin)..offset(i)].to_string();
            tokens.push(Token { tok: Tok::Ident(text), start, end: offset(i) });
            continue;
        }
        i += 1;
        tokens.push(Token { tok: Tok::Punct(c), start, end: offset(i) });
    }
    Ok(tokens)
}

fn syntax_error(src: &str, offset: usize, msg: &str) -> GalaxyError {
    let before = &src[..offset.min(src.len())];
    let line = before.matches('\n').count() + 1;
    let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
    GalaxyError::InvalidConfig(format!("{} at line {}, column {}", msg, line, col))
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn peek_next(&self) -> Option<&Tok> {
        self.tokens.get(self.pos + 1).map(|t| &t.tok)
    }

    fn error(&self, msg: &str) -> GalaxyError {
        let offset = self.tokens.get(self.pos).map(|t| t.start).unwrap_or(self.src.len());
        syntax_error(self.src, offset, msg)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Tok::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> GalaxyResult<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    /// 取当前 token 的原文并前进
    fn bump_source(&mut self) -> String {
        let text = self
            .tokens
            .get(self.pos)
            .map(|t| self.src[t.start..t.end].to_string())
            .unwrap_or_default();
        self.pos += 1;
        text
    }

    fn parse_value(&mut self) -> GalaxyResult<Value> {
        let value = match self.peek().cloned() {
            Some(Tok::Punct('{')) => self.parse_object()?,
            Some(Tok::Punct('[')) => self.parse_array()?,
            Some(Tok::Str(cooked)) if self.is_simple() => {
                let source = self.bump_source();
                match cooked {
                    Some(s) => Value::Str(s),
                    None => Value::Raw(source),
                }
            }
            Some(Tok::Template(cooked)) if self.is_simple() => {
                let source = self.bump_source();
                match cooked {
                    Some(text) => Value::Template { text, source },
                    None => Value::Raw(source),
                }
            }
            Some(Tok::Num(n)) if self.is_simple() => {
                self.pos += 1;
                Value::Num(n)
            }
            Some(Tok::Ident(id)) if self.is_simple() => {
                self.pos += 1;
                match id.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::Raw(id),
                }
            }
            Some(_) => Value::Raw(self.raw_source()?),
            None => return Err(self.error("unexpected end of file")),
        };
        Ok(value)
    }

    /// 单个 token 后紧跟 `,` `}` `]` 时视为简单值
    fn is_simple(&self) -> bool {
        matches!(
            self.peek_next(),
            Some(Tok::Punct(',')) | Some(Tok::Punct('}')) | Some(Tok::Punct(']')) | Some(Tok::Punct(';')) | None
        )
    }

    /// `...x`、`[k]: v`、简写属性 `x` 与方法 `f() {}`
    fn is_verbatim_property(&self) -> bool {
        match self.peek() {
            Some(Tok::Punct('.')) | Some(Tok::Punct('[')) => true,
            Some(Tok::Ident(_)) => {
                matches!(self.peek_next(), Some(Tok::Punct(',')) | Some(Tok::Punct('}')) | Some(Tok::Punct('(')))
            }
            _ => false,
        }
    }

    /// 收集到同层 `,` `}` `]` 为止的原文
    fn raw_source(&mut self) -> GalaxyResult<String> {
        let first = self.pos;
        let start = self.tokens.get(first).map(|t| t.start).unwrap_or(self.src.len());
        let mut end = start;
        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            match token.tok {
                Tok::Punct('(') | Tok::Punct('[') | Tok::Punct('{') => depth += 1,
                Tok::Punct(')') | Tok::Punct(']') | Tok::Punct('}') if depth > 0 => depth -= 1,
                Tok::Punct(',') | Tok::Punct(']') | Tok::Punct('}') | Tok::Punct(';') if depth == 0 => break,
                _ => {}
            }
            end = token.end;
            self.pos += 1;
        }
        if depth != 0 {
            return Err(self.error("unbalanced brackets"));
        }
        if self.pos == first {
            return Err(self.error("expected value"));
        }
        Ok(self.src[start..end].to_string())
    }

    fn parse_array(&mut self) -> GalaxyResult<Value> {
        self.expect_punct('[')?;
        let mut items = Vec::new();
        loop {
            if self.eat_punct(']') {
                break;
            }
            items.push(self.parse_value()?);
            if !self.eat_punct(',') {
                self.expect_punct(']')?;
                break;
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> GalaxyResult<Value> {
        self.expect_punct('{')?;
        let mut fields = Vec::new();
        loop {
            if self.eat_punct('}') {
                break;
            }
            if self.is_verbatim_property() {
                fields.push((self.raw_source()?, Value::Verbatim));
            } else {
                let key = match self.peek() {
                    Some(Tok::Ident(k)) | Some(Tok::Str(Some(k))) | Some(Tok::Num(k)) => k.clone(),
                    _ => return Err(self.error("expected property name")),
                };
                self.pos += 1;
                self.expect_punct(':')?;
                let value = self.parse_value()?;
                fields.push((key, value));
            }
            if !self.eat_punct(',') {
                self.expect_punct('}')?;
                break;
            }
        }
        Ok(Value::Object(fields))
    }
}

/// 解析 `export const galaxyConfig[: T] = { ... }` 的初始化对象
pub(crate) fn parse_config_object(src: &str) -> GalaxyResult<Value> {
    let tokens = tokenize(src)?;
    let decl = tokens
        .iter()
        .position(|t| t.tok == Tok::Ident("galaxyConfig".to_string()))
        .ok_or_else(|| GalaxyError::InvalidConfig("galaxyConfig declaration not found".to_string()))?;
    let assign = tokens[decl..]
        .iter()
        .position(|t| t.tok == Tok::Punct('='))
        .map(|p| p + decl)
        .ok_or_else(|| syntax_error(src, tokens[decl].start, "expected '=' after galaxyConfig"))?;
    let mut parser = Parser { src, tokens, pos: assign + 1 };
    match parser.peek() {
        Some(Tok::Punct('{')) => parser.parse_object(),
        _ => Err(parser.error("expected object literal")),
    }
}

/// 解析单个值（测试与调试用）
#[cfg(test)]
pub(crate) fn parse_value(src: &str) -> GalaxyResult<Value> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { src, tokens, pos: 0 };
    parser.parse_value()
}
