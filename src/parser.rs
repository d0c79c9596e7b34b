//! 命令行的语法分析器
//!
//! ## 解析流程
//!
//! ```text
//! parse()
//!   ├─ 读取命令关键字 (Word)
//!   ├─ 按关键字解析参数
//!   │   ├─ doctype / field / sort   → parse_text()
//!   │   ├─ filter                   → parse_text() + parse_value()
//!   │   ├─ cond                     → parse_text() + 运算符 + parse_value() → condition_from()
//!   │   ├─ limit / skip             → parse_integer()
//!   │   └─ group                    → 运算符 + 可选的 @路径 + parse_group_item()*
//!   └─ 检查没有多余的输入
//! ```
//!
//! ## 值的写法
//!
//! - **JSON**: `[1, 2, 3]`, `{"a": 1}`, `"quoted string"`, `10`, `true`, `null`
//! - **裸字符串**: 不是合法JSON的单词按字符串处理，例如 `peckstadt`
//! - **紧邻的 token**: 没有空白分隔的多个 token 拼接为字符串，例如 `a=b`
//!   （`group` 的条目中第一个 `=` 分隔键和值）
//!
//! ## 解析示例
//!
//! ```text
//! filter categories ["a", "b"]
//! cond age gte 18
//! cond score mod [4, 1]
//! group or id=5 ids=10
//! group and @0 a=1 $exists=true
//! ```

use serde_json::Value;

use crate::combination::{CombinationItem, CombinationOperator, Filter};
use crate::command::Command;
use crate::condition::Condition;
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self { message, span: Some(span) }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} (位置 {}-{})", self.message, span.start, span.end),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// 对一行输入进行分词并解析为命令
pub fn parse_line(input: &str) -> Result<Command, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(&tokens).parse()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 期望一个 token，否则返回输入结束的错误
    fn expect_any(&mut self, what: &str) -> Result<&'a Token<'a>, ParseError> {
        self.advance()
            .ok_or_else(|| ParseError::new(format!("Expected {}, but reached end of input", what), None))
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind) -> bool {
        if let Some(token) = self.peek() {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(kind)
        } else {
            false
        }
    }

    pub fn parse(&mut self) -> Result<Command, ParseError> {
        let token = self.expect_any("command")?;
        let keyword = match &token.kind {
            TokenKind::Word(word) => word.to_ascii_lowercase(),
            _ => {
                return Err(ParseError::at_position(
                    format!("Expected command, found {:?}", token.kind),
                    token.span,
                ))
            }
        };

        let command = match keyword.as_str() {
            "doctype" => Command::DocType(self.parse_text("doc type")?),
            "field" | "fields" => {
                let mut fields = vec![self.parse_text("field name")?];
                while self.peek().is_some() {
                    fields.push(self.parse_text("field name")?);
                }
                Command::Fields(fields)
            }
            "filter" => {
                let field = self.parse_text("field name")?;
                let value = self.parse_value()?;
                Command::Filter { field, value }
            }
            "cond" | "condition" => {
                let field = self.parse_text("field name")?;
                let op_token = self.expect_any("condition operator")?;
                let op = match &op_token.kind {
                    TokenKind::Word(op) => *op,
                    _ => {
                        return Err(ParseError::at_position(
                            format!("Expected condition operator, found {:?}", op_token.kind),
                            op_token.span,
                        ))
                    }
                };
                let value_span = self.peek().map(|t| t.span);
                let value = self.parse_value()?;
                let condition = condition_from(op, value, value_span.unwrap_or(op_token.span))?;
                Command::Condition { field, condition }
            }
            "sort" => {
                let field = self.parse_text("sort field")?;
                let direction = self.parse_text("sort direction")?;
                Command::Sort { field, direction }
            }
            "limit" => Command::Limit(self.parse_integer()?),
            "skip" => Command::Skip(self.parse_integer()?),
            "group" => self.parse_group()?,
            "build" => Command::Build,
            "pretty" => Command::Pretty,
            "reset" => Command::Reset,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => {
                return Err(ParseError::at_position(
                    format!("Unknown command '{}'", other),
                    token.span,
                ))
            }
        };

        if let Some(token) = self.peek() {
            return Err(ParseError::at_position(
                format!("Unexpected trailing input: {:?}", token.kind),
                token.span,
            ));
        }

        Ok(command)
    }

    /// 拼接紧跟在 first 之后（无空白分隔）的 token，例如 `a=b`
    /// 没有可拼接的 token 时返回 None，不推进位置
    fn take_adjacent(&mut self, first: &'a Token<'a>) -> Option<String> {
        let mut joined = first.kind.text()?.to_string();
        let mut end = first.span.end;

        while let Some(next) = self.peek() {
            let Some(part) = next.kind.text() else { break };
            if next.span.start != end {
                break;
            }
            joined.push_str(part);
            end = next.span.end;
            self.position += 1;
        }

        if end == first.span.end {
            None
        } else {
            Some(joined)
        }
    }

    /// 解析名称：裸单词或引号字符串，紧邻的 token 拼接为一个名称
    fn parse_text(&mut self, what: &str) -> Result<String, ParseError> {
        let token = self.expect_any(what)?;
        if let Some(joined) = self.take_adjacent(token) {
            return Ok(joined);
        }
        match &token.kind {
            TokenKind::Word(word) => Ok(word.to_string()),
            TokenKind::Quoted(raw) => decode_quoted(raw, token.span),
            _ => Err(ParseError::at_position(
                format!("Expected {}, found {:?}", what, token.kind),
                token.span,
            )),
        }
    }

    /// 解析值：JSON，或不是合法JSON的裸单词（按字符串处理）
    /// 紧邻的多个 token（例如 `a=b`）按字符串处理
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = self.expect_any("value")?;
        if let Some(joined) = self.take_adjacent(token) {
            return Ok(Value::String(joined));
        }
        let Some(raw) = token.kind.value_text() else {
            return Err(ParseError::at_position(
                format!("Expected value, found {:?}", token.kind),
                token.span,
            ));
        };

        match (&token.kind, serde_json::from_str::<Value>(raw)) {
            (_, Ok(value)) => Ok(value),
            (TokenKind::Word(word), Err(_)) => Ok(Value::String(word.to_string())),
            (_, Err(e)) => Err(ParseError::at_position(format!("Invalid JSON: {}", e), token.span)),
        }
    }

    fn parse_integer(&mut self) -> Result<i64, ParseError> {
        let token = self.expect_any("number")?;
        match &token.kind {
            TokenKind::Word(word) => word.parse::<i64>().map_err(|_| {
                ParseError::at_position(format!("Expected integer, found '{}'", word), token.span)
            }),
            _ => Err(ParseError::at_position(
                format!("Expected integer, found {:?}", token.kind),
                token.span,
            )),
        }
    }

    /// 语法: `group <op> [@i.j.k] item*`
    fn parse_group(&mut self) -> Result<Command, ParseError> {
        let op_token = self.expect_any("combination operator")?;
        let operator = match &op_token.kind {
            TokenKind::Word(word) => word
                .parse::<CombinationOperator>()
                .map_err(|e| ParseError::at_position(e, op_token.span))?,
            _ => {
                return Err(ParseError::at_position(
                    format!("Expected combination operator, found {:?}", op_token.kind),
                    op_token.span,
                ))
            }
        };

        let parent = if self.match_token(&TokenKind::At) {
            self.advance(); // 消费 @
            Some(self.parse_path()?)
        } else {
            None
        };

        let mut items = Vec::new();
        while self.peek().is_some() {
            items.push(self.parse_group_item()?);
        }

        Ok(Command::Group {
            operator,
            parent,
            items,
        })
    }

    /// 解析以点分隔的下标路径，例如 `0.1.2`
    fn parse_path(&mut self) -> Result<Vec<usize>, ParseError> {
        let token = self.expect_any("group path")?;
        let TokenKind::Word(path) = &token.kind else {
            return Err(ParseError::at_position(
                format!("Expected group path, found {:?}", token.kind),
                token.span,
            ));
        };

        path.split('.')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseError::at_position(format!("Invalid group path '{}'", path), token.span))
    }

    /// `field=<json>` 为过滤条件，`$op=<json>` 为比较条件
    /// 引号中的键总是字段名，例如 `"$weird"=1`
    fn parse_group_item(&mut self) -> Result<CombinationItem, ParseError> {
        let key_token = self.expect_any("group item")?;
        let (key, is_operator) = match &key_token.kind {
            TokenKind::Word(word) => (word.to_string(), word.starts_with('$')),
            TokenKind::Quoted(raw) => (decode_quoted(raw, key_token.span)?, false),
            _ => {
                return Err(ParseError::at_position(
                    format!("Expected group item, found {:?}", key_token.kind),
                    key_token.span,
                ))
            }
        };

        if !self.match_token(&TokenKind::Eq) {
            return Err(ParseError::at_position(
                format!("Expected '=' after '{}'", key),
                key_token.span,
            ));
        }
        self.advance(); // 消费 =

        let value_span = self.peek().map(|t| t.span);
        let value = self.parse_value()?;

        if is_operator {
            let span = value_span.unwrap_or(key_token.span);
            Ok(CombinationItem::Condition(condition_from(&key, value, span)?))
        } else {
            Ok(CombinationItem::Filter(Filter::new(key, value)))
        }
    }
}

fn decode_quoted(raw: &str, span: Span) -> Result<String, ParseError> {
    serde_json::from_str::<String>(raw)
        .map_err(|e| ParseError::at_position(format!("Invalid string: {}", e), span))
}

/// 根据运算符名称和JSON值构造比较条件
fn condition_from(op: &str, value: Value, span: Span) -> Result<Condition, ParseError> {
    let mismatch = |expected: &str, value: &Value| {
        ParseError::at_position(
            format!("Operator '{}' expects {}, found {}", op, expected, value),
            span,
        )
    };
    let integer = |value: &Value| value.as_i64().ok_or_else(|| mismatch("an integer", value));
    let string = |value: Value| match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch("a string", &other)),
    };

    let name = op.strip_prefix('$').unwrap_or(op).to_ascii_lowercase();
    let condition = match name.as_str() {
        "gt" => Condition::GreaterThan(integer(&value)?),
        "gte" => Condition::GreaterThanOrEqual(integer(&value)?),
        "lt" => Condition::LessThan(integer(&value)?),
        "lte" => Condition::LessThanOrEqual(integer(&value)?),
        "eq" => Condition::Equal(value),
        "neq" | "ne" => Condition::NotEqual(value),
        "exists" => Condition::Exists(value.as_bool().ok_or_else(|| mismatch("a boolean", &value))?),
        "size" => Condition::Size(
            value
                .as_u64()
                .ok_or_else(|| mismatch("a non-negative integer", &value))?,
        ),
        "in" => match value {
            Value::Array(values) => Condition::In(values),
            other => return Err(mismatch("an array", &other)),
        },
        "type" => Condition::Type(string(value)?),
        "regex" => Condition::RegEx(string(value)?),
        "mod" => match value.as_array().map(|pair| pair.as_slice()) {
            Some([divisor, remainder]) => match (divisor.as_i64(), remainder.as_i64()) {
                (Some(d), Some(r)) => Condition::Mod([d, r]),
                _ => return Err(mismatch("[divisor, remainder] integers", &value)),
            },
            _ => return Err(mismatch("[divisor, remainder]", &value)),
        },
        _ => {
            return Err(ParseError::at_position(
                format!("Unknown condition operator '{}'", op),
                span,
            ))
        }
    };
    Ok(condition)
}
