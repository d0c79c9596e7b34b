//! 命令行的词法分析器
//!
//! 引号字符串和JSON数组/对象作为一个整体读取，其中可以包含空白字符。

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 跳过字符串内容直到结束引号（含转义），返回是否找到结束引号
    /// 注意：开始的引号已经被调用者消费
    fn skip_string_body(&mut self) -> bool {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '"' => return true,
                _ => {}
            }
        }
        false
    }

    /// 读取双引号包围的字符串字面量
    fn read_quoted(&mut self, start: usize) -> Token<'a> {
        let kind = if self.skip_string_body() {
            TokenKind::Quoted(&self.input[start..self.position])
        } else {
            TokenKind::Illegal
        };
        Token { kind, span: Span::new(start, self.position) }
    }

    /// 读取JSON数组或对象，按括号深度匹配，忽略字符串中的括号
    fn read_bracketed(&mut self, start: usize) -> Token<'a> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some('[') | Some('{') => depth += 1,
                Some(']') | Some('}') => depth -= 1,
                Some('"') => {
                    if !self.skip_string_body() {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            }
        }

        let kind = if depth == 0 {
            TokenKind::Bracketed(&self.input[start..self.position])
        } else {
            TokenKind::Illegal
        };
        Token { kind, span: Span::new(start, self.position) }
    }

    /// 读取普通单词，直到空白或 '='
    fn read_word(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            self.bump();
        }
        Token {
            kind: TokenKind::Word(&self.input[start..self.position]),
            span: Span::new(start, self.position),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?; // 到达输入末尾

        let token = match c {
            '@' => Token { kind: TokenKind::At, span: Span::new(start, self.position) },
            '=' => Token { kind: TokenKind::Eq, span: Span::new(start, self.position) },
            '"' => self.read_quoted(start),
            '[' | '{' => self.read_bracketed(start),
            _ => self.read_word(start),
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_command() {
        let mut lexer = Lexer::new("filter name peckstadt");

        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("filter"));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("name"));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("peckstadt"));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_json_values_keep_spaces() {
        assert_eq!(
            kinds(r#"filter id [1, 2, 3] "two words" {"a": [1, "]"]}"#),
            vec![
                TokenKind::Word("filter"),
                TokenKind::Word("id"),
                TokenKind::Bracketed("[1, 2, 3]"),
                TokenKind::Quoted(r#""two words""#),
                TokenKind::Bracketed(r#"{"a": [1, "]"]}"#),
            ]
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        assert_eq!(
            kinds(r#""say \"hi\"" x"#),
            vec![TokenKind::Quoted(r#""say \"hi\"""#), TokenKind::Word("x")]
        );
    }

    #[test]
    fn test_group_items_and_path() {
        assert_eq!(
            kinds("group or @0.1 id=5 tags=[1, 2] $gt=3"),
            vec![
                TokenKind::Word("group"),
                TokenKind::Word("or"),
                TokenKind::At,
                TokenKind::Word("0.1"),
                TokenKind::Word("id"),
                TokenKind::Eq,
                TokenKind::Word("5"),
                TokenKind::Word("tags"),
                TokenKind::Eq,
                TokenKind::Bracketed("[1, 2]"),
                TokenKind::Word("$gt"),
                TokenKind::Eq,
                TokenKind::Word("3"),
            ]
        );
    }

    #[test]
    fn test_unterminated_input_is_illegal() {
        assert_eq!(kinds(r#""open"#), vec![TokenKind::Illegal]);
        assert_eq!(kinds("[1, 2"), vec![TokenKind::Illegal]);
        assert_eq!(kinds(r#"{"a": "}"#), vec![TokenKind::Illegal]);
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<_> = Lexer::new("limit  10").collect();
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[1].span, Span::new(7, 9));
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds("   ").is_empty());
    }
}
