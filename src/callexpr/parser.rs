/// Call-expression parsing: `name(key=value, ...)` → `ParsedCall`.
///
/// Parsing happens in two phases. A recursive-descent pass builds expression
/// nodes from the token stream, enforcing the call shape (exactly one outer
/// call, keyword arguments only). A decode pass then walks the nodes and
/// restricts them to the literal value domain, producing `Value`s.
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CallError;
use crate::value::Value;

use super::lexer::{tokenize, Token};

/// Nesting cap for literal values; deeper input fails the parse.
const MAX_NESTING: usize = 64;

/// A parsed call: function name plus keyword arguments in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCall {
    pub name: String,
    pub args: IndexMap<String, Value>,
}

/// Parse a call expression like `search(query="rust", limit=10, tags=[1, 2])`.
///
/// The accepted language is deliberately tiny: a single outer call, keyword
/// arguments only, and literal values (strings, numbers, `true`, `false`,
/// `null`, lists, maps, and negated numbers) nesting at most 64 levels deep.
/// The parse fails on the first offending construct; callers must treat any
/// error as a failure of the whole expression.
pub fn parse_call(input: &str) -> Result<ParsedCall, CallError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let (name, kwargs) = parser.parse_call()?;

    let mut args = IndexMap::with_capacity(kwargs.len());
    for (key, node) in kwargs {
        args.insert(key, decode(node)?);
    }

    Ok(ParsedCall { name, args })
}

/// Expression node produced by the syntax pass, before the literal-domain
/// restriction is applied.
#[derive(Debug, Clone, PartialEq)]
enum ExprNode {
    String(String),
    Number(String),
    Ident(String),
    Negate(Box<ExprNode>),
    List(Vec<ExprNode>),
    Map(Vec<(ExprNode, ExprNode)>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<(), CallError> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(CallError::Malformed(format!(
                "Expected {}, found {}",
                context,
                token.describe()
            ))),
            None => Err(CallError::Malformed(format!(
                "Expected {}, found end of input",
                context
            ))),
        }
    }

    /// Parse the outer call: `IDENT '(' [kwargs] ')'` followed by nothing.
    fn parse_call(&mut self) -> Result<(String, Vec<(String, ExprNode)>), CallError> {
        let name = match self.advance() {
            Some(Token::Ident(name)) => name,
            Some(token) => {
                return Err(CallError::Malformed(format!(
                    "Expected a function name, found {}",
                    token.describe()
                )))
            }
            None => return Err(CallError::Malformed("Empty input".to_string())),
        };

        self.expect(&Token::LParen, "`(` after the function name")?;

        let mut kwargs: Vec<(String, ExprNode)> = Vec::new();
        if matches!(self.peek(), Some(Token::RParen)) {
            self.advance();
        } else {
            loop {
                let key = self.parse_kwarg_name()?;
                self.expect(&Token::Equals, "`=` after the argument name")?;
                let value = self.parse_expr(0)?;
                if kwargs.iter().any(|(existing, _)| existing == &key) {
                    return Err(CallError::Malformed(format!(
                        "Duplicate keyword argument `{}`",
                        key
                    )));
                }
                kwargs.push((key, value));

                match self.advance() {
                    Some(Token::Comma) => {
                        // Allow a trailing comma before the closing paren
                        if matches!(self.peek(), Some(Token::RParen)) {
                            self.advance();
                            break;
                        }
                    }
                    Some(Token::RParen) => break,
                    Some(token) => {
                        return Err(CallError::Malformed(format!(
                            "Expected `,` or `)`, found {}",
                            token.describe()
                        )))
                    }
                    None => {
                        return Err(CallError::Malformed(
                            "Expected `,` or `)`, found end of input".to_string(),
                        ))
                    }
                }
            }
        }

        if let Some(token) = self.peek() {
            return Err(CallError::Malformed(format!(
                "Unexpected {} after the call",
                token.describe()
            )));
        }

        Ok((name, kwargs))
    }

    fn parse_kwarg_name(&mut self) -> Result<String, CallError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            Some(
                Token::String(_)
                | Token::Number(_)
                | Token::Minus
                | Token::LBracket
                | Token::LBrace,
            ) => Err(CallError::Malformed(
                "Positional arguments are not supported".to_string(),
            )),
            Some(token) => Err(CallError::Malformed(format!(
                "Expected an argument name, found {}",
                token.describe()
            ))),
            None => Err(CallError::Malformed(
                "Expected an argument name, found end of input".to_string(),
            )),
        }
    }

    /// `depth` counts enclosing containers and negations; past `MAX_NESTING`
    /// the parse fails rather than recursing further.
    fn parse_expr(&mut self, depth: usize) -> Result<ExprNode, CallError> {
        if depth > MAX_NESTING {
            return Err(CallError::UnsupportedExpression(format!(
                "Nesting deeper than {} levels",
                MAX_NESTING
            )));
        }
        match self.advance() {
            Some(Token::String(s)) => Ok(ExprNode::String(s)),
            Some(Token::Number(text)) => Ok(ExprNode::Number(text)),
            Some(Token::Minus) => Ok(ExprNode::Negate(Box::new(self.parse_expr(depth + 1)?))),
            Some(Token::Ident(name)) => {
                // An identifier followed by `(` would be a nested call
                if matches!(self.peek(), Some(Token::LParen)) {
                    return Err(CallError::UnsupportedExpression(format!(
                        "Nested call to `{}`",
                        name
                    )));
                }
                Ok(ExprNode::Ident(name))
            }
            Some(Token::LBracket) => self.parse_list(depth),
            Some(Token::LBrace) => self.parse_map(depth),
            Some(token) => Err(CallError::Malformed(format!(
                "Expected a value, found {}",
                token.describe()
            ))),
            None => Err(CallError::Malformed(
                "Expected a value, found end of input".to_string(),
            )),
        }
    }

    fn parse_list(&mut self, depth: usize) -> Result<ExprNode, CallError> {
        let mut items = Vec::new();
        if matches!(self.peek(), Some(Token::RBracket)) {
            self.advance();
            return Ok(ExprNode::List(items));
        }

        loop {
            items.push(self.parse_expr(depth + 1)?);
            match self.advance() {
                Some(Token::Comma) => {
                    if matches!(self.peek(), Some(Token::RBracket)) {
                        self.advance();
                        break;
                    }
                }
                Some(Token::RBracket) => break,
                Some(token) => {
                    return Err(CallError::Malformed(format!(
                        "Expected `,` or `]`, found {}",
                        token.describe()
                    )))
                }
                None => return Err(CallError::Malformed("Unterminated list literal".to_string())),
            }
        }

        Ok(ExprNode::List(items))
    }

    fn parse_map(&mut self, depth: usize) -> Result<ExprNode, CallError> {
        let mut entries = Vec::new();
        if matches!(self.peek(), Some(Token::RBrace)) {
            self.advance();
            return Ok(ExprNode::Map(entries));
        }

        loop {
            let key = self.parse_expr(depth + 1)?;
            self.expect(&Token::Colon, "`:` after the mapping key")?;
            let value = self.parse_expr(depth + 1)?;
            entries.push((key, value));

            match self.advance() {
                Some(Token::Comma) => {
                    if matches!(self.peek(), Some(Token::RBrace)) {
                        self.advance();
                        break;
                    }
                }
                Some(Token::RBrace) => break,
                Some(token) => {
                    return Err(CallError::Malformed(format!(
                        "Expected `,` or `}}`, found {}",
                        token.describe()
                    )))
                }
                None => return Err(CallError::Malformed("Unterminated map literal".to_string())),
            }
        }

        Ok(ExprNode::Map(entries))
    }
}

/// Restrict a parsed node to the literal value domain.
fn decode(node: ExprNode) -> Result<Value, CallError> {
    match node {
        ExprNode::String(s) => Ok(Value::String(s)),
        ExprNode::Number(text) => decode_number(&text),
        ExprNode::Ident(name) => match name.as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            "null" => Ok(Value::Null),
            _ => Err(CallError::UnsupportedExpression(format!(
                "Unknown identifier `{}`",
                name
            ))),
        },
        ExprNode::Negate(inner) => match decode(*inner)? {
            Value::Integer(i) => Ok(Value::Integer(-i)),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(CallError::UnsupportedExpression(format!(
                "Unary minus on a {} value",
                other.type_name()
            ))),
        },
        ExprNode::List(items) => {
            let values = items
                .into_iter()
                .map(decode)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::List(values))
        }
        ExprNode::Map(entries) => {
            let mut map = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(decode_key(key)?, decode(value)?);
            }
            Ok(Value::Map(map))
        }
    }
}

// Integer parse first so values like `10` stay integral.
fn decode_number(text: &str) -> Result<Value, CallError> {
    if let Ok(i) = text.parse::<i64>() {
        Ok(Value::Integer(i))
    } else if let Ok(f) = text.parse::<f64>() {
        Ok(Value::Float(f))
    } else {
        Err(CallError::Malformed(format!("Invalid number `{}`", text)))
    }
}

/// Mapping keys must themselves be literal constants: string, number, or
/// boolean. They are rendered to their canonical string form because the
/// map domain is string-keyed.
fn decode_key(node: ExprNode) -> Result<String, CallError> {
    match node {
        ExprNode::String(s) => Ok(s),
        ExprNode::Number(text) => Ok(decode_number(&text)?.to_string()),
        ExprNode::Ident(name) if name == "true" || name == "false" => Ok(name),
        ExprNode::Ident(name) => Err(CallError::UnsupportedKey(format!(
            "Identifier `{}`",
            name
        ))),
        ExprNode::Negate(_) => Err(CallError::UnsupportedKey(
            "Negated expression".to_string(),
        )),
        ExprNode::List(_) => Err(CallError::UnsupportedKey("List literal".to_string())),
        ExprNode::Map(_) => Err(CallError::UnsupportedKey("Map literal".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_literal_domain() {
        let call = parse_call(r#"foo(a=1, b="x", c=[1, 2, -3], d={"k": true}, e=null)"#).unwrap();
        assert_eq!(call.name, "foo");
        assert_eq!(call.args.len(), 5);
        assert_eq!(call.args["a"], Value::Integer(1));
        assert_eq!(call.args["b"], Value::String("x".into()));
        assert_eq!(
            call.args["c"],
            Value::List(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(-3),
            ])
        );
        let map = call.args["d"].as_map().unwrap();
        assert_eq!(map.get("k"), Some(&Value::Boolean(true)));
        assert_eq!(call.args["e"], Value::Null);
    }

    #[test]
    fn test_parse_preserves_argument_order() {
        let call = parse_call("f(z=1, a=2, m=3)").unwrap();
        let keys: Vec<&str> = call.args.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_empty_call() {
        let call = parse_call("heartbeat()").unwrap();
        assert_eq!(call.name, "heartbeat");
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_parse_trailing_commas() {
        let call = parse_call(r#"f(a=[1, 2,], b={"k": 1,}, c=3,)"#).unwrap();
        assert_eq!(call.args.len(), 3);
        assert_eq!(
            call.args["a"],
            Value::List(vec![Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn test_parse_string_quoting() {
        let call = parse_call(r#"f(a='single', b="double", c='it\'s')"#).unwrap();
        assert_eq!(call.args["a"], Value::String("single".into()));
        assert_eq!(call.args["b"], Value::String("double".into()));
        assert_eq!(call.args["c"], Value::String("it's".into()));
    }

    #[test]
    fn test_parse_numbers() {
        let call = parse_call("f(a=10, b=2.5, c=.5, d=1e3, e=5.)").unwrap();
        assert_eq!(call.args["a"], Value::Integer(10));
        assert_eq!(call.args["b"], Value::Float(2.5));
        assert_eq!(call.args["c"], Value::Float(0.5));
        assert_eq!(call.args["d"], Value::Float(1000.0));
        assert_eq!(call.args["e"], Value::Float(5.0));
    }

    #[test]
    fn test_parse_integer_overflow_falls_back_to_float() {
        let call = parse_call("f(n=9223372036854775808)").unwrap();
        match call.args["n"] {
            Value::Float(f) => assert!(f > 9.2e18),
            ref other => panic!("Expected float fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_numbers() {
        let call = parse_call("f(a=-5, b=-2.5, c=--5)").unwrap();
        assert_eq!(call.args["a"], Value::Integer(-5));
        assert_eq!(call.args["b"], Value::Float(-2.5));
        assert_eq!(call.args["c"], Value::Integer(5));
    }

    #[test]
    fn test_parse_boolean_and_null() {
        let call = parse_call("f(a=true, b=false, c=null)").unwrap();
        assert_eq!(call.args["a"], Value::Boolean(true));
        assert_eq!(call.args["b"], Value::Boolean(false));
        assert_eq!(call.args["c"], Value::Null);
    }

    #[test]
    fn test_parse_keywords_are_case_sensitive() {
        let err = parse_call("f(x=True)").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(msg) if msg.contains("True")));

        let err = parse_call("f(x=NULL)").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(_)));
    }

    #[test]
    fn test_parse_unknown_identifier_value() {
        let err = parse_call("f(x=variable)").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(msg) if msg.contains("variable")));
    }

    #[test]
    fn test_parse_nested_call_rejected() {
        let err = parse_call("f(x=g(y=1))").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(msg) if msg.contains("`g`")));
    }

    #[test]
    fn test_parse_negated_non_numeric_rejected() {
        let err = parse_call(r#"f(x=-"a")"#).unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(msg) if msg.contains("string")));

        let err = parse_call("f(x=-[1])").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(msg) if msg.contains("list")));
    }

    #[test]
    fn test_parse_map_key_kinds() {
        let call = parse_call(r#"f(x={"k": 1, 2: 2, 2.5: 3, true: 4})"#).unwrap();
        let map = call.args["x"].as_map().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["k", "2", "2.5", "true"]);
    }

    #[test]
    fn test_parse_map_identifier_key_rejected() {
        let err = parse_call("f(x={y: 1})").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedKey(msg) if msg.contains("`y`")));
    }

    #[test]
    fn test_parse_map_null_key_rejected() {
        let err = parse_call("f(x={null: 1})").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedKey(_)));
    }

    #[test]
    fn test_parse_map_compound_key_rejected() {
        let err = parse_call("f(x={-1: 1})").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedKey(_)));

        let err = parse_call("f(x={[1]: 1})").unwrap_err();
        assert!(matches!(err, CallError::UnsupportedKey(_)));
    }

    #[test]
    fn test_parse_map_duplicate_key_last_wins() {
        let call = parse_call(r#"f(x={"k": 1, "k": 2})"#).unwrap();
        let map = call.args["x"].as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("k"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_parse_rejects_non_call_input() {
        assert!(matches!(
            parse_call("1 + 2").unwrap_err(),
            CallError::Malformed(_)
        ));
        assert!(matches!(
            parse_call("foo").unwrap_err(),
            CallError::Malformed(_)
        ));
        assert!(matches!(
            parse_call(r#""just a string""#).unwrap_err(),
            CallError::Malformed(_)
        ));
        assert!(matches!(
            parse_call("").unwrap_err(),
            CallError::Malformed(_)
        ));
    }

    #[test]
    fn test_parse_positional_arguments_rejected() {
        let err = parse_call("f(1)").unwrap_err();
        assert!(matches!(err, CallError::Malformed(msg) if msg.contains("Positional")));

        let err = parse_call(r#"f(a=1, "x")"#).unwrap_err();
        assert!(matches!(err, CallError::Malformed(msg) if msg.contains("Positional")));
    }

    #[test]
    fn test_parse_duplicate_keyword_rejected() {
        let err = parse_call("f(a=1, a=2)").unwrap_err();
        assert!(matches!(err, CallError::Malformed(msg) if msg.contains("Duplicate")));
    }

    #[test]
    fn test_parse_dotted_callee_rejected() {
        assert!(matches!(
            parse_call("a.b(x=1)").unwrap_err(),
            CallError::Malformed(_)
        ));
    }

    #[test]
    fn test_parse_trailing_input_rejected() {
        let err = parse_call("f(a=1) extra").unwrap_err();
        assert!(matches!(err, CallError::Malformed(msg) if msg.contains("after the call")));
    }

    #[test]
    fn test_parse_incomplete_input_rejected() {
        assert!(matches!(
            parse_call("f(a=[1, 2").unwrap_err(),
            CallError::Malformed(_)
        ));
        assert!(matches!(
            parse_call("f(a=)").unwrap_err(),
            CallError::Malformed(_)
        ));
        assert!(matches!(
            parse_call("f(a 1)").unwrap_err(),
            CallError::Malformed(_)
        ));
        assert!(matches!(
            parse_call("f(a=1").unwrap_err(),
            CallError::Malformed(_)
        ));
    }

    #[test]
    fn test_parse_empty_containers() {
        let call = parse_call("f(a=[], b={})").unwrap();
        assert_eq!(call.args["a"], Value::List(vec![]));
        assert_eq!(call.args["b"], Value::Map(IndexMap::new()));
    }

    #[test]
    fn test_parse_deep_nesting() {
        let call = parse_call(r#"f(x=[[1], [[2]]], y={"a": {"b": [3, null]}})"#).unwrap();
        let outer = call.args["x"].as_list().unwrap();
        assert_eq!(outer.len(), 2);
        let inner = call.args["y"].as_map().unwrap()["a"].as_map().unwrap();
        assert_eq!(
            inner.get("b"),
            Some(&Value::List(vec![Value::Integer(3), Value::Null]))
        );
    }

    #[test]
    fn test_parse_nesting_at_the_cap() {
        let input = format!("f(x={}1{})", "[".repeat(64), "]".repeat(64));
        let call = parse_call(&input).unwrap();
        assert!(matches!(call.args["x"], Value::List(_)));
    }

    #[test]
    fn test_parse_rejects_nesting_past_the_cap() {
        let input = format!("f(x={}1{})", "[".repeat(65), "]".repeat(65));
        let err = parse_call(&input).unwrap_err();
        assert!(matches!(err, CallError::UnsupportedExpression(msg) if msg.contains("Nesting")));

        let input = format!("f(x={}1{})", "[".repeat(600), "]".repeat(600));
        assert!(matches!(
            parse_call(&input).unwrap_err(),
            CallError::UnsupportedExpression(_)
        ));

        let input = format!("f(x={}1{})", r#"{"k": "#.repeat(65), "}".repeat(65));
        assert!(matches!(
            parse_call(&input).unwrap_err(),
            CallError::UnsupportedExpression(_)
        ));

        let input = format!("f(x={}5)", "-".repeat(600));
        assert!(matches!(
            parse_call(&input).unwrap_err(),
            CallError::UnsupportedExpression(_)
        ));
    }

    #[test]
    fn test_parse_is_whitespace_tolerant() {
        let call = parse_call("  f ( a = 1 ,\n\tb = [ 1 , 2 ] )  ").unwrap();
        assert_eq!(call.args.len(), 2);
    }
}
