//! Lexical pieces of generated SQLite text.

/// One lexical element of a rendered query.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Select,
    Distinct,
    From,
    Where,
    And,
    As,
    Inner,
    Join,
    On,
    OrderBy,
    Asc,
    Limit,
    Offset,
    In,
    False,

    Comma,
    Dot,
    Star,
    LParen,
    RParen,
    Eq,
    Gte,

    Space,
    Newline,
    Indent(usize),

    /// Table, column or alias name; always quoted.
    Ident(String),
    LitInt(i64),
    LitString(String),
    FunctionName(String),
}

impl Token {
    /// Text of tokens that carry no content.
    fn fixed_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Select => "SELECT",
            Token::Distinct => "DISTINCT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::And => "AND",
            Token::As => "AS",
            Token::Inner => "INNER",
            Token::Join => "JOIN",
            Token::On => "ON",
            Token::OrderBy => "ORDER BY",
            Token::Asc => "ASC",
            Token::Limit => "LIMIT",
            Token::Offset => "OFFSET",
            Token::In => "IN",
            Token::False => "FALSE",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Star => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Eq => "=",
            Token::Gte => ">=",
            Token::Space => " ",
            Token::Newline => "\n",
            _ => return None,
        };
        Some(text)
    }

    pub fn serialize(&self) -> String {
        if let Some(text) = self.fixed_text() {
            return text.to_string();
        }
        match self {
            Token::Indent(depth) => "  ".repeat(*depth),
            Token::Ident(name) => quote_identifier(name),
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => quote_string(s),
            Token::FunctionName(name) => name.to_ascii_uppercase(),
            _ => String::new(),
        }
    }
}

/// `"name"`, doubling embedded double quotes.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `'text'`, doubling embedded single quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Ordered tokens for one statement or fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend_from_slice(&other.tokens);
        self
    }

    /// Concatenated text of every token.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }

    pub fn indent(&mut self, depth: usize) -> &mut Self {
        self.push(Token::Indent(depth))
    }

    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }

    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }

    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
