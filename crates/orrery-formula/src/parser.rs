//! Formula parser
//!
//! A recursive descent parser for the supported formula subset: literals,
//! single cell or range references (optionally sheet-qualified), one
//! arithmetic operation between two leaves, and single calls into the
//! function library. There is no operator precedence to get right because
//! operator chains are outside the grammar; anything deeper or wider
//! parses as [`UnsupportedReason`] so coverage gaps stay visible.

use crate::ast::{BinaryOperator, CellRef, FormulaExpr, FunctionName, RangeRef};
use crate::error::{FormulaError, FormulaResult, UnsupportedReason};
use orrery_core::{CellAddress, CellRange};

/// Parse formula text into an AST
///
/// The leading `=` is optional; workbook exports carry both forms.
///
/// # Example
/// ```rust
/// use orrery_formula::{parse_formula, FormulaExpr, FormulaError};
///
/// let expr = parse_formula("=SUM(A1:A10)").unwrap();
/// assert!(matches!(expr, FormulaExpr::FunctionCall { .. }));
///
/// // Out-of-grammar formulas are a typed result, not a panic
/// let err = parse_formula("=A1+B1+C1").unwrap_err();
/// assert!(matches!(err, FormulaError::Unsupported(_)));
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let text = formula.trim();
    let text = text.strip_prefix('=').unwrap_or(text);

    let mut parser = FormulaParser::new(text);
    let expr = parser.parse_formula_body()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Function name or other bare name
    Ident(String),
    /// Cell reference text like A1, $A$1
    Ref(String),
    /// Sheet qualifier like Mars! (without the bang)
    SheetRef(String),

    Plus,
    Minus,
    Star,
    Slash,
    Colon,
    Comma,
    LeftParen,
    RightParen,

    /// Character with no role in the supported grammar
    Unsupported(char),
    /// Lexeme that started well and went wrong (bad number, unterminated
    /// string)
    Invalid(String),
    Eof,
}

struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '+' => {
                self.advance();
                Token::Plus
            }
            '-' => {
                self.advance();
                Token::Minus
            }
            '*' => {
                self.advance();
                Token::Star
            }
            '/' => {
                self.advance();
                Token::Slash
            }
            ':' => {
                self.advance();
                Token::Colon
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            '(' => {
                self.advance();
                Token::LeftParen
            }
            ')' => {
                self.advance();
                Token::RightParen
            }
            '"' => self.scan_string(),
            _ if c.is_ascii_digit() => self.scan_number(),
            '.' if self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()) => {
                self.scan_number()
            }
            _ if c.is_ascii_alphabetic() || c == '_' || c == '$' => self.scan_identifier_or_ref(),
            _ => {
                self.advance();
                Token::Unsupported(c)
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        self.advance(); // opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => return Token::Invalid("unterminated string literal".into()),
                Some('"') => {
                    // Doubled quote is an escaped quote
                    if self.peek_char_at(1) == Some('"') {
                        s.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        return Token::Text(s);
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[start..self.pos];
        match text.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Invalid(format!("malformed number '{text}'")),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;
        while self.peek_char().map_or(false, |c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'
        }) {
            self.advance();
        }
        let text = &self.input[start..self.pos];

        // Sheet qualifier. Only single-word sheet names are expressible;
        // the quoted 'Sheet Name'! form never lexes this far.
        if self.peek_char() == Some('!') {
            self.advance();
            return Token::SheetRef(text.to_string());
        }

        // Not call-shaped: boolean literals and cell references win over
        // names (LOG(2) is a call, A1(2) is not a thing)
        if self.peek_char() != Some('(') {
            let upper = text.to_ascii_uppercase();
            if upper == "TRUE" {
                return Token::Bool(true);
            }
            if upper == "FALSE" {
                return Token::Bool(false);
            }
            if Self::is_cell_reference(text) {
                return Token::Ref(text.to_string());
            }
        }

        Token::Ident(text.to_string())
    }

    /// Lexical shape check: optional $, letters, optional $, digits
    fn is_cell_reference(text: &str) -> bool {
        let bytes = text.as_bytes();
        let mut i = 0;

        if bytes.first() == Some(&b'$') {
            i += 1;
        }
        let letters = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        if i == letters {
            return false;
        }
        if bytes.get(i) == Some(&b'$') {
            i += 1;
        }
        let digits = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i > digits && i == bytes.len()
    }

    // === Helpers ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    fn unsupported_char(c: char) -> FormulaError {
        let reason = match c {
            '^' | '%' | '&' | '=' | '<' | '>' => UnsupportedReason::Operator(c.to_string()),
            '{' => UnsupportedReason::Syntax("array literal".into()),
            _ => UnsupportedReason::Syntax(format!("unexpected character '{c}'")),
        };
        FormulaError::Unsupported(reason)
    }

    fn describe(token: &Token) -> String {
        match token {
            Token::Number(n) => format!("number {n}"),
            Token::Text(_) => "string literal".into(),
            Token::Bool(b) => format!("{b:?}").to_uppercase(),
            Token::Ident(name) => format!("name '{name}'"),
            Token::Ref(text) => format!("reference '{text}'"),
            Token::SheetRef(name) => format!("sheet qualifier '{name}!'"),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::Colon => "':'".into(),
            Token::Comma => "','".into(),
            Token::LeftParen => "'('".into(),
            Token::RightParen => "')'".into(),
            Token::Unsupported(c) => format!("'{c}'"),
            Token::Invalid(what) => what.clone(),
            Token::Eof => "end of formula".into(),
        }
    }

    // === Parsing ===

    /// One formula: a function call, a single leaf, or leaf-op-leaf
    fn parse_formula_body(&mut self) -> FormulaResult<FormulaExpr> {
        if let Token::Ident(name) = self.current_token().clone() {
            self.consume();
            let call = self.parse_function_call(&name)?;
            if self.peek_operator().is_some() {
                return Err(FormulaError::unsupported(UnsupportedReason::NonLeafOperand));
            }
            return Ok(call);
        }

        let left = self.parse_value_term()?;

        let op = match self.peek_operator() {
            Some(op) => op,
            None => {
                // Single term pass-through; a bare range has no value
                if matches!(left, FormulaExpr::RangeRef(_)) {
                    return Err(FormulaError::unsupported(UnsupportedReason::RangeOperand));
                }
                return Ok(left);
            }
        };
        self.consume();

        if matches!(left, FormulaExpr::RangeRef(_)) {
            return Err(FormulaError::unsupported(UnsupportedReason::RangeOperand));
        }

        let right = self.parse_operand()?;

        if self.peek_operator().is_some() {
            return Err(FormulaError::unsupported(UnsupportedReason::OperatorChain));
        }

        Ok(FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn peek_operator(&self) -> Option<BinaryOperator> {
        match self.current_token() {
            Token::Plus => Some(BinaryOperator::Add),
            Token::Minus => Some(BinaryOperator::Subtract),
            Token::Star => Some(BinaryOperator::Multiply),
            Token::Slash => Some(BinaryOperator::Divide),
            _ => None,
        }
    }

    /// Right-hand operand of an arithmetic operation: leaves only
    fn parse_operand(&mut self) -> FormulaResult<FormulaExpr> {
        if let Token::Ident(name) = self.current_token().clone() {
            self.consume();
            if matches!(self.current_token(), Token::LeftParen) {
                return Err(FormulaError::unsupported(UnsupportedReason::NonLeafOperand));
            }
            return Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                format!("unrecognized name '{name}'"),
            )));
        }

        let term = self.parse_value_term()?;
        if matches!(term, FormulaExpr::RangeRef(_)) {
            return Err(FormulaError::unsupported(UnsupportedReason::RangeOperand));
        }
        Ok(term)
    }

    /// Function argument: leaves, plus ranges (validated per function)
    fn parse_argument(&mut self) -> FormulaResult<FormulaExpr> {
        if let Token::Ident(name) = self.current_token().clone() {
            self.consume();
            if matches!(self.current_token(), Token::LeftParen) {
                return Err(FormulaError::unsupported(
                    UnsupportedReason::NonLeafArgument,
                ));
            }
            return Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                format!("unrecognized name '{name}'"),
            )));
        }

        self.parse_value_term()
    }

    /// A literal or a (possibly sheet-qualified) reference
    fn parse_value_term(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume();
                Ok(FormulaExpr::Number(n))
            }
            Token::Minus => {
                // Negative numeric literal; unary minus on anything else
                // is out of grammar
                self.consume();
                match self.current_token().clone() {
                    Token::Number(n) => {
                        self.consume();
                        Ok(FormulaExpr::Number(-n))
                    }
                    _ => Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                        "unary '-' is only supported on numeric literals".into(),
                    ))),
                }
            }
            Token::Text(s) => {
                self.consume();
                Ok(FormulaExpr::Text(s))
            }
            Token::Bool(b) => {
                self.consume();
                Ok(FormulaExpr::Bool(b))
            }
            Token::Ref(text) => {
                self.consume();
                self.finish_reference(None, &text)
            }
            Token::SheetRef(sheet) => {
                self.consume();
                match self.current_token().clone() {
                    Token::Ref(text) => {
                        self.consume();
                        self.finish_reference(Some(sheet), &text)
                    }
                    _ => Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                        "sheet name must be followed by a cell reference".into(),
                    ))),
                }
            }
            Token::LeftParen => Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                "parenthesized expression".into(),
            ))),
            Token::Unsupported(c) => Err(Self::unsupported_char(c)),
            Token::Invalid(what) => {
                Err(FormulaError::unsupported(UnsupportedReason::Syntax(what)))
            }
            other => Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                format!("unexpected {}", Self::describe(&other)),
            ))),
        }
    }

    /// Complete a reference that began with `text`, consuming a `:end`
    /// range tail when present
    fn finish_reference(
        &mut self,
        sheet: Option<String>,
        text: &str,
    ) -> FormulaResult<FormulaExpr> {
        let start = Self::parse_address(text)?;

        if !matches!(self.current_token(), Token::Colon) {
            return Ok(FormulaExpr::CellRef(CellRef {
                sheet,
                address: start,
            }));
        }
        self.consume();

        let (end_sheet, end_text) = match self.current_token().clone() {
            Token::Ref(t) => {
                self.consume();
                (None, t)
            }
            Token::SheetRef(s) => {
                self.consume();
                match self.current_token().clone() {
                    Token::Ref(t) => {
                        self.consume();
                        (Some(s), t)
                    }
                    _ => {
                        return Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                            "sheet name must be followed by a cell reference".into(),
                        )))
                    }
                }
            }
            _ => {
                return Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                    "range is missing its end reference".into(),
                )))
            }
        };

        // An end qualifier must match the start; ranges never span sheets
        if let Some(end_sheet) = &end_sheet {
            if sheet.as_deref() != Some(end_sheet.as_str()) {
                return Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                    "range endpoints name different sheets".into(),
                )));
            }
        }

        let end = Self::parse_address(&end_text)?;
        Ok(FormulaExpr::RangeRef(RangeRef {
            sheet,
            range: CellRange::new(start, end),
        }))
    }

    fn parse_address(text: &str) -> FormulaResult<CellAddress> {
        CellAddress::parse(text).map_err(|_| {
            FormulaError::unsupported(UnsupportedReason::Syntax(format!(
                "cell reference '{text}' is out of bounds"
            )))
        })
    }

    fn parse_function_call(&mut self, name: &str) -> FormulaResult<FormulaExpr> {
        if !matches!(self.current_token(), Token::LeftParen) {
            return Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                format!("unrecognized name '{name}'"),
            )));
        }
        let function = match FunctionName::parse(name) {
            Some(function) => function,
            None => {
                return Err(FormulaError::unsupported(
                    UnsupportedReason::UnknownFunction(name.to_string()),
                ))
            }
        };
        self.consume(); // '('

        let mut args = Vec::new();
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_argument()?);
            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.parse_argument()?);
            }
        }
        self.expect_right_paren()?;

        validate_call(function, &args)?;

        Ok(FormulaExpr::FunctionCall {
            name: function,
            args,
        })
    }

    fn expect_right_paren(&mut self) -> FormulaResult<()> {
        match self.current_token().clone() {
            Token::RightParen => {
                self.consume();
                Ok(())
            }
            Token::Unsupported(c) => Err(Self::unsupported_char(c)),
            Token::Invalid(what) => {
                Err(FormulaError::unsupported(UnsupportedReason::Syntax(what)))
            }
            other => Err(FormulaError::unsupported(UnsupportedReason::Syntax(
                format!("expected ')', found {}", Self::describe(&other)),
            ))),
        }
    }

    fn expect_end(&mut self) -> FormulaResult<()> {
        match self.current_token().clone() {
            Token::Eof => Ok(()),
            Token::Unsupported(c) => Err(Self::unsupported_char(c)),
            Token::Invalid(what) => {
                Err(FormulaError::unsupported(UnsupportedReason::Syntax(what)))
            }
            _ => Err(FormulaError::unsupported(UnsupportedReason::TrailingInput)),
        }
    }
}

/// Arity and range-placement checks for a parsed call
fn validate_call(function: FunctionName, args: &[FormulaExpr]) -> FormulaResult<()> {
    let (expected, ok) = match function {
        FunctionName::Sum | FunctionName::Max | FunctionName::Min => {
            ("1 or more", !args.is_empty())
        }
        FunctionName::If | FunctionName::Rri => ("3", args.len() == 3),
        FunctionName::IfError => ("2", args.len() == 2),
        FunctionName::Log => ("1 or 2", (1..=2).contains(&args.len())),
        FunctionName::Exp => ("1", args.len() == 1),
    };
    if !ok {
        return Err(FormulaError::unsupported(UnsupportedReason::ArgumentCount {
            function,
            expected,
            actual: args.len(),
        }));
    }

    // Ranges spread only inside the aggregates
    let aggregate = matches!(
        function,
        FunctionName::Sum | FunctionName::Max | FunctionName::Min
    );
    if !aggregate && args.iter().any(|a| matches!(a, FormulaExpr::RangeRef(_))) {
        return Err(FormulaError::unsupported(UnsupportedReason::RangeOperand));
    }

    Ok(())
}
