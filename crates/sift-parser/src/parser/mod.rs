//! JavaScript/JSX parser.
//!
//! A recursive descent parser without a token stream. Expressions are parsed
//! as a primary followed by `reparse`, which keeps extending the node while
//! the next operator binds tighter than the operator on top of the operator
//! stack. Three stacks carry the parse state:
//!
//! - `contexts`: what kind of construct encloses the cursor. Drives how a
//!   delimited group is parsed and which statements are legal.
//! - `operators`: operators whose right-hand side is being parsed.
//! - `belly`: fixed text that was consumed but may still be handed back.
//!
//! Every push is paired with a [`StackGuard`], so an early `?` return always
//! leaves the stacks as they were.

mod expressions;
mod functions;
mod group;
#[cfg(feature = "jsx")]
mod jsx;
mod modules;
mod patterns;
mod statements;

use std::ops::{Deref, DerefMut};

use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};
use crate::scanner::Scanner;
use crate::span::Span;

pub(crate) use group::Item;

/// Parser configuration options.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Module (import/export allowed) or classic script.
    pub source_type: SourceType,
    /// Enable JSX parsing.
    pub jsx: bool,
}

impl ParserOptions {
    pub fn with_jsx(mut self, jsx: bool) -> Self {
        self.jsx = jsx;
        self
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }
}

/// Flags of the innermost function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FunctionFlags {
    pub is_async: bool,
    pub is_generator: bool,
}

/// Enclosing syntactic construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    Global,
    Block,
    Function(FunctionFlags),
    /// Parenthesised expression, template substitution, computed member.
    Expression,
    Object,
    Array,
    Call,
    Parameters,
    ClassBody,
    /// `extends` clause of a class.
    Heritage,
    /// Initialiser of a `for (...)` head.
    ForParams,
    SwitchBlock,
    Case,
    Declaration,
    New,
    /// Computed property key.
    Property,
    Label(String),
    Loop,
    JsxAttribute,
    Import,
    Export,
}

impl Context {
    /// Contexts whose groups hold statements.
    fn holds_statements(&self) -> bool {
        matches!(
            self,
            Context::Global
                | Context::Block
                | Context::Function(_)
                | Context::Case
                | Context::Label(_)
                | Context::Loop
        )
    }
}

/// An operator whose right operand is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Sequence,
    /// Assignment, arrow bodies, and the marker pushed for list items.
    Assign,
    Conditional,
    Logical(LogicalOp),
    Binary(BinaryOp),
    Unary,
    New,
}

impl Operator {
    fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Operator::Sequence => 1,
            Operator::Assign | Operator::Conditional => 2,
            Operator::Logical(LogicalOp::Or | LogicalOp::NullishCoalesce) => 3,
            Operator::Logical(LogicalOp::And) => 4,
            Operator::Binary(BitOr) => 5,
            Operator::Binary(BitXor) => 6,
            Operator::Binary(BitAnd) => 7,
            Operator::Binary(Eq | NotEq | StrictEq | StrictNotEq) => 8,
            Operator::Binary(Lt | LtEq | Gt | GtEq | In | Instanceof) => 9,
            Operator::Binary(Shl | Shr | UShr) => 10,
            Operator::Binary(Add | Sub) => 11,
            Operator::Binary(Mul | Div | Mod) => 12,
            Operator::Binary(Pow) => 13,
            Operator::Unary => 14,
            Operator::New => 15,
        }
    }

    fn right_associative(self) -> bool {
        matches!(
            self,
            Operator::Assign | Operator::Conditional | Operator::Binary(BinaryOp::Pow) | Operator::Unary
        )
    }
}

/// Fixed text consumed speculatively.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Swallowed {
    pub text: &'static str,
    /// Cursor position before the text (and its leading trivia).
    pub at: usize,
}

/// How a primary expression was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hint {
    None,
    /// Came out of a parenthesised group; may become arrow parameters.
    Group,
}

/// The parser.
pub struct Parser<'a> {
    pub(crate) scanner: Scanner<'a>,
    pub(crate) options: ParserOptions,
    pub(crate) contexts: Vec<Context>,
    pub(crate) operators: Vec<Operator>,
    pub(crate) belly: Vec<Swallowed>,
    /// Offset of a trailing comma that closed a parenthesised list.
    pub(crate) dangling_comma: Option<usize>,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(source: &'a str, options: ParserOptions) -> Self {
        Self {
            scanner: Scanner::new(source),
            options,
            contexts: vec![Context::Global],
            operators: Vec::new(),
            belly: Vec::new(),
            dangling_comma: None,
        }
    }

    /// Parse the entire source into a program.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while !self.scanner.at_end() {
            body.push(self.parse_statement()?);
        }
        if let Some(at) = self.scanner.trivia().unclosed {
            return Err(ParseError::at(SyntaxErrorKind::UnterminatedComment, at));
        }
        let span = Span::new(0, self.scanner.source().len() as u32);
        Ok(Program::new(body, self.options.source_type, span))
    }

    // =========================================================================
    // Stacks
    // =========================================================================

    /// Push a context until the returned guard drops.
    pub(crate) fn enter(&mut self, context: Context) -> StackGuard<'_, 'a> {
        let guard = StackGuard::new(self, false);
        guard.parser.contexts.push(context);
        guard
    }

    /// Push an operator until the returned guard drops.
    pub(crate) fn push_operator(&mut self, operator: Operator) -> StackGuard<'_, 'a> {
        let guard = StackGuard::new(self, false);
        guard.parser.operators.push(operator);
        guard
    }

    /// Push a context and start from empty operator and belly stacks. The
    /// previous stacks come back when the guard drops.
    pub(crate) fn isolate(&mut self, context: Context) -> StackGuard<'_, 'a> {
        let guard = StackGuard::new(self, true);
        guard.parser.contexts.push(context);
        guard
    }

    /// Innermost context.
    pub(crate) fn context(&self) -> &Context {
        self.contexts.last().unwrap_or(&Context::Global)
    }

    /// Search the contexts up to the innermost function boundary.
    pub(crate) fn in_function_scope(&self, pred: impl Fn(&Context) -> bool) -> bool {
        for context in self.contexts.iter().rev() {
            if pred(context) {
                return true;
            }
            if matches!(context, Context::Function(_)) {
                break;
            }
        }
        false
    }

    /// Flags of the innermost function, if any.
    pub(crate) fn function_flags(&self) -> Option<FunctionFlags> {
        self.contexts.iter().rev().find_map(|c| match c {
            Context::Function(flags) => Some(*flags),
            _ => None,
        })
    }

    /// Whether `await` is an operator at the cursor.
    pub(crate) fn await_allowed(&self) -> bool {
        match self.function_flags() {
            Some(flags) => flags.is_async,
            None => self.options.source_type == SourceType::Module,
        }
    }

    /// Whether a for-loop initialiser is being parsed (`in` is not an
    /// operator there).
    pub(crate) fn in_for_init(&self) -> bool {
        self.contexts
            .iter()
            .rev()
            .find(|c| !matches!(c, Context::Declaration))
            .is_some_and(|c| *c == Context::ForParams)
    }

    /// Whether `,` ends a list item rather than forming a sequence.
    pub(crate) fn comma_is_separator(&self) -> bool {
        matches!(
            self.context(),
            Context::Call
                | Context::Array
                | Context::Object
                | Context::Parameters
                | Context::Declaration
                | Context::Import
                | Context::Export
                | Context::JsxAttribute
        )
    }

    /// Whether `incoming` must yield to the operator on top of the stack.
    pub(crate) fn lower_precedence(&self, incoming: Operator) -> bool {
        let Some(&top) = self.operators.last() else {
            return false;
        };
        let (new, old) = (incoming.precedence(), top.precedence());
        new < old || (new == old && !incoming.right_associative())
    }

    /// Consume `text` and remember it so it can be handed back.
    pub(crate) fn swallow(&mut self, text: &'static str) -> bool {
        let at = self.scanner.pos();
        if self.scanner.eat(text) {
            self.belly.push(Swallowed { text, at });
            true
        } else {
            false
        }
    }

    /// Like `swallow`, failing with `EXPECTED(text)`.
    pub(crate) fn open(&mut self, text: &'static str) -> Result<(), ParseError> {
        if self.swallow(text) {
            Ok(())
        } else {
            Err(self.error(SyntaxErrorKind::Expected(text)))
        }
    }

    /// The swallowed text on top of the belly has been used.
    pub(crate) fn digest(&mut self) {
        self.belly.pop();
    }

    /// Hand back the swallowed text on top of the belly.
    pub(crate) fn recede(&mut self) {
        if let Some(swallowed) = self.belly.pop() {
            self.scanner.backtrack(swallowed.at);
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Offset of the next lexeme.
    #[inline]
    pub(crate) fn start(&self) -> u32 {
        self.scanner.next_start() as u32
    }

    /// Span from `start` to the end of the last consumed lexeme.
    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.scanner.pos() as u32)
    }

    /// Error at the next lexeme. An unclosed comment swallows the rest of
    /// the input and takes precedence.
    pub(crate) fn error(&self, kind: SyntaxErrorKind) -> ParseError {
        let trivia = self.scanner.trivia();
        if let Some(at) = self.scanner.comment_error.or(trivia.unclosed) {
            return ParseError::at(SyntaxErrorKind::UnterminatedComment, at);
        }
        ParseError::at(kind, trivia.end)
    }

    /// Error describing whatever sits at the cursor.
    pub(crate) fn unexpected(&self) -> ParseError {
        if self.scanner.at_end() {
            return self.error(SyntaxErrorKind::Abrupt);
        }
        let text = if let Some(word) = self.scanner.peek_word() {
            word.to_string()
        } else if let Some(p) = self.scanner.peek_punctuator() {
            p.to_string()
        } else {
            self.scanner.peek_char().map(String::from).unwrap_or_default()
        };
        self.error(SyntaxErrorKind::UnexpectedToken(text))
    }

    /// Consume `text` or fail with `EXPECTED(text)`.
    pub(crate) fn expect(&mut self, text: &'static str) -> Result<(), ParseError> {
        if self.scanner.eat(text) {
            Ok(())
        } else {
            Err(self.error(SyntaxErrorKind::Expected(text)))
        }
    }

    /// End a statement: `;`, or an inserted semicolon before `}`, end of
    /// input, or a line break.
    pub(crate) fn semicolon(&mut self) -> Result<(), ParseError> {
        if self.scanner.eat(";") || self.scanner.at("}") || self.scanner.at_end() {
            return Ok(());
        }
        if self.scanner.newline_ahead() {
            return Ok(());
        }
        Err(self.unexpected())
    }

    /// Consume the separator after a list item unless the list closes.
    pub(crate) fn separator(&mut self, closer: &'static str) -> Result<(), ParseError> {
        if self.scanner.at(closer) || self.scanner.eat(",") {
            Ok(())
        } else if self.scanner.at_end() {
            Err(self.error(SyntaxErrorKind::Expected(closer)))
        } else {
            Err(self.error(SyntaxErrorKind::Expected(",")))
        }
    }

    /// Any identifier name, reserved words included (property names).
    pub(crate) fn identifier_name(&mut self) -> Result<String, ParseError> {
        match self.scanner.identifier() {
            Some(name) => Ok(name),
            None => Err(self.error(SyntaxErrorKind::IdentifierExpected)),
        }
    }

    /// An identifier usable as a binding or reference.
    pub(crate) fn binding_identifier(&mut self) -> Result<String, ParseError> {
        if let Some(word) = self.scanner.peek_word() {
            if is_reserved(word) {
                return Err(self.error(SyntaxErrorKind::UnexpectedToken(word.to_string())));
            }
        }
        self.identifier_name()
    }

    /// A string literal (module specifiers).
    pub(crate) fn string_literal(&mut self) -> Result<(String, Span), ParseError> {
        if !matches!(self.scanner.peek(), Some(b'"' | b'\'')) {
            return Err(self.error(SyntaxErrorKind::Expected("string")));
        }
        self.scanner.skip_trivia();
        let start = self.scanner.pos();
        let value = self
            .scanner
            .string()
            .map_err(|kind| ParseError::at(kind, start))?;
        Ok((value, Span::new(start as u32, self.scanner.pos() as u32)))
    }

    /// Whether the next lexeme is a word that is not reserved.
    pub(crate) fn at_binding_identifier(&self) -> bool {
        self.scanner.peek_word().is_some_and(|w| !is_reserved(w))
            || self.scanner.rest().starts_with("\\u")
    }
}

/// Words that can never name a binding or a reference.
pub(crate) fn is_reserved(word: &str) -> bool {
    matches!(
        word,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "export"
            | "extends"
            | "false"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "new"
            | "null"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "enum"
    )
}

/// Restores the parser stacks to their depth at creation when dropped.
pub(crate) struct StackGuard<'p, 'a> {
    parser: &'p mut Parser<'a>,
    /// Context, operator and belly depths at creation.
    depths: (usize, usize, usize),
    saved: Option<(Vec<Operator>, Vec<Swallowed>)>,
}

impl<'p, 'a> StackGuard<'p, 'a> {
    fn new(parser: &'p mut Parser<'a>, isolate: bool) -> Self {
        let saved = isolate.then(|| {
            (
                std::mem::take(&mut parser.operators),
                std::mem::take(&mut parser.belly),
            )
        });
        Self {
            depths: (parser.contexts.len(), parser.operators.len(), parser.belly.len()),
            parser,
            saved,
        }
    }
}

impl<'a> Deref for StackGuard<'_, 'a> {
    type Target = Parser<'a>;

    fn deref(&self) -> &Self::Target {
        self.parser
    }
}

impl<'a> DerefMut for StackGuard<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.parser
    }
}

impl Drop for StackGuard<'_, '_> {
    fn drop(&mut self) {
        let (contexts, operators, belly) = self.depths;
        self.parser.contexts.truncate(contexts);
        match self.saved.take() {
            Some((operators, belly)) => {
                self.parser.operators = operators;
                self.parser.belly = belly;
            }
            None => {
                self.parser.operators.truncate(operators);
                self.parser.belly.truncate(belly);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source, ParserOptions::default()).parse()
    }

    fn parse_jsx(source: &str) -> Result<Program, ParseError> {
        Parser::new(source, ParserOptions::default().with_jsx(true)).parse()
    }

    fn code(source: &str) -> &'static str {
        parse(source).unwrap_err().code()
    }

    fn expr(source: &str) -> Expr {
        let program = parse(source).unwrap();
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_guard_restores_stacks() {
        let mut parser = Parser::new("a", ParserOptions::default());
        {
            let mut guard = parser.enter(Context::Block);
            guard.operators.push(Operator::Unary);
            let inner = guard.isolate(Context::Expression);
            assert!(inner.operators.is_empty());
        }
        assert_eq!(parser.contexts, vec![Context::Global]);
        assert!(parser.operators.is_empty());
    }

    #[test]
    fn test_recede_restores_position() {
        let mut parser = Parser::new("a  +b", ParserOptions::default());
        parser.scanner.identifier();
        assert!(parser.swallow("+"));
        parser.recede();
        assert_eq!(parser.scanner.pos(), 1);
        assert!(parser.belly.is_empty());
    }

    #[test]
    fn test_precedence_shape() {
        let e = expr("1 + 2 * 3;");
        let ExprKind::Binary { op: BinaryOp::Add, right, .. } = e.kind else {
            panic!("expected addition at the root");
        };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_left_associative_subtraction() {
        let e = expr("a - b - c");
        let ExprKind::Binary { left, .. } = e.kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn test_nullish_needs_parentheses_next_to_or_and() {
        for source in ["a ?? b || c", "a || b ?? c", "a ?? b && c", "a && b ?? c", "a ?? (b) || c"] {
            assert_eq!(code(source), "JS_UNEXPECTED_TOKEN", "{source}");
        }
        for source in ["(a ?? b) || c", "a ?? (b || c)", "(a && b) ?? c", "a ?? b ?? c", "a || b && c"] {
            assert!(parse(source).is_ok(), "{source}");
        }
        let e = expr("(a || b) ?? c");
        let ExprKind::Logical { op: LogicalOp::NullishCoalesce, left, .. } = e.kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Logical { op: LogicalOp::Or, .. }));
    }

    #[test]
    fn test_right_associative_assignment() {
        let e = expr("a = b = c");
        let ExprKind::Assign { left, right, .. } = e.kind else { panic!() };
        assert_eq!(left.as_ident(), Some("a"));
        assert!(matches!(right.kind, ExprKind::Assign { .. }));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let e = expr("a ** b ** c");
        let ExprKind::Binary { left, right, .. } = e.kind else { panic!() };
        assert_eq!(left.as_ident(), Some("a"));
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn test_conditional_nests_in_alternate() {
        let e = expr("a ? b : c ? d : e");
        let ExprKind::Conditional { alternate, .. } = e.kind else { panic!() };
        assert!(matches!(alternate.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn test_sequence_flattens() {
        let e = expr("a, b, c");
        let ExprKind::Sequence(items) = e.kind else { panic!() };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_postfix_after_newline_starts_statement() {
        let program = parse("a\n++b").unwrap();
        assert_eq!(program.body.len(), 2);
        let StmtKind::Expr(second) = &program.body[1].kind else { panic!() };
        assert!(matches!(second.kind, ExprKind::Update { prefix: true, .. }));
    }

    #[test]
    fn test_identifier_on_same_line_is_rejected() {
        assert_eq!(code("a b"), "JS_UNEXP_KEYWORD_OR_IDENTIFIER");
        assert_eq!(parse("a\nb").unwrap().body.len(), 2);
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let e = expr("-a + b");
        let ExprKind::Binary { left, .. } = e.kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Unary { op: UnaryOp::Minus, .. }));
    }

    #[test]
    fn test_new_with_member_callee() {
        let e = expr("new a.b(1).c");
        let ExprKind::Member { object, .. } = e.kind else { panic!() };
        let ExprKind::New { callee, args } = object.kind else { panic!() };
        assert!(matches!(callee.kind, ExprKind::Member { .. }));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(expr("x => x + 1").kind, ExprKind::Arrow(_)));
        let ExprKind::Arrow(arrow) = expr("(a, {b = 2}, ...c) => {}").kind else { panic!() };
        assert_eq!(arrow.params.len(), 3);
        assert!(arrow.params[2].rest);
        let BindingKind::Object { properties } = &arrow.params[1].binding.kind else { panic!() };
        assert!(properties[0].default.is_some());
        assert!(matches!(expr("async (a) => a").kind, ExprKind::Arrow(ref a) if a.is_async));
        assert!(matches!(expr("async(a)").kind, ExprKind::Call { .. }));
        assert!(matches!(expr("() => 1").kind, ExprKind::Arrow(_)));
    }

    #[test]
    fn test_optional_chain_is_wrapped() {
        let e = expr("a?.b.c(d)");
        let ExprKind::Chain(inner) = e.kind else { panic!() };
        assert!(matches!(inner.kind, ExprKind::Call { .. }));
    }

    #[test]
    fn test_in_is_not_an_operator_in_for_head() {
        let program = parse("for (k in o) {}").unwrap();
        assert!(matches!(program.body[0].kind, StmtKind::ForIn { .. }));
        let program = parse("for (var i = 0; i < n; i++) ;").unwrap();
        assert!(matches!(program.body[0].kind, StmtKind::For { .. }));
        let program = parse("for (const [k, v] of m) {}").unwrap();
        assert!(matches!(program.body[0].kind, StmtKind::ForOf { .. }));
    }

    #[test]
    fn test_labels_and_jumps() {
        assert!(parse("outer: for (;;) { for (;;) continue outer; }").is_ok());
        assert_eq!(code("for (;;) { continue missing; }"), "JS_ILLEGAL_CONTINUE");
        assert_eq!(code("continue;"), "JS_ILLEGAL_CONTINUE");
        assert_eq!(code("break;"), "JS_ILLEGAL_BREAK");
        assert!(parse("switch (x) { case 1: break; default: }").is_ok());
        assert_eq!(code("function f() { for (;;) { (() => { break; }); } }"), "JS_ILLEGAL_BREAK");
    }

    #[test]
    fn test_statement_errors() {
        assert_eq!(code("return 1;"), "JS_ILLEGAL_RETURN");
        assert_eq!(code("throw\nx;"), "EXPRESSION_EXPECTED");
        assert_eq!(code("try {}"), "EXPECTED");
        assert_eq!(code("const x;"), "CONST_INIT");
        assert_eq!(code("else {}"), "JS_ILLEGAL_ELSE");
        assert_eq!(code("case 1:"), "JS_ILLEGAL_CASE");
        assert_eq!(code("do {} until (x)"), "JS_WHILE_EXPECTED");
        assert_eq!(code("try {} catch (a, b) {}"), "CATCH_NEW_PARAM");
        assert_eq!(code("try {} catch (a = 1) {}"), "CATCH_ASSIGN");
    }

    #[test]
    fn test_expression_errors() {
        assert_eq!(code("1 = 2"), "JS_INVALID_LHS_ASSIGN");
        assert_eq!(code("++f()"), "JS_INVALID_LHS_PREFIX");
        assert_eq!(code("f()++"), "JS_INVALID_LHS_POFTIX");
        assert_eq!(code("x = 1.foo"), "ID_FOLLOWS_LITERAL");
        assert_eq!(code("({[a, b]: 1})"), "JS_COMMA_IN_COMPUTED_PROP");
        assert_eq!(code("new.foo"), "INVALID_NEW_META_PROPERTY");
        assert_eq!(code("this.#x"), "JS_ILLEGAL_PRIV_IDENT");
        assert_eq!(code("function f(...a, b) {}"), "JS_REST_MUST_END");
        assert_eq!(code("class A { constructor() {} constructor() {} }"), "JS_DUPLICATE_CONSTRUCTORS");
        assert_eq!(code("function f() { import x from 'y'; }"), "JS_ILLEGAL_IMPORT_EXP");
        assert_eq!(code("f(a"), "EXPECTED");
        assert_eq!(code("x = "), "ABRUPT");
    }

    #[test]
    fn test_lexical_errors() {
        assert_eq!(code("'abc"), "UNTERMINATED_STRING_LITERAL");
        assert_eq!(code("x = /abc"), "UNTERMINATED_REGEX_LITERAL");
        assert_eq!(code("`abc"), "UNTERMINATED_TEMPLATE_LITERAL");
        assert_eq!(code("a; /* open"), "COMMENT_UNCLOSED");
    }

    #[test]
    fn test_error_location() {
        let source = "let a = 1;\n  let b = ;";
        let err = parse(source).unwrap_err();
        assert_eq!(err.code(), "EXPRESSION_EXPECTED");
        let loc = err.locate(source);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 5);
    }

    #[test]
    fn test_classes() {
        let program = parse(
            "class A extends B { #x = 1; static y; constructor() { super(); } get z() { return this.#x; } static { init(); } }",
        )
        .unwrap();
        let StmtKind::Class(class) = &program.body[0].kind else { panic!() };
        assert!(class.super_class.is_some());
        assert_eq!(class.body.len(), 5);
    }

    #[test]
    fn test_modules() {
        let program = parse(
            "import a, { b as c } from './x';\nimport * as ns from 'y';\nexport const d = 1;\nexport { d as e };\nexport * from './z';\nexport default a;",
        )
        .unwrap();
        assert_eq!(program.body.len(), 6);
        let StmtKind::Import(import) = &program.body[0].kind else { panic!() };
        assert_eq!(import.source, "./x");
        assert_eq!(import.specifiers.len(), 2);
    }

    #[test]
    fn test_templates_and_regex() {
        let ExprKind::Template(t) = expr("`a${b}c${d}`").kind else { panic!() };
        assert_eq!(t.quasis.len(), 3);
        assert_eq!(t.exprs.len(), 2);
        assert!(matches!(expr("/a+/g.test(s)").kind, ExprKind::Call { .. }));
        assert!(matches!(expr("a / b / c").kind, ExprKind::Binary { op: BinaryOp::Div, .. }));
        assert!(matches!(expr("tag`x`").kind, ExprKind::TaggedTemplate { .. }));
    }

    #[test]
    fn test_jsx() {
        let program = parse_jsx("<div className=\"a\" {...p}>hi {name} <b/></div>;").unwrap();
        let StmtKind::Expr(e) = &program.body[0].kind else { panic!() };
        let ExprKind::JsxElement(el) = &e.kind else { panic!() };
        assert_eq!(el.attributes.len(), 2);
        assert_eq!(el.children.len(), 4);
        assert_eq!(parse_jsx("<a><b></a>").unwrap_err().code(), "JSX_NO_CLOSE");
        assert!(parse_jsx("<>x</>").is_ok());
    }
}
