//! Syntax errors.
//!
//! Every failure is fatal to the current parse. The parser stops at the first
//! error and reports it with the byte offset where it was detected.

use crate::span::{Location, Span};
use thiserror::Error;

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("'{0}' was expected.")]
    Expected(&'static str),
    #[error("Unexpected end of file.")]
    Abrupt,
    #[error("An expression was expected.")]
    ExpressionExpected,
    #[error("Identifier expected.")]
    IdentifierExpected,
    #[error("Variable declaration or statement expected.")]
    DeclarationExpected,
    #[error("Unexpected token '{0}'.")]
    UnexpectedToken(String),
    #[error("Unexpected keyword or identifier.")]
    UnexpectedKeywordOrIdentifier,
    #[error("Unterminated string literal.")]
    UnterminatedString,
    #[error("Unterminated regular expression literal.")]
    UnterminatedRegex,
    #[error("Unterminated template literal.")]
    UnterminatedTemplate,
    #[error("Unclosed comment.")]
    UnterminatedComment,
    #[error("A 'return' statement can only be used within a function body.")]
    IllegalReturn,
    #[error("A 'continue' statement can only be used within an enclosing iteration statement.")]
    IllegalContinue,
    #[error("A 'break' statement can only be used within an enclosing iteration or switch statement.")]
    IllegalBreak,
    #[error("Unexpected 'else' without a matching 'if'.")]
    IllegalElse,
    #[error("A 'case' clause can only be used within a switch block.")]
    IllegalCase,
    #[error("Invalid left-hand side in assignment.")]
    InvalidLhsAssign,
    #[error("Invalid left-hand side expression in prefix operation.")]
    InvalidLhsPrefix,
    #[error("Invalid left-hand side expression in postfix operation.")]
    InvalidLhsPostfix,
    #[error("A class may only have one constructor.")]
    DuplicateConstructors,
    #[error("Private identifiers are only allowed in class bodies.")]
    IllegalPrivateIdentifier,
    #[error("'const' declarations must be initialized.")]
    ConstInit,
    #[error("A catch clause may only declare a single parameter.")]
    CatchNewParam,
    #[error("Catch clause variable cannot have an initializer.")]
    CatchAssign,
    #[error("An identifier or keyword cannot immediately follow a numeric literal.")]
    IdFollowsLiteral,
    #[error("Computed property names cannot contain a comma expression.")]
    CommaInComputedProperty,
    #[error("Import declarations may only appear at the top level of a module.")]
    IllegalImport,
    #[error("'while' expected.")]
    WhileExpected,
    #[error("'{0}' is not a valid meta-property for keyword 'new'.")]
    InvalidNewMetaProperty(String),
    #[error("A rest element must be last in a destructuring pattern.")]
    RestMustEnd,
    #[error("JSX element '{0}' has no corresponding closing tag.")]
    JsxNoClose(String),
}

impl SyntaxErrorKind {
    /// Stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Expected(_) => "EXPECTED",
            Self::Abrupt => "ABRUPT",
            Self::ExpressionExpected => "EXPRESSION_EXPECTED",
            Self::IdentifierExpected => "IDENTIFIER_EXPECTED",
            Self::DeclarationExpected => "VARIABLE_DECLARATION_EXPECTED",
            Self::UnexpectedToken(_) => "JS_UNEXPECTED_TOKEN",
            Self::UnexpectedKeywordOrIdentifier => "JS_UNEXP_KEYWORD_OR_IDENTIFIER",
            Self::UnterminatedString => "UNTERMINATED_STRING_LITERAL",
            Self::UnterminatedRegex => "UNTERMINATED_REGEX_LITERAL",
            Self::UnterminatedTemplate => "UNTERMINATED_TEMPLATE_LITERAL",
            Self::UnterminatedComment => "COMMENT_UNCLOSED",
            Self::IllegalReturn => "JS_ILLEGAL_RETURN",
            Self::IllegalContinue => "JS_ILLEGAL_CONTINUE",
            Self::IllegalBreak => "JS_ILLEGAL_BREAK",
            Self::IllegalElse => "JS_ILLEGAL_ELSE",
            Self::IllegalCase => "JS_ILLEGAL_CASE",
            Self::InvalidLhsAssign => "JS_INVALID_LHS_ASSIGN",
            Self::InvalidLhsPrefix => "JS_INVALID_LHS_PREFIX",
            Self::InvalidLhsPostfix => "JS_INVALID_LHS_POFTIX",
            Self::DuplicateConstructors => "JS_DUPLICATE_CONSTRUCTORS",
            Self::IllegalPrivateIdentifier => "JS_ILLEGAL_PRIV_IDENT",
            Self::ConstInit => "CONST_INIT",
            Self::CatchNewParam => "CATCH_NEW_PARAM",
            Self::CatchAssign => "CATCH_ASSIGN",
            Self::IdFollowsLiteral => "ID_FOLLOWS_LITERAL",
            Self::CommaInComputedProperty => "JS_COMMA_IN_COMPUTED_PROP",
            Self::IllegalImport => "JS_ILLEGAL_IMPORT_EXP",
            Self::WhileExpected => "JS_WHILE_EXPECTED",
            Self::InvalidNewMetaProperty(_) => "INVALID_NEW_META_PROPERTY",
            Self::RestMustEnd => "JS_REST_MUST_END",
            Self::JsxNoClose(_) => "JSX_NO_CLOSE",
        }
    }
}

/// Parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: SyntaxErrorKind,
    /// Where the error was detected.
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create an error at a single offset.
    pub fn at(kind: SyntaxErrorKind, offset: usize) -> Self {
        Self::new(kind, Span::empty(offset as u32))
    }

    /// Byte offset of the error.
    pub fn offset(&self) -> u32 {
        self.span.start
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Line and column of the error within `source`.
    pub fn locate(&self, source: &str) -> Location {
        Location::locate(source, self.span.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_messages() {
        let err = ParseError::at(SyntaxErrorKind::Expected(")"), 4);
        assert_eq!(err.code(), "EXPECTED");
        assert_eq!(err.to_string(), "')' was expected.");
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_locate() {
        let err = ParseError::at(SyntaxErrorKind::Abrupt, 5);
        let loc = err.locate("let\n  x");
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 0);
    }
}
