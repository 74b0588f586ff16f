//! TokenKind enum — the closed set of lexical categories produced by the
//! lexer, plus the pseudo-kinds the parser synthesizes during recovery.
//!
//! Keywords are matched case-insensitively; reserved words (`true`, `int`,
//! ...) carry their own kinds so the parser can classify them without text
//! comparisons.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Lexical category of a token.
///
/// Grouped: control tokens, script-section markers, names, literals,
/// string-interpolation parts, punctuation/operators, keywords, reserved
/// words, and the `Expression` pseudo-kind used for missing expressions.
/// Keyword and reserved-word classification helpers rely on the groups
/// staying contiguous.
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Hash, Serialize)]
pub enum TokenKind {
    Unknown = 0,
    EndOfFile,

    // Script-section markers
    InlineHtml,
    ScriptSectionStartTag,
    ScriptSectionEndTag,

    // Names
    Name,
    VariableName,

    // Literals
    IntegerLiteral,
    FloatingLiteral,
    StringLiteral,

    // Interpolated-string parts
    TemplateStringStart,
    TemplateStringMiddle,
    TemplateStringEnd,
    EncapsedAndWhitespace,
    DoubleQuote,
    Backtick,
    HeredocStart,
    HeredocEnd,
    DollarOpenBrace,
    OpenBraceDollar,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Arrow,
    DoubleArrow,
    Question,
    QuestionQuestion,
    Backslash,
    Dollar,
    Dot,
    DotEquals,
    DotDotDot,

    // Operators
    Plus,
    PlusEquals,
    PlusPlus,
    Minus,
    MinusEquals,
    MinusMinus,
    Asterisk,
    AsteriskEquals,
    AsteriskAsterisk,
    AsteriskAsteriskEquals,
    Slash,
    SlashEquals,
    Percent,
    PercentEquals,
    Equals,
    EqualsEquals,
    EqualsEqualsEquals,
    ExclamationEquals,
    ExclamationEqualsEquals,
    LessThanGreaterThan,
    LessThan,
    LessThanEquals,
    LessThanEqualsGreaterThan,
    LessThanLessThan,
    LessThanLessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    GreaterThanGreaterThan,
    GreaterThanGreaterThanEquals,
    Ampersand,
    AmpersandEquals,
    AmpersandAmpersand,
    Bar,
    BarEquals,
    BarBar,
    Caret,
    CaretEquals,
    Exclamation,
    Tilde,
    At,

    // Keywords (contiguous: AbstractKeyword ..= YieldKeyword)
    AbstractKeyword,
    AndKeyword,
    ArrayKeyword,
    AsKeyword,
    BreakKeyword,
    CallableKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    CloneKeyword,
    ConstKeyword,
    ContinueKeyword,
    DeclareKeyword,
    DefaultKeyword,
    DieKeyword,
    DoKeyword,
    EchoKeyword,
    ElseKeyword,
    ElseIfKeyword,
    EmptyKeyword,
    EndDeclareKeyword,
    EndForKeyword,
    EndForEachKeyword,
    EndIfKeyword,
    EndSwitchKeyword,
    EndWhileKeyword,
    EvalKeyword,
    ExitKeyword,
    ExtendsKeyword,
    FinalKeyword,
    FinallyKeyword,
    ForKeyword,
    ForEachKeyword,
    FunctionKeyword,
    GlobalKeyword,
    GotoKeyword,
    IfKeyword,
    ImplementsKeyword,
    IncludeKeyword,
    IncludeOnceKeyword,
    InstanceOfKeyword,
    InsteadOfKeyword,
    InterfaceKeyword,
    IsSetKeyword,
    ListKeyword,
    NamespaceKeyword,
    NewKeyword,
    OrKeyword,
    PrintKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    RequireKeyword,
    RequireOnceKeyword,
    ReturnKeyword,
    StaticKeyword,
    SwitchKeyword,
    ThrowKeyword,
    TraitKeyword,
    TryKeyword,
    UnsetKeyword,
    UseKeyword,
    VarKeyword,
    WhileKeyword,
    XorKeyword,
    YieldKeyword,

    // Reserved words (contiguous: BoolReservedWord ..= VoidReservedWord)
    BoolReservedWord,
    FalseReservedWord,
    FloatReservedWord,
    IntReservedWord,
    IterableReservedWord,
    NullReservedWord,
    ObjectReservedWord,
    StringReservedWord,
    TrueReservedWord,
    VoidReservedWord,

    // Pseudo-kind carried by missing tokens standing in for an expression
    Expression,
}

/// Check if a token kind is a keyword.
#[inline]
pub fn token_is_keyword(kind: TokenKind) -> bool {
    kind as u16 >= TokenKind::AbstractKeyword as u16
        && kind as u16 <= TokenKind::YieldKeyword as u16
}

/// Check if a token kind is a reserved word (`true`, `null`, scalar type
/// names, ...).
#[inline]
pub fn token_is_reserved_word(kind: TokenKind) -> bool {
    kind as u16 >= TokenKind::BoolReservedWord as u16
        && kind as u16 <= TokenKind::VoidReservedWord as u16
}

/// Check if a token kind may appear where a name is expected once coerced
/// (member names, qualified-name parts).
#[inline]
pub fn token_is_keyword_or_reserved_word(kind: TokenKind) -> bool {
    token_is_keyword(kind) || token_is_reserved_word(kind)
}

static KEYWORDS: Lazy<FxHashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    let entries: &[(&'static str, TokenKind)] = &[
        ("abstract", AbstractKeyword),
        ("and", AndKeyword),
        ("array", ArrayKeyword),
        ("as", AsKeyword),
        ("break", BreakKeyword),
        ("callable", CallableKeyword),
        ("case", CaseKeyword),
        ("catch", CatchKeyword),
        ("class", ClassKeyword),
        ("clone", CloneKeyword),
        ("const", ConstKeyword),
        ("continue", ContinueKeyword),
        ("declare", DeclareKeyword),
        ("default", DefaultKeyword),
        ("die", DieKeyword),
        ("do", DoKeyword),
        ("echo", EchoKeyword),
        ("else", ElseKeyword),
        ("elseif", ElseIfKeyword),
        ("empty", EmptyKeyword),
        ("enddeclare", EndDeclareKeyword),
        ("endfor", EndForKeyword),
        ("endforeach", EndForEachKeyword),
        ("endif", EndIfKeyword),
        ("endswitch", EndSwitchKeyword),
        ("endwhile", EndWhileKeyword),
        ("eval", EvalKeyword),
        ("exit", ExitKeyword),
        ("extends", ExtendsKeyword),
        ("final", FinalKeyword),
        ("finally", FinallyKeyword),
        ("for", ForKeyword),
        ("foreach", ForEachKeyword),
        ("function", FunctionKeyword),
        ("global", GlobalKeyword),
        ("goto", GotoKeyword),
        ("if", IfKeyword),
        ("implements", ImplementsKeyword),
        ("include", IncludeKeyword),
        ("include_once", IncludeOnceKeyword),
        ("instanceof", InstanceOfKeyword),
        ("insteadof", InsteadOfKeyword),
        ("interface", InterfaceKeyword),
        ("isset", IsSetKeyword),
        ("list", ListKeyword),
        ("namespace", NamespaceKeyword),
        ("new", NewKeyword),
        ("or", OrKeyword),
        ("print", PrintKeyword),
        ("private", PrivateKeyword),
        ("protected", ProtectedKeyword),
        ("public", PublicKeyword),
        ("require", RequireKeyword),
        ("require_once", RequireOnceKeyword),
        ("return", ReturnKeyword),
        ("static", StaticKeyword),
        ("switch", SwitchKeyword),
        ("throw", ThrowKeyword),
        ("trait", TraitKeyword),
        ("try", TryKeyword),
        ("unset", UnsetKeyword),
        ("use", UseKeyword),
        ("var", VarKeyword),
        ("while", WhileKeyword),
        ("xor", XorKeyword),
        ("yield", YieldKeyword),
        // Reserved words share the table; they lex to their own kinds.
        ("bool", BoolReservedWord),
        ("false", FalseReservedWord),
        ("float", FloatReservedWord),
        ("int", IntReservedWord),
        ("iterable", IterableReservedWord),
        ("null", NullReservedWord),
        ("object", ObjectReservedWord),
        ("string", StringReservedWord),
        ("true", TrueReservedWord),
        ("void", VoidReservedWord),
    ];
    entries.iter().copied().collect()
});

/// Look up the keyword or reserved-word kind for a name, case-insensitively.
/// Returns `None` for ordinary names.
pub fn keyword_kind(text: &str) -> Option<TokenKind> {
    // Fast path: most source is already lowercase.
    if let Some(&kind) = KEYWORDS.get(text) {
        return Some(kind);
    }
    if text.bytes().any(|b| b.is_ascii_uppercase()) {
        let lowered = text.to_ascii_lowercase();
        return KEYWORDS.get(lowered.as_str()).copied();
    }
    None
}
