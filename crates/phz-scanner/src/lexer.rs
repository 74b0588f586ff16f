//! PHP lexer.
//!
//! Byte-indexed scanning over shared UTF-8 source. The lexer starts in
//! inline-HTML mode and flips to script mode at `<?php`/`<?=`/`<?` tags.
//! Trivia (whitespace and comments) is not emitted as tokens; it attaches to
//! the following token via the `full_start`/`start` split.
//!
//! Interpolated strings use two shapes:
//! - simple interpolation (`"a $b c"`) lexes as `TemplateStringStart`,
//!   `VariableName`, then `TemplateStringMiddle`/`TemplateStringEnd` tokens
//!   produced on demand through [`LexerState::rescan_template`];
//! - complex interpolation (`${...}` / `{$...}`), heredocs, and backticks
//!   lex as a quote-delimited stream driven by a string-mode flag that
//!   suspends while the parser walks an embedded `{ ... }` expression.

use std::sync::Arc;

use memchr::memchr;

use crate::token::Token;
use crate::token_kind::{keyword_kind, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LexerMode {
    Html,
    Script,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StringKind {
    DoubleQuoted,
    Backtick,
    Heredoc,
}

/// Active quote-delimited string scan. `suspended_braces > 0` while the
/// embedded-expression braces of `${...}` / `{$...}` are open; script tokens
/// are produced until the matching close brace resumes part scanning.
#[derive(Clone, Copy, Debug)]
struct StringState {
    kind: StringKind,
    label_start: u32,
    label_len: u32,
    suspended_braces: u32,
}

/// Opaque lexer cursor. Cheap to take and restore; lookahead depends on this
/// being O(1).
#[derive(Clone, Copy)]
pub struct LexerSnapshot {
    pos: usize,
    mode: LexerMode,
    string_state: Option<StringState>,
}

pub struct LexerState {
    source: Arc<str>,
    pos: usize,
    end: usize,
    mode: LexerMode,
    string_state: Option<StringState>,
}

#[inline]
fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

#[inline]
fn is_name_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

impl LexerState {
    pub fn new(source: &str) -> LexerState {
        let source: Arc<str> = Arc::from(source);
        let end = source.len();
        LexerState {
            source,
            pos: 0,
            end,
            mode: LexerMode::Html,
            string_state: None,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source
    }

    pub fn source_arc(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    /// Current byte position (end of the last token scanned).
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// End position of the input; lookahead uses it to detect out-of-bounds
    /// probes.
    pub fn end_pos(&self) -> usize {
        self.end
    }

    pub fn save_state(&self) -> LexerSnapshot {
        LexerSnapshot {
            pos: self.pos,
            mode: self.mode,
            string_state: self.string_state,
        }
    }

    pub fn restore_state(&mut self, snapshot: LexerSnapshot) {
        self.pos = snapshot.pos;
        self.mode = snapshot.mode;
        self.string_state = snapshot.string_state;
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    #[inline]
    fn byte_at(&self, index: usize) -> u8 {
        if index < self.end {
            self.bytes()[index]
        } else {
            0
        }
    }

    #[inline]
    fn matches_at(&self, index: usize, text: &str) -> bool {
        self.source[index.min(self.end)..]
            .as_bytes()
            .starts_with(text.as_bytes())
    }

    fn matches_at_ignore_case(&self, index: usize, text: &str) -> bool {
        let end = index + text.len();
        if end > self.end {
            return false;
        }
        self.source[index..end].eq_ignore_ascii_case(text)
    }

    fn token(&self, kind: TokenKind, full_start: usize, start: usize) -> Token {
        Token::new(
            kind,
            full_start as u32,
            start as u32,
            (self.pos - start) as u32,
        )
    }

    /// Scan the next token. At exhaustion, repeatedly returns an end-of-file
    /// token whose leading trivia covers any trailing whitespace.
    pub fn scan(&mut self) -> Token {
        let full_start = self.pos;
        match self.mode {
            LexerMode::Html => self.scan_inline_html(full_start),
            LexerMode::Script => {
                if let Some(ss) = self.string_state {
                    if ss.suspended_braces == 0 {
                        return self.scan_string_part(full_start, ss);
                    }
                }
                self.scan_script(full_start)
            }
        }
    }

    // =========================================================================
    // Inline HTML
    // =========================================================================

    fn scan_inline_html(&mut self, full_start: usize) -> Token {
        if self.pos >= self.end {
            return self.token(TokenKind::EndOfFile, full_start, self.pos);
        }
        if self.byte_at(self.pos) == b'<' && self.byte_at(self.pos + 1) == b'?' {
            return self.scan_script_section_start(full_start);
        }
        let start = self.pos;
        let mut search = self.pos + 1;
        loop {
            match memchr(b'<', &self.bytes()[search..self.end]) {
                Some(offset) => {
                    let lt = search + offset;
                    if self.byte_at(lt + 1) == b'?' {
                        self.pos = lt;
                        break;
                    }
                    search = lt + 1;
                }
                None => {
                    self.pos = self.end;
                    break;
                }
            }
        }
        self.token(TokenKind::InlineHtml, full_start, start)
    }

    fn scan_script_section_start(&mut self, full_start: usize) -> Token {
        let start = self.pos;
        if self.matches_at_ignore_case(self.pos, "<?php") {
            self.pos += 5;
        } else if self.matches_at(self.pos, "<?=") {
            self.pos += 3;
        } else {
            self.pos += 2;
        }
        self.mode = LexerMode::Script;
        self.token(TokenKind::ScriptSectionStartTag, full_start, start)
    }

    // =========================================================================
    // Script mode
    // =========================================================================

    fn scan_script(&mut self, full_start: usize) -> Token {
        self.skip_trivia();
        let start = self.pos;
        if self.pos >= self.end {
            return self.token(TokenKind::EndOfFile, full_start, start);
        }
        let token = self.scan_script_token(full_start, start);
        // Brace bookkeeping for embedded string expressions: the close brace
        // that balances `${` / `{$` hands scanning back to the string.
        if let Some(ss) = &mut self.string_state {
            if ss.suspended_braces > 0 {
                match token.kind {
                    TokenKind::OpenBrace => ss.suspended_braces += 1,
                    TokenKind::CloseBrace => ss.suspended_braces -= 1,
                    _ => {}
                }
            }
        }
        token
    }

    fn skip_trivia(&mut self) {
        loop {
            let b = self.byte_at(self.pos);
            if self.pos >= self.end {
                return;
            }
            if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' {
                self.pos += 1;
            } else if b == b'#' || (b == b'/' && self.byte_at(self.pos + 1) == b'/') {
                self.skip_line_comment();
            } else if b == b'/' && self.byte_at(self.pos + 1) == b'*' {
                self.skip_block_comment();
            } else {
                return;
            }
        }
    }

    /// Line comments end at a newline or just before a `?>` tag.
    fn skip_line_comment(&mut self) {
        while self.pos < self.end {
            let b = self.byte_at(self.pos);
            if b == b'\n' {
                return;
            }
            if b == b'?' && self.byte_at(self.pos + 1) == b'>' {
                return;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.end {
            if self.byte_at(self.pos) == b'*' && self.byte_at(self.pos + 1) == b'/' {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn scan_script_token(&mut self, full_start: usize, start: usize) -> Token {
        let b = self.byte_at(self.pos);
        match b {
            b'?' if self.byte_at(self.pos + 1) == b'>' => {
                self.pos += 2;
                self.mode = LexerMode::Html;
                self.token(TokenKind::ScriptSectionEndTag, full_start, start)
            }
            _ if is_name_start(b) => self.scan_name(full_start, start),
            b'$' => {
                self.pos += 1;
                if is_name_start(self.byte_at(self.pos)) {
                    self.consume_name_chars();
                    self.token(TokenKind::VariableName, full_start, start)
                } else {
                    self.token(TokenKind::Dollar, full_start, start)
                }
            }
            b'0'..=b'9' => self.scan_number(full_start, start),
            b'.' if self.byte_at(self.pos + 1).is_ascii_digit() => {
                self.scan_number(full_start, start)
            }
            b'\'' => self.scan_single_quoted(full_start, start),
            b'"' => self.scan_double_quoted(full_start, start),
            b'`' => {
                self.pos += 1;
                self.string_state = Some(StringState {
                    kind: StringKind::Backtick,
                    label_start: 0,
                    label_len: 0,
                    suspended_braces: 0,
                });
                self.token(TokenKind::Backtick, full_start, start)
            }
            b'<' if self.matches_at(self.pos, "<<<") => self.scan_heredoc_start(full_start, start),
            _ => self.scan_operator(full_start, start),
        }
    }

    fn consume_name_chars(&mut self) {
        while self.pos < self.end && is_name_part(self.byte_at(self.pos)) {
            self.pos += 1;
        }
    }

    fn scan_name(&mut self, full_start: usize, start: usize) -> Token {
        self.consume_name_chars();
        let text = &self.source[start..self.pos];
        let kind = keyword_kind(text).unwrap_or(TokenKind::Name);
        self.token(kind, full_start, start)
    }

    fn scan_number(&mut self, full_start: usize, start: usize) -> Token {
        let mut kind = TokenKind::IntegerLiteral;
        if self.byte_at(self.pos) == b'0' && matches!(self.byte_at(self.pos + 1), b'x' | b'X') {
            self.pos += 2;
            while self.pos < self.end
                && (self.byte_at(self.pos).is_ascii_hexdigit() || self.byte_at(self.pos) == b'_')
            {
                self.pos += 1;
            }
            return self.token(kind, full_start, start);
        }
        if self.byte_at(self.pos) == b'0' && matches!(self.byte_at(self.pos + 1), b'b' | b'B') {
            self.pos += 2;
            while self.pos < self.end && matches!(self.byte_at(self.pos), b'0' | b'1' | b'_') {
                self.pos += 1;
            }
            return self.token(kind, full_start, start);
        }
        let mut consume_digits = |lexer: &mut Self| {
            while lexer.pos < lexer.end
                && (lexer.byte_at(lexer.pos).is_ascii_digit() || lexer.byte_at(lexer.pos) == b'_')
            {
                lexer.pos += 1;
            }
        };
        consume_digits(self);
        if self.byte_at(self.pos) == b'.' && self.byte_at(self.pos + 1).is_ascii_digit() {
            kind = TokenKind::FloatingLiteral;
            self.pos += 1;
            consume_digits(self);
        }
        if matches!(self.byte_at(self.pos), b'e' | b'E') {
            let mut probe = self.pos + 1;
            if matches!(self.byte_at(probe), b'+' | b'-') {
                probe += 1;
            }
            if self.byte_at(probe).is_ascii_digit() {
                kind = TokenKind::FloatingLiteral;
                self.pos = probe;
                consume_digits(self);
            }
        }
        self.token(kind, full_start, start)
    }

    fn scan_single_quoted(&mut self, full_start: usize, start: usize) -> Token {
        self.pos += 1;
        while self.pos < self.end {
            match self.byte_at(self.pos) {
                b'\\' => self.pos = (self.pos + 2).min(self.end),
                b'\'' => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.token(TokenKind::StringLiteral, full_start, start)
    }

    /// Classify a double-quoted string before committing to a token shape:
    /// no interpolation → one literal token; only simple `$name` references →
    /// the template stream; any `${`/`{$` → the quote-delimited stream.
    fn scan_double_quoted(&mut self, full_start: usize, start: usize) -> Token {
        let mut probe = self.pos + 1;
        let mut first_simple: Option<usize> = None;
        let mut has_complex = false;
        while probe < self.end {
            match self.byte_at(probe) {
                b'\\' => probe += 2,
                b'"' => break,
                b'$' => {
                    if self.byte_at(probe + 1) == b'{' {
                        has_complex = true;
                        probe += 2;
                    } else if is_name_start(self.byte_at(probe + 1)) {
                        first_simple.get_or_insert(probe);
                        probe += 1;
                    } else {
                        probe += 1;
                    }
                }
                b'{' if self.byte_at(probe + 1) == b'$' => {
                    has_complex = true;
                    probe += 2;
                }
                _ => probe += 1,
            }
        }
        if has_complex {
            self.pos += 1;
            self.string_state = Some(StringState {
                kind: StringKind::DoubleQuoted,
                label_start: 0,
                label_len: 0,
                suspended_braces: 0,
            });
            return self.token(TokenKind::DoubleQuote, full_start, start);
        }
        if let Some(dollar) = first_simple {
            self.pos = dollar;
            return self.token(TokenKind::TemplateStringStart, full_start, start);
        }
        self.pos = (probe + 1).min(self.end);
        self.token(TokenKind::StringLiteral, full_start, start)
    }

    /// Re-interpret the source following `after` under template mode,
    /// yielding `TemplateStringMiddle` (more interpolation follows) or
    /// `TemplateStringEnd` (runs through the closing quote, or to end of
    /// input when unterminated).
    pub fn rescan_template(&mut self, after: &Token) -> Token {
        let start = after.end() as usize;
        self.pos = start;
        while self.pos < self.end {
            match self.byte_at(self.pos) {
                b'\\' => self.pos = (self.pos + 2).min(self.end),
                b'"' => {
                    self.pos += 1;
                    return self.token(TokenKind::TemplateStringEnd, start, start);
                }
                b'$' if is_name_start(self.byte_at(self.pos + 1)) => {
                    return self.token(TokenKind::TemplateStringMiddle, start, start);
                }
                _ => self.pos += 1,
            }
        }
        self.token(TokenKind::TemplateStringEnd, start, start)
    }

    fn scan_heredoc_start(&mut self, full_start: usize, start: usize) -> Token {
        // <<< [ws] label | "label" | 'label' , then a newline.
        let mut probe = self.pos + 3;
        while matches!(self.byte_at(probe), b' ' | b'\t') {
            probe += 1;
        }
        let quote = self.byte_at(probe);
        let nowdoc = quote == b'\'';
        if quote == b'\'' || quote == b'"' {
            probe += 1;
        }
        let label_start = probe;
        while probe < self.end && is_name_part(self.byte_at(probe)) {
            probe += 1;
        }
        let label_len = probe - label_start;
        if label_len == 0 {
            // Not a heredoc opener after all; lex `<<` / `<<=` instead.
            return self.scan_operator(full_start, start);
        }
        if quote == b'\'' || quote == b'"' {
            if self.byte_at(probe) != quote {
                return self.scan_operator(full_start, start);
            }
            probe += 1;
        }
        if self.byte_at(probe) == b'\r' {
            probe += 1;
        }
        if self.byte_at(probe) != b'\n' {
            return self.scan_operator(full_start, start);
        }
        probe += 1;
        self.pos = probe;
        if nowdoc {
            self.skip_to_heredoc_label(label_start, label_len);
            return self.token(TokenKind::StringLiteral, full_start, start);
        }
        self.string_state = Some(StringState {
            kind: StringKind::Heredoc,
            label_start: label_start as u32,
            label_len: label_len as u32,
            suspended_braces: 0,
        });
        self.token(TokenKind::HeredocStart, full_start, start)
    }

    fn heredoc_label_at(&self, index: usize, label_start: usize, label_len: usize) -> bool {
        let at_line_start = index == 0 || self.byte_at(index - 1) == b'\n';
        at_line_start
            && self.matches_at(index, &self.source[label_start..label_start + label_len])
            && !is_name_part(self.byte_at(index + label_len))
    }

    /// Advance past a nowdoc body and its closing label.
    fn skip_to_heredoc_label(&mut self, label_start: usize, label_len: usize) {
        while self.pos < self.end {
            if self.heredoc_label_at(self.pos, label_start, label_len) {
                self.pos += label_len;
                return;
            }
            match memchr(b'\n', &self.bytes()[self.pos..self.end]) {
                Some(offset) => self.pos += offset + 1,
                None => self.pos = self.end,
            }
        }
    }

    // =========================================================================
    // Quote-delimited string parts
    // =========================================================================

    fn scan_string_part(&mut self, full_start: usize, ss: StringState) -> Token {
        let start = self.pos;
        if self.pos >= self.end {
            return self.token(TokenKind::EndOfFile, full_start, start);
        }
        match ss.kind {
            StringKind::DoubleQuoted if self.byte_at(self.pos) == b'"' => {
                self.pos += 1;
                self.string_state = None;
                return self.token(TokenKind::DoubleQuote, full_start, start);
            }
            StringKind::Backtick if self.byte_at(self.pos) == b'`' => {
                self.pos += 1;
                self.string_state = None;
                return self.token(TokenKind::Backtick, full_start, start);
            }
            StringKind::Heredoc
                if self.heredoc_label_at(
                    self.pos,
                    ss.label_start as usize,
                    ss.label_len as usize,
                ) =>
            {
                self.pos += ss.label_len as usize;
                self.string_state = None;
                return self.token(TokenKind::HeredocEnd, full_start, start);
            }
            _ => {}
        }
        if self.matches_at(self.pos, "${") {
            self.pos += 2;
            self.suspend_string(1);
            return self.token(TokenKind::DollarOpenBrace, full_start, start);
        }
        if self.matches_at(self.pos, "{$") {
            self.pos += 1;
            self.suspend_string(1);
            return self.token(TokenKind::OpenBraceDollar, full_start, start);
        }
        if self.byte_at(self.pos) == b'$' && is_name_start(self.byte_at(self.pos + 1)) {
            self.pos += 1;
            self.consume_name_chars();
            return self.token(TokenKind::VariableName, full_start, start);
        }
        self.consume_encapsed_text(&ss);
        self.token(TokenKind::EncapsedAndWhitespace, full_start, start)
    }

    fn suspend_string(&mut self, braces: u32) {
        if let Some(ss) = &mut self.string_state {
            ss.suspended_braces = braces;
        }
    }

    fn consume_encapsed_text(&mut self, ss: &StringState) {
        // Consume at least one byte so a lone `$`/`{` cannot stall the scan.
        self.pos += 1;
        while self.pos < self.end {
            let b = self.byte_at(self.pos);
            match ss.kind {
                StringKind::DoubleQuoted if b == b'"' => return,
                StringKind::Backtick if b == b'`' => return,
                StringKind::Heredoc
                    if self.heredoc_label_at(
                        self.pos,
                        ss.label_start as usize,
                        ss.label_len as usize,
                    ) =>
                {
                    return;
                }
                _ => {}
            }
            match b {
                b'\\' => {
                    self.pos = (self.pos + 2).min(self.end);
                }
                b'$' if self.byte_at(self.pos + 1) == b'{'
                    || is_name_start(self.byte_at(self.pos + 1)) =>
                {
                    return;
                }
                b'{' if self.byte_at(self.pos + 1) == b'$' => return,
                _ => self.pos += 1,
            }
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn scan_operator(&mut self, full_start: usize, start: usize) -> Token {
        use TokenKind::*;
        let rest = &self.source[self.pos..self.end];
        // Longest match first within each leading-byte family.
        static THREE: &[(&str, TokenKind)] = &[
            ("===", EqualsEqualsEquals),
            ("!==", ExclamationEqualsEquals),
            ("<=>", LessThanEqualsGreaterThan),
            ("**=", AsteriskAsteriskEquals),
            ("<<=", LessThanLessThanEquals),
            (">>=", GreaterThanGreaterThanEquals),
            ("...", DotDotDot),
        ];
        static TWO: &[(&str, TokenKind)] = &[
            ("==", EqualsEquals),
            ("=>", DoubleArrow),
            ("!=", ExclamationEquals),
            ("<>", LessThanGreaterThan),
            ("<=", LessThanEquals),
            (">=", GreaterThanEquals),
            ("<<", LessThanLessThan),
            (">>", GreaterThanGreaterThan),
            ("**", AsteriskAsterisk),
            ("*=", AsteriskEquals),
            ("/=", SlashEquals),
            ("%=", PercentEquals),
            ("+=", PlusEquals),
            ("-=", MinusEquals),
            (".=", DotEquals),
            ("&=", AmpersandEquals),
            ("|=", BarEquals),
            ("^=", CaretEquals),
            ("++", PlusPlus),
            ("--", MinusMinus),
            ("&&", AmpersandAmpersand),
            ("||", BarBar),
            ("??", QuestionQuestion),
            ("::", ColonColon),
            ("->", Arrow),
        ];
        static ONE: &[(&str, TokenKind)] = &[
            ("{", OpenBrace),
            ("}", CloseBrace),
            ("(", OpenParen),
            (")", CloseParen),
            ("[", OpenBracket),
            ("]", CloseBracket),
            (",", Comma),
            (";", Semicolon),
            (":", Colon),
            ("?", Question),
            ("\\", Backslash),
            (".", Dot),
            ("+", Plus),
            ("-", Minus),
            ("*", Asterisk),
            ("/", Slash),
            ("%", Percent),
            ("=", Equals),
            ("<", LessThan),
            (">", GreaterThan),
            ("&", Ampersand),
            ("|", Bar),
            ("^", Caret),
            ("!", Exclamation),
            ("~", Tilde),
            ("@", At),
        ];
        for &(text, kind) in THREE.iter().chain(TWO).chain(ONE) {
            if rest.starts_with(text) {
                self.pos += text.len();
                return self.token(kind, full_start, start);
            }
        }
        // Unrecognized byte: still a token, so the tree keeps covering it.
        let char_len = self.source[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += char_len;
        self.token(TokenKind::Unknown, full_start, start)
    }
}
