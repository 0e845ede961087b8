//! Per-call scanner state
//!
//! A `ScanState` is built fresh for every expression and dropped when the scan
//! returns; nothing in here outlives one call.

/// The binary connectors that join sub-expressions.
pub const LINKAGE_OPERATORS: [char; 10] = ['+', '-', '*', '/', '#', '=', '<', '>', '&', '|'];

pub fn is_linkage_operator(ch: char) -> bool {
    LINKAGE_OPERATORS.contains(&ch)
}

fn linkage_index(ch: char) -> Option<usize> {
    LINKAGE_OPERATORS.iter().position(|&op| op == ch)
}

/// Which part of the expression the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Between references
    #[default]
    Outside,
    /// After `{`, reading a host name or a built-in macro name
    InHost,
    /// After `{$`
    InUserMacro,
    /// After `host:`, reading the item key and function name
    InItem,
    /// Inside an item key `[...]` parameter list
    InItemParam,
    /// Function parameters closed, only `}` may follow
    InFunction,
    /// Inside a function `(...)` parameter list
    InFunctionParam,
}

/// Bracket, quote and operator counters for the whole expression.
#[derive(Debug, Clone, Default)]
pub struct SymbolCounters {
    pub open_parens: usize,
    pub close_parens: usize,
    pub open_braces: usize,
    pub close_braces: usize,
    pub quotes: usize,
    pub linkage: [usize; 10],
}

impl SymbolCounters {
    pub fn record_linkage(&mut self, ch: char) {
        if let Some(index) = linkage_index(ch) {
            self.linkage[index] += 1;
        }
    }

    pub fn linkage_total(&self) -> usize {
        self.linkage.iter().sum()
    }
}

/// Memory of recently seen symbols.
#[derive(Debug, Clone, Default)]
pub struct SymbolHistory {
    pub last: Option<char>,
    pub before_last: Option<char>,
    pub last_non_space: Option<char>,
    /// Consecutive linkage operators seen outside references
    pub operator_run: usize,
}

impl SymbolHistory {
    pub fn record(&mut self, ch: char) {
        self.before_last = self.last;
        self.last = Some(ch);
        if !ch.is_whitespace() {
            self.last_non_space = Some(ch);
            if !is_linkage_operator(ch) {
                self.operator_run = 0;
            }
        }
    }

    pub fn follows_operator(&self) -> bool {
        self.last_non_space.is_some_and(is_linkage_operator)
    }
}

/// Splits a bracketed parameter list into slots.
#[derive(Debug, Clone, Default)]
pub struct ParamCursor {
    pub params: Vec<String>,
    pub current: String,
    /// Bracket depth; 1 is the top-level list
    pub depth: usize,
    /// Only whitespace seen since the last delimiter
    pub at_start: bool,
    /// A quoted string just closed; only whitespace or a delimiter may follow
    pub after_quote: bool,
    /// Byte offset of the bracket that opened the current list
    pub opened_at: usize,
}

impl ParamCursor {
    /// Enter a (new) top-level list, keeping parameters of earlier lists
    pub fn open(&mut self, offset: usize) {
        self.opened_at = offset;
        self.depth = 1;
        self.at_start = true;
        self.after_quote = false;
        self.current.clear();
    }

    /// Close the current slot
    pub fn finish_slot(&mut self) {
        self.params.push(std::mem::take(&mut self.current));
        self.at_start = true;
        self.after_quote = false;
    }

    pub fn push(&mut self, ch: char) {
        self.current.push(ch);
        if !ch.is_whitespace() {
            self.at_start = false;
        }
    }
}

/// Text collected for the reference currently being scanned.
#[derive(Debug, Clone, Default)]
pub struct ReferenceBuffer {
    /// Byte offset of the opening `{`
    pub start: usize,
    pub host: String,
    pub item: String,
    pub function_name: String,
    pub item_params: ParamCursor,
    pub function_params: ParamCursor,
    pub macro_depth: usize,
}

impl ReferenceBuffer {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    pub fn param_count(&self) -> usize {
        self.item_params.params.len() + self.function_params.params.len()
    }
}

/// Mutable scanner context for one expression.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    pub mode: ScanMode,
    pub in_quotes: bool,
    /// Previous character inside quotes was an unescaped backslash
    pub escaped: bool,
    pub counters: SymbolCounters,
    pub history: SymbolHistory,
    pub current: ReferenceBuffer,
    /// Offsets of `(` outside references not yet closed
    pub open_paren_offsets: Vec<usize>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one character to the quote tracker. Returns false once the quote closes.
    pub fn quoted_char(&mut self, ch: char) -> bool {
        if self.escaped {
            self.escaped = false;
        } else if ch == '\\' {
            self.escaped = true;
        } else if ch == '"' {
            self.in_quotes = false;
            self.counters.quotes += 1;
            return false;
        }
        true
    }

    pub fn open_quote(&mut self) {
        self.in_quotes = true;
        self.escaped = false;
        self.counters.quotes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_tracks_operator_runs() {
        let mut history = SymbolHistory::default();
        history.record('1');
        assert!(!history.follows_operator());
        history.record('+');
        history.record(' ');
        assert!(history.follows_operator());
        assert_eq!(history.last, Some(' '));
        assert_eq!(history.before_last, Some('+'));
        history.operator_run = 2;
        history.record('5');
        assert_eq!(history.operator_run, 0);
    }

    #[test]
    fn test_param_cursor_slots() {
        let mut cursor = ParamCursor::default();
        cursor.open(7);
        assert_eq!(cursor.opened_at, 7);
        cursor.push(' ');
        assert!(cursor.at_start);
        cursor.push('a');
        cursor.finish_slot();
        cursor.push('b');
        cursor.finish_slot();
        assert_eq!(cursor.params, vec![" a", "b"]);
        cursor.open(12);
        assert_eq!(cursor.opened_at, 12);
        cursor.finish_slot();
        assert_eq!(cursor.params.len(), 3);
    }

    #[test]
    fn test_quote_tracking_honours_escapes() {
        let mut state = ScanState::new();
        state.open_quote();
        assert!(state.quoted_char('\\'));
        assert!(state.quoted_char('"'));
        assert!(state.in_quotes);
        assert!(!state.quoted_char('"'));
        assert!(!state.in_quotes);
        assert_eq!(state.counters.quotes, 2);
    }

    #[test]
    fn test_linkage_counters() {
        let mut counters = SymbolCounters::default();
        for ch in "+-*/#=<>&|-x".chars() {
            counters.record_linkage(ch);
        }
        assert_eq!(counters.linkage_total(), 11);
        assert_eq!(counters.linkage[1], 2);
    }
}
