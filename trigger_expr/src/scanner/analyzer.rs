use super::error::ScanError;
use super::params::unquote_param;
use super::state::{is_linkage_operator, ReferenceBuffer, ScanMode, ScanState, LINKAGE_OPERATORS};
use super::types::{ParsedReference, ReferenceKind};
use crate::config::compile_time::scanner::*;
use crate::config::runtime::ScannerPreferences;
use crate::grammar::user_macro::split_user_macro;
use crate::logging::codes;
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters collected while scanning one expression
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanMetrics {
    pub characters_scanned: usize,
    pub host_item_function_refs: usize,
    pub builtin_macro_refs: usize,
    pub user_macro_refs: usize,
    pub open_parens: usize,
    pub close_parens: usize,
    pub open_braces: usize,
    pub close_braces: usize,
    pub quotes: usize,
    pub linkage_operators: usize,

    // Only filled when operator tracking is enabled
    pub operator_usage: BTreeMap<String, usize>,
}

impl ScanMetrics {
    pub fn total_references(&self) -> usize {
        self.host_item_function_refs + self.builtin_macro_refs + self.user_macro_refs
    }

    fn record_reference(&mut self, reference: &ParsedReference) {
        match reference.kind {
            ReferenceKind::HostItemFunction { .. } => self.host_item_function_refs += 1,
            ReferenceKind::BuiltinMacro { .. } => self.builtin_macro_refs += 1,
            ReferenceKind::UserMacro { .. } => self.user_macro_refs += 1,
        }
    }

    fn record_counters(&mut self, state: &ScanState, preferences: &ScannerPreferences) {
        let counters = &state.counters;
        self.open_parens = counters.open_parens;
        self.close_parens = counters.close_parens;
        self.open_braces = counters.open_braces;
        self.close_braces = counters.close_braces;
        self.quotes = counters.quotes;
        self.linkage_operators = counters.linkage_total();

        if preferences.track_operator_usage {
            for (operator, count) in LINKAGE_OPERATORS.iter().zip(counters.linkage.iter()) {
                if *count > 0 {
                    self.operator_usage.insert(operator.to_string(), *count);
                }
            }
        }
    }
}

/// Single-pass character scanner that splits an expression into references
pub struct Scanner {
    metrics: ScanMetrics,
    preferences: ScannerPreferences,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_preferences(ScannerPreferences::default())
    }

    pub fn with_preferences(preferences: ScannerPreferences) -> Self {
        Self {
            metrics: ScanMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &ScannerPreferences {
        &self.preferences
    }

    /// Scan an expression into its references, in order of appearance
    pub fn scan(&mut self, expression: &str) -> Result<Vec<ParsedReference>, ScanError> {
        self.metrics = ScanMetrics::default();

        log_debug!("Starting expression scan",
            "length" => expression.len(),
            "max_length" => MAX_EXPRESSION_LENGTH
        );

        match self.scan_expression(expression) {
            Ok(references) => {
                log_success!(codes::success::SCAN_COMPLETE, "Expression scan completed",
                    "references" => references.len(),
                    "characters" => self.metrics.characters_scanned
                );
                Ok(references)
            }
            Err(error) => {
                let offset = error.byte_offset();
                match offset {
                    Some(offset) => log_error!(error.error_code(), &error.to_string(),
                        span = Span::new(offset, offset),
                        "characters" => self.metrics.characters_scanned
                    ),
                    None => log_error!(error.error_code(), &error.to_string(),
                        "length" => expression.len()
                    ),
                }
                Err(error)
            }
        }
    }

    fn scan_expression(&mut self, expression: &str) -> Result<Vec<ParsedReference>, ScanError> {
        if expression.len() > MAX_EXPRESSION_LENGTH {
            return Err(ScanError::ExpressionTooLong {
                length: expression.len(),
            });
        }

        let (first_offset, first_char) = expression
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .ok_or(ScanError::EmptyExpression)?;
        if !matches!(first_char, '(' | '{' | '-' | '0'..='9') {
            return Err(ScanError::InvalidLeadingCharacter {
                character: first_char,
                byte_offset: first_offset,
            });
        }

        let mut state = ScanState::new();
        let mut references = Vec::new();

        for (offset, ch) in expression.char_indices() {
            self.metrics.characters_scanned += 1;

            let completed = match state.mode {
                ScanMode::Outside => scan_outside(&mut state, offset, ch).map(|_| false)?,
                ScanMode::InHost => scan_host(&mut state, offset, ch)?,
                ScanMode::InUserMacro => scan_user_macro(&mut state, ch),
                ScanMode::InItem => scan_item(&mut state, offset, ch).map(|_| false)?,
                ScanMode::InItemParam => scan_item_param(&mut state, offset, ch).map(|_| false)?,
                ScanMode::InFunctionParam => {
                    scan_function_param(&mut state, offset, ch).map(|_| false)?
                }
                ScanMode::InFunction => scan_after_function(offset, ch)?,
            };

            if completed {
                if references.len() >= MAX_REFERENCES {
                    return Err(ScanError::TooManyReferences {
                        byte_offset: state.current.start,
                    });
                }
                let reference = complete_reference(&mut state, expression, offset + ch.len_utf8());
                self.metrics.record_reference(&reference);
                if self.preferences.log_reference_details {
                    log_debug!("Reference scanned",
                        "kind" => reference.kind_name(),
                        "text" => reference.raw_text.as_str(),
                        "span" => reference.span
                    );
                }
                references.push(reference);
            }

            state.history.record(ch);
        }

        match state.mode {
            ScanMode::Outside => {}
            ScanMode::InItemParam => {
                return Err(ScanError::IncorrectItemParameters {
                    byte_offset: state.current.item_params.opened_at,
                })
            }
            ScanMode::InFunctionParam => {
                return Err(ScanError::IncorrectFunctionParameters {
                    byte_offset: state.current.function_params.opened_at,
                })
            }
            _ => {
                return Err(ScanError::MissingClosingBrace {
                    byte_offset: state.current.start,
                })
            }
        }
        if let Some(&offset) = state.open_paren_offsets.last() {
            return Err(ScanError::UnclosedParenthesis {
                byte_offset: offset,
            });
        }

        self.metrics.record_counters(&state, &self.preferences);
        Ok(references)
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PER-MODE HANDLERS
// ============================================================================

fn scan_outside(state: &mut ScanState, offset: usize, ch: char) -> Result<(), ScanError> {
    match ch {
        '{' => {
            state.counters.open_braces += 1;
            state.current = ReferenceBuffer::new(offset);
            state.mode = ScanMode::InHost;
        }
        '}' => return Err(ScanError::UnmatchedClosingBrace { byte_offset: offset }),
        '(' => {
            state.counters.open_parens += 1;
            state.open_paren_offsets.push(offset);
        }
        ')' => {
            if state.open_paren_offsets.pop().is_none() {
                return Err(ScanError::UnmatchedClosingParenthesis { byte_offset: offset });
            }
            state.counters.close_parens += 1;
        }
        _ if is_linkage_operator(ch) => {
            if state.history.follows_operator() {
                // Only a unary minus may follow another operator: `a+-5`
                let run = state.history.operator_run + 1;
                if ch != '-' || run > 2 {
                    return Err(ScanError::AdjacentOperators {
                        operator: ch,
                        byte_offset: offset,
                    });
                }
                state.history.operator_run = run;
            } else {
                state.history.operator_run = 1;
            }
            state.counters.record_linkage(ch);
        }
        _ => {}
    }
    Ok(())
}

/// Returns true when the reference closes as a built-in macro
fn scan_host(state: &mut ScanState, offset: usize, ch: char) -> Result<bool, ScanError> {
    match ch {
        '$' if state.current.host.is_empty() => state.mode = ScanMode::InUserMacro,
        ':' => state.mode = ScanMode::InItem,
        '}' => return Ok(true),
        '{' => {
            return Err(ScanError::UnexpectedSymbol {
                symbol: ch,
                byte_offset: offset,
            })
        }
        _ => state.current.host.push(ch),
    }
    Ok(false)
}

/// Returns true on the brace that closes the user macro
fn scan_user_macro(state: &mut ScanState, ch: char) -> bool {
    if state.in_quotes {
        state.quoted_char(ch);
        return false;
    }

    match ch {
        // A quoted context may follow the colon after whitespace: `{$A: "x"}`
        '"' if state.history.last_non_space == Some(':') => state.open_quote(),
        '{' => state.current.macro_depth += 1,
        '}' if state.current.macro_depth == 0 => return true,
        '}' => state.current.macro_depth -= 1,
        _ => {}
    }
    false
}

fn scan_item(state: &mut ScanState, offset: usize, ch: char) -> Result<(), ScanError> {
    match ch {
        '[' => {
            state.current.item.push(ch);
            state.current.item_params.open(offset);
            state.mode = ScanMode::InItemParam;
        }
        '(' => {
            split_function_name(&mut state.current, offset)?;
            state.counters.open_parens += 1;
            state.current.function_params.open(offset);
            state.mode = ScanMode::InFunctionParam;
        }
        '}' => return Err(ScanError::MissingFunction { byte_offset: offset }),
        '{' => {
            return Err(ScanError::UnexpectedSymbol {
                symbol: ch,
                byte_offset: offset,
            })
        }
        _ => state.current.item.push(ch),
    }
    Ok(())
}

/// Move the text after the last `.` (outside item parameters) into the function name
fn split_function_name(buffer: &mut ReferenceBuffer, offset: usize) -> Result<(), ScanError> {
    let search_from = buffer.item.rfind(']').map_or(0, |i| i + 1);
    let dot = buffer.item[search_from..]
        .rfind('.')
        .map(|i| search_from + i)
        .ok_or(ScanError::MissingFunction { byte_offset: offset })?;

    let name = buffer.item.split_off(dot + 1);
    buffer.item.truncate(dot);
    if name.is_empty() {
        return Err(ScanError::MissingFunction { byte_offset: offset });
    }
    buffer.function_name = name;
    Ok(())
}

fn scan_item_param(state: &mut ScanState, offset: usize, ch: char) -> Result<(), ScanError> {
    state.current.item.push(ch);

    if state.in_quotes {
        let still_quoted = state.quoted_char(ch);
        let cursor = &mut state.current.item_params;
        cursor.current.push(ch);
        cursor.after_quote = !still_quoted;
        return Ok(());
    }

    let cursor = &mut state.current.item_params;
    if cursor.after_quote && !ch.is_whitespace() && ch != ',' && ch != ']' {
        return Err(ScanError::IncorrectItemParameters { byte_offset: offset });
    }

    match ch {
        '"' if cursor.at_start => {
            cursor.push(ch);
            state.open_quote();
        }
        '[' if cursor.at_start => {
            cursor.depth += 1;
            if cursor.depth > MAX_ITEM_KEY_NESTING_DEPTH {
                return Err(ScanError::NestingTooDeep { byte_offset: offset });
            }
            cursor.current.push(ch);
        }
        ']' => {
            cursor.after_quote = false;
            if cursor.depth == 1 {
                cursor.finish_slot();
                cursor.depth = 0;
                state.mode = ScanMode::InItem;
            } else {
                cursor.depth -= 1;
                cursor.push(ch);
            }
        }
        ',' => {
            cursor.after_quote = false;
            if cursor.depth == 1 {
                cursor.finish_slot();
            } else {
                cursor.current.push(ch);
                cursor.at_start = true;
            }
        }
        _ => cursor.push(ch),
    }

    if state.current.param_count() > MAX_PARAMETERS_PER_REFERENCE {
        return Err(ScanError::TooManyParameters { byte_offset: offset });
    }
    Ok(())
}

fn scan_function_param(state: &mut ScanState, offset: usize, ch: char) -> Result<(), ScanError> {
    if state.in_quotes {
        let still_quoted = state.quoted_char(ch);
        let cursor = &mut state.current.function_params;
        cursor.current.push(ch);
        cursor.after_quote = !still_quoted;
        return Ok(());
    }

    let cursor = &mut state.current.function_params;
    if cursor.after_quote && !ch.is_whitespace() && ch != ',' && ch != ')' {
        return Err(ScanError::IncorrectFunctionParameters { byte_offset: offset });
    }

    match ch {
        '"' if cursor.at_start => {
            cursor.push(ch);
            state.open_quote();
        }
        ',' => cursor.finish_slot(),
        ')' => {
            cursor.finish_slot();
            state.counters.close_parens += 1;
            state.mode = ScanMode::InFunction;
        }
        _ => cursor.push(ch),
    }

    if state.current.param_count() > MAX_PARAMETERS_PER_REFERENCE {
        return Err(ScanError::TooManyParameters { byte_offset: offset });
    }
    Ok(())
}

fn scan_after_function(offset: usize, ch: char) -> Result<bool, ScanError> {
    match ch {
        '}' => Ok(true),
        _ => Err(ScanError::SymbolsAfterFunction { byte_offset: offset }),
    }
}

fn complete_reference(state: &mut ScanState, expression: &str, end: usize) -> ParsedReference {
    let buffer = std::mem::take(&mut state.current);
    let mode = std::mem::replace(&mut state.mode, ScanMode::Outside);
    state.counters.close_braces += 1;

    let span = Span::new(buffer.start, end);
    let raw_text = expression[buffer.start..end].to_string();

    let kind = match mode {
        ScanMode::InHost => ReferenceKind::BuiltinMacro { name: buffer.host },
        ScanMode::InUserMacro => {
            let (name, context) = split_user_macro(&raw_text);
            ReferenceKind::UserMacro { name, context }
        }
        _ => {
            debug_assert_eq!(mode, ScanMode::InFunction);
            let mut function_params: Vec<String> = buffer
                .function_params
                .params
                .iter()
                .map(|p| unquote_param(p))
                .collect();
            // `diff()` carries no parameters rather than one empty one
            if function_params.len() == 1 && function_params[0].is_empty() {
                function_params.clear();
            }

            ReferenceKind::HostItemFunction {
                host: buffer.host,
                item: buffer.item,
                item_params: buffer
                    .item_params
                    .params
                    .iter()
                    .map(|p| unquote_param(p))
                    .collect(),
                function_name: buffer.function_name,
                function_params,
            }
        }
    };

    ParsedReference {
        raw_text,
        span,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn scan(expression: &str) -> Result<Vec<ParsedReference>, ScanError> {
        Scanner::new().scan(expression)
    }

    fn host_item_function(reference: &ParsedReference) -> (&str, &str, &[String], &str, &[String]) {
        match &reference.kind {
            ReferenceKind::HostItemFunction {
                host,
                item,
                item_params,
                function_name,
                function_params,
            } => (host, item, item_params, function_name, function_params),
            other => panic!("expected host:item.function, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_reference() {
        let refs = scan("{srv1:agent.ping.last(0)}=1").unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw_text, "{srv1:agent.ping.last(0)}");
        assert_eq!(refs[0].span, Span::new(0, 25));

        let (host, item, item_params, function, params) = host_item_function(&refs[0]);
        assert_eq!(host, "srv1");
        assert_eq!(item, "agent.ping");
        assert!(item_params.is_empty());
        assert_eq!(function, "last");
        assert_eq!(params, ["0"]);
    }

    #[test]
    fn test_item_parameters_and_nested_arrays() {
        let refs =
            scan(r#"{srv:vfs.fs.size[/, "pfree" , [a,"b]"]].min(5m, 1h)}<10"#).unwrap();
        let (_, item, item_params, function, params) = host_item_function(&refs[0]);
        assert_eq!(item, r#"vfs.fs.size[/, "pfree" , [a,"b]"]]"#);
        assert_eq!(item_params, ["/", "pfree", r#"[a,"b]"]"#]);
        assert_eq!(function, "min");
        assert_eq!(params, ["5m", "1h"]);
    }

    #[test]
    fn test_function_name_split_ignores_dots_inside_parameters() {
        let refs = scan("{srv:net.if.in[eth0.1].avg(60)}>0").unwrap();
        let (_, item, item_params, function, _) = host_item_function(&refs[0]);
        assert_eq!(item, "net.if.in[eth0.1]");
        assert_eq!(item_params, ["eth0.1"]);
        assert_eq!(function, "avg");
    }

    #[test]
    fn test_quoted_function_parameters() {
        let refs = scan(r#"{srv:log.str("a,b \"c\")")}=1"#).unwrap();
        let (_, item, _, function, params) = host_item_function(&refs[0]);
        assert_eq!(item, "log");
        assert_eq!(function, "str");
        assert_eq!(params, [r#"a,b "c")"#]);
    }

    #[test]
    fn test_empty_parameter_list() {
        let refs = scan("{srv:agent.ping.diff()}=1").unwrap();
        let (_, _, _, function, params) = host_item_function(&refs[0]);
        assert_eq!(function, "diff");
        assert!(params.is_empty());

        let refs = scan("{srv:agent.ping.last(0,)}=1").unwrap();
        let (_, _, _, _, params) = host_item_function(&refs[0]);
        assert_eq!(params, ["0", ""]);
    }

    #[test]
    fn test_macros() {
        let refs = scan("{TRIGGER.VALUE}=1|{$LIMIT:\"a:b\"}>{$X}").unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(
            refs[0].kind,
            ReferenceKind::BuiltinMacro {
                name: "TRIGGER.VALUE".to_string()
            }
        );
        assert_eq!(
            refs[1].kind,
            ReferenceKind::UserMacro {
                name: "LIMIT".to_string(),
                context: Some("a:b".to_string())
            }
        );
        assert_eq!(refs[1].raw_text, "{$LIMIT:\"a:b\"}");
        assert_eq!(
            refs[2].kind,
            ReferenceKind::UserMacro {
                name: "X".to_string(),
                context: None
            }
        );
    }

    #[test]
    fn test_quoted_user_macro_context_after_whitespace() {
        let refs = scan(r#"{h:key.last(0)}={$A: "x}"}"#).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].raw_text, r#"{$A: "x}"}"#);
        assert_eq!(
            refs[1].kind,
            ReferenceKind::UserMacro {
                name: "A".to_string(),
                context: Some("x}".to_string())
            }
        );
    }

    #[test]
    fn test_user_macro_inside_function_parameters() {
        let refs = scan("{srv1:agent.ping.last({$TIME_WINDOW})}=1").unwrap();
        assert_eq!(refs.len(), 1);
        let (_, _, _, _, params) = host_item_function(&refs[0]);
        assert_eq!(params, ["{$TIME_WINDOW}"]);
    }

    #[test]
    fn test_input_errors() {
        assert_matches!(scan(""), Err(ScanError::EmptyExpression));
        assert_matches!(scan("  \t "), Err(ScanError::EmptyExpression));
        assert_matches!(
            scan("  x{a:b.last(0)}"),
            Err(ScanError::InvalidLeadingCharacter {
                character: 'x',
                byte_offset: 2
            })
        );
        assert_matches!(
            scan("1".repeat(MAX_EXPRESSION_LENGTH + 1).as_str()),
            Err(ScanError::ExpressionTooLong { .. })
        );
    }

    #[test]
    fn test_bracket_balance_errors() {
        assert_matches!(
            scan("{srv1:agent.ping.last(0)"),
            Err(ScanError::MissingClosingBrace { byte_offset: 0 })
        );
        assert_matches!(
            scan("1=1}"),
            Err(ScanError::UnmatchedClosingBrace { byte_offset: 3 })
        );
        assert_matches!(
            scan("(1=1))"),
            Err(ScanError::UnmatchedClosingParenthesis { byte_offset: 5 })
        );
        assert_matches!(
            scan("((1=1)"),
            Err(ScanError::UnclosedParenthesis { byte_offset: 0 })
        );
    }

    #[test]
    fn test_unterminated_parameter_lists() {
        assert_matches!(
            scan("{srv:key[a.last(0)}=1"),
            Err(ScanError::IncorrectItemParameters { byte_offset: 8 })
        );
        assert_matches!(
            scan(r#"{srv:key[a,"b].last(0)}=1"#),
            Err(ScanError::IncorrectItemParameters { byte_offset: 8 })
        );
        assert_matches!(
            scan("{srv:key.last(0}=1"),
            Err(ScanError::IncorrectFunctionParameters { byte_offset: 13 })
        );
    }

    #[test]
    fn test_operator_adjacency() {
        assert_matches!(
            scan("{srv1:agent.ping.last(0)}==1"),
            Err(ScanError::AdjacentOperators {
                operator: '=',
                byte_offset: 26
            })
        );
        assert_matches!(
            scan("1 + * 2"),
            Err(ScanError::AdjacentOperators { operator: '*', .. })
        );
        assert_matches!(
            scan("1+--2"),
            Err(ScanError::AdjacentOperators { operator: '-', .. })
        );
        assert!(scan("{a:b.last(0)}>-5").is_ok());
        assert!(scan("1 - -2").is_ok());
    }

    #[test]
    fn test_operators_inside_references_are_not_linkage() {
        let refs = scan("{srv-1:a-b[x==y].last(#1)}=1").unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_malformed_parameters() {
        assert_matches!(
            scan(r#"{srv:key["a"b].last(0)}=1"#),
            Err(ScanError::IncorrectItemParameters { byte_offset: 12 })
        );
        assert_matches!(
            scan(r#"{srv:key.str("a" x)}=1"#),
            Err(ScanError::IncorrectFunctionParameters { .. })
        );
    }

    #[test]
    fn test_missing_function() {
        assert_matches!(scan("{srv:key}=1"), Err(ScanError::MissingFunction { .. }));
        assert_matches!(scan("{srv:key(0)}=1"), Err(ScanError::MissingFunction { .. }));
        assert_matches!(scan("{srv:key.(0)}=1"), Err(ScanError::MissingFunction { .. }));
        assert_matches!(
            scan("{srv:key[a].(0)}=1"),
            Err(ScanError::MissingFunction { .. })
        );
    }

    #[test]
    fn test_symbols_after_function() {
        assert_matches!(
            scan("{srv:key.last(0)x}=1"),
            Err(ScanError::SymbolsAfterFunction { byte_offset: 16 })
        );
    }

    #[test]
    fn test_nested_brace_in_host_is_rejected() {
        assert_matches!(
            scan("{a{b:c.last(0)}}"),
            Err(ScanError::UnexpectedSymbol {
                symbol: '{',
                byte_offset: 2
            })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_ITEM_KEY_NESTING_DEPTH + 1;
        let expression = format!(
            "{{srv:key{}{}.last(0)}}=1",
            "[".repeat(depth),
            "]".repeat(depth)
        );
        assert_matches!(scan(&expression), Err(ScanError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_reference_limit() {
        let at_limit = vec!["{$A}"; MAX_REFERENCES].join("+");
        assert_eq!(scan(&at_limit).unwrap().len(), MAX_REFERENCES);

        // Each `{$A}+` is five bytes, so the extra reference opens at this offset
        let over_limit = vec!["{$A}"; MAX_REFERENCES + 1].join("+");
        assert_matches!(
            scan(&over_limit),
            Err(ScanError::TooManyReferences { byte_offset }) if byte_offset == MAX_REFERENCES * 5
        );
    }

    #[test]
    fn test_parameter_limit() {
        // Item and function parameters share one budget per reference
        let at_limit = format!(
            "{{srv:key[{}].last(0)}}=1",
            vec!["a"; MAX_PARAMETERS_PER_REFERENCE - 1].join(",")
        );
        assert!(scan(&at_limit).is_ok());

        let item_params = format!(
            "{{srv:key[{}].last(0)}}=1",
            vec!["a"; MAX_PARAMETERS_PER_REFERENCE + 1].join(",")
        );
        assert_matches!(scan(&item_params), Err(ScanError::TooManyParameters { .. }));

        let function_params = format!(
            "{{srv:key.count({})}}=1",
            vec!["1"; MAX_PARAMETERS_PER_REFERENCE + 1].join(",")
        );
        assert_matches!(
            scan(&function_params),
            Err(ScanError::TooManyParameters { .. })
        );
    }

    #[test]
    fn test_metrics_balance() {
        let mut scanner = Scanner::with_preferences(ScannerPreferences {
            track_operator_usage: true,
            log_reference_details: false,
        });
        let expression = r#"({a:b[")"].last(0)}>5)&({$M}<{TRIGGER.VALUE})|-1"#;
        let refs = scanner.scan(expression).unwrap();
        assert_eq!(refs.len(), 3);

        let metrics = scanner.metrics();
        assert_eq!(metrics.total_references(), 3);
        assert_eq!(metrics.host_item_function_refs, 1);
        assert_eq!(metrics.open_braces, metrics.close_braces);
        assert_eq!(metrics.open_parens, metrics.close_parens);
        assert_eq!(metrics.open_parens, 3);
        assert_eq!(metrics.quotes, 2);
        assert_eq!(metrics.operator_usage.get("&"), Some(&1));
        assert_eq!(metrics.operator_usage.get("-"), Some(&1));
        assert_eq!(metrics.characters_scanned, expression.chars().count());
    }
}
