//! Pass 2: textual reduction of the whole formula
//!
//! References and numbers are rewritten to placeholder tokens, then groups
//! and binary operations are folded until a single token is left. Whatever
//! survives the folding is checked for shape: only operands, operators and
//! parentheses, no empty groups, no juxtaposed operands, and exactly one
//! operator fewer than operands.

use super::cached_regex;
use super::error::GrammarError;
use crate::config::compile_time::grammar::MAX_REDUCTION_PASSES;
use crate::logging::codes;
use crate::scanner::LINKAGE_OPERATORS;
use crate::utils::Span;
use crate::{log_debug, log_error, log_success};
use regex::Regex;
use std::sync::OnceLock;

const CONSTANT: &str = "{constant}";
const EXPRESSION: &str = "{expression}";

static NUMBER: OnceLock<Regex> = OnceLock::new();
static UNARY_MINUS_CONSTANT: OnceLock<Regex> = OnceLock::new();

/// Result of a successful reduction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionSummary {
    /// The folded skeleton, `1` standing for every operand
    pub simple_expression: String,
    pub expression_count: usize,
    pub linkage_count: usize,
    pub passes: usize,
}

#[derive(Debug)]
pub struct GrammarReducer {
    passes: usize,
    max_passes: usize,
}

impl Default for GrammarReducer {
    fn default() -> Self {
        Self {
            passes: 0,
            max_passes: MAX_REDUCTION_PASSES,
        }
    }
}

impl GrammarReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower the rewrite pass budget; it is capped at `MAX_REDUCTION_PASSES`
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.min(MAX_REDUCTION_PASSES);
        self
    }

    /// Number of rewrite passes used by the last reduction
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Reduce the raw expression. `reference_spans` are the byte spans of the
    /// scanned `{...}` references, each of which counts as one operand.
    pub fn reduce(
        &mut self,
        expression: &str,
        reference_spans: &[Span],
    ) -> Result<ReductionSummary, GrammarError> {
        self.passes = 0;

        log_debug!("Starting grammar reduction",
            "length" => expression.len(),
            "references" => reference_spans.len()
        );

        match self.reduce_expression(expression, reference_spans) {
            Ok(summary) => {
                log_success!(codes::success::GRAMMAR_REDUCTION_COMPLETE, "Grammar reduction completed",
                    "expressions" => summary.expression_count,
                    "operators" => summary.linkage_count,
                    "passes" => summary.passes
                );
                Ok(summary)
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(),
                    "passes" => self.passes
                );
                Err(error)
            }
        }
    }

    fn reduce_expression(
        &mut self,
        expression: &str,
        reference_spans: &[Span],
    ) -> Result<ReductionSummary, GrammarError> {
        let masked = mask_references(expression, reference_spans);
        let mut text = cached_regex(&NUMBER, r"(\d+(\.\d*)?|\.\d+)[KMGTYZEPsmhdw]?")
            .replace_all(&masked, CONSTANT)
            .replace(' ', "");

        let unary = cached_regex(&UNARY_MINUS_CONSTANT, r"([(=#<>|&+\-/*])-\{constant\}");
        let constant_group = format!("({CONSTANT})");
        let negated_group = format!("(-{CONSTANT})");
        let negated_operand = format!("${{1}}{EXPRESSION}");
        text = self.fold(text, |current| {
            let next = current
                .replace(&constant_group, EXPRESSION)
                .replace(&negated_group, EXPRESSION);
            unary.replace_all(&next, negated_operand.as_str()).into_owned()
        })?;

        if let Some(rest) = text.strip_prefix('-').filter(|r| r.starts_with(CONSTANT)) {
            text = rest.to_string();
        }
        text = text.replace(CONSTANT, EXPRESSION);

        let expression_group = format!("({EXPRESSION})");
        let binary: Vec<String> = LINKAGE_OPERATORS
            .iter()
            .map(|op| format!("{EXPRESSION}{op}{EXPRESSION}"))
            .collect();
        text = self.fold(text, |current| {
            let mut next = current.replace(&expression_group, EXPRESSION);
            for pattern in &binary {
                next = next.replace(pattern.as_str(), EXPRESSION);
            }
            next
        })?;

        let simple_expression = text.replace(EXPRESSION, "1");
        check_shape(simple_expression, self.passes)
    }

    /// Apply `step` until the text stops changing
    fn fold<F>(&mut self, mut text: String, step: F) -> Result<String, GrammarError>
    where
        F: Fn(&str) -> String,
    {
        loop {
            self.passes += 1;
            if self.passes > self.max_passes {
                return Err(GrammarError::ReductionLimitExceeded);
            }
            let next = step(&text);
            if next == text {
                return Ok(text);
            }
            text = next;
        }
    }
}

/// Reduce and validate with a fresh reducer
pub fn reduce_and_validate(
    expression: &str,
    reference_spans: &[Span],
) -> Result<ReductionSummary, GrammarError> {
    GrammarReducer::new().reduce(expression, reference_spans)
}

fn mask_references(expression: &str, reference_spans: &[Span]) -> String {
    let mut masked = String::with_capacity(expression.len());
    let mut last = 0;
    for span in reference_spans {
        debug_assert!(span.start() >= last && span.end() <= expression.len());
        masked.push_str(&expression[last..span.start()]);
        masked.push_str(CONSTANT);
        last = span.end();
    }
    masked.push_str(&expression[last..]);
    masked
}

fn check_shape(simple_expression: String, passes: usize) -> Result<ReductionSummary, GrammarError> {
    if let Some(residual) = simple_expression
        .chars()
        .find(|&ch| !(ch.is_ascii_digit() || ch == '(' || ch == ')' || LINKAGE_OPERATORS.contains(&ch)))
    {
        return Err(GrammarError::IncorrectFormat { residual });
    }

    if simple_expression.contains("()") {
        return Err(GrammarError::EmptyGroup);
    }
    if simple_expression.contains("11") {
        return Err(GrammarError::MissingOperator);
    }

    for &operator in LINKAGE_OPERATORS.iter() {
        if simple_expression.contains(&format!("{operator})"))
            || simple_expression.contains(&format!("({operator}1"))
        {
            return Err(GrammarError::StrayOperator { operator });
        }
    }

    let expression_count = simple_expression.matches('1').count();
    let linkage_count = simple_expression
        .chars()
        .filter(|ch| LINKAGE_OPERATORS.contains(ch))
        .count();
    if linkage_count + 1 != expression_count {
        return Err(GrammarError::LinkageMismatch {
            expressions: expression_count,
            operators: linkage_count,
        });
    }

    Ok(ReductionSummary {
        simple_expression,
        expression_count,
        linkage_count,
        passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use assert_matches::assert_matches;

    fn reduce(expression: &str) -> Result<ReductionSummary, GrammarError> {
        let spans: Vec<Span> = scan(expression)
            .expect("test expressions must scan")
            .iter()
            .map(|r| r.span)
            .collect();
        reduce_and_validate(expression, &spans)
    }

    #[test]
    fn test_simple_comparison() {
        let summary = reduce("{srv1:agent.ping.last(0)}=1").unwrap();
        assert_eq!(summary.simple_expression, "1");
        assert_eq!(summary.expression_count, 1);
        assert_eq!(summary.linkage_count, 0);
    }

    #[test]
    fn test_nested_groups_and_units() {
        assert!(reduce("({h:cpu.avg(5m)} > 1.5K) | ({h:mem.last(#3)} < .5)").is_ok());
        assert!(reduce("((({h:a.last()})))&{h:b.last()}#0").is_ok());
        assert!(reduce("{h:a.last()}>5w").is_ok());
    }

    #[test]
    fn test_unary_minus() {
        assert!(reduce("-5+{h:a.last()}").is_ok());
        assert!(reduce("{h:a.last()}>-5").is_ok());
        assert!(reduce("{h:a.last()}*(-2)").is_ok());
        assert!(reduce("{h:a.last()}&-{h:b.last()}").is_ok());
        assert!(reduce("{h:a.last()}--3").is_ok());
    }

    #[test]
    fn test_reference_parameters_are_opaque() {
        // Text inside a reference never reaches the reducer
        assert!(reduce(r#"{h:log[a b,"(x"].regexp("1 2")}=0"#).is_ok());
    }

    #[test]
    fn test_missing_operator() {
        assert_matches!(
            reduce("{srv1:agent.ping.last(0)} {srv2:agent.ping.last(0)}"),
            Err(GrammarError::MissingOperator)
        );
        assert_matches!(reduce("{h:a.last()}=1 2"), Err(GrammarError::MissingOperator));
    }

    #[test]
    fn test_trailing_operator() {
        assert_matches!(
            reduce("{h:a.last()}+"),
            Err(GrammarError::LinkageMismatch {
                expressions: 1,
                operators: 1
            })
        );
    }

    #[test]
    fn test_stray_operators_in_groups() {
        assert_matches!(
            reduce("({h:a.last()}+)=1"),
            Err(GrammarError::StrayOperator { operator: '+' })
        );
        assert_matches!(
            reduce("(*{h:a.last()})=1"),
            Err(GrammarError::StrayOperator { operator: '*' })
        );
    }

    #[test]
    fn test_empty_group() {
        assert_matches!(reduce("{h:a.last()}+()"), Err(GrammarError::EmptyGroup));
    }

    #[test]
    fn test_residual_characters() {
        assert_matches!(
            reduce("{h:a.last()}=1x"),
            Err(GrammarError::IncorrectFormat { residual: 'x' })
        );
    }

    #[test]
    fn test_reducer_reports_passes() {
        let mut reducer = GrammarReducer::new();
        let summary = reducer.reduce("1+2", &[]).unwrap();
        assert_eq!(summary.passes, reducer.passes());
        assert!(reducer.passes() >= 2);
        assert_eq!(summary.simple_expression, "1");
    }

    #[test]
    fn test_reduction_pass_limit() {
        let expression = "((((((1))))))=(((2)))";
        let needed = GrammarReducer::new().reduce(expression, &[]).unwrap().passes;

        let mut exact = GrammarReducer::new().with_max_passes(needed);
        assert!(exact.reduce(expression, &[]).is_ok());

        let mut short = GrammarReducer::new().with_max_passes(needed - 1);
        assert_matches!(
            short.reduce(expression, &[]),
            Err(GrammarError::ReductionLimitExceeded)
        );
        assert_eq!(short.passes(), needed);
    }
}
