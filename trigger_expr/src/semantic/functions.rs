//! Trigger function registry and parameter kinds

use crate::grammar::cached_regex;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// What a function parameter must look like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Any string
    Str,
    /// Seconds, optionally with a time suffix: `30`, `5m`
    Sec,
    /// Seconds or a value count: `5m`, `#3`
    SecNum,
    /// Plain number
    Num,
}

static SECONDS: OnceLock<Regex> = OnceLock::new();
static COUNT: OnceLock<Regex> = OnceLock::new();
static NUMBER: OnceLock<Regex> = OnceLock::new();

impl ParamKind {
    pub fn accepts(&self, parameter: &str) -> bool {
        match self {
            ParamKind::Str => true,
            ParamKind::Sec => is_seconds(parameter),
            ParamKind::SecNum => {
                is_seconds(parameter) || cached_regex(&COUNT, r"^#\d+$").is_match(parameter)
            }
            ParamKind::Num => cached_regex(&NUMBER, r"^[-+]?\d+(\.\d+)?$").is_match(parameter),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Str => "string",
            ParamKind::Sec => "seconds",
            ParamKind::SecNum => "seconds or #count",
            ParamKind::Num => "number",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_seconds(parameter: &str) -> bool {
    cached_regex(&SECONDS, r"^\d+[smhdw]?$").is_match(parameter)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgSpec {
    pub mandatory: bool,
    pub kind: ParamKind,
}

impl ArgSpec {
    pub const fn mandatory(kind: ParamKind) -> Self {
        Self {
            mandatory: true,
            kind,
        }
    }

    pub const fn optional(kind: ParamKind) -> Self {
        Self {
            mandatory: false,
            kind,
        }
    }
}

/// Parameter contract of one function. `None` means it takes no parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSpec {
    pub args: Option<Vec<ArgSpec>>,
}

pub trait FunctionRegistry: Send + Sync {
    fn lookup(&self, name: &str) -> Option<FunctionSpec>;
}

/// The built-in trigger functions
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFunctionRegistry;

static FUNCTIONS: OnceLock<HashMap<&'static str, FunctionSpec>> = OnceLock::new();

fn get_function_table() -> &'static HashMap<&'static str, FunctionSpec> {
    FUNCTIONS.get_or_init(|| {
        use ParamKind::*;

        let mut table = HashMap::new();
        let mut register = |names: &[&'static str], args: Option<Vec<ArgSpec>>| {
            for name in names {
                table.insert(*name, FunctionSpec { args: args.clone() });
            }
        };

        register(
            &[
                "abschange",
                "change",
                "date",
                "dayofmonth",
                "dayofweek",
                "diff",
                "logseverity",
                "now",
                "prev",
                "time",
            ],
            None,
        );
        register(
            &["avg", "delta", "last", "max", "min", "sum", "strlen"],
            Some(vec![ArgSpec::mandatory(SecNum), ArgSpec::optional(Sec)]),
        );
        register(
            &["count"],
            Some(vec![
                ArgSpec::mandatory(SecNum),
                ArgSpec::optional(Str),
                ArgSpec::optional(Str),
                ArgSpec::optional(Sec),
            ]),
        );
        register(&["fuzzytime", "nodata"], Some(vec![ArgSpec::mandatory(Sec)]));
        register(
            &["iregexp", "regexp", "str"],
            Some(vec![ArgSpec::mandatory(Str), ArgSpec::optional(SecNum)]),
        );
        register(&["logeventid", "logsource"], Some(vec![ArgSpec::mandatory(Str)]));
        register(
            &["band"],
            Some(vec![
                ArgSpec::mandatory(SecNum),
                ArgSpec::mandatory(Num),
                ArgSpec::optional(Sec),
            ]),
        );

        table
    })
}

impl FunctionRegistry for StandardFunctionRegistry {
    fn lookup(&self, name: &str) -> Option<FunctionSpec> {
        get_function_table().get(name).cloned()
    }
}

impl StandardFunctionRegistry {
    /// Registered function names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = get_function_table().keys().copied().collect();
        names.sort_unstable();
        names
    }
}
