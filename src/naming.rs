//! Naming and type-rendering rules for the generated Go code.

use crate::model::TypeRef;

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Names that the generated flow body declares itself.
const RESERVED: &[&str] = &["err", "service", "fmt"];

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
        && !RESERVED.contains(&name)
}

/// `step1` -> `Step1`
pub fn exported(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Step1` -> `step1`
pub fn unexported(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The local variable holding a value of `ty`, e.g. `*gentleman.Response` -> `responsePtrVal`.
///
/// This is the base name only; types rendering to the same base get a suffix in the flow body.
pub fn var_name(ty: &TypeRef) -> String {
    let mut expr = ty.expr.trim();
    let mut suffix = String::new();
    loop {
        if let Some(rest) = expr.strip_prefix('*') {
            suffix.insert_str(0, "Ptr");
            expr = rest.trim_start();
        } else if let Some(rest) = expr.strip_prefix("[]") {
            suffix.insert_str(0, "Slice");
            expr = rest.trim_start();
        } else {
            break;
        }
    }
    let base = expr.rsplit('.').next().unwrap_or(expr);
    let ident: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let ident = if ident.is_empty() { "value".to_string() } else { ident };
    format!("{}{}Val", unexported(&ident), suffix)
}

/// The value a `case` label stands for, so `1`/`0x1` and `"a"`/`` `a` `` compare equal.
///
/// Integer and plain string literals are normalized; any other label (runes, floats,
/// constants, expressions) is compared by its text.
pub fn case_key(label: &str) -> String {
    let label = label.trim();
    if let Some(value) = int_literal(label) {
        return format!("int:{}", value);
    }
    let quoted = label
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|inner| !inner.contains(['\\', '"']))
        .or_else(|| {
            label
                .strip_prefix('`')
                .and_then(|rest| rest.strip_suffix('`'))
                .filter(|inner| !inner.contains(['`', '\r']))
        });
    match quoted {
        Some(inner) => format!("str:{}", inner),
        None => format!("raw:{}", label),
    }
}

fn int_literal(text: &str) -> Option<i128> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    };
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let digits = digits.replace('_', "");
    let (radix, body) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        Some("0o" | "0O") => (8, &digits[2..]),
        _ if digits.len() > 1 && digits.starts_with('0') => (8, &digits[1..]),
        _ => (10, digits.as_str()),
    };
    if body.starts_with(['+', '-']) {
        return None;
    }
    let value = i128::from_str_radix(body, radix).ok()?;
    Some(if negative { -value } else { value })
}

/// A Go expression for the zero value of `ty`.
pub fn zero_value(ty: &TypeRef) -> String {
    let expr = ty.expr.trim();
    let nil_like = ["*", "[]", "map[", "chan ", "func(", "<-chan", "chan<-"]
        .iter()
        .any(|p| expr.starts_with(p))
        || matches!(expr, "error" | "any" | "interface{}");
    if nil_like {
        return "nil".to_string();
    }
    match expr {
        "string" => "\"\"".to_string(),
        "bool" => "false".to_string(),
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" | "uintptr" | "float32" | "float64" | "byte" | "rune" | "complex64"
        | "complex128" => "0".to_string(),
        _ => format!("*new({})", expr),
    }
}

/// The result list of a Go function: ``, ` a`, ` error` or ` (a, error)`.
pub fn results(output: Option<&TypeRef>, fallible: bool) -> String {
    match (output, fallible) {
        (None, false) => String::new(),
        (Some(out), false) => format!(" {}", out.expr),
        (None, true) => " error".to_string(),
        (Some(out), true) => format!(" ({}, error)", out.expr),
    }
}

/// A bare Go function type, e.g. `func(a) (b, error)`.
pub fn func_type(input: Option<&TypeRef>, output: Option<&TypeRef>, fallible: bool) -> String {
    format!(
        "func({}){}",
        input.map(|t| t.expr.as_str()).unwrap_or(""),
        results(output, fallible)
    )
}
