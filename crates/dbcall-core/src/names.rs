//! Routine-name sanitizing and comma-joined name lists

use crate::Parameter;

/// Normalize a scalar function name before it is placed in `select <name>(...)`
///
/// Trims surrounding whitespace and drops a trailing `()` so that callers who
/// pass `"getdate()"` do not end up with `getdate()()`. Returns `None` for a
/// blank name.
pub fn clean_scalar_function_name(name: &str) -> Option<String> {
    let mut cleaned = name.trim();

    // Repeat until stable so that cleaning a cleaned name changes nothing.
    while let Some(stripped) = cleaned.strip_suffix("()") {
        cleaned = stripped.trim();
    }

    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.to_string())
}

/// Join entries with `,`, silently skipping blank ones
///
/// An empty input yields an empty string.
pub fn join_non_blank<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for item in items {
        let item = item.as_ref();
        if item.trim().is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(',');
        }
        joined.push_str(item);
    }
    joined
}

/// The `@`-prefixed variable a parameter name refers to
///
/// Drivers declare and the generated call text reference parameters under
/// this name, so both sides agree whether or not the caller wrote the `@`.
pub fn parameter_variable(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{}", trimmed)
    }
}

/// Comma-joined variables of the parameters that are arguments of a function call
///
/// Return-value parameters are not arguments and are left out.
pub fn join_parameter_names(parameters: &[Parameter]) -> String {
    join_non_blank(
        parameters
            .iter()
            .filter(|p| !p.is_return_value() && !p.name().trim().is_empty())
            .map(|p| parameter_variable(p.name())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("getdate", Some("getdate"))]
    #[case("getdate()", Some("getdate"))]
    #[case("  foo  ", Some("foo"))]
    #[case("  foo()  ", Some("foo"))]
    #[case("[dbcalltest].[DivideByZero]", Some("[dbcalltest].[DivideByZero]"))]
    #[case("foo ()", Some("foo"))]
    #[case("foo(1)", Some("foo(1)"))]
    #[case("", None)]
    #[case("   \t", None)]
    #[case("()", None)]
    fn test_clean_scalar_function_name(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(clean_scalar_function_name(input).as_deref(), expected);
    }

    #[rstest]
    #[case("foo")]
    #[case("foo()")]
    #[case("foo()()")]
    #[case(" foo () ")]
    #[case("()")]
    #[case("")]
    fn test_clean_is_idempotent(#[case] input: &str) {
        let once = clean_scalar_function_name(input);
        let twice = once.as_deref().and_then(clean_scalar_function_name);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_suffixed_equals_plain() {
        assert_eq!(
            clean_scalar_function_name("foo()"),
            clean_scalar_function_name("foo")
        );
    }

    #[test]
    fn test_join_skips_blank_entries() {
        assert_eq!(join_non_blank(["a", "", "b", "  ", "c"]), "a,b,c");
        assert_eq!(join_non_blank(["", "first"]), "first");
    }

    #[test]
    fn test_join_empty_yields_empty_string() {
        assert_eq!(join_non_blank(Vec::<String>::new()), "");
        assert_eq!(join_parameter_names(&[]), "");
    }

    #[test]
    fn test_join_then_split_round_trips() {
        let names = vec!["@a".to_string(), "@b".to_string(), "@c".to_string()];
        let joined = join_non_blank(&names);
        let split: Vec<String> = joined.split(',').map(str::to_string).collect();
        assert_eq!(split, names);
    }

    #[test]
    fn test_parameter_names_exclude_return_value() {
        let params = vec![
            Parameter::input("@x", 1),
            Parameter::return_value(),
            Parameter::input("@y", 2),
        ];
        assert_eq!(join_parameter_names(&params), "@x,@y");
    }

    #[rstest]
    #[case("@x", "@x")]
    #[case("x", "@x")]
    #[case("  y ", "@y")]
    fn test_parameter_variable_adds_missing_prefix(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(parameter_variable(name), expected);
        assert_eq!(parameter_variable(&parameter_variable(name)), expected);
    }

    #[test]
    fn test_parameter_names_are_prefixed_like_variables() {
        let params = vec![Parameter::input("x", 1), Parameter::input(" @y ", 2)];
        assert_eq!(join_parameter_names(&params), "@x,@y");
    }
}
