//! Tests for the filter parser.

use super::*;
use crate::config::FilterConfig;

fn parse_expr(input: &str) -> Expr {
    match FilterParser::parse(input).unwrap() {
        Filter::Expr(expr) => expr,
        Filter::MatchAll => panic!("expected an expression for {:?}", input),
    }
}

fn eq_str(field: &str, value: &str) -> Expr {
    Expr::comparison(field, Operator::Eq, Literal::String(value.to_string()))
}

fn eq_num(field: &str, value: f64) -> Expr {
    Expr::comparison(field, Operator::Eq, Literal::Number(value))
}

fn syntax_position(input: &str) -> usize {
    match FilterParser::parse(input).unwrap_err() {
        FilterError::Syntax { position, .. } => position,
        other => panic!("expected syntax error for {:?}, got {:?}", input, other),
    }
}

// ==================== Empty Input ====================

#[test]
fn test_parse_empty_is_match_all() {
    assert_eq!(FilterParser::parse("").unwrap(), Filter::MatchAll);
}

#[test]
fn test_parse_whitespace_is_match_all() {
    assert_eq!(FilterParser::parse("  \t ").unwrap(), Filter::MatchAll);
}

// ==================== Comparisons ====================

#[test]
fn test_parse_string_comparison() {
    assert_eq!(parse_expr("str == '111'"), eq_str("str", "111"));
}

#[test]
fn test_parse_number_comparison() {
    assert_eq!(
        parse_expr("float >= 11.11"),
        Expr::comparison("float", Operator::Ge, Literal::Number(11.11))
    );
}

#[test]
fn test_parse_bool_and_null_literals() {
    assert_eq!(
        parse_expr("bool != true"),
        Expr::comparison("bool", Operator::Ne, Literal::Bool(true))
    );
    assert_eq!(
        parse_expr("nestedJSON == null"),
        Expr::comparison("nestedJSON", Operator::Eq, Literal::Null)
    );
}

#[test]
fn test_parse_regex_operators() {
    assert_eq!(
        parse_expr("str ~ '1*'"),
        Expr::comparison("str", Operator::Match, Literal::String("1*".to_string()))
    );
    assert_eq!(
        parse_expr("str !~ '1112?'"),
        Expr::comparison("str", Operator::NotMatch, Literal::String("1112?".to_string()))
    );
}

// ==================== Boolean Operator Tests ====================

#[test]
fn test_parse_and() {
    assert_eq!(
        parse_expr("str == '111' and int == 111"),
        Expr::and(eq_str("str", "111"), eq_num("int", 111.0))
    );
}

#[test]
fn test_parse_or() {
    assert_eq!(
        parse_expr("str == '111' or int == 222"),
        Expr::or(eq_str("str", "111"), eq_num("int", 222.0))
    );
}

#[test]
fn test_parse_not() {
    assert_eq!(
        parse_expr("not str == '111'"),
        Expr::negate(eq_str("str", "111"))
    );
}

#[test]
fn test_parse_double_not() {
    assert_eq!(
        parse_expr("not not int == 1"),
        Expr::negate(Expr::negate(eq_num("int", 1.0)))
    );
}

// ==================== Operator Precedence Tests ====================

#[test]
fn test_and_has_higher_precedence_than_or() {
    // a or b and c == a or (b and c)
    assert_eq!(
        parse_expr("a == 1 or b == 2 and c == 3"),
        Expr::or(
            eq_num("a", 1.0),
            Expr::and(eq_num("b", 2.0), eq_num("c", 3.0))
        )
    );
}

#[test]
fn test_not_has_highest_precedence() {
    // str == 'a' or not int == 1 == str == 'a' or (not int == 1)
    assert_eq!(
        parse_expr("str == 'a' or not int == 1"),
        Expr::or(eq_str("str", "a"), Expr::negate(eq_num("int", 1.0)))
    );

    // not a and b == (not a) and b
    assert_eq!(
        parse_expr("not a == 1 and b == 2"),
        Expr::and(Expr::negate(eq_num("a", 1.0)), eq_num("b", 2.0))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse_expr("(a == 1 or b == 2) and c == 3"),
        Expr::and(
            Expr::or(eq_num("a", 1.0), eq_num("b", 2.0)),
            eq_num("c", 3.0)
        )
    );
}

#[test]
fn test_not_applies_to_parenthesized_group() {
    assert_eq!(
        parse_expr("not (a == 1 and b == 2)"),
        Expr::negate(Expr::and(eq_num("a", 1.0), eq_num("b", 2.0)))
    );
}

// ==================== Associativity Tests ====================

#[test]
fn test_parse_multiple_and_is_left_associative() {
    assert_eq!(
        parse_expr("a == 1 and b == 2 and c == 3"),
        Expr::and(
            Expr::and(eq_num("a", 1.0), eq_num("b", 2.0)),
            eq_num("c", 3.0)
        )
    );
}

#[test]
fn test_parse_multiple_or_is_left_associative() {
    assert_eq!(
        parse_expr("a == 1 or b == 2 or c == 3"),
        Expr::or(
            Expr::or(eq_num("a", 1.0), eq_num("b", 2.0)),
            eq_num("c", 3.0)
        )
    );
}

#[test]
fn test_parse_nested_parentheses() {
    assert_eq!(
        parse_expr("((a == 1))"),
        eq_num("a", 1.0)
    );
}

// ==================== Display Round Trip ====================

#[test]
fn test_display_reparses_to_same_tree() {
    for input in [
        "str == '111' and int == 111",
        "a == 1 or (b == 2 or c == 3)",
        "not (a == 1 and b == 2) or c ~ 'x+'",
        "(a == 1 or b == 2) and not not c != null",
    ] {
        let expr = parse_expr(input);
        assert_eq!(parse_expr(&expr.to_string()), expr, "{}", input);
    }
}

#[test]
fn test_display_of_large_numbers_reparses() {
    let input = format!("int < 1{} or int > -1{}", "0".repeat(300), "0".repeat(300));
    let expr = parse_expr(&input);
    assert_eq!(parse_expr(&expr.to_string()), expr);
}

#[test]
fn test_number_overflow_is_rejected() {
    let input = format!("int < 1{}", "0".repeat(400));
    let err = FilterParser::parse(&input).unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(syntax_position(&input), 6);
}

// ==================== Error Tests ====================

#[test]
fn test_error_unclosed_parenthesis() {
    let err = FilterParser::parse("(str == 'a'").unwrap_err();
    match err {
        FilterError::Syntax {
            message,
            fragment,
            position,
        } => {
            assert_eq!(message, "unclosed parenthesis");
            assert_eq!(fragment, "(");
            assert_eq!(position, 0);
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_error_unexpected_close_paren() {
    assert_eq!(syntax_position("str == 'a')"), 10);
    assert_eq!(syntax_position(")"), 0);
}

#[test]
fn test_error_missing_literal() {
    assert_eq!(syntax_position("str =="), 6);
}

#[test]
fn test_error_missing_operator() {
    assert_eq!(syntax_position("str 'a'"), 4);
    assert_eq!(syntax_position("str"), 3);
}

#[test]
fn test_error_missing_operand() {
    assert_eq!(syntax_position("str == 'a' and"), 14);
    assert_eq!(syntax_position("and str == 'a'"), 0);
    assert_eq!(syntax_position("not"), 3);
}

#[test]
fn test_error_literal_on_left() {
    assert_eq!(syntax_position("'a' == str"), 0);
}

#[test]
fn test_error_field_as_literal() {
    assert_eq!(syntax_position("str == other"), 7);
}

#[test]
fn test_error_trailing_tokens() {
    let err = FilterParser::parse("str == 'a' int == 1").unwrap_err();
    match err {
        FilterError::Syntax {
            message, fragment, ..
        } => {
            assert_eq!(message, "unexpected trailing input");
            assert_eq!(fragment, "int");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_error_lexer_failure_propagates() {
    assert_eq!(syntax_position("str == 'a' && int == 1"), 11);
}

#[test]
fn test_error_empty_parentheses() {
    assert_eq!(syntax_position("()"), 1);
}

// ==================== Limit Tests ====================

#[test]
fn test_length_limit() {
    let config = FilterConfig {
        max_length: 10,
        ..FilterConfig::default()
    };
    let err = FilterParser::parse_with_config("str == '0123456789'", &config).unwrap_err();
    assert!(matches!(
        err,
        FilterError::LimitExceeded {
            what: "length",
            limit: 10
        }
    ));
}

#[test]
fn test_depth_limit_on_parentheses() {
    let config = FilterConfig {
        max_depth: 2,
        ..FilterConfig::default()
    };
    assert!(FilterParser::parse_with_config("((a == 1))", &config).is_ok());
    let err = FilterParser::parse_with_config("(((a == 1)))", &config).unwrap_err();
    assert!(matches!(err, FilterError::LimitExceeded { what: "depth", .. }));
}

#[test]
fn test_depth_limit_on_not_chain() {
    let config = FilterConfig {
        max_depth: 3,
        ..FilterConfig::default()
    };
    assert!(FilterParser::parse_with_config("not not not a == 1", &config).is_ok());
    assert!(FilterParser::parse_with_config("not not not not a == 1", &config).is_err());
}

#[test]
fn test_depth_resets_between_siblings() {
    let config = FilterConfig {
        max_depth: 1,
        ..FilterConfig::default()
    };
    let input = "(a == 1) and (b == 2) and not c == 3";
    assert!(FilterParser::parse_with_config(input, &config).is_ok());
}

#[test]
fn test_default_limits_reject_deep_nesting() {
    let input = format!("{}a == 1{}", "(".repeat(200), ")".repeat(200));
    assert!(FilterParser::parse(&input).unwrap_err().is_syntax());
}
