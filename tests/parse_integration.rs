use boolean_parser::dsl::{Expr, Operator, parse, parse_sql};
use boolean_parser::error::{ParseError, StructuralError};

#[test]
fn parses_single_word() {
    let expr = parse("stuff").unwrap();
    match &expr {
        Expr::Word(word) => assert_eq!(word.name(), "stuff"),
        other => panic!("expected a word, got {:?}", other),
    }
    assert_eq!(expr.to_string(), "stuff");
}

#[test]
fn parses_condition_accessors() {
    let expr = parse("modela.x >= 12").unwrap();
    let Expr::Condition(cond) = &expr else {
        panic!("expected a condition");
    };
    assert_eq!(cond.name(), "x");
    assert_eq!(cond.base(), Some("modela"));
    assert_eq!(cond.fullname(), "modela.x");
    assert_eq!(cond.operator(), Operator::Ge);
    assert_eq!(cond.value(), "12");
    assert_eq!(expr.to_string(), "x>=12");
}

#[test]
fn parses_between() {
    let expr = parse("a between 3 and 5").unwrap();
    let Expr::Condition(cond) = &expr else {
        panic!("expected a condition");
    };
    assert_eq!(cond.operator(), Operator::Between);
    assert_eq!(cond.value(), "3");
    assert_eq!(cond.value2(), Some("5"));
    assert_eq!(expr.to_string(), "abetween3and5");
}

#[test]
fn and_or_not_precedence() {
    assert_eq!(
        parse("x > 5 and x < 10").unwrap().to_string(),
        "and_(x>5, x<10)"
    );
    assert_eq!(
        parse("x > 5 or y < 3 and not z == 2").unwrap().to_string(),
        "or_(x>5, and_(y<3, not_(z==2)))"
    );
    assert_eq!(
        parse("(x > 5 or y < 3) and z == 2").unwrap().to_string(),
        "and_(or_(x>5, y<3), z==2)"
    );
}

#[test]
fn collects_params() {
    let expr = parse("a > 5 and b < 3 or not a == 1").unwrap();
    let params: Vec<String> = expr.params().into_iter().collect();
    assert_eq!(params, vec!["a", "b"]);
}

#[test]
fn condition_input_clause_reparses() {
    let expr = parse("modela.name != \"two words\" and flags | 8").unwrap();
    for cond in expr.leaf_conditions() {
        let again = parse(&cond.input_clause()).unwrap();
        let Expr::Condition(again) = again else {
            panic!("expected a condition");
        };
        assert_eq!(again.fullname(), cond.fullname());
        assert_eq!(again.operator(), cond.operator());
        assert_eq!(again.value(), cond.value());
    }
}

#[test]
fn bitwise_negation() {
    let expr = parse("flags & ~64 and other = ~64").unwrap();
    let values: Vec<&str> = expr.leaf_conditions().iter().map(|c| c.value()).collect();
    assert_eq!(values, vec!["-65", "64"]);
}

#[test]
fn nested_parameter_is_structural_error() {
    let err = parse("a.b.c > 5").unwrap_err();
    assert_eq!(
        err,
        ParseError::Structural(StructuralError::NestedParameter("a.b.c".into()))
    );
}

#[test]
fn multiline_syntax_error_position() {
    let err = parse("x > 5 and\ny <").unwrap_err();
    let ParseError::Syntax(syntax) = err else {
        panic!("expected a syntax error");
    };
    assert_eq!(syntax.line, 2);
    assert!(syntax.to_string().starts_with("Parsing syntax error"));
}

#[test]
fn sql_flavor() {
    assert!(parse_sql("stuff").is_err());
    assert!(parse_sql("stuff and x > 1").is_err());
    assert_eq!(
        parse_sql("x between 1 and 2 or y != 3").unwrap().to_string(),
        "or_(xbetween1and2, y!=3)"
    );
}

#[test]
fn condition_repr_reparses() {
    for input in ["x >= 12", "name != abc", "flags & ~64", "x == -5", "d < 2020-01-01", "y=1.5e3"] {
        let expr = parse(input).unwrap();
        let Expr::Condition(cond) = &expr else {
            panic!("expected a condition for {}", input);
        };

        let again = parse(&expr.to_string()).unwrap();
        let Expr::Condition(again) = again else {
            panic!("expected a condition for {}", expr);
        };
        assert_eq!(again.fullname(), cond.fullname());
        assert_eq!(again.operator(), cond.operator());
        assert_eq!(again.value(), cond.value());
    }
}
