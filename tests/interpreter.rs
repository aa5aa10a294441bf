use calyx::{
    ast::{BinaryOp, Expr},
    diagnostics::Diagnostic,
    environment::Environment,
    lexer::{self, Token},
    parser, runtime,
    runtime::Interpreter,
};

fn eval(source: &str) -> f64 {
    let mut interpreter = Interpreter::new();
    interpreter
        .eval_source(source)
        .expect("evaluation should succeed")
        .expect("input should hold an expression")
        .value
}

fn eval_error(source: &str) -> Diagnostic {
    let mut interpreter = Interpreter::new();
    match interpreter.eval_source(source) {
        Ok(_) => panic!("expected error for {source:?}"),
        Err(diag) => diag,
    }
}

fn parse_tree(source: &str) -> Expr {
    parser::parse(lexer::tokenize(source).expect("tokenize should succeed"))
        .expect("parse should succeed")
        .expect("input should hold an expression")
}

#[test]
fn evaluates_basic_arithmetic() {
    assert_eq!(eval("3 + 2"), 5.0);
    assert_eq!(eval("2 + 3 * 2"), 8.0);
    assert_eq!(eval("3+4*2/(1-5)^2"), 3.5);
    assert_eq!(eval("(((33))) + 6"), 39.0);
}

#[test]
fn subtraction_and_division_are_left_associative() {
    assert_eq!(eval("10 - 2 - 3"), 5.0);
    assert_eq!(eval("10 - 2 - 3 - 4"), 1.0);
    assert_eq!(eval("10 / 2 / 5"), 1.0);
}

#[test]
fn power_is_right_associative() {
    assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
    assert_eq!(eval("2 ^ (3 ^ 2)"), 512.0);
    assert_eq!(eval("(2 ^ 3) ^ 2"), 64.0);
}

#[test]
fn unary_minus_binds_tighter_than_power() {
    assert_eq!(eval("-1^2"), 1.0);
    assert_eq!(eval("-(-2)^2"), 4.0);
    assert_eq!(eval("--2"), 2.0);
}

#[test]
fn assignment_stores_and_returns_value() {
    let mut interpreter = Interpreter::new();
    let outcome = interpreter
        .eval_source("x = 25")
        .expect("assignment should succeed")
        .expect("expression expected");
    assert_eq!(outcome.value, 25.0);
    assert_eq!(interpreter.env().retrieve("x"), Some(25.0));

    let outcome = interpreter
        .eval_source("x = x - 5")
        .expect("reassignment should succeed")
        .expect("expression expected");
    assert_eq!(outcome.value, 20.0);
    assert_eq!(interpreter.env().retrieve("x"), Some(20.0));
}

#[test]
fn assignment_chains_bind_right_to_left() {
    let mut interpreter = Interpreter::new();
    interpreter.env_mut().store("y", 4.0);
    let outcome = interpreter
        .eval_source("a = b = y")
        .expect("chain should succeed")
        .expect("expression expected");
    assert_eq!(outcome.value, 4.0);
    assert_eq!(interpreter.env().retrieve("a"), Some(4.0));
    assert_eq!(interpreter.env().retrieve("b"), Some(4.0));
}

#[test]
fn parenthesized_assignment_is_an_expression() {
    let mut interpreter = Interpreter::new();
    let outcome = interpreter
        .eval_source("(t = 2) * 3")
        .expect("should succeed")
        .expect("expression expected");
    assert_eq!(outcome.value, 6.0);
    assert_eq!(interpreter.env().retrieve("t"), Some(2.0));
}

#[test]
fn undefined_variable_is_reported() {
    assert_eq!(eval_error("pi").message, "Undefined variable: pi");
    assert_eq!(eval_error("2 + a * 3").message, "Undefined variable: a");
}

#[test]
fn assignment_target_must_be_a_symbol() {
    assert_eq!(
        eval_error("3 = 4").message,
        "Left side of assignment must be a symbol"
    );
    assert_eq!(
        eval_error("x + 1 = 5").message,
        "Left side of assignment must be a symbol"
    );
}

#[test]
fn division_by_zero_follows_ieee_rules() {
    assert_eq!(eval("1 / 0"), f64::INFINITY);
    assert_eq!(eval("-1 / 0"), f64::NEG_INFINITY);
    assert!(eval("0 / 0").is_nan());
}

#[test]
fn malformed_inputs_name_the_offending_token() {
    assert_eq!(eval_error("3 + 2)").message, "Syntax error on token CLOSE_PAREN");
    assert_eq!(eval_error("1 + 2 (").message, "Syntax error on token OPEN_PAREN");
    assert_eq!(eval_error("2 + + 3").message, "Unexpected token PLUS");
    assert_eq!(eval_error("2++3").message, "Unexpected token PLUS");
    assert_eq!(eval_error("2 + * 3").message, "Unexpected token MULTIPLY");
    assert_eq!(eval_error("3 +) 2").message, "Unexpected token CLOSE_PAREN");
    assert_eq!(eval_error("3 + (2*").message, "Unexpected token (end)");
    assert_eq!(eval_error("(3 + 2").message, "Expected ')'");
}

#[test]
fn empty_input_yields_nothing() {
    let mut interpreter = Interpreter::new();
    assert!(interpreter.eval_source("").expect("empty is fine").is_none());
    assert!(interpreter.eval_source("   ").expect("blank is fine").is_none());
}

#[test]
fn lexer_accepts_every_number_form() {
    assert_eq!(eval("0x3p+2"), 12.0);
    assert_eq!(eval("0x1.8p1"), 3.0);
    assert_eq!(eval("0xff"), 255.0);
    assert_eq!(eval(".5 + 1.5"), 2.0);
    assert_eq!(eval("5."), 5.0);
    assert_eq!(eval("3e10 / 10^10"), 3.0);
    assert_eq!(eval("1.2E-3"), 0.0012);
}

#[test]
fn lexer_splits_tokens_at_boundaries() {
    let tokens = lexer::tokenize("3pi").expect("tokenize should succeed");
    assert_eq!(tokens, vec![Token::Number(3.0), Token::Symbol("pi".into())]);

    let tokens = lexer::tokenize("1258make111").expect("tokenize should succeed");
    assert_eq!(tokens.len(), 2);

    // `3e` holds no exponent digits, so the `e` starts a symbol.
    let tokens = lexer::tokenize("3e").expect("tokenize should succeed");
    assert_eq!(tokens, vec![Token::Number(3.0), Token::Symbol("e".into())]);

    let tokens = lexer::tokenize("2^(1.5*2)/(-1.7+(6-0.3))").expect("tokenize should succeed");
    assert_eq!(tokens.len(), 18);
}

#[test]
fn lexer_reports_position_of_bad_input() {
    let diag = lexer::tokenize("3 + $2").expect_err("should reject `$`");
    assert_eq!(diag.message, "Position 5: unexpected character $");

    let long_symbol = "m".repeat(48);
    let diag = lexer::tokenize(&long_symbol).expect_err("should reject long symbol");
    assert_eq!(diag.message, "Position 32: symbol too long");
}

#[test]
fn token_stream_yields_end_forever_once_exhausted() {
    let mut stream = lexer::TokenStream::new(vec![Token::Number(2.0), Token::Plus]);
    assert_eq!(stream.consume(), Token::Number(2.0));
    assert_eq!(stream.consume(), Token::Plus);
    assert_eq!(*stream.peek(), Token::End);
    assert_eq!(stream.consume(), Token::End);
    assert_eq!(stream.consume(), Token::End);
}

#[test]
fn renders_fully_parenthesized_text() {
    let mut interpreter = Interpreter::new();
    let outcome = interpreter
        .eval_source("6.5 * (4 + 3)")
        .expect("should succeed")
        .expect("expression expected");
    assert_eq!(outcome.rendered, "(6.5 * (4 + 3))");
    assert_eq!(outcome.value, 45.5);

    assert_eq!(parse_tree("-0.125").render(1024), "(-0.125)");
    assert_eq!(parse_tree("--0.125").render(1024), "(-(-0.125))");
    assert_eq!(parse_tree("x = 25").render(1024), "(x = 25)");
}

#[test]
fn render_truncates_with_a_marker() {
    let tree = parse_tree("1 + 2");
    assert_eq!(tree.render(1024), "(1 + 2)");
    assert_eq!(tree.render(8), "(1 + 2)");
    assert_eq!(tree.render(7), "(1 + $");
    assert_eq!(tree.render(1), "");
}

#[test]
fn rendered_text_round_trips() {
    for source in [
        "3+4*2/(1-5)^2",
        "2^(1.5*2)/(-1.7+(6-0.3))",
        "-(-0.125)",
        "((2+3)*5)/(4-1)",
    ] {
        let direct = eval(source);
        let rendered = parse_tree(source).render(1024);
        let reparsed = eval(&rendered);
        assert_eq!(direct, reparsed, "{source} -> {rendered}");
    }
}

#[test]
fn count_and_depth_follow_structure() {
    let tree = parse_tree("3.5");
    assert_eq!(tree.count(), 1);
    assert_eq!(tree.depth(), 1);

    let tree = parse_tree("-0.125");
    assert_eq!(tree.count(), 2);
    assert_eq!(tree.depth(), 2);

    let tree = parse_tree("6.5 * (4 + 3)");
    assert_eq!(tree.count(), 5);
    assert_eq!(tree.depth(), 3);

    // Left folds build left-deep trees.
    assert_eq!(parse_tree("3.5 + 0").depth(), 2);
    assert_eq!(parse_tree("3.5 + 0 + 0").depth(), 3);
    assert_eq!(parse_tree("3.5 + 0 + 0 + 0").depth(), 4);
}

#[test]
fn hand_built_trees_evaluate_against_an_environment() {
    let mut env = Environment::new();
    env.store("x", 0.8);
    env.store("y", 0.2);

    let tree = Expr::binary(BinaryOp::Add, Expr::symbol("x"), Expr::symbol("y"));
    assert_eq!(runtime::evaluate(&tree, &mut env).expect("x + y"), 1.0);

    let tree = Expr::binary(BinaryOp::Assign, Expr::symbol("t"), Expr::symbol("x"));
    assert_eq!(runtime::evaluate(&tree, &mut env).expect("t = x"), 0.8);
    assert_eq!(env.retrieve("t"), Some(0.8));

    let tree = Expr::symbol("pi");
    let err = runtime::evaluate(&tree, &mut env).expect_err("pi is unbound");
    assert_eq!(err.message, "Undefined variable: pi");
}

#[test]
fn deep_trees_tear_down_without_overflowing() {
    let mut tree = Expr::value(1.0);
    for _ in 0..500_000 {
        tree = Expr::negate(tree);
    }
    drop(tree);
}
