// End-to-end tests for arithmetic, scoping, printf and error reporting

use minicc::config::{Config, FormatPolicy};
use minicc::diagnostics::{CompileError, Phase};
use minicc::interpreter::RuntimeError;
use minicc::parser::ast::SourceLocation;
use minicc::pipeline;

fn run(body: &str) -> Result<Vec<String>, CompileError> {
    let source = format!("void main() {{\n{}\n}}\n", body);
    pipeline::run_source(&source, &Config::default().with_max_loop_iterations(10_000))
}

fn run_ok(body: &str) -> Vec<String> {
    run(body).unwrap_or_else(|e| panic!("{} failed: {}", body, e))
}

fn error_kind(body: &str) -> (Phase, &'static str) {
    let err = run(body).unwrap_err();
    (err.phase(), err.kind())
}

#[test]
fn test_integer_division_truncates() {
    assert_eq!(
        run_ok(r#"printf("%d %d %d %d\n", -7 / 2, 7 % -2, -7 % 2, 7 / -2);"#),
        vec!["-3 1 -1 -3"]
    );
}

#[test]
fn test_mixed_arithmetic_promotes() {
    assert_eq!(
        run_ok(
            r#"int i; float f; i = 3; f = i / 2; printf("%f ", f); f = i / 2.0; printf("%f\n", f);"#
        ),
        vec!["1.000000 1.500000"]
    );
}

#[test]
fn test_float_to_int_assignment_truncates() {
    assert_eq!(
        run_ok(r#"int i; i = -2.9; printf("%d\n", i);"#),
        vec!["-2"]
    );
}

#[test]
fn test_comparisons_yield_int() {
    assert_eq!(
        run_ok(r#"int t; t = (1.5 > 1) + (2 == 2) + (3 != 3); printf("%d\n", t);"#),
        vec!["2"]
    );
}

#[test]
fn test_if_else_chain() {
    let body = r#"
        int n; n = 15;
        if (n % 15 == 0) { printf("fizzbuzz\n"); }
        else if (n % 3 == 0) { printf("fizz\n"); }
        else { printf("%d\n", n); }
    "#;
    assert_eq!(run_ok(body), vec!["fizzbuzz"]);
}

#[test]
fn test_printf_width_and_precision() {
    assert_eq!(
        run_ok(r#"printf("[%5d][%-4d][%.2f][%8.3f][%i%%]\n", 42, 7, 3.14159, -1.5, 9);"#),
        vec!["[   42][7   ][3.14][  -1.500][9%]"]
    );
}

#[test]
fn test_format_policy_convert() {
    let source = "void main() { float f; f = 2.75; printf(\"%d %f\\n\", f, 3); }";

    let err = pipeline::compile(source).unwrap_err();
    assert_eq!(err.kind(), "format-arg-mismatch");

    let config = Config::default().with_format_policy(FormatPolicy::Convert);
    assert_eq!(
        pipeline::run_source(source, &config).unwrap(),
        vec!["2 3.000000"]
    );
}

#[test]
fn test_block_scoping() {
    assert_eq!(
        error_kind("if (1) { int inner; inner = 1; } inner = 2;"),
        (Phase::Semantic, "undeclared-variable")
    );
    assert_eq!(
        error_kind("int x; if (1) { int x; }"),
        (Phase::Semantic, "redeclaration")
    );
}

#[test]
fn test_error_kinds_by_phase() {
    assert_eq!(error_kind("int x; int x;"), (Phase::Semantic, "redeclaration"));
    assert_eq!(error_kind("x = 1;"), (Phase::Semantic, "undeclared-variable"));
    assert_eq!(
        error_kind("float f; f = f % 2;"),
        (Phase::Semantic, "invalid-operand-type")
    );
    assert_eq!(
        error_kind(r#"printf("%d %d\n", 1);"#),
        (Phase::Semantic, "format-arg-mismatch")
    );
    assert_eq!(
        error_kind(r#"printf("%s\n", 1);"#),
        (Phase::Semantic, "unsupported-format")
    );
    assert_eq!(error_kind("int x = 1 +;"), (Phase::Parse, "unexpected-token"));
    assert_eq!(error_kind("int x; scanf(x);"), (Phase::Parse, "unsupported"));
    assert_eq!(error_kind("int x = 1 # 2;"), (Phase::Lex, "unexpected-character"));
    assert_eq!(error_kind("int z; z = 4 / z;"), (Phase::Runtime, "division-by-zero"));
}

#[test]
fn test_runtime_error_keeps_earlier_output() {
    let program = pipeline::compile(
        "void main() {\n  int z;\n  printf(\"before\\n\");\n  z = 1 / z;\n  printf(\"after\\n\");\n}\n",
    )
    .unwrap();

    let mut interpreter =
        minicc::interpreter::Interpreter::new(&program, Config::default());
    let err = interpreter.run().unwrap_err();

    assert_eq!(
        err,
        RuntimeError::DivisionByZero {
            op: "/",
            location: SourceLocation::new(4, 9),
        }
    );
    assert_eq!(interpreter.lines(), vec!["before"]);
}

#[test]
fn test_float_division_by_zero_fails() {
    assert_eq!(
        error_kind("float f; f = 1.0 / f;"),
        (Phase::Runtime, "division-by-zero")
    );
}

#[test]
fn test_iteration_limit() {
    let source = "void main() { int x; while (1) { x = x + 1; } }";
    let config = Config::default().with_max_loop_iterations(50);
    let err = pipeline::run_source(source, &config).unwrap_err();
    assert_eq!(err.kind(), "iteration-limit-exceeded");

    let program = pipeline::compile(source).unwrap();
    let err = pipeline::execute_ir(&program, &config).unwrap_err();
    assert!(matches!(err, RuntimeError::IterationLimitExceeded { limit: 50, .. }));
}

#[test]
fn test_backends_agree_on_mixed_program() {
    let source = r#"
        void main() {
            int i = 0;
            float acc = 0.5;
            while (i < 6) {
                int sq = i * i;
                if (sq % 2 == 0 && !(i == 4) || i == 5) {
                    acc = acc + sq / 3;
                } else {
                    acc = acc - 1.25;
                }
                printf("%d:%d:%.3f\n", i, sq, acc);
                i = i + 1;
            }
            printf("%f %d\n", -acc, -i % 4);
        }
    "#;
    let config = Config::default().with_max_loop_iterations(100);
    let program = pipeline::compile(source).unwrap();
    let tree = pipeline::execute(&program, &config).unwrap();
    let vm = pipeline::execute_ir(&program, &config).unwrap();

    assert_eq!(tree, vm);
    assert_eq!(tree.len(), 7);
}

#[test]
fn test_rendered_diagnostic() {
    let source = "void main() {\n    int total;\n    total = count * 2;\n}\n";
    let err = pipeline::compile(source).unwrap_err();
    let text = err.render(source, "demo.c");

    assert!(text.starts_with(
        "error[semantic/undeclared-variable]: use of undeclared variable 'count'\n"
    ));
    assert!(text.contains(" --> demo.c:3:13\n"));
    assert!(text.contains("3 |     total = count * 2;\n"));
    assert!(text.ends_with("\n  |             ^\n"));
}

#[test]
fn test_nesting_limit_is_a_parse_error() {
    let nested = format!("int x; x = {}1{};", "(".repeat(5_000), ")".repeat(5_000));
    assert_eq!(error_kind(&nested), (Phase::Parse, "nesting-too-deep"));

    let chain = format!("int x; x = {};", vec!["x"; 2_000].join(" * "));
    assert_eq!(error_kind(&chain), (Phase::Parse, "nesting-too-deep"));

    let moderate = format!("int x; x = {}2{}; printf(\"%d\\n\", x);", "(".repeat(60), ")".repeat(60));
    assert_eq!(run_ok(&moderate), vec!["2"]);
}
