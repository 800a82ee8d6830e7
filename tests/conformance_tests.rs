// Conformance tests against the sample programs in demos/

use minicc::config::Config;
use minicc::pipeline;

const SAMPLE: &str = include_str!("../demos/samp1.c");
const PALINDROME: &str = include_str!("../demos/test.c");

fn config() -> Config {
    Config::default().with_max_loop_iterations(10_000)
}

#[test]
fn test_sample_program_output() {
    let lines = pipeline::run_source(SAMPLE, &config()).expect("Execution failed");

    let mut expected = vec![
        "Example 1 - Initial result: 20.000000".to_string(),
        "Result was <= 20, added 5: 25.000000".to_string(),
    ];
    for x in (0..10).rev() {
        expected.push(format!(
            "In while loop, x = {}, result = {}.000000",
            x,
            35 - x
        ));
    }
    expected.push(String::new());
    expected.push("Example 2 - Palindrome Checker".to_string());
    expected.push("Testing number: 121".to_string());
    expected.push("121 is a palindrome.".to_string());

    assert_eq!(lines, expected);
}

#[test]
fn test_palindrome_fixture() {
    let lines = pipeline::run_source(PALINDROME, &config()).expect("Execution failed");
    assert_eq!(lines, vec!["Enter an integer: 5 is a palindrome."]);
}

#[test]
fn test_palindrome_inputs() {
    for (num, verdict) in [
        (121, "121 is a palindrome."),
        (123, "123 is not a palindrome."),
        (0, "0 is a palindrome."),
        (1221, "1221 is a palindrome."),
    ] {
        let source = PALINDROME.replace("num = 5;", &format!("num = {};", num));
        let lines = pipeline::run_source(&source, &config()).expect("Execution failed");
        assert_eq!(lines, vec![format!("Enter an integer: {}", verdict)]);
    }
}

#[test]
fn test_fixtures_agree_on_both_backends() {
    for source in [SAMPLE, PALINDROME] {
        let program = pipeline::compile_with(source, &config()).expect("Check failed");
        assert_eq!(
            pipeline::execute(&program, &config()).unwrap(),
            pipeline::execute_ir(&program, &config()).unwrap()
        );
    }
}

#[test]
fn test_parsing_is_stable() {
    let first = pipeline::parse(SAMPLE).unwrap();
    let second = pipeline::parse(SAMPLE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_runs_are_deterministic() {
    let program = pipeline::compile(SAMPLE).unwrap();
    let first = pipeline::execute(&program, &config()).unwrap();
    let second = pipeline::execute(&program, &config()).unwrap();
    assert_eq!(first, second);
}
