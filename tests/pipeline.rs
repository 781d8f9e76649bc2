use exprasm::{CompileError, Config, transduce};

const SHUTDOWN: &str = "MOV r0 [0]\nMOV r1 [4]\nMOV r2 [8]\nEXIT 0\n";

fn run(source: &str) -> (String, Result<(), CompileError>) {
  transduce(source, &Config::default())
}

fn run_ok(source: &str) -> String {
  let (output, result) = run(source);
  if let Err(err) = result {
    panic!("{source:?} failed: {err}\n{output}");
  }
  output
}

#[test]
fn empty_input_only_shuts_down() {
  assert_eq!(run_ok(""), SHUTDOWN);
  assert_eq!(run_ok("\n\n"), SHUTDOWN);
}

#[test]
fn literal_round_trips_through_slot() {
  for n in [0, 1, 42, 65535, 2147483647] {
    let output = run_ok(&format!("x = {n}\nx\n"));
    assert_eq!(
      output,
      format!("MOV r0 {n}\nMOV [0] r0\nMOV r0 [0]\n{SHUTDOWN}")
    );
  }
}

#[test]
fn full_program() {
  let source = "x = 5\ny = x * 2 + 1\nz = (x | y) ^ 3\ncount = -z\n";
  let expected = "\
MOV r0 5
MOV [0] r0
MOV r0 [0]
MOV r1 2
MUL r0 r1
MOV r1 1
ADD r0 r1
MOV [4] r0
MOV r0 [0]
MOV r1 [4]
OR r0 r1
MOV r1 3
XOR r0 r1
MOV [8] r0
MOV r0 0
MOV r1 [8]
SUB r0 r1
MOV [12] r0
";
  assert_eq!(run_ok(source), format!("{expected}{SHUTDOWN}"));
}

#[test]
fn expression_statement_is_not_an_assignment() {
  assert_eq!(
    run_ok("x+1\n"),
    format!("MOV r0 [0]\nMOV r1 1\nADD r0 r1\n{SHUTDOWN}")
  );
}

#[test]
fn compound_assignment_and_increment() {
  let compound = run_ok("x = 4\nx += 2\n");
  let expanded = run_ok("x = 4\nx = x + 2\n");
  let tail = "MOV r0 [0]\nMOV r1 2\nADD r0 r1\nMOV [0] r0\n";
  assert!(compound.contains(tail));
  assert!(expanded.contains(tail));
  assert_eq!(compound, expanded);

  assert_eq!(
    run_ok("y = 5\n++y\n"),
    format!("MOV r0 5\nMOV [4] r0\nMOV r0 [4]\nMOV r1 1\nADD r0 r1\nMOV [4] r0\n{SHUTDOWN}")
  );
  assert!(run_ok("y -= 3\n").starts_with("MOV r0 [4]\nMOV r1 3\nSUB r0 r1\nMOV [4] r0\n"));
}

#[test]
fn whitespace_and_final_line_without_newline() {
  assert_eq!(
    run_ok(" \tz\t=\t7 "),
    format!("MOV r0 7\nMOV [8] r0\n{SHUTDOWN}")
  );
}

#[test]
fn constant_division_by_zero_aborts() {
  let (output, result) = run("x = 1\n1/0\nx = 2\n");
  assert!(matches!(result, Err(CompileError::DivideByZero)));
  assert_eq!(output, "MOV r0 1\nMOV [0] r0\nMOV r0 1\nMOV r1 0\nEXIT 1\n");
}

#[test]
fn division_by_zero_with_variable_continues() {
  assert_eq!(
    run_ok("x = 9\ny = x/0\n"),
    format!("MOV r0 9\nMOV [0] r0\nMOV r0 [0]\nMOV r1 0\nDIV r0 r1\nMOV [4] r0\n{SHUTDOWN}")
  );
}

#[test]
fn unterminated_paren_stops_the_run() {
  let (output, result) = run("(1+2\nx = 1\n");
  assert!(matches!(result, Err(CompileError::MismatchedParen { .. })));
  assert_eq!(output, "EXIT 1\n");
}

#[test]
fn unbound_read_is_fatal() {
  let (output, result) = run("y = 1\nw = v + 1\n");
  assert!(matches!(
    result,
    Err(CompileError::NotFound { ref name }) if name == "v"
  ));
  assert_eq!(output, "MOV r0 1\nMOV [4] r0\nEXIT 1\n");

  // Writing first binds the name.
  assert!(run("v = 2\nw = v + 1\nw\n").1.is_ok());
}

#[test]
fn syntax_errors_emit_only_the_failure_marker() {
  for source in ["x = \n", "1 = x\n", "x y\n", "x++\n", "++3\n", "x = 1 ) \n", "x % 2\n"] {
    let (output, result) = run(source);
    assert!(result.is_err(), "{source:?} should fail");
    assert_eq!(output, "EXIT 1\n", "{source:?}");
  }
}

#[test]
fn symbol_table_capacity_is_fatal() {
  let config = Config {
    symbol_capacity: 5,
    ..Config::default()
  };
  let (output, result) = transduce("a = 1\nb = 2\nc = 3\n", &config);
  assert!(matches!(
    result,
    Err(CompileError::TableExhausted { ref name, capacity: 5 }) if name == "c"
  ));
  assert!(output.ends_with("MOV [16] r0\nMOV r0 3\nEXIT 1\n"));
}

#[test]
fn error_report_points_at_column() {
  let (_, result) = run("x = (1 + 2\n");
  let err = result.unwrap_err();
  assert_eq!(
    err.report("x = (1 + 2\n"),
    "'x = (1 + 2'\n           ^ expected \")\", but got \"\\n\""
  );
}
