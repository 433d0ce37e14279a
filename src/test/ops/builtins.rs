use crate::test::SharedOutput;
use crate::*;

fn run_capturing(units: Vec<DataUnit>) -> (Machine, SharedOutput) {
    let output = SharedOutput::default();
    let mut machine = Machine::new();
    machine.set_output(Box::new(output.clone()));
    machine.load_units(units);
    machine.run("main").unwrap();
    (machine, output)
}

fn print_program(value: Value, builtin: &str) -> Vec<Value> {
    let mut main = vec![instr!(LOADCONST), value, instr_d!(CALL, 1)];
    main.extend(Value::pack_str(builtin));
    main.push(instr!(HALT));
    main
}

#[test]
fn printi64_pops_and_prints() {
    let (machine, output) = run_capturing(vec![DataUnit::new(
        "main",
        print_program(Value::from(7i64), "__printi64"),
    )]);

    assert_eq!(output.take(), "7");
    assert!(machine.stack().is_empty());
}

#[test]
fn printi8_prints_negative_numbers() {
    let (_, output) = run_capturing(vec![DataUnit::new(
        "main",
        print_program(Value::from(-3i8), "__printi8"),
    )]);
    assert_eq!(output.take(), "-3");
}

#[test]
fn printchar_prints_the_i8_lane_as_a_character() {
    let (_, output) = run_capturing(vec![DataUnit::new(
        "main",
        print_program(Value::from(b'A' as i8), "__printchar"),
    )]);
    assert_eq!(output.take(), "A");
}

#[test]
fn printf64_prints_the_f64_lane() {
    let (_, output) = run_capturing(vec![DataUnit::new(
        "main",
        print_program(Value::from(0.5f64), "__printf64"),
    )]);
    assert_eq!(output.take(), "0.5");
}

#[test]
fn printf32_prints_the_f32_lane() {
    let (_, output) = run_capturing(vec![DataUnit::new(
        "main",
        print_program(Value::from(1.25f32), "__printf32"),
    )]);
    assert_eq!(output.take(), "1.25");
}

#[test]
fn printnl_pops_nothing() {
    let mut main = vec![instr!(LOADCONST), Value::from(1i64), instr_d!(CALL, 0)];
    main.extend(Value::pack_str("__printnl"));
    main.push(instr!(HALT));

    let (machine, output) = run_capturing(vec![DataUnit::new("main", main)]);
    assert_eq!(output.take(), "\n");
    assert_eq!(machine.stack().len(), 1);
}

#[test]
fn printstr_follows_the_pointer() {
    let mut main = vec![instr!(GETGLOBAL)];
    main.extend(Value::pack_str("greeting"));
    main.push(instr_d!(CALL, 1));
    main.extend(Value::pack_str("__printstr"));
    main.push(instr!(HALT));

    let greeting = DataUnit::new("greeting", Value::pack_str("hello"));

    let (machine, output) = run_capturing(vec![DataUnit::new("main", main), greeting]);
    assert_eq!(output.take(), "hello");
    assert!(machine.stack().is_empty());
}
