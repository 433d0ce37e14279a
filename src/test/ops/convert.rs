use crate::test::run_main;
use crate::*;

fn convert_program(value: Value, from: DataType, to: DataType) -> Vec<Value> {
    vec![
        instr!(LOADCONST),
        value,
        make_convert_instruction(from, to),
        instr!(HALT),
    ]
}

#[test]
fn i64_to_f64() {
    let machine = run_main(convert_program(
        Value::from(5i64),
        DataType::I64,
        DataType::F64,
    ));
    assert_eq!(machine.stack_top().unwrap().f64(), 5.0);
}

#[test]
fn f64_to_i32_truncates_toward_zero() {
    let machine = run_main(convert_program(
        Value::from(2.75f64),
        DataType::F64,
        DataType::I32,
    ));
    assert_eq!(machine.stack_top().unwrap().i32(), 2);

    let machine = run_main(convert_program(
        Value::from(-2.75f64),
        DataType::F64,
        DataType::I32,
    ));
    assert_eq!(machine.stack_top().unwrap().i32(), -2);
}

#[test]
fn f32_to_f64() {
    let machine = run_main(convert_program(
        Value::from(1.5f32),
        DataType::F32,
        DataType::F64,
    ));
    assert_eq!(machine.stack_top().unwrap().f64(), 1.5);
}

#[test]
fn i64_to_i8_truncates() {
    let machine = run_main(convert_program(
        Value::from(300i64),
        DataType::I64,
        DataType::I8,
    ));
    assert_eq!(machine.stack_top().unwrap().i8(), 44);
}

#[test]
fn i8_sign_extends_to_i64() {
    let machine = run_main(convert_program(
        Value::from(-1i8),
        DataType::I8,
        DataType::I64,
    ));
    assert_eq!(machine.stack_top().unwrap().i64(), -1);
}

#[test]
fn same_type_is_identity() {
    for optype in &[DataType::I8, DataType::I32, DataType::I64, DataType::F64] {
        let machine = run_main(convert_program(Value::from(7i64), *optype, *optype));
        assert_eq!(machine.stack().len(), 1);
        assert_eq!(machine.stack_top().unwrap().i64(), 7);
    }
}

#[test]
fn ptr_target_leaves_value_untouched() {
    let machine = run_main(convert_program(
        Value::from(7i64),
        DataType::I64,
        DataType::PTR,
    ));
    assert_eq!(machine.stack().len(), 1);
    assert_eq!(machine.stack_top().unwrap().i64(), 7);
}
