use crate::test::run_main;
use crate::*;

fn sub_program(lhs: Value, rhs: Value, optype: DataType) -> Vec<Value> {
    vec![
        instr!(LOADCONST),
        lhs,
        instr!(LOADCONST),
        rhs,
        make_typed_instruction(OpCode::SUB, optype),
        instr!(HALT),
    ]
}

#[test]
fn i64_negative_result() {
    let machine = run_main(sub_program(
        Value::from(2i64),
        Value::from(5i64),
        DataType::I64,
    ));
    assert_eq!(machine.stack_top().unwrap().i64(), -3);
}

#[test]
fn i16_wraps() {
    let machine = run_main(sub_program(
        Value::from(i16::min_value()),
        Value::from(1i16),
        DataType::I16,
    ));
    assert_eq!(machine.stack_top().unwrap().i16(), i16::max_value());
}

#[test]
fn f64() {
    let machine = run_main(sub_program(
        Value::from(1.0f64),
        Value::from(0.25f64),
        DataType::F64,
    ));
    assert_eq!(machine.stack_top().unwrap().f64(), 0.75);
}
