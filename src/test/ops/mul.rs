use crate::test::run_main;
use crate::*;

fn mul_program(lhs: Value, rhs: Value, optype: DataType) -> Vec<Value> {
    vec![
        instr!(LOADCONST),
        lhs,
        instr!(LOADCONST),
        rhs,
        make_typed_instruction(OpCode::MUL, optype),
        instr!(HALT),
    ]
}

#[test]
fn i32() {
    let machine = run_main(mul_program(
        Value::from(-6i32),
        Value::from(7i32),
        DataType::I32,
    ));
    assert_eq!(machine.stack_top().unwrap().i32(), -42);
}

#[test]
fn i8_wraps() {
    let machine = run_main(mul_program(
        Value::from(64i8),
        Value::from(2i8),
        DataType::I8,
    ));
    assert_eq!(machine.stack_top().unwrap().i8(), -128);
}

#[test]
fn f32() {
    let machine = run_main(mul_program(
        Value::from(1.5f32),
        Value::from(4.0f32),
        DataType::F32,
    ));
    assert_eq!(machine.stack_top().unwrap().f32(), 6.0);
}
