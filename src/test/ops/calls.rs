use crate::test::{run_main_fault, run_units};
use crate::*;

fn fact_unit() -> DataUnit {
    let mut data = vec![
        instr_d!(LOAD, 0),       // 0
        instr!(LOADCONST),       // 1
        Value::from(0i64),       // 2
        instr_t!(EQ, I64),       // 3
        instr_d!(JMPIF, 10),     // 4 -> 14
        instr_d!(LOAD, 0),       // 5
        instr_d!(LOAD, 0),       // 6
        instr!(LOADCONST),       // 7
        Value::from(1i64),       // 8
        instr_t!(SUB, I64),      // 9
        instr_d!(CALL, 1),       // 10
    ];
    data.extend(Value::pack_str("fact")); // 11
    data.extend(vec![
        instr_t!(MUL, I64),      // 12
        instr_d!(RET, 1),        // 13
        instr!(LOADCONST),       // 14
        Value::from(1i64),       // 15
        instr_d!(RET, 1),        // 16
    ]);
    DataUnit::new("fact", data)
}

fn main_calling_fact(argument: i64) -> DataUnit {
    let mut data = vec![
        instr!(LOADCONST),
        Value::from(argument),
        instr_d!(CALL, 1),
    ];
    data.extend(Value::pack_str("fact"));
    data.push(instr!(HALT));
    DataUnit::new("main", data)
}

#[test]
fn recursive_factorial() {
    let machine = run_units(vec![fact_unit(), main_calling_fact(5)]);
    assert_eq!(machine.stack().len(), 1);
    assert_eq!(machine.stack_top().unwrap().i64(), 120);
}

#[test]
fn factorial_of_zero() {
    let machine = run_units(vec![fact_unit(), main_calling_fact(0)]);
    assert_eq!(machine.stack_top().unwrap().i64(), 1);
}

#[test]
fn callindirect_reaches_the_same_function() {
    let mut main = vec![
        instr!(LOADCONST),
        Value::from(5i64),
        instr!(GETGLOBAL),
    ];
    main.extend(Value::pack_str("fact"));
    main.push(instr_d!(CALLINDIRECT, 1));
    main.push(instr!(HALT));

    let machine = run_units(vec![fact_unit(), DataUnit::new("main", main)]);
    assert_eq!(machine.stack_top().unwrap().i64(), 120);
}

#[test]
fn call_with_no_arguments_does_not_pop() {
    let mut main = vec![
        instr!(LOADCONST),
        Value::from(7i64),
        instr_d!(CALL, 0),
    ];
    main.extend(Value::pack_str("noop"));
    main.push(instr!(HALT));

    let noop = DataUnit::new("noop", vec![instr_d!(RET, 0)]);

    let machine = run_units(vec![noop, DataUnit::new("main", main)]);
    assert_eq!(machine.stack().len(), 1);
    assert_eq!(machine.stack_top().unwrap().i64(), 7);
}

#[test]
fn caller_locals_survive_the_call() {
    let mut main = vec![
        instr_d!(CREATELOCALS, 1),
        instr_d!(STORECONST, 0),
        Value::from(11i64),
        instr_d!(CALL, 0),
    ];
    main.extend(Value::pack_str("callee"));
    main.extend(vec![instr_d!(LOAD, 0), instr!(HALT)]);

    // The callee grows its own frame, which must vanish on return.
    let callee = DataUnit::new(
        "callee",
        vec![
            instr_d!(CREATELOCALS, 2),
            instr_d!(STORECONST, 1),
            Value::from(99i64),
            instr_d!(RET, 0),
        ],
    );

    let machine = run_units(vec![callee, DataUnit::new("main", main)]);
    assert_eq!(machine.stack_top().unwrap().i64(), 11);
}

#[test]
fn callee_cannot_pop_into_the_caller_frame() {
    // The callee pops before pushing anything; the caller's values must stay
    // intact behind the frame boundary.
    let mut main = vec![
        instr!(LOADCONST),
        Value::from(1i64),
        instr_d!(CALL, 0),
    ];
    main.extend(Value::pack_str("bad"));
    main.push(instr!(HALT));

    let bad = DataUnit::new("bad", vec![instr_t!(ADD, I64), instr_d!(RET, 0)]);

    let mut machine = Machine::new();
    machine.load_units(vec![bad, DataUnit::new("main", main)]);

    assert_eq!(machine.run("main"), Err(Fault::FrameViolation));
    assert_eq!(machine.stack().len(), 1);
    assert_eq!(machine.stack_top().unwrap().i64(), 1);
}

#[test]
fn unknown_function_is_fatal() {
    let mut main = vec![instr_d!(CALL, 0)];
    main.extend(Value::pack_str("missing"));
    main.push(instr!(HALT));

    assert_eq!(
        run_main_fault(main),
        Fault::UnknownFunction("missing".to_owned())
    );
}
