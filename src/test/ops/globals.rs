use crate::test::{run_main_fault, run_units};
use crate::*;

#[test]
fn getglobal_pushes_the_unit_start() {
    let mut main = vec![instr!(GETGLOBAL)];
    main.extend(Value::pack_str("blob"));
    main.push(instr!(HALT));
    let main_len = main.len();

    let blob = DataUnit::new("blob", vec![Value::from(1i64), Value::from(2i64)]);

    let machine = run_units(vec![DataUnit::new("main", main), blob]);
    assert_eq!(machine.stack_top().unwrap().ptr(), main_len as u64);
}

#[test]
fn getglobal_works_for_functions_too() {
    let mut main = vec![instr!(GETGLOBAL)];
    main.extend(Value::pack_str("main"));
    main.push(instr!(HALT));

    let machine = run_units(vec![DataUnit::new("main", main)]);
    assert_eq!(machine.stack_top().unwrap().ptr(), 0);
}

#[test]
fn unknown_global_is_fatal() {
    let mut main = vec![instr!(GETGLOBAL)];
    main.extend(Value::pack_str("missing"));
    main.push(instr!(HALT));

    assert_eq!(
        run_main_fault(main),
        Fault::UnknownGlobal("missing".to_owned())
    );
}
