use crate::test::run_main;
use crate::*;

#[test]
fn jmpif_skips_when_flag_set() {
    // loadconst !i32 0, loadconst !i8 1, jmpif end, loadconst !i32 42,
    // label end, halt. The displacement is end(7) - jmpif(4) = 3.
    let machine = run_main(vec![
        instr!(LOADCONST),
        Value::from(0i32),
        instr!(LOADCONST),
        Value::from(1i8),
        instr_d!(JMPIF, 3),
        instr!(LOADCONST),
        Value::from(42i32),
        instr!(HALT),
    ]);

    assert_eq!(machine.stack().len(), 1);
    assert_eq!(machine.stack_top().unwrap().i32(), 0);
}

#[test]
fn jmpif_falls_through_when_flag_clear() {
    let machine = run_main(vec![
        instr!(LOADCONST),
        Value::from(0i32),
        instr!(LOADCONST),
        Value::from(0i8),
        instr_d!(JMPIF, 3),
        instr!(LOADCONST),
        Value::from(42i32),
        instr!(HALT),
    ]);

    assert_eq!(machine.stack().len(), 2);
    assert_eq!(machine.stack_top().unwrap().i32(), 42);
}

#[test]
fn jmp_forward() {
    // The skipped slot would fault as an instruction if executed.
    let machine = run_main(vec![
        instr_d!(JMP, 2),
        Value::from_raw(0xFF),
        instr!(HALT),
    ]);
    assert!(machine.stack().is_empty());
}

#[test]
fn jmp_backward_counts_down() {
    // Counts local 0 down from 3 to 0.
    let machine = run_main(vec![
        instr_d!(CREATELOCALS, 1),          // 0
        instr_d!(STORECONST, 0),            // 1
        Value::from(3i64),                  // 2
        instr_d!(LOAD, 0),                  // 3: label loop
        instr!(LOADCONST),                  // 4
        Value::from(0i64),                  // 5
        instr_t!(EQ, I64),                  // 6
        instr_d!(JMPIF, 9),                 // 7 -> end(16)
        instr_d!(LOAD, 0),                  // 8
        instr!(LOADCONST),                  // 9
        Value::from(1i64),                  // 10
        instr_t!(SUB, I64),                 // 11
        instr_d!(STORE, 0),                 // 12
        instr_d!(JMP, -10),                 // 13 -> loop(3)
        Value::from_raw(0xFF),              // 14: never reached
        Value::from_raw(0xFF),              // 15
        instr_d!(LOAD, 0),                  // 16: label end
        instr!(HALT),                       // 17
    ]);

    assert_eq!(machine.stack_top().unwrap().i64(), 0);
}
