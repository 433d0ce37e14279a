use std::collections::HashMap;

use super::core::Core;
use super::Fault;

pub type Builtin = fn(&mut Core, i32) -> Result<(), Fault>;

/// Host functions reachable through the normal call path. The argument count
/// is a hint only; every entry except `__printnl` pops exactly one value
/// from the operand stack.
pub fn table() -> HashMap<&'static str, Builtin> {
    let mut table: HashMap<&'static str, Builtin> = HashMap::new();

    table.insert("__printchar", print_char);
    table.insert("__printi8", print_i8);
    table.insert("__printi16", print_i16);
    table.insert("__printi32", print_i32);
    table.insert("__printi64", print_i64);
    table.insert("__printf32", print_f32);
    table.insert("__printf64", print_f64);
    table.insert("__printstr", print_str);
    table.insert("__printnl", print_newline);

    table
}

fn print_char(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.i8() as u8 as char);
    Ok(())
}

fn print_i8(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.i8());
    Ok(())
}

fn print_i16(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.i16());
    Ok(())
}

fn print_i32(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.i32());
    Ok(())
}

fn print_i64(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.i64());
    Ok(())
}

fn print_f32(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.f32());
    Ok(())
}

fn print_f64(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    core.print(value.f64());
    Ok(())
}

fn print_str(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    let value = core.pop()?;
    let text = core.image_str(value.ptr() as usize);
    core.print(text);
    Ok(())
}

fn print_newline(core: &mut Core, _argc: i32) -> Result<(), Fault> {
    core.print('\n');
    Ok(())
}
