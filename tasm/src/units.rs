use crate::numbers::{parse_int, parse_literal};
use crate::{new_parser_error, Result, Rule};
use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Span;
use std::collections::HashMap;
use std::str::FromStr;
use tvm::{
    make_convert_instruction, make_data_instruction, make_instruction, make_typed_instruction,
    DataType, DataUnit, InstructionHeader, OpCode, Value,
};
use util::ParseEnumError;

type LabelMap<'i> = HashMap<&'i str, usize>;

struct JumpSite<'i> {
    offset: usize,
    label: Span<'i>,
}

pub fn process_module(pair: Pair<Rule>) -> Result<Vec<DataUnit>> {
    debug_assert_matches!(pair.as_rule(), Rule::program);

    let mut units = Vec::new();
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::function => units.push(process_function(item)?),
            Rule::global => units.push(process_global(item)?),
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    Ok(units)
}

fn process_enum_inner<T: FromStr<Err = ParseEnumError>>(pair: &Pair<Rule>) -> Result<T> {
    pair.as_str()
        .to_uppercase()
        .parse()
        .map_err(|err| new_parser_error(pair.as_span(), format!("{}", err)))
}

fn process_embed_type(pair: Pair<Rule>) -> Result<DataType> {
    process_enum_inner(&pair.into_inner().next().unwrap())
}

fn process_embed_data(pair: Pair<Rule>) -> Result<i32> {
    parse_int(&pair.into_inner().next().unwrap())
}

fn process_data_literal(pair: Pair<Rule>) -> Result<Value> {
    debug_assert_matches!(pair.as_rule(), Rule::data_literal);
    let mut pairs = pair.into_inner();
    let data_type = process_enum_inner(&pairs.next().unwrap())?;
    parse_literal(data_type, &pairs.next().unwrap())
}

fn string_text<'i>(pair: Pair<'i, Rule>) -> &'i str {
    debug_assert_matches!(pair.as_rule(), Rule::string_literal);
    pair.into_inner().next().unwrap().as_str()
}

fn process_global(pair: Pair<Rule>) -> Result<DataUnit> {
    let mut pairs = pair.into_inner();
    let name = pairs.next().unwrap().as_str().to_owned();

    let mut data = Vec::new();
    for literal in pairs {
        match literal.as_rule() {
            Rule::string_literal => data.extend(Value::pack_str(string_text(literal))),
            Rule::data_literal => data.push(process_data_literal(literal)?),
            _ => unreachable!(),
        }
    }

    Ok(DataUnit::new(name, data))
}

fn process_function(pair: Pair<Rule>) -> Result<DataUnit> {
    let mut pairs = pair.into_inner();
    let name = pairs.next().unwrap().as_str().to_owned();

    let mut data = Vec::new();
    let mut labels = LabelMap::new();
    let mut jump_sites = Vec::new();

    for statement in pairs {
        match statement.as_rule() {
            Rule::label_decl => {
                let name_pair = statement.into_inner().next().unwrap();
                let span = name_pair.as_span();
                if labels.contains_key(span.as_str()) {
                    return Err(new_parser_error(span, "Label already exists.".to_owned()));
                }
                labels.insert(span.as_str(), data.len());
            }
            Rule::instruction => process_instruction(statement, &mut data, &mut jump_sites)?,
            _ => unreachable!(),
        }
    }

    backpatch(&mut data, &labels, &jump_sites)?;
    Ok(DataUnit::new(name, data))
}

fn process_instruction<'i>(
    pair: Pair<'i, Rule>,
    data: &mut Vec<Value>,
    jump_sites: &mut Vec<JumpSite<'i>>,
) -> Result<()> {
    let inner = pair.into_inner().next().unwrap();
    let rule = inner.as_rule();
    let mut pairs = inner.into_inner();

    match rule {
        Rule::instr_plain => {
            let code = process_enum_inner(&pairs.next().unwrap())?;
            data.push(make_instruction(code));
        }
        Rule::instr_idx => {
            let code = process_enum_inner(&pairs.next().unwrap())?;
            let operand = process_embed_data(pairs.next().unwrap())?;
            data.push(make_data_instruction(code, operand));
        }
        Rule::instr_const => {
            pairs.next();
            let literal = process_data_literal(pairs.next().unwrap())?;
            data.push(make_instruction(OpCode::LOADCONST));
            data.push(literal);
        }
        Rule::instr_storeconst => {
            pairs.next();
            let index = process_embed_data(pairs.next().unwrap())?;
            let literal = process_data_literal(pairs.next().unwrap())?;
            data.push(make_data_instruction(OpCode::STORECONST, index));
            data.push(literal);
        }
        Rule::instr_typed => {
            let code = process_enum_inner(&pairs.next().unwrap())?;
            let optype = process_embed_type(pairs.next().unwrap())?;
            data.push(make_typed_instruction(code, optype));
        }
        Rule::instr_convert => {
            pairs.next();
            let from = process_embed_type(pairs.next().unwrap())?;
            let to = process_embed_type(pairs.next().unwrap())?;
            data.push(make_convert_instruction(from, to));
        }
        Rule::instr_call => {
            pairs.next();
            let argc = process_embed_data(pairs.next().unwrap())?;
            let callee = string_text(pairs.next().unwrap());
            data.push(make_data_instruction(OpCode::CALL, argc));
            data.extend(Value::pack_str(callee));
        }
        Rule::instr_jump => {
            let code = process_enum_inner(&pairs.next().unwrap())?;
            let label = pairs.next().unwrap().as_span();
            jump_sites.push(JumpSite {
                offset: data.len(),
                label,
            });
            data.push(make_instruction(code));
        }
        Rule::instr_getglobal => {
            pairs.next();
            let global = string_text(pairs.next().unwrap());
            data.push(make_instruction(OpCode::GETGLOBAL));
            data.extend(Value::pack_str(global));
        }
        _ => unreachable!(),
    }

    Ok(())
}

/// Fills in the displacement of every recorded jump once the label offsets
/// of the enclosing function are known.
fn backpatch(data: &mut [Value], labels: &LabelMap, jump_sites: &[JumpSite]) -> Result<()> {
    for site in jump_sites {
        let target = *labels.get(site.label.as_str()).ok_or_else(|| {
            new_parser_error(
                site.label.clone(),
                format!("Unknown label: \"{}\".", site.label.as_str()),
            )
        })?;

        let mut header = InstructionHeader::decode(data[site.offset]).unwrap();
        header.data = (target as i64 - site.offset as i64) as i32;
        data[site.offset] = header.encode();
    }

    Ok(())
}
