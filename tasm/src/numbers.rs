use crate::{new_parser_error, Result, Rule};
use num::traits::{Bounded, NumCast, ToPrimitive};
use pest::iterators::Pair;
use tvm::{DataType, Value};

/// Parses an integer literal with automatic base detection: `0x` prefixed
/// hexadecimal, `0` prefixed octal, decimal otherwise. Out-of-range values
/// for the requested width are an error.
pub fn parse_int<T>(pair: &Pair<Rule>) -> Result<T>
where
    T: Bounded + NumCast + ToPrimitive + Copy,
{
    let wide = parse_i64(pair)?;

    let min = T::min_value().to_i64().unwrap();
    let max = T::max_value().to_i64().unwrap();
    if wide < min || wide > max {
        return Err(new_parser_error(
            pair.as_span(),
            "Literal out of range.".to_owned(),
        ));
    }

    Ok(NumCast::from(wide).unwrap())
}

fn parse_i64(pair: &Pair<Rule>) -> Result<i64> {
    let text = pair.as_str();
    let (sign, body) = if text.starts_with('-') {
        (-1i64, &text[1..])
    } else {
        (1i64, text)
    };

    let (base, digits) = if body.starts_with("0x") || body.starts_with("0X") {
        (16, &body[2..])
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    let value = i64::from_str_radix(digits, base).map_err(|err| {
        new_parser_error(pair.as_span(), format!("Parsing integer failed: {}.", err))
    })?;

    Ok(sign * value)
}

/// Parses a `!type` literal into a single data word. PTR literals are parsed
/// in the i64 lane.
pub fn parse_literal(data_type: DataType, pair: &Pair<Rule>) -> Result<Value> {
    match data_type {
        DataType::I8 => Ok(Value::from(parse_int::<i8>(pair)?)),
        DataType::I16 => Ok(Value::from(parse_int::<i16>(pair)?)),
        DataType::I32 => Ok(Value::from(parse_int::<i32>(pair)?)),
        DataType::I64 | DataType::PTR => Ok(Value::from(parse_int::<i64>(pair)?)),
        DataType::F32 => Ok(Value::from(parse_float::<f32>(pair)?)),
        DataType::F64 => Ok(Value::from(parse_float::<f64>(pair)?)),
        // The grammar only produces the types above.
        DataType::NONE => unreachable!(),
    }
}

fn parse_float<T>(pair: &Pair<Rule>) -> Result<T>
where
    T: std::str::FromStr<Err = std::num::ParseFloatError>,
{
    pair.as_str().parse().map_err(|err| {
        new_parser_error(pair.as_span(), format!("Parsing float failed: {}.", err))
    })
}
