use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0},
    combinator::{map_res, opt, value},
    number::complete::recognize_float,
    sequence::{preceded, terminated},
    IResult, Parser,
};

use crate::error::DecoError;
use crate::gas::{GasMix, AIR_O2_PERCENT};

/// Parse a gas label into a gas mix.
///
/// Accepted forms (case-insensitive): `air`, `oxygen`, `O2`, `EAN32`,
/// `NX32`, `Nitrox 32`, `32` and `32%`.
pub fn parse_gas_mix(input: &str) -> Result<GasMix, DecoError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DecoError::GasParse {
            position: 0,
            message: "empty gas label".to_string(),
        });
    }

    let percent = match parse_label(input) {
        Ok((remaining, percent)) => {
            let remaining = remaining.trim();
            if !remaining.is_empty() {
                return Err(DecoError::GasParse {
                    position: input.len() - remaining.len(),
                    message: format!("unexpected characters: '{}'", remaining),
                });
            }
            percent
        }
        Err(_) => {
            return Err(DecoError::GasParse {
                position: 0,
                message: format!("unrecognised gas label '{}'", input),
            })
        }
    };

    if !(percent > 0.0 && percent <= 100.0) {
        return Err(DecoError::GasParse {
            position: 0,
            message: format!("oxygen content {}% is outside (0, 100]", percent),
        });
    }

    Ok(GasMix::from_percent(percent))
}

fn parse_label(input: &str) -> IResult<&str, f64> {
    alt((
        value(AIR_O2_PERCENT, tag_no_case("air")),
        value(100.0, alt((tag_no_case("oxygen"), tag_no_case("o2")))),
        preceded(nitrox_prefix, preceded(multispace0, parse_percentage)),
        parse_percentage,
    ))
    .parse(input)
}

fn nitrox_prefix(input: &str) -> IResult<&str, &str> {
    alt((
        tag_no_case("nitrox"),
        tag_no_case("ean"),
        tag_no_case("nx"),
    ))
    .parse(input)
}

fn parse_percentage(input: &str) -> IResult<&str, f64> {
    terminated(
        map_res(recognize_float, |s: &str| s.parse::<f64>()),
        opt(preceded(multispace0, char('%'))),
    )
    .parse(input)
}
