//! Parsing of field values given on the command line.

use anyhow::{bail, Context, Result};
use ark_ff::PrimeField;
use constraints::Assignment;

/// Parses a decimal or `0x` hex value, optionally negated with a leading `-`.
/// Values wider than the field are reduced.
pub fn parse_field<F: PrimeField>(raw: &str) -> Result<F> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16u32, hex),
        None => (10u32, digits),
    };
    if digits.is_empty() {
        bail!("empty value {raw:?}");
    }

    let base = F::from(u64::from(radix));
    let mut acc = F::ZERO;
    for c in digits.chars() {
        let d = c
            .to_digit(radix)
            .with_context(|| format!("invalid digit {c:?} in {raw:?}"))?;
        acc = acc * base + F::from(u64::from(d));
    }
    Ok(if negative { -acc } else { acc })
}

/// Parses `"x=3,y=0x23"` into an assignment.
pub fn parse_inputs<F: PrimeField>(raw: &str) -> Result<Assignment<F>> {
    let mut assignment = Assignment::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid input pair: {pair:?} (expected name=value)"))?;
        let value = parse_field::<F>(value)
            .with_context(|| format!("invalid value for {:?}", name.trim()))?;
        assignment.set(name.trim(), value);
    }
    Ok(assignment)
}
