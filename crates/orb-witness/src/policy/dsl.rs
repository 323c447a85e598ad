//! A small recursive-descent parser over the witness policy DSL's
//! recognized options (§4.6, §2 "parses a policy DSL"). The wire form is a
//! `;`- or newline-separated list of `Key=Value` assignments, e.g.
//! `MinNumberBatch=1;MinNumberSystem=2;LogRequired=true;Operator=AND`.
//! Unrecognized keys are a hard parse error (§7 Integrity) rather than
//! silently ignored, so a typo in a deployed policy fails fast.

use super::engine::{Operator, PolicyConfig};
use orb_core::error::{OrbError, Result};

impl PolicyConfig {
    pub fn parse(dsl: &str) -> Result<Self> {
        let mut config = PolicyConfig::default();
        for assignment in dsl.split(|c| c == ';' || c == '\n') {
            let assignment = assignment.trim();
            if assignment.is_empty() {
                continue;
            }
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                OrbError::integrity(format!("malformed policy assignment {assignment:?}"))
            })?;
            let key = key.trim();
            let value = value.trim();
            match key.to_ascii_lowercase().as_str() {
                "minnumberbatch" => config.min_number_batch = parse_u32(value)?,
                "minpercentbatch" => config.min_percent_batch = parse_u32(value)?,
                "minnumbersystem" => config.min_number_system = parse_u32(value)?,
                "minpercentsystem" => config.min_percent_system = parse_u32(value)?,
                "logrequired" => config.log_required = parse_bool(value)?,
                "operator" => config.operator = parse_operator(value)?,
                other => {
                    return Err(OrbError::integrity(format!(
                        "unrecognized policy option {other:?}"
                    )))
                }
            }
        }
        Ok(config)
    }

    pub fn to_dsl(&self) -> String {
        format!(
            "MinNumberBatch={};MinPercentBatch={};MinNumberSystem={};MinPercentSystem={};LogRequired={};Operator={}",
            self.min_number_batch,
            self.min_percent_batch,
            self.min_number_system,
            self.min_percent_system,
            self.log_required,
            match self.operator {
                Operator::And => "AND",
                Operator::Or => "OR",
            }
        )
    }
}

fn parse_u32(value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| OrbError::integrity(format!("expected integer, got {value:?}")))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(OrbError::integrity(format!(
            "expected true/false, got {other:?}"
        ))),
    }
}

fn parse_operator(value: &str) -> Result<Operator> {
    match value.to_ascii_uppercase().as_str() {
        "AND" => Ok(Operator::And),
        "OR" => Ok(Operator::Or),
        other => Err(OrbError::integrity(format!(
            "expected AND/OR operator, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_recognized_options() {
        let config = PolicyConfig::parse(
            "MinNumberBatch=1;MinPercentBatch=0;MinNumberSystem=2;MinPercentSystem=50;LogRequired=true;Operator=AND",
        )
        .unwrap();
        assert_eq!(config.min_number_batch, 1);
        assert_eq!(config.min_number_system, 2);
        assert_eq!(config.min_percent_system, 50);
        assert!(config.log_required);
        assert_eq!(config.operator, Operator::And);
    }

    #[test]
    fn round_trips_through_to_dsl() {
        let config = PolicyConfig::parse("MinNumberBatch=1;Operator=OR").unwrap();
        let reparsed = PolicyConfig::parse(&config.to_dsl()).unwrap();
        assert_eq!(config, reparsed);
    }

    #[test]
    fn rejects_unknown_option() {
        let err = PolicyConfig::parse("MinNumberBonus=1").unwrap_err();
        assert!(err.is(orb_core::error::Kind::Integrity));
    }
}
