use serde::{Deserialize, Serialize};

use crate::core::gene::{Gene, GenePatch, NewGene, FULL_NAME_MAX_LENGTH, SYMBOL_MAX_LENGTH};
use crate::core::types::GeneId;
use crate::utils::validation::{char_field, not_null, nullable, required, FieldErrors};

/// Request body for creating or updating a gene
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneInput {
    #[serde(default, deserialize_with = "nullable")]
    pub symbol: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub function_summary: Option<Option<String>>,
}

impl GeneInput {
    /// Validate a complete payload (create and full update)
    ///
    /// # Errors
    ///
    /// Returns every missing or invalid field.
    pub fn validate(self) -> Result<NewGene, FieldErrors> {
        let mut errors = FieldErrors::new();

        let symbol = errors.check(
            "symbol",
            required(self.symbol)
                .and_then(not_null)
                .and_then(|s| char_field(s, Some(SYMBOL_MAX_LENGTH))),
        );
        let full_name = errors.check(
            "full_name",
            required(self.full_name)
                .and_then(not_null)
                .and_then(|s| char_field(s, Some(FULL_NAME_MAX_LENGTH))),
        );
        let function_summary = errors.check(
            "function_summary",
            required(self.function_summary)
                .and_then(not_null)
                .and_then(|s| char_field(s, None)),
        );

        match (symbol, full_name, function_summary) {
            (Some(symbol), Some(full_name), Some(function_summary)) if errors.is_empty() => {
                Ok(NewGene {
                    symbol,
                    full_name,
                    function_summary,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate only the fields present in the payload (partial update)
    ///
    /// # Errors
    ///
    /// Returns every present field that is invalid.
    pub fn validate_patch(self) -> Result<GenePatch, FieldErrors> {
        let mut errors = FieldErrors::new();

        let patch = GenePatch {
            symbol: self.symbol.and_then(|s| {
                errors.check(
                    "symbol",
                    not_null(s).and_then(|s| char_field(s, Some(SYMBOL_MAX_LENGTH))),
                )
            }),
            full_name: self.full_name.and_then(|s| {
                errors.check(
                    "full_name",
                    not_null(s).and_then(|s| char_field(s, Some(FULL_NAME_MAX_LENGTH))),
                )
            }),
            function_summary: self.function_summary.and_then(|s| {
                errors.check("function_summary", not_null(s).and_then(|s| char_field(s, None)))
            }),
        };

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

/// Public view of a gene; timestamps are never exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneOutput {
    pub id: GeneId,
    pub symbol: String,
    pub full_name: String,
    pub function_summary: String,
}

impl From<Gene> for GeneOutput {
    fn from(gene: Gene) -> Self {
        Self {
            id: gene.id,
            symbol: gene.symbol,
            full_name: gene.full_name,
            function_summary: gene.function_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::{MSG_BLANK, MSG_NULL, MSG_REQUIRED};

    fn input(symbol: Option<&str>, full_name: Option<&str>, summary: Option<&str>) -> GeneInput {
        let field = |value: Option<&str>| value.map(|v| Some(v.to_string()));
        GeneInput {
            symbol: field(symbol),
            full_name: field(full_name),
            function_summary: field(summary),
        }
    }

    #[test]
    fn test_validate_complete_payload() {
        let gene = input(Some("TP53"), Some("Tumor protein p53"), Some("Guardian of the genome"))
            .validate()
            .unwrap();
        assert_eq!(gene.symbol, "TP53");
        assert_eq!(gene.full_name, "Tumor protein p53");
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let errors = input(None, None, None).validate().unwrap_err();
        assert_eq!(errors.get("symbol"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert_eq!(errors.get("full_name"), Some(&[MSG_REQUIRED.to_string()][..]));
        assert_eq!(errors.get("function_summary"), Some(&[MSG_REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_validate_lengths_and_blanks() {
        let long_symbol = "X".repeat(SYMBOL_MAX_LENGTH + 1);
        let long_name = "n".repeat(FULL_NAME_MAX_LENGTH + 1);
        let errors = input(Some(&long_symbol), Some(&long_name), Some("  "))
            .validate()
            .unwrap_err();
        assert_eq!(errors.fields().count(), 3);
        assert_eq!(errors.get("function_summary"), Some(&[MSG_BLANK.to_string()][..]));
    }

    #[test]
    fn test_validate_patch_only_checks_present_fields() {
        let patch = input(None, Some("Renamed"), None).validate_patch().unwrap();
        assert_eq!(patch.symbol, None);
        assert_eq!(patch.full_name.as_deref(), Some("Renamed"));

        let errors = input(Some(""), None, None).validate_patch().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["symbol"]);

        assert_eq!(GeneInput::default().validate_patch(), Ok(GenePatch::default()));
    }

    #[test]
    fn test_input_ignores_unknown_fields() {
        let parsed: GeneInput = serde_json::from_str(
            r#"{"symbol": "EGFR", "id": 99, "created_at": "2020-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.symbol, Some(Some("EGFR".to_string())));
        assert!(parsed.full_name.is_none());
    }

    #[test]
    fn test_explicit_nulls_are_rejected() {
        let parsed: GeneInput =
            serde_json::from_str(r#"{"symbol": null, "full_name": null}"#).unwrap();

        let errors = parsed.clone().validate_patch().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["full_name", "symbol"]);
        assert_eq!(errors.get("symbol"), Some(&[MSG_NULL.to_string()][..]));

        let errors = parsed.validate().unwrap_err();
        assert_eq!(errors.get("full_name"), Some(&[MSG_NULL.to_string()][..]));
        assert_eq!(errors.get("function_summary"), Some(&[MSG_REQUIRED.to_string()][..]));
    }
}
