//! Canonical check-definition form.
//!
//! # Invariants
//!
//! - **Metadata never decides identity**: `name`, `note` and the filter's
//!   internal `type` tag are stripped before any comparison.
//! - **Symmetric**: equivalence does not depend on which definition is
//!   compared "against" the other.
//! - **Order-independent**: JSON object equality is key-based, so field
//!   order on the wire is irrelevant.

use serde_json::Value;

/// The only check kind eligible for reconciliation matching.
pub const CHECK_TYPE_EXISTENTIAL: &str = "Existential";

/// `true` when the definition's discriminant tag is `Existential`.
pub fn is_existential(definition: &Value) -> bool {
    definition
        .get("checkType")
        .and_then(Value::as_str)
        .map(|t| t == CHECK_TYPE_EXISTENTIAL)
        .unwrap_or(false)
}

/// Copy of `definition` with presentation metadata removed: top-level
/// `name` and `note`, and `filters.from.type`.
pub fn canonical_definition(definition: &Value) -> Value {
    let mut canon = definition.clone();
    if let Some(obj) = canon.as_object_mut() {
        obj.remove("name");
        obj.remove("note");
        if let Some(from) = obj
            .get_mut("filters")
            .and_then(|f| f.get_mut("from"))
            .and_then(Value::as_object_mut)
        {
            from.remove("type");
        }
    }
    canon
}

/// Field-by-field equality of the canonical forms.
pub fn definitions_equivalent(a: &Value, b: &Value) -> bool {
    canonical_definition(a) == canonical_definition(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_definition() -> Value {
        json!({
            "checkType": "Existential",
            "name": "reach dmz",
            "note": "added by playbook",
            "filters": {
                "from": {
                    "type": "EndpointFilter",
                    "source": { "deviceName": "fw01" },
                    "packetFilters": [ { "ipv4Dst": "20.1.1.1" } ]
                }
            }
        })
    }

    #[test]
    fn metadata_fields_are_stripped() {
        let canon = canonical_definition(&base_definition());
        assert!(canon.get("name").is_none());
        assert!(canon.get("note").is_none());
        assert!(canon["filters"]["from"].get("type").is_none());
        // Identity-bearing fields survive.
        assert_eq!(canon["filters"]["from"]["source"]["deviceName"], "fw01");
    }

    #[test]
    fn equivalence_ignores_name_note_and_filter_type_tag() {
        let a = base_definition();
        let mut b = base_definition();
        b["name"] = json!("entirely different");
        b["note"] = json!("other note");
        b["filters"]["from"]["type"] = json!("SomethingElse");

        assert!(definitions_equivalent(&a, &b));
        // Symmetry.
        assert!(definitions_equivalent(&b, &a));
    }

    #[test]
    fn identity_fields_still_distinguish() {
        let a = base_definition();
        let mut b = base_definition();
        b["filters"]["from"]["source"] = json!({ "deviceName": "fw02" });

        assert!(!definitions_equivalent(&a, &b));
    }

    #[test]
    fn key_order_on_the_wire_is_irrelevant() {
        let a: Value = serde_json::from_str(
            r#"{"checkType": "Existential", "filters": {"from": {"source": {"deviceName": "fw01"}}}}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            r#"{"filters": {"from": {"source": {"deviceName": "fw01"}}}, "checkType": "Existential"}"#,
        )
        .unwrap();
        assert!(definitions_equivalent(&a, &b));
    }

    #[test]
    fn non_existential_kinds_are_flagged() {
        assert!(is_existential(&base_definition()));
        assert!(!is_existential(&json!({ "checkType": "Isolation" })));
        assert!(!is_existential(&json!({})));
    }
}
