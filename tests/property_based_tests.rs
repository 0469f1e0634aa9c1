use order_pipeline::models::parse_amount;
use order_pipeline::pipeline::{Enricher, IdentityAssigner, OrderIdStrategy, Validator};
use order_pipeline::{OrderDetail, Priority, ValidationErrorKind};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};

/// Positive amounts with up to two decimal places
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn customer_id_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{0,6}[0-9]{0,6}"
}

fn detail(category: &str, amount: Value, customer_id: &str) -> OrderDetail {
    OrderDetail::from_value(json!({
        "category": category,
        "amount": amount,
        "customerId": customer_id,
    }))
    .unwrap()
}

proptest! {
    /// Property: validation accepts exactly positive amounts with a CUST customer id
    #[test]
    fn validation_matches_field_rules(
        category in "[a-z]{1,12}",
        cents in -100_000i64..100_000i64,
        customer_id in customer_id_strategy(),
    ) {
        let amount = Decimal::new(cents, 2);
        let result = Validator::new().validate(&detail(&category, json!(amount.to_string()), &customer_id));

        match result {
            Ok(validated) => {
                prop_assert!(amount > Decimal::ZERO);
                prop_assert!(customer_id.starts_with("CUST"));
                prop_assert_eq!(validated.amount, amount);
            }
            Err(err) if amount <= Decimal::ZERO => {
                prop_assert_eq!(err.kind, ValidationErrorKind::InvalidAmount);
            }
            Err(err) => {
                prop_assert!(!customer_id.starts_with("CUST"));
                prop_assert_eq!(err.kind, ValidationErrorKind::InvalidCustomerId);
            }
        }
    }

    /// Property: missing-field failures name exactly the absent keys
    #[test]
    fn missing_fields_are_reported_exactly(mask in 0u8..8u8) {
        let keys = ["category", "amount", "customerId"];
        let full = json!({"category": "books", "amount": 10, "customerId": "CUST1"});
        let mut fields = serde_json::Map::new();
        let mut expected_missing = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            if mask & (1 << i) == 0 {
                fields.insert(key.to_string(), full[*key].clone());
            } else {
                expected_missing.push(key.to_string());
            }
        }

        let result = Validator::new().validate(&OrderDetail::new(fields));
        if expected_missing.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            let err = result.unwrap_err();
            prop_assert_eq!(err.kind, ValidationErrorKind::MissingFields);
            prop_assert_eq!(err.fields, expected_missing);
        }
    }

    /// Property: priority is high exactly when the amount exceeds 500
    #[test]
    fn priority_threshold_is_strict(amount in amount_strategy()) {
        let enriched = Enricher::new().enrich(detail("books", json!(amount.to_string()), "CUST1"));
        let expected = if amount > Decimal::from(500) { Priority::High } else { Priority::Low };
        prop_assert_eq!(enriched.get("priority"), Some(&json!(expected)));
    }

    /// Property: enrichment only adds the priority key
    #[test]
    fn enrichment_preserves_other_fields(amount in amount_strategy(), extra in "[a-z]{1,8}") {
        let mut original = detail("books", json!(amount.to_string()), "CUST1");
        original.insert("note", json!(extra));
        let enriched = Enricher::new().enrich(original.clone());

        for (key, value) in original.as_map() {
            prop_assert_eq!(enriched.get(key), Some(value));
        }
        prop_assert_eq!(enriched.as_map().len(), original.as_map().len() + 1);
    }

    /// Property: decimal text parses without losing digits
    #[test]
    fn amount_text_parses_exactly(amount in amount_strategy()) {
        prop_assert_eq!(parse_amount(&json!(amount.to_string())), Some(amount));
    }

    /// Property: random ids never collide for identical input
    #[test]
    fn random_ids_are_distinct(amount in amount_strategy()) {
        let validated = Validator::new()
            .validate(&detail("books", json!(amount.to_string()), "CUST1"))
            .unwrap();
        let assigner = IdentityAssigner::new(OrderIdStrategy::Random);

        let first = assigner.assign(&validated);
        let second = assigner.assign(&validated);
        prop_assert_ne!(first.order_id, second.order_id);
        prop_assert_eq!(first.amount, second.amount);
    }
}
