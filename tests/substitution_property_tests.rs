use proptest::prelude::*;
use std::collections::HashMap;

use hyperite::layout::substitute;

proptest! {
    #[test]
    fn unknown_tokens_leave_template_unchanged(template in ".*") {
        prop_assert_eq!(substitute(&template, |_| None), template);
    }

    #[test]
    fn inserted_value_is_never_rescanned(value in ".*") {
        let out = substitute("<{x}>", |token| (token == "x").then_some(value.as_str()));
        prop_assert_eq!(out, format!("<{}>", value));
    }

    #[test]
    fn every_known_token_is_replaced_in_order(
        fields in prop::collection::vec(("[a-z_]{1,8}", "[^{}]{0,12}"), 1..8)
    ) {
        let values: HashMap<&str, &str> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let template: String = fields.iter().map(|(k, _)| format!("{{{}}}|", k)).collect();
        // later duplicates win in the map, so expect the map's value per token
        let expected: String = fields.iter().map(|(k, _)| format!("{}|", values[k.as_str()])).collect();

        prop_assert_eq!(substitute(&template, |t| values.get(t).copied()), expected);
    }

    #[test]
    fn brace_free_text_is_copied(text in "[^{}]*", value in ".*") {
        prop_assert_eq!(substitute(&text, |_| Some(value.as_str())), text);
    }
}
