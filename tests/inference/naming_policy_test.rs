use schemalens::inference::{guess_referenced_collection, has_reference_suffix, REFERENCE_RULES};

#[test]
fn test_reference_suffix_table() {
    let cases = [
        // (field, marks a reference by name, guessed collection)
        ("author_id", true, "author"),
        ("Customer_ID", true, "customer"),
        ("parent_category_id", true, "parent_category"),
        ("profileId", true, "profile"),
        ("userID", true, "user"),
        ("orderItemId", true, "orderitem"),
        ("v2Id", true, "v2"),
        ("userid", false, "user"),
        ("paid", false, "pa"),
        ("title", false, "title"),
        ("Tags", false, "tags"),
    ];

    for (field, marks, guess) in cases {
        assert_eq!(has_reference_suffix(field), marks, "suffix check for {}", field);
        assert_eq!(guess_referenced_collection(field), guess, "guess for {}", field);
    }
}

#[test]
fn test_identifier_field_is_not_a_reference() {
    assert!(!has_reference_suffix("_id"));
    assert!(!has_reference_suffix("id"));
    assert!(!has_reference_suffix("ID"));
}

#[test]
fn test_guessing_is_deterministic() {
    for field in ["author_id", "profileId", "userid", "title"] {
        let first = guess_referenced_collection(field);
        for _ in 0..5 {
            assert_eq!(guess_referenced_collection(field), first);
        }
    }
}

#[test]
fn test_every_rule_is_described() {
    assert!(!REFERENCE_RULES.is_empty());
    for rule in REFERENCE_RULES.iter() {
        assert!(!rule.name.is_empty());
        assert!(!rule.description.is_empty());
    }
    assert!(REFERENCE_RULES.iter().any(|r| !r.marks_reference));
}
