/// Property-based tests using proptest
/// Invariants of the best-effort merge and the country guess selection
use people_enrichment_api::enrichment::{best_country_guess, merge};
use people_enrichment_api::provider_models::{
    AgeResponse, CountryGuess, GenderResponse, NationalityResponse, ProviderEndpoint,
    ProviderKind, ProviderPayload, SourceError, SourceResult,
};
use proptest::prelude::*;

fn guess_strategy() -> impl Strategy<Value = CountryGuess> {
    ("[A-Z]{2}", 0.0f64..=1.0).prop_map(|(country_id, probability)| CountryGuess {
        country_id,
        probability,
    })
}

fn endpoint(kind: ProviderKind) -> ProviderEndpoint {
    ProviderEndpoint::new(kind, "http://provider.test/")
}

fn healthy(kind: ProviderKind) -> SourceResult {
    let payload = match kind {
        ProviderKind::Age => ProviderPayload::Age(AgeResponse {
            name: None,
            age: Some(34.0),
            count: None,
        }),
        ProviderKind::Gender => ProviderPayload::Gender(GenderResponse {
            name: None,
            gender: Some("female".to_string()),
            probability: Some(0.9),
            count: None,
        }),
        ProviderKind::Nationality => ProviderPayload::Nationality(NationalityResponse {
            name: None,
            country: vec![CountryGuess {
                country_id: "FI".to_string(),
                probability: 0.7,
            }],
            count: None,
        }),
    };
    SourceResult::success(&endpoint(kind), payload)
}

// Property: the selected guess is never beaten, and ties go to the first entry
proptest! {
    #[test]
    fn best_guess_has_maximum_probability(guesses in prop::collection::vec(guess_strategy(), 1..20)) {
        let best = best_country_guess(&guesses).unwrap();
        prop_assert!(guesses.iter().all(|g| best.probability >= g.probability));

        let first_max = guesses
            .iter()
            .position(|g| g.probability == best.probability)
            .unwrap();
        prop_assert!(std::ptr::eq(best, &guesses[first_max]));
    }

    #[test]
    fn duplicated_top_probability_resolves_to_first(
        mut guesses in prop::collection::vec(guess_strategy(), 1..10),
        insert_at in 0usize..10
    ) {
        let top = CountryGuess { country_id: "AA".to_string(), probability: 2.0 };
        let dup = CountryGuess { country_id: "BB".to_string(), probability: 2.0 };
        let at = insert_at.min(guesses.len());
        guesses.insert(at, top);
        guesses.push(dup);
        prop_assert_eq!(best_country_guess(&guesses).unwrap().country_id.as_str(), "AA");
    }
}

// Property: failing providers only blank their own fields
proptest! {
    #[test]
    fn failures_only_degrade_their_own_field(
        age_fails in any::<bool>(),
        gender_fails in any::<bool>(),
        nationality_fails in any::<bool>(),
        reverse in any::<bool>()
    ) {
        let plan = [
            (ProviderKind::Age, age_fails),
            (ProviderKind::Gender, gender_fails),
            (ProviderKind::Nationality, nationality_fails),
        ];
        let mut results: Vec<SourceResult> = plan
            .iter()
            .map(|(kind, fails)| {
                if *fails {
                    SourceResult::failure(&endpoint(*kind), SourceError::Timeout)
                } else {
                    healthy(*kind)
                }
            })
            .collect();
        if reverse {
            results.reverse();
        }

        let (merged, failures) = merge(&results);
        prop_assert_eq!(merged.age.is_none(), age_fails);
        prop_assert_eq!(merged.gender.is_none(), gender_fails);
        prop_assert_eq!(merged.nationality.is_none(), nationality_fails);

        let expected_failures = plan.iter().filter(|(_, fails)| *fails).count();
        prop_assert_eq!(failures.len(), expected_failures);
    }
}
