/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use lead_intake_api::db_storage::DocumentStore;
use lead_intake_api::memory_storage::MemoryDocumentStore;
use lead_intake_api::models::{Lead, LeadOut, LEAD_COLLECTION};
use lead_intake_api::validation::{is_valid_email, validate_lead};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// Property: Email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_are_accepted(
        local in "[a-z][a-z0-9._]{0,15}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn emails_without_at_sign_are_rejected(text in "[^@]*") {
        prop_assert!(!is_valid_email(&text));
    }

    #[test]
    fn lenient_validation_accepts_anything(email in "\\PC*") {
        let lead = Lead {
            name: "n".to_string(),
            email,
            phone: None,
            message: "m".to_string(),
        };
        prop_assert!(validate_lead(&lead, false).is_ok());
    }
}

// Property: stored leads read back unchanged, and listing never exceeds the limit
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stored_lead_reads_back_identically(
        name in "\\PC{0,40}",
        email in "\\PC{0,40}",
        phone in proptest::option::of("[0-9 +()-]{0,20}"),
        message in "\\PC{0,200}"
    ) {
        let lead = Lead { name, email, phone, message };
        let store = MemoryDocumentStore::new();

        let (id, out) = runtime().block_on(async {
            let record = serde_json::to_value(&lead).unwrap();
            let id = store.create_document(LEAD_COLLECTION, &record).await.unwrap();
            let docs = store.get_documents(LEAD_COLLECTION, 10).await.unwrap();
            let out = LeadOut::from_document(docs[0].clone()).unwrap();
            (id, out)
        });

        prop_assert!(!id.is_empty());
        prop_assert_eq!(out.id, id);
        prop_assert_eq!(out.name, lead.name);
        prop_assert_eq!(out.email, lead.email);
        prop_assert_eq!(out.phone, lead.phone);
        prop_assert_eq!(out.message, lead.message);
    }

    #[test]
    fn listing_never_exceeds_limit(stored in 0usize..30, limit in 1i64..40) {
        let store = MemoryDocumentStore::new();

        let docs = runtime().block_on(async {
            for n in 0..stored {
                store
                    .create_document(LEAD_COLLECTION, &serde_json::json!({ "n": n }))
                    .await
                    .unwrap();
            }
            store.get_documents(LEAD_COLLECTION, limit).await.unwrap()
        });

        let expected = stored.min(usize::try_from(limit).unwrap());
        prop_assert_eq!(docs.len(), expected);
    }
}
