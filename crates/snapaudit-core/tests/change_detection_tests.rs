// Properties of the change detector and snapshot constructor that hold
// for any field values.

use chrono::Utc;
use proptest::prelude::*;
use snapaudit_core::diff::{compose_remark, detect};
use snapaudit_core::model::{
    AccountStatus, ChangeTag, LiveRecord, Metadata, PlatformUserFields, ProfileFields,
};
use snapaudit_core::snapshot::{capture, fields_digest};

fn arb_status() -> impl Strategy<Value = AccountStatus> {
    prop_oneof![Just(AccountStatus::Active), Just(AccountStatus::Banned)]
}

fn arb_extra() -> impl Strategy<Value = Metadata> {
    prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..4).prop_map(|m| {
        m.into_iter()
            .map(|(k, v)| (k, serde_json::Value::from(v)))
            .collect()
    })
}

prop_compose! {
    fn arb_fields()(
        is_bot in any::<bool>(),
        first_name in "[A-Za-z]{1,12}",
        last_name in proptest::option::of("[A-Za-z]{1,12}"),
        username in proptest::option::of("[a-z0-9_]{3,12}"),
        language_code in proptest::option::of("[a-z]{2}"),
        is_premium in proptest::option::of(any::<bool>()),
        status in arb_status(),
        extra in arb_extra(),
    ) -> PlatformUserFields {
        PlatformUserFields {
            is_bot,
            first_name,
            last_name,
            username,
            language_code,
            is_premium,
            added_to_attachment_menu: None,
            status,
            extra,
        }
    }
}

proptest! {
    #[test]
    fn identical_state_is_never_changed(fields in arb_fields()) {
        let cs = detect(Some(&fields), &fields.clone(), false).unwrap();
        prop_assert!(!cs.changed);
        prop_assert!(cs.changes.is_empty());
    }

    #[test]
    fn force_always_changes(fields in arb_fields(), other in arb_fields()) {
        prop_assert!(detect(Some(&fields), &fields.clone(), true).unwrap().changed);
        prop_assert!(detect(Some(&fields), &other, true).unwrap().changed);
    }

    #[test]
    fn changed_iff_fields_differ(a in arb_fields(), b in arb_fields()) {
        let cs = detect(Some(&a), &b, false).unwrap();
        prop_assert_eq!(cs.changed, a != b);
        let expected = if a == b { Vec::new() } else { a.field_changes(&b) };
        prop_assert_eq!(cs.changes, expected);
    }

    #[test]
    fn remark_is_never_empty(a in arb_fields(), b in arb_fields(), force in any::<bool>()) {
        let cs = detect(Some(&a), &b, force).unwrap();
        if cs.changed {
            prop_assert!(!compose_remark(&cs, None).is_empty());
        }
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation(a in arb_fields(), b in arb_fields()) {
        let mut live = LiveRecord::new("tg-1", a.clone(), Some("r0".to_string()), Utc::now(), None);
        let snap = capture(&live, ChangeTag::Update, Utc::now(), None).unwrap();

        live.fields = b;
        live.remark = Some("r1".to_string());
        live.version += 1;

        prop_assert_eq!(&snap.fields, &a);
        prop_assert_eq!(snap.remark.as_deref(), Some("r0"));
        prop_assert_eq!(snap.source_version, 1);
        prop_assert_eq!(snap.fields_digest, fields_digest(&a).unwrap());
    }
}
