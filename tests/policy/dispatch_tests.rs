use hashguard::{
    ComparerKind, EqualityComparer, ExtValue, Float32, HashSeed, OpaqueValue, SecurityPolicy,
    TimeKind, Timestamp, TimestampOffset, Value, ValueKind,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use uuid::Uuid;

fn seeded_untrusted(seed: u64) -> Arc<SecurityPolicy> {
    SecurityPolicy::untrusted().with_hash_seed(HashSeed::fixed(seed))
}

#[test]
fn erased_comparer_resolves_each_runtime_kind_once() {
    crate::common::init_test_logging();
    test_phase!("erased_comparer_resolves_each_runtime_kind_once");
    let policy = seeded_untrusted(1);
    let comparer = policy.erased_equality_comparer().expect("value keys allowed");
    assert_eq!(comparer.kind(), ComparerKind::RuntimeDispatch);

    comparer.hash_code(&Value::from("first")).expect("string");
    comparer.hash_code(&Value::from("second")).expect("string");

    let stats = policy.runtime_dispatcher();
    assert_eq!(stats.stats().resolutions.load(Ordering::Relaxed), 1);
    assert_eq!(stats.stats().cache_hits.load(Ordering::Relaxed), 1);
    test_complete!("erased_comparer_resolves_each_runtime_kind_once");
}

#[test]
fn erased_comparer_matches_generic_value_request() {
    let policy = seeded_untrusted(2);
    let erased = policy.erased_equality_comparer().expect("erased");
    let generic = policy.equality_comparer::<Value>().expect("generic");
    assert_eq!(erased.kind(), generic.kind());

    let key = Value::U16(7);
    assert_eq!(erased.hash_code(&key), generic.hash_code(&key));
    // Both share the policy's single dispatcher.
    assert_eq!(policy.runtime_dispatcher().cached_kinds(), 1);
}

#[test]
fn erased_hash_agrees_with_static_hash() {
    let policy = seeded_untrusted(3);
    let erased = policy.erased_equality_comparer().expect("erased");

    let strings = policy.equality_comparer::<String>().expect("string");
    assert_eq!(
        erased.hash_code(&Value::from("key")),
        strings.hash_code(&"key".to_owned())
    );

    let uuids = policy.equality_comparer::<Uuid>().expect("uuid");
    let id = Uuid::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
    assert_eq!(erased.hash_code(&Value::Uuid(id)), uuids.hash_code(&id));
}

#[test]
fn opaque_values_fall_back_to_default_hashing() {
    let policy = seeded_untrusted(4);
    let erased = policy.erased_equality_comparer().expect("erased");
    let boxed = Value::Opaque(OpaqueValue::new(vec![1u8, 2, 3]));

    let first = erased.hash_code(&boxed).expect("opaque never fails");
    let second = erased.hash_code(&boxed).expect("opaque never fails");

    assert_eq!(first, second);
    let dispatcher = policy.runtime_dispatcher();
    assert_eq!(dispatcher.stats().opaque_fallbacks.load(Ordering::Relaxed), 2);
    assert_eq!(dispatcher.cached_kinds(), 0);
}

#[test]
fn nil_hashes_to_zero() {
    let erased = seeded_untrusted(5).erased_equality_comparer().expect("erased");
    assert_eq!(erased.hash_code(&Value::Nil), Ok(0));
    assert!(erased.equals(&Value::Nil, &Value::Nil));
}

#[test]
fn unsupported_runtime_kind_surfaces_original_error() {
    let policy = seeded_untrusted(6);
    let erased = policy.erased_equality_comparer().expect("erased");

    let err = erased
        .hash_code(&Value::Map(vec![(Value::I8(1), Value::Nil)]))
        .expect_err("maps are not keys");
    assert!(err.is_unsupported_key_type());
    assert_eq!(err.type_name(), Some("map"));

    let err = erased
        .hash_code(&Value::Ext(ExtValue::new(-1, [0u8; 12])))
        .expect_err("ext rejected");
    assert_eq!(err.type_name(), Some("ext(-1)"));

    // Failures are not cached, and allow-listed kinds still work.
    assert_eq!(policy.runtime_dispatcher().cached_kinds(), 0);
    assert!(erased.hash_code(&Value::Bool(true)).is_ok());
}

#[test]
fn runtime_kinds_are_cached_per_policy() {
    let a = seeded_untrusted(7);
    let b = a.with_max_object_graph_depth(16);

    a.runtime_dispatcher()
        .comparer_for(ValueKind::I32)
        .expect("i32");

    assert_eq!(a.runtime_dispatcher().cached_kinds(), 1);
    assert_eq!(b.runtime_dispatcher().cached_kinds(), 0);
}

#[test]
fn float_canonicalisation_holds_through_dispatch() {
    let erased = seeded_untrusted(8).erased_equality_comparer().expect("erased");

    let quiet = Value::F32(Float32(f32::NAN));
    let payload = Value::F32(Float32(f32::from_bits(0x7fc0_0001)));
    assert!(erased.equals(&quiet, &payload));
    assert_eq!(erased.hash_code(&quiet), erased.hash_code(&payload));

    let pos = Value::from(0.0f64);
    let neg = Value::from(-0.0f64);
    assert_eq!(erased.hash_code(&pos), erased.hash_code(&neg));
}

#[test]
fn timestamps_hash_with_their_equality() {
    let erased = seeded_untrusted(9).erased_equality_comparer().expect("erased");

    let utc = Value::Timestamp(Timestamp::new(1_000, TimeKind::Utc));
    let local = Value::Timestamp(Timestamp::new(1_000, TimeKind::Local));
    assert!(!erased.equals(&utc, &local));

    // 10:00 at +01:00 and 09:00 at +00:00 are the same instant.
    let minute = hashguard::value::TICKS_PER_MINUTE;
    let plus_one = Value::TimestampOffset(TimestampOffset::new(600 * minute, 60));
    let zulu = Value::TimestampOffset(TimestampOffset::new(540 * minute, 0));
    assert!(erased.equals(&plus_one, &zulu));
    assert_eq!(erased.hash_code(&plus_one), erased.hash_code(&zulu));
}

#[test]
fn concurrent_first_use_yields_one_cached_comparer() {
    let policy = seeded_untrusted(10);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let policy = Arc::clone(&policy);
            std::thread::spawn(move || {
                policy
                    .runtime_dispatcher()
                    .comparer_for(ValueKind::Char)
                    .expect("char")
            })
        })
        .collect();
    let comparers: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();

    let cached = policy
        .runtime_dispatcher()
        .comparer_for(ValueKind::Char)
        .expect("char");
    assert!(comparers.iter().all(|c| Arc::ptr_eq(c, &cached)));
    assert_eq!(policy.runtime_dispatcher().cached_kinds(), 1);
}
