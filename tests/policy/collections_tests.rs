use hashguard::{
    CanonicalComparer, ComparerKind, EqualityComparer, Float64, HashSeed, KeyedMap, KeyedSet,
    PolicyResult, SecurityPolicy, SharedComparer, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn untrusted_map_of_decoded_entries() {
    crate::common::init_test_logging();
    test_phase!("untrusted_map_of_decoded_entries");
    let policy = SecurityPolicy::untrusted();
    let entries = [
        (Value::from("name"), Value::from("widget")),
        (Value::from("count"), Value::from(3u8)),
        (Value::from("name"), Value::from("gadget")),
    ];

    let map = KeyedMap::try_from_entries(&policy, entries).expect("string keys allowed");

    assert_eq!(map.len(), 2);
    assert_eq!(
        map.get(&Value::from("name")).expect("lookup"),
        Some(&Value::from("gadget"))
    );
    test_complete!("untrusted_map_of_decoded_entries");
}

#[test]
fn rejected_key_stops_the_build() {
    let policy = SecurityPolicy::untrusted();
    let keys = [Value::from(1i64), Value::Binary(vec![0xde, 0xad]), Value::from(2i64)];

    let err = KeyedSet::try_from_keys(&policy, keys).expect_err("binary key rejected");

    assert!(err.is_unsupported_key_type());
    assert_eq!(err.type_name(), Some("binary"));
}

#[test]
fn trusted_value_set_accepts_any_runtime_kind() {
    let policy = SecurityPolicy::trusted();
    let keys = [
        Value::Binary(vec![1]),
        Value::Array(vec![Value::Nil]),
        Value::Binary(vec![1]),
    ];

    let set = KeyedSet::try_from_keys(&policy, keys).expect("trusted accepts everything");

    assert_eq!(set.len(), 2);
    assert_eq!(set.comparer().kind(), ComparerKind::Default);
}

#[test]
fn float_keys_fold_zero_and_nan() {
    let policy = SecurityPolicy::untrusted();
    let mut map = KeyedMap::<Float64, &str>::new(&policy).expect("f64 keys");

    map.insert(Float64(0.0), "zero").expect("insert");
    let replaced = map.insert(Float64(-0.0), "negative zero").expect("insert");
    map.insert(Float64(f64::NAN), "nan").expect("insert");
    let nan_again = map
        .insert(Float64(f64::from_bits(0x7ff8_dead_beef_0001)), "payload nan")
        .expect("insert");

    assert_eq!(replaced, Some("zero"));
    assert_eq!(nan_again, Some("nan"));
    assert_eq!(map.len(), 2);
}

/// Counts hash calls so the test can observe that growth reuses stored
/// hashes.
struct Counting {
    inner: CanonicalComparer<u32>,
    calls: Arc<AtomicUsize>,
}

impl EqualityComparer<u32> for Counting {
    fn equals(&self, a: &u32, b: &u32) -> bool {
        self.inner.equals(a, b)
    }

    fn hash_code(&self, value: &u32) -> PolicyResult<u64> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.hash_code(value)
    }

    fn kind(&self) -> ComparerKind {
        self.inner.kind()
    }
}

#[test]
fn growth_does_not_rehash_through_the_comparer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let comparer: SharedComparer<u32> = Arc::new(Counting {
        inner: CanonicalComparer::new(HashSeed::fixed(12)),
        calls: Arc::clone(&calls),
    });
    let mut set = KeyedSet::with_comparer(comparer);

    for key in 0..1_000u32 {
        set.insert(key).expect("insert");
    }

    assert_eq!(set.len(), 1_000);
    assert_eq!(calls.load(Ordering::Relaxed), 1_000);
}

#[test]
fn remove_then_reinsert() {
    let policy = SecurityPolicy::untrusted();
    let mut set = KeyedSet::<char>::new(&policy).expect("char keys");

    assert_eq!(set.insert('a'), Ok(true));
    assert_eq!(set.remove(&'a'), Ok(true));
    assert_eq!(set.remove(&'a'), Ok(false));
    assert!(set.is_empty());
    assert_eq!(set.insert('a'), Ok(true));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!['a']);
}
