use hashguard::value::TICKS_PER_MINUTE;
use hashguard::{
    EqualityComparer, Float32, Float64, HashSeed, KeyedSet, SecurityPolicy, TimeKind, Timestamp,
    TimestampOffset, Value,
};
use proptest::prelude::*;
use std::sync::Arc;

fn policy(seed: u64) -> Arc<SecurityPolicy> {
    SecurityPolicy::untrusted().with_hash_seed(HashSeed::fixed(seed))
}

fn arb_f32_nan() -> impl Strategy<Value = f32> {
    (any::<bool>(), 1u32..(1 << 23))
        .prop_map(|(sign, mantissa)| f32::from_bits(u32::from(sign) << 31 | 0x7f80_0000 | mantissa))
}

fn arb_f64_nan() -> impl Strategy<Value = f64> {
    (any::<bool>(), 1u64..(1 << 52))
        .prop_map(|(sign, mantissa)| {
            f64::from_bits(u64::from(sign) << 63 | 0x7ff0_0000_0000_0000 | mantissa)
        })
}

fn arb_time_kind() -> impl Strategy<Value = TimeKind> {
    prop_oneof![
        Just(TimeKind::Unspecified),
        Just(TimeKind::Utc),
        Just(TimeKind::Local),
    ]
}

// Small ranges so distinct local ticks often land on the same UTC instant.
fn arb_offset_timestamp() -> impl Strategy<Value = TimestampOffset> {
    (-4i64..4, -3i16..3)
        .prop_map(|(minutes, offset)| TimestampOffset::new(minutes * TICKS_PER_MINUTE, offset))
}

fn arb_key() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<char>().prop_map(Value::Char),
        any::<i8>().prop_map(Value::I8),
        any::<u8>().prop_map(Value::U8),
        any::<i16>().prop_map(Value::I16),
        any::<u16>().prop_map(Value::U16),
        any::<i32>().prop_map(Value::I32),
        any::<u32>().prop_map(Value::U32),
        any::<i64>().prop_map(Value::I64),
        any::<u64>().prop_map(Value::U64),
        prop_oneof![any::<f32>(), Just(0.0f32), Just(-0.0f32), arb_f32_nan()]
            .prop_map(|f| Value::F32(Float32(f))),
        prop_oneof![any::<f64>(), Just(0.0f64), Just(-0.0f64), arb_f64_nan()]
            .prop_map(|f| Value::F64(Float64(f))),
        "[a-z]{0,8}".prop_map(Value::from),
        prop_oneof![any::<u128>(), 0u128..4]
            .prop_map(|bits| Value::Uuid(uuid::Uuid::from_u128(bits))),
        (-4i64..4, arb_time_kind())
            .prop_map(|(ticks, kind)| Value::Timestamp(Timestamp::new(ticks, kind))),
        arb_offset_timestamp().prop_map(Value::TimestampOffset),
    ]
}

proptest! {
    #[test]
    fn f32_nans_hash_alike(seed in any::<u64>(), a in arb_f32_nan(), b in arb_f32_nan()) {
        let comparer = policy(seed).equality_comparer::<Float32>().expect("f32");
        prop_assert!(comparer.equals(&Float32(a), &Float32(b)));
        prop_assert_eq!(comparer.hash_code(&Float32(a)), comparer.hash_code(&Float32(b)));
    }

    #[test]
    fn f64_nans_hash_alike(seed in any::<u64>(), a in arb_f64_nan(), b in arb_f64_nan()) {
        let comparer = policy(seed).equality_comparer::<Float64>().expect("f64");
        prop_assert!(comparer.equals(&Float64(a), &Float64(b)));
        prop_assert_eq!(comparer.hash_code(&Float64(a)), comparer.hash_code(&Float64(b)));
    }

    #[test]
    fn equal_offsets_hash_alike(
        seed in any::<u64>(),
        utc in -1_000_000_000_000i64..1_000_000_000_000,
        offset in -840i16..=840,
    ) {
        let comparer = policy(seed).equality_comparer::<TimestampOffset>().expect("offset");
        let minute = hashguard::value::TICKS_PER_MINUTE;
        let local = TimestampOffset::new(utc + i64::from(offset) * minute, offset);
        let zulu = TimestampOffset::new(utc, 0);
        prop_assert!(comparer.equals(&local, &zulu));
        prop_assert_eq!(comparer.hash_code(&local), comparer.hash_code(&zulu));
    }

    #[test]
    fn erased_hash_is_consistent_with_equality(seed in any::<u64>(), a in arb_key(), b in arb_key()) {
        let comparer = policy(seed).erased_equality_comparer().expect("erased");
        if comparer.equals(&a, &b) {
            prop_assert_eq!(comparer.hash_code(&a), comparer.hash_code(&b));
        }
        prop_assert_eq!(comparer.hash_code(&a), comparer.hash_code(&a.clone()));
    }

    #[test]
    fn u64_high_half_changes_hash(seed in any::<u64>(), low in any::<u32>(), high in 1u32..) {
        let comparer = policy(seed).equality_comparer::<u64>().expect("u64");
        let narrow = u64::from(low);
        let wide = u64::from(high) << 32 | u64::from(low);
        prop_assert_ne!(comparer.hash_code(&narrow), comparer.hash_code(&wide));
    }

    #[test]
    fn set_len_matches_distinct_keys(keys in prop::collection::vec(arb_key(), 0..64)) {
        let set = KeyedSet::try_from_keys(&policy(0), keys.clone()).expect("allow-listed keys");
        let mut distinct: Vec<Value> = Vec::new();
        for key in keys {
            if !distinct.contains(&key) {
                distinct.push(key);
            }
        }
        prop_assert_eq!(set.len(), distinct.len());
    }
}
