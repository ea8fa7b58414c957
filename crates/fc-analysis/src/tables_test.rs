use super::*;
use crate::test_utils::*;

fn int(bits: IntBitWidth) -> TypeKind {
    TypeKind::Int(bits)
}

fn uint(bits: IntBitWidth) -> TypeKind {
    TypeKind::UInt(bits)
}

fn float(bits: FloatBitWidth) -> TypeKind {
    TypeKind::Float(bits)
}

#[test]
fn test_promotion_same_signedness_takes_wider() {
    let table = &tables().promotion;
    assert_eq!(
        table.promote(&int(IntBitWidth::I8), &int(IntBitWidth::I32)),
        Some(&int(IntBitWidth::I32))
    );
    assert_eq!(
        table.promote(&uint(IntBitWidth::I64), &uint(IntBitWidth::I16)),
        Some(&uint(IntBitWidth::I64))
    );
    assert_eq!(
        table.promote(&float(FloatBitWidth::F32), &float(FloatBitWidth::F64)),
        Some(&float(FloatBitWidth::F64))
    );
}

#[test]
fn test_promotion_mixed_signedness() {
    let table = &tables().promotion;
    assert_eq!(
        table.promote(&int(IntBitWidth::I8), &uint(IntBitWidth::I8)),
        Some(&int(IntBitWidth::I16))
    );
    assert_eq!(
        table.promote(&uint(IntBitWidth::I32), &int(IntBitWidth::I16)),
        Some(&int(IntBitWidth::I64))
    );
    assert_eq!(
        table.promote(&int(IntBitWidth::I64), &uint(IntBitWidth::I64)),
        Some(&int(IntBitWidth::I64))
    );
}

#[test]
fn test_promotion_int_with_float() {
    let table = &tables().promotion;
    assert_eq!(
        table.promote(&int(IntBitWidth::I16), &float(FloatBitWidth::F32)),
        Some(&float(FloatBitWidth::F32))
    );
    assert_eq!(
        table.promote(&int(IntBitWidth::I32), &float(FloatBitWidth::F32)),
        Some(&float(FloatBitWidth::F64))
    );
    assert_eq!(
        table.promote(&float(FloatBitWidth::F32), &uint(IntBitWidth::I64)),
        Some(&float(FloatBitWidth::F64))
    );
}

#[test]
fn test_promotion_is_symmetric() {
    let mut kinds = Vec::new();
    for bits in IntBitWidth::ALL {
        kinds.push(int(bits));
        kinds.push(uint(bits));
    }
    for bits in FloatBitWidth::ALL {
        kinds.push(float(bits));
    }
    let table = &tables().promotion;
    for left in &kinds {
        for right in &kinds {
            assert!(table.promote(left, right).is_some());
            assert_eq!(table.promote(left, right), table.promote(right, left));
        }
    }
}

#[test]
fn test_promotion_excludes_other_kinds() {
    let table = &tables().promotion;
    assert_eq!(table.promote(&TypeKind::Utf8, &int(IntBitWidth::I64)), None);
    assert_eq!(
        table.promote(
            &TypeKind::Decimal {
                precision: 10,
                scale: 2
            },
            &int(IntBitWidth::I64)
        ),
        None
    );
}

#[test]
fn test_sum_widens_and_is_non_null() {
    let sum = tables().aggregations.get("sum").unwrap();
    assert_eq!(sum.apply(&int32().to_nullable()), Some(int64()));
    assert_eq!(
        sum.apply(&DataType::uint(IntBitWidth::I8)),
        Some(DataType::uint(IntBitWidth::I64))
    );
    assert_eq!(
        sum.apply(&DataType::float(FloatBitWidth::F32)),
        Some(DataType::float(FloatBitWidth::F32))
    );
    assert_eq!(sum.apply(&decimal(10, 2)), Some(decimal(38, 2)));
    assert_eq!(sum.apply(&utf8()), None);
}

#[test]
fn test_mean_is_float64_preserving_nullability() {
    let mean = tables().aggregations.get("mean").unwrap();
    assert_eq!(mean.apply(&int64()), Some(float64()));
    assert_eq!(mean.apply(&int32().to_nullable()), Some(float64().to_nullable()));
    assert_eq!(mean.apply(&DataType::boolean()), None);
}

#[test]
fn test_min_max_need_orderable() {
    let aggs = &tables().aggregations;
    for name in ["min", "max"] {
        let sig = aggs.get(name).unwrap();
        assert_eq!(sig.apply(&utf8().to_nullable()), Some(utf8().to_nullable()));
        assert_eq!(sig.apply(&DataType::list(int64())), None);
    }
}

#[test]
fn test_count_and_n_unique_are_uint32() {
    let aggs = &tables().aggregations;
    let uint32 = DataType::uint(IntBitWidth::I32);
    for name in ["count", "n_unique"] {
        let sig = aggs.get(name).unwrap();
        assert_eq!(sig.apply(&utf8().to_nullable()), Some(uint32.clone()));
        assert_eq!(sig.apply(&DataType::list(int64())), Some(uint32.clone()));
    }
}

#[test]
fn test_list_keeps_element_nullability() {
    let list = tables().aggregations.get("list").unwrap();
    assert_eq!(
        list.apply(&utf8().to_nullable()),
        Some(DataType::list(utf8().to_nullable()))
    );
}

#[test]
fn test_first_last_keep_operand_type() {
    let aggs = &tables().aggregations;
    for name in ["first", "last"] {
        let sig = aggs.get(name).unwrap();
        assert_eq!(sig.apply(&int64().to_nullable()), Some(int64().to_nullable()));
    }
}

#[test]
fn test_unknown_aggregation_has_no_signature() {
    for name in ["count", "first", "last", "list", "max", "mean", "min", "n_unique", "sum"] {
        assert!(tables().aggregations.get(name).is_some(), "{}", name);
    }
    assert!(tables().aggregations.get("median").is_none());
}
