// Integration tests for shared variables
//
// These tests exercise construction, typing, and value replacement through
// the public facade: type inference from host values, the strict and
// allow_downcast policies, borrowing, and rejection of symbolic values.

use ndarray::{arr1, ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tether::config::{self, with_config, Config};
use tether::graph;
use tether::prelude::*;

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// The single element of a variable's current value.
fn item(var: &SharedVariable) -> Scalar {
    var.get_value(false)
        .as_array()
        .and_then(HostArray::item)
        .expect("one-element tensor value")
}

fn values(var: &SharedVariable) -> Vec<f64> {
    var.get_value(false)
        .as_array()
        .map(HostArray::to_f64_vec)
        .expect("tensor value")
}

/// Length-2 vector, so no dimension is inferred broadcastable.
fn vector_of<T: tether::Element>(v: T) -> HostArray {
    HostArray::from(arr1(&[v, v]).into_dyn())
}

fn float64_vector() -> TensorType {
    dvector()
}

// Construction

#[test]
fn test_ctors() -> Result<()> {
    assert_eq!(shared(7isize)?.ty(), &TensorType::scalar(config::current().default_int()));
    assert_eq!(shared(7.0f64)?.ty(), &dscalar());
    assert_eq!(shared(Value::float(7.0))?.ty(), &dscalar());
    assert_eq!(shared(7.0f32)?.ty(), &fscalar());

    let b = shared(HostArray::zeros((5, 5), DType::I32))?;
    assert_eq!(b.ty(), &TensorType::new(DType::I32, [false, false]));

    let mut rng = rng();
    let b = shared(HostArray::rand_with((4, 5), &mut rng))?;
    assert_eq!(b.ty(), &TensorType::new(DType::F64, [false, false]));
    let b = shared(HostArray::rand_with((5, 1, 2), &mut rng))?;
    assert_eq!(b.ty(), &TensorType::new(DType::F64, [false, true, false]));

    assert_eq!(shared(Value::List(vec![]))?.ty(), &Type::Generic);
    Ok(())
}

#[test]
fn test_ctor_rejects_unknown_option() {
    let err = SharedOptions::from_pairs([("bad_kw", false)]).unwrap_err();
    assert!(matches!(err, Error::UnknownOption(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_default_int_follows_int_bitwidth() -> Result<()> {
    let narrow = with_config(Config::default().with_int_bitwidth(32)?, || shared(7isize))?;
    assert_eq!(narrow.ty(), &iscalar());
    assert_eq!(item(&narrow), Scalar::I32(7));

    let wide = with_config(Config::default().with_int_bitwidth(64)?, || shared(7isize))?;
    assert_eq!(wide.ty(), &lscalar());
    Ok(())
}

#[test]
fn test_strict_generic() -> Result<()> {
    // generic can hold anything, even when strict
    let mut u = shared_with("asdf", SharedOptions::new().strict(false))?;
    let mut v = shared_with("asdf", SharedOptions::new().strict(true))?;
    u.set_value(88isize, false)?;
    v.set_value(88isize, false)?;
    assert_eq!(v.get_value(false), Value::int(88));
    Ok(())
}

#[test]
fn test_create_array_not_strict() -> Result<()> {
    let named = |value: Value| {
        SharedVariable::new(Some("u".into()), float64_vector().into(), value, false, None)
    };

    // exact representation
    named(HostArray::from_vec(vec![1.0f64, 2.0], 2)?.into())?;
    // castable sequences
    named(Value::list([Value::float(1.0), Value::float(2.0)]))?;
    named(Value::list([Value::int(1), Value::int(2)]))?;

    // not an array by any stretch
    let err = named(Value::map()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
    Ok(())
}

#[test]
fn test_use_array_not_strict() -> Result<()> {
    let mut u = SharedVariable::new(
        Some("u".into()),
        float64_vector().into(),
        HostArray::from_vec(vec![1.0f64, 2.0], 2)?,
        false,
        None,
    )?;

    // assignments are cast to the declared dtype
    u.set_value(Value::list([Value::int(3), Value::int(4)]), false)?;
    assert_eq!(u.get_value(true).as_array().map(HostArray::dtype), Some(DType::F64));
    assert_eq!(values(&u), vec![3.0, 4.0]);

    // nonsense is rejected
    let err = u.set_value("adsf", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
    assert_eq!(values(&u), vec![3.0, 4.0]);

    // a perfect value is stored without copying
    let uval = HostArray::from_vec(vec![5.0f64, 6.0, 7.0, 8.0], 4)?;
    u.set_value(uval.clone(), true)?;
    assert!(u.get_value(true).as_array().is_some_and(|a| a.ptr_eq(&uval)));
    assert!(!u.get_value(false).as_array().is_some_and(|a| a.ptr_eq(&uval)));

    // without borrow the caller keeps no alias
    u.set_value(uval.clone(), false)?;
    assert!(!u.get_value(true).as_array().is_some_and(|a| a.ptr_eq(&uval)));
    Ok(())
}

#[test]
fn test_round_trip_strict() -> Result<()> {
    let a = HostArray::from(ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1i16, 2, 3, 4]).unwrap());
    let v = shared_with(a.clone(), SharedOptions::new().strict(true))?;
    assert_eq!(v.ty(), &wmatrix());
    assert_eq!(v.get_value(false), Value::Array(a));
    Ok(())
}

#[test]
fn test_set_value_is_idempotent() -> Result<()> {
    let mut v = shared(HostArray::zeros(3, DType::F32))?;
    for _ in 0..3 {
        v.set_value(Value::list([Value::int(1), Value::int(2), Value::int(3)]), false)?;
        assert_eq!(values(&v), vec![1.0, 2.0, 3.0]);
        assert_eq!(v.dtype(), Some(DType::F32));
    }
    Ok(())
}

// Strict mode

fn strict(value: impl Into<Value>) -> Result<SharedVariable> {
    shared_with(value, SharedOptions::new().strict(true))
}

fn assert_rejected(var: &mut SharedVariable, value: impl Into<Value>) {
    let before = var.get_value(false);
    let err = var.set_value(value, false).unwrap_err();
    assert!(
        matches!(
            err.kind(),
            ErrorKind::StrictTypeMismatch | ErrorKind::LossyDowncast | ErrorKind::StructuralMismatch
        ),
        "unexpected error {:?}",
        err
    );
    assert_eq!(var.get_value(false), before);
}

#[test]
fn test_scalar_strict() -> Result<()> {
    let cases: Vec<(Value, TensorType, Value)> = vec![
        (7i64.into(), lscalar(), Value::float(8.23)),
        (7i32.into(), iscalar(), Value::float(8.23)),
        (7i16.into(), wscalar(), Value::float(8.23)),
        (7i8.into(), bscalar(), Value::float(8.23)),
        (7.234f64.into(), dscalar(), Value::int(8)),
        (7.234f32.into(), fscalar(), Value::int(8)),
        (Value::float(7.234), dscalar(), Value::int(8)),
    ];
    for (init, ty, next) in cases {
        let mut b = strict(init)?;
        assert_eq!(b.ty(), &ty);
        let err = b.set_value(next, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);
    }

    let mut b = shared(HostArray::zeros((5, 5), DType::F32))?;
    assert_rejected(&mut b, HostArray::rand_with((5, 5), &mut rng()));
    Ok(())
}

#[test]
fn test_tensor_strict() -> Result<()> {
    let cases: Vec<(HostArray, TensorType, Value)> = vec![
        (vector_of(7i64), lvector(), Value::float(8.23)),
        (vector_of(7i32), ivector(), Value::float(8.23)),
        (vector_of(7i16), wvector(), Value::float(8.23)),
        (vector_of(7i8), bvector(), Value::float(8.23)),
        (vector_of(7.234f64), dvector(), Value::int(8)),
        (vector_of(7.234f32), fvector(), Value::int(8)),
    ];
    for (init, ty, next) in cases {
        let mut b = strict(init)?;
        assert_eq!(b.ty(), &ty);
        assert_rejected(&mut b, next);
    }

    let mut b = shared(HostArray::zeros((5, 5), DType::F32))?;
    assert_rejected(&mut b, HostArray::rand_with((5, 5), &mut rng()));
    Ok(())
}

#[test]
fn test_unit_extent_vector_is_broadcastable() -> Result<()> {
    let mut b = strict(HostArray::from(arr1(&[7i64]).into_dyn()))?;
    assert_eq!(b.ty(), &TensorType::new(DType::I64, [true]));
    assert_ne!(b.ty(), &lvector());

    b.set_value(HostArray::from(arr1(&[8i64]).into_dyn()), false)?;
    assert_eq!(item(&b), Scalar::I64(8));
    let err = b.set_value(vector_of(8i64), false).unwrap_err();
    assert!(matches!(err, Error::BroadcastMismatch { dim: 0, .. }));
    Ok(())
}

#[test]
fn test_strict_rejects_safe_upcast_too() -> Result<()> {
    let mut b = strict(vector_of(1.5f64))?;
    let err = b.set_value(vector_of(2.5f32), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);
    Ok(())
}

// Downcasting

fn downcasting(value: impl Into<Value>) -> Result<SharedVariable> {
    shared_with(value, SharedOptions::new().allow_downcast(true))
}

#[test]
fn test_scalar_float_x() -> Result<()> {
    // the declared width comes from the initial value, never from float_x
    let cases: Vec<(Value, TensorType, Value, Scalar)> = vec![
        (7i64.into(), lscalar(), Value::float(8.23), Scalar::I64(8)),
        (7i32.into(), iscalar(), Value::float(8.23), Scalar::I32(8)),
        (7i16.into(), wscalar(), Value::float(8.23), Scalar::I16(8)),
        (7i8.into(), bscalar(), Value::float(8.23), Scalar::I8(8)),
        (7.234f64.into(), dscalar(), Value::int(8), Scalar::F64(8.0)),
        (7.234f32.into(), fscalar(), Value::int(8), Scalar::F32(8.0)),
        (Value::float(7.234), dscalar(), Value::int(8), Scalar::F64(8.0)),
    ];
    for (init, ty, next, expected) in cases {
        let mut b = downcasting(init)?;
        assert_eq!(b.ty(), &ty);
        b.set_value(next, false)?;
        assert_eq!(item(&b), expected);
    }

    let mut b = shared(HostArray::zeros((5, 5), DType::F32))?;
    assert_rejected(&mut b, HostArray::rand_with((5, 5), &mut rng()));
    Ok(())
}

#[test]
fn test_tensor_float_x() -> Result<()> {
    let cases: Vec<(HostArray, TensorType, Value)> = vec![
        (vector_of(7i64), lvector(), Value::list([Value::float(8.23), Value::float(8.23)])),
        (vector_of(7i32), ivector(), Value::list([Value::float(8.23), Value::float(8.23)])),
        (vector_of(7i16), wvector(), Value::list([Value::float(8.23), Value::float(8.23)])),
        (vector_of(7i8), bvector(), Value::list([Value::float(8.23), Value::float(8.23)])),
        (vector_of(7.234f64), dvector(), Value::list([Value::int(8), Value::int(8)])),
        (vector_of(7.234f32), fvector(), Value::list([Value::int(8), Value::int(8)])),
    ];
    for (init, ty, next) in cases {
        let mut b = downcasting(init)?;
        assert_eq!(b.ty(), &ty);
        b.set_value(next, false)?;
        assert_eq!(values(&b), vec![8.0, 8.0]);
    }

    for float_x in [DType::F32, DType::F64] {
        with_config(Config::default().with_float_x(float_x)?, || -> Result<()> {
            let mut b = downcasting(HostArray::from_vec(vec![7.234f64], 1)?.cast(float_x))?;
            assert_eq!(b.dtype(), Some(float_x));
            b.set_value(Value::list([Value::int(8)]), false)?;
            assert_eq!(values(&b), vec![8.0]);
            Ok(())
        })?;
    }

    let mut b = shared(HostArray::zeros((5, 5), DType::F32))?;
    assert_rejected(&mut b, HostArray::rand_with((5, 5), &mut rng()));
    Ok(())
}

#[test]
fn test_downcast_rejected_when_disallowed() -> Result<()> {
    let mut b = shared_with(7i32, SharedOptions::new().allow_downcast(false))?;
    let err = b.set_value(Value::float(8.23), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LossyDowncast);
    // exact values still pass
    b.set_value(Value::float(8.0), false)?;
    assert_eq!(item(&b), Scalar::I32(8));
    Ok(())
}

#[test]
fn test_host_float_into_float_x_variable() -> Result<()> {
    with_config(Config::default().with_float_x(DType::F32)?, || -> Result<()> {
        let mut b = shared(1.5f32)?;
        b.set_value(Value::float(0.1), false)?;
        assert_eq!(item(&b), Scalar::F32(0.1));

        let mut c = shared_with(1.5f32, SharedOptions::new().allow_downcast(false))?;
        let err = c.set_value(Value::float(0.1), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LossyDowncast);
        Ok(())
    })
}

// Structure

#[test]
fn test_structural_rejection() -> Result<()> {
    let mut v = shared(HostArray::zeros(5, DType::F64))?;
    let err = v.set_value(HostArray::zeros((5, 5), DType::F64), false).unwrap_err();
    assert!(matches!(err, Error::RankMismatch { expected: 1, got: 2 }));

    let mut row = shared(HostArray::zeros((1, 3), DType::F64))?;
    let err = row.set_value(HostArray::zeros((2, 3), DType::F64), false).unwrap_err();
    assert!(matches!(err, Error::BroadcastMismatch { dim: 0, .. }));
    row.set_value(HostArray::ones((1, 3), DType::F64), false)?;
    Ok(())
}

// Symbolic values

#[test]
fn test_err_symbolic_variable() -> Result<()> {
    let err = shared(graph::ones(&[2, 3], DType::F64)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    shared(HostArray::ones((2, 4), DType::F64))?;
    Ok(())
}

#[test]
fn test_set_value_rejects_symbolic() -> Result<()> {
    let mut g = shared("anything")?;
    let node = Symbolic::input(dmatrix()).with_name("x");
    let err = g.set_value(node, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(g.get_value(false), Value::from("anything"));
    Ok(())
}

#[test]
fn test_shared_as_graph_node() -> Result<()> {
    let w = shared_with(HostArray::zeros((3, 1), DType::F32), SharedOptions::new().name("w"))?;
    let node = w.as_symbolic();
    assert_eq!(node.id(), w.id());
    assert_eq!(node.origin(), &graph::Origin::Shared);
    assert_eq!(node.ty(), w.ty());
    Ok(())
}
