use crate::{Backend, BackendError, Datum, Expr, Op, Value};
use strider_domain::{
    AbstractValue, BitVec, BoolResult, DiscreteIntervalSet, Shape, StridedInterval, ValueSet,
};

fn si(bits: u32, lower: u128, upper: u128) -> AbstractValue {
    StridedInterval::new(bits, 1, lower, upper).unwrap().into()
}

fn pt(bits: u32, value: u128) -> AbstractValue {
    StridedInterval::point(bits, value).unwrap().into()
}

fn abs(value: Value) -> AbstractValue {
    value.into_abstract().expect("abstract result")
}

fn call(op: Op, args: impl IntoIterator<Item = Datum>, bits: u32) -> Result<Value, BackendError> {
    Backend::new().call(op, args, bits)
}

#[test]
fn comparison_scenario() {
    let three = pt(8, 3);
    let five = pt(8, 5);
    assert_eq!(
        call(Op::ULT, [three.clone().into(), five.clone().into()], 1),
        Ok(Value::Bool(BoolResult::True))
    );
    assert_eq!(
        call(Op::ULT, [five.into(), three.into()], 1),
        Ok(Value::Bool(BoolResult::False))
    );
    assert_eq!(
        call(Op::ULT, [si(8, 0, 10).into(), si(8, 5, 15).into()], 1),
        Ok(Value::Bool(BoolResult::Maybe))
    );
}

#[test]
fn commutative_reorder_keeps_meaning() {
    let x = si(8, 0, 4);
    let y = BitVec::new(8, 10).unwrap();
    assert_eq!(
        call(Op::ULT, [x.clone().into(), y.into()], 1),
        Ok(Value::Bool(BoolResult::True))
    );
    assert_eq!(
        call(Op::ULT, [y.into(), x.clone().into()], 1),
        Ok(Value::Bool(BoolResult::False))
    );
    // 10 < [0, 4] is asked of the interval as [0, 4] > 10
    assert_eq!(
        call(Op::ULT, [Datum::Int(10), x.clone().into()], 1),
        Ok(Value::Bool(BoolResult::False))
    );
    assert_eq!(
        call(Op::UGE, [Datum::Int(2), x.into()], 1),
        Ok(Value::Bool(BoolResult::Maybe))
    );
}

#[test]
fn comparisons_need_an_abstract_operand() {
    assert!(matches!(
        call(Op::ULT, [Datum::Int(3), Datum::Int(5)], 1),
        Err(BackendError::UnsupportedArguments(_))
    ));
    assert!(matches!(
        call(Op::SLT, [si(8, 0, 1).into()], 1),
        Err(BackendError::UnsupportedArgumentCount(_))
    ));
}

#[test]
fn signed_comparisons() {
    let minus_one = pt(8, 0xff);
    assert_eq!(
        call(Op::SLT, [minus_one.clone().into(), Datum::Int(1)], 1),
        Ok(Value::Bool(BoolResult::True))
    );
    assert_eq!(
        call(Op::SGT, [Datum::Int(1), minus_one.into()], 1),
        Ok(Value::Bool(BoolResult::True))
    );
}

#[test]
fn boolean_coercion_equivalence() {
    let natives = call(Op::And, [Datum::Native(true), Datum::Native(false)], 1);
    let results = call(
        Op::And,
        [BoolResult::True.into(), BoolResult::False.into()],
        1,
    );
    assert_eq!(natives, Ok(Value::Bool(BoolResult::False)));
    assert_eq!(natives, results);
    assert_eq!(
        call(Op::And, [BoolResult::True.into(), BoolResult::Maybe.into(), true.into()], 1),
        Ok(Value::Bool(BoolResult::Maybe))
    );
    for b in [BoolResult::True, BoolResult::False, BoolResult::Maybe] {
        let inner = Expr::new(Op::Not, [b.into()], 1);
        assert_eq!(call(Op::Not, [inner.into()], 1), Ok(Value::Bool(b)));
    }
    assert!(matches!(
        call(Op::And, [Datum::Int(1)], 1),
        Err(BackendError::UnsupportedType(_))
    ));
}

#[test]
fn conditional_join() {
    let t = si(8, 0, 4);
    let f = si(8, 10, 20);
    let joined = abs(call(Op::Union, [t.clone().into(), f.clone().into()], 8).unwrap());
    let ite = |cond: BoolResult, t: &AbstractValue, f: &AbstractValue| {
        abs(call(Op::If, [cond.into(), t.clone().into(), f.clone().into()], 8).unwrap())
    };
    assert_eq!(ite(BoolResult::Maybe, &t, &f), joined);
    assert_eq!(ite(BoolResult::True, &t, &f), t);
    assert_eq!(ite(BoolResult::False, &t, &f), f);
    for cond in [BoolResult::True, BoolResult::False, BoolResult::Maybe] {
        assert_eq!(ite(cond, &t, &t), t);
    }
    assert_eq!(
        call(
            Op::If,
            [BoolResult::Maybe.into(), true.into(), false.into()],
            1
        ),
        Ok(Value::Bool(BoolResult::Maybe))
    );
}

#[test]
fn symbolic_variables_keep_only_their_range() {
    let bounded = abs(call(
        Op::BVS,
        ["x".into(), Datum::Int(0), Datum::Int(16), Datum::Int(4)],
        32,
    )
    .unwrap());
    assert_eq!(bounded.name(), Some("x"));
    assert_eq!(bounded.bits(), 32);
    assert_eq!(bounded.eval(10), vec![0, 4, 8, 12, 16]);

    let free = abs(call(Op::BVS, ["y".into()], 16).unwrap());
    assert_eq!(free.hull().map(|h| h.is_top()), Some(true));
    assert!(matches!(
        call(Op::BVS, ["z".into(), Datum::Int(0)], 16),
        Err(BackendError::UnsupportedArgumentCount(_))
    ));
}

#[test]
fn concat_extract_inverse() {
    let a = BitVec::new(8, 0x12).unwrap();
    let b = BitVec::new(8, 0x34).unwrap();
    let concat = Expr::new(Op::Concat, [a.into(), b.into()], 16);
    let c = abs(Backend::new().dispatch(&concat).unwrap());
    assert_eq!(c.bits(), 16);
    assert_eq!(
        call(Op::Extract, [Datum::Int(15), Datum::Int(8), concat.clone().into()], 8),
        Ok(Value::Abstract(pt(8, 0x12)))
    );
    assert_eq!(
        call(Op::Extract, [Datum::Int(7), Datum::Int(0), concat.into()], 8),
        Ok(Value::Abstract(pt(8, 0x34)))
    );
}

#[test]
fn concat_widths_add_up() {
    let parts = [si(8, 0, 1).into(), pt(4, 2).into(), BitVec::new(4, 1).unwrap().into()];
    let c = abs(call(Op::Concat, parts, 16).unwrap());
    assert_eq!(c.bits(), 16);
    assert!(matches!(
        call(Op::Concat, [si(8, 0, 1).into(), Datum::Str("x".into())], 16),
        Err(BackendError::UnsupportedExprType(_))
    ));
}

#[test]
fn extract_rejects_raw_numbers() {
    assert!(matches!(
        call(Op::Extract, [Datum::Int(7), Datum::Int(0), Datum::Int(5)], 8),
        Err(BackendError::UnsupportedArgumentType(_))
    ));
}

#[test]
fn extension_width_law() {
    for x in [si(8, 0x10, 0x20), si(8, 0x90, 0xa0), pt(8, 0x80)] {
        let signed = abs(call(Op::SignExt, [Datum::Int(8), x.clone().into()], 16).unwrap());
        let zeroed = abs(call(Op::ZeroExt, [Datum::Int(8), x.clone().into()], 16).unwrap());
        assert_eq!(signed.bits(), 16);
        assert_eq!(zeroed.bits(), 16);
        assert_eq!(signed.extract(7, 0).unwrap(), x);
        assert_eq!(zeroed.extract(7, 0).unwrap(), x);
    }

    let bv = BitVec::new(8, 0x80).unwrap();
    assert_eq!(
        call(Op::SignExt, [Datum::Int(8), bv.into()], 16),
        Ok(Value::Abstract(pt(16, 0xff80)))
    );
    assert_eq!(
        call(Op::ZeroExt, [Datum::Int(8), bv.into()], 16),
        Ok(Value::Abstract(pt(16, 0x80)))
    );
}

#[test]
fn value_sets_cannot_be_extended() {
    let vs = ValueSet::new(32)
        .unwrap()
        .with_region("stack", StridedInterval::point(32, 8).unwrap())
        .unwrap();
    assert!(matches!(
        call(Op::SignExt, [Datum::Int(32), AbstractValue::from(vs).into()], 64),
        Err(BackendError::UnsupportedExprType(_))
    ));
}

#[test]
fn shifts_and_reversal() {
    let x = StridedInterval::new(16, 4, 16, 32).unwrap();
    assert_eq!(
        call(Op::LShR, [x.clone().into(), Datum::Int(2)], 16),
        Ok(Value::Abstract(si(16, 4, 8)))
    );
    assert_eq!(
        call(Op::Reverse, [pt(16, 0x1234).into()], 16),
        Ok(Value::Abstract(pt(16, 0x3412)))
    );
    let reversed = abs(call(Op::Reverse, [x.into()], 16).unwrap());
    assert!(reversed.is_reversed());
    assert!(matches!(
        call(Op::Reverse, [Datum::Int(3)], 16),
        Err(BackendError::UnsupportedExprType(_))
    ));
}

#[test]
fn reversal_round_trip() {
    let a = si(32, 0x1000, 0x2000);
    let b = si(32, 0x1800, 0x4000);
    let reverse = |v: &AbstractValue| abs(call(Op::Reverse, [v.clone().into()], 32).unwrap());
    let union_of_reversed = abs(call(Op::Union, [reverse(&a).into(), reverse(&b).into()], 32).unwrap());
    let union = abs(call(Op::Union, [a.into(), b.into()], 32).unwrap());
    assert_eq!(union_of_reversed, reverse(&union));
    assert!(union_of_reversed.is_reversed());
}

#[test]
fn set_operations_need_two_operands() {
    for op in [Op::Union, Op::Intersection, Op::Widen] {
        assert!(matches!(
            call(op, [si(8, 0, 1).into()], 8),
            Err(BackendError::UnsupportedArgumentCount(_))
        ));
    }
}

#[test]
fn mixed_shapes_lift_symmetrically() {
    let interval = si(32, 0, 8);
    let pointer: AbstractValue = ValueSet::new(32)
        .unwrap()
        .with_region("stack", StridedInterval::point(32, 64).unwrap())
        .unwrap()
        .into();
    let ab = abs(call(Op::Union, [interval.clone().into(), pointer.clone().into()], 32).unwrap());
    let ba = abs(call(Op::Union, [pointer.clone().into(), interval.clone().into()], 32).unwrap());
    assert_eq!(ab.shape(), Shape::ValueSet);
    assert_eq!(ab, ba);

    let set: AbstractValue = DiscreteIntervalSet::new(
        32,
        [
            StridedInterval::new(32, 1, 0, 2).unwrap(),
            StridedInterval::new(32, 1, 100, 102).unwrap(),
        ],
    )
    .unwrap()
    .into();
    let meet = abs(call(Op::Intersection, [interval.into(), set].map(Datum::from), 32).unwrap());
    assert_eq!(meet.shape(), Shape::Set);
    assert_eq!(meet.eval(10), vec![0, 1, 2]);
}

#[test]
fn widening_terminates() {
    let backend = Backend::new();
    let mut current = si(8, 0, 1);
    let mut steps = 0u128;
    loop {
        let bump = pt(8, 2 + steps);
        let grown = abs(backend
            .call(Op::Union, [current.clone().into(), bump.into()], 8)
            .unwrap());
        let next = abs(backend
            .call(Op::Widen, [current.clone().into(), grown.into()], 8)
            .unwrap());
        steps += 1;
        if next == current {
            break;
        }
        current = next;
        assert!(steps < 8, "widening did not stabilize");
    }
    assert!(current.hull().is_some_and(|h| h.is_top()));
}

#[test]
fn foreign_operands_are_rejected() {
    assert!(matches!(
        call(Op::Union, [si(8, 0, 1).into(), Datum::Foreign("Fraction".into())], 8),
        Err(BackendError::UnsupportedType(_))
    ));
}

#[test]
fn constructors() {
    assert_eq!(
        call(
            Op::StridedInterval,
            [Datum::Int(8), Datum::Int(2), Datum::Int(4), Datum::Int(10)],
            8
        ),
        Ok(Value::Abstract(
            StridedInterval::new(8, 2, 4, 10).unwrap().into()
        ))
    );
    let vs = abs(call(Op::ValueSet, ["heap".into(), si(64, 0, 16).into()], 64).unwrap());
    let AbstractValue::ValueSet(vs) = vs else {
        panic!("expected a value set");
    };
    assert_eq!(vs.get("heap").map(StridedInterval::upper_bound), Some(16));
}

#[test]
fn oversized_shift_amounts_clear_every_bit() {
    let high_bit = pt(8, 0x80);
    for amount in [8, 9, 256, i128::MAX] {
        assert_eq!(
            call(Op::LShR, [high_bit.clone().into(), Datum::Int(amount)], 8),
            Ok(Value::Abstract(pt(8, 0)))
        );
    }
    assert!(matches!(
        call(Op::LShR, [high_bit.into(), Datum::Int(-1)], 8),
        Err(BackendError::UnsupportedArgumentType(_))
    ));
}

#[test]
fn comparison_literals_must_fit_the_receiver() {
    let three = pt(8, 3);
    for literal in [256, -129] {
        assert!(matches!(
            call(Op::ULT, [three.clone().into(), Datum::Int(literal)], 1),
            Err(BackendError::UnsupportedArgumentType(_))
        ));
    }
    assert_eq!(
        call(Op::ULT, [three.into(), Datum::Int(255)], 1),
        Ok(Value::Bool(BoolResult::True))
    );
    assert_eq!(
        call(Op::SLT, [pt(8, 0xfe).into(), Datum::Int(-1)], 1),
        Ok(Value::Bool(BoolResult::True))
    );
}

#[test]
fn reversing_sets_and_value_sets() {
    let set: AbstractValue = DiscreteIntervalSet::new(
        16,
        [
            StridedInterval::new(16, 1, 0x100, 0x1ff).unwrap(),
            StridedInterval::new(16, 1, 0x1000, 0x10ff).unwrap(),
        ],
    )
    .unwrap()
    .into();
    let reversed = abs(call(Op::Reverse, [set.clone().into()], 16).unwrap());
    assert_eq!(reversed.shape(), Shape::Set);
    assert!(reversed.is_reversed());
    assert_eq!(reversed.eval(2), vec![0x0001, 0x0101]);
    assert_eq!(abs(call(Op::Reverse, [reversed.into()], 16).unwrap()), set);

    let pointer: AbstractValue = ValueSet::new(32)
        .unwrap()
        .with_region("stack", StridedInterval::new(32, 4, 0, 8).unwrap())
        .unwrap()
        .into();
    let reversed = abs(call(Op::Reverse, [pointer.clone().into()], 32).unwrap());
    assert_eq!(reversed.shape(), Shape::ValueSet);
    assert!(reversed.is_reversed());
    assert_eq!(reversed.eval(2), vec![0, 0x0400_0000]);
    assert_eq!(abs(call(Op::Reverse, [reversed.into()], 32).unwrap()), pointer);
}

#[test]
fn widening_value_sets() {
    let stack = |upper: u128| -> AbstractValue {
        ValueSet::new(32)
            .unwrap()
            .with_region("stack", StridedInterval::new(32, 4, 0, upper).unwrap())
            .unwrap()
            .into()
    };
    let widened = abs(call(Op::Widen, [stack(4).into(), stack(8).into()], 32).unwrap());
    assert_eq!(widened, stack(0xffff_fffc));
    let stable = abs(call(Op::Widen, [widened.clone().into(), stack(8).into()], 32).unwrap());
    assert_eq!(stable, widened);
}

#[test]
fn reversed_values_report_sound_bounds() {
    let backend = Backend::new();
    let x: Datum = si(16, 0x100, 0x1ff).into();
    let reversed = backend.call(Op::Reverse, [x], 16).unwrap();
    let samples = backend.eval(&reversed, 8).unwrap();
    let min = backend.min(&reversed).unwrap();
    let max = backend.max(&reversed).unwrap();
    assert!(!samples.is_empty());
    for sample in samples {
        let crate::Witness::Bits(v) = sample else {
            panic!("expected bit-vector samples");
        };
        assert!(min <= v && v <= max, "{v:#x} outside [{min:#x}, {max:#x}]");
    }
}

#[test]
fn intersecting_two_reversed_values() {
    let a = si(32, 0x1000, 0x2000);
    let b = si(32, 0x1800, 0x4000);
    let reverse = |v: &AbstractValue| abs(call(Op::Reverse, [v.clone().into()], 32).unwrap());
    let meet_of_reversed =
        abs(call(Op::Intersection, [reverse(&a).into(), reverse(&b).into()], 32).unwrap());
    let meet = abs(call(Op::Intersection, [a.into(), b.into()], 32).unwrap());
    assert_eq!(meet, si(32, 0x1800, 0x2000));
    assert!(meet_of_reversed.is_reversed());
    assert_eq!(meet_of_reversed, reverse(&meet));
}
