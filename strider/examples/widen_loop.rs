use strider::domain::{AbstractValue, StridedInterval};
use strider::{Backend, Datum, Op, Value};

/// Abstractly runs `i = 0; while i < n { i += 4 }` over 16-bit values, widening at the loop
/// head until the loop invariant for `i` stops changing.
fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .with_line_number(true)
        .init();

    let backend = Backend::new();
    let mut head: AbstractValue = StridedInterval::point(16, 0).unwrap().into();

    for iteration in 1.. {
        // one trip around the loop body: i + 4 for every i at the head, approximated by
        // shifting the bounds of the head by one stride
        let body = step(&head);
        let joined = backend
            .call(Op::Union, [Datum::from(head.clone()), body.into()], 16)
            .unwrap();
        let widened = backend
            .call(Op::Widen, [Datum::from(head.clone()), joined.into()], 16)
            .unwrap();
        let Value::Abstract(next) = widened else {
            unreachable!("widen yields abstract values");
        };
        tracing::info!(iteration, head = %head, next = %next, "loop head");
        if next == head {
            break;
        }
        head = next;
    }

    let head = Value::Abstract(head);
    tracing::info!(
        min = backend.min(&head).unwrap(),
        max = backend.max(&head).unwrap(),
        "fixpoint reached"
    );
    let four = Value::Abstract(StridedInterval::point(16, 4).unwrap().into());
    let five = Value::Abstract(StridedInterval::point(16, 5).unwrap().into());
    tracing::info!(
        "4 possible: {}, 5 possible: {}",
        backend.solution(&head, &four).unwrap(),
        backend.solution(&head, &five).unwrap()
    );
}

fn step(head: &AbstractValue) -> AbstractValue {
    let hull = head.hull().unwrap();
    let stride = hull.stride().max(4);
    // 0xfffc is the last multiple of 4 below 2^16, so the bumped bound stays in range
    let upper = (hull.upper_bound() + 4).min(0xfffc);
    StridedInterval::new(16, stride, hull.lower_bound() + 4, upper)
        .unwrap()
        .into()
}
