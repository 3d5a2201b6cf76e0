use promises_core::{Promise, PromiseError, Reason};
use promises_task::TaskQueue;
use promises_test::{assert_fulfilled, assert_pending, assert_rejected, drain, Kind};
use promises_util::{all, all_settled, any, race, AggregateError};

#[test]
fn all_keeps_input_order() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let ps: Vec<Promise<u32>> = (0..3).map(|_| Promise::new(&scheduler)).collect();
    let joined = all(&scheduler, ps.clone());

    ps[2].resolve(3);
    ps[0].resolve(1);
    drain(&mut queue);
    assert_pending!(joined);

    ps[1].resolve(2);
    drain(&mut queue);
    assert_fulfilled!(joined, vec![1, 2, 3]);
}

#[test]
fn all_rejects_with_first_rejection() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let a = Promise::<u32>::new(&scheduler);
    let b = Promise::<u32>::new(&scheduler);
    let joined = all(&scheduler, vec![a.clone(), b.clone()]);

    b.reject(Kind("first"));
    a.reject(Kind("second"));
    drain(&mut queue);
    assert_rejected!(joined, Kind("first"));
}

#[test]
fn all_of_nothing() {
    let queue = TaskQueue::new();
    let joined = all(&queue.scheduler(), Vec::<Promise<u8>>::new());
    assert_fulfilled!(joined, Vec::<u8>::new());
}

#[test]
fn all_settled_collects_every_outcome() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let a = Promise::<u32>::new(&scheduler);
    let b = Promise::<u32>::new(&scheduler);
    let settled = all_settled(&scheduler, vec![a.clone(), b.clone()]);

    b.reject(Kind("b"));
    drain(&mut queue);
    assert_pending!(settled);
    a.resolve(1);
    drain(&mut queue);

    let outcomes = settled.result().unwrap().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].as_ref().unwrap(), &1);
    assert_eq!(outcomes[1].as_ref().unwrap_err().downcast_ref::<Kind>(), Some(&Kind("b")));
}

#[test]
fn all_settled_of_nothing() {
    let queue = TaskQueue::new();
    let settled = all_settled(&queue.scheduler(), Vec::<Promise<u8>>::new());
    assert!(settled.result().unwrap().unwrap().is_empty());
}

#[test]
fn race_mirrors_first_settlement() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let a = Promise::<u32>::new(&scheduler);
    let b = Promise::<u32>::new(&scheduler);
    let first = race(&scheduler, vec![a.clone(), b.clone()]);

    b.reject(Kind("b lost the race"));
    a.resolve(1);
    drain(&mut queue);
    assert_rejected!(first, Kind("b lost the race"));
}

#[test]
fn race_of_nothing_stays_pending() {
    let mut queue = TaskQueue::new();
    let first = race(&queue.scheduler(), Vec::<Promise<u8>>::new());
    drain(&mut queue);
    assert_pending!(first);
}

#[test]
fn any_skips_rejections() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let a = Promise::<u32>::new(&scheduler);
    let b = Promise::<u32>::new(&scheduler);
    let c = Promise::<u32>::new(&scheduler);
    let first_ok = any(&scheduler, vec![a.clone(), b.clone(), c.clone()]);

    a.reject(Kind("a"));
    c.resolve(3);
    b.resolve(2);
    drain(&mut queue);
    assert_fulfilled!(first_ok, 3);
}

#[test]
fn any_aggregates_when_all_reject() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let a = Promise::<u32>::new(&scheduler);
    let b = Promise::<u32>::new(&scheduler);
    let first_ok = any(&scheduler, vec![a.clone(), b.clone()]);

    b.reject(Kind("b"));
    a.reject(Kind("a"));
    drain(&mut queue);

    let reason = assert_rejected!(first_ok);
    let aggregate = reason.downcast_ref::<AggregateError>().unwrap();
    let kinds: Vec<_> = aggregate.reasons().iter().map(|r| r.to_string()).collect();
    assert_eq!(kinds, ["a", "b"]);
    assert_eq!(reason.to_string(), "all 2 promises were rejected");
}

#[test]
fn any_of_nothing_rejects() {
    let queue = TaskQueue::new();
    let first_ok = any(&queue.scheduler(), Vec::<Promise<u8>>::new());
    let reason = assert_rejected!(first_ok);
    assert!(reason.downcast_ref::<AggregateError>().unwrap().reasons().is_empty());
}

#[test]
fn combinators_accept_settled_inputs() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let done = promises_core::resolve(&scheduler, Ok::<_, Reason>(1u32));
    let failed: Promise<u32> = promises_core::reject(&scheduler, PromiseError::Message("x".into()));

    let joined = all(&scheduler, vec![done.clone(), done.clone()]);
    let first = race(&scheduler, vec![failed.clone(), done.clone()]);
    drain(&mut queue);
    assert_fulfilled!(joined, vec![1, 1]);
    assert_rejected!(first, PromiseError::Message("x".into()));
}
