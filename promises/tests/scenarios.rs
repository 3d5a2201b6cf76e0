use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use promises::prelude::*;
use promises::promise::{all, PromiseError};
use promises::task::TaskQueue;
use promises_test::{assert_fulfilled, assert_pending, assert_rejected, drain, Kind, Recorder};

#[test]
fn increment_then_print() {
    let mut queue = TaskQueue::new();
    let printed = Recorder::new();

    let f = Promise::new(&queue.scheduler());
    let out = printed.clone();
    f.then(|v: u32| Ok(v + 1)).then(move |r| {
        out.record(r.to_string());
        Ok(())
    });
    f.resolve(41);

    assert!(printed.events().is_empty());
    drain(&mut queue);
    assert_eq!(printed.take(), ["42"]);
}

#[test]
fn thrown_error_reaches_rejection_handler() {
    let mut queue = TaskQueue::new();
    let printed = Recorder::new();

    let f = Promise::<u32>::new(&queue.scheduler());
    let g: Promise<u32> = f.then(|_| Err(Kind("Err1").into()));
    let out = printed.clone();
    g.catch(move |e| {
        out.record(e.downcast_ref::<Kind>().map_or("?", |kind| kind.0));
        Ok(0)
    });
    f.resolve(0);

    drain(&mut queue);
    assert_eq!(printed.take(), ["Err1"]);
}

#[test]
fn adopted_promise_rejected_later() {
    let mut queue = TaskQueue::new();
    let inner = Promise::<()>::new(&queue.scheduler());
    let f = Promise::<()>::new(&queue.scheduler());
    let adopted = inner.clone();
    let g = f.then(move |_| adopted);

    let timer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        inner.reject(Kind("Err2"));
    });
    f.resolve(());

    let reason = queue.run_until(g.clone()).unwrap().unwrap_err();
    assert_eq!(reason.downcast_ref::<Kind>(), Some(&Kind("Err2")));
    assert_rejected!(g, Kind("Err2"));
    timer.join().unwrap();
}

#[test]
fn self_resolution_is_a_type_error() {
    let mut queue = TaskQueue::new();
    let slot = Arc::new(Mutex::new(None::<Promise<u32>>));
    let f = Promise::<u32>::new(&queue.scheduler());
    let own = slot.clone();
    let g = f.then(move |_| own.lock().unwrap().take().unwrap());
    *slot.lock().unwrap() = Some(g.clone());
    f.resolve(1);

    drain(&mut queue);
    let reason = assert_rejected!(g, PromiseError::SelfResolution);
    assert_eq!(reason.to_string(), "a promise must not resolve with itself");
}

#[test]
fn transitive_adoption_through_three_promises() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();
    let (a, b, c) = (Promise::<u32>::new(&scheduler), Promise::<u32>::new(&scheduler), Promise::<u32>::new(&scheduler));

    let b2 = b.clone();
    let dependent = a.then(move |_| b2);
    a.resolve(0);
    drain(&mut queue);

    b.resolve_with(c.clone());
    assert_pending!(dependent);
    c.resolve(9);
    assert_fulfilled!(dependent, 9);
}

#[test]
fn module_constructors_and_combinators() {
    let mut queue = TaskQueue::new();
    let scheduler = queue.scheduler();

    let one = promises::resolve(&scheduler, Ok::<_, Reason>(1u32));
    let two = Promise::new(&scheduler);
    let both = all(&scheduler, vec![one.clone(), two.clone()]).map(|v| v.iter().sum::<u32>());
    assert!(promises::resolve(&scheduler, one.clone()).ptr_eq(&one));

    two.resolve(2);
    drain(&mut queue);
    assert_fulfilled!(both, 3);

    let failed: Promise<u32> = promises::reject(&scheduler, Kind("nope"));
    assert_eq!(failed.state(), State::Rejected);
}
