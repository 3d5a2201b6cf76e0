use promises_core::{Promise, PromiseError, Reason, State};
use promises_task::{Job, ScheduleError, Scheduler, TaskQueue};
use promises_test::{assert_fulfilled, assert_pending, assert_rejected, drain, Kind, Recorder};

#[test]
fn handlers_never_run_synchronously() {
    let mut queue = TaskQueue::new();
    let recorder = Recorder::new();

    let p = Promise::new(&queue.scheduler());
    p.resolve(1u32);
    let r = recorder.clone();
    let q = p.then(move |v| {
        r.record(format!("handler {}", v));
        Ok(v)
    });
    recorder.record("after then");

    assert_pending!(q);
    assert_eq!(recorder.events(), ["after then"]);
    assert_eq!(drain(&mut queue), 1);
    assert_eq!(recorder.take(), ["after then", "handler 1"]);
    assert_fulfilled!(q, 1);
}

#[test]
fn settling_does_not_run_handlers_inline() {
    let mut queue = TaskQueue::new();
    let recorder = Recorder::new();

    let p = Promise::<u32>::new(&queue.scheduler());
    let r = recorder.clone();
    let _q = p.then(move |_| {
        r.record("handler");
        Ok(())
    });
    p.resolve(0);
    recorder.record("after resolve");
    drain(&mut queue);
    assert_eq!(recorder.take(), ["after resolve", "handler"]);
}

#[test]
fn fan_out_runs_every_handler_once_in_order() {
    let mut queue = TaskQueue::new();
    let recorder = Recorder::new();
    let p = Promise::<u32>::new(&queue.scheduler());

    let dependents: Vec<Promise<u32>> = (0..5)
        .map(|i| {
            let r = recorder.clone();
            p.then(move |v| {
                r.record(format!("{}:{}", i, v));
                Ok(v + i)
            })
        })
        .collect();

    p.resolve(10);
    drain(&mut queue);
    assert_eq!(recorder.take(), ["0:10", "1:10", "2:10", "3:10", "4:10"]);
    for (i, d) in dependents.iter().enumerate() {
        assert_fulfilled!(d, 10 + i as u32);
    }

    // settling again runs nothing
    p.resolve(11);
    assert_eq!(drain(&mut queue), 0);
    assert!(recorder.events().is_empty());
}

#[test]
fn attach_after_settle_does_not_rerun_earlier_handlers() {
    let mut queue = TaskQueue::new();
    let recorder = Recorder::new();
    let p = Promise::<u32>::new(&queue.scheduler());

    let r = recorder.clone();
    let first = p.then(move |v| {
        r.record("first");
        Ok(v)
    });
    p.resolve(3);
    drain(&mut queue);

    let r = recorder.clone();
    let second = first.then(move |v| {
        r.record("second");
        Ok(v * 2)
    });
    drain(&mut queue);
    assert_eq!(recorder.take(), ["first", "second"]);
    assert_fulfilled!(second, 6);
}

#[test]
fn fifo_across_unrelated_chains() {
    let mut queue = TaskQueue::new();
    let recorder = Recorder::new();
    let a = Promise::<u32>::new(&queue.scheduler());
    let b = Promise::<u32>::new(&queue.scheduler());

    for (name, p) in [("a", &a), ("b", &b)].iter() {
        let r1 = recorder.clone();
        let r2 = recorder.clone();
        let name = *name;
        p.then(move |v| {
            r1.record(format!("{}1", name));
            Ok(v)
        })
        .then(move |v| {
            r2.record(format!("{}2", name));
            Ok(v)
        });
    }

    a.resolve(0);
    b.resolve(0);
    drain(&mut queue);
    assert_eq!(recorder.take(), ["a1", "b1", "a2", "b2"]);
}

#[test]
fn rejection_skips_fulfillment_handlers() {
    let mut queue = TaskQueue::new();
    let recorder = Recorder::new();
    let p = Promise::<u32>::new(&queue.scheduler());

    let r = recorder.clone();
    let skipped = p.then(move |v| {
        r.record("never");
        Ok(v)
    });
    let r = recorder.clone();
    let caught = skipped.catch(move |reason| {
        r.record(format!("caught {}", reason));
        Ok(0)
    });

    p.reject(Kind("E"));
    // the pass-through happens during relay, without a task hop
    assert_rejected!(skipped, Kind("E"));
    drain(&mut queue);
    assert_eq!(recorder.take(), ["caught E"]);
    assert_fulfilled!(caught, 0);
}

#[test]
fn fulfillment_skips_rejection_handlers() {
    let mut queue = TaskQueue::new();
    let p = Promise::<u32>::new(&queue.scheduler());
    let caught = p.catch(|_| Ok(99));
    p.resolve(1);
    assert_fulfilled!(caught, 1);
    assert_eq!(drain(&mut queue), 0);
}

#[test]
fn attach_runs_the_matching_handler() {
    let mut queue = TaskQueue::new();
    let ok = Promise::<u32>::new(&queue.scheduler());
    let err = Promise::<u32>::new(&queue.scheduler());

    let from_ok = ok.attach(|v| Ok(format!("value {}", v)), |r| Ok(format!("reason {}", r)));
    let from_err = err.attach(|v| Ok(format!("value {}", v)), |r| Ok(format!("reason {}", r)));
    ok.resolve(1);
    err.reject(Kind("bad"));
    drain(&mut queue);

    assert_fulfilled!(from_ok, "value 1".to_string());
    assert_fulfilled!(from_err, "reason bad".to_string());
}

#[test]
fn forward_mirrors_both_outcomes() {
    let mut queue = TaskQueue::new();
    let ok = Promise::<u32>::new(&queue.scheduler());
    let err = Promise::<u32>::new(&queue.scheduler());
    let ok2 = ok.forward();
    let err2 = err.forward();

    ok.resolve(2);
    err.reject(Kind("x"));
    assert_fulfilled!(ok2, 2);
    assert_rejected!(err2, Kind("x"));
    assert_eq!(drain(&mut queue), 0);
}

#[test]
fn handler_error_rejects_dependent() {
    let mut queue = TaskQueue::new();
    let p = Promise::<u32>::new(&queue.scheduler());
    let q: Promise<u32> = p.then(|_| Err(Kind("thrown").into()));
    p.resolve(0);
    drain(&mut queue);
    assert_rejected!(q, Kind("thrown"));
}

#[test]
fn handler_panic_rejects_dependent() {
    let mut queue = TaskQueue::new();
    let p = Promise::<u32>::new(&queue.scheduler());
    let q: Promise<u32> = p.then(|_| -> Result<u32, Reason> { panic!("handler exploded") });
    p.resolve(0);
    drain(&mut queue);
    assert_rejected!(q, PromiseError::Panicked("handler exploded".to_string()));
}

#[test]
fn rejection_handler_can_rethrow() {
    let mut queue = TaskQueue::new();
    let p = Promise::<u32>::new(&queue.scheduler());
    let q = p.catch(|reason| Err(Reason::msg(format!("wrapped: {}", reason))));
    p.reject(Kind("inner"));
    drain(&mut queue);
    assert_eq!(assert_rejected!(q).to_string(), "wrapped: inner");
}

#[test]
fn dependents_share_the_scheduler() {
    let queue = TaskQueue::new();
    let p = Promise::<u32>::new(&queue.scheduler());
    let q = p.then(|v| Ok(v));
    assert!(q.scheduler().same_queue(p.scheduler()));
}

#[test]
fn refused_jobs_reject_the_dependent() {
    let queue = TaskQueue::new();
    let p = Promise::<u32>::new(&queue.scheduler());
    let q = p.then(|v| Ok(v));
    drop(queue);

    p.resolve(1);
    assert_rejected!(q, PromiseError::SchedulerGone(ScheduleError::Shutdown));
}

#[test]
fn custom_scheduler() {
    let jobs = std::sync::Arc::new(std::sync::Mutex::new(Vec::<Job>::new()));
    let sink = jobs.clone();
    let scheduler = Scheduler::new(move |job: Job| {
        sink.lock().unwrap().push(job);
        Ok::<(), ScheduleError>(())
    });

    let p = Promise::<u32>::new(&scheduler);
    let q = p.then(|v| Ok(v + 1));
    p.resolve(1);
    assert_eq!(q.state(), State::Pending);

    let pending: Vec<Job> = jobs.lock().unwrap().drain(..).collect();
    assert_eq!(pending.len(), 1);
    for job in pending {
        job();
    }
    assert_fulfilled!(q, 2);
}

#[test]
fn long_catch_only_chain_passes_the_value() {
    let mut queue = TaskQueue::new();
    let root = Promise::<u32>::new(&queue.scheduler());
    let mut last = root.clone();
    for _ in 0..50_000 {
        last = last.catch(|_| Ok(0));
    }
    let tail = last.then(|v| Ok(v + 1));

    root.resolve(41);
    assert_fulfilled!(last, 41);
    assert_eq!(drain(&mut queue), 1);
    assert_fulfilled!(tail, 42);
}
