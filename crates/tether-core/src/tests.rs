#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use crate::COMPOSER;
    use crate::effects_ext::disposable_effect;
    use crate::executor::*;
    use crate::reactive;
    use crate::remember_with_key;
    use crate::runtime::*;
    use crate::scope::*;
    use crate::signal::*;
    use crate::view::*;
    use crate::{RuntimeError, on_unmount};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);

        let old = Rc::new(RefCell::new(None));
        let o = old.clone();
        sig.replace_then(7, move |prev| *o.borrow_mut() = Some(prev));
        assert_eq!(*old.borrow(), Some(101));
        assert_eq!(sig.with(|v| *v * 2), 14);
    }

    #[test]
    fn test_subscriber_writes_to_its_own_signal() {
        let sig = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = sig.clone();
        let log = seen.clone();
        sig.subscribe(move |v| {
            log.borrow_mut().push(*v);
            if *v == 1 {
                s.set(2);
                // Still notifying the first write.
                assert_eq!(s.get(), 1);
            }
        });

        sig.set(1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(sig.get(), 2);
        assert!(!sig.is_notifying());
    }

    #[test]
    fn test_write_inside_with_is_applied_after_it_returns() {
        let sig = signal(vec![1, 2]);
        let s = sig.clone();
        let len = sig.with(move |v| {
            s.update(|v| v.push(3));
            v.len()
        });
        assert_eq!(len, 2);
        assert_eq!(sig.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subscriber_can_unsubscribe_and_replace_during_notify() {
        let sig = signal(String::from("a"));
        let taken = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(RefCell::new(0));

        let id = Rc::new(RefCell::new(None));
        let (s, t, c, i) = (sig.clone(), taken.clone(), calls.clone(), id.clone());
        let sub = sig.subscribe(move |v| {
            *c.borrow_mut() += 1;
            if v == "b" {
                if let Some(id) = i.borrow_mut().take() {
                    assert!(s.unsubscribe(id));
                }
                let t = t.clone();
                s.replace_then(String::new(), move |old| t.borrow_mut().push(old));
            }
        });
        *id.borrow_mut() = Some(sub);

        sig.set("b".into());
        assert_eq!(*taken.borrow(), vec!["b".to_string()]);
        assert_eq!(sig.get(), "");
        assert_eq!(sig.subscriber_count(), 0);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let id = sig.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        sig.set(42);
        sig.update(|v| *v += 1);
        assert_eq!(*seen.borrow(), vec![42, 43]);

        assert!(sig.unsubscribe(id));
        assert!(!sig.unsubscribe(id));
        sig.set(0);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(sig.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_can_read_other_signals() {
        let a = signal(1);
        let b = signal(10);
        let sum = Rc::new(RefCell::new(0));

        let (b2, sum2) = (b.clone(), sum.clone());
        a.subscribe(move |v| *sum2.borrow_mut() = *v + b2.get());
        a.set(5);
        assert_eq!(*sum.borrow(), 15);
    }

    #[test]
    fn test_scope_drop_runs_disposers() {
        let cleaned_up = Rc::new(RefCell::new(false));

        {
            let scope = Scope::new();
            let cleaned_up_clone = cleaned_up.clone();
            scope.add_disposer(move || {
                *cleaned_up_clone.borrow_mut() = true;
            });

            assert!(!*cleaned_up.borrow());
        }

        assert!(*cleaned_up.borrow());
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let scope = Scope::new();
        let child = scope.child();
        let o = order.clone();
        scope.add_disposer(move || o.borrow_mut().push("parent"));
        let o = order.clone();
        child.add_disposer(move || o.borrow_mut().push("child"));

        assert!(order.borrow().is_empty());
        let handle = scope.clone();
        scope.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
        assert!(handle.is_disposed());

        // registering on a dead scope runs right away
        let o = order.clone();
        handle.add_disposer(move || o.borrow_mut().push("late"));
        assert_eq!(order.borrow().last(), Some(&"late"));
    }

    #[test]
    fn test_key_based_remember() {
        COMPOSER.with(|c| c.borrow_mut().keyed_slots.clear());

        let val1 = remember_with_key("test", || 42);
        let val2 = remember_with_key("test", || 100);

        // Should return the same instance
        assert_eq!(*val1, 42);
        assert_eq!(*val2, 42);
    }

    #[test]
    fn test_composition_keeps_slots_between_frames() {
        let host = Composition::new();
        let counter = || {
            let n = remember_state(|| 0u32);
            *n.borrow_mut() += 1;
            Text(n.borrow().to_string())
        };

        assert_eq!(host.compose(counter).unwrap().texts(), ["1"]);
        assert_eq!(host.compose(counter).unwrap().texts(), ["2"]);
        assert_eq!(host.frame(), 2);
    }

    #[test]
    fn test_compositions_are_independent() {
        let a = Composition::new();
        let b = Composition::new();
        let counter = || {
            let n = remember_state(|| 0u32);
            *n.borrow_mut() += 1;
            Text(n.borrow().to_string())
        };

        a.compose(counter).unwrap();
        a.compose(counter).unwrap();
        assert_eq!(b.compose(counter).unwrap().texts(), ["1"]);
        assert_eq!(a.compose(counter).unwrap().texts(), ["3"]);
    }

    #[test]
    fn test_dispose_runs_scoped_cleanups_once() {
        init_logs();
        let runs = Rc::new(RefCell::new(0));
        let host = Composition::new();

        let content = {
            let runs = runs.clone();
            move || {
                let runs = runs.clone();
                disposable_effect((), move || on_unmount(move || *runs.borrow_mut() += 1));
                Empty()
            }
        };

        host.compose(content.clone()).unwrap();
        host.compose(content).unwrap();
        assert_eq!(*runs.borrow(), 0);

        host.dispose();
        host.dispose();
        assert_eq!(*runs.borrow(), 1);
        assert!(host.is_disposed());
        assert!(matches!(host.compose(Empty), Err(RuntimeError::Disposed)));
    }

    #[test]
    fn test_disposable_effect_reruns_on_key_change() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let host = Composition::new();

        for key in [1, 1, 2] {
            let log = log.clone();
            host.compose(move || {
                disposable_effect(key, move || {
                    log.borrow_mut().push(format!("start {key}"));
                    on_unmount(move || log.borrow_mut().push(format!("stop {key}")))
                });
                Empty()
            })
            .unwrap();
        }
        host.dispose();

        assert_eq!(
            *log.borrow(),
            vec!["start 1", "stop 1", "start 2", "stop 2"]
        );
    }

    #[test]
    fn test_signal_read_marks_composition_dirty() {
        let host = Composition::new();
        let name = signal("Jane".to_string());
        assert!(host.needs_recompose());

        let n = name.clone();
        host.compose(move || Text(n.get())).unwrap();
        assert!(!host.needs_recompose());

        name.set("Doe".into());
        assert!(host.needs_recompose());

        host.dispose();
        assert!(!host.needs_recompose());
    }

    #[test]
    fn test_untracked_read_does_not_mark_dirty() {
        let host = Composition::new();
        let count = signal(1);

        let c = count.clone();
        host.compose(move || Text(reactive::untracked(|| c.get()).to_string()))
            .unwrap();
        count.set(2);
        assert!(!host.needs_recompose());
    }

    #[test]
    fn test_view_helpers() {
        let v = Column(vec![Text("a"), Fragment(vec![Empty(), Text("b")])]);
        assert_eq!(v.texts(), ["a", "b"]);
        assert!(!v.is_empty());
        assert!(Fragment(vec![Empty(), Fragment(vec![])]).is_empty());
        assert_eq!(View::default().kind, ViewKind::Empty);
    }

    #[test]
    fn test_spawn_outside_executor_fails() {
        assert!(!has_executor());
        let err = spawn_local(async {}).unwrap_err();
        assert!(matches!(err, RuntimeError::NoExecutor));

        let rt = Executor::manual();
        assert!(rt.enter(has_executor));
        assert!(!has_executor());
    }

    #[test]
    fn test_manual_executor_fires_timers_in_order() {
        init_logs();
        let rt = Executor::manual();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (ms, tag) in [(300u64, "slow"), (100, "fast"), (200, "mid")] {
            let log = log.clone();
            rt.enter(|| {
                spawn_local(async move {
                    sleep(Duration::from_millis(ms)).await;
                    log.borrow_mut().push(tag);
                })
            })
            .unwrap();
        }

        rt.run_until_stalled();
        assert_eq!(rt.pending_timers(), 3);

        rt.advance(Duration::from_millis(150)).unwrap();
        assert_eq!(*log.borrow(), vec!["fast"]);

        rt.advance(Duration::from_millis(150)).unwrap();
        assert_eq!(*log.borrow(), vec!["fast", "mid", "slow"]);
        assert_eq!(rt.pending_timers(), 0);
    }

    #[test]
    fn test_chained_sleeps_within_one_advance() {
        let rt = Executor::manual();
        let start = rt.now();
        let done_at = Rc::new(RefCell::new(None));

        let d = done_at.clone();
        rt.spawn(async move {
            sleep(Duration::from_millis(100)).await;
            sleep(Duration::from_millis(100)).await;
            *d.borrow_mut() = Some(());
        })
        .unwrap();

        rt.advance(Duration::from_millis(250)).unwrap();
        assert!(done_at.borrow().is_some());
        assert_eq!(rt.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn test_run_drains_manual_timers() {
        let rt = Executor::manual();
        let hit = Rc::new(RefCell::new(false));

        let h = hit.clone();
        rt.spawn(async move {
            sleep(Duration::from_secs(60)).await;
            *h.borrow_mut() = true;
        })
        .unwrap();

        rt.run();
        assert!(*hit.borrow());
    }

    #[test]
    fn test_advance_requires_manual_clock() {
        let rt = Executor::system();
        assert!(!rt.is_manual());
        assert!(matches!(
            rt.advance(Duration::from_millis(1)),
            Err(RuntimeError::ClockNotManual)
        ));
    }

    #[test]
    fn test_dropped_sleep_unregisters_timer() {
        let rt = Executor::manual();
        rt.spawn(async {
            let mut fut = std::pin::pin!(sleep(Duration::from_millis(10)));
            assert!(futures::poll!(fut.as_mut()).is_pending());
        })
        .unwrap();
        rt.run_until_stalled();
        assert_eq!(rt.pending_timers(), 0);
    }
}
