pub mod helper {
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct DropCounter<'a>(pub &'a AtomicUsize);

    impl Drop for DropCounter<'_> {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A payload whose last field is only set at the very end of its
    /// construction.
    pub(crate) struct Published {
        pub values: Vec<usize>,
        pub complete: bool,
    }

    impl Published {
        pub(crate) const LEN: usize = 1024;

        pub(crate) fn build() -> Self {
            let mut published = Published { values: Vec::new(), complete: false };
            published.values.extend(0..Self::LEN);
            published.complete = true;
            published
        }
    }
}

macro_rules! generate_tests {
    () => {
        use std::panic::{self, AssertUnwindSafe};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{mpsc, Arc, Barrier};
        use std::thread;
        use std::time::Duration;

        use crate::tests::helper::{DropCounter, Published};
        use crate::{ConstructError, UninitError};

        use super::{Coordinator, Holder, TryCoordinator};

        const THREADS: usize = 8;

        #[test]
        fn holder_uninit() {
            static HOLDER: Holder<usize> = Holder::uninit();
            assert!(!HOLDER.is_constructed());
            assert_eq!(HOLDER.payload(), Err(UninitError));
            assert_eq!(HOLDER.construction_count(), 0);
            assert_eq!(HOLDER.lock_acquisitions(), 0);

            let holder: Holder<i32> = Holder::uninit();
            assert_eq!(holder.into_inner(), None);
        }

        #[test]
        fn holder_new() {
            let holder = Holder::new(1);
            assert!(holder.is_constructed());
            assert_eq!(holder.payload(), Ok(&1));
            assert_eq!(*holder.get_or_construct(|| 2), 1);
            assert_eq!(holder.construction_count(), 1);
            assert_eq!(holder.lock_acquisitions(), 0);
            assert_eq!(holder.into_inner(), Some(1));
        }

        #[test]
        fn single_construction_under_contention() {
            let barrier = Arc::new(Barrier::new(THREADS));
            let holder = Arc::new(Holder::uninit());
            let calls = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..THREADS)
                .map(|id| {
                    let barrier = Arc::clone(&barrier);
                    let holder = Arc::clone(&holder);
                    let calls = Arc::clone(&calls);
                    thread::spawn(move || {
                        barrier.wait();
                        let res = holder.get_or_construct(|| {
                            calls.fetch_add(1, Ordering::Relaxed);
                            id
                        });
                        (*res, res as *const usize as usize)
                    })
                })
                .collect();

            let results: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

            // every thread observed the same value at the same address
            assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
            assert_eq!(holder.payload().map(|res| res as *const usize as usize), Ok(results[0].1));
            assert_eq!(calls.load(Ordering::Relaxed), 1);
            assert_eq!(holder.construction_count(), 1);
        }

        #[test]
        fn warm_path_takes_no_lock() {
            let holder = Arc::new(Holder::uninit());
            holder.get_or_construct(|| 0usize);
            assert_eq!(holder.lock_acquisitions(), 1);

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let holder = Arc::clone(&holder);
                    thread::spawn(move || {
                        for _ in 0..1_000 {
                            assert_eq!(*holder.get_or_construct(|| 1), 0);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(holder.lock_acquisitions(), 1);
            assert_eq!(holder.construction_count(), 1);
        }

        #[test]
        fn construction_happens_before_access() {
            let barrier = Arc::new(Barrier::new(THREADS));
            let holder: Arc<Holder<Published>> = Arc::new(Holder::uninit());

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let barrier = Arc::clone(&barrier);
                    let holder = Arc::clone(&holder);
                    thread::spawn(move || {
                        barrier.wait();
                        let published = loop {
                            // readers racing the constructor on the lock-free path
                            if let Ok(published) = holder.payload() {
                                break published;
                            }

                            if let Ok(published) =
                                holder.get_or_construct_timeout(Duration::from_micros(50), Published::build)
                            {
                                break published;
                            }
                        };

                        // the counter is bumped before publication, so any
                        // reader that sees the instance sees the count too
                        assert_eq!(holder.construction_count(), 1);
                        assert!(published.complete);
                        assert_eq!(published.values.len(), Published::LEN);
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(holder.construction_count(), 1);
        }

        #[test]
        fn retry_after_failed_construction() {
            let holder: Holder<i32> = Holder::uninit();

            let res = holder.try_get_or_construct(|| Err("out of resources"));
            assert_eq!(res, Err("out of resources"));
            assert!(!holder.is_constructed());
            assert_eq!(holder.construction_count(), 0);

            let res = holder.try_get_or_construct(|| Ok::<_, &str>(5));
            assert_eq!(res, Ok(&5));
            assert_eq!(holder.construction_count(), 1);
            assert_eq!(holder.lock_acquisitions(), 2);
        }

        #[test]
        fn retry_after_panicking_construction() {
            let holder: Arc<Holder<i32>> = Arc::new(Holder::uninit());

            let thread_holder = Arc::clone(&holder);
            thread::spawn(move || {
                thread_holder.get_or_construct(|| panic!("explicit panic"));
            })
            .join()
            .unwrap_err();

            let res = panic::catch_unwind(AssertUnwindSafe(|| {
                holder.get_or_construct(|| panic!("explicit panic"));
            }));
            assert!(res.is_err());
            assert!(!holder.is_constructed());

            // the lock has been released on each unwind
            assert_eq!(*holder.get_or_construct(|| 3), 3);
            assert_eq!(holder.construction_count(), 1);
        }

        #[test]
        fn lock_timeout_leaves_holder_untouched() {
            let holder: Arc<Holder<i32>> = Arc::new(Holder::uninit());
            let (started_tx, started_rx) = mpsc::channel();
            let (release_tx, release_rx) = mpsc::channel::<()>();

            let thread_holder = Arc::clone(&holder);
            let handle = thread::spawn(move || {
                *thread_holder.get_or_construct(|| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    7
                })
            });

            // the constructing thread holds the lock until it is released
            started_rx.recv().unwrap();
            let timeout = Duration::from_millis(20);
            let err = holder.get_or_construct_timeout(timeout, || 8).unwrap_err();
            assert_eq!(err.timeout(), timeout);

            match holder.try_get_or_construct_timeout(timeout, || Ok::<_, &str>(9)) {
                Err(ConstructError::LockTimeout(err)) => assert_eq!(err.timeout(), timeout),
                res => panic!("unexpected result: {:?}", res),
            }

            assert!(!holder.is_constructed());
            release_tx.send(()).unwrap();
            assert_eq!(handle.join().unwrap(), 7);

            assert_eq!(holder.get_or_construct_timeout(timeout, || 8), Ok(&7));
            assert_eq!(holder.construction_count(), 1);
        }

        #[test]
        fn failed_construction_with_timeout() {
            let holder: Holder<u8> = Holder::uninit();
            let res = holder.try_get_or_construct_timeout(Duration::from_millis(10), || Err("failed"));
            assert!(matches!(res, Err(ConstructError::Failed("failed"))));
            assert_eq!(holder.construction_count(), 0);
        }

        #[test]
        fn take_and_reconstruct() {
            let mut holder = Holder::uninit();
            holder.get_or_construct(|| String::from("first"));
            assert_eq!(holder.get_mut().map(|res| res.as_str()), Some("first"));
            assert_eq!(holder.take().as_deref(), Some("first"));
            assert!(holder.get_mut().is_none());

            holder.get_or_construct(|| String::from("second"));
            assert_eq!(holder.payload().map(String::as_str), Ok("second"));
            assert_eq!(holder.construction_count(), 2);
        }

        #[test]
        fn holder_drops_instance_once() {
            let count = AtomicUsize::new(0);

            let holder = Holder::uninit();
            holder.get_or_construct(|| DropCounter(&count));
            holder.get_or_construct(|| DropCounter(&count));
            drop(holder);
            assert_eq!(count.load(Ordering::Relaxed), 1);

            let holder = Holder::uninit();
            holder.get_or_construct(|| DropCounter(&count));
            let inner = holder.into_inner();
            assert_eq!(count.load(Ordering::Relaxed), 1);
            drop(inner);
            assert_eq!(count.load(Ordering::Relaxed), 2);
        }

        #[test]
        fn coordinator_constructs_once() {
            static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);
            static SHARED: Coordinator<Vec<usize>> = Coordinator::new(|| {
                CONSTRUCTED.fetch_add(1, Ordering::Relaxed);
                vec![1, 2, 3]
            });

            assert!(!Coordinator::is_constructed(&SHARED));

            let barrier = Arc::new(Barrier::new(THREADS));
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        Coordinator::get_shared(&SHARED) as *const Vec<usize> as usize
                    })
                })
                .collect();

            let addrs: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
            assert!(addrs.iter().all(|&addr| addr == addrs[0]));

            assert_eq!(SHARED.as_slice(), &[1, 2, 3]);
            assert_eq!(CONSTRUCTED.load(Ordering::Relaxed), 1);
            assert_eq!(Coordinator::construction_count(&SHARED), 1);
            assert_eq!(Coordinator::payload(&SHARED).map(Vec::len), Ok(3));
        }

        #[test]
        fn coordinator_payload_never_constructs() {
            static SHARED: Coordinator<&str> = Coordinator::new(|| "from init");

            assert_eq!(Coordinator::payload(&SHARED), Err(UninitError));
            assert_eq!(Coordinator::payload(&SHARED), Err(UninitError));
            assert!(!Coordinator::is_constructed(&SHARED));
            assert_eq!(Coordinator::lock_acquisitions(&SHARED), 0);

            assert_eq!(*Coordinator::get_shared(&SHARED), "from init");
            assert_eq!(Coordinator::payload(&SHARED), Ok(&"from init"));
            assert_eq!(Coordinator::construction_count(&SHARED), 1);
        }

        #[test]
        fn coordinator_injected() {
            let coordinator = Arc::new(Coordinator::new(|| AtomicUsize::new(0)));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let coordinator = Arc::clone(&coordinator);
                    thread::spawn(move || {
                        Coordinator::get_shared(&*coordinator).fetch_add(1, Ordering::Relaxed);
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            // every increment went through the one instance
            assert_eq!(coordinator.load(Ordering::Relaxed), THREADS);
            assert_eq!(Coordinator::construction_count(&*coordinator), 1);
        }

        #[test]
        fn try_coordinator_retries() {
            static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
            static SHARED: TryCoordinator<u32, String> = TryCoordinator::new(|| {
                match ATTEMPTS.fetch_add(1, Ordering::Relaxed) {
                    0 => Err(String::from("first attempt fails")),
                    _ => Ok(42),
                }
            });

            assert_eq!(TryCoordinator::try_get_shared(&SHARED), Err(String::from("first attempt fails")));
            assert!(!TryCoordinator::is_constructed(&SHARED));
            assert_eq!(TryCoordinator::try_get_shared(&SHARED), Ok(&42));
            assert_eq!(TryCoordinator::try_get_shared(&SHARED), Ok(&42));
            assert_eq!(ATTEMPTS.load(Ordering::Relaxed), 2);
            assert_eq!(TryCoordinator::construction_count(&SHARED), 1);

            let res = TryCoordinator::try_get_shared_timeout(&SHARED, Duration::from_millis(1));
            assert!(matches!(res, Ok(&42)));
        }

        #[test]
        fn coordinator_zero_timeout() {
            static SHARED: Coordinator<&str> = Coordinator::new(|| "ready");
            assert_eq!(Coordinator::get_shared_timeout(&SHARED, Duration::ZERO), Ok(&"ready"));
            assert_eq!(*SHARED, "ready");
        }
    };
}
