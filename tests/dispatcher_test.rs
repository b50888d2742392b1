//! Tests de integración del dispatcher
//! tests/dispatcher_test.rs
//!
//! Verifican concurrencia acotada, backpressure, orden FIFO y que ningún
//! job se pierda ni se ejecute dos veces. Los tests con tiempos usan
//! márgenes amplios para no ser frágiles en máquinas cargadas.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use work_dispatcher::jobs::{Dispatcher, DispatcherConfig, ExecutionMode, Job};

fn dispatcher(max_workers: usize, max_queue_size: usize) -> Dispatcher {
    let dispatcher = Dispatcher::new(DispatcherConfig {
        max_workers,
        max_queue_size,
        mode: ExecutionMode::Inline,
    })
    .unwrap();
    dispatcher.start().unwrap();
    dispatcher
}

/// Job que avisa que arrancó y espera a que lo liberen
fn gated_job(name: &str, started: Sender<String>) -> (Job, Sender<()>) {
    let (release_tx, release_rx): (Sender<()>, Receiver<()>) = mpsc::channel();
    let job_name = name.to_string();
    let job = Job::from_fn(name, move || {
        started.send(job_name).unwrap();
        let _ = release_rx.recv();
    });
    (job, release_tx)
}

/// Job que mide cuántos jobs corren a la vez
fn measured_job(name: String, current: &Arc<AtomicUsize>, peak: &Arc<AtomicUsize>, work: Duration) -> Job {
    let current = Arc::clone(current);
    let peak = Arc::clone(peak);
    Job::from_fn(name, move || {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(work);
        current.fetch_sub(1, Ordering::SeqCst);
    })
}

// ==================== Bounded Concurrency ====================

#[test]
fn test_concurrency_never_exceeds_max_workers() {
    let dispatcher = dispatcher(3, 4);
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    for i in 0..20 {
        dispatcher
            .submit(measured_job(format!("job-{}", i), &current, &peak, Duration::from_millis(20)))
            .unwrap();
    }
    dispatcher.shutdown();

    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {} exceeded 3 workers", peak);
    assert!(peak >= 1);
    assert_eq!(dispatcher.stats().completed, 20);
}

#[test]
fn test_detached_mode_is_not_bounded() {
    let dispatcher = Dispatcher::new(DispatcherConfig {
        max_workers: 1,
        max_queue_size: 10,
        mode: ExecutionMode::Detached,
    })
    .unwrap();
    dispatcher.start().unwrap();

    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for i in 0..5 {
        let job = measured_job(format!("job-{}", i), &current, &peak, Duration::from_millis(300));
        handles.push(dispatcher.submit_tracked(job).unwrap());
    }
    for handle in handles {
        assert!(handle.wait_timeout(Duration::from_secs(5)));
    }

    // Un solo worker, pero los jobs corrieron solapados
    assert!(peak.load(Ordering::SeqCst) > 1);
}

#[test]
fn test_detached_mode_accepts_any_job_name() {
    let dispatcher = Dispatcher::new(DispatcherConfig {
        max_workers: 1,
        max_queue_size: 4,
        mode: ExecutionMode::Detached,
    })
    .unwrap();
    dispatcher.start().unwrap();

    // Nombres como los que produce `/work?name=%00`
    let first = dispatcher
        .submit_tracked(Job::sleep("bad\0name", Duration::ZERO))
        .unwrap();
    let second = dispatcher
        .submit_tracked(Job::sleep("after", Duration::ZERO))
        .unwrap();

    assert!(first.wait_timeout(Duration::from_secs(5)));
    assert!(second.wait_timeout(Duration::from_secs(5)));
    dispatcher.shutdown();

    let stats = dispatcher.stats();
    assert_eq!(stats.started, 2);
    assert_eq!(stats.queued, 0);
}

// ==================== Backpressure ====================

#[test]
fn test_submit_blocks_when_workers_busy_and_queue_full() {
    let dispatcher = Arc::new(dispatcher(2, 1));
    let (started_tx, started_rx) = mpsc::channel();

    // Ocupar los dos workers
    let (j1, release1) = gated_job("j1", started_tx.clone());
    let (j2, release2) = gated_job("j2", started_tx.clone());
    dispatcher.submit(j1).unwrap();
    dispatcher.submit(j2).unwrap();
    for _ in 0..2 {
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    // Llena la cola (capacidad 1) sin bloquear
    let (j3, release3) = gated_job("j3", started_tx.clone());
    dispatcher.submit(j3).unwrap();

    // El siguiente debe bloquear
    let (accepted_tx, accepted_rx) = mpsc::channel();
    let submitter = {
        let dispatcher = Arc::clone(&dispatcher);
        thread::spawn(move || {
            dispatcher.submit(Job::sleep("j4", Duration::ZERO)).unwrap();
            accepted_tx.send(Instant::now()).unwrap();
        })
    };
    assert!(
        accepted_rx.recv_timeout(Duration::from_millis(300)).is_err(),
        "submit should block while the queue is full"
    );

    // Liberar un worker: toma j3 de la cola y deja lugar para j4
    let released_at = Instant::now();
    release1.send(()).unwrap();
    let accepted_at = accepted_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(accepted_at >= released_at);
    submitter.join().unwrap();

    assert_eq!(started_rx.recv_timeout(Duration::from_secs(5)).unwrap(), "j3");
    release2.send(()).unwrap();
    release3.send(()).unwrap();
    dispatcher.shutdown();

    assert_eq!(dispatcher.stats().completed, 4);
}

#[test]
fn test_scenario_two_workers_one_slot() {
    // max_workers=2, max_queue_size=1, tres jobs iguales
    let dispatcher = dispatcher(2, 1);
    let t0 = Instant::now();
    let starts = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();

    for name in ["j1", "j2", "j3"] {
        let starts = Arc::clone(&starts);
        let job = Job::from_fn(name, move || {
            starts.lock().unwrap().push((name, t0.elapsed()));
            thread::sleep(Duration::from_millis(400));
        });
        handles.push(dispatcher.submit_tracked(job).unwrap());
    }
    for handle in handles {
        assert!(handle.wait_timeout(Duration::from_secs(5)));
    }

    let starts = starts.lock().unwrap();
    let start_of = |job: &str| starts.iter().find(|(n, _)| *n == job).unwrap().1;

    assert!(start_of("j1") < Duration::from_millis(200));
    assert!(start_of("j2") < Duration::from_millis(200));
    // j3 espera a que se libere un worker
    assert!(start_of("j3") >= Duration::from_millis(350));
}

#[test]
fn test_scenario_rendezvous_single_worker() {
    // max_workers=1, max_queue_size=0: sin buffer, entrega directa
    let dispatcher = Arc::new(dispatcher(1, 0));
    let t0 = Instant::now();
    let mut submitters = Vec::new();

    for name in ["a", "b"] {
        let dispatcher = Arc::clone(&dispatcher);
        submitters.push(thread::spawn(move || {
            dispatcher
                .submit(Job::sleep(name, Duration::from_millis(400)))
                .unwrap();
            t0.elapsed()
        }));
    }

    let mut returned: Vec<Duration> = submitters.into_iter().map(|h| h.join().unwrap()).collect();
    returned.sort();

    // Uno entrega en mano al worker libre; el otro espera a que termine
    assert!(returned[0] < Duration::from_millis(200), "first returned at {:?}", returned[0]);
    assert!(returned[1] >= Duration::from_millis(350), "second returned at {:?}", returned[1]);

    dispatcher.shutdown();
}

// ==================== FIFO Delivery ====================

#[test]
fn test_jobs_dequeued_in_submission_order() {
    let dispatcher = dispatcher(1, 16);
    let (started_tx, started_rx) = mpsc::channel();
    let order = Arc::new(Mutex::new(Vec::new()));

    // Bloquear el worker para que la cola se acumule
    let (gate, release) = gated_job("gate", started_tx);
    dispatcher.submit(gate).unwrap();
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    for i in 0..10 {
        let order = Arc::clone(&order);
        dispatcher
            .submit(Job::from_fn(format!("job-{}", i), move || order.lock().unwrap().push(i)))
            .unwrap();
    }

    release.send(()).unwrap();
    dispatcher.shutdown();

    assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
}

// ==================== No Loss ====================

#[test]
fn test_every_job_runs_exactly_once() {
    const SUBMITTERS: usize = 3;
    const PER_SUBMITTER: usize = 50;

    let dispatcher = Arc::new(dispatcher(4, 2));
    let runs: Arc<Vec<AtomicUsize>> =
        Arc::new((0..SUBMITTERS * PER_SUBMITTER).map(|_| AtomicUsize::new(0)).collect());

    let submitters: Vec<_> = (0..SUBMITTERS)
        .map(|s| {
            let dispatcher = Arc::clone(&dispatcher);
            let runs = Arc::clone(&runs);
            thread::spawn(move || {
                for i in 0..PER_SUBMITTER {
                    let slot = s * PER_SUBMITTER + i;
                    let runs = Arc::clone(&runs);
                    dispatcher
                        .submit(Job::from_fn(format!("job-{}", slot), move || {
                            runs[slot].fetch_add(1, Ordering::SeqCst);
                        }))
                        .unwrap();
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().unwrap();
    }
    dispatcher.shutdown();

    for (slot, count) in runs.iter().enumerate() {
        assert_eq!(count.load(Ordering::SeqCst), 1, "job {} ran wrong number of times", slot);
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.submitted, SUBMITTERS * PER_SUBMITTER);
    assert_eq!(stats.completed, SUBMITTERS * PER_SUBMITTER);
    assert_eq!(stats.queued, 0);
}

#[test]
fn test_panicking_job_does_not_kill_pool() {
    let dispatcher = dispatcher(1, 4);

    dispatcher
        .submit(Job::from_fn("boom", || panic!("intentional job panic")))
        .unwrap();
    let handle = dispatcher
        .submit_tracked(Job::sleep("after", Duration::ZERO))
        .unwrap();

    assert!(handle.wait_timeout(Duration::from_secs(5)));
    dispatcher.shutdown();

    let stats = dispatcher.stats();
    assert_eq!(stats.panicked, 1);
    assert_eq!(stats.completed, 1);
}
