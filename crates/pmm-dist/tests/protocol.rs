use std::thread;

use pmm_core::{plan, reference_multiply, Matrix, MultiplyEngine, Partition};
use pmm_dist::{
    send_rows, Communicator, Coordinator, DistError, DistributedEngine, Handshake, LocalWorld,
    Message, Tag, Worker, COORDINATOR,
};

fn sum_product(n: usize) -> (Matrix, Matrix) {
    let a = Matrix::from_fn(n, |i, j| (i + j) as f64).unwrap();
    let b = Matrix::from_fn(n, |i, j| (i * j) as f64).unwrap();
    (a, b)
}

#[test]
fn worker_receives_slice_and_full_b_in_order() {
    let n = 5;
    let (a, b) = sum_product(n);
    let mut world = LocalWorld::create(3);
    let second = world.pop().unwrap();
    let first = world.pop().unwrap();
    let coordinator = world.pop().unwrap();

    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|comm| thread::spawn(move || Worker::new(comm, n).run()))
        .collect();

    let c = Coordinator::new(coordinator).unwrap().run(&a, &b).unwrap();
    let parts: Vec<Partition> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(parts, plan(5, 2).unwrap().as_slice());
    assert_eq!(c, reference_multiply(&a, &b).unwrap());
}

#[test]
fn coordinator_sends_offset_rows_payload_then_b() {
    let n = 3;
    let (a, b) = sum_product(n);
    let mut world = LocalWorld::create(2);
    let worker = world.pop().unwrap();
    let coordinator = world.pop().unwrap();

    // Play the worker by hand and check each message as it arrives.
    let fake = thread::spawn(move || {
        let tag = Tag::FromCoordinator;
        assert_eq!(worker.recv(COORDINATOR, tag).unwrap(), Message::Count(0));
        assert_eq!(worker.recv(COORDINATOR, tag).unwrap(), Message::Count(3));
        let slice = match worker.recv(COORDINATOR, tag).unwrap() {
            Message::Values(v) => v,
            other => panic!("expected values, got {other:?}"),
        };
        let full_b = match worker.recv(COORDINATOR, tag).unwrap() {
            Message::Values(v) => v,
            other => panic!("expected values, got {other:?}"),
        };
        assert_eq!(slice.len(), 9);
        assert_eq!(full_b.len(), 9);

        let mut c = vec![0.0; 9];
        pmm_core::multiply_rows_dot(&slice, &full_b, &mut c, 3).unwrap();
        send_rows(&worker, COORDINATOR, Tag::FromWorker, Partition::new(0, 3), c).unwrap();
    });

    let c = Coordinator::new(coordinator).unwrap().run(&a, &b).unwrap();
    fake.join().unwrap();
    assert_eq!(c, reference_multiply(&a, &b).unwrap());
}

#[test]
fn zero_row_workers_complete_the_exchange() {
    let n = 2;
    let (a, b) = sum_product(n);
    let mut world = LocalWorld::create(5).into_iter();
    let coordinator = world.next().unwrap();

    let handles: Vec<_> = world
        .map(|comm| thread::spawn(move || Worker::new(comm, n).run()))
        .collect();

    let c = Coordinator::new(coordinator).unwrap().run(&a, &b).unwrap();
    let parts: Vec<Partition> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(parts.iter().filter(|p| p.is_empty()).count(), 2);
    assert_eq!(c, reference_multiply(&a, &b).unwrap());
}

#[test]
fn coordinator_rejects_foreign_partition() {
    let n = 4;
    let (a, b) = sum_product(n);
    let mut world = LocalWorld::create(2);
    let worker = world.pop().unwrap();
    let coordinator = world.pop().unwrap();

    let rogue = thread::spawn(move || {
        let delivery = Handshake::for_worker(n, COORDINATOR)
            .drive(&worker, Tag::FromCoordinator)
            .unwrap();
        assert_eq!(delivery.block.partition, Partition::new(0, 4));
        // Claim only half the rows back.
        send_rows(&worker, COORDINATOR, Tag::FromWorker, Partition::new(0, 2), vec![0.0; 8])
            .unwrap();
    });

    let err = Coordinator::new(coordinator).unwrap().run(&a, &b).unwrap_err();
    rogue.join().unwrap();
    assert!(matches!(err, DistError::Protocol { peer: 1, .. }));
}

#[test]
fn coordinator_needs_a_worker() {
    let mut world = LocalWorld::create(1);
    let err = Coordinator::new(world.pop().unwrap()).unwrap_err();
    assert!(matches!(err, DistError::InsufficientUnits { available: 1 }));
}

#[test]
fn coordinator_must_be_rank_zero() {
    let mut world = LocalWorld::create(2);
    let err = Coordinator::new(world.pop().unwrap()).unwrap_err();
    assert!(matches!(err, DistError::InvalidRank { rank: 1, size: 2 }));
}

#[test]
fn repeated_runs_are_bit_identical() {
    let (a, b) = sum_product(9);
    let engine = DistributedEngine::new(4).unwrap();
    assert_eq!(engine.multiply(&a, &b).unwrap(), engine.multiply(&a, &b).unwrap());
}

#[test]
fn coordinator_validates_before_sending() {
    let a = Matrix::zeros(3).unwrap();
    let b = Matrix::zeros(4).unwrap();
    let mut world = LocalWorld::create(2);
    let worker = world.pop().unwrap();
    let coordinator = world.pop().unwrap();

    let err = Coordinator::new(coordinator).unwrap().run(&a, &b).unwrap_err();
    assert!(matches!(err, DistError::Matrix(_)));
    // The coordinator is gone and left nothing queued for the worker.
    let err = worker.recv(COORDINATOR, Tag::FromCoordinator).unwrap_err();
    assert!(matches!(err, DistError::Disconnected { peer: COORDINATOR }));
}
