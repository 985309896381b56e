use std::sync::Arc;
use std::time::Duration;

use sched_lite::clock::SimClock;
use sched_lite::config::SimConfig;
use sched_lite::scheduler::assigner::OwnerAssigner;
use sched_lite::scheduler::{
    intake, IntakeHandle, Job, JobSpec, JobStatus, Migration, Orchestrator, Policy, SharedQueue,
    WorkQueue,
};

fn job(id: u64, owner: u64, priority: i64, service: f64) -> Job {
    let mut job = Job::admitted(id, JobSpec::new("test", priority, service), 0.0);
    job.owner = owner;
    job
}

fn started(mut job: Job) -> Job {
    job.first_run_time = Some(0.0);
    job
}

fn ids(queue: &WorkQueue) -> Vec<u64> {
    queue.jobs().iter().map(|j| j.id).collect()
}

/// Orchestrator over a fresh queue, plus the handle that feeds its intake.
fn orchestrator(servers: u64, policy: Policy) -> (Orchestrator, IntakeHandle, Arc<SharedQueue>) {
    let config = SimConfig::new(servers, policy, 2.0, 10);
    let (handle, rx) = intake(SimClock::new(Duration::from_millis(1)));
    let queue = Arc::new(SharedQueue::new());
    (Orchestrator::new(&config, rx, queue.clone()), handle, queue)
}

#[test]
fn test_assigner_cycles_through_servers() {
    let assigner = OwnerAssigner::new(3);
    let owners: Vec<u64> = (0..7).map(|_| assigner.assign_owner()).collect();
    assert_eq!(owners, vec![1, 2, 3, 1, 2, 3, 1]);
}

#[test]
fn test_single_server_always_owns() {
    let assigner = OwnerAssigner::new(1);
    for _ in 0..5 {
        assert_eq!(assigner.assign_owner(), 1);
    }
}

#[tokio::test]
async fn test_assign_owner_independent_of_policy() {
    for policy in [Policy::RoundRobin, Policy::ShortestJobFirst, Policy::Priority] {
        let (orch, _handle, _queue) = orchestrator(4, policy);
        let owners: Vec<u64> = (0..9).map(|_| orch.assign_owner()).collect();
        assert_eq!(owners, vec![1, 2, 3, 4, 1, 2, 3, 4, 1], "policy {policy}");
    }
}

#[tokio::test]
async fn test_admit_one_on_empty_intake_is_noop() {
    let (mut orch, _handle, queue) = orchestrator(2, Policy::RoundRobin);
    assert!(orch.admit_one().await.is_none());
    assert!(queue.lock().await.is_empty());
}

#[tokio::test]
async fn test_admit_one_takes_oldest_and_assigns_round_robin() {
    let (mut orch, handle, queue) = orchestrator(2, Policy::RoundRobin);
    for service in [3.0, 1.0, 2.0] {
        handle.submit(JobSpec::new("cpu", 1, service)).unwrap();
    }

    let first = orch.admit_one().await.unwrap();
    assert_eq!((first.job_id, first.owner, first.position), (1, 1, 0));
    let second = orch.admit_one().await.unwrap();
    assert_eq!((second.job_id, second.owner, second.position), (2, 2, 1));
    let third = orch.admit_one().await.unwrap();
    assert_eq!((third.job_id, third.owner, third.position), (3, 1, 2));
    assert!(orch.admit_one().await.is_none());

    let queue = queue.lock().await;
    assert_eq!(ids(&queue), vec![1, 2, 3]);
    assert!(queue.jobs().iter().all(|j| j.status == JobStatus::Waiting));
}

#[tokio::test]
async fn test_sjf_queue_non_decreasing_after_each_admission() {
    let (mut orch, handle, queue) = orchestrator(3, Policy::ShortestJobFirst);
    for service in [5.0, 1.0, 3.0, 3.0, 0.5, 8.0, 1.0] {
        handle.submit(JobSpec::new("cpu", 1, service)).unwrap();
        orch.admit_one().await.unwrap();

        let snapshot = queue.snapshot().await;
        assert!(snapshot
            .windows(2)
            .all(|w| w[0].remaining_service_time <= w[1].remaining_service_time));
    }

    // Equal service times keep admission order.
    let order: Vec<u64> = queue.snapshot().await.iter().map(|j| j.id).collect();
    assert_eq!(order, vec![5, 2, 7, 3, 4, 1, 6]);
}

#[tokio::test]
async fn test_priority_queue_non_decreasing_after_each_admission() {
    let (mut orch, handle, queue) = orchestrator(2, Policy::Priority);
    for priority in [3, 1, 3, 2, 1, 5] {
        handle.submit(JobSpec::new("cpu", priority, 1.0)).unwrap();
        orch.admit_one().await.unwrap();

        let snapshot = queue.snapshot().await;
        assert!(snapshot.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    let order: Vec<u64> = queue.snapshot().await.iter().map(|j| j.id).collect();
    assert_eq!(order, vec![2, 5, 4, 1, 3, 6]);
}

#[tokio::test]
async fn test_round_robin_admission_keeps_arrival_order() {
    let (mut orch, handle, queue) = orchestrator(3, Policy::RoundRobin);
    for (priority, service) in [(5, 9.0), (1, 1.0), (3, 4.0)] {
        handle.submit(JobSpec::new("cpu", priority, service)).unwrap();
        orch.admit_one().await.unwrap();
    }
    let order: Vec<u64> = queue.snapshot().await.iter().map(|j| j.id).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[test]
fn test_claim_takes_first_owned_job_only() {
    let mut queue = WorkQueue::new();
    queue.insert_ordered(job(1, 2, 1, 1.0), Policy::RoundRobin);
    queue.insert_ordered(job(2, 1, 1, 1.0), Policy::RoundRobin);
    queue.insert_ordered(job(3, 1, 1, 1.0), Policy::RoundRobin);

    let claimed = queue.claim(1).unwrap();
    assert_eq!(claimed.id, 2);
    assert_eq!(claimed.status, JobStatus::Running);
    assert_eq!(ids(&queue), vec![1, 3]);

    assert!(queue.claim(4).is_none());
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_requeue_appends_without_reranking() {
    let mut queue = WorkQueue::new();
    queue.insert_ordered(job(1, 1, 1, 4.0), Policy::ShortestJobFirst);
    queue.insert_ordered(job(2, 1, 1, 6.0), Policy::ShortestJobFirst);

    let mut short = job(3, 2, 1, 5.0);
    short.remaining_service_time = 0.5;
    short.status = JobStatus::Running;
    queue.requeue(short);

    assert_eq!(ids(&queue), vec![1, 2, 3]);
    let requeued = &queue.jobs()[2];
    assert_eq!(requeued.owner, 2);
    assert_eq!(requeued.status, JobStatus::Waiting);
}

#[test]
fn test_waiting_load_counts_only_unstarted_jobs() {
    let mut queue = WorkQueue::new();
    queue.requeue(job(1, 1, 1, 1.0));
    queue.requeue(job(2, 1, 1, 1.0));
    queue.requeue(started(job(3, 1, 1, 1.0)));
    queue.requeue(job(4, 3, 1, 1.0));
    queue.requeue(job(5, 9, 1, 1.0));

    let load = queue.waiting_load(3);
    assert_eq!(load.len(), 3);
    assert_eq!(load[&1], 2);
    assert_eq!(load[&2], 0);
    assert_eq!(load[&3], 1);
}

#[test]
fn test_rebalance_noop_when_balanced() {
    let mut queue = WorkQueue::new();
    queue.requeue(job(1, 1, 1, 1.0));
    queue.requeue(job(2, 1, 1, 1.0));
    queue.requeue(job(3, 2, 1, 1.0));
    assert!(queue.rebalance(2).is_none());
    assert!(queue.jobs().iter().take(2).all(|j| j.owner == 1));
}

#[test]
fn test_rebalance_noop_on_empty_or_single_server() {
    let mut empty = WorkQueue::new();
    assert!(empty.rebalance(3).is_none());

    let mut single = WorkQueue::new();
    for id in 1..=4 {
        single.requeue(job(id, 1, 1, 1.0));
    }
    assert!(single.rebalance(1).is_none());
}

#[test]
fn test_rebalance_moves_first_waiting_job_in_place() {
    let mut queue = WorkQueue::new();
    queue.requeue(job(1, 2, 1, 1.0));
    queue.requeue(started(job(2, 1, 1, 1.0)));
    queue.requeue(job(3, 1, 1, 1.0));
    queue.requeue(job(4, 1, 1, 1.0));
    queue.requeue(job(5, 1, 1, 1.0));

    let migration = queue.rebalance(3).unwrap();
    assert_eq!(
        migration,
        Migration {
            job_id: 3,
            from: 1,
            to: 3
        }
    );
    // Re-tagged in place, order untouched, started job never moves.
    assert_eq!(ids(&queue), vec![1, 2, 3, 4, 5]);
    assert_eq!(queue.jobs()[1].owner, 1);
    assert_eq!(queue.jobs()[2].owner, 3);
}

#[test]
fn test_rebalance_ties_pick_lowest_server_id() {
    let mut queue = WorkQueue::new();
    for id in 1..=3 {
        queue.requeue(job(id, 2, 1, 1.0));
    }
    for id in 4..=6 {
        queue.requeue(job(id, 3, 1, 1.0));
    }
    // Loads: 1 -> 0, 2 -> 3, 3 -> 3, 4 -> 0.
    let migration = queue.rebalance(4).unwrap();
    assert_eq!((migration.from, migration.to), (2, 1));
    assert_eq!(migration.job_id, 1);
}

#[test]
fn test_rebalance_moves_at_most_one_and_shrinks_imbalance() {
    let mut queue = WorkQueue::new();
    for id in 1..=6 {
        queue.requeue(job(id, 1, 1, 1.0));
    }

    let spread = |q: &WorkQueue| {
        let load = q.waiting_load(3);
        let max = *load.values().max().unwrap();
        let min = *load.values().min().unwrap();
        max - min
    };

    let mut previous = spread(&queue);
    while let Some(migration) = queue.rebalance(3) {
        let now = spread(&queue);
        assert!(now < previous, "imbalance {previous} -> {now} after {migration:?}");
        previous = now;
    }
    assert!(previous <= 1);

    let load = queue.waiting_load(3);
    assert_eq!(load.values().sum::<usize>(), 6);
}

#[tokio::test]
async fn test_orchestrator_rebalance_on_shared_queue() {
    let (orch, _handle, queue) = orchestrator(2, Policy::RoundRobin);
    queue.insert_ordered(job(1, 1, 1, 1.0), Policy::RoundRobin).await;
    queue.insert_ordered(job(2, 1, 1, 1.0), Policy::RoundRobin).await;

    let migration = orch.rebalance().await.unwrap();
    assert_eq!((migration.job_id, migration.from, migration.to), (1, 1, 2));
    assert!(orch.rebalance().await.is_none());
}

#[tokio::test]
async fn test_submit_after_intake_dropped_fails() {
    let (orch, handle, _queue) = orchestrator(2, Policy::RoundRobin);
    drop(orch);
    assert!(handle.submit(JobSpec::new("cpu", 1, 1.0)).is_err());
}
