use once_cell::sync::Lazy;
use prometheus::{register_gauge, register_histogram, register_int_counter, Gauge, Histogram, IntCounter};

pub struct SchedulerMetrics {
    pub tasks_submitted: IntCounter,
    pub tasks_completed: IntCounter,
    pub tasks_failed: IntCounter,
    pub tasks_reclaimed: IntCounter,
    pub pending_tasks: Gauge,
    pub assignment_latency_ms: Histogram,
}

impl SchedulerMetrics {
    fn new() -> Self {
        SchedulerMetrics {
            tasks_submitted: register_int_counter!(
                "nimbus_scheduler_tasks_submitted",
                "Number of tasks admitted by the scheduler"
            )
            .expect("register tasks_submitted"),
            tasks_completed: register_int_counter!(
                "nimbus_scheduler_tasks_completed",
                "Number of tasks that reached the Completed state"
            )
            .expect("register tasks_completed"),
            tasks_failed: register_int_counter!(
                "nimbus_scheduler_tasks_failed",
                "Number of tasks that reached the Failed state"
            )
            .expect("register tasks_failed"),
            tasks_reclaimed: register_int_counter!(
                "nimbus_scheduler_tasks_reclaimed",
                "Number of tasks reclaimed to Pending after a processing timeout"
            )
            .expect("register tasks_reclaimed"),
            pending_tasks: register_gauge!(
                "nimbus_scheduler_pending_tasks",
                "Current number of tasks awaiting assignment"
            )
            .expect("register pending_tasks"),
            assignment_latency_ms: register_histogram!(
                "nimbus_scheduler_assignment_latency_ms",
                "Time from task submission to provider assignment"
            )
            .expect("register assignment_latency_ms"),
        }
    }
}

pub static SCHEDULER_METRICS: Lazy<SchedulerMetrics> = Lazy::new(SchedulerMetrics::new);
