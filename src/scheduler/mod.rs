pub mod tasks;

use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::scheduler::tasks::{get_all_tasks, ScheduledTask};

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Scheduler { interval }
    }

    pub async fn run(&self) {
        info!("Scheduler started, interval {:?}", self.interval);

        let tasks = get_all_tasks(self.interval);

        for task in tasks {
            tokio::spawn(run_periodic_task(task));
        }
    }
}

/// 单个任务的调度执行循环
///
/// The next run starts only after the previous one returned.
async fn run_periodic_task(task: ScheduledTask) {
    let mut interval = time::interval(task.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;

        let task_name = task.name;
        let task_fn = task.task_fn;

        info!(task = task_name, "Running scheduled task...");
        let result = task_fn().await;

        if let Err(err) = result {
            error!(task = task_name, error = ?err, "Scheduled task failed");
        } else {
            info!(task = task_name, "Scheduled task completed");
        }
    }
}
