pub mod sync_market_data;

use std::time::Duration;

/// 定义一个任务的调度信息
pub struct ScheduledTask {
    pub name: &'static str,
    pub interval: Duration,
    pub task_fn: fn() -> futures::future::BoxFuture<'static, Result<(), anyhow::Error>>,
}

/// 将异步函数转换为任务类型
macro_rules! task {
    ($name:expr, $interval:expr, $func:expr) => {
        ScheduledTask {
            name: $name,
            interval: $interval,
            task_fn: || Box::pin($func()),
        }
    };
}

/// 所有需要定时执行的任务列表
pub fn get_all_tasks(interval: Duration) -> Vec<ScheduledTask> {
    vec![task!(
        "sync_market_data",
        interval,
        sync_market_data::sync_market_data
    )]
}
