#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

/// Per-tick reward line, printed once for every `step`.
#[macro_export]
macro_rules! step {
    (
        tick: $tick:expr,
        action: $action:expr,
        min_range: $min_range:expr,
        goal_dist: $goal_dist:expr,
        reward: $reward:expr,
        done: $done:expr $(,)?
    ) => {{
        let goal_dist: Option<f64> = $goal_dist;
        println!(
            "\x1b[1;34m[STEP] [{}]\x1b[0m tick {} action {} min_range {:.2} goal_dist {} reward {:.2} done {}",
            chrono::Utc::now().format("%H:%M:%S"),
            $tick,
            $action,
            $min_range,
            goal_dist.map_or_else(|| "n/a".to_string(), |d| format!("{d:.2}")),
            $reward,
            $done
        )
    }};
}

/// High-frequency transport chatter, only shown when `LOG_NAV_EVENTS` is set.
#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_NAV_EVENTS").is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
        }
    };
}
