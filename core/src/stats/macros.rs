//! Macros
//!
//! Each `stat_*` macro declares thread local storage plus a callback that
//! moves the thread's value into a `StatsAccumulator` and resets it. Callbacks
//! are registered once per crate with `stat_register_fns!` and invoked on
//! every thread by `report_stats!`.
//!
//! `$title` uses `/` to separate a category from the title, for example
//! "BVH/Interior nodes".

/// Create a thread local variable to track an `i64` counter across threads.
///
/// * `$title`      - Descriptive title of the statistic.
/// * `$var`        - An identifier for the thread local variable.
/// * `$stats_func` - An identifier for the reporting callback.
#[macro_export]
macro_rules! stat_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! { pub(crate) static $var: std::cell::RefCell<i64> = std::cell::RefCell::new(0); }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.replace(0));
            accum.report_counter($title, val);
        }
    };
}

/// Create a thread local variable to track memory usage as a counter across threads.
///
/// * `$title`      - Descriptive title of the statistic.
/// * `$var`        - An identifier for the thread local variable.
/// * `$stats_func` - An identifier for the reporting callback.
#[macro_export]
macro_rules! stat_memory_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! { pub(crate) static $var: std::cell::RefCell<u64> = std::cell::RefCell::new(0); }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.replace(0));
            accum.report_memory_counter($title, val);
        }
    };
}

/// Create a thread local variable to track an integer distribution across threads.
///
/// * `$title`      - Descriptive title of the statistic.
/// * `$var`        - An identifier for the thread local variable.
/// * `$stats_func` - An identifier for the reporting callback.
#[macro_export]
macro_rules! stat_int_distribution {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var: std::cell::RefCell<$crate::stats::StatsDistribution<i64>> =
                std::cell::RefCell::new($crate::stats::StatsDistribution::default());
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.take());
            accum.report_int_distribution($title, val);
        }
    };
}

/// Create a thread local variable to track a float distribution across threads.
///
/// * `$title`      - Descriptive title of the statistic.
/// * `$var`        - An identifier for the thread local variable.
/// * `$stats_func` - An identifier for the reporting callback.
#[macro_export]
macro_rules! stat_float_distribution {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var: std::cell::RefCell<$crate::stats::StatsDistribution<f64>> =
                std::cell::RefCell::new($crate::stats::StatsDistribution::default());
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.take());
            accum.report_float_distribution($title, val);
        }
    };
}

/// Create thread local variables to track numerator/denominator as a percentage across threads.
///
/// * `$title`      - Descriptive title of the statistic.
/// * `$var_num`    - An identifier for the numerator (actual count).
/// * `$var_denom`  - An identifier for the denominator (total count).
/// * `$stats_func` - An identifier for the reporting callback.
#[macro_export]
macro_rules! stat_percent {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var_num: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
            pub(crate) static $var_denom: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let num = $var_num.with(|v| v.replace(0));
            let denom = $var_denom.with(|v| v.replace(0));
            accum.report_percentage($title, num, denom);
        }
    };
}

/// Create thread local variables to track numerator/denominator as a ratio across threads.
///
/// * `$title`      - Descriptive title of the statistic.
/// * `$var_num`    - An identifier for the numerator.
/// * `$var_denom`  - An identifier for the denominator.
/// * `$stats_func` - An identifier for the reporting callback.
#[macro_export]
macro_rules! stat_ratio {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var_num: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
            pub(crate) static $var_denom: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let num = $var_num.with(|v| v.replace(0));
            let denom = $var_denom.with(|v| v.replace(0));
            accum.report_ratio($title, num, denom);
        }
    };
}

/// Increment a thread local counter/percent/ratio variable.
#[macro_export]
macro_rules! stat_inc {
    ($var: ident, $e: expr) => {
        $var.with(|v| *v.borrow_mut() += $e);
    };
}

/// Report a sample to a thread local distribution variable.
#[macro_export]
macro_rules! stat_dist {
    ($var: ident, $e: expr) => {
        $var.with(|v| v.borrow_mut().report($e));
    };
}

/// Register the callback functions for statistics. Generates
/// `register_stats()`; call it from a top-level constructor of the crate, e.g.
/// `BVHAccel::build()` rather than `Triangle::new()`, to avoid a large number
/// of calls.
///
/// * `$($func: ident),+` - One or more callback functions created by the `stat_*` macros.
#[macro_export]
macro_rules! stat_register_fns {
    ($($stat_func: ident),+ $(,)?) => {
        pub(crate) fn register_stats() {
            static REGISTERED: std::sync::Once = std::sync::Once::new();
            REGISTERED.call_once(|| {
                let mut sr = $crate::stats::stats_registrar()
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                $(
                    sr.register_stat_func($stat_func);
                )+
            });
        }
    };
}

/// Accumulate the calling thread's statistics in the global `StatsAccumulator`.
/// Call at the end of each spawned worker thread and once from the main
/// thread after rendering.
#[macro_export]
macro_rules! report_stats {
    () => {{
        let mut accum = $crate::stats::stats_accumulator()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        $crate::stats::stats_registrar()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .call_stat_funcs(&mut accum);
    }};
}

/// Print the accumulated statistics.
#[macro_export]
macro_rules! print_stats {
    () => {{
        $crate::stats::stats_accumulator()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .print();
    }};
}

/// Clear the accumulated statistics.
#[macro_export]
macro_rules! clear_stats {
    () => {{
        $crate::stats::stats_accumulator()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }};
}

#[cfg(test)]
mod tests {
    use crate::stats::stats_accumulator;
    use std::sync::PoisonError;

    crate::stat_counter!("Test/Thread counter", THREAD_COUNTER, test_stats_thread_counter);
    crate::stat_register_fns!(test_stats_thread_counter);

    #[test]
    fn worker_values_reach_the_accumulator() {
        register_stats();
        register_stats();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    crate::stat_inc!(THREAD_COUNTER, 5);
                    crate::report_stats!();
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let total = stats_accumulator()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .counter("Test/Thread counter");
        assert_eq!(total, Some(20));

        crate::clear_stats!();
        let total = stats_accumulator()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .counter("Test/Thread counter");
        assert_eq!(total, None);
    }
}
