//! Canonical operation logging macros
//!
//! Every store and engine operation brackets its work with a `start` event
//! and exactly one of `end` / `end_error`. Extra `tracing` fields may follow
//! the required arguments.

/// Log the start of an operation
///
/// ```
/// # use snapaudit_core::log_op_start;
/// log_op_start!("apply_change");
/// log_op_start!("apply_change", subject_id = "emby-1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::snapaudit_core_types::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use snapaudit_core::log_op_end;
/// log_op_end!("apply_change", duration_ms = 3);
/// log_op_end!("apply_change", duration_ms = 3, outcome = "skipped");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::snapaudit_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Log an operation failure with its canonical kind and code
///
/// Takes a reference to anything convertible into `ExError`; the value is
/// cloned, so the caller can still return it.
///
/// ```
/// # use snapaudit_core::log_op_error;
/// use snapaudit_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Concurrency);
/// log_op_error!("apply_change", &err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = ::core::clone::Clone::clone($err).into();
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::snapaudit_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            message = ex_err.message(),
            $($($field)+)?
        )
    }};
}
