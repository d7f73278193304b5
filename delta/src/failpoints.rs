use fail::fail_point;

use crate::bail;
use crate::error::{ErrorKind, ReplicatorResult};

pub const DELTA_TRANSLATOR__BEFORE_BATCH_EXECUTION: &str =
    "delta_translator.before_batch_execution";
pub const DELTA_TRANSLATOR__BEFORE_DELETE_EXECUTION: &str =
    "delta_translator.before_delete_execution";

pub fn replicator_fail_point(name: &str) -> ReplicatorResult<()> {
    fail_point!(name, |parameter| {
        let mut error_kind = ErrorKind::WithNoRetry;
        if let Some(parameter) = parameter {
            error_kind = match parameter.as_str() {
                "no_retry" => ErrorKind::WithNoRetry,
                "manual_retry" => ErrorKind::WithManualRetry,
                _ => ErrorKind::WithNoRetry,
            }
        }

        bail!(
            error_kind,
            "An error occurred in a fail point",
            format!("The failpoint '{name}' returned an error")
        );
    });

    Ok(())
}
