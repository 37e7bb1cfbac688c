//! Sample async validators
//!
//! Each one reports a fixed error after a fixed delay. The merge-all
//! variants let every call finish; [`latest_unique_email`] drops calls that a
//! newer value overtakes.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use hubfx_core::{merge_map, switch_map};
use hubfx_forms::{AsyncValidator, FormErrors, ValueStream};

/// Delay of [`unique_email`]
pub const UNIQUE_EMAIL_DELAY: Duration = Duration::from_millis(250);
/// Delay of [`blacklisted_email`]
pub const BLACKLISTED_EMAIL_DELAY: Duration = Duration::from_millis(300);
/// Delay of [`array_length_error`]
pub const ARRAY_LENGTH_ERROR_DELAY: Duration = Duration::from_millis(350);
/// Delay of [`unique_first_and_last_name`]
pub const UNIQUE_FIRST_AND_LAST_NAME_DELAY: Duration = Duration::from_millis(400);

fn delayed_flag(key: &'static str, delay: Duration) -> stream::BoxStream<'static, FormErrors> {
    stream::once(async move {
        tokio::time::sleep(delay).await;
        FormErrors::from([(key.to_string(), true)])
    })
    .boxed()
}

fn merge_all(key: &'static str, delay: Duration) -> AsyncValidator {
    AsyncValidator::new(key, move |values: ValueStream| merge_map(values, move |_| delayed_flag(key, delay)))
}

/// `{uniqueEmail: true}` after 250 ms, every call.
pub fn unique_email() -> AsyncValidator {
    merge_all("uniqueEmail", UNIQUE_EMAIL_DELAY)
}

/// `{blacklistedEmail: true}` after 300 ms, every call.
pub fn blacklisted_email() -> AsyncValidator {
    merge_all("blacklistedEmail", BLACKLISTED_EMAIL_DELAY)
}

/// `{arrayLengthError: true}` after 350 ms, every call.
pub fn array_length_error() -> AsyncValidator {
    merge_all("arrayLengthError", ARRAY_LENGTH_ERROR_DELAY)
}

/// `{uniqueFirstAndLastName: true}` after 400 ms, every call.
pub fn unique_first_and_last_name() -> AsyncValidator {
    merge_all("uniqueFirstAndLastName", UNIQUE_FIRST_AND_LAST_NAME_DELAY)
}

/// `{uniqueEmail: true}` after 250 ms, latest value only.
pub fn latest_unique_email() -> AsyncValidator {
    AsyncValidator::new("latestUniqueEmail", |values: ValueStream| {
        switch_map(values, |_| delayed_flag("uniqueEmail", UNIQUE_EMAIL_DELAY))
    })
}
