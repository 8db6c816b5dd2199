use std::borrow::Cow;

/// Configuration for [`use_safe_async_mount_with`](crate::use_safe_async_mount_with).
#[derive(Clone, Debug)]
pub struct SafeMountOptions {
    /// Name used in log lines for this mount.
    pub label: Cow<'static, str>,
}

impl Default for SafeMountOptions {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("safe_async_mount"),
        }
    }
}

impl SafeMountOptions {
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
        }
    }
}
