// SPDX-License-Identifier: Apache-2.0

// The caller-buffer contract shared by every string-out accessor: the
// value is stored NUL terminated, the returned size includes the NUL,
// 0 means "no value" and BUFFER_TOO_SMALL means the buffer cannot hold
// the value.

use crate::error::BUFFER_TOO_SMALL;

/// Store `value` NUL terminated into `buf`, returning the stored size
/// including the NUL, or [BUFFER_TOO_SMALL].
pub fn copy_str_to_buffer(value: &str, buf: &mut [u8]) -> isize {
    let needed = value.len() + 1;
    if buf.len() < needed {
        return BUFFER_TOO_SMALL;
    }
    buf[..value.len()].copy_from_slice(value.as_bytes());
    buf[value.len()] = 0;
    needed as isize
}

/// Like [copy_str_to_buffer], returning 0 when there is no value.
pub fn copy_opt_str_to_buffer(
    value: Option<&str>,
    buf: &mut [u8],
) -> isize {
    match value {
        Some(v) => copy_str_to_buffer(v, buf),
        None => 0,
    }
}
