//! Wire side of an edit session: the push message out, the completion payload in.

/// Decoding of the completion payload into tensors.
pub mod decode;
/// Completion payload posted by the browser.
pub mod payload;
/// `show_canvas_pro` push message and window id lookup.
pub mod push;
