//! Process-wide warning sink for non-fatal diagnostics.
//!
//! Short reads, missing-but-optional parameters, and metadata that's merely
//! inconsistent (rather than broken) are reported here rather than as
//! `Err`s — a truncated file should still hand back the frames it has.
//! The default handler prints to stderr; callers that want the warnings
//! routed elsewhere (a log file, a UI toast, a test assertion) install their
//! own with [`set_warning_handler`].

use std::sync::{OnceLock, RwLock};

type Handler = Box<dyn Fn(&str) + Send + Sync>;

fn handler() -> &'static RwLock<Handler> {
    static HANDLER: OnceLock<RwLock<Handler>> = OnceLock::new();
    HANDLER.get_or_init(|| RwLock::new(Box::new(|msg: &str| eprintln!("c3d: {msg}"))))
}

/// Replace the process-wide warning handler.
///
/// The previous handler is dropped. This affects every `Reader`/`Writer` in
/// the process, not just ones created afterward.
pub fn set_warning_handler<F>(f: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    *handler().write().expect("warning handler lock poisoned") = Box::new(f);
}

/// Restore the default stderr-printing handler.
pub fn reset_warning_handler() {
    set_warning_handler(|msg: &str| eprintln!("c3d: {msg}"));
}

pub(crate) fn warn(message: impl AsRef<str>) {
    let message = message.as_ref();
    log::warn!("{message}");
    (handler().read().expect("warning handler lock poisoned"))(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn custom_handler_receives_messages() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        set_warning_handler(move |msg| seen_clone.lock().unwrap().push(msg.to_string()));

        warn("short read at frame 3");

        assert_eq!(seen.lock().unwrap().as_slice(), ["short read at frame 3"]);
        reset_warning_handler();
    }
}
