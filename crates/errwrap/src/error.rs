//! The enriched error type and the wrap entry points.

use std::collections::VecDeque;
use std::fmt;
use std::panic::Location;

use parking_lot::Mutex;
use serde::Serialize;

use crate::chain::find_enriched;
use crate::{BoxError, ErrorConfig, Frame, Lang, Messages};

/// An error carrying a code, localized messages and a call-site trail on top
/// of the error that caused it.
///
/// Formatting with `{}` prints the cause's message unchanged. The alternate
/// form `{:#}` adds the code and the recorded frames.
pub struct EnrichedError {
    cause: BoxError,
    code: i32,
    messages: Messages,
    // Most recent frame first.
    frames: Mutex<VecDeque<Frame>>,
    stack_depth: usize,
}

impl EnrichedError {
    /// Wrap `cause` using the given config.
    ///
    /// When `config.capture_stack` is set the caller's location, along with
    /// the function it sits in, becomes the first frame.
    #[track_caller]
    pub fn new(cause: impl Into<BoxError>, config: ErrorConfig) -> Self {
        Self::new_at_location(cause, config, Location::caller())
    }

    // The function name is only resolved when the frame is kept.
    pub(crate) fn new_at_location(
        cause: impl Into<BoxError>,
        config: ErrorConfig,
        location: &'static Location<'static>,
    ) -> Self {
        let frame = if config.capture_stack {
            Frame::from_location(location)
        } else {
            Frame::new(location.file(), location.line(), location.column(), None)
        };
        Self::new_at(cause, config, frame)
    }

    /// Wrap `cause` and record `frame` as the construction site if the config
    /// asks for stack capture.
    pub fn new_at(cause: impl Into<BoxError>, config: ErrorConfig, frame: Frame) -> Self {
        let mut frames = VecDeque::new();
        if config.capture_stack {
            tracing::trace!(code = config.code, %frame, "enriching error");
            frames.push_front(frame);
        } else {
            tracing::trace!(code = config.code, "enriching error");
        }

        Self {
            cause: cause.into(),
            code: config.code,
            messages: config.messages,
            frames: Mutex::new(frames),
            stack_depth: config.stack_depth,
        }
    }

    /// Get the classification code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Get the recorded frames, most recent first.
    pub fn stack_frames(&self) -> Vec<Frame> {
        self.frames.lock().iter().cloned().collect()
    }

    /// Get the message for `lang`, or an empty string if none was configured.
    ///
    /// There is no fallback to another language.
    pub fn localized_message(&self, lang: Lang) -> &str {
        self.messages.get(&lang).map_or("", String::as_str)
    }

    /// Get the English message
    pub fn en_message(&self) -> &str {
        self.localized_message(Lang::En)
    }

    /// Get the Persian message
    pub fn fa_message(&self) -> &str {
        self.localized_message(Lang::Fa)
    }

    /// Get all configured messages
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Get the wrapped error.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Consume the wrapper and return the wrapped error.
    pub fn into_cause(self) -> BoxError {
        self.cause
    }

    /// Record `frame` as the most recent call site.
    ///
    /// Takes `&self` so an error nested inside another error's `source()`
    /// chain can be extended in place. Once the configured stack depth is
    /// exceeded the oldest re-wrap frames are dropped; the frame recorded at
    /// construction always stays last.
    pub fn push_frame(&self, frame: Frame) {
        tracing::trace!(%frame, "re-wrapping enriched error");

        let mut frames = self.frames.lock();
        frames.push_front(frame);
        if self.stack_depth > 0 && frames.len() > self.stack_depth {
            let origin = frames.pop_back();
            frames.truncate(self.stack_depth.saturating_sub(1));
            frames.extend(origin);
        }
    }

    /// Build a serializable report for an API response in `lang`.
    pub fn report(&self, lang: Lang) -> ErrorReport {
        ErrorReport {
            code: self.code,
            message: self.localized_message(lang).to_string(),
            detail: self.cause.to_string(),
            frames: self.frames.lock().iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Wrap `err` in an [`EnrichedError`] unless it already carries one.
///
/// If `err` or any error in its `source()` chain is an [`EnrichedError`],
/// the caller's location is prepended to that error's frames and `err` is
/// returned as is. Otherwise `err` is wrapped with code 0, the default
/// messages and the caller's location as the first frame.
///
/// ```rust
/// use errwrap::{EnrichedError, wrap};
///
/// fn load() -> Result<(), errwrap::BoxError> {
///     Err(wrap(std::io::Error::other("disk full")))
/// }
///
/// fn handler() -> Result<(), errwrap::BoxError> {
///     load().map_err(|e| wrap(e))
/// }
///
/// let err = handler().unwrap_err();
/// let enriched = err.downcast_ref::<EnrichedError>().unwrap();
/// assert_eq!(enriched.to_string(), "disk full");
/// assert_eq!(enriched.stack_frames().len(), 2);
/// ```
#[track_caller]
pub fn wrap(err: impl Into<BoxError>) -> BoxError {
    wrap_at(err, Frame::caller())
}

/// Like [`wrap`], recording `frame` instead of the caller's location.
pub fn wrap_at(err: impl Into<BoxError>, frame: Frame) -> BoxError {
    let err = err.into();
    if let Some(enriched) = find_enriched(&*err) {
        enriched.push_frame(frame);
        return err;
    }
    Box::new(EnrichedError::new_at(err, ErrorConfig::wrap_default(), frame))
}

/// Wrap an error at the current site, recording the enclosing function name.
///
/// Same semantics as [`wrap`].
#[macro_export]
macro_rules! enrich {
    ($err:expr) => {
        $crate::wrap_at($err, $crate::frame!())
    };
}

impl fmt::Display for EnrichedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)?;

        if f.alternate() {
            write!(f, " (code {})", self.code)?;
            for frame in self.frames.lock().iter() {
                write!(f, "\n    at {}", frame)?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for EnrichedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (code {})", self.cause, self.code)?;

        if !self.messages.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Messages:")?;
            for (lang, message) in &self.messages {
                writeln!(f, "        {}: {}", lang, message)?;
            }
        }

        let frames = self.frames.lock();
        if !frames.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Stack:")?;
            for frame in frames.iter() {
                writeln!(f, "        {}", frame)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "    Cause: {:?}", self.cause)?;

        Ok(())
    }
}

impl std::error::Error for EnrichedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Serializable view of an [`EnrichedError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub code: i32,
    pub message: String,
    pub detail: String,
    pub frames: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_messages;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_new_with_config() {
        let config = ErrorConfig::new()
            .with_code(404)
            .with_message(Lang::En, "user not found")
            .with_capture_stack(true);
        let line = line!() + 1;
        let err = EnrichedError::new(io::Error::other("no rows"), config);

        assert_eq!(err.code(), 404);
        assert_eq!(err.to_string(), "no rows");
        assert_eq!(err.en_message(), "user not found");
        assert_eq!(err.fa_message(), "");

        let frames = err.stack_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].line(), line);
        assert!(frames[0].file().ends_with("error.rs"));
    }

    #[test]
    fn test_new_without_capture() {
        let err = EnrichedError::new("plain", ErrorConfig::new().with_code(3));
        assert!(err.stack_frames().is_empty());
        assert!(err.messages().is_empty());
        assert_eq!(err.localized_message(Lang::En), "");
    }

    #[test]
    fn test_wrap_plain_error() {
        let err = wrap(io::Error::other("connection reset"));
        let enriched = err.downcast_ref::<EnrichedError>().unwrap();

        assert_eq!(enriched.code(), 0);
        assert_eq!(enriched.to_string(), "connection reset");
        assert_eq!(enriched.messages(), default_messages());
        assert_eq!(enriched.stack_frames().len(), 1);
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let first = wrap(io::Error::other("boom"));
        let before = first.downcast_ref::<EnrichedError>().unwrap().stack_frames();

        let line = line!() + 1;
        let second = wrap(first);
        let enriched = second.downcast_ref::<EnrichedError>().unwrap();

        // still a single layer around the io error
        assert!(enriched.cause().downcast_ref::<io::Error>().is_some());

        let after = enriched.stack_frames();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0].line(), line);
        assert_eq!(&after[1..], &before[..]);
    }

    #[test]
    fn test_stack_depth_limits_trail() {
        let err: BoxError = Box::new(EnrichedError::new(
            "deep",
            ErrorConfig::new().with_capture_stack(true).with_stack_depth(2),
        ));
        let origin = err.downcast_ref::<EnrichedError>().unwrap().stack_frames();

        let err = wrap(err);
        let err = wrap(err);
        let line = line!() + 1;
        let err = wrap(err);

        let frames = err.downcast_ref::<EnrichedError>().unwrap().stack_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].line(), line);
        assert_eq!(frames[1], origin[0]);
    }

    #[test]
    fn test_stack_depth_one_keeps_construction_site() {
        let err = EnrichedError::new_at(
            "deep",
            ErrorConfig::new().with_capture_stack(true).with_stack_depth(1),
            Frame::new("src/db.rs", 12, 5, Some("db::query")),
        );
        err.push_frame(Frame::new("src/repo.rs", 20, 5, Some("repo::load")));
        err.push_frame(Frame::new("src/api.rs", 30, 9, Some("api::get")));

        assert_eq!(
            err.stack_frames(),
            vec![Frame::new("src/db.rs", 12, 5, Some("db::query"))]
        );
    }

    fn fetch_account() -> BoxError {
        wrap(io::Error::other("account locked"))
    }

    fn build_account_error() -> EnrichedError {
        EnrichedError::new("account locked", ErrorConfig::new().with_capture_stack(true))
    }

    #[test]
    fn test_wrap_records_function_name() {
        let err = fetch_account();
        let frames = err.downcast_ref::<EnrichedError>().unwrap().stack_frames();
        assert_eq!(frames[0].function(), Some("tests::fetch_account"));

        let line = line!() + 1;
        let err = wrap(err);
        let frames = err.downcast_ref::<EnrichedError>().unwrap().stack_frames();
        assert_eq!(frames[0].line(), line);
        assert_eq!(
            frames[0].function(),
            Some("tests::test_wrap_records_function_name")
        );
        assert_eq!(frames[1].function(), Some("tests::fetch_account"));
    }

    #[test]
    fn test_new_records_function_name() {
        let err = build_account_error();
        let frames = err.stack_frames();
        assert_eq!(frames[0].function(), Some("tests::build_account_error"));
        assert!(
            format!("{err:#}").ends_with("tests::build_account_error"),
            "{err:#}"
        );
    }

    #[test]
    fn test_frame_not_logged_without_capture() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let err = EnrichedError::new_at(
                "boom",
                ErrorConfig::new().with_code(5),
                Frame::new("src/hidden.rs", 3, 1, Some("hidden::site")),
            );
            assert!(err.stack_frames().is_empty());

            EnrichedError::new_at(
                "boom",
                ErrorConfig::new().with_code(6).with_capture_stack(true),
                Frame::new("src/shown.rs", 4, 1, Some("shown::site")),
            );
        });

        let output = logs.contents();
        assert!(output.contains("enriching error"), "{output}");
        assert!(!output.contains("src/hidden.rs"), "{output}");
        assert!(output.contains("src/shown.rs:4 shown::site"), "{output}");
    }

    #[test]
    fn test_enrich_macro_records_function() {
        let err = crate::enrich!(io::Error::other("boom"));
        let frames = err.downcast_ref::<EnrichedError>().unwrap().stack_frames();
        assert_eq!(
            frames[0].function(),
            Some("tests::test_enrich_macro_records_function")
        );
    }

    #[test]
    fn test_source_is_cause() {
        let err = wrap(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let source = std::error::Error::source(err.as_ref()).unwrap();
        let io_err = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let enriched = *err.downcast::<EnrichedError>().unwrap();
        let cause = enriched.into_cause();
        assert_eq!(cause.to_string(), "missing");
    }

    #[test]
    fn test_alternate_display() {
        let err = EnrichedError::new_at(
            "boom",
            ErrorConfig::new().with_code(9).with_capture_stack(true),
            Frame::new("src/db.rs", 12, 5, Some("db::query")),
        );
        err.push_frame(Frame::new("src/api.rs", 30, 9, Some("api::get")));

        assert_eq!(format!("{err}"), "boom");
        assert_eq!(
            format!("{err:#}"),
            "boom (code 9)\n    at src/api.rs:30 api::get\n    at src/db.rs:12 db::query"
        );
    }

    #[test]
    fn test_debug() {
        let err = EnrichedError::new_at(
            "boom",
            ErrorConfig::new().with_code(1).with_message(Lang::En, "oops").with_capture_stack(true),
            Frame::new("src/db.rs", 12, 5, None),
        );
        let debug = format!("{err:?}");
        assert!(debug.starts_with("boom (code 1)"));
        assert!(debug.contains("en: oops"));
        assert!(debug.contains("src/db.rs:12"));
        assert!(debug.contains("Cause:"));
    }

    #[test]
    fn test_report() {
        let err = EnrichedError::new_at(
            io::Error::other("timeout"),
            ErrorConfig::wrap_default().with_code(504),
            Frame::new("src/api.rs", 7, 1, Some("api::fetch")),
        );
        let report = err.report(Lang::En);

        assert_eq!(
            report,
            ErrorReport {
                code: 504,
                message: "An unexpected error has occurred".to_string(),
                detail: "timeout".to_string(),
                frames: vec!["src/api.rs:7 api::fetch".to_string()],
            }
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], 504);
        assert_eq!(json["frames"][0], "src/api.rs:7 api::fetch");
    }
}
