//! Call-site frames recorded on enriched errors.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::path::Path;

use serde::Serialize;

// Enough to get from the capture point through any wrapping helpers to the
// caller without walking the whole stack of a deep thread.
const MAX_TRACE_DEPTH: usize = 64;

/// A single captured call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Frame {
    file: &'static str,
    line: u32,
    column: u32,
    function: Option<Cow<'static, str>>,
}

impl Frame {
    /// Create a frame from explicit location data.
    pub const fn new(
        file: &'static str,
        line: u32,
        column: u32,
        function: Option<&'static str>,
    ) -> Self {
        let function = match function {
            Some(function) => Some(Cow::Borrowed(function)),
            None => None,
        };
        Self {
            file,
            line,
            column,
            function,
        }
    }

    /// Capture the location of the caller.
    ///
    /// Propagates through every `#[track_caller]` function on the way up, so
    /// the recorded site is the first frame outside of them. The enclosing
    /// function is looked up in the debug info; see [`Frame::from_location`].
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    /// Build a frame for `location` and resolve the function that contains it.
    ///
    /// The function name is taken from the symbol of the current stack whose
    /// debug info points at the same file and line. Without debug info the
    /// frame is still produced, with no function name.
    pub fn from_location(location: &'static Location<'static>) -> Self {
        let mut frame = Self::new(location.file(), location.line(), location.column(), None);
        frame.function = resolve_function(location).map(Cow::Owned);
        frame
    }

    /// Set the function name.
    pub fn with_function(mut self, function: impl Into<Cow<'static, str>>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Get the source file
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Get the line number
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Get the column number
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Get the function name, if it was captured
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(function) = &self.function {
            write!(f, " {}", function)?;
        }
        Ok(())
    }
}

/// Find the function owning `location` on the current stack.
///
/// An exact file and line match wins. Otherwise the symbol in the same file
/// with the nearest line is used, which covers calls spread over several
/// lines.
fn resolve_function(location: &Location<'_>) -> Option<String> {
    let target = Path::new(location.file());
    let mut exact: Option<String> = None;
    let mut nearest: Option<(u32, String)> = None;
    let mut depth = 0;

    backtrace::trace(|frame| {
        depth += 1;
        backtrace::resolve_frame(frame, |symbol| {
            if exact.is_some() {
                return;
            }
            let (Some(file), Some(name)) = (symbol.filename(), symbol.name()) else {
                return;
            };
            if !file.ends_with(target) {
                return;
            }
            let line = symbol.lineno().unwrap_or(0);
            let name = format!("{name:#}");
            if line == location.line() {
                exact = Some(name);
                return;
            }
            let distance = line.abs_diff(location.line());
            if nearest.as_ref().is_none_or(|(best, _)| distance < *best) {
                nearest = Some((distance, name));
            }
        });
        exact.is_none() && depth < MAX_TRACE_DEPTH
    });

    let name = exact.or(nearest.map(|(_, name)| name))?;
    tracing::trace!(%name, file = location.file(), line = location.line(), "resolved frame function");
    Some(short_function_name(&name).to_string())
}

/// Shorten a full function path to `module::function`.
///
/// Closure segments are dropped so a frame taken inside a closure reports
/// the function that owns it.
pub fn short_function_name(path: &str) -> &str {
    let mut path = path;
    while let Some((head, tail)) = path.rsplit_once("::") {
        if !tail.trim_start_matches('{').starts_with("closure") {
            break;
        }
        path = head;
    }
    match path.rmatch_indices("::").nth(1) {
        Some((idx, _)) => &path[idx + 2..],
        None => path,
    }
}

/// Expand to the full path of the enclosing function.
#[macro_export]
macro_rules! function_path {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Capture a [`Frame`] for the current site, including the function name.
#[macro_export]
macro_rules! frame {
    () => {
        $crate::Frame::new(
            ::std::file!(),
            ::std::line!(),
            ::std::column!(),
            Some($crate::frame::short_function_name($crate::function_path!())),
        )
    };
}
