use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// A registry path such as `/tetra/sql/client`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Cow<'static, str>);

impl Path {
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Path {
    fn from(path: &'static str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Self(Cow::Owned(path))
    }
}

/// A path tied to the type of value stored under it.
///
/// Tokens are usually declared as constants next to the type they resolve:
///
/// ```
/// use tetra_registry::Token;
///
/// struct Clock;
/// const CLOCK: Token<Clock> = Token::new("/app/clock");
/// assert_eq!(CLOCK.path().as_str(), "/app/clock");
/// ```
pub struct Token<T: ?Sized> {
    path: Path,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> Token<T> {
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path: Path::new(path),
            _marker: PhantomData,
        }
    }

    /// A token for a path computed at runtime.
    #[must_use]
    pub fn with_path(path: impl Into<Path>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("path", &self.path)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
