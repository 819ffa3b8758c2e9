use core::fmt::{self, Debug, Formatter};

/// Formats page content only with the `dangerous-logging` feature enabled.
pub(crate) struct Redacted<'a, T: ?Sized>(pub &'a T);
impl<T: ?Sized + Debug> Debug for Redacted<'_, T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if cfg!(feature = "dangerous-logging") {
			self.0.fmt(f)
		} else {
			f.write_str("<redacted>")
		}
	}
}
