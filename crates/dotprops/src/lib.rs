//! Lossless, editable document model for `.properties` files.
//!
//! Unlike a plain key/value parser, a [`Properties`] document remembers the
//! exact bytes it was read from — comment prefixes, separator choice,
//! surrounding whitespace, escape style, and line endings — and reproduces
//! them on store. Edits rewrite only the tokens they touch, so everything
//! else round-trips byte for byte.
//!
//! # Example
//!
//! ```
//! use dotprops::Properties;
//!
//! let source = "# app settings\nhost = localhost\nport=8080\n";
//! let mut props: Properties = source.parse()?;
//!
//! assert_eq!(props.get("host"), Some("localhost"));
//! assert_eq!(props.get_comment("host"), vec!["# app settings"]);
//!
//! // replacing a value leaves every other byte alone, separators included
//! props.put("port", "9090");
//! assert_eq!(props.to_string(), "# app settings\nhost = localhost\nport=9090\n");
//!
//! // new keys are appended
//! props.put("debug", "true");
//! assert_eq!(
//!     props.to_string(),
//!     "# app settings\nhost = localhost\nport=9090\ndebug=true"
//! );
//! # Ok::<(), dotprops::Error>(())
//! ```
//!
//! An untouched document always stores exactly what was loaded:
//!
//! ```
//! use dotprops::Properties;
//!
//! let source = "key.1 : with\\ncontinuations \\\n    and escapes\r\n! odd comment\n";
//! let props: Properties = source.parse()?;
//! assert_eq!(props.to_string(), source);
//! # Ok::<(), dotprops::Error>(())
//! ```

pub mod cursor;
pub mod error;
pub mod properties;

pub use cursor::Cursor;
pub use error::Error;
pub use properties::Properties;

pub use dotprops_tokenizer::escape;
pub use dotprops_tokenizer::{ScanError, Token, TokenKind, Tokenizer};
