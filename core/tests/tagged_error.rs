use std::error::Error as StdError;
use std::fmt;
use std::io;
use utilkit_core::tagged::{
    category_of, matches, matches_opt, ErrorCategory, ResultExt, TaggedError,
};
use utilkit_core::CoreError;

/// Foreign error that wraps another error, like a driver or framework error would.
#[derive(Debug)]
struct Wrapper {
    inner: Box<dyn StdError + Send + Sync>,
}

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wrapped: {}", self.inner)
    }
}

impl StdError for Wrapper {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref())
    }
}

#[test]
fn construction_keeps_category_message_and_cause() {
    let err = TaggedError::with_cause(
        ErrorCategory::Database,
        "insert failed",
        io::Error::new(io::ErrorKind::Other, "disk full"),
    );
    assert_eq!(err.category(), ErrorCategory::Database);
    assert_eq!(err.message(), "insert failed");
    let cause = err.cause().expect("cause");
    assert_eq!(cause.to_string(), "disk full");
    assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk full"));
}

#[test]
fn error_without_cause_has_no_source() {
    let err = TaggedError::validation("bad input");
    assert!(err.cause().is_none());
    assert!(err.source().is_none());
}

#[test]
fn origin_points_at_the_constructing_line() {
    let (err, line) = (TaggedError::not_found("missing"), line!());
    assert_eq!(err.origin().file(), file!());
    assert_eq!(err.origin().line(), line);

    let failing: io::Result<()> = Err(io::ErrorKind::Other.into());
    let (err, line) = (failing.tag(ErrorCategory::Io, "x"), line!());
    let err = err.unwrap_err();
    assert_eq!(err.origin().file(), file!());
    assert_eq!(err.origin().line(), line);
}

#[test]
fn display_mentions_category_message_and_origin() {
    let err = TaggedError::network("connection refused");
    let shown = err.to_string();
    assert!(shown.starts_with("[NetworkError] connection refused ("), "{}", shown);
    assert!(shown.contains(file!()), "{}", shown);
}

#[test]
fn matches_the_category_it_was_built_with_and_nothing_else() {
    for category in ErrorCategory::ALL {
        let err = TaggedError::new(category, "x");
        for other in ErrorCategory::ALL {
            assert_eq!(matches(&err, other), category == other);
        }
    }
}

#[test]
fn category_is_found_through_foreign_wrappers() {
    let tagged = TaggedError::not_found("no such user");
    let wrapped = Wrapper {
        inner: Box::new(Wrapper {
            inner: Box::new(tagged),
        }),
    };
    assert_eq!(category_of(&wrapped), Some(ErrorCategory::NotFound));
    assert!(matches(&wrapped, ErrorCategory::NotFound));
    assert!(!matches(&wrapped, ErrorCategory::Validation));
}

#[test]
fn outermost_tagged_error_wins() {
    let inner = TaggedError::database("row missing");
    let outer = TaggedError::with_cause(ErrorCategory::NotFound, "user lookup failed", inner);
    assert_eq!(category_of(&outer), Some(ErrorCategory::NotFound));
    assert!(!matches(&outer, ErrorCategory::Database));
}

#[test]
fn untagged_chains_match_nothing() {
    let err = Wrapper {
        inner: Box::new(io::Error::new(io::ErrorKind::NotFound, "gone")),
    };
    assert_eq!(category_of(&err), None);
    for category in ErrorCategory::ALL {
        assert!(!matches(&err, category));
    }
}

#[test]
fn absent_error_never_matches() {
    for category in ErrorCategory::ALL {
        assert!(!matches_opt(None, category));
    }
    let err = TaggedError::crypto("bad tag");
    let err: &(dyn StdError + 'static) = &err;
    assert!(matches_opt(Some(err), ErrorCategory::Crypto));
}

#[test]
fn tag_leaves_ok_values_alone() {
    let ok: Result<u8, io::Error> = Ok(7);
    assert_eq!(ok.tag(ErrorCategory::Io, "unused").unwrap(), 7);
}

#[test]
fn core_error_exposes_the_tagged_category() {
    let err: CoreError = TaggedError::serialization("bad json").into();
    assert_eq!(err.category(), Some(ErrorCategory::Serialization));
    assert!(matches(&err, ErrorCategory::Serialization));

    let raw: CoreError = io::Error::new(io::ErrorKind::Other, "boom").into();
    assert_eq!(raw.category(), None);
}

#[test]
fn into_cause_returns_the_wrapped_error() {
    let err = TaggedError::with_cause(
        ErrorCategory::Io,
        "read failed",
        io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    );
    let cause = err.into_cause().expect("cause");
    let io_err = cause.downcast::<io::Error>().expect("io error");
    assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
}

#[test]
fn category_labels_round_trip_through_serde() {
    let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
    assert_eq!(json, "\"NotFound\"");
    let back: ErrorCategory = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ErrorCategory::NotFound);
    assert_eq!(ErrorCategory::NotFound.to_string(), "NotFoundError");
}
