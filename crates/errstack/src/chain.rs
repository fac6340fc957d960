//! Cause-chain walking over any `std::error::Error`.
//!
//! These are the drop-in counterparts of the usual `is` / `as` / `unwrap`
//! helpers. They work on any error, and honour [`Error`]'s text matching
//! wherever one appears in the chain.

use std::error::Error as StdError;
use std::iter;

use crate::Error;

/// Text rendered for an absent error.
pub const NIL_TEXT: &str = "<nil>";

/// Iterate over `err` and then each successive `source()`.
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> + 'a {
    iter::successors(Some(err), |&e| e.source())
}

/// The immediate cause of `err`.
#[inline]
pub fn unwrap<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    err.source()
}

/// The first link of the chain that is an `E`.
pub fn find<'a, E: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a E> {
    chain(err).find_map(|e| e.downcast_ref::<E>())
}

/// Whether `target` appears in the chain of `err`.
///
/// A link matches by identity, or, for an [`Error`] link, when its own
/// message or rendered text equals `target.to_string()`.
pub fn is(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    let text = target.to_string();
    chain(err).any(|link| {
        same_object(link, target)
            || link
                .downcast_ref::<Error>()
                .is_some_and(|e| e.matches_text(&text))
    })
}

/// Identity-only form of [`is`].
pub fn is_structural(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|link| same_object(link, target))
}

/// Render an optional error, `"<nil>"` when absent.
pub fn render(err: Option<&(dyn StdError + 'static)>) -> String {
    match err {
        Some(err) => err.to_string(),
        None => NIL_TEXT.to_owned(),
    }
}

#[inline]
fn same_object(a: &(dyn StdError + 'static), b: &(dyn StdError + 'static)) -> bool {
    std::ptr::addr_eq(a as *const dyn StdError, b as *const dyn StdError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[test]
    fn chain_yields_every_link() {
        let err = Error::caused_by(io::Error::other("root"), "mid").wrap("top");
        let texts: Vec<String> = chain(&err).map(|e| e.to_string()).collect();
        assert_eq!(texts, ["root:mid:top", "root:mid", "root"]);
    }

    #[test]
    fn unwrap_returns_immediate_cause() {
        let err = Error::plain("a").wrap("b");
        assert_eq!(unwrap(&err).map(|e| e.to_string()), Some("a".to_string()));
        assert!(unwrap(&Error::plain("a")).is_none());
    }

    fn timeout_of(err: &Error) -> Option<&io::Error> {
        find(err)
    }

    fn cause_of(err: &Error) -> Option<&(dyn StdError + 'static)> {
        unwrap(err)
    }

    #[test]
    fn returned_links_borrow_from_the_error() {
        let err = Error::caused_by(io::Error::new(io::ErrorKind::TimedOut, "slow"), "poll");
        assert_eq!(timeout_of(&err).map(io::Error::kind), Some(io::ErrorKind::TimedOut));
        assert_eq!(cause_of(&err).map(|e| e.to_string()).as_deref(), Some("slow"));

        let links: Vec<&(dyn StdError + 'static)> = chain(&err).collect();
        assert_eq!(links.len(), 2);
        assert!(same_object(links[1], cause_of(&err).unwrap()));
    }

    #[test]
    fn find_downcasts_through_the_chain() {
        let err = Error::caused_by(io::Error::new(io::ErrorKind::TimedOut, "slow"), "poll")
            .wrap("tick");
        let io_err = find::<io::Error>(&err);
        assert_eq!(io_err.map(io::Error::kind), Some(io::ErrorKind::TimedOut));
        assert!(find::<std::fmt::Error>(&err).is_none());
    }

    #[test]
    fn is_by_identity_on_shared_foreign_cause() {
        let root: Arc<dyn StdError + Send + Sync> = Arc::new(io::Error::other("root"));
        let err = Error::caused_by(Arc::clone(&root), "mid").wrap("top");
        assert!(is(&err, &*root));
        assert!(is_structural(&err, &*root));
    }

    #[test]
    fn is_by_text_on_copied_cause() {
        let root = Error::plain("root");
        let err = root.clone().wrap("mid").wrap("top");
        assert!(is(&err, &root));
        assert!(!is_structural(&err, &root));
    }

    #[test]
    fn is_matches_rendered_text() {
        let err = Error::plain("a").wrap("b");
        assert!(is(&err, &Error::plain("a:b")));
        assert!(!is(&err, &Error::plain("c")));
    }

    #[test]
    fn foreign_links_do_not_text_match() {
        let err = Error::caused_by(io::Error::other("disk"), "save");
        assert!(!is(&err, &io::Error::other("disk")));
    }

    #[test]
    fn render_none() {
        assert_eq!(render(None), "<nil>");
        assert_eq!(render(Some(&Error::plain("x"))), "x");
    }
}
