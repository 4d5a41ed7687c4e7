// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route guard decisions.
//!
//! Pure functions from a [`SessionSnapshot`] to a [`RouteDecision`]. The
//! guards never consult the network or mutate anything; callers render a
//! waiting state, proceed, or redirect based on the decision alone.

use casetrace_session::SessionSnapshot;

/// What a screen should do before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session state is still being resolved; show a waiting indicator.
    Loading,
    /// Render the requested screen.
    Allow,
    /// Protected screen, no signed-in user.
    RedirectToSignIn,
    /// Public-only screen (sign-in, sign-up) while already signed in.
    RedirectToDashboard,
}

/// Guard for screens that require a signed-in user.
///
/// While an auth call is in flight the decision is [`RouteDecision::Loading`]
/// regardless of the cached user, so a screen never flashes and then
/// redirects mid-restore.
pub fn protected(snapshot: &SessionSnapshot) -> RouteDecision {
    if snapshot.loading {
        return RouteDecision::Loading;
    }
    match snapshot.user {
        Some(_) => RouteDecision::Allow,
        None => RouteDecision::RedirectToSignIn,
    }
}

/// Guard for screens that only make sense signed out.
pub fn public(snapshot: &SessionSnapshot) -> RouteDecision {
    if snapshot.loading {
        return RouteDecision::Loading;
    }
    match snapshot.user {
        Some(_) => RouteDecision::RedirectToDashboard,
        None => RouteDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetrace_test_utils::test_user;

    fn snapshot(signed_in: bool, loading: bool) -> SessionSnapshot {
        SessionSnapshot {
            user: signed_in.then(|| test_user("u-1", "a@b.c")),
            loading,
        }
    }

    #[test]
    fn protected_allows_signed_in_user() {
        assert_eq!(protected(&snapshot(true, false)), RouteDecision::Allow);
    }

    #[test]
    fn protected_redirects_anonymous_user() {
        assert_eq!(
            protected(&snapshot(false, false)),
            RouteDecision::RedirectToSignIn
        );
    }

    #[test]
    fn protected_waits_while_loading_even_with_user() {
        assert_eq!(protected(&snapshot(true, true)), RouteDecision::Loading);
        assert_eq!(protected(&snapshot(false, true)), RouteDecision::Loading);
    }

    #[test]
    fn public_allows_anonymous_user() {
        assert_eq!(public(&snapshot(false, false)), RouteDecision::Allow);
    }

    #[test]
    fn public_redirects_signed_in_user() {
        assert_eq!(
            public(&snapshot(true, false)),
            RouteDecision::RedirectToDashboard
        );
    }

    #[test]
    fn public_waits_while_loading() {
        assert_eq!(public(&snapshot(true, true)), RouteDecision::Loading);
        assert_eq!(public(&snapshot(false, true)), RouteDecision::Loading);
    }
}
