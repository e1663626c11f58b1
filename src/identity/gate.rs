use super::authorizer::{can_access, home_for, Route};
use super::principal::Identity;

/// Outcome of asking to open a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// The view that ends up on screen.
    pub fn route(&self) -> Route {
        match self {
            Navigation::Render(r) | Navigation::Redirect(r) => *r,
        }
    }

    pub fn is_redirect(&self) -> bool { matches!(self, Navigation::Redirect(_)) }
}

/// Where an unauthorized request lands: sign-in when anonymous, otherwise
/// the role's own dashboard.
pub fn fallback_for(identity: Option<&Identity>) -> Route {
    match identity {
        Some(id) => home_for(id.role),
        None => Route::SignIn,
    }
}

/// Gate a request for `route`.
pub fn resolve_route(identity: Option<&Identity>, route: Route) -> Navigation {
    if can_access(identity, route) {
        Navigation::Render(route)
    } else {
        Navigation::Redirect(fallback_for(identity))
    }
}

/// Gate a raw path. `/` and the empty path go to the caller's home; unknown
/// paths redirect the same way as denied ones.
pub fn resolve(identity: Option<&Identity>, path: &str) -> Navigation {
    let p = path.trim();
    if p.is_empty() || p == "/" {
        return Navigation::Render(fallback_for(identity));
    }
    match Route::from_path(p) {
        Some(route) => resolve_route(identity, route),
        None => Navigation::Redirect(fallback_for(identity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    #[test]
    fn anonymous_is_sent_to_sign_in() {
        assert_eq!(resolve(None, "/approvals"), Navigation::Redirect(Route::SignIn));
        assert_eq!(resolve(None, "/"), Navigation::Render(Route::SignIn));
        assert_eq!(resolve(None, "/signup"), Navigation::Render(Route::SignUp));
        assert_eq!(resolve(None, "/whatever"), Navigation::Redirect(Route::SignIn));
    }

    #[test]
    fn signed_in_lands_on_role_home() {
        let mgr = Identity::new("m@x.com", Role::Manager);
        assert_eq!(resolve(Some(&mgr), "/"), Navigation::Render(Route::ManagerDashboard));
        assert_eq!(resolve(Some(&mgr), "/approvals"), Navigation::Render(Route::Approvals));
        assert_eq!(resolve(Some(&mgr), "/submit"), Navigation::Redirect(Route::ManagerDashboard));
        assert_eq!(resolve(Some(&mgr), "/login"), Navigation::Redirect(Route::ManagerDashboard));

        let emp = Identity::new("e@x.com", Role::Employee);
        assert_eq!(resolve(Some(&emp), "/submit"), Navigation::Render(Route::SubmitExpense));
        assert_eq!(resolve(Some(&emp), "/admin"), Navigation::Redirect(Route::EmployeeDashboard));
        assert!(resolve(Some(&emp), "/nope").is_redirect());
    }
}
