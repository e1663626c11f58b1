use std::fmt;

use super::principal::{Identity, Role};

/// Top-level views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    SignUp,
    AdminDashboard,
    ManagerDashboard,
    EmployeeDashboard,
    Approvals,
    SubmitExpense,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::SignIn,
        Route::SignUp,
        Route::AdminDashboard,
        Route::ManagerDashboard,
        Route::EmployeeDashboard,
        Route::Approvals,
        Route::SubmitExpense,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/login",
            Route::SignUp => "/signup",
            Route::AdminDashboard => "/admin",
            Route::ManagerDashboard => "/manager",
            Route::EmployeeDashboard => "/employee",
            Route::Approvals => "/approvals",
            Route::SubmitExpense => "/submit",
        }
    }

    /// Exact path match, ignoring a trailing slash. `/` is not a route of its
    /// own; it resolves to the role home in the gate.
    pub fn from_path(path: &str) -> Option<Route> {
        let p = path.trim();
        let p = if p.len() > 1 { p.trim_end_matches('/') } else { p };
        Route::ALL.iter().copied().find(|r| r.path() == p)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::SignIn => "Sign in",
            Route::SignUp => "Sign up",
            Route::AdminDashboard => "Admin Dashboard",
            Route::ManagerDashboard => "Manager Dashboard",
            Route::EmployeeDashboard => "Employee Dashboard",
            Route::Approvals => "Pending Approvals",
            Route::SubmitExpense => "Submit Expense",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Views a role may open. Anonymous callers get only the auth views.
pub fn permitted_routes(role: Option<Role>) -> &'static [Route] {
    match role {
        Some(Role::Admin) => &[Route::AdminDashboard],
        Some(Role::Manager) => &[Route::ManagerDashboard, Route::Approvals],
        Some(Role::Employee) => &[Route::EmployeeDashboard, Route::SubmitExpense],
        None => &[Route::SignIn, Route::SignUp],
    }
}

/// Dashboard a signed-in role lands on.
pub fn home_for(role: Role) -> Route {
    match role {
        Role::Admin => Route::AdminDashboard,
        Role::Manager => Route::ManagerDashboard,
        Role::Employee => Route::EmployeeDashboard,
    }
}

/// Pure function of the caller's role and the requested view.
pub fn can_access(identity: Option<&Identity>, route: Route) -> bool {
    permitted_routes(identity.map(|i| i.role)).contains(&route)
}
