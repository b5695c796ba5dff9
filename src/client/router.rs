use super::session::Session;
use crate::models::Role;

/// Pages of the client application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CompanyList,
    CompanyDetails(String),
    Login,
    RegisterUser,
    RegisterCompany,
    UserDashboard,
    CompanyDashboard,
}

impl Route {
    /// Unknown paths fall back to the company list.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or("")
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::CompanyList,
            ["company", id] => Route::CompanyDetails((*id).to_string()),
            ["login"] => Route::Login,
            ["register", "user"] => Route::RegisterUser,
            ["register", "company"] => Route::RegisterCompany,
            ["dashboard", "user"] => Route::UserDashboard,
            ["dashboard", "company"] => Route::CompanyDashboard,
            _ => Route::CompanyList,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::CompanyList => "/".to_string(),
            Route::CompanyDetails(id) => format!("/company/{id}"),
            Route::Login => "/login".to_string(),
            Route::RegisterUser => "/register/user".to_string(),
            Route::RegisterCompany => "/register/company".to_string(),
            Route::UserDashboard => "/dashboard/user".to_string(),
            Route::CompanyDashboard => "/dashboard/company".to_string(),
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::UserDashboard => Some(Role::User),
            Route::CompanyDashboard => Some(Role::Company),
            _ => None,
        }
    }

    /// Where an account lands after logging in or registering.
    pub fn dashboard_for(role: Role) -> Route {
        match role {
            Role::User => Route::UserDashboard,
            Role::Company => Route::CompanyDashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    Redirect(Route),
}

impl Navigation {
    /// The page that ends up on screen.
    pub fn target(&self) -> &Route {
        match self {
            Navigation::Allow(route) | Navigation::Redirect(route) => route,
        }
    }
}

/// Evaluated on every navigation against the session as it is at that moment.
pub fn guard(route: Route, session: Option<&Session>) -> Navigation {
    match (route.required_role(), session) {
        (None, _) => Navigation::Allow(route),
        (Some(_), None) => Navigation::Redirect(Route::Login),
        (Some(required), Some(session)) if session.role() != required => {
            Navigation::Redirect(Route::CompanyList)
        }
        (Some(_), Some(_)) => Navigation::Allow(route),
    }
}

pub fn navigate(path: &str, session: Option<&Session>) -> Navigation {
    guard(Route::parse(path), session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::Profile;

    fn session(role: Role) -> Session {
        Session {
            token: "t".to_string(),
            profile: Profile {
                id: "a1".to_string(),
                name: "Anna".to_string(),
                email: "anna@test.com".to_string(),
                phone: String::new(),
                role,
                category: None,
                description: None,
                address: None,
                services: None,
                opening_hours: None,
            },
        }
    }

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::CompanyList);
        assert_eq!(Route::parse("/company/42"), Route::CompanyDetails("42".to_string()));
        assert_eq!(Route::parse("/register/company/"), Route::RegisterCompany);
        assert_eq!(Route::parse("/dashboard/user?tab=past"), Route::UserDashboard);
        assert_eq!(Route::parse("/nowhere/at/all"), Route::CompanyList);
    }

    #[test]
    fn path_round_trips() {
        for route in [
            Route::CompanyList,
            Route::CompanyDetails("c1".to_string()),
            Route::Login,
            Route::RegisterUser,
            Route::RegisterCompany,
            Route::UserDashboard,
            Route::CompanyDashboard,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        assert_eq!(
            navigate("/dashboard/company", None),
            Navigation::Redirect(Route::Login)
        );
        assert_eq!(navigate("/login", None), Navigation::Allow(Route::Login));
    }

    #[test]
    fn wrong_role_is_sent_home() {
        let user = session(Role::User);
        assert_eq!(
            navigate("/dashboard/company", Some(&user)),
            Navigation::Redirect(Route::CompanyList)
        );
        assert_eq!(
            navigate("/dashboard/user", Some(&user)),
            Navigation::Allow(Route::UserDashboard)
        );
    }

    #[test]
    fn public_pages_are_open_to_everyone() {
        let company = session(Role::Company);
        assert_eq!(
            guard(Route::CompanyDetails("c1".to_string()), Some(&company)),
            Navigation::Allow(Route::CompanyDetails("c1".to_string()))
        );
    }
}
