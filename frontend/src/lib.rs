//! Client-side core of the site: the cookie-consent state machine and everything
//! gated behind it, plus the contact form and the bilingual route map.

pub mod consent {
    pub mod bus;
    pub mod manager;
    pub mod record;
    pub mod storage;
    pub mod store;
}
pub mod tracking {
    pub mod analytics;
    pub mod embed;
}
pub mod contact {
    pub mod form;
}
pub mod i18n {
    pub mod routes;
}
