//! Static page handlers.
//!
//! The front-end pages are embedded at compile time. Their content is plain
//! HTML; the dashboards post to `/predict` from the browser.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

pub async fn about() -> Html<&'static str> {
    Html(include_str!("../../templates/about.html"))
}

pub async fn doctor_login() -> Html<&'static str> {
    Html(include_str!("../../templates/doctorlogin.html"))
}

pub async fn doctor_dashboard() -> Html<&'static str> {
    Html(include_str!("../../templates/doctordashboard.html"))
}

pub async fn farmer_login() -> Html<&'static str> {
    Html(include_str!("../../templates/farmerlogin.html"))
}

pub async fn farmer_dashboard() -> Html<&'static str> {
    Html(include_str!("../../templates/farmerdashboard.html"))
}

pub async fn farmer_register() -> Html<&'static str> {
    Html(include_str!("../../templates/farmerregister.html"))
}
