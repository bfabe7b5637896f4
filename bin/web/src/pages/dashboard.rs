//! Role dashboards.

use leptos::prelude::*;

/// Dashboard for sessions holding the `Employee` role.
#[component]
pub fn EmployeePage(user: String) -> impl IntoView {
    view! {
        <div class="dashboard employee">
            <h1>"Employee dashboard"</h1>
            <p>{format!("Signed in as {}.", user)}</p>
        </div>
    }
}

/// Dashboard for sessions holding the `Representative` role.
#[component]
pub fn RepresentativePage(user: String) -> impl IntoView {
    view! {
        <div class="dashboard representative">
            <h1>"Representative dashboard"</h1>
            <p>{format!("Signed in as {}.", user)}</p>
        </div>
    }
}
